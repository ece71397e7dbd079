//! Operations on postpaid member accounts.

use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, MoneyCents, PostpaidUser, Principal, ResultEngine, postpaid, prepaid,
};

use super::{AccountKind, Engine, normalize_username, with_tx};

impl Engine {
    /// Provisioning hook for the login flow: looks up the username and
    /// creates a fresh record when it is unknown.
    ///
    /// New records start deactivated with a zero balance; an administrator
    /// flips activation before the first drink. Calling this twice for the
    /// same username is harmless.
    pub async fn ensure_postpaid_user(&self, username: &str) -> ResultEngine<PostpaidUser> {
        let username = normalize_username(username)?;
        with_tx!(self, |tx| {
            let existing = postpaid::Entity::find()
                .filter(postpaid::Column::Username.eq(username.as_str()))
                .one(&tx)
                .await?;
            let model = match existing {
                Some(model) => model,
                None => {
                    postpaid::ActiveModel {
                        id: ActiveValue::NotSet,
                        username: ActiveValue::Set(username),
                        money: ActiveValue::Set(0),
                        activated: ActiveValue::Set(false),
                        last_drink: ActiveValue::Set(None),
                    }
                    .insert(&tx)
                    .await?
                }
            };
            Ok(model.into())
        })
    }

    /// Returns the caller's own postpaid record.
    pub async fn postpaid_self(&self, principal: &Principal) -> ResultEngine<PostpaidUser> {
        let username = normalize_username(&principal.username)?;
        let model = self
            .require_postpaid_by_username(&self.database, &username)
            .await?;
        Ok(model.into())
    }

    /// Full postpaid ledger in insertion order. Administrators only.
    pub async fn list_postpaid_users(
        &self,
        principal: &Principal,
    ) -> ResultEngine<Vec<PostpaidUser>> {
        self.require_admin(principal)?;
        let models = postpaid::Entity::find()
            .order_by_asc(postpaid::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Administrative absolute override: `money := amount`, not a delta.
    pub async fn set_postpaid_money(
        &self,
        principal: &Principal,
        username: &str,
        amount: MoneyCents,
    ) -> ResultEngine<PostpaidUser> {
        self.require_admin(principal)?;
        let username = normalize_username(username)?;
        with_tx!(self, |tx| {
            let model = self.require_postpaid_by_username(&tx, &username).await?;
            let mut active: postpaid::ActiveModel = model.into();
            active.money = ActiveValue::Set(amount.cents());
            let updated = active.update(&tx).await?;
            Ok(updated.into())
        })
    }

    /// Flips `activated` on a postpaid or prepaid account. Administrators
    /// only. Deactivation blocks drink purchases and nothing else.
    pub async fn toggle_activated(
        &self,
        principal: &Principal,
        kind: AccountKind,
        username: &str,
    ) -> ResultEngine<bool> {
        self.require_admin(principal)?;
        let username = normalize_username(username)?;
        with_tx!(self, |tx| {
            match kind {
                AccountKind::Postpaid => {
                    let model = self.require_postpaid_by_username(&tx, &username).await?;
                    let activated = !model.activated;
                    let mut active: postpaid::ActiveModel = model.into();
                    active.activated = ActiveValue::Set(activated);
                    active.update(&tx).await?;
                    Ok(activated)
                }
                AccountKind::Prepaid => {
                    let model = self.require_prepaid_by_username(&tx, &username).await?;
                    let activated = !model.activated;
                    let mut active: prepaid::ActiveModel = model.into();
                    active.activated = ActiveValue::Set(activated);
                    active.update(&tx).await?;
                    Ok(activated)
                }
            }
        })
    }

    /// Settlement transfer between two postpaid accounts: the caller's own
    /// balance goes down by `amount`, the target's goes up. Administrators
    /// only.
    ///
    /// Both sides change inside one store transaction, so a reader sees
    /// either the full transfer or none of it, and the total amount of
    /// money is conserved. Paying yourself is a balance-neutral no-op.
    pub async fn pay_up(
        &self,
        principal: &Principal,
        target_username: &str,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        self.require_admin(principal)?;
        let actor_username = normalize_username(&principal.username)?;
        let target_username = normalize_username(target_username)?;
        with_tx!(self, |tx| {
            let actor = self.require_postpaid_by_username(&tx, &actor_username).await?;
            let target = self
                .require_postpaid_by_username(&tx, &target_username)
                .await?;
            if actor.id == target.id {
                return Ok(());
            }

            let res = postpaid::Entity::update_many()
                .col_expr(
                    postpaid::Column::Money,
                    Expr::col(postpaid::Column::Money).sub(amount.cents()),
                )
                .filter(postpaid::Column::Id.eq(actor.id))
                .exec(&tx)
                .await?;
            if res.rows_affected != 1 {
                return Err(EngineError::KeyNotFound(actor.username));
            }

            let res = postpaid::Entity::update_many()
                .col_expr(
                    postpaid::Column::Money,
                    Expr::col(postpaid::Column::Money).add(amount.cents()),
                )
                .filter(postpaid::Column::Id.eq(target.id))
                .exec(&tx)
                .await?;
            if res.rows_affected != 1 {
                return Err(EngineError::KeyNotFound(target.username));
            }

            Ok(())
        })
    }
}
