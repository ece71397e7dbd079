//! Operations on prepaid guest accounts.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, MoneyCents, PrepaidUser, Principal, ResultEngine, prepaid,
    prepaid::generate_user_key, retired_keys,
};

use super::{Engine, normalize_username, with_tx};

impl Engine {
    /// Creates a prepaid account owned by the caller's postpaid record.
    ///
    /// Members only. The fresh `user_key` is guaranteed to differ from every
    /// live key and from every key ever retired by a deletion.
    pub async fn add_prepaid_user(
        &self,
        principal: &Principal,
        username: &str,
        start_money: MoneyCents,
    ) -> ResultEngine<PrepaidUser> {
        self.require_member(principal)?;
        let owner_username = normalize_username(&principal.username)?;
        let username = normalize_username(username)?;
        with_tx!(self, |tx| {
            let owner = self
                .require_postpaid_by_username(&tx, &owner_username)
                .await?;

            let taken = prepaid::Entity::find()
                .filter(prepaid::Column::Username.eq(username.as_str()))
                .one(&tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(username));
            }

            let user_key = self.fresh_user_key(&tx).await?;
            let model = prepaid::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username),
                user_key: ActiveValue::Set(user_key),
                postpaid_user_id: ActiveValue::Set(owner.id),
                money: ActiveValue::Set(start_money.cents()),
                activated: ActiveValue::Set(true),
                last_drink: ActiveValue::Set(None),
            }
            .insert(&tx)
            .await?;
            Ok(model.into())
        })
    }

    /// Tops up (or, with a negative amount, corrects) a prepaid balance.
    ///
    /// Allowed for the owning member and for administrators.
    pub async fn add_prepaid_money(
        &self,
        principal: &Principal,
        username: &str,
        amount: MoneyCents,
    ) -> ResultEngine<PrepaidUser> {
        let username = normalize_username(username)?;
        with_tx!(self, |tx| {
            let target = self
                .require_prepaid_managed(&tx, principal, &username)
                .await?;

            let res = prepaid::Entity::update_many()
                .col_expr(
                    prepaid::Column::Money,
                    Expr::col(prepaid::Column::Money).add(amount.cents()),
                )
                .filter(prepaid::Column::Id.eq(target.id))
                .exec(&tx)
                .await?;
            if res.rows_affected != 1 {
                return Err(EngineError::KeyNotFound(target.username));
            }

            let updated = self.require_prepaid_by_username(&tx, &username).await?;
            Ok(updated.into())
        })
    }

    /// Removes a prepaid account and retires its key. Administrators only.
    pub async fn delete_prepaid_user(
        &self,
        principal: &Principal,
        username: &str,
    ) -> ResultEngine<()> {
        self.require_admin(principal)?;
        let username = normalize_username(username)?;
        with_tx!(self, |tx| {
            let target = self.require_prepaid_by_username(&tx, &username).await?;

            retired_keys::ActiveModel {
                user_key: ActiveValue::Set(target.user_key),
            }
            .insert(&tx)
            .await?;

            let res = prepaid::Entity::delete_by_id(target.id).exec(&tx).await?;
            if res.rows_affected != 1 {
                return Err(EngineError::KeyNotFound(username));
            }
            Ok(())
        })
    }

    /// The caller's own prepaid accounts in insertion order. Members only.
    pub async fn prepaid_users_for_owner(
        &self,
        principal: &Principal,
    ) -> ResultEngine<Vec<PrepaidUser>> {
        self.require_member(principal)?;
        let owner_username = normalize_username(&principal.username)?;
        let owner = self
            .require_postpaid_by_username(&self.database, &owner_username)
            .await?;
        let models = prepaid::Entity::find()
            .filter(prepaid::Column::PostpaidUserId.eq(owner.id))
            .order_by_asc(prepaid::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Full prepaid ledger in insertion order. Administrators only.
    pub async fn list_prepaid_users(
        &self,
        principal: &Principal,
    ) -> ResultEngine<Vec<PrepaidUser>> {
        self.require_admin(principal)?;
        let models = prepaid::Entity::find()
            .order_by_asc(prepaid::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn fresh_user_key(&self, tx: &DatabaseTransaction) -> ResultEngine<String> {
        loop {
            let key = generate_user_key();
            let live = prepaid::Entity::find()
                .filter(prepaid::Column::UserKey.eq(key.as_str()))
                .one(tx)
                .await?
                .is_some();
            let retired = retired_keys::Entity::find_by_id(key.clone())
                .one(tx)
                .await?
                .is_some();
            if !live && !retired {
                return Ok(key);
            }
        }
    }
}
