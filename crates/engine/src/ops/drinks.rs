//! The purchase path: the drink button and its undo.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    EngineError, MoneyCents, Principal, REVERT_WINDOW_SECS, ResultEngine, drink_types, postpaid,
    prepaid,
};

use super::{AccountKind, Engine, normalize_username, with_tx};

/// Who is buying the drink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrinkTarget {
    /// The authenticated caller's own postpaid account.
    SelfPostpaid,
    /// The authenticated caller's own prepaid account.
    SelfPrepaid,
    /// Point-of-sale flow: no login, just the prepaid secret key.
    ByKey(String),
}

/// Outcome of a recorded purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrinkReceipt {
    pub kind: AccountKind,
    pub username: String,
    pub money: MoneyCents,
    pub last_drink: Option<DateTime<Utc>>,
}

enum Resolved {
    Postpaid(postpaid::Model),
    Prepaid(prepaid::Model),
}

impl Engine {
    /// Records a drink purchase.
    ///
    /// Debits `price` from the target account and stamps `last_drink`. The
    /// debit is a `money = money - ?` store update, so interleaved purchases
    /// against the same account all land. Balances have no floor: postpaid
    /// debt and prepaid overdraft are both allowed.
    pub async fn record_drink(
        &self,
        principal: Option<&Principal>,
        target: DrinkTarget,
        price: MoneyCents,
        drink_type: Option<i32>,
    ) -> ResultEngine<DrinkReceipt> {
        if !price.is_positive() {
            return Err(EngineError::InvalidAmount(
                "drink price must be positive".to_string(),
            ));
        }

        with_tx!(self, |tx| {
            let now = Utc::now();
            let receipt = match self.resolve_target(&tx, principal, &target).await? {
                Resolved::Postpaid(model) => {
                    if !model.activated {
                        return Err(EngineError::Inactive(model.username));
                    }
                    self.debit_postpaid(&tx, model.id, price, now).await?;
                    let updated = self.require_postpaid_by_username(&tx, &model.username).await?;
                    DrinkReceipt {
                        kind: AccountKind::Postpaid,
                        username: updated.username,
                        money: MoneyCents::new(updated.money),
                        last_drink: updated.last_drink,
                    }
                }
                Resolved::Prepaid(model) => {
                    if !model.activated {
                        return Err(EngineError::Inactive(model.username));
                    }
                    self.debit_prepaid(&tx, model.id, price, now).await?;
                    let updated = self.require_prepaid_by_username(&tx, &model.username).await?;
                    DrinkReceipt {
                        kind: AccountKind::Prepaid,
                        username: updated.username,
                        money: MoneyCents::new(updated.money),
                        last_drink: updated.last_drink,
                    }
                }
            };

            if let Some(type_id) = drink_type {
                self.tally_drink_type(&tx, type_id).await?;
            }

            Ok(receipt)
        })
    }

    /// Undoes the most recent purchase on the target account.
    ///
    /// Only possible while `last_drink` is younger than
    /// [`REVERT_WINDOW_SECS`]; refunds `price` and clears the stamp so the
    /// same purchase cannot be refunded twice.
    pub async fn revert_last_drink(
        &self,
        principal: Option<&Principal>,
        target: DrinkTarget,
        price: MoneyCents,
    ) -> ResultEngine<MoneyCents> {
        if !price.is_positive() {
            return Err(EngineError::InvalidAmount(
                "drink price must be positive".to_string(),
            ));
        }

        with_tx!(self, |tx| {
            let now = Utc::now();
            match self.resolve_target(&tx, principal, &target).await? {
                Resolved::Postpaid(model) => {
                    check_revert_window(model.last_drink, now)?;
                    let res = postpaid::Entity::update_many()
                        .col_expr(
                            postpaid::Column::Money,
                            Expr::col(postpaid::Column::Money).add(price.cents()),
                        )
                        .col_expr(
                            postpaid::Column::LastDrink,
                            Expr::value(Option::<DateTime<Utc>>::None),
                        )
                        .filter(postpaid::Column::Id.eq(model.id))
                        .exec(&tx)
                        .await?;
                    if res.rows_affected != 1 {
                        return Err(EngineError::KeyNotFound(model.username));
                    }
                    let updated = self.require_postpaid_by_username(&tx, &model.username).await?;
                    Ok(MoneyCents::new(updated.money))
                }
                Resolved::Prepaid(model) => {
                    check_revert_window(model.last_drink, now)?;
                    let res = prepaid::Entity::update_many()
                        .col_expr(
                            prepaid::Column::Money,
                            Expr::col(prepaid::Column::Money).add(price.cents()),
                        )
                        .col_expr(
                            prepaid::Column::LastDrink,
                            Expr::value(Option::<DateTime<Utc>>::None),
                        )
                        .filter(prepaid::Column::Id.eq(model.id))
                        .exec(&tx)
                        .await?;
                    if res.rows_affected != 1 {
                        return Err(EngineError::KeyNotFound(model.username));
                    }
                    let updated = self.require_prepaid_by_username(&tx, &model.username).await?;
                    Ok(MoneyCents::new(updated.money))
                }
            }
        })
    }

    async fn resolve_target<C: ConnectionTrait>(
        &self,
        db: &C,
        principal: Option<&Principal>,
        target: &DrinkTarget,
    ) -> ResultEngine<Resolved> {
        match target {
            DrinkTarget::SelfPostpaid => {
                let principal = self.require_principal(principal)?;
                let username = normalize_username(&principal.username)?;
                let model = self.require_postpaid_by_username(db, &username).await?;
                Ok(Resolved::Postpaid(model))
            }
            DrinkTarget::SelfPrepaid => {
                let principal = self.require_principal(principal)?;
                let username = normalize_username(&principal.username)?;
                let model = self.require_prepaid_by_username(db, &username).await?;
                Ok(Resolved::Prepaid(model))
            }
            DrinkTarget::ByKey(user_key) => {
                let model = self.require_prepaid_by_key(db, user_key).await?;
                Ok(Resolved::Prepaid(model))
            }
        }
    }

    async fn debit_postpaid<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i32,
        price: MoneyCents,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let res = postpaid::Entity::update_many()
            .col_expr(
                postpaid::Column::Money,
                Expr::col(postpaid::Column::Money).sub(price.cents()),
            )
            .col_expr(postpaid::Column::LastDrink, Expr::value(now))
            .filter(postpaid::Column::Id.eq(id))
            .exec(db)
            .await?;
        if res.rows_affected != 1 {
            return Err(EngineError::KeyNotFound("postpaid user".to_string()));
        }
        Ok(())
    }

    async fn debit_prepaid<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i32,
        price: MoneyCents,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let res = prepaid::Entity::update_many()
            .col_expr(
                prepaid::Column::Money,
                Expr::col(prepaid::Column::Money).sub(price.cents()),
            )
            .col_expr(prepaid::Column::LastDrink, Expr::value(now))
            .filter(prepaid::Column::Id.eq(id))
            .exec(db)
            .await?;
        if res.rows_affected != 1 {
            return Err(EngineError::KeyNotFound("prepaid user".to_string()));
        }
        Ok(())
    }

    async fn tally_drink_type<C: ConnectionTrait>(&self, db: &C, type_id: i32) -> ResultEngine<()> {
        let res = drink_types::Entity::update_many()
            .col_expr(
                drink_types::Column::Quantity,
                Expr::col(drink_types::Column::Quantity).sub(1),
            )
            .col_expr(
                drink_types::Column::Consumed,
                Expr::col(drink_types::Column::Consumed).add(1),
            )
            .filter(drink_types::Column::Id.eq(type_id))
            .exec(db)
            .await?;
        if res.rows_affected != 1 {
            return Err(EngineError::KeyNotFound(format!("drink type {type_id}")));
        }
        Ok(())
    }
}

fn check_revert_window(last_drink: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ResultEngine<()> {
    let Some(last) = last_drink else {
        return Err(EngineError::KeyNotFound(
            "no recent drink to revert".to_string(),
        ));
    };
    if now.signed_duration_since(last).num_seconds() > REVERT_WINDOW_SECS {
        return Err(EngineError::KeyNotFound(
            "no recent drink to revert".to_string(),
        ));
    }
    Ok(())
}
