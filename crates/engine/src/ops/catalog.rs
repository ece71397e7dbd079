//! Drink catalog reads and stock management.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{DrinkType, EngineError, Principal, ResultEngine, drink_types};

use super::{Engine, with_tx};

impl Engine {
    /// The catalog in insertion order. Public: the point of sale shows it
    /// before anybody logs in.
    pub async fn list_drink_types(&self) -> ResultEngine<Vec<DrinkType>> {
        let models = drink_types::Entity::find()
            .order_by_asc(drink_types::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Adds a catalog entry. Administrators only.
    pub async fn add_drink_type(
        &self,
        principal: &Principal,
        name: &str,
        icon: &str,
        quantity: i32,
    ) -> ResultEngine<DrinkType> {
        self.require_admin(principal)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidAmount(
                "drink name must not be empty".to_string(),
            ));
        }
        with_tx!(self, |tx| {
            let taken = drink_types::Entity::find()
                .filter(drink_types::Column::Name.eq(name))
                .one(&tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(name.to_string()));
            }

            let model = drink_types::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.to_string()),
                icon: ActiveValue::Set(icon.to_string()),
                quantity: ActiveValue::Set(quantity),
                consumed: ActiveValue::Set(0),
            }
            .insert(&tx)
            .await?;
            Ok(model.into())
        })
    }

    /// Sets the remaining stock after a stocktake. Administrators only.
    pub async fn set_drink_type_quantity(
        &self,
        principal: &Principal,
        id: i32,
        quantity: i32,
    ) -> ResultEngine<DrinkType> {
        self.require_admin(principal)?;
        with_tx!(self, |tx| {
            let model = drink_types::Entity::find_by_id(id)
                .one(&tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("drink type {id}")))?;
            let mut active: drink_types::ActiveModel = model.into();
            active.quantity = ActiveValue::Set(quantity);
            let updated = active.update(&tx).await?;
            Ok(updated.into())
        })
    }
}
