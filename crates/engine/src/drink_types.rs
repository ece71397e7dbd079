//! The drink catalog.
//!
//! Stock and consumption are plain counters on the catalog row; there is no
//! per-purchase history. `quantity` follows the same no-floor policy as the
//! balances, so an uncorrected stocktake simply shows negative stock.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One entry of the drink catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DrinkType {
    pub id: i32,
    pub name: String,
    /// Static asset filename shown at the point of sale.
    pub icon: String,
    /// Remaining stock; decremented on every attributed purchase.
    pub quantity: i32,
    /// Total attributed purchases since the row was created.
    pub consumed: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "drink_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub icon: String,
    pub quantity: i32,
    pub consumed: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DrinkType {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            icon: value.icon,
            quantity: value.quantity,
            consumed: value.consumed,
        }
    }
}
