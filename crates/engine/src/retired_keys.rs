//! Graveyard of point-of-sale keys.
//!
//! When a prepaid account is deleted its `user_key` is parked here, and key
//! generation checks the table, so a key observed in the wild can never
//! start identifying a different account later.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "retired_keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_key: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
