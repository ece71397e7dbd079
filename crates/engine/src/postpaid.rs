//! Postpaid member accounts.
//!
//! A postpaid account belongs to a member who settles debt after the fact:
//! the balance runs negative with every drink and is brought back up by an
//! administrator settlement. There is deliberately no overdraft floor.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::MoneyCents;

/// A postpaid member account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostpaidUser {
    /// Store-assigned identifier; immutable once created.
    pub id: i32,
    /// Unique login name; immutable once created.
    pub username: String,
    pub money: MoneyCents,
    /// Deactivated accounts keep their balance but cannot buy drinks.
    pub activated: bool,
    pub last_drink: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users_postpaid")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub money: i64,
    pub activated: bool,
    pub last_drink: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::prepaid::Entity")]
    Prepaid,
}

impl Related<super::prepaid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prepaid.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PostpaidUser {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            username: value.username,
            money: MoneyCents::new(value.money),
            activated: value.activated,
            last_drink: value.last_drink,
        }
    }
}
