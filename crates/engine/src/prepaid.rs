//! Prepaid guest accounts.
//!
//! A prepaid account is a pre-funded sub-account owned by exactly one
//! postpaid member. At the point of sale it is identified by `user_key`, a
//! secret token, so no login is needed to press the drink button.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::MoneyCents;

/// A prepaid guest account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrepaidUser {
    /// Store-assigned identifier; immutable once created.
    pub id: i32,
    /// Unique among prepaid accounts; immutable once created.
    pub username: String,
    /// Point-of-sale secret. Globally unique and never reassigned, not even
    /// after the account is deleted.
    pub user_key: String,
    /// The owning postpaid account.
    pub postpaid_user_id: i32,
    pub money: MoneyCents,
    pub activated: bool,
    pub last_drink: Option<DateTime<Utc>>,
}

/// Generates a fresh point-of-sale key: 16 random bytes, URL-safe base64,
/// 22 characters. Uniqueness against live and retired keys is checked at
/// insert time.
pub(crate) fn generate_user_key() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users_prepaid")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub user_key: String,
    pub postpaid_user_id: i32,
    pub money: i64,
    pub activated: bool,
    pub last_drink: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::postpaid::Entity",
        from = "Column::PostpaidUserId",
        to = "super::postpaid::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Postpaid,
}

impl Related<super::postpaid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postpaid.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PrepaidUser {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            username: value.username,
            user_key: value.user_key,
            postpaid_user_id: value.postpaid_user_id,
            money: MoneyCents::new(value.money),
            activated: value.activated,
            last_drink: value.last_drink,
        }
    }
}
