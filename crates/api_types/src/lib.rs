use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the two account collections a request or view refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Postpaid,
    Prepaid,
}

pub mod drink {
    use super::*;

    /// Request body for the drink button.
    ///
    /// Exactly one way of naming the buyer is used: `user_key` (point of
    /// sale, no login) wins over the authenticated caller. `account` picks
    /// which of the caller's own accounts pays; it defaults to postpaid.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DrinkRequest {
        pub user_key: Option<String>,
        pub account: Option<AccountKind>,
        pub drink_type: Option<i32>,
        /// Decimal currency string ("1.50"); defaults to the configured
        /// drink cost.
        pub price: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DrinkReceiptView {
        pub account: AccountKind,
        pub username: String,
        pub money_cents: i64,
        pub money: String,
        pub last_drink: Option<DateTime<Utc>>,
    }

    /// Request body for undoing the most recent purchase.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevertRequest {
        pub user_key: Option<String>,
        pub account: Option<AccountKind>,
        pub price: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevertResponse {
        pub money_cents: i64,
        pub money: String,
    }
}

pub mod postpaid {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostpaidView {
        pub id: i32,
        pub username: String,
        pub money_cents: i64,
        pub money: String,
        pub activated: bool,
        pub last_drink: Option<DateTime<Utc>>,
    }

    /// The caller's own account plus the prepaid accounts it sponsors.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MeResponse {
        pub user: PostpaidView,
        pub prepaid: Vec<super::prepaid::PrepaidView>,
    }

    /// Settlement transfer from the calling administrator to `username`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayUpRequest {
        pub username: String,
        /// Decimal currency string.
        pub amount: String,
    }

    /// Absolute balance override, not a delta.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SetMoneyRequest {
        pub username: String,
        /// Decimal currency string.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ToggleRequest {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ToggleResponse {
        pub username: String,
        pub activated: bool,
    }
}

pub mod prepaid {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PrepaidView {
        pub id: i32,
        pub username: String,
        /// Shown so the owner can hand the key to the guest.
        pub user_key: String,
        pub money_cents: i64,
        pub money: String,
        pub activated: bool,
        pub last_drink: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PrepaidNewRequest {
        pub username: String,
        /// Decimal currency string; defaults to zero.
        pub start_money: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopUpRequest {
        pub username: String,
        /// Decimal currency string.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeleteRequest {
        pub username: String,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DrinkTypeView {
        pub id: i32,
        pub name: String,
        pub icon: String,
        pub quantity: i32,
        pub consumed: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DrinkTypesResponse {
        pub drink_types: Vec<DrinkTypeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DrinkTypeNewRequest {
        pub name: String,
        pub icon: String,
        pub quantity: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SetQuantityRequest {
        pub id: i32,
        pub quantity: i32,
    }
}

pub mod stats {
    use super::*;

    /// The administrative overview: both full ledgers plus the catalog.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatsResponse {
        pub postpaid: Vec<super::postpaid::PostpaidView>,
        pub prepaid: Vec<super::prepaid::PrepaidView>,
        pub drink_types: Vec<super::catalog::DrinkTypeView>,
    }
}
