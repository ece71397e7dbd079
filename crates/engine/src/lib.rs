pub use access::{AccessPolicy, Principal};
pub use drink_types::DrinkType;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{AccountKind, DrinkReceipt, DrinkTarget, Engine, EngineBuilder};
pub use postpaid::PostpaidUser;
pub use prepaid::PrepaidUser;

mod access;
mod drink_types;
mod error;
mod money;
mod ops;
mod postpaid;
mod prepaid;
mod retired_keys;

pub(crate) type ResultEngine<T> = Result<T, EngineError>;

/// Price charged for a drink when the caller does not say otherwise.
pub const DEFAULT_DRINK_COST: MoneyCents = MoneyCents::new(100);

/// How long after a purchase it can still be undone.
pub const REVERT_WINDOW_SECS: i64 = 60;
