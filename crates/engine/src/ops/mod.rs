use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{AccessPolicy, EngineError, ResultEngine};

mod access;
mod catalog;
mod drinks;
mod postpaid;
mod prepaid;

pub use drinks::{DrinkReceipt, DrinkTarget};

/// Run a block inside a DB transaction, committing on success.
///
/// An early error return drops the transaction, which rolls it back, so a
/// failing multi-record operation leaves no partial writes behind.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Which of the two account collections an operation addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountKind {
    Postpaid,
    Prepaid,
}

/// The ledger core.
///
/// Holds the injected store handle and the group policy; every public
/// method checks authorization and existence before mutating anything and
/// runs its mutations inside a single store transaction.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    policy: AccessPolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }
}

/// Trim and NFC-normalize a username so lookups behave the same for every
/// input source.
fn normalize_username(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(
            "username must not be empty".to_string(),
        ));
    }
    Ok(trimmed.nfc().collect())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    policy: AccessPolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the default group names.
    pub fn policy(mut self, policy: AccessPolicy) -> EngineBuilder {
        self.policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            policy: self.policy,
        })
    }
}
