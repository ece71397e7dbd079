//! Authorization gates and record lookup helpers shared by the operations.
//!
//! Gates run before lookups, lookups run before mutations; a request that
//! fails any of them has not touched the store.

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, Principal, ResultEngine, postpaid, prepaid};

use super::Engine;

impl Engine {
    /// Requires an authenticated caller, of any group.
    pub(super) fn require_principal<'a>(
        &self,
        principal: Option<&'a Principal>,
    ) -> ResultEngine<&'a Principal> {
        principal.ok_or(EngineError::Unauthorized)
    }

    pub(super) fn require_member(&self, principal: &Principal) -> ResultEngine<()> {
        if !self.policy.is_member(principal) {
            return Err(EngineError::Forbidden(
                "membership group required".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) fn require_admin(&self, principal: &Principal) -> ResultEngine<()> {
        if !self.policy.is_admin(principal) {
            return Err(EngineError::Forbidden(
                "administrative group required".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) async fn require_postpaid_by_username<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> ResultEngine<postpaid::Model> {
        postpaid::Entity::find()
            .filter(postpaid::Column::Username.eq(username))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(username.to_string()))
    }

    pub(super) async fn require_prepaid_by_username<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> ResultEngine<prepaid::Model> {
        prepaid::Entity::find()
            .filter(prepaid::Column::Username.eq(username))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(username.to_string()))
    }

    /// Point-of-sale lookup. A retired key of a deleted account is
    /// indistinguishable from an unknown one.
    pub(super) async fn require_prepaid_by_key<C: ConnectionTrait>(
        &self,
        db: &C,
        user_key: &str,
    ) -> ResultEngine<prepaid::Model> {
        prepaid::Entity::find()
            .filter(prepaid::Column::UserKey.eq(user_key))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("unknown key".to_string()))
    }

    /// Looks up a prepaid account the caller may manage: its owner (who must
    /// be a member) or an administrator.
    pub(super) async fn require_prepaid_managed<C: ConnectionTrait>(
        &self,
        db: &C,
        principal: &Principal,
        username: &str,
    ) -> ResultEngine<prepaid::Model> {
        let target = self.require_prepaid_by_username(db, username).await?;
        if self.policy.is_admin(principal) {
            return Ok(target);
        }
        self.require_member(principal)?;
        let owner = self
            .require_postpaid_by_username(db, &principal.username)
            .await?;
        if target.postpaid_user_id != owner.id {
            return Err(EngineError::Forbidden(
                "prepaid user not owned by caller".to_string(),
            ));
        }
        Ok(target)
    }
}
