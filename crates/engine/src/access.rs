//! Group-based access policy.
//!
//! Authorization is a pure predicate over the principal's group set; there
//! is no role hierarchy beyond "the admin group implies the member group".

use std::collections::HashSet;

/// An authenticated caller as reported by the identity layer.
///
/// The engine never authenticates anybody itself; it trusts the username
/// and group memberships handed to it and only decides what they may do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub groups: HashSet<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>, groups: impl IntoIterator<Item = String>) -> Self {
        Self {
            username: username.into(),
            groups: groups.into_iter().collect(),
        }
    }
}

/// Names of the two recognized groups.
///
/// The names are deployment configuration (they must match whatever the
/// identity provider emits), so they are injected rather than hard-coded.
#[derive(Clone, Debug)]
pub struct AccessPolicy {
    member_group: String,
    admin_group: String,
}

impl AccessPolicy {
    pub fn new(member_group: impl Into<String>, admin_group: impl Into<String>) -> Self {
        Self {
            member_group: member_group.into(),
            admin_group: admin_group.into(),
        }
    }

    /// Membership in the administrative group.
    pub fn is_admin(&self, principal: &Principal) -> bool {
        principal.groups.contains(&self.admin_group)
    }

    /// Membership in the general group. Admins qualify as members.
    pub fn is_member(&self, principal: &Principal) -> bool {
        principal.groups.contains(&self.member_group) || self.is_admin(principal)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new("members", "admins")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(groups: &[&str]) -> Principal {
        Principal::new("alice", groups.iter().map(|g| g.to_string()))
    }

    #[test]
    fn member_group_grants_membership_only() {
        let policy = AccessPolicy::default();
        let p = principal(&["members"]);
        assert!(policy.is_member(&p));
        assert!(!policy.is_admin(&p));
    }

    #[test]
    fn admin_group_implies_membership() {
        let policy = AccessPolicy::default();
        let p = principal(&["admins"]);
        assert!(policy.is_member(&p));
        assert!(policy.is_admin(&p));
    }

    #[test]
    fn unrelated_groups_grant_nothing() {
        let policy = AccessPolicy::default();
        let p = principal(&["board", "kitchen"]);
        assert!(!policy.is_member(&p));
        assert!(!policy.is_admin(&p));
    }

    #[test]
    fn group_names_come_from_configuration() {
        let policy = AccessPolicy::new("drinkers", "kasse-admins");
        assert!(policy.is_member(&principal(&["drinkers"])));
        assert!(!policy.is_member(&principal(&["members"])));
        assert!(policy.is_admin(&principal(&["kasse-admins"])));
    }
}
