use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Role tag granting unconditional access everywhere.
pub const ADMIN_ROLE: &str = "admin";

/// Field on actor records holding the canonical role set.
pub const ROLES_FIELD: &str = "roles";

/// The authenticated caller. An absent `Actor` (anonymous request) is a
/// different state from an actor with an empty role set: anonymity denies
/// all owner/admin-gated operations outright.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl Actor {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn with_role<S: Into<String>>(mut self, role: S) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn verified(mut self) -> Self {
        self.email_verified = true;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(ADMIN_ROLE)
    }
}

/// Admin existence check over an optional actor. Anonymous requests are never admin.
pub fn is_admin(actor: Option<&Actor>) -> bool {
    actor.map(|a| a.is_admin()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_role_set_is_not_admin() {
        assert!(!Actor::new("u1").is_admin());
        assert!(Actor::new("u1").with_role(ADMIN_ROLE).is_admin());
        assert!(!is_admin(None));
        assert!(is_admin(Some(&Actor::new("u1").with_role("admin"))));
    }
}
