//! Policy configuration, passed in at construction time.
//!
//! Nothing here is read from ambient global state: hosts build one
//! [`PolicyConfig`] and hand it to the evaluator and the hook pipeline, which
//! keeps the policy core independently testable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::access::AccessRule;

pub const DEFAULT_OWNERSHIP_FIELD: &str = "createdBy";
pub const DEFAULT_STATUS_FIELD: &str = "_status";
pub const DEFAULT_PUBLISHED_VALUE: &str = "published";
pub const DEFAULT_ATTRIBUTION_FIELD: &str = "anonymousHash";
pub const DEFAULT_ACTOR_COLLECTION: &str = "users";

/// One access rule per operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessRules {
    pub create: AccessRule,
    pub read: AccessRule,
    pub update: AccessRule,
    pub delete: AccessRule,
}

impl Default for AccessRules {
    // Directory-collection defaults: publicly readable, writable by the
    // owner or an admin, creatable by any authenticated actor.
    fn default() -> Self {
        Self {
            create: AccessRule::Authenticated,
            read: AccessRule::Anyone,
            update: AccessRule::OwnedOrAdmin,
            delete: AccessRule::OwnedOrAdmin,
        }
    }
}

/// Denormalized copy of a field on a referenced parent document, recomputed
/// when the reference changes and retained otherwise. A cache for cheap
/// filtering without a join; never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DenormRule {
    /// Relation field on this collection pointing at the parent.
    pub parent_field: String,
    /// Collection the parent lives in.
    pub parent_collection: String,
    /// Field on the parent to copy.
    pub source_field: String,
    /// Field on this collection receiving the copy.
    pub target_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionPolicy {
    #[serde(default)]
    pub access: AccessRules,
    /// Stamp and heal the immutable creator reference.
    #[serde(default = "yes")]
    pub ownership: bool,
    /// Stamp createdAt/updatedAt.
    #[serde(default = "yes")]
    pub timestamps: bool,
    /// Fields non-admin updates are silently reverted on.
    #[serde(default)]
    pub protected_fields: Vec<String>,
    /// Fields restored from the stored document on every update.
    #[serde(default)]
    pub immutable_fields: Vec<String>,
    /// Many-valued relation field non-admins may only add/remove themselves on.
    #[serde(default)]
    pub membership_field: Option<String>,
    /// Require a verified email to move the status field to published.
    #[serde(default)]
    pub publish_gate: bool,
    /// Fingerprint anonymous creates instead of attributing them.
    #[serde(default)]
    pub attribution: bool,
    #[serde(default)]
    pub denorm: Vec<DenormRule>,
}

fn yes() -> bool {
    true
}

impl Default for CollectionPolicy {
    fn default() -> Self {
        Self {
            access: AccessRules::default(),
            ownership: true,
            timestamps: true,
            protected_fields: Vec::new(),
            immutable_fields: Vec::new(),
            membership_field: None,
            publish_gate: false,
            attribution: false,
            denorm: Vec::new(),
        }
    }
}

impl CollectionPolicy {
    /// Policy for the actor collection itself: open self-registration,
    /// records visible and editable only to their subject or an admin,
    /// contact and role fields locked to admins. Actor records are the
    /// ownership root and carry no creator reference of their own.
    pub fn actor_collection() -> Self {
        Self {
            access: AccessRules {
                create: AccessRule::Anyone,
                read: AccessRule::AdminOrSelf,
                update: AccessRule::AdminOrSelf,
                delete: AccessRule::AdminOrSelf,
            },
            ownership: false,
            protected_fields: vec![
                "email".to_string(),
                "emailVerified".to_string(),
                "roles".to_string(),
            ],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    /// Collection holding actor records; drives bootstrap promotion.
    pub actor_collection: String,
    pub ownership_field: String,
    pub status_field: String,
    pub published_value: String,
    pub attribution_field: String,
    #[serde(default)]
    pub attribution_salt: String,
    #[serde(default)]
    pub collections: HashMap<String, CollectionPolicy>,
    /// Applied to collections with no explicit entry.
    #[serde(default)]
    pub default_policy: CollectionPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let mut collections = HashMap::new();
        collections
            .insert(DEFAULT_ACTOR_COLLECTION.to_string(), CollectionPolicy::actor_collection());
        Self {
            actor_collection: DEFAULT_ACTOR_COLLECTION.to_string(),
            ownership_field: DEFAULT_OWNERSHIP_FIELD.to_string(),
            status_field: DEFAULT_STATUS_FIELD.to_string(),
            published_value: DEFAULT_PUBLISHED_VALUE.to_string(),
            attribution_field: DEFAULT_ATTRIBUTION_FIELD.to_string(),
            attribution_salt: String::new(),
            collections,
            default_policy: CollectionPolicy::default(),
        }
    }
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection<S: Into<String>>(mut self, name: S, policy: CollectionPolicy) -> Self {
        self.collections.insert(name.into(), policy);
        self
    }

    pub fn with_attribution_salt<S: Into<String>>(mut self, salt: S) -> Self {
        self.attribution_salt = salt.into();
        self
    }

    pub fn collection(&self, name: &str) -> &CollectionPolicy {
        self.collections.get(name).unwrap_or(&self.default_policy)
    }
}
