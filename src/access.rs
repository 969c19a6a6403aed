//! Access predicates producing allow/deny/filter results.
//!
//! The same result is used two ways: as a collection-level access check and
//! as a relationship query filter, so a foreign-key picker only lists
//! documents the actor owns. Evaluation never errors; `Deny` (or a
//! nothing-matching filter) is the sole failure signal.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::actor::{Actor, RequestContext};
use crate::config::PolicyConfig;
use crate::doc::{relation_id, Document};

/// Declarative document filter the store can AND into its query.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    MatchAll,
    MatchNone,
    Equals { field: String, value: Value },
}

impl Filter {
    pub fn equals<S: Into<String>>(field: S, value: Value) -> Self {
        Filter::Equals { field: field.into(), value }
    }

    /// Point check against a single document. The `id` field is resolved
    /// against the document id itself, everything else against its data.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::MatchAll => true,
            Filter::MatchNone => false,
            Filter::Equals { field, value } => {
                if field == "id" {
                    return relation_id(value).as_deref() == Some(doc.id.as_str());
                }
                doc.get(field).map(|stored| value_eq(stored, value)).unwrap_or(false)
            }
        }
    }

    /// Where-clause shape understood by the store collaborator:
    /// `true` (no restriction), `false` (match nothing), or
    /// `{"field": {"equals": value}}`.
    pub fn to_where(&self) -> Value {
        match self {
            Filter::MatchAll => json!(true),
            Filter::MatchNone => json!(false),
            Filter::Equals { field, value } => {
                let mut eq = serde_json::Map::new();
                eq.insert("equals".to_string(), value.clone());
                let mut clause = serde_json::Map::new();
                clause.insert(field.clone(), Value::Object(eq));
                Value::Object(clause)
            }
        }
    }
}

// Stored relation values may be populated objects while the filter carries a
// bare id; compare through the id coercion when direct equality misses.
fn value_eq(stored: &Value, wanted: &Value) -> bool {
    if stored == wanted {
        return true;
    }
    match (relation_id(stored), relation_id(wanted)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessResult {
    /// Operation entirely disallowed.
    Deny,
    /// Operation allowed on any matching document.
    AllowAll,
    /// Operation allowed on the document set intersected with the filter.
    AllowFiltered(Filter),
}

impl AccessResult {
    /// Whether the operation may touch this specific document.
    pub fn allows(&self, doc: &Document) -> bool {
        match self {
            AccessResult::Deny => false,
            AccessResult::AllowAll => true,
            AccessResult::AllowFiltered(f) => f.matches(doc),
        }
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, AccessResult::Deny)
    }

    /// Tri-state value for the store collaborator: `true`, `false`, or a
    /// where clause to AND into the query.
    pub fn to_value(&self) -> Value {
        match self {
            AccessResult::Deny => json!(false),
            AccessResult::AllowAll => json!(true),
            AccessResult::AllowFiltered(f) => f.to_where(),
        }
    }
}

/// Owner-or-admin collection access: admins see everything, everyone else
/// only documents they created, anonymous requests nothing.
pub fn owned_docs_or_admin(actor: Option<&Actor>, ownership_field: &str) -> AccessResult {
    let Some(user) = actor else { return AccessResult::Deny };
    if user.is_admin() {
        return AccessResult::AllowAll;
    }
    AccessResult::AllowFiltered(Filter::equals(ownership_field, json!(user.id)))
}

/// Self-or-admin access over the actor collection itself, scoped by record id.
pub fn admin_or_self(actor: Option<&Actor>) -> AccessResult {
    let Some(user) = actor else { return AccessResult::Deny };
    if user.is_admin() {
        return AccessResult::AllowAll;
    }
    AccessResult::AllowFiltered(Filter::equals("id", json!(user.id)))
}

/// The ownership filter reused for relationship pickers. Trusted internal
/// calls are not subject to ownership scoping and match everything; an
/// external request without an actor matches nothing.
pub fn ownership_relation_filter(ctx: &RequestContext, ownership_field: &str) -> Filter {
    if ctx.is_internal() {
        return Filter::MatchAll;
    }
    match ctx.actor() {
        None => Filter::MatchNone,
        Some(a) if a.is_admin() => Filter::MatchAll,
        Some(a) => Filter::equals(ownership_field, json!(a.id)),
    }
}

/// Operation being authorized against a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Per-operation rule selection used by collection policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    Anyone,
    Authenticated,
    AdminOrSelf,
    OwnedOrAdmin,
    AdminOnly,
}

impl AccessRule {
    pub fn evaluate(&self, actor: Option<&Actor>, ownership_field: &str) -> AccessResult {
        match self {
            AccessRule::Anyone => AccessResult::AllowAll,
            AccessRule::Authenticated => {
                if actor.is_some() {
                    AccessResult::AllowAll
                } else {
                    AccessResult::Deny
                }
            }
            AccessRule::AdminOrSelf => admin_or_self(actor),
            AccessRule::OwnedOrAdmin => owned_docs_or_admin(actor, ownership_field),
            AccessRule::AdminOnly => {
                if crate::actor::is_admin(actor) {
                    AccessResult::AllowAll
                } else {
                    AccessResult::Deny
                }
            }
        }
    }
}

/// Authorize an operation against a collection's configured rules.
/// Internal calls bypass collection access entirely.
pub fn authorize(
    cfg: &PolicyConfig,
    ctx: &RequestContext,
    collection: &str,
    op: Operation,
) -> AccessResult {
    if ctx.is_internal() {
        return AccessResult::AllowAll;
    }
    let rules = &cfg.collection(collection).access;
    let rule = match op {
        Operation::Create => rules.create,
        Operation::Read => rules.read,
        Operation::Update => rules.update,
        Operation::Delete => rules.delete,
    };
    rule.evaluate(ctx.actor(), &cfg.ownership_field)
}
