use anyhow::{anyhow, Result};
use serde_json::json;

use super::{HookArgs, WriteOperation};
use crate::actor::RequestContext;
use crate::config::PolicyConfig;
use crate::doc::{relation_id_list, relation_ids, Data};
use crate::error::{PolicyError, PolicyResult};
use crate::store::DocumentStore;

/// Guard a many-valued membership relation: non-admins may only add or
/// remove themselves.
///
/// Violations abort the whole mutation rather than being trimmed silently.
/// A partial correction here would let an actor smuggle other actors'
/// membership changes through under the guise of their own.
pub(super) fn guard(field: &str, args: &HookArgs, data: &Data) -> PolicyResult<()> {
    if args.operation != WriteOperation::Update {
        return Ok(());
    }
    let Some(actor) = args.ctx.actor() else { return Ok(()) };
    if actor.is_admin() {
        return Ok(());
    }
    // Field not included in this update: nothing to validate.
    if !data.contains_key(field) {
        return Ok(());
    }

    let old_ids = relation_ids(args.prior.and_then(|d| d.get(field)));
    let new_ids = relation_ids(data.get(field));

    let added = new_ids.difference(&old_ids);
    let removed = old_ids.difference(&new_ids);
    if added.chain(removed).any(|id| id != &actor.id) {
        return Err(PolicyError::forbidden(
            "membership_self_only",
            "You can only add or remove yourself from involved users.",
        ));
    }
    Ok(())
}

/// Outcome of a self-service membership operation.
#[derive(Debug, Clone, PartialEq)]
pub enum MembershipChange {
    AlreadyMember,
    NotMember,
    /// Update payload with the new membership list, to be routed through the
    /// normal mutation pipeline by the host.
    Updated(Data),
}

fn membership_field<'a>(cfg: &'a PolicyConfig, collection: &str) -> Result<&'a str> {
    cfg.collection(collection)
        .membership_field
        .as_deref()
        .ok_or_else(|| anyhow!("collection {} has no membership relation", collection))
}

/// Add the current actor to a document's membership list.
pub fn join(
    cfg: &PolicyConfig,
    store: &dyn DocumentStore,
    ctx: &RequestContext,
    collection: &str,
    doc_id: &str,
) -> Result<MembershipChange> {
    let actor = ctx
        .actor()
        .ok_or_else(|| PolicyError::unauthorized("login_required", "You must be logged in."))?;
    let field = membership_field(cfg, collection)?;
    let doc = store.find_by_id(collection, doc_id)?;

    let mut ids = relation_id_list(doc.get(field));
    if ids.iter().any(|id| id == &actor.id) {
        return Ok(MembershipChange::AlreadyMember);
    }
    ids.push(actor.id.clone());

    let mut data = Data::new();
    data.insert(field.to_string(), json!(ids));
    Ok(MembershipChange::Updated(data))
}

/// Remove the current actor from a document's membership list.
pub fn leave(
    cfg: &PolicyConfig,
    store: &dyn DocumentStore,
    ctx: &RequestContext,
    collection: &str,
    doc_id: &str,
) -> Result<MembershipChange> {
    let actor = ctx
        .actor()
        .ok_or_else(|| PolicyError::unauthorized("login_required", "You must be logged in."))?;
    let field = membership_field(cfg, collection)?;
    let doc = store.find_by_id(collection, doc_id)?;

    let ids = relation_id_list(doc.get(field));
    if !ids.iter().any(|id| id == &actor.id) {
        return Ok(MembershipChange::NotMember);
    }
    let remaining: Vec<String> = ids.into_iter().filter(|id| id != &actor.id).collect();

    let mut data = Data::new();
    data.insert(field.to_string(), json!(remaining));
    Ok(MembershipChange::Updated(data))
}
