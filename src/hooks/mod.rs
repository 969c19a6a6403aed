//! Ordered before-change pipeline enforcing the mutation invariants.
//!
//! Stage order matters: the publish gate runs last so no earlier stage's
//! output can be altered after it is checked, and bootstrap promotion runs
//! first so ownership and timestamps see the final role set. Stages either
//! adjust the payload silently or abort the whole mutation with a typed
//! error; there is no partial failure.

mod bootstrap;
mod denorm;
mod membership;
mod ownership;
mod protected;
mod publish;
mod stamps;

pub use membership::{join, leave, MembershipChange};
pub use stamps::anonymous_fingerprint;

use crate::actor::RequestContext;
use crate::config::PolicyConfig;
use crate::doc::{Data, Document};
use crate::error::PolicyResult;
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
}

/// Everything a stage may look at. `prior` is the stored document on updates.
pub struct HookArgs<'a> {
    pub operation: WriteOperation,
    pub collection: &'a str,
    pub ctx: &'a RequestContext,
    pub prior: Option<&'a Document>,
}

/// Run the full pipeline over a proposed mutation and return the payload the
/// host should commit. Hard failures abort with `Forbidden`/`Unauthorized`
/// and leave no partial effect; committing is the host's responsibility and
/// must be all-or-nothing.
pub fn run_before_change(
    cfg: &PolicyConfig,
    store: &dyn DocumentStore,
    ctx: &RequestContext,
    collection: &str,
    operation: WriteOperation,
    mut data: Data,
    prior: Option<&Document>,
) -> PolicyResult<Data> {
    let policy = cfg.collection(collection);
    let args = HookArgs { operation, collection, ctx, prior };

    if collection == cfg.actor_collection && operation == WriteOperation::Create {
        data = bootstrap::promote_first_actor(cfg, store, data);
    }
    if policy.ownership {
        data = ownership::stamp(&cfg.ownership_field, &args, data);
    }
    if policy.timestamps {
        data = stamps::timestamps(&args, data);
    }
    if policy.attribution {
        data = stamps::attribution(&cfg.attribution_field, &cfg.attribution_salt, &args, data);
    }
    data = protected::restore_immutable(&policy.immutable_fields, &args, data);
    data = protected::lockdown(&policy.protected_fields, &args, data);
    if let Some(field) = policy.membership_field.as_deref() {
        membership::guard(field, &args, &data)?;
    }
    for rule in &policy.denorm {
        data = denorm::sync(rule, store, &args, data);
    }
    if policy.publish_gate {
        publish::gate(&cfg.status_field, &cfg.published_value, &args, &data)?;
    }
    Ok(data)
}
