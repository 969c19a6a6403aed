use serde_json::json;
use tracing::{debug, warn};

use crate::access::Filter;
use crate::actor::{ADMIN_ROLE, ROLES_FIELD};
use crate::config::PolicyConfig;
use crate::doc::Data;
use crate::store::DocumentStore;

/// The first account ever created becomes the admin; every later signup is
/// left untouched. The emptiness probe is a snapshot read, so two racing
/// first signups are resolved by whichever commit the host store accepts
/// first.
pub(super) fn promote_first_actor(
    cfg: &PolicyConfig,
    store: &dyn DocumentStore,
    mut data: Data,
) -> Data {
    match store.find(&cfg.actor_collection, &Filter::MatchAll, 1) {
        Ok(existing) if existing.total_docs == 0 => {
            debug!(collection = %cfg.actor_collection, "promoting first account to admin");
            data.insert(ROLES_FIELD.to_string(), json!([ADMIN_ROLE]));
            data
        }
        Ok(_) => data,
        Err(e) => {
            warn!(error = %e, "account census failed; skipping bootstrap promotion");
            data
        }
    }
}
