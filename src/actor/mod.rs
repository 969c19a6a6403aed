//! Actor model and per-request context for policy evaluation.
//! Keep the public surface thin and split implementation across sub-modules.

mod model;
mod context;
mod record;

pub use model::{is_admin, Actor, ADMIN_ROLE, ROLES_FIELD};
pub use context::{CallOrigin, RequestContext};
pub use record::{actor_from_record, ActorRecord};
