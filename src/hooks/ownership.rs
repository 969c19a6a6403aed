use serde_json::Value;
use tracing::debug;

use super::{HookArgs, WriteOperation};
use crate::doc::{relation_id, Data};

/// Stamp the immutable creator reference.
///
/// Create attributes the document to the current actor (null for actor-less
/// calls). Update keeps the stored value whatever the payload requests; a
/// legacy document lacking one is backfilled once with the current actor and
/// never reassigned afterwards.
pub(super) fn stamp(field: &str, args: &HookArgs, mut data: Data) -> Data {
    let actor_id = args.ctx.actor().map(|a| a.id.clone());
    let next = match args.operation {
        WriteOperation::Create => actor_id.map(Value::String).unwrap_or(Value::Null),
        WriteOperation::Update => {
            let stored = args.prior.and_then(|d| d.get(field)).and_then(relation_id);
            match stored {
                Some(owner) => Value::String(owner),
                None => match actor_id {
                    Some(id) => {
                        debug!(
                            collection = args.collection,
                            owner = %id,
                            "backfilling missing creator reference"
                        );
                        Value::String(id)
                    }
                    None => Value::Null,
                },
            }
        }
    };
    data.insert(field.to_string(), next);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, RequestContext};
    use serde_json::{json, Map};
    use crate::doc::Document;

    fn args<'a>(
        op: WriteOperation,
        ctx: &'a RequestContext,
        prior: Option<&'a Document>,
    ) -> HookArgs<'a> {
        HookArgs { operation: op, collection: "jobs", ctx, prior }
    }

    #[test]
    fn update_never_reassigns_an_existing_owner() {
        let ctx = RequestContext::external(Some(Actor::new("u2")));
        let mut prior_data = Map::new();
        prior_data.insert("createdBy".into(), json!("u1"));
        let prior = Document::new("d1", prior_data);

        // payload tries to steal the document
        let mut payload = Map::new();
        payload.insert("createdBy".into(), json!("u2"));

        let out = stamp("createdBy", &args(WriteOperation::Update, &ctx, Some(&prior)), payload);
        assert_eq!(out.get("createdBy"), Some(&json!("u1")));
    }

    #[test]
    fn stamping_is_idempotent() {
        let ctx = RequestContext::external(Some(Actor::new("u1")));
        let once = stamp("createdBy", &args(WriteOperation::Create, &ctx, None), Map::new());
        let prior = Document::new("d1", once.clone());
        let twice = stamp(
            "createdBy",
            &args(WriteOperation::Update, &ctx, Some(&prior)),
            once.clone(),
        );
        assert_eq!(once.get("createdBy"), twice.get("createdBy"));
    }

    #[test]
    fn actorless_create_stamps_null() {
        let ctx = RequestContext::internal();
        let out = stamp("createdBy", &args(WriteOperation::Create, &ctx, None), Map::new());
        assert_eq!(out.get("createdBy"), Some(&Value::Null));
    }
}
