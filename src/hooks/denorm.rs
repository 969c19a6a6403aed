use serde_json::Value;
use tracing::warn;

use super::{HookArgs, WriteOperation};
use crate::config::DenormRule;
use crate::doc::{relation_id, Data};
use crate::store::DocumentStore;

/// Keep a denormalized copy of a field on the referenced parent document.
///
/// The copy exists so listings can filter by the parent's identity without a
/// join. It is a cache, not an authoritative value: recomputation is skipped
/// when the parent reference is unchanged and a value already exists, and a
/// failed parent lookup degrades to null instead of failing the mutation.
/// Anything needing fresh data must re-resolve from the parent.
pub(super) fn sync(
    rule: &DenormRule,
    store: &dyn DocumentStore,
    args: &HookArgs,
    mut data: Data,
) -> Data {
    // A null in the payload falls back to the stored reference, same as an
    // absent key; required relation fields cannot be cleared this way.
    let parent_ref = data
        .get(rule.parent_field.as_str())
        .filter(|v| !v.is_null())
        .cloned()
        .or_else(|| args.prior.and_then(|d| d.get(&rule.parent_field)).cloned());
    let Some(parent_id) = parent_ref.as_ref().and_then(relation_id) else {
        data.insert(rule.target_field.clone(), Value::Null);
        return data;
    };

    let prior_value = args
        .prior
        .and_then(|d| d.get(&rule.target_field))
        .filter(|v| !v.is_null())
        .cloned();
    let recalculate = args.operation == WriteOperation::Create
        || data.contains_key(rule.parent_field.as_str())
        || prior_value.is_none();
    if !recalculate {
        data.insert(rule.target_field.clone(), prior_value.unwrap_or(Value::Null));
        return data;
    }

    let value = match store.find_by_id(&rule.parent_collection, &parent_id) {
        Ok(parent) => parent
            .get(&rule.source_field)
            .and_then(relation_id)
            .map(Value::String)
            .unwrap_or(Value::Null),
        Err(e) => {
            warn!(
                collection = args.collection,
                parent = %parent_id,
                error = %e,
                "parent lookup failed; clearing denormalized value"
            );
            Value::Null
        }
    };
    data.insert(rule.target_field.clone(), value);
    data
}
