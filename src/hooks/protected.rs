use tracing::debug;

use super::{HookArgs, WriteOperation};
use crate::doc::Data;

/// Silently revert non-admin changes to protected fields. The rest of the
/// update proceeds untouched; this stage never errors.
pub(super) fn lockdown(fields: &[String], args: &HookArgs, mut data: Data) -> Data {
    if args.operation != WriteOperation::Update || fields.is_empty() {
        return data;
    }
    if args.ctx.is_internal() || args.ctx.is_admin() {
        return data;
    }
    let Some(prior) = args.prior else { return data };
    for field in fields {
        if !data.contains_key(field.as_str()) {
            continue;
        }
        match prior.get(field) {
            Some(stored) => {
                if data.get(field.as_str()) != Some(stored) {
                    debug!(collection = args.collection, field = %field, "reverting protected field change");
                    data.insert(field.clone(), stored.clone());
                }
            }
            // No stored value to fall back to; drop the attempted write.
            None => {
                data.remove(field.as_str());
            }
        }
    }
    data
}

/// Restore immutable fields from the stored document on every update,
/// whatever the payload claims and whoever the actor is.
pub(super) fn restore_immutable(fields: &[String], args: &HookArgs, mut data: Data) -> Data {
    if args.operation != WriteOperation::Update || fields.is_empty() {
        return data;
    }
    let Some(prior) = args.prior else { return data };
    for field in fields {
        match prior.get(field) {
            Some(stored) => {
                data.insert(field.clone(), stored.clone());
            }
            None => {
                data.remove(field.as_str());
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, RequestContext, ADMIN_ROLE};
    use crate::doc::Document;
    use serde_json::{json, Map};

    fn prior() -> Document {
        let mut d = Map::new();
        d.insert("email".into(), json!("old@x.com"));
        d.insert("name".into(), json!("Alice"));
        Document::new("u1", d)
    }

    fn update_args<'a>(ctx: &'a RequestContext, prior: &'a Document) -> HookArgs<'a> {
        HookArgs { operation: WriteOperation::Update, collection: "users", ctx, prior: Some(prior) }
    }

    #[test]
    fn non_admin_change_is_reverted_but_rest_proceeds() {
        let ctx = RequestContext::external(Some(Actor::new("u1")));
        let stored = prior();
        let mut payload = Map::new();
        payload.insert("email".into(), json!("new@x.com"));
        payload.insert("name".into(), json!("Bob"));

        let out = lockdown(&["email".into()], &update_args(&ctx, &stored), payload);
        assert_eq!(out.get("email"), Some(&json!("old@x.com")));
        assert_eq!(out.get("name"), Some(&json!("Bob")));
    }

    #[test]
    fn admin_passes_through() {
        let ctx = RequestContext::external(Some(Actor::new("a1").with_role(ADMIN_ROLE)));
        let stored = prior();
        let mut payload = Map::new();
        payload.insert("email".into(), json!("new@x.com"));

        let out = lockdown(&["email".into()], &update_args(&ctx, &stored), payload);
        assert_eq!(out.get("email"), Some(&json!("new@x.com")));
    }

    #[test]
    fn untouched_fields_are_left_alone() {
        let ctx = RequestContext::external(Some(Actor::new("u1")));
        let stored = prior();
        let mut payload = Map::new();
        payload.insert("name".into(), json!("Bob"));

        let out = lockdown(&["email".into()], &update_args(&ctx, &stored), payload);
        assert!(out.get("email").is_none());
    }

    #[test]
    fn immutable_fields_restore_even_when_payload_omits_them() {
        let ctx = RequestContext::external(Some(Actor::new("u1")));
        let stored = prior();
        let payload = Map::new();

        let out = restore_immutable(&["email".into()], &update_args(&ctx, &stored), payload);
        assert_eq!(out.get("email"), Some(&json!("old@x.com")));
    }
}
