use super::HookArgs;
use crate::doc::Data;
use crate::error::{PolicyError, PolicyResult};

/// Block moving the status field to the published value unless the actor has
/// a verified email. Actor-less calls (trusted internal paths) and admins
/// bypass; transitions that do not target the published state are ignored.
pub(super) fn gate(
    status_field: &str,
    published_value: &str,
    args: &HookArgs,
    data: &Data,
) -> PolicyResult<()> {
    let Some(actor) = args.ctx.actor() else { return Ok(()) };
    if actor.is_admin() {
        return Ok(());
    }
    let requested = data.get(status_field).and_then(|v| v.as_str());
    if requested != Some(published_value) {
        return Ok(());
    }
    if !actor.email_verified {
        return Err(PolicyError::forbidden(
            "email_unverified",
            "You must verify your email before publishing.",
        ));
    }
    Ok(())
}
