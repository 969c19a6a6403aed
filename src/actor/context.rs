use super::Actor;

/// Where a request came from. `Internal` marks trusted calls made by the
/// host itself (seed scripts, cross-collection maintenance); those are exempt
/// from ownership scoping. The distinction is an explicit input and is never
/// inferred from a missing actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOrigin {
    External,
    Internal,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor: Option<Actor>,
    pub origin: CallOrigin,
    pub client_ip: Option<String>,
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Context for an external request, authenticated or anonymous.
    pub fn external(actor: Option<Actor>) -> Self {
        Self { actor, origin: CallOrigin::External, client_ip: None, request_id: None }
    }

    /// Context for a trusted internal call carrying no actor.
    pub fn internal() -> Self {
        Self { actor: None, origin: CallOrigin::Internal, client_ip: None, request_id: None }
    }

    pub fn with_client_ip<S: Into<String>>(mut self, ip: S) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn is_internal(&self) -> bool {
        self.origin == CallOrigin::Internal
    }

    pub fn is_admin(&self) -> bool {
        super::is_admin(self.actor())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::external(None)
    }
}
