//! Policy error model shared by access-check callers and the mutation hook
//! pipeline, with a mapper for HTTP frontends. Silent policy corrections
//! (ownership stamping, field reverts) never surface here; only hard denials do.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyError {
    /// No actor on a request that requires one.
    Unauthorized { code: String, message: String },
    /// Actor present but lacks the privilege for the attempted change.
    Forbidden { code: String, message: String },
}

impl PolicyError {
    pub fn code_str(&self) -> &str {
        match self {
            PolicyError::Unauthorized { code, .. } | PolicyError::Forbidden { code, .. } => {
                code.as_str()
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PolicyError::Unauthorized { message, .. } | PolicyError::Forbidden { message, .. } => {
                message.as_str()
            }
        }
    }

    pub fn unauthorized<S: Into<String>>(code: S, msg: S) -> Self {
        PolicyError::Unauthorized { code: code.into(), message: msg.into() }
    }

    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self {
        PolicyError::Forbidden { code: code.into(), message: msg.into() }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            PolicyError::Unauthorized { .. } => 401,
            PolicyError::Forbidden { .. } => 403,
        }
    }
}

impl Display for PolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for PolicyError {}

pub type PolicyResult<T> = Result<T, PolicyError>;
