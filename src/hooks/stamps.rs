use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use xxhash_rust::xxh3::xxh3_64;

use super::{HookArgs, WriteOperation};
use crate::doc::Data;

/// Stamp createdAt/updatedAt. Creation time survives whatever the update
/// payload claims; a legacy document without one stays without one.
pub(super) fn timestamps(args: &HookArgs, mut data: Data) -> Data {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    match args.operation {
        WriteOperation::Create => {
            data.insert("createdAt".to_string(), json!(now));
            data.insert("updatedAt".to_string(), json!(now));
        }
        WriteOperation::Update => {
            match args.prior.and_then(|d| d.get("createdAt")) {
                Some(stored) => {
                    data.insert("createdAt".to_string(), stored.clone());
                }
                None => {
                    data.remove("createdAt");
                }
            }
            data.insert("updatedAt".to_string(), json!(now));
        }
    }
    data
}

/// Salted fingerprint of the client address, so anonymous submissions can be
/// rate-limited and threaded without storing the address itself.
pub fn anonymous_fingerprint(salt: &str, client_ip: &str) -> String {
    format!("{:016x}", xxh3_64(format!("{}:{}", salt, client_ip).as_bytes()))
}

/// Attribute creates: actor-bearing requests clear the fingerprint field,
/// anonymous ones get a salted client fingerprint. Updates keep whatever was
/// stored, whatever the payload claims.
pub(super) fn attribution(field: &str, salt: &str, args: &HookArgs, mut data: Data) -> Data {
    match args.operation {
        WriteOperation::Update => {
            let stored =
                args.prior.and_then(|d| d.get(field)).cloned().unwrap_or(Value::Null);
            data.insert(field.to_string(), stored);
        }
        WriteOperation::Create => {
            if args.ctx.actor().is_some() {
                data.insert(field.to_string(), Value::Null);
            } else {
                let ip = args.ctx.client_ip.as_deref().unwrap_or("unknown");
                data.insert(field.to_string(), json!(anonymous_fingerprint(salt, ip)));
            }
        }
    }
    data
}
