use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

use super::model::{Actor, ADMIN_ROLE};
use crate::doc::relation_id;

/// Raw actor record as loaded from the external account store.
///
/// The record format drifted over time: the oldest records carry the admin
/// bit as a boolean `isAdmin`, later ones a singular `role` array, current
/// ones a `roles` array. All shapes are accepted here and unified into one
/// role set so downstream policy code never sees the representation.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorRecord {
    pub id: Value,
    #[serde(default, rename = "isAdmin")]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub role: Option<Vec<String>>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default, rename = "emailVerified")]
    pub email_verified: Option<bool>,
}

impl ActorRecord {
    pub fn into_actor(self) -> Result<Actor> {
        let id = relation_id(&self.id).ok_or_else(|| anyhow!("actor record has no usable id"))?;
        let mut roles: BTreeSet<String> = BTreeSet::new();
        if let Some(list) = self.roles {
            roles.extend(list);
        }
        if let Some(list) = self.role {
            roles.extend(list);
        }
        if self.is_admin.unwrap_or(false) {
            roles.insert(ADMIN_ROLE.to_string());
        }
        Ok(Actor { id, roles, email_verified: self.email_verified.unwrap_or(false) })
    }
}

/// Decode a foreign account-store record into an [`Actor`].
pub fn actor_from_record(record: &Value) -> Result<Actor> {
    let rec: ActorRecord = serde_json::from_value(record.clone())?;
    rec.into_actor()
}
