//! User Types
//!
//! Profile data returned for an authorized credential.

use serde::{Deserialize, Deserializer, Serialize};

/// User details fetched for the current credential. Never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    /// Whether `permissions` was populated by the server.
    pub permissions_included: bool,
    /// Granted permission nodes, in server order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permissions: Vec<String>,
    /// User identifier.
    #[serde(default, rename = "uuid")]
    pub id: Option<String>,
    #[serde(default)]
    pub primary_group: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Servers may send `null` instead of omitting excluded permissions.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl UserDetails {
    /// Check a node against the included permission list.
    ///
    /// Returns `None` when the server did not include permissions.
    pub fn has_permission(&self, node: &str) -> Option<bool> {
        if !self.permissions_included {
            return None;
        }
        Some(self.permissions.iter().any(|p| p == node))
    }
}
