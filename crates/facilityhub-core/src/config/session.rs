//! Signed-in session identity.

use serde::{Deserialize, Serialize};

fn default_role() -> String {
    "User".to_string()
}

/// Identity of the signed-in user this console acts for. The backend owns
/// authentication; the console only carries the resulting identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Backend user id.
    pub user_id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Role name as the backend spells it.
    #[serde(default = "default_role")]
    pub role: String,
}
