use serde::{Deserialize, Serialize};

use super::session::CLIENT_ROLE;

/// Row of the backend `profiles` table; the authoritative role source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub role: Option<String>,
}

impl Profile {
    pub fn is_client(&self) -> bool {
        self.role.as_deref() == Some(CLIENT_ROLE)
    }
}
