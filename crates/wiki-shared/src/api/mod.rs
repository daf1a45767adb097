mod auth;
mod documents;

pub use auth::*;
pub use documents::*;

use serde::{Deserialize, Serialize};

/// Fields present on every response body, successful or not
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Message shown when a failed response does not carry one
pub const DEFAULT_FAILURE_MESSAGE: &str = "API request failed";

impl Envelope {
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
    }
}
