//! Cross-origin configuration for the clonebox service.

use serde::Deserialize;

/// Cross-origin access policy.
///
/// An empty origin list allows any origin. That is convenient for a local
/// frontend and unsafe on a public deployment.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsSettings {
    /// Origins allowed to call the API; empty means any.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl CorsSettings {
    /// Whether every origin is allowed.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.allowed_origins.is_empty()
    }
}
