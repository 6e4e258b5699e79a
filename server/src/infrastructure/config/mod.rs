//! Configuration management for the clonebox service.
//!
//! Settings are layered: built-in defaults, then an optional file named by
//! `CLONEBOX_CONFIG`, then `CLONEBOX__<SECTION>__<KEY>` environment variables,
//! and finally `PORT`, which overrides `server.port`.
//!
//! # Example
//!
//! ```no_run
//! use clonebox_server::infrastructure::config::Settings;
//!
//! let settings = Settings::new().expect("Failed to load configuration");
//! ```

pub mod clone;
pub mod cors;
pub mod server;
pub mod storage;
pub mod telemetry;

pub use clone::CloneSettings;
pub use cors::CorsSettings;
pub use server::ServerSettings;
pub use storage::StorageSettings;
pub use telemetry::TelemetrySettings;

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;

/// Environment variable naming an optional configuration file.
pub const CONFIG_FILE_VAR: &str = "CLONEBOX_CONFIG";
/// Prefix of structured environment overrides.
pub const ENV_PREFIX: &str = "CLONEBOX";

/// Top-level configuration for the clonebox service.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Server settings.
    pub server: ServerSettings,
    /// Session storage settings.
    pub storage: StorageSettings,
    /// Clone settings.
    #[serde(rename = "clone", default)]
    pub cloning: CloneSettings,
    /// Cross-origin settings.
    #[serde(default)]
    pub cors: CorsSettings,
    /// Telemetry settings.
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Loads settings from the process environment and defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Loads settings from an explicit set of environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("storage.root_dir", "./repos")?
            .set_default("clone.timeout_secs", 180)?
            .set_default("clone.default_branch", "main")?
            .set_default("clone.git_binary", "git")?
            .set_default("telemetry.service_name", "clonebox-server")?
            .set_default("telemetry.log_level", "info")?
            .set_default("telemetry.sampling_ratio", 1.0)?;

        if let Some(path) = vars.get(CONFIG_FILE_VAR) {
            builder = builder.add_source(File::with_name(path));
        }

        let port = vars.get("PORT").cloned();

        builder
            // Merge in Environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .set_override_option("server.port", port)?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_without_environment() -> anyhow::Result<()> {
        let settings = Settings::from_vars(Map::new())?;

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.storage.root_dir, PathBuf::from("./repos"));
        assert_eq!(settings.cloning.timeout_secs, 180);
        assert_eq!(settings.cloning.default_branch, "main");
        assert_eq!(settings.cloning.git_binary, "git");
        assert!(settings.cors.is_unrestricted());
        assert_eq!(settings.telemetry.service_name, "clonebox-server");
        assert!(settings.telemetry.otlp_endpoint.is_none());
        Ok(())
    }

    #[test]
    fn prefixed_variables_override_defaults() -> anyhow::Result<()> {
        let settings = Settings::from_vars(vars(&[
            ("CLONEBOX__STORAGE__ROOT_DIR", "/srv/clonebox"),
            ("CLONEBOX__CLONE__TIMEOUT_SECS", "30"),
            ("CLONEBOX__CLONE__DEFAULT_BRANCH", "master"),
            (
                "CLONEBOX__CORS__ALLOWED_ORIGINS",
                "https://app.example.com,http://localhost:5173",
            ),
        ]))?;

        assert_eq!(settings.storage.root_dir, PathBuf::from("/srv/clonebox"));
        assert_eq!(settings.cloning.timeout_secs, 30);
        assert_eq!(settings.cloning.default_branch, "master");
        assert_eq!(
            settings.cors.allowed_origins,
            ["https://app.example.com", "http://localhost:5173"]
        );
        Ok(())
    }

    #[test]
    fn port_variable_wins() -> anyhow::Result<()> {
        let settings = Settings::from_vars(vars(&[
            ("CLONEBOX__SERVER__PORT", "9000"),
            ("PORT", "8080"),
        ]))?;
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.server.bind_address()?,
            "0.0.0.0:8080".parse::<std::net::SocketAddr>()?
        );
        Ok(())
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = Settings::from_vars(vars(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }
}
