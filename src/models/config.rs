use serde::Deserialize;

use crate::matching::MatchingConfig;

/// Configuration options specific to the barter service.
///
/// Loaded by `main` from `config/default.yaml`, an optional
/// `config/{APP_ENV}.yaml` and `APP_`-prefixed environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// SQLite database path.
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Secret used by the session cookie and to validate auth tokens.
    pub secret: String,
    /// Where unauthenticated users are sent to log in.
    pub auth_service_url: String,
    /// Similarity weights and the match threshold.
    #[serde(default)]
    pub matching: MatchingConfig,
}
