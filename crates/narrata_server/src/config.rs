//! Listen address for the HTTP surface.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Where the server listens.
///
/// # Examples
///
/// ```
/// use narrata_server::ServerConfig;
///
/// let config = ServerConfig::default().with_port(9000u16);
/// assert_eq!(config.bind_address(), "127.0.0.1:9000");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_", into)]
#[builder(default, setter(into))]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,
    /// TCP port; 0 picks a free one.
    #[serde(default = "default_port")]
    port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Creates a new config builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
