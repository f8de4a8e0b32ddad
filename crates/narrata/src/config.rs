//! Layered configuration for the narrata binary.
//!
//! Sources, later ones overriding earlier:
//! - Bundled defaults (include_str! from narrata.toml)
//! - `~/.config/narrata/narrata.toml`
//! - `./narrata.toml`
//! - An explicit `--config` file
//! - Environment variables `NARRATA__SECTION__KEY`

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use narrata_error::{ConfigError, NarrataError, NarrataResult};
use narrata_media::{ComposerConfig, FallbackConfig, ValidatorConfig};
use narrata_pipeline::PipelineConfig;
use narrata_server::ServerConfig;
use narrata_services::ServicesConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../narrata.toml");

/// Where final videos are written.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_", into)]
pub struct StorageConfig {
    /// Root directory of the content-addressed store.
    #[serde(default = "default_storage_path")]
    path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/outputs")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Log output.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    #[setters(into)]
    level: String,
    /// One JSON object per line instead of human-readable text.
    #[serde(default)]
    json: bool,
    /// Export spans to stdout through OpenTelemetry.
    #[serde(default)]
    otel_stdout: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            otel_stdout: false,
        }
    }
}

/// Every section of `narrata.toml`.
///
/// # Examples
///
/// ```
/// use narrata::NarrataConfig;
///
/// let config = NarrataConfig::bundled().unwrap();
/// assert_eq!(*config.server().port(), 8000);
/// assert_eq!(*config.pipeline().worker_pool_size(), 3);
/// assert!(config.services().image_url().is_none());
/// ```
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct NarrataConfig {
    /// HTTP listen address.
    #[serde(default)]
    server: ServerConfig,
    /// Supervisor, pipeline and batch limits.
    #[serde(default)]
    pipeline: PipelineConfig,
    /// Timeline composition.
    #[serde(default)]
    composer: ComposerConfig,
    /// Placeholder media.
    #[serde(default)]
    fallback: FallbackConfig,
    /// Output quality thresholds.
    #[serde(default)]
    validation: ValidatorConfig,
    /// Artifact storage.
    #[serde(default)]
    storage: StorageConfig,
    /// Collaborator endpoints.
    #[serde(default)]
    services: ServicesConfig,
    /// Log output.
    #[serde(default)]
    logging: LoggingConfig,
}

fn config_error(context: &str, e: config::ConfigError) -> NarrataError {
    ConfigError::new(format!("{}: {}", context, e)).into()
}

impl NarrataConfig {
    /// The bundled defaults alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file does not parse.
    pub fn bundled() -> NarrataResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .map_err(|e| config_error("Failed to build configuration", e))?
            .try_deserialize()
            .map_err(|e| config_error("Failed to parse configuration", e))
    }

    /// Loads every source, with `explicit` layered above the discovered files.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is missing or any source fails to parse.
    #[instrument(skip(explicit), fields(explicit = ?explicit.map(Path::display)))]
    pub fn load(explicit: Option<&Path>) -> NarrataResult<Self> {
        let environment = Environment::with_prefix("NARRATA")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);
        Self::load_with(explicit, environment)
    }

    /// Like [`load`](Self::load) with a caller-supplied environment source.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with(explicit: Option<&Path>, environment: Environment) -> NarrataResult<Self> {
        debug!("Loading configuration: env > explicit > current dir > home dir > bundled");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/narrata/narrata.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("narrata").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(environment)
            .build()
            .map_err(|e| config_error("Failed to build configuration", e))?
            .try_deserialize()
            .map_err(|e| config_error("Failed to parse configuration", e))
    }
}
