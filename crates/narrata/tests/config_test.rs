//! Layered configuration loading.

use config::Environment;
use narrata::NarrataConfig;
use std::path::Path;
use tempfile::TempDir;

fn environment(vars: &[(&str, &str)]) -> Environment {
    let mut source = config::Map::new();
    for (key, value) in vars {
        source.insert(key.to_string(), value.to_string());
    }
    Environment::with_prefix("NARRATA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .source(Some(source))
}

#[test]
fn test_load_without_overrides_uses_bundled_defaults() {
    let loaded = NarrataConfig::load_with(None, environment(&[])).unwrap();
    let bundled = NarrataConfig::bundled().unwrap();

    assert_eq!(loaded.pipeline(), bundled.pipeline());
    assert_eq!(loaded.composer(), bundled.composer());
    assert_eq!(*loaded.composer().fps(), 24);
    assert_eq!(loaded.logging().level(), "info");
    assert_eq!(loaded.storage().path(), Path::new("data/outputs"));
}

#[test]
fn test_environment_overrides_sections() {
    let loaded = NarrataConfig::load_with(
        None,
        environment(&[
            ("NARRATA__SERVER__PORT", "9100"),
            ("NARRATA__PIPELINE__WORKER_POOL_SIZE", "6"),
            ("NARRATA__SERVICES__IMAGE_URL", "http://localhost:9002/image"),
            ("NARRATA__LOGGING__JSON", "true"),
        ]),
    )
    .unwrap();

    assert_eq!(*loaded.server().port(), 9100);
    assert_eq!(loaded.server().host(), "127.0.0.1");
    assert_eq!(*loaded.pipeline().worker_pool_size(), 6);
    assert_eq!(*loaded.pipeline().retry_attempts(), 1);
    assert_eq!(
        loaded.services().image_url().as_deref(),
        Some("http://localhost:9002/image")
    );
    assert!(*loaded.logging().json());
}

#[test]
fn test_explicit_file_overrides_defaults_and_env_wins() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        "[pipeline]\nworker_pool_size = 7\nvideo_from_image = true\n\n[server]\nport = 8100\n",
    )
    .unwrap();

    let loaded = NarrataConfig::load_with(
        Some(&path),
        environment(&[("NARRATA__SERVER__PORT", "8200")]),
    )
    .unwrap();

    assert_eq!(*loaded.pipeline().worker_pool_size(), 7);
    assert!(*loaded.pipeline().video_from_image());
    assert_eq!(*loaded.pipeline().synthesis_timeout_secs(), 120);
    assert_eq!(*loaded.server().port(), 8200);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let result = NarrataConfig::load_with(Some(&missing), environment(&[]));

    assert!(result.is_err());
}
