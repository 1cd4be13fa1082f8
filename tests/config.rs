use std::fs;
use std::time::Duration;

use isaca_sv_web::models::config::ServerConfig;

const DEFAULT: &str = r#"
domain: "isaca-sv.org"
address: "127.0.0.1"
port: 8080
api_base_url: "http://localhost:5000/api/"
templates_dir: "templates/**/*"
secret: "secret"
"#;

#[test]
fn profile_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("default.yaml"), DEFAULT).unwrap();
    fs::write(
        dir.path().join("staging.yaml"),
        "port: 9090\napi_timeout_secs: 0\nbulk_concurrency: 3\n",
    )
    .unwrap();
    let prefix = dir.path().to_str().unwrap();

    let config = ServerConfig::load(prefix, "staging").unwrap();

    assert_eq!(config.port, 9090);
    assert_eq!(config.domain, "isaca-sv.org");
    assert_eq!(config.api_timeout(), Duration::from_secs(1));
    assert_eq!(config.bulk_concurrency(), 3);
    assert_eq!(config.api_token, None);
}

#[test]
fn missing_profile_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("default.yaml"), DEFAULT).unwrap();

    let config = ServerConfig::load(dir.path().to_str().unwrap(), "absent").unwrap();

    assert_eq!(config.port, 8080);
    assert!(config.bulk_concurrency() >= 1);
    assert_eq!(config.assets_dir, "./assets");
}

#[test]
fn missing_defaults_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    assert!(ServerConfig::load(dir.path().to_str().unwrap(), "local").is_err());
}
