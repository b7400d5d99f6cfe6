use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "bookswap.toml",
    "config/bookswap.toml",
    "crates/config/bookswap.toml",
    "../bookswap.toml",
    "../config/bookswap.toml",
    "../crates/config/bookswap.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://bookswap.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: 86_400,
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use bookswap_config::load;
///
/// std::env::remove_var("BOOKSWAP_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = defaults.auth.session_ttl_seconds;
    let session_ttl_i64 = if session_ttl > i64::MAX as u64 {
        i64::MAX
    } else {
        session_ttl as i64
    };

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default("auth.session_ttl_seconds", session_ttl_i64)
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("BOOKSWAP").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("BOOKSWAP_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via BOOKSWAP_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write as _;

    fn clear_env() {
        std::env::remove_var("BOOKSWAP_CONFIG");
        std::env::remove_var("BOOKSWAP__HTTP__PORT");
        std::env::remove_var("BOOKSWAP__DATABASE__URL");
    }

    #[test]
    #[serial]
    fn load_uses_defaults_without_sources() {
        clear_env();

        let config = load().expect("defaults should load");
        assert_eq!(config.http.address, "127.0.0.1");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.database.url, "sqlite://bookswap.db");
        assert_eq!(config.auth.session_ttl_seconds, 86_400);
    }

    #[test]
    #[serial]
    fn environment_overrides_take_precedence() {
        clear_env();
        std::env::set_var("BOOKSWAP__HTTP__PORT", "9090");
        std::env::set_var("BOOKSWAP__DATABASE__URL", "sqlite://override.db");

        let config = load().expect("environment overrides should load");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.database.url, "sqlite://override.db");

        clear_env();
    }

    #[test]
    #[serial]
    fn config_file_is_loaded_when_pointed_at() {
        clear_env();

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bookswap.toml");
        let mut file = std::fs::File::create(&path).expect("config file");
        writeln!(file, "[http]\naddress = \"0.0.0.0\"\nport = 7171").expect("write config");

        std::env::set_var("BOOKSWAP_CONFIG", &path);

        let config = load().expect("file-backed config should load");
        assert_eq!(config.http.address, "0.0.0.0");
        assert_eq!(config.http.port, 7171);

        clear_env();
    }
}
