use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dbprobe.toml";

/// Environment variables consulted for the connection string, in order.
pub const DATABASE_URL_VARS: &[&str] = &["NEON_DATABASE_URL", "DATABASE_URL"];

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_METRICS_LIMIT: i64 = 10;

/// Fully resolved settings for one command invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub connect_timeout: Duration,
    pub metrics_limit: i64,
    pub require_tls: bool,
}

/// Shape of `dbprobe.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub database: DatabaseSection,
    pub metrics: MetricsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub require_tls: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsSection {
    pub limit: Option<i64>,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub metrics_limit: Option<i64>,
}

impl Settings {
    /// Resolve settings from defaults, the config file, the environment and
    /// command-line overrides, in that order of precedence (last wins).
    ///
    /// `env` is the variable lookup; the CLI passes [`process_env`].
    pub fn resolve<F>(file: Option<&FileConfig>, env: F, overrides: &Overrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.cloned().unwrap_or_default();

        let from_env = DATABASE_URL_VARS
            .iter()
            .find_map(|&key| env(key).filter(|value| !value.trim().is_empty()));

        let raw_url = overrides
            .database_url
            .clone()
            .or(from_env)
            .or(file.database.url)
            .ok_or(Error::MissingDatabaseUrl)?;

        let database_url = clean_database_url(&raw_url);
        if database_url.is_empty() {
            return Err(Error::MissingDatabaseUrl);
        }
        detect_engine(&database_url)?;

        let timeout_secs = overrides
            .connect_timeout_secs
            .or(file.database.connect_timeout_secs)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("connect timeout must be at least 1 second".to_string()));
        }

        let metrics_limit = overrides
            .metrics_limit
            .or(file.metrics.limit)
            .unwrap_or(DEFAULT_METRICS_LIMIT);
        if metrics_limit < 1 {
            return Err(Error::Config(format!(
                "metrics limit must be positive, got {metrics_limit}"
            )));
        }

        Ok(Self {
            database_url,
            connect_timeout: Duration::from_secs(timeout_secs),
            metrics_limit,
            require_tls: file.database.require_tls.unwrap_or(true),
        })
    }
}

/// Read the config file. An explicit path must exist; the default file is
/// optional.
pub fn load_file_config(path: Option<&Path>) -> Result<Option<FileConfig>> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(Some(config))
}

/// Load `.env` from the working directory if present. Returns the path that
/// was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Process environment lookup suitable for [`Settings::resolve`].
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Strip the newlines and spaces that sneak into URLs pasted into env files.
pub fn clean_database_url(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, '\n' | '\r' | ' ' | '\t'))
        .collect()
}

/// Identify the engine behind a connection string.
pub fn detect_engine(conn: &str) -> Result<&'static str> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        let scheme = conn.split_once("://").map(|(scheme, _)| scheme).unwrap_or("unknown");
        Err(Error::UnsupportedEngine(scheme.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_env_is_set() {
        let env = env_from(&[("NEON_DATABASE_URL", "postgres://u:p@host/db")]);
        let settings = Settings::resolve(None, env, &Overrides::default()).unwrap();

        assert_eq!(settings.database_url, "postgres://u:p@host/db");
        assert_eq!(settings.connect_timeout, Duration::from_secs(15));
        assert_eq!(settings.metrics_limit, 10);
        assert!(settings.require_tls);
    }

    #[test]
    fn neon_url_takes_priority_over_database_url() {
        let env = env_from(&[
            ("DATABASE_URL", "postgres://fallback/db"),
            ("NEON_DATABASE_URL", "postgres://neon/db"),
        ]);
        let settings = Settings::resolve(None, env, &Overrides::default()).unwrap();
        assert_eq!(settings.database_url, "postgres://neon/db");
    }

    #[test]
    fn blank_neon_url_falls_back_to_database_url() {
        let env = env_from(&[
            ("NEON_DATABASE_URL", "  "),
            ("DATABASE_URL", "postgres://fallback/db"),
        ]);
        let settings = Settings::resolve(None, env, &Overrides::default()).unwrap();
        assert_eq!(settings.database_url, "postgres://fallback/db");
    }

    #[test]
    fn flag_beats_env_and_env_beats_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [database]
            url = "postgres://file/db"
            connect_timeout_secs = 30
            require_tls = false

            [metrics]
            limit = 25
            "#,
        )
        .unwrap();

        let env = env_from(&[("DATABASE_URL", "postgres://env/db")]);
        let settings = Settings::resolve(Some(&file), &env, &Overrides::default()).unwrap();
        assert_eq!(settings.database_url, "postgres://env/db");
        assert_eq!(settings.connect_timeout, Duration::from_secs(30));
        assert_eq!(settings.metrics_limit, 25);
        assert!(!settings.require_tls);

        let overrides = Overrides {
            database_url: Some("postgres://flag/db".to_string()),
            connect_timeout_secs: Some(5),
            metrics_limit: Some(3),
        };
        let settings = Settings::resolve(Some(&file), &env, &overrides).unwrap();
        assert_eq!(settings.database_url, "postgres://flag/db");
        assert_eq!(settings.connect_timeout, Duration::from_secs(5));
        assert_eq!(settings.metrics_limit, 3);
    }

    #[test]
    fn file_url_used_when_env_is_empty() {
        let file: FileConfig = toml::from_str("[database]\nurl = \"postgres://file/db\"\n").unwrap();
        let settings = Settings::resolve(Some(&file), env_from(&[]), &Overrides::default()).unwrap();
        assert_eq!(settings.database_url, "postgres://file/db");
    }

    #[test]
    fn missing_url_is_reported() {
        let err = Settings::resolve(None, env_from(&[]), &Overrides::default()).unwrap_err();
        assert!(matches!(err, Error::MissingDatabaseUrl));
    }

    #[test]
    fn url_is_cleaned_of_whitespace() {
        let env = env_from(&[("DATABASE_URL", "postgres://u:p@host/\n db?sslmode=require\n")]);
        let settings = Settings::resolve(None, env, &Overrides::default()).unwrap();
        assert_eq!(settings.database_url, "postgres://u:p@host/db?sslmode=require");
    }

    #[test]
    fn non_postgres_url_is_rejected() {
        let env = env_from(&[("DATABASE_URL", "mysql://host/db")]);
        let err = Settings::resolve(None, env, &Overrides::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedEngine(ref scheme) if scheme == "mysql"));
    }

    #[test]
    fn zero_limit_is_invalid() {
        let env = env_from(&[("DATABASE_URL", "postgres://host/db")]);
        let overrides = Overrides {
            metrics_limit: Some(0),
            ..Overrides::default()
        };
        let err = Settings::resolve(None, env, &overrides).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let parsed: std::result::Result<FileConfig, _> =
            toml::from_str("[database]\npasswd = \"x\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn example_config_parses() {
        let file: FileConfig =
            toml::from_str(include_str!("../../../dbprobe.example.toml")).unwrap();
        assert_eq!(file.database.connect_timeout_secs, Some(15));
        assert_eq!(file.metrics.limit, Some(10));
        assert!(file.database.url.is_none());
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let err = load_file_config(Some(Path::new("/nonexistent/dbprobe.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
