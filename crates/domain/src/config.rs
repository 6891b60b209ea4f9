//! Environment-driven configuration for the API and seed binaries.
//!
//! Values come from the process environment, optionally hydrated from a
//! `.env` file first (skipped when `FITLOG_SKIP_DOTENV` is set). Blank
//! values count as unset.

use std::{env, fmt};

use thiserror::Error;

/// Default cap on JSON request bodies, in bytes.
pub const DEFAULT_JSON_LIMIT: usize = 256 * 1024;

/// Where an HTTP listener binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenTarget {
    Tcp(String),
    Unix(String),
}

impl ListenTarget {
    /// A unix socket path takes precedence over a TCP address.
    fn pick(tcp: Option<String>, unix: Option<String>) -> Option<Self> {
        unix.map(ListenTarget::Unix).or(tcp.map(ListenTarget::Tcp))
    }
}

impl fmt::Display for ListenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenTarget::Tcp(addr) => write!(f, "tcp://{addr}"),
            ListenTarget::Unix(path) => write!(f, "unix:{path}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    database_url: String,
    public: ListenTarget,
    internal: Option<ListenTarget>,
    json_limit: usize,
}

impl ApiConfig {
    /// `DATABASE_URL` is required, as is one of `API_BIND_ADDRESS` /
    /// `API_UNIX_SOCKET`. The internal listener and `API_JSON_LIMIT` are
    /// optional.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let public = ListenTarget::pick(read_var("API_BIND_ADDRESS"), read_var("API_UNIX_SOCKET"))
            .ok_or(ConfigError::MissingVar {
                key: "API_BIND_ADDRESS",
            })?;
        let internal = ListenTarget::pick(
            read_var("API_INTERNAL_BIND_ADDRESS"),
            read_var("API_INTERNAL_UNIX_SOCKET"),
        );
        let json_limit = match read_var("API_JSON_LIMIT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
                key: "API_JSON_LIMIT",
                value: raw,
            })?,
            None => DEFAULT_JSON_LIMIT,
        };

        Ok(Self {
            database_url: require_var("DATABASE_URL")?,
            public,
            internal,
            json_limit,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn public_listener(&self) -> &ListenTarget {
        &self.public
    }

    /// Listener serving `/metrics` away from the public surface.
    pub fn internal_listener(&self) -> Option<&ListenTarget> {
        self.internal.as_ref()
    }

    pub fn json_limit(&self) -> usize {
        self.json_limit
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    database_url: String,
}

impl SeedConfig {
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;
        Ok(Self {
            database_url: require_var("DATABASE_URL")?,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

fn read_var(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn require_var(key: &'static str) -> Result<String, ConfigError> {
    read_var(key).ok_or(ConfigError::MissingVar { key })
}

/// Loads `.env` into the environment if present. A missing file is fine;
/// an unreadable or malformed one is an error.
pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("FITLOG_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ConfigError::Dotenv { source }),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("`{key}` must be a non-negative integer, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },
    #[error("failed to load .env file: {source}")]
    Dotenv { source: dotenvy::Error },
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch process environment variables.
    pub(crate) static ENV_GUARD: Mutex<()> = Mutex::new(());

    const KEYS: &[&str] = &[
        "DATABASE_URL",
        "API_BIND_ADDRESS",
        "API_UNIX_SOCKET",
        "API_INTERNAL_BIND_ADDRESS",
        "API_INTERNAL_UNIX_SOCKET",
        "API_JSON_LIMIT",
    ];

    /// Runs `f` with exactly `vars` set among the config keys.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        env::set_var("FITLOG_SKIP_DOTENV", "1");
        for key in KEYS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let out = f();
        for key in KEYS {
            env::remove_var(key);
        }
        out
    }

    const BASE: [(&str, &str); 2] = [
        ("DATABASE_URL", "sqlite://test.db"),
        ("API_BIND_ADDRESS", "127.0.0.1:9090"),
    ];

    #[test]
    fn api_config_defaults() {
        let config = with_env(&BASE, ApiConfig::load_from_env).unwrap();
        assert_eq!(config.database_url(), "sqlite://test.db");
        assert_eq!(
            config.public_listener(),
            &ListenTarget::Tcp("127.0.0.1:9090".into())
        );
        assert_eq!(config.internal_listener(), None);
        assert_eq!(config.json_limit(), DEFAULT_JSON_LIMIT);
    }

    #[test]
    fn unix_sockets_win_over_tcp() {
        let config = with_env(
            &[
                BASE[0],
                BASE[1],
                ("API_UNIX_SOCKET", "/tmp/fitlog.sock"),
                ("API_INTERNAL_BIND_ADDRESS", "127.0.0.1:9091"),
            ],
            ApiConfig::load_from_env,
        )
        .unwrap();
        assert_eq!(
            config.public_listener(),
            &ListenTarget::Unix("/tmp/fitlog.sock".into())
        );
        assert_eq!(
            config.internal_listener(),
            Some(&ListenTarget::Tcp("127.0.0.1:9091".into()))
        );
        assert_eq!(config.public_listener().to_string(), "unix:/tmp/fitlog.sock");
    }

    #[test]
    fn socket_alone_is_enough_for_public_listener() {
        let config = with_env(
            &[BASE[0], ("API_UNIX_SOCKET", "/tmp/only.sock")],
            ApiConfig::load_from_env,
        )
        .unwrap();
        assert_eq!(
            config.public_listener(),
            &ListenTarget::Unix("/tmp/only.sock".into())
        );

        let err = with_env(&[BASE[0]], ApiConfig::load_from_env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                key: "API_BIND_ADDRESS"
            }
        ));
    }

    #[test]
    fn json_limit_is_parsed() {
        let config = with_env(
            &[BASE[0], BASE[1], ("API_JSON_LIMIT", " 4096 ")],
            ApiConfig::load_from_env,
        )
        .unwrap();
        assert_eq!(config.json_limit(), 4096);

        let err = with_env(
            &[BASE[0], BASE[1], ("API_JSON_LIMIT", "lots")],
            ApiConfig::load_from_env,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "`API_JSON_LIMIT` must be a non-negative integer, got `lots`"
        );
    }

    #[test]
    fn values_are_trimmed_and_blank_means_missing() {
        let config = with_env(
            &[
                ("DATABASE_URL", "  sqlite://trim.db  "),
                ("API_BIND_ADDRESS", " 127.0.0.1:8081 "),
            ],
            ApiConfig::load_from_env,
        )
        .unwrap();
        assert_eq!(config.database_url(), "sqlite://trim.db");
        assert_eq!(
            config.public_listener(),
            &ListenTarget::Tcp("127.0.0.1:8081".into())
        );

        let err = with_env(&[("DATABASE_URL", "   ")], SeedConfig::load_from_env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                key: "DATABASE_URL"
            }
        ));
    }

    #[test]
    fn seed_config_only_needs_database_url() {
        let config = with_env(&[BASE[0]], SeedConfig::load_from_env).unwrap();
        assert_eq!(config.database_url(), "sqlite://test.db");
    }
}
