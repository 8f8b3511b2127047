//! Server configuration for agrod.
//!
//! Values come from command-line flags first and environment variables second,
//! then fall back to built-in defaults:
//!
//! | Flag                | Environment            | Default     |
//! |---------------------|------------------------|-------------|
//! | `--host`            | `AGRO_HOST`            | `127.0.0.1` |
//! | `--port`            | `AGRO_PORT`            | `8080`      |
//! | `--database-url`    | `DATABASE_URL`         | (required)  |
//! | `--max-connections` | `AGRO_MAX_CONNECTIONS` | `5`         |
//!
//! `--in-memory` swaps PostgreSQL for a process-local store, in which case no
//! database URL is needed.

use arrrg_derive::CommandLine;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default size of the PostgreSQL pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Command-line flags accepted by agrod.
#[derive(CommandLine, Default, PartialEq, Eq)]
pub struct ServerArgs {
    /// Bind host.
    #[arrrg(optional, "Host to bind the HTTP server")]
    pub host: Option<String>,
    /// Bind port.
    #[arrrg(optional, "Port to bind the HTTP server")]
    pub port: Option<u16>,
    /// PostgreSQL connection URL.
    #[arrrg(optional, "PostgreSQL connection URL")]
    pub database_url: Option<String>,
    /// Pool size.
    #[arrrg(optional, "Maximum number of pooled database connections")]
    pub max_connections: Option<u32>,
    /// Use the in-memory repository.
    #[arrrg(flag, "Keep farmers in memory instead of PostgreSQL")]
    pub in_memory: bool,
    /// Log at debug level.
    #[arrrg(flag, "Enable verbose logging")]
    pub verbose: bool,
}

/// Where farmers are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// A PostgreSQL database reached through a connection pool.
    Postgres {
        /// Connection URL.
        database_url: String,
        /// Upper bound on pooled connections.
        max_connections: u32,
    },
    /// A map that lives as long as the process.
    InMemory,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Farmer storage backend.
    pub storage: Storage,
    /// Whether to log at debug level.
    pub verbose: bool,
}

/// Errors resolving the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
    /// PostgreSQL storage was selected without a connection URL.
    MissingDatabaseUrl,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidEnv { name, value } => {
                write!(f, "invalid value for {}: {:?}", name, value)
            }
            ConfigError::MissingDatabaseUrl => write!(
                f,
                "a database URL is required: pass --database-url, set DATABASE_URL, or use --in-memory"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Resolves the configuration against the process environment.
    pub fn from_args(args: ServerArgs) -> Result<Self, ConfigError> {
        Self::from_args_with_env(args, |name| std::env::var(name).ok())
    }

    /// Resolves the configuration, reading fallbacks through `env`.
    pub fn from_args_with_env(
        args: ServerArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host = args
            .host
            .or_else(|| env("AGRO_HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match args.port {
            Some(port) => port,
            None => parse_env(&env, "AGRO_PORT")?.unwrap_or(DEFAULT_PORT),
        };
        let storage = if args.in_memory {
            Storage::InMemory
        } else {
            let database_url = args
                .database_url
                .or_else(|| env("DATABASE_URL"))
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            let max_connections = match args.max_connections {
                Some(max_connections) => max_connections,
                None => parse_env(&env, "AGRO_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            };
            Storage::Postgres {
                database_url,
                max_connections,
            }
        };
        Ok(Self {
            host,
            port,
            storage,
            verbose: args.verbose,
        })
    }

    /// The `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn in_memory_uses_defaults() {
        let args = ServerArgs {
            in_memory: true,
            ..ServerArgs::default()
        };
        let config = ServerConfig::from_args_with_env(args, env(&[])).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.storage, Storage::InMemory);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn postgres_requires_url() {
        let result = ServerConfig::from_args_with_env(ServerArgs::default(), env(&[]));
        assert_eq!(result, Err(ConfigError::MissingDatabaseUrl));
    }

    #[test]
    fn environment_fills_gaps() {
        let config = ServerConfig::from_args_with_env(
            ServerArgs::default(),
            env(&[
                ("AGRO_HOST", "0.0.0.0"),
                ("AGRO_PORT", "9000"),
                ("DATABASE_URL", "postgres://localhost/agro"),
                ("AGRO_MAX_CONNECTIONS", "12"),
            ]),
        )
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(
            config.storage,
            Storage::Postgres {
                database_url: "postgres://localhost/agro".to_string(),
                max_connections: 12,
            }
        );
    }

    #[test]
    fn flags_override_environment() {
        let args = ServerArgs {
            port: Some(3000),
            database_url: Some("postgres://flag/agro".to_string()),
            ..ServerArgs::default()
        };
        let config = ServerConfig::from_args_with_env(
            args,
            env(&[("AGRO_PORT", "9000"), ("DATABASE_URL", "postgres://env/agro")]),
        )
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.storage,
            Storage::Postgres {
                database_url: "postgres://flag/agro".to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            }
        );
    }

    #[test]
    fn bad_environment_value_is_reported() {
        let args = ServerArgs {
            in_memory: true,
            ..ServerArgs::default()
        };
        let result = ServerConfig::from_args_with_env(args, env(&[("AGRO_PORT", "eighty")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidEnv {
                name: "AGRO_PORT",
                value: "eighty".to_string(),
            })
        );
    }
}
