use std::net::SocketAddr;
use std::path::PathBuf;

use config::{Config, Environment, File};
use graphql_factory::SchemaConfig;
use serde::{Deserialize, Serialize};

/// Settings of the sample server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub graphql: GraphQLSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.graphql
            .limits
            .validate()
            .map_err(|e| format!("graphql.limits: {e}"))
    }

    pub fn addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("invalid server address: {e}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    4000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLSettings {
    /// Value every request sees as `contextContent`.
    #[serde(default)]
    pub context_content: String,
    /// Serve the GraphiQL IDE to browsers on `GET /graphql`.
    #[serde(default = "default_graphiql")]
    pub graphiql: bool,
    #[serde(default)]
    pub limits: SchemaConfig,
}

fn default_graphiql() -> bool {
    true
}

impl Default for GraphQLSettings {
    fn default() -> Self {
        Self {
            context_content: String::new(),
            graphiql: default_graphiql(),
            limits: SchemaConfig::default(),
        }
    }
}

/// Loads settings from an optional TOML file, then `STARWARS__*` environment
/// overrides (e.g. `STARWARS__SERVER__PORT=9090`).
pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
    let mut builder = Config::builder();
    let pathbuf = PathBuf::from(path.unwrap_or("starwars.toml"));
    if pathbuf.exists() {
        builder = builder.add_source(File::from(pathbuf));
    }
    builder = builder.add_source(
        Environment::with_prefix("STARWARS")
            .try_parsing(true)
            .separator("__"),
    );
    let cfg = builder
        .build()
        .map_err(|e| format!("config build error: {e}"))?;
    let merged: AppConfig = cfg
        .try_deserialize()
        .map_err(|e| format!("config deserialize error: {e}"))?;
    merged.validate()?;
    Ok(merged)
}
