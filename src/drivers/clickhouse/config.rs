//! ClickHouse driver configuration and connection-string assembly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DriverError, Result};

/// Connection parameters supplied once by the host generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub host: String,
    /// HTTP interface port (8123, or 8443 with `secure`); the driver connects here
    pub port: u16,
    pub username: String,
    /// Never written back out when the config is serialized
    #[serde(skip_serializing)]
    pub password: String,
    pub database: String,
    /// Read timeout in seconds, 0 leaves the server default
    pub read_timeout: u64,
    /// Write timeout in seconds, 0 leaves the server default
    pub write_timeout: u64,
    /// Nagle's algorithm on the socket; the connection string carries its negation
    pub nagle: bool,
    /// Fallback hosts (`host:port`) tried after the primary one
    pub alt_hosts: Vec<String>,
    /// `in_order`, `random` or `time_random`; empty means `in_order`
    pub connection_open_strategy: String,
    /// Rows per block, 0 leaves the server default
    pub block_size: u64,
    pub debug: bool,
    pub secure: bool,
    pub skip_verify: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8123,
            username: String::new(),
            password: String::new(),
            database: "default".to_string(),
            read_timeout: 0,
            write_timeout: 0,
            nagle: false,
            alt_hosts: Vec::new(),
            connection_open_strategy: String::new(),
            block_size: 0,
            debug: false,
            secure: false,
            skip_verify: false,
        }
    }
}

impl DriverConfig {
    pub fn new(host: impl Into<String>, port: u16, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Primary `host:port` authority.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed form of `connection_open_strategy`.
    pub fn open_strategy(&self) -> Result<OpenStrategy> {
        OpenStrategy::parse(&self.connection_open_strategy)
    }
}

/// Order in which candidate hosts are tried on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenStrategy {
    #[default]
    InOrder,
    Random,
    TimeRandom,
}

impl OpenStrategy {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "" | "in_order" => Ok(Self::InOrder),
            "random" => Ok(Self::Random),
            "time_random" => Ok(Self::TimeRandom),
            other => Err(DriverError::InvalidConfig(format!(
                "unknown connection_open_strategy `{other}` (expected in_order, random or time_random)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InOrder => "in_order",
            Self::Random => "random",
            Self::TimeRandom => "time_random",
        }
    }
}

/// Build the `tcp://host:port?...` connection string for `config`.
///
/// Only non-default fields are emitted, except `database`, `no_delay` and `debug`
/// which are always present. Keys are sorted and values form-urlencoded.
pub fn build_connection_string(config: &DriverConfig) -> String {
    let mut params: BTreeMap<&str, String> = BTreeMap::new();

    if !config.username.is_empty() {
        params.insert("username", config.username.clone());
    }
    if !config.password.is_empty() {
        params.insert("password", config.password.clone());
    }
    params.insert("database", config.database.clone());

    if config.read_timeout != 0 {
        params.insert("read_timeout", config.read_timeout.to_string());
    }
    if config.write_timeout != 0 {
        params.insert("write_timeout", config.write_timeout.to_string());
    }

    params.insert("no_delay", (!config.nagle).to_string());

    if !config.alt_hosts.is_empty() {
        params.insert("alt_hosts", config.alt_hosts.join(","));
    }
    if !config.connection_open_strategy.is_empty() {
        params.insert(
            "connection_open_strategy",
            config.connection_open_strategy.clone(),
        );
    }
    if config.block_size > 0 {
        params.insert("block_size", config.block_size.to_string());
    }

    params.insert("debug", config.debug.to_string());

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();

    format!("tcp://{}?{}", config.authority(), query)
}
