//! ClickHouse driver connection.
//!
//! The driver talks to ClickHouse over its HTTP interface through the `clickhouse`
//! client. The `tcp://` connection string built from the same config is kept for
//! hosts that hand it to native-protocol tooling.
//!
//! With alternate hosts configured, `open` probes the candidates with `SELECT 1` in
//! the order given by the open strategy and keeps the first that answers. A single
//! host is used without probing.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use clickhouse::Client;
use tracing::{debug, info, warn};

use super::config::{DriverConfig, OpenStrategy, build_connection_string};
use super::types::TypeTranslator;
use crate::error::{DriverError, Result};
use crate::traits::{BoxedSchemaIntrospection, DatabaseConnection};

/// ClickHouse implementation of the driver contract.
pub struct ClickHouseDriver {
    config: DriverConfig,
    conn_str: String,
    translator: TypeTranslator,
    client: Option<Client>,
}

impl std::fmt::Debug for ClickHouseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseDriver")
            .field("host", &self.config.authority())
            .field("database", &self.config.database)
            .field("translator", &self.translator)
            .field("open", &self.client.is_some())
            .finish()
    }
}

impl ClickHouseDriver {
    /// Create a driver from configuration.
    ///
    /// This does not connect - call `open()` before introspecting.
    pub fn new(config: DriverConfig) -> Self {
        Self {
            conn_str: build_connection_string(&config),
            config,
            translator: TypeTranslator::default(),
            client: None,
        }
    }

    /// Create a boxed driver for hosts that hold a trait object.
    pub fn boxed(config: DriverConfig) -> BoxedSchemaIntrospection {
        Box::new(Self::new(config))
    }

    /// Replace the type translator used by `translate_column_type`.
    pub fn with_translator(mut self, translator: TypeTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The `tcp://` connection string for this configuration.
    pub fn connection_string(&self) -> &str {
        &self.conn_str
    }

    pub fn translator(&self) -> &TypeTranslator {
        &self.translator
    }

    /// Get the client, returning an error if not open.
    pub(crate) fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(DriverError::NotConnected)
    }

    /// Primary host followed by the alternates, rotated according to `strategy`.
    fn candidate_hosts(&self, strategy: OpenStrategy) -> Vec<String> {
        let mut hosts = vec![self.config.authority()];
        hosts.extend(self.config.alt_hosts.iter().map(|host| {
            if host.contains(':') {
                host.clone()
            } else {
                format!("{}:{}", host, self.config.port)
            }
        }));

        let offset = match strategy {
            OpenStrategy::InOrder => 0,
            OpenStrategy::Random => RandomState::new().build_hasher().finish(),
            OpenStrategy::TimeRandom => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
        };
        let len = hosts.len();
        hosts.rotate_left((offset % len as u64) as usize);
        hosts
    }

    /// HTTP endpoint for one `host:port` authority.
    fn base_url(&self, authority: &str) -> String {
        let scheme = if self.config.secure { "https" } else { "http" };
        format!("{scheme}://{authority}")
    }

    /// Build a client for one `host:port` authority.
    fn build_client(&self, authority: &str) -> Client {
        let mut client = Client::default()
            .with_url(self.base_url(authority))
            .with_database(&self.config.database);

        if !self.config.username.is_empty() {
            client = client.with_user(&self.config.username);
        }
        if !self.config.password.is_empty() {
            client = client.with_password(&self.config.password);
        }
        if self.config.read_timeout != 0 {
            client = client.with_option("receive_timeout", self.config.read_timeout.to_string());
        }
        if self.config.write_timeout != 0 {
            client = client.with_option("send_timeout", self.config.write_timeout.to_string());
        }
        if self.config.block_size > 0 {
            client = client.with_option("max_block_size", self.config.block_size.to_string());
        }

        client
    }
}

#[async_trait]
impl DatabaseConnection for ClickHouseDriver {
    async fn open(&mut self) -> Result<()> {
        let strategy = self.config.open_strategy()?;

        if self.config.skip_verify {
            warn!("skip_verify is not supported by the HTTP transport; certificates will be verified");
        }
        if self.config.debug {
            info!(
                host = %self.config.authority(),
                database = %self.config.database,
                strategy = strategy.as_str(),
                "opening ClickHouse driver"
            );
        }

        let hosts = self.candidate_hosts(strategy);
        if let [host] = hosts.as_slice() {
            self.client = Some(self.build_client(host));
            return Ok(());
        }

        let mut last_err = None;
        for host in &hosts {
            let client = self.build_client(host);
            match client.query("SELECT 1").execute().await {
                Ok(()) => {
                    debug!(host = %host, "selected ClickHouse host");
                    self.client = Some(client);
                    return Ok(());
                }
                Err(e) => {
                    debug!(host = %host, error = %e, "ClickHouse host probe failed");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(source) => Err(DriverError::NoReachableHost { hosts, source }),
            None => Err(DriverError::InvalidConfig("no hosts configured".to_string())),
        }
    }

    async fn close(&mut self) {
        if self.client.take().is_some() && self.config.debug {
            info!(host = %self.config.authority(), "closed ClickHouse driver");
        }
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn use_last_insert_id(&self) -> bool {
        false
    }

    fn use_top_clause(&self) -> bool {
        false
    }

    fn index_placeholders(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> DriverConfig {
        DriverConfig {
            alt_hosts: vec!["ch2:9001".to_string(), "ch3".to_string()],
            ..DriverConfig::new("ch1", 8123, "analytics")
        }
    }

    #[test]
    fn test_new_does_not_connect() {
        let driver = ClickHouseDriver::new(create_test_config());

        assert!(!driver.is_open());
        assert!(matches!(driver.client(), Err(DriverError::NotConnected)));
    }

    #[test]
    fn test_connection_string_built_from_config() {
        let driver = ClickHouseDriver::new(DriverConfig::new("ch1", 9000, "analytics"));
        assert_eq!(
            driver.connection_string(),
            "tcp://ch1:9000?database=analytics&debug=false&no_delay=true"
        );
    }

    #[test]
    fn test_candidate_hosts_in_order() {
        let driver = ClickHouseDriver::new(create_test_config());

        assert_eq!(
            driver.candidate_hosts(OpenStrategy::InOrder),
            vec!["ch1:8123", "ch2:9001", "ch3:8123"]
        );
    }

    #[test]
    fn test_candidate_hosts_rotation_keeps_every_host() {
        let driver = ClickHouseDriver::new(create_test_config());

        for strategy in [OpenStrategy::Random, OpenStrategy::TimeRandom] {
            let mut hosts = driver.candidate_hosts(strategy);
            hosts.sort();
            assert_eq!(hosts, vec!["ch1:8123", "ch2:9001", "ch3:8123"]);
        }
    }

    #[test]
    fn test_single_host_candidates() {
        let driver = ClickHouseDriver::new(DriverConfig::new("ch1", 8123, "analytics"));
        assert_eq!(driver.candidate_hosts(OpenStrategy::Random), vec!["ch1:8123"]);
    }

    #[test]
    fn test_default_config_uses_http_port() {
        let driver = ClickHouseDriver::new(DriverConfig::default());
        let hosts = driver.candidate_hosts(OpenStrategy::InOrder);

        assert_eq!(driver.base_url(&hosts[0]), "http://localhost:8123");
    }

    #[test]
    fn test_secure_uses_https() {
        let config = DriverConfig {
            secure: true,
            ..DriverConfig::new("ch1", 8443, "analytics")
        };
        let driver = ClickHouseDriver::new(config);

        assert_eq!(driver.base_url("ch1:8443"), "https://ch1:8443");
    }

    #[test]
    fn test_dialect_capabilities() {
        let driver = ClickHouseDriver::new(create_test_config());

        assert!(!driver.use_last_insert_id());
        assert!(!driver.use_top_clause());
        assert!(!driver.index_placeholders());
    }

    #[test]
    fn test_with_translator() {
        let driver = ClickHouseDriver::new(create_test_config())
            .with_translator(TypeTranslator::new().uint8_as_bool(true));
        assert!(driver.translator().is_uint8_as_bool());
    }

    #[test]
    fn test_debug_output_hides_credentials() {
        let config = create_test_config().with_credentials("gen", "secret");
        let driver = ClickHouseDriver::new(config);

        let output = format!("{driver:?}");
        assert!(output.contains("ch1:8123"));
        assert!(!output.contains("secret"));
    }
}
