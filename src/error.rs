//! Error types returned by the driver.

use thiserror::Error;

use crate::drivers::clickhouse::EngineParseError;

/// Errors surfaced to the host generator.
///
/// Nothing is retried or logged at this layer; the caller decides how to report.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Network or driver failure while executing a catalog query.
    #[error(transparent)]
    Transport(clickhouse::error::Error),

    /// A catalog row could not be decoded into the expected shape.
    #[error("unable to scan for table {table}")]
    Scan {
        table: String,
        #[source]
        source: clickhouse::error::Error,
    },

    /// The `engine_full` descriptor did not match the positional engine grammar.
    #[error("bad engine=`{engine}`: {source}")]
    EngineParse {
        engine: String,
        #[source]
        source: EngineParseError,
    },

    /// An introspection call was made before `open()` or after `close()`.
    #[error("database not connected")]
    NotConnected,

    /// None of the configured hosts answered the connection probe.
    #[error("no reachable ClickHouse host among [{}]", .hosts.join(", "))]
    NoReachableHost {
        hosts: Vec<String>,
        #[source]
        source: clickhouse::error::Error,
    },

    #[error("invalid driver configuration: {0}")]
    InvalidConfig(String),
}

impl DriverError {
    /// Classify a client error raised while reading rows for `table`.
    ///
    /// Decoding failures become [`DriverError::Scan`]; everything else is a transport error.
    pub(crate) fn from_fetch(table: &str, err: clickhouse::error::Error) -> Self {
        use clickhouse::error::Error;

        match err {
            Error::NotEnoughData
            | Error::InvalidUtf8Encoding(_)
            | Error::InvalidTagEncoding(_)
            | Error::DeserializeAnyNotSupported
            | Error::Custom(_) => Self::Scan {
                table: table.to_string(),
                source: err,
            },
            other => Self::Transport(other),
        }
    }
}

pub type Result<T, E = DriverError> = std::result::Result<T, E>;
