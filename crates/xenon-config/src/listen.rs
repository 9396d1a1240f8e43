//! HTTP listen address for the playground daemon.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host and port the HTTP surface binds to, written as `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListenAddress {
    host: String,
    port: u16,
}

impl ListenAddress {
    /// Builds a listen address from its parts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or IP literal.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// TCP port; `0` asks the OS for an ephemeral port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ListenAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(formatter, "[{}]:{}", self.host, self.port)
        } else {
            write!(formatter, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ListenAddress {
    type Err = ListenParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (raw_host, raw_port) = trimmed
            .rsplit_once(':')
            .ok_or_else(|| ListenParseError::MissingPort(input.to_owned()))?;
        let host = raw_host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(ListenParseError::MissingHost(input.to_owned()));
        }
        let port = raw_port
            .parse::<u16>()
            .map_err(|_| ListenParseError::InvalidPort(raw_port.to_owned()))?;
        Ok(Self::new(host, port))
    }
}

impl TryFrom<String> for ListenAddress {
    type Error = ListenParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ListenAddress> for String {
    fn from(address: ListenAddress) -> Self {
        address.to_string()
    }
}

/// Errors encountered while parsing a [`ListenAddress`] from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListenParseError {
    /// The `:port` suffix was absent.
    #[error("missing port in listen address '{0}'")]
    MissingPort(String),
    /// Nothing preceded the port separator.
    #[error("missing host in listen address '{0}'")]
    MissingHost(String),
    /// The port was not a number in `0..=65535`.
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}
