//! Relay configuration, loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

/// Upper bound for the JWT clock-skew tolerance.
pub const MAX_JWT_LEEWAY_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid JWT leeway configuration: {0}")]
    InvalidJwtLeeway(String),
}

/// The JWT secret is redacted in `Debug` output.
#[derive(Clone)]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub bind_address: SocketAddr,

    /// HS256 secret shared with the service that issues user tokens.
    pub jwt_secret: String,

    /// Clock skew tolerated when checking token expiry.
    pub jwt_leeway_secs: u64,

    /// Rooms registered as active in the in-process room directory at startup.
    pub rooms: Vec<String>,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_leeway_secs", &self.jwt_leeway_secs)
            .field("rooms", &self.rooms)
            .finish()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map of variables (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let jwt_secret = vars
            .get("TETHER_JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TETHER_JWT_SECRET".to_string()))?
            .clone();

        let bind_address = parse_bind_address(
            vars.get("TETHER_BIND_ADDRESS")
                .map(String::as_str)
                .unwrap_or(DEFAULT_BIND_ADDRESS),
        )?;

        let jwt_leeway_secs = match vars.get("TETHER_JWT_LEEWAY_SECS") {
            Some(value) => parse_leeway(value)?,
            None => 0,
        };

        let rooms = vars
            .get("TETHER_ROOMS")
            .map(|value| parse_rooms(value))
            .unwrap_or_default();

        Ok(Self {
            bind_address,
            jwt_secret,
            jwt_leeway_secs,
            rooms,
        })
    }
}

pub fn parse_bind_address(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::InvalidBindAddress(format!("{value}: {e}")))
}

pub fn parse_leeway(value: &str) -> Result<u64, ConfigError> {
    let secs: u64 = value
        .parse()
        .map_err(|e| ConfigError::InvalidJwtLeeway(format!("{value}: {e}")))?;

    if secs > MAX_JWT_LEEWAY_SECS {
        return Err(ConfigError::InvalidJwtLeeway(format!(
            "{secs} exceeds the maximum of {MAX_JWT_LEEWAY_SECS} seconds"
        )));
    }
    Ok(secs)
}

/// Comma-separated room ids; blanks are skipped.
pub fn parse_rooms(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|room| !room.is_empty())
        .map(str::to_owned)
        .collect()
}
