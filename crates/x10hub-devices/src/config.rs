//! Hub and cover configuration.
//!
//! ```toml
//! [mochad]
//! host = "localhost"
//! port = 1099
//!
//! [[cover]]
//! address = "a1"
//! name = "Living room shutter"
//! comm_type = "pl"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::{CommMode, X10Address};
use crate::controller::{DEFAULT_HOST, DEFAULT_PORT};
use crate::error::{X10Error, X10Result};

/// Environment variable names
pub mod env_vars {
    pub const HOST: &str = "X10HUB_HOST";
    pub const PORT: &str = "X10HUB_PORT";
}

/// One configured cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverConfig {
    /// X10 house/unit address
    pub address: X10Address,
    /// Display name (defaults to `x10_shutter_dev_<address>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Transport medium (defaults to power-line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comm_type: Option<CommMode>,
}

impl CoverConfig {
    pub fn new(address: X10Address) -> Self {
        Self {
            address,
            name: None,
            comm_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_comm_type(mut self, comm_type: CommMode) -> Self {
        self.comm_type = Some(comm_type);
        self
    }
}

/// Where the mochad daemon listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MochadConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for MochadConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct X10HubConfig {
    #[serde(default)]
    pub mochad: MochadConfig,
    #[serde(default, rename = "cover")]
    pub covers: Vec<CoverConfig>,
}

impl X10HubConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> X10Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML file.
    pub fn load(path: impl AsRef<Path>) -> X10Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            X10Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Override the controller endpoint from `X10HUB_HOST` / `X10HUB_PORT`.
    pub fn apply_env_overrides(&mut self) -> X10Result<()> {
        if let Ok(host) = std::env::var(env_vars::HOST) {
            self.mochad.host = host;
        }
        if let Ok(port) = std::env::var(env_vars::PORT) {
            self.mochad.port = port
                .parse()
                .map_err(|_| X10Error::Config(format!("Invalid {}: {}", env_vars::PORT, port)))?;
        }
        Ok(())
    }

    /// Find the cover configured at `address`.
    pub fn cover(&self, address: X10Address) -> Option<&CoverConfig> {
        self.covers.iter().find(|c| c.address == address)
    }
}
