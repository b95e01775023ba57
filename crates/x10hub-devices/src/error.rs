//! Error types for X10 device operations.

/// Errors that can occur while configuring or talking to X10 devices.
#[derive(Debug, thiserror::Error)]
pub enum X10Error {
    /// Address is not a valid house/unit code
    #[error("Invalid X10 address: {0}")]
    InvalidAddress(String),

    /// Unknown communication mode string
    #[error("Invalid communication mode: {0}")]
    InvalidCommMode(String),

    /// Cover position outside 0..=100
    #[error("Invalid cover position: {0}")]
    InvalidPosition(i64),

    /// Could not reach the controller
    #[error("Connection error: {0}")]
    Connection(String),

    /// Controller accepted the connection but the exchange failed
    #[error("Communication error: {0}")]
    Communication(String),

    /// Configuration file or value problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for X10Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type for X10 device operations.
pub type X10Result<T> = Result<T, X10Error>;
