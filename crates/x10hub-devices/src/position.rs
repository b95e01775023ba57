//! Cover position values and their mapping to device levels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::X10Error;

/// Highest level accepted by the shutter's extended-code command.
pub const DEVICE_LEVEL_MAX: u8 = 25;

/// Stored positions at or below this are reported as fully closed.
pub const CLOSED_THRESHOLD: u8 = 5;

/// Stored positions at or above this are reported as fully open.
pub const OPEN_THRESHOLD: u8 = 95;

/// Logical cover position, 0 (closed) to 100 (open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct CoverPosition(u8);

impl CoverPosition {
    pub const CLOSED: Self = Self(0);
    pub const OPEN: Self = Self(100);

    pub fn new(value: u8) -> Result<Self, X10Error> {
        if value > 100 {
            return Err(X10Error::InvalidPosition(i64::from(value)));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Rescale to the device's 0..=25 command range, truncating.
    pub fn device_level(&self) -> u8 {
        // 25 * 100 fits in u16
        (u16::from(DEVICE_LEVEL_MAX) * u16::from(self.0) / 100) as u8
    }
}

impl TryFrom<u8> for CoverPosition {
    type Error = X10Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for CoverPosition {
    type Error = X10Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(X10Error::InvalidPosition(value))
    }
}

impl From<CoverPosition> for u8 {
    fn from(p: CoverPosition) -> Self {
        p.0
    }
}

impl fmt::Display for CoverPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position as reported to the host.
///
/// Dimmer-based shutters land a few percent off their end stops, so values
/// near either end snap to 0 or 100.
pub fn reported_position(stored: Option<u8>) -> Option<u8> {
    stored.map(|p| {
        if p <= CLOSED_THRESHOLD {
            0
        } else if p >= OPEN_THRESHOLD {
            100
        } else {
            p
        }
    })
}
