//! X10 addressing and transport selection.
//!
//! An X10 address is a house code `A`..`P` followed by a unit code `1`..`16`.
//! Addresses are accepted in either case and always rendered lower case,
//! which is the form mochad expects on the wire (`pl a1 on`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::X10Error;

/// House/unit address of a single X10 device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct X10Address {
    house: char,
    unit: u8,
}

impl X10Address {
    /// Build an address from its parts.
    pub fn new(house: char, unit: u8) -> Result<Self, X10Error> {
        let house = house.to_ascii_lowercase();
        if !('a'..='p').contains(&house) || !(1..=16).contains(&unit) {
            return Err(X10Error::InvalidAddress(format!("{}{}", house, unit)));
        }
        Ok(Self { house, unit })
    }

    /// House code, lower case.
    pub fn house(&self) -> char {
        self.house
    }

    /// Unit code, 1..=16.
    pub fn unit(&self) -> u8 {
        self.unit
    }
}

impl FromStr for X10Address {
    type Err = X10Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let house = chars
            .next()
            .ok_or_else(|| X10Error::InvalidAddress(s.to_string()))?;
        let digits = chars.as_str();

        // Reject signs and leading zeros so "a01" and "a+1" never alias "a1".
        if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(X10Error::InvalidAddress(s.to_string()));
        }
        let unit = digits
            .parse::<u8>()
            .map_err(|_| X10Error::InvalidAddress(s.to_string()))?;

        Self::new(house, unit).map_err(|_| X10Error::InvalidAddress(s.to_string()))
    }
}

impl TryFrom<String> for X10Address {
    type Error = X10Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<X10Address> for String {
    fn from(addr: X10Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for X10Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.house, self.unit)
    }
}

/// Medium the controller uses to reach a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommMode {
    /// Power-line carrier
    #[default]
    #[serde(rename = "pl")]
    PowerLine,
    /// Radio frequency
    #[serde(rename = "rf")]
    Rf,
}

impl CommMode {
    /// Wire prefix used by mochad.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PowerLine => "pl",
            Self::Rf => "rf",
        }
    }
}

impl FromStr for CommMode {
    type Err = X10Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pl" => Ok(Self::PowerLine),
            "rf" => Ok(Self::Rf),
            _ => Err(X10Error::InvalidCommMode(s.to_string())),
        }
    }
}

impl fmt::Display for CommMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
