use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ServiceError;

/// Mess (canteen) categories that have a menu collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessType {
    MensVeg,
    MensNonVeg,
    MensSpecial,
    WomensVeg,
    WomensNonVeg,
    WomensSpecial,
}

impl MessType {
    /// The full whitelist, in the order it is reported to clients
    pub const ALL: [MessType; 6] = [
        MessType::MensVeg,
        MessType::MensNonVeg,
        MessType::MensSpecial,
        MessType::WomensVeg,
        MessType::WomensNonVeg,
        MessType::WomensSpecial,
    ];

    /// Canonical name, which is also the name of the backing collection
    pub fn as_str(&self) -> &'static str {
        match self {
            MessType::MensVeg => "MensVeg",
            MessType::MensNonVeg => "MensNonVeg",
            MessType::MensSpecial => "MensSpecial",
            MessType::WomensVeg => "WomensVeg",
            MessType::WomensNonVeg => "WomensNonVeg",
            MessType::WomensSpecial => "WomensSpecial",
        }
    }

    /// Comma separated list of every accepted mess type
    pub fn valid_options() -> String {
        Self::ALL
            .iter()
            .map(MessType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessType {
    type Err = ServiceError;

    // Case-sensitive: "mensveg" is not a mess type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mess_type| mess_type.as_str() == s)
            .ok_or_else(|| ServiceError::InvalidMessType {
                mess_type: s.to_string(),
            })
    }
}
