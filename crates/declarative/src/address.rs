//! Instance addresses: `<type>.<name>` and `data.<type>.<name>`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Managed,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub mode: Mode,
    pub resource_type: String,
    pub name: String,
}

impl Address {
    pub fn managed(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: Mode::Managed,
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    pub fn data(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: Mode::Data,
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    pub fn is_data(&self) -> bool {
        self.mode == Mode::Data
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Managed => write!(f, "{}.{}", self.resource_type, self.name),
            Mode::Data => write!(f, "data.{}.{}", self.resource_type, self.name),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            ["data", ty, name] if !ty.is_empty() && !name.is_empty() => Ok(Self::data(*ty, *name)),
            [ty, name] if !ty.is_empty() && !name.is_empty() && *ty != "data" => {
                Ok(Self::managed(*ty, *name))
            }
            _ => Err(Error::InvalidAddress(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_managed() {
        let addr: Address = "quismon_check.api".parse().unwrap();
        assert_eq!(addr, Address::managed("quismon_check", "api"));
        assert_eq!(addr.to_string(), "quismon_check.api");
    }

    #[test]
    fn test_parse_data() {
        let addr: Address = "data.quismon_checks.all".parse().unwrap();
        assert!(addr.is_data());
        assert_eq!(addr.to_string(), "data.quismon_checks.all");
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["quismon_check", "a.b.c", "data.x", ".name", "quismon_check."] {
            assert!(input.parse::<Address>().is_err(), "{input} should not parse");
        }
    }
}
