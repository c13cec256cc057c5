//! # Listener Priorities
//!
//! Named priority tiers used when registering converters on a dispatcher.
//! Higher values run first. The named tiers map to fixed numeric bands so
//! feature code can order itself against other features without knowing
//! exact numbers:
//!
//! | Tier      | Value     |
//! |-----------|-----------|
//! | `highest` | `100000`  |
//! | `high`    | `1000`    |
//! | `normal`  | `0`       |
//! | `low`     | `-1000`   |
//! | `lowest`  | `-100000` |
//!
//! Anything in between can be expressed with [`Priority::Custom`].

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PRIORITY_HIGHEST: i32 = 100_000;
pub const PRIORITY_HIGH: i32 = 1_000;
pub const PRIORITY_NORMAL: i32 = 0;
pub const PRIORITY_LOW: i32 = -1_000;
pub const PRIORITY_LOWEST: i32 = -100_000;

/// Listener priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Highest,
    High,
    #[default]
    Normal,
    Low,
    Lowest,
    Custom(i32),
}

impl Priority {
    /// Numeric value used for ordering
    pub fn value(self) -> i32 {
        match self {
            Priority::Highest => PRIORITY_HIGHEST,
            Priority::High => PRIORITY_HIGH,
            Priority::Normal => PRIORITY_NORMAL,
            Priority::Low => PRIORITY_LOW,
            Priority::Lowest => PRIORITY_LOWEST,
            Priority::Custom(value) => value,
        }
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Priority::Custom(value)
    }
}

impl FromStr for Priority {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest" => Ok(Priority::Highest),
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            "lowest" => Ok(Priority::Lowest),
            other => other
                .parse::<i32>()
                .map(Priority::Custom)
                .map_err(|_| CommonError::InvalidPriority(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Highest => write!(f, "highest"),
            Priority::High => write!(f, "high"),
            Priority::Normal => write!(f, "normal"),
            Priority::Low => write!(f, "low"),
            Priority::Lowest => write!(f, "lowest"),
            Priority::Custom(value) => write!(f, "{}", value),
        }
    }
}
