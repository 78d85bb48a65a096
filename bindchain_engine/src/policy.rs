//! Checking policy for binding construction.
//!
//! A policy is chosen when a root frame is created and inherited by every frame
//! extending it, so chains built for different queries can use different settings.

use lazy_static::lazy_static;
use serde::Deserialize;

pub const CHECKING_ENV: &str = "BINDCHAIN_CHECKING";
pub const UNIQUE_NAMES_ENV: &str = "BINDCHAIN_UNIQUE_NAMES";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckPolicy {
    /// Run validity checks on every `add`. Turn off for throughput.
    pub checking: bool,
    /// Warn when a variable is already bound somewhere along the chain.
    /// Only consulted when `checking` is on.
    pub unique_names: bool,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            checking: true,
            unique_names: true,
        }
    }
}

lazy_static! {
    static ref PROCESS_DEFAULT: CheckPolicy = CheckPolicy::from_env();
}

impl CheckPolicy {
    pub fn unchecked() -> Self {
        Self {
            checking: false,
            unique_names: false,
        }
    }

    /// Development defaults, overridden by `BINDCHAIN_CHECKING` and
    /// `BINDCHAIN_UNIQUE_NAMES` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The policy used by roots created without an explicit one. Read from the
    /// environment on first use.
    pub fn process_default() -> Self {
        *PROCESS_DEFAULT
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            checking: lookup(CHECKING_ENV)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.checking),
            unique_names: lookup(UNIQUE_NAMES_ENV)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.unique_names),
        }
    }

    /// Whether `add` should look up the variable along the chain before storing.
    pub fn checks_unique_names(&self) -> bool {
        self.checking && self.unique_names
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
