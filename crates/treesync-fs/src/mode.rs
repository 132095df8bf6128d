//! POSIX permission modes in their four-digit octal spelling

use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// The only accepted spelling of a mode: exactly four octal digits.
pub const MODE_PATTERN: &str = "[0-7]{4}";

static MODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-7]{4}$").unwrap());

/// A permission quadruple such as `0755`, including the special-bits digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mode(u32);

impl Mode {
    /// Parse a mode string, accepting exactly four digits in `0`-`7`.
    pub fn parse(value: &str) -> Result<Self> {
        if !MODE_REGEX.is_match(value) {
            return Err(Error::InvalidMode {
                value: value.to_string(),
                pattern: MODE_PATTERN,
            });
        }
        u32::from_str_radix(value, 8)
            .map(Self)
            .map_err(|_| Error::InvalidMode {
                value: value.to_string(),
                pattern: MODE_PATTERN,
            })
    }

    /// Build a mode from permission bits, keeping only the lower twelve.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & 0o7777)
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl std::str::FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_to_four_digits() {
        assert_eq!(Mode::parse("0644").unwrap().to_string(), "0644");
        assert_eq!(Mode::from_bits(0o100755).to_string(), "0755");
    }

    #[test]
    fn special_bits_survive() {
        assert_eq!(Mode::parse("4755").unwrap().bits(), 0o4755);
    }

    #[test]
    fn error_names_pattern() {
        let err = Mode::parse("755").unwrap_err();
        assert_eq!(
            err.to_string(),
            "mode \"755\" does not match regex: \"[0-7]{4}\""
        );
    }
}
