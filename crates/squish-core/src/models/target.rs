use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SquishError;

/// Unit of the user-entered target size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeUnit {
    #[default]
    #[serde(rename = "KB")]
    Kb,
    #[serde(rename = "MB")]
    Mb,
}

impl SizeUnit {
    pub fn kilobytes_per_unit(self) -> f64 {
        match self {
            SizeUnit::Kb => 1.0,
            SizeUnit::Mb => 1024.0,
        }
    }
}

impl FromStr for SizeUnit {
    type Err = SquishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KB" => Ok(SizeUnit::Kb),
            "MB" => Ok(SizeUnit::Mb),
            _ => Err(SquishError::InvalidUnit(s.to_string())),
        }
    }
}

impl Display for SizeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SizeUnit::Kb => write!(f, "KB"),
            SizeUnit::Mb => write!(f, "MB"),
        }
    }
}

/// A validated target size: finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSize {
    value: f64,
    unit: SizeUnit,
}

impl TargetSize {
    pub fn new(value: f64, unit: SizeUnit) -> Result<Self, SquishError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SquishError::InvalidTarget(value.to_string()));
        }
        Ok(Self { value, unit })
    }

    /// Parse the raw contents of the target-size field.
    ///
    /// Uses the numeric prefix of the input, so `"12 kb"` is 12 and `"abc"` is
    /// rejected.
    pub fn parse(input: &str, unit: SizeUnit) -> Result<Self, SquishError> {
        let value = parse_leading_float(input)
            .ok_or_else(|| SquishError::InvalidTarget(input.to_string()))?;
        Self::new(value, unit)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// The value sent as `targetSizeKB`.
    pub fn to_kb(&self) -> f64 {
        self.value * self.unit.kilobytes_per_unit()
    }
}

/// Parse the longest numeric prefix of `input` after leading whitespace.
///
/// Returns `None` when no prefix is a number. The result may be non-finite
/// (`"inf"`), callers decide whether that is acceptable.
pub fn parse_leading_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let prefix_len = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;

    (1..=prefix_len)
        .rev()
        .find_map(|end| trimmed[..end].parse::<f64>().ok())
}
