//! Parsing of human-readable delivery estimates
//!
//! Listing cards show estimates like "30-40 min" or "1 hr". This module
//! turns them into a [`Duration`]. A range resolves to its upper bound,
//! the pessimistic figure a delivery ETA should report.

use std::time::Duration;
use thiserror::Error;

/// Errors from delivery-estimate parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty delivery estimate")]
    Empty,

    #[error("missing time unit in {0:?}")]
    MissingUnit(String),

    #[error("unrecognized time unit {0:?}")]
    UnknownUnit(String),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Parses a delivery estimate such as "30-40 min", "45 mins" or "1 hr"
///
/// Accepted shapes are `N unit` and `N-M unit`; the unit may also be glued
/// to the number ("40min"). Ranges resolve to the upper bound.
pub fn parse_estimate(raw: &str) -> Result<Duration, DurationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DurationError::Empty);
    }

    let (amount, unit) = split_amount(raw)?;

    // "30-40" resolves to 40
    let upper = amount
        .rsplit('-')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DurationError::InvalidNumber(amount.to_string()))?;

    let value: f64 = upper
        .parse()
        .map_err(|_| DurationError::InvalidNumber(upper.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(DurationError::InvalidNumber(upper.to_string()));
    }

    // Absurd magnitudes overflow Duration; treat them like any other bad
    // number rather than panicking on hostile markup.
    let seconds = value * unit_seconds(unit)?;
    Duration::try_from_secs_f64(seconds).map_err(|_| DurationError::InvalidNumber(upper.to_string()))
}

/// Splits "30-40 min" into ("30-40", "min"), also handling glued forms
/// like "40min"
fn split_amount(raw: &str) -> Result<(&str, &str), DurationError> {
    let boundary = raw
        .find(|c: char| c.is_ascii_alphabetic())
        .ok_or_else(|| DurationError::MissingUnit(raw.to_string()))?;
    if boundary == 0 {
        return Err(DurationError::InvalidNumber(raw.to_string()));
    }

    let (amount, unit) = raw.split_at(boundary);
    Ok((amount.trim(), unit.trim()))
}

fn unit_seconds(unit: &str) -> Result<f64, DurationError> {
    match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(1.0),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(60.0),
        "h" | "hr" | "hrs" | "hour" | "hours" => Ok(3600.0),
        other => Err(DurationError::UnknownUnit(other.to_string())),
    }
}
