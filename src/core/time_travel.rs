//! Time expressions for simulated clocks and token lifetimes.
//!
//! `--at` accepts relative offsets like `+7d` or `-1h`, ISO 8601 instants,
//! and Unix epoch seconds. `--expires-in` accepts bare durations like `30m`.

use chrono::{DateTime, Duration, Utc};

use crate::error::JwtAuditError;

/// A parsed time target for time-travel evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTarget {
    /// The resolved absolute timestamp.
    pub timestamp: DateTime<Utc>,
    /// The original expression provided by the user.
    pub expression: String,
}

/// Parse a time-travel expression relative to `now`.
///
/// Supports the following formats:
/// - Relative: `+7d`, `-1h`, `+30m`, `+1y`, `-5s`
/// - Absolute ISO 8601: `2024-01-15T14:30:00Z`
/// - Absolute Unix epoch: `1705312200`
///
/// # Errors
///
/// Returns an error if the expression doesn't match any known format or
/// lands outside the representable range.
pub fn parse_time_expression(
    expression: &str,
    now: DateTime<Utc>,
) -> Result<TimeTarget, JwtAuditError> {
    let trimmed = expression.trim();
    let invalid = |reason: &str| JwtAuditError::InvalidTimeExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let timestamp = if let Some(rest) = trimmed.strip_prefix('+') {
        now.checked_add_signed(parse_duration(rest)?)
            .ok_or_else(|| invalid("offset is out of range"))?
    } else if trimmed.starts_with('-') && !trimmed[1..].chars().all(|c| c.is_ascii_digit()) {
        now.checked_sub_signed(parse_duration(&trimmed[1..])?)
            .ok_or_else(|| invalid("offset is out of range"))?
    } else if let Ok(epoch) = trimmed.parse::<i64>() {
        DateTime::from_timestamp(epoch, 0).ok_or_else(|| invalid("epoch is out of range"))?
    } else {
        DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| {
                invalid("expected +/-<n><s|m|h|d|w|y>, an ISO 8601 timestamp, or epoch seconds")
            })?
    };

    Ok(TimeTarget {
        timestamp,
        expression: expression.to_string(),
    })
}

/// Parse a duration like `30s`, `15m`, `1h`, `7d`, `2w` or `1y`.
///
/// # Errors
///
/// Returns an error for a missing or unknown unit, a non-numeric amount,
/// or an amount too large to represent.
pub fn parse_duration(expression: &str) -> Result<Duration, JwtAuditError> {
    let invalid = |reason: &str| JwtAuditError::InvalidTimeExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = expression.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| invalid("missing unit (s, m, h, d, w, y)"))?;
    let (amount, unit) = trimmed.split_at(split);

    let amount: i64 = amount
        .parse()
        .map_err(|_| invalid("amount must be a non-negative integer"))?;
    let seconds_per_unit = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        "y" => 365 * 24 * 60 * 60,
        _ => return Err(invalid("unknown unit; expected s, m, h, d, w or y")),
    };

    amount
        .checked_mul(seconds_per_unit)
        .and_then(Duration::try_seconds)
        .ok_or_else(|| invalid("duration is too large"))
}
