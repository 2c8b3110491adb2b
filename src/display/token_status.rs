//! Token status display for temporal claims.
//!
//! Renders human-readable status information for JWT temporal claims
//! (`exp`, `iat`, `nbf`) including expiry status with color coding.

use nu_ansi_term::Color;
use serde_json::{Map, Value};

use crate::core::temporal::iso_timestamp;

/// Overall temporal status of a token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// `exp` lies in the past by this many seconds.
    Expired { ago: i64 },
    /// `nbf` or `iat` lies in the future by this many seconds.
    NotYetValid { valid_in: i64 },
    /// Usable; `expires_in` is `None` without an `exp` claim.
    Valid { expires_in: Option<i64> },
}

/// Work out the status of `payload` at `now` (Unix seconds).
pub fn token_status(payload: &Map<String, Value>, now: i64) -> TokenStatus {
    let claim = |name: &str| payload.get(name).and_then(Value::as_f64).map(|t| t as i64);

    if let Some(exp) = claim("exp").filter(|exp| *exp < now) {
        return TokenStatus::Expired {
            ago: now.saturating_sub(exp),
        };
    }
    if let Some(start) = [claim("nbf"), claim("iat")]
        .into_iter()
        .flatten()
        .filter(|t| *t > now)
        .max()
    {
        return TokenStatus::NotYetValid {
            valid_in: start.saturating_sub(now),
        };
    }
    TokenStatus::Valid {
        expires_in: claim("exp").map(|exp| exp.saturating_sub(now)),
    }
}

/// Render the status block: one line per present temporal claim, then the
/// overall status.
pub fn render_token_status(payload: &Map<String, Value>, now: i64, use_color: bool) -> String {
    let mut lines = Vec::new();
    for (name, label) in [("iat", "Issued at"), ("nbf", "Not before"), ("exp", "Expires at")] {
        if let Some(t) = payload.get(name).and_then(Value::as_f64) {
            let when = iso_timestamp(t).unwrap_or_else(|| t.to_string());
            let delta = (t as i64).saturating_sub(now);
            lines.push(format!("{label:<11} {when} ({})", relative(delta)));
        }
    }

    let (color, text) = match token_status(payload, now) {
        TokenStatus::Expired { ago } => (Color::Red, format!("EXPIRED ({} ago)", human(ago))),
        TokenStatus::NotYetValid { valid_in } => (
            Color::Yellow,
            format!("NOT YET VALID (valid in {})", human(valid_in)),
        ),
        TokenStatus::Valid {
            expires_in: Some(secs),
        } => (Color::Green, format!("VALID (expires in {})", human(secs))),
        TokenStatus::Valid { expires_in: None } => (Color::Green, "VALID (no expiry)".to_string()),
    };
    let status = if use_color {
        color.bold().paint(text).to_string()
    } else {
        text
    };
    lines.push(format!("{:<11} {status}", "Status"));
    lines.join("\n")
}

/// Print the status block to stdout.
pub fn display_token_status(payload: &Map<String, Value>, now: i64, use_color: bool) {
    println!("{}", render_token_status(payload, now, use_color));
}

fn relative(delta: i64) -> String {
    match delta {
        0 => "now".to_string(),
        d if d > 0 => format!("in {}", human(d)),
        d => format!("{} ago", human(d.saturating_neg())),
    }
}

/// Largest two units of a non-negative duration, e.g. `2h 5m`.
fn human(seconds: i64) -> String {
    const UNITS: [(i64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];
    let mut rest = seconds.max(0);
    let parts: Vec<String> = UNITS
        .iter()
        .filter_map(|(size, suffix)| {
            let n = rest / size;
            rest %= size;
            (n > 0).then(|| format!("{n}{suffix}"))
        })
        .take(2)
        .collect();
    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn map(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("test helper expects an object");
        };
        map
    }

    #[test]
    fn test_status_expired() {
        let status = token_status(&map(json!({"exp": NOW - 90})), NOW);
        assert_eq!(status, TokenStatus::Expired { ago: 90 });
    }

    #[test]
    fn test_status_not_yet_valid() {
        let status = token_status(&map(json!({"nbf": NOW + 30, "exp": NOW + 60})), NOW);
        assert_eq!(status, TokenStatus::NotYetValid { valid_in: 30 });
    }

    #[test]
    fn test_status_valid_without_exp() {
        let status = token_status(&map(json!({"iat": NOW})), NOW);
        assert_eq!(status, TokenStatus::Valid { expires_in: None });
    }

    #[test]
    fn test_render_plain() {
        let rendered = render_token_status(&map(json!({"iat": NOW - 60, "exp": NOW + 7_500})), NOW, false);
        assert_eq!(
            rendered,
            "Issued at   2023-11-14T22:12:20.000Z (1m ago)\n\
             Expires at  2023-11-15T00:18:20.000Z (in 2h 5m)\n\
             Status      VALID (expires in 2h 5m)"
        );
    }

    #[test]
    fn test_status_out_of_range_claims_saturate() {
        let status = token_status(&map(json!({"exp": -1e19})), NOW);
        assert_eq!(status, TokenStatus::Expired { ago: i64::MAX });

        let status = token_status(&map(json!({"nbf": 1e19})), NOW);
        assert_eq!(
            status,
            TokenStatus::NotYetValid {
                valid_in: i64::MAX - NOW
            }
        );
    }

    #[test]
    fn test_render_out_of_range_claims() {
        let rendered = render_token_status(&map(json!({"sub": "x", "exp": -1e19})), NOW, false);
        assert!(rendered.contains("Expires at"));
        assert!(rendered.contains(" ago)"));
        assert!(rendered.contains("EXPIRED ("));

        let rendered = render_token_status(&map(json!({"iat": 1e19})), NOW, false);
        assert!(rendered.contains("NOT YET VALID"));
    }

    #[test]
    fn test_human_durations() {
        assert_eq!(human(0), "0s");
        assert_eq!(human(59), "59s");
        assert_eq!(human(3_661), "1h 1m");
        assert_eq!(human(90_061), "1d 1h");
    }
}
