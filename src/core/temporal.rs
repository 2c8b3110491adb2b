//! Temporal and claim-level rules.
//!
//! One rule set serves both surfaces: [`evaluate_time`] is the
//! short-circuiting verdict used on the verification path, and
//! [`evaluate_claims`] is the exhaustive report behind `analyze`. Both read
//! the `iat`/`nbf`/`exp` rules from [`temporal_violations`].

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Longest lifetime (`exp - iat`) that does not raise a warning.
const MAX_RECOMMENDED_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Accepted values of the application `role` claim.
pub const KNOWN_ROLES: [&str; 3] = ["admin", "user", "guest"];

/// Signing algorithms registered by RFC 7518, for `analyze` warnings.
const STANDARD_ALGORITHMS: [&str; 12] = [
    "HS256", "HS384", "HS512", "RS256", "RS384", "RS512", "ES256", "ES384", "ES512", "PS256",
    "PS384", "PS512",
];

static SUBJECT_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9@._-]+$").expect("subject pattern is valid"));

/// A time-based reason the token is not usable right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporalError {
    /// `iat` or `nbf` lies strictly in the future.
    #[error("Token no válido aún: '{claim}' ({at}) está en el futuro")]
    NotYetValid { claim: &'static str, at: String },

    /// `exp` lies strictly in the past.
    #[error("Token expirado: 'exp' ({at}) ya pasó")]
    Expired { at: String },
}

impl TemporalError {
    /// Short, stable reason reported on the outcome.
    pub fn reason(&self) -> &'static str {
        match self {
            TemporalError::NotYetValid { .. } => "Token no válido aún",
            TemporalError::Expired { .. } => "Token expirado",
        }
    }

    /// Longer human-readable explanation.
    pub fn explanation(&self) -> &'static str {
        match self {
            TemporalError::NotYetValid { claim: "nbf", .. } => {
                "El token tiene una fecha de inicio de validez (nbf) en el futuro"
            }
            TemporalError::NotYetValid { .. } => {
                "El token tiene una fecha de emisión (iat) en el futuro"
            }
            TemporalError::Expired { .. } => "El token ha superado su fecha de expiración",
        }
    }
}

/// Result of the verification-path time check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalVerdict {
    /// `iat` as ISO-8601, when numeric.
    pub issued_at: Option<String>,
    /// `exp` as ISO-8601, when numeric.
    pub expires_at: Option<String>,
    /// First violated rule, if any.
    pub violation: Option<TemporalError>,
}

/// Evaluate `iat`, `nbf` and `exp` against `now` (Unix seconds).
///
/// The first violation in that order wins. A token expiring exactly at
/// `now` is still live.
pub fn evaluate_time(payload: &Map<String, Value>, now: i64) -> TemporalVerdict {
    TemporalVerdict {
        issued_at: numeric_claim(payload, "iat").and_then(iso_timestamp),
        expires_at: numeric_claim(payload, "exp").and_then(iso_timestamp),
        violation: temporal_violations(payload, now).into_iter().next(),
    }
}

/// Every temporal rule the payload breaks, in `iat`, `nbf`, `exp` order.
pub fn temporal_violations(payload: &Map<String, Value>, now: i64) -> Vec<TemporalError> {
    let now = now as f64;
    let mut violations = Vec::new();

    for claim in ["iat", "nbf"] {
        if let Some(at) = numeric_claim(payload, claim).filter(|t| *t > now) {
            violations.push(TemporalError::NotYetValid {
                claim,
                at: render_instant(at),
            });
        }
    }

    if let Some(at) = numeric_claim(payload, "exp").filter(|t| *t < now) {
        violations.push(TemporalError::Expired {
            at: render_instant(at),
        });
    }

    violations
}

fn numeric_claim(payload: &Map<String, Value>, claim: &str) -> Option<f64> {
    payload.get(claim).and_then(Value::as_f64)
}

/// Render Unix seconds as `YYYY-MM-DDTHH:MM:SS.sssZ`.
///
/// Returns `None` for instants chrono cannot represent.
pub fn iso_timestamp(unix_seconds: f64) -> Option<String> {
    if !unix_seconds.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis((unix_seconds * 1000.0) as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn render_instant(unix_seconds: f64) -> String {
    iso_timestamp(unix_seconds).unwrap_or_else(|| unix_seconds.to_string())
}

/// A finding from the exhaustive claim analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimIssue {
    #[error("Error semántico: el header debe contener el claim 'alg'")]
    MissingAlg,

    #[error("Advertencia: algoritmo '{alg}' no es estándar")]
    NonStandardAlg { alg: String },

    #[error("Advertencia: algoritmo 'none' no es seguro")]
    UnsignedAlg,

    #[error("Advertencia: el tipo '{typ}' no es 'JWT'")]
    UnusualTyp { typ: String },

    #[error("Error de tipo: '{claim}' debe ser {expected}, se encontró {found}")]
    WrongType {
        claim: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Error de valor: '{claim}' debe ser un timestamp UNIX positivo")]
    NegativeTimestamp { claim: &'static str },

    #[error("Error temporal: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Advertencia: token en el límite de expiración (exp = ahora)")]
    ExpiresNow,

    #[error("Error semántico: iat > exp (el token está emitido después de expirar)")]
    IssuedAfterExpiry,

    #[error("Advertencia: duración mayor a 24 horas (exp - iat = {seconds}s)")]
    LongLived { seconds: i64 },

    #[error("Error semántico: nbf > exp (nunca será válido)")]
    NeverValid,

    #[error("Advertencia: 'nbf' es anterior a 'iat'")]
    NotBeforePrecedesIssue,

    #[error("Advertencia: 'sub' contiene caracteres no estándar")]
    UnusualSubject,

    #[error("Error de valor: 'role' debe ser uno de {{admin, user, guest}}, se encontró {found}")]
    UnknownRole { found: String },

    #[error("Error de valor: 'userId' debe ser > 0, se encontró {found}")]
    NonPositiveUserId { found: String },

    #[error("Advertencia: faltan claims recomendados: {}", .missing.join(", "))]
    MissingRecommended { missing: Vec<&'static str> },
}

/// Summary numbers shown alongside an analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsMetadata {
    pub total_claims: usize,
    pub is_expired: bool,
    pub is_not_yet_valid: bool,
    pub time_to_expiry: Option<i64>,
}

/// Exhaustive result of [`evaluate_claims`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsReport {
    pub errors: Vec<ClaimIssue>,
    pub warnings: Vec<ClaimIssue>,
    pub metadata: ClaimsMetadata,
}

impl ClaimsReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, issue: impl Into<ClaimIssue>) {
        self.errors.push(issue.into());
    }

    fn warn(&mut self, issue: ClaimIssue) {
        self.warnings.push(issue);
    }
}

/// Run every header and payload rule without short-circuiting.
pub fn evaluate_claims(
    header: &Map<String, Value>,
    payload: &Map<String, Value>,
    now: i64,
) -> ClaimsReport {
    let mut report = ClaimsReport::default();

    check_header_claims(header, &mut report);
    let iat = check_timestamp(payload, "iat", &mut report);
    let exp = check_timestamp(payload, "exp", &mut report);
    let nbf = check_timestamp(payload, "nbf", &mut report);

    for violation in temporal_violations(payload, now) {
        report.error(violation);
    }
    if exp == Some(now) {
        report.warn(ClaimIssue::ExpiresNow);
    }

    if let (Some(iat), Some(exp)) = (iat, exp) {
        if iat > exp {
            report.error(ClaimIssue::IssuedAfterExpiry);
        } else if exp - iat > MAX_RECOMMENDED_LIFETIME_SECS {
            report.warn(ClaimIssue::LongLived { seconds: exp - iat });
        }
    }
    if let (Some(nbf), Some(exp)) = (nbf, exp) {
        if nbf > exp {
            report.error(ClaimIssue::NeverValid);
        }
    }
    if let (Some(nbf), Some(iat)) = (nbf, iat) {
        if nbf < iat {
            report.warn(ClaimIssue::NotBeforePrecedesIssue);
        }
    }

    check_string_claims(payload, &mut report);
    check_application_claims(payload, &mut report);

    let missing: Vec<&'static str> = ["iat", "exp"]
        .into_iter()
        .filter(|claim| !payload.contains_key(*claim))
        .collect();
    if !missing.is_empty() {
        report.warn(ClaimIssue::MissingRecommended { missing });
    }

    let exp_secs = numeric_claim(payload, "exp");
    report.metadata = ClaimsMetadata {
        total_claims: payload.len(),
        is_expired: exp_secs.is_some_and(|e| e < now as f64),
        is_not_yet_valid: numeric_claim(payload, "nbf").is_some_and(|n| n > now as f64),
        time_to_expiry: exp_secs.map(|e| (e as i64).saturating_sub(now).max(0)),
    };

    report
}

fn check_header_claims(header: &Map<String, Value>, report: &mut ClaimsReport) {
    match header.get("alg") {
        None | Some(Value::Null) => report.error(ClaimIssue::MissingAlg),
        Some(Value::String(alg)) if alg == "none" => report.warn(ClaimIssue::UnsignedAlg),
        Some(Value::String(alg)) if !STANDARD_ALGORITHMS.contains(&alg.as_str()) => {
            report.warn(ClaimIssue::NonStandardAlg { alg: alg.clone() })
        }
        Some(Value::String(_)) => {}
        Some(other) => report.error(ClaimIssue::WrongType {
            claim: "alg".to_string(),
            expected: "String",
            found: type_name(other),
        }),
    }

    if let Some(typ) = header.get("typ").filter(|t| t.as_str() != Some("JWT")) {
        let typ = typ.as_str().map_or_else(|| typ.to_string(), str::to_string);
        report.warn(ClaimIssue::UnusualTyp { typ });
    }
}

/// Type-check a timestamp claim, returning it when it is a usable integer.
fn check_timestamp(
    payload: &Map<String, Value>,
    claim: &'static str,
    report: &mut ClaimsReport,
) -> Option<i64> {
    let value = payload.get(claim)?;
    match as_integer(value) {
        None => {
            report.error(ClaimIssue::WrongType {
                claim: claim.to_string(),
                expected: "Number (entero)",
                found: type_name(value),
            });
            None
        }
        Some(n) if n < 0 => {
            report.error(ClaimIssue::NegativeTimestamp { claim });
            None
        }
        Some(n) => Some(n),
    }
}

fn check_string_claims(payload: &Map<String, Value>, report: &mut ClaimsReport) {
    for claim in ["iss", "sub", "jti"] {
        if let Some(value) = payload.get(claim).filter(|v| !v.is_string()) {
            report.error(ClaimIssue::WrongType {
                claim: claim.to_string(),
                expected: "String",
                found: type_name(value),
            });
        }
    }

    if let Some(Value::String(sub)) = payload.get("sub") {
        if !SUBJECT_CHARSET.is_match(sub) {
            report.warn(ClaimIssue::UnusualSubject);
        }
    }

    if let Some(aud) = payload.get("aud") {
        let ok = match aud {
            Value::String(_) => true,
            Value::Array(items) => items.iter().all(Value::is_string),
            _ => false,
        };
        if !ok {
            report.error(ClaimIssue::WrongType {
                claim: "aud".to_string(),
                expected: "String | Array<String>",
                found: type_name(aud),
            });
        }
    }
}

fn check_application_claims(payload: &Map<String, Value>, report: &mut ClaimsReport) {
    if let Some(role) = payload.get("role") {
        if !role.as_str().is_some_and(|r| KNOWN_ROLES.contains(&r)) {
            report.error(ClaimIssue::UnknownRole {
                found: role.to_string(),
            });
        }
    }

    if let Some(user_id) = payload.get("userId") {
        match user_id.as_f64() {
            None => report.error(ClaimIssue::WrongType {
                claim: "userId".to_string(),
                expected: "Number",
                found: type_name(user_id),
            }),
            Some(n) if n <= 0.0 => report.error(ClaimIssue::NonPositiveUserId {
                found: user_id.to_string(),
            }),
            Some(_) => {}
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
