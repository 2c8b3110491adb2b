//! The externally visible result of one validation.
//!
//! Field names on the wire are the response contract consumed by existing
//! clients (`mensaje`, `razon`, `datos`, ...), so they are renamed here
//! rather than in the Rust identifiers.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::diagnostics::Diagnostics;

pub const MSG_INCOMPLETE: &str = "Token incompleto, debe contener 3 partes separadas por puntos";
pub const MSG_CORRUPT: &str = "Token corrupto o malformado";
pub const MSG_MALFORMED: &str = "Token mal formado";
pub const MSG_HEADER: &str = "Error en el header del token";
pub const MSG_NOT_YET_VALID: &str = "El token tiene una fecha de emisión en el futuro";
pub const MSG_EXPIRED: &str = "El token ha superado su fecha de expiración";
pub const MSG_BAD_SIGNATURE: &str = "La firma no coincide con la clave proporcionada";
pub const MSG_VALID: &str = "Token válido y no expirado";

/// Terminal state of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeState {
    Valid,
    Invalid,
    Corrupt,
}

impl fmt::Display for OutcomeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutcomeState::Valid => "valid",
            OutcomeState::Invalid => "invalid",
            OutcomeState::Corrupt => "corrupt",
        })
    }
}

/// Whatever the pipeline learned about the token before it stopped.
#[derive(Clone, Default, PartialEq, Serialize)]
pub struct OutcomeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Value>,

    /// The verification key, present only on a valid outcome.
    #[serde(rename = "claveSecreta", skip_serializing_if = "Option::is_none")]
    pub resolved_key: Option<String>,

    #[serde(rename = "iat", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,

    #[serde(rename = "exp", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl OutcomeData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Debug for OutcomeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeData")
            .field("header", &self.header)
            .field("payload", &self.payload.as_ref().map(|_| "[REDACTED]"))
            .field("signature", &self.signature)
            .field("resolved_key", &self.resolved_key.as_ref().map(|_| "[REDACTED]"))
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The result of validating one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub state: OutcomeState,

    #[serde(rename = "mensaje")]
    pub message: String,

    #[serde(rename = "razon", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "partesEncontradas", skip_serializing_if = "Option::is_none")]
    pub segments_found: Option<usize>,

    #[serde(rename = "datos", skip_serializing_if = "OutcomeData::is_empty")]
    pub data: OutcomeData,

    /// Findings behind this outcome, kept for logging and tests.
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

impl ValidationOutcome {
    pub fn new(state: OutcomeState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            reason: None,
            error: None,
            segments_found: None,
            data: OutcomeData::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.state == OutcomeState::Valid
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach the findings, deriving the `error` text from them.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.error = diagnostics.joined();
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_data(mut self, data: OutcomeData) -> Self {
        self.data = data;
        self
    }

    /// JSON view of the outcome with the key removed, for persistence.
    pub fn redacted_json(&self) -> Value {
        let mut copy = self.clone();
        copy.data.resolved_key = None;
        serde_json::to_value(&copy).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::StructuralError;
    use serde_json::json;

    #[test]
    fn test_minimal_outcome_serialization() {
        let mut outcome = ValidationOutcome::new(OutcomeState::Invalid, MSG_INCOMPLETE);
        outcome.segments_found = Some(2);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "state": "invalid",
                "mensaje": MSG_INCOMPLETE,
                "partesEncontradas": 2
            })
        );
    }

    #[test]
    fn test_full_outcome_serialization() {
        let outcome = ValidationOutcome::new(OutcomeState::Valid, MSG_VALID).with_data(OutcomeData {
            header: Some(json!({"alg": "HS256"})),
            payload: Some(json!({"sub": "x"})),
            signature: Some(json!("abc")),
            resolved_key: Some("k".to_string()),
            issued_at: Some("2023-11-14T22:13:20.000Z".to_string()),
            expires_at: None,
        });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["state"], "valid");
        assert_eq!(value["datos"]["claveSecreta"], "k");
        assert_eq!(value["datos"]["iat"], "2023-11-14T22:13:20.000Z");
        assert!(value["datos"].get("exp").is_none());
    }

    #[test]
    fn test_diagnostics_fill_error_text() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(StructuralError::EmptyPayload);
        let outcome = ValidationOutcome::new(OutcomeState::Invalid, MSG_MALFORMED)
            .with_diagnostics(diagnostics);
        assert_eq!(outcome.error.as_deref(), Some("Payload vacío o mal formado"));
        assert!(serde_json::to_value(&outcome).unwrap().get("diagnostics").is_none());
    }

    #[test]
    fn test_redacted_json_drops_key() {
        let outcome = ValidationOutcome::new(OutcomeState::Valid, MSG_VALID).with_data(OutcomeData {
            resolved_key: Some("s3cret".to_string()),
            ..OutcomeData::default()
        });
        let redacted = outcome.redacted_json();
        assert!(!redacted.to_string().contains("s3cret"));
        assert_eq!(redacted["state"], "valid");
    }

    #[test]
    fn test_debug_redacts_key_and_payload() {
        let data = OutcomeData {
            payload: Some(json!({"secretClaim": 1})),
            resolved_key: Some("s3cret".to_string()),
            ..OutcomeData::default()
        };
        let debug = format!("{data:?}");
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("secretClaim"));
    }
}
