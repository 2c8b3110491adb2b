//! Display-only token decoding.
//!
//! Splits a token and decodes its header and payload for inspection. No
//! structural rules, header semantics or signature checks are applied;
//! use [`super::validator::Validator`] for that.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::JwtAuditError;

use super::segment::{SegmentContent, decode_segment};
use super::structure::{StructuralError, split_segments};

/// The decoded parts of a JWT.
///
/// Implements a custom `Debug` that redacts `payload` and `signature`
/// to prevent accidental leakage of sensitive claim data.
pub struct DecodedToken {
    /// The parsed JWT header (typically contains `alg` and `typ`).
    pub header: Map<String, Value>,
    /// The parsed JWT payload (claims).
    pub payload: Map<String, Value>,
    /// The raw base64url-encoded signature segment.
    pub signature: String,
}

/// Custom `Debug` that redacts payload and signature to prevent
/// accidental leakage through debug formatting or error chains.
impl fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

impl DecodedToken {
    /// Header, payload and signature as one JSON document.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "header": self.header,
            "payload": self.payload,
            "signature": self.signature,
        })
    }
}

/// Decode a raw JWT string into its constituent parts.
///
/// # Errors
///
/// Returns an error if the token doesn't have exactly three parts, or if
/// the header or payload is not a base64url-encoded JSON object.
pub fn decode_token(token: &str) -> Result<DecodedToken, JwtAuditError> {
    let [header, payload, signature] = split_segments(token).map_err(|err| match err {
        StructuralError::SegmentCount { found } => JwtAuditError::InvalidTokenFormat { found },
        other => JwtAuditError::SegmentDecode {
            segment: "token".to_string(),
            reason: other.to_string(),
        },
    })?;

    Ok(DecodedToken {
        header: decode_object(header, "header")?,
        payload: decode_object(payload, "payload")?,
        signature: signature.to_string(),
    })
}

fn decode_object(segment: &str, name: &str) -> Result<Map<String, Value>, JwtAuditError> {
    let fail = |reason: String| JwtAuditError::SegmentDecode {
        segment: name.to_string(),
        reason,
    };
    match decode_segment(segment).content {
        SegmentContent::Json(map) => Ok(map),
        SegmentContent::Text(_) => Err(fail("expected a JSON object".to_string())),
        SegmentContent::Binary => Err(fail("decoded bytes are not UTF-8".to_string())),
        SegmentContent::DecodeError(err) => Err(fail(err.to_string())),
    }
}
