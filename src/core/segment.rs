//! Base64url segment decoding.
//!
//! Turns one dot-separated token segment into a tagged [`DecodedSegment`].
//! Decoding never fails as a Rust error: every failure mode is a variant
//! of [`SegmentContent`] so later stages can reason about it.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};
use thiserror::Error;

/// Standard-alphabet engine that accepts non-canonical trailing bits and
/// padding that was already present in the input.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why a segment could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// The segment is the empty string.
    #[error("segmento vacío")]
    Empty,

    /// A base64 string of length `4n + 1` cannot be padded into valid input.
    #[error("base64url inválido: longitud {length} imposible de completar con padding (longitud % 4 = 1)")]
    ImpossibleLength {
        /// Length of the segment after alphabet substitution.
        length: usize,
    },

    /// The segment contains characters outside the base64url alphabet.
    #[error("base64url inválido: {reason}")]
    InvalidAlphabet {
        /// Decoder message.
        reason: String,
    },

    /// The bytes are UTF-8 but not JSON.
    #[error("JSONParseError: {reason}")]
    Json {
        /// Parser message.
        reason: String,
    },
}

/// Coarse classification of a decoded segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Json,
    Text,
    Binary,
    DecodeError,
}

/// Decoded content of one segment.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentContent {
    /// UTF-8 text that parsed as a JSON object.
    Json(Map<String, Value>),
    /// UTF-8 text that parsed as JSON but not as an object.
    Text(String),
    /// Bytes that are not UTF-8; opaque, signature-like.
    Binary,
    /// Base64 or JSON failure.
    DecodeError(SegmentError),
}

/// One token segment together with its decoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSegment {
    /// The original base64url substring.
    pub raw: String,
    /// What the substring decoded to.
    pub content: SegmentContent,
}

impl DecodedSegment {
    pub fn kind(&self) -> SegmentKind {
        match self.content {
            SegmentContent::Json(_) => SegmentKind::Json,
            SegmentContent::Text(_) => SegmentKind::Text,
            SegmentContent::Binary => SegmentKind::Binary,
            SegmentContent::DecodeError(_) => SegmentKind::DecodeError,
        }
    }

    /// Best-effort view of the segment for reporting.
    ///
    /// `Json` yields the object, `Text` the decoded text, `Binary` the raw
    /// segment string. Returns `None` exactly when [`Self::error`] is `Some`.
    pub fn value(&self) -> Option<Value> {
        match &self.content {
            SegmentContent::Json(map) => Some(Value::Object(map.clone())),
            SegmentContent::Text(text) => Some(Value::String(text.clone())),
            SegmentContent::Binary => Some(Value::String(self.raw.clone())),
            SegmentContent::DecodeError(_) => None,
        }
    }

    /// The decoded JSON object, if the segment is one.
    pub fn object(&self) -> Option<&Map<String, Value>> {
        match &self.content {
            SegmentContent::Json(map) => Some(map),
            _ => None,
        }
    }

    /// Whether the segment decoded to readable structure (`Json` or `Text`).
    pub fn is_structured(&self) -> bool {
        matches!(
            self.content,
            SegmentContent::Json(_) | SegmentContent::Text(_)
        )
    }
}

/// Decode a base64url segment into a [`DecodedSegment`].
pub fn decode_segment(segment: &str) -> DecodedSegment {
    DecodedSegment {
        raw: segment.to_string(),
        content: decode_content(segment),
    }
}

fn decode_content(segment: &str) -> SegmentContent {
    let bytes = match base64url_to_bytes(segment) {
        Ok(bytes) => bytes,
        Err(err) => return SegmentContent::DecodeError(err),
    };

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => return SegmentContent::Binary,
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => SegmentContent::Json(map),
        Ok(_) => SegmentContent::Text(text),
        Err(e) => SegmentContent::DecodeError(SegmentError::Json {
            reason: e.to_string(),
        }),
    }
}

/// Convert base64url to padded standard base64 and decode it.
fn base64url_to_bytes(segment: &str) -> Result<Vec<u8>, SegmentError> {
    if segment.is_empty() {
        return Err(SegmentError::Empty);
    }

    let mut standard: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    match standard.len() % 4 {
        0 => {}
        1 => {
            return Err(SegmentError::ImpossibleLength {
                length: standard.len(),
            });
        }
        remainder => standard.push_str(&"=".repeat(4 - remainder)),
    }

    LENIENT_STANDARD
        .decode(standard.as_bytes())
        .map_err(|e| SegmentError::InvalidAlphabet {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn encode(bytes: &[u8]) -> String {
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn error_of(decoded: &DecodedSegment) -> Option<&SegmentError> {
        match &decoded.content {
            SegmentContent::DecodeError(err) => Some(err),
            _ => None,
        }
    }

    #[test]
    fn test_decode_json_object_header() {
        // {"alg":"HS256","typ":"JWT"}
        let decoded = decode_segment("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
        assert_eq!(decoded.kind(), SegmentKind::Json);
        let object = decoded.object().unwrap();
        assert_eq!(object["alg"], "HS256");
        assert_eq!(object["typ"], "JWT");
        assert!(error_of(&decoded).is_none());
    }

    #[test]
    fn test_decode_url_safe_characters() {
        // Bytes chosen so the encoding contains both '-' and '_'.
        let raw = encode(&[0xfb, 0xff, 0xbf]);
        assert!(raw.contains('-') || raw.contains('_'));
        let decoded = decode_segment(&raw);
        assert_eq!(decoded.kind(), SegmentKind::Binary);
    }

    #[test]
    fn test_decode_accepts_existing_padding() {
        let decoded = decode_segment("e30=");
        assert_eq!(decoded.kind(), SegmentKind::Json);
    }

    #[test]
    fn test_decode_non_utf8_is_binary_with_raw_value() {
        let raw = encode(&[0xff, 0xfe, 0x00, 0x80, 0x81]);
        let decoded = decode_segment(&raw);
        assert_eq!(decoded.kind(), SegmentKind::Binary);
        assert_eq!(decoded.value(), Some(Value::String(raw)));
        assert!(error_of(&decoded).is_none());
    }

    #[test]
    fn test_decode_real_hmac_signature_is_binary() {
        let decoded = decode_segment("SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c");
        assert_eq!(decoded.kind(), SegmentKind::Binary);
    }

    #[test]
    fn test_decode_non_object_json_is_text() {
        let decoded = decode_segment(&encode(b"\"hello\""));
        assert_eq!(decoded.kind(), SegmentKind::Text);
        assert_eq!(decoded.value(), Some(Value::String("\"hello\"".to_string())));
    }

    #[test]
    fn test_decode_plain_text_is_json_error() {
        let decoded = decode_segment(&encode(b"not json"));
        assert_eq!(decoded.kind(), SegmentKind::DecodeError);
        assert!(matches!(error_of(&decoded), Some(SegmentError::Json { .. })));
        assert!(decoded.value().is_none());
        assert!(error_of(&decoded).unwrap().to_string().starts_with("JSONParseError"));
    }

    #[test]
    fn test_decode_length_remainder_one_is_distinct_error() {
        let decoded = decode_segment("abcde");
        assert_eq!(
            error_of(&decoded),
            Some(&SegmentError::ImpossibleLength { length: 5 })
        );
    }

    #[test]
    fn test_decode_invalid_alphabet() {
        let decoded = decode_segment("!!!");
        assert!(matches!(
            error_of(&decoded),
            Some(SegmentError::InvalidAlphabet { .. })
        ));
        assert!(error_of(&decoded).unwrap().to_string().contains("base64url"));
    }

    #[test]
    fn test_decode_empty_segment() {
        let decoded = decode_segment("");
        assert_eq!(error_of(&decoded), Some(&SegmentError::Empty));
    }

    #[test]
    fn test_value_and_error_are_mutually_exclusive() {
        for raw in ["e30", "!!!", "", "abcde", "SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c"] {
            let decoded = decode_segment(raw);
            assert_ne!(decoded.value().is_some(), error_of(&decoded).is_some(), "{raw}");
        }
    }
}
