//! Segment role inference.
//!
//! Guesses whether a decoded segment looks like a header, a payload or a
//! signature from the claim names it carries.

use std::fmt;

use serde_json::{Map, Value};

use super::segment::{DecodedSegment, SegmentContent};

/// Claim names that belong only in the JOSE header.
pub const HEADER_CLAIMS: &[&str] = &["alg", "typ", "kid", "jku", "x5u", "x5c", "x5t", "cty"];

/// Claim names that belong only in the payload, including the
/// application-specific `usuario`, `role`, `id` and `data` claims.
pub const PAYLOAD_CLAIMS: &[&str] = &[
    "sub", "iss", "aud", "exp", "nbf", "iat", "jti", "name", "email", "role", "usuario", "id",
    "data",
];

/// The role a segment appears to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartRole {
    Header,
    Payload,
    Signature,
    /// Carries both header-only and payload-only claims.
    Mixed,
    /// Decoded, but carries no recognizable claim.
    Unknown,
    /// Decoding failed, so no role can be inferred.
    Undetermined,
}

impl fmt::Display for PartRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartRole::Header => "header",
            PartRole::Payload => "payload",
            PartRole::Signature => "signature",
            PartRole::Mixed => "mixed",
            PartRole::Unknown => "unknown",
            PartRole::Undetermined => "undetermined",
        };
        f.write_str(name)
    }
}

/// Infer the role of a decoded segment.
pub fn classify(segment: &DecodedSegment) -> PartRole {
    match &segment.content {
        SegmentContent::Binary => PartRole::Signature,
        SegmentContent::DecodeError(_) => PartRole::Undetermined,
        SegmentContent::Json(map) => classify_keys(map),
        SegmentContent::Text(_) => classify_keys(&Map::new()),
    }
}

fn classify_keys(map: &Map<String, Value>) -> PartRole {
    let has_header = !claims_in(map, HEADER_CLAIMS).is_empty();
    let has_payload = !claims_in(map, PAYLOAD_CLAIMS).is_empty();

    match (has_header, has_payload) {
        (true, false) => PartRole::Header,
        (false, true) => PartRole::Payload,
        (true, true) => PartRole::Mixed,
        (false, false) if map.contains_key("alg") => PartRole::Header,
        (false, false) => PartRole::Unknown,
    }
}

/// Keys of `map` that appear in `claims`, in map iteration order.
pub fn claims_in(map: &Map<String, Value>, claims: &[&str]) -> Vec<String> {
    map.keys()
        .filter(|key| claims.contains(&key.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::{SegmentError, decode_segment};
    use serde_json::json;

    fn json_segment(value: Value) -> DecodedSegment {
        let Value::Object(map) = value else {
            panic!("test helper expects an object");
        };
        DecodedSegment {
            raw: String::new(),
            content: SegmentContent::Json(map),
        }
    }

    #[test]
    fn test_classify_header() {
        let seg = json_segment(json!({"alg": "HS256", "typ": "JWT"}));
        assert_eq!(classify(&seg), PartRole::Header);
    }

    #[test]
    fn test_classify_payload() {
        let seg = json_segment(json!({"usuario": "juan", "iat": 1700000000}));
        assert_eq!(classify(&seg), PartRole::Payload);
    }

    #[test]
    fn test_classify_mixed() {
        let seg = json_segment(json!({"alg": "HS256", "typ": "JWT", "role": "admin"}));
        assert_eq!(classify(&seg), PartRole::Mixed);
    }

    #[test]
    fn test_classify_unknown_keys() {
        let seg = json_segment(json!({"foo": 1, "bar": 2}));
        assert_eq!(classify(&seg), PartRole::Unknown);
    }

    #[test]
    fn test_classify_empty_object_is_unknown() {
        let seg = json_segment(json!({}));
        assert_eq!(classify(&seg), PartRole::Unknown);
    }

    #[test]
    fn test_classify_text_is_unknown() {
        let seg = DecodedSegment {
            raw: String::new(),
            content: SegmentContent::Text("42".to_string()),
        };
        assert_eq!(classify(&seg), PartRole::Unknown);
    }

    #[test]
    fn test_classify_binary_is_signature() {
        let seg = decode_segment("SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c");
        assert_eq!(classify(&seg), PartRole::Signature);
    }

    #[test]
    fn test_classify_decode_error_is_undetermined() {
        let seg = DecodedSegment {
            raw: "!!!".to_string(),
            content: SegmentContent::DecodeError(SegmentError::Empty),
        };
        assert_eq!(classify(&seg), PartRole::Undetermined);
    }

    #[test]
    fn test_claims_in_filters_by_claim_set() {
        let Value::Object(map) = json!({"role": "admin", "alg": "HS256", "sub": "x"}) else {
            unreachable!()
        };
        assert_eq!(claims_in(&map, PAYLOAD_CLAIMS), vec!["role", "sub"]);
    }

    #[test]
    fn test_role_display_names() {
        assert_eq!(PartRole::Mixed.to_string(), "mixed");
        assert_eq!(PartRole::Undetermined.to_string(), "undetermined");
    }
}
