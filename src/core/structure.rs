//! Structural validation of a token.
//!
//! Checks the three-segment shape, that each classified segment sits in
//! the right position, and that header-only and payload-only claims do
//! not leak into the wrong segment.

use thiserror::Error;

use super::classifier::{HEADER_CLAIMS, PAYLOAD_CLAIMS, PartRole, claims_in, classify};
use super::segment::DecodedSegment;

/// Number of dot-separated segments in a compact JWS.
pub const EXPECTED_SEGMENTS: usize = 3;

/// A structural defect in the token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error(
        "Token mal formado - debe tener formato: header.payload.signature (se encontraron {found} partes)"
    )]
    SegmentCount { found: usize },

    #[error("El Payload no debe ir en la posición del Header")]
    PayloadInHeaderPosition,

    #[error("El Header no debe ir en la posición del Payload")]
    HeaderInPayloadPosition,

    #[error("El Header no debe ir en la posición del Signature")]
    HeaderInSignaturePosition,

    #[error("El Payload no debe ir en la posición del Signature")]
    PayloadInSignaturePosition,

    #[error("La tercera parte debe ser la firma, no contener estructura JSON")]
    StructuredSignature,

    /// Segment at `position` (1-based) is opaque binary where JSON belongs.
    #[error("No se logró decodificar la parte {position}")]
    BinaryInPosition { position: usize },

    /// Segment at `position` carries both header and payload claims.
    #[error(
        "La parte {position} contiene Claims de Header y Payload; no le corresponden: {}",
        .foreign.join(", ")
    )]
    MixedClaims {
        position: usize,
        foreign: Vec<String>,
    },

    #[error("Header contiene información que no le corresponde: {}", .keys.join(", "))]
    HeaderLeakage { keys: Vec<String> },

    #[error("Payload contiene información que no le corresponde: {}", .keys.join(", "))]
    PayloadLeakage { keys: Vec<String> },

    #[error("Payload vacío o mal formado")]
    EmptyPayload,

    #[error("Signature vacía o mal formada")]
    EmptySignature,
}

impl StructuralError {
    /// Claim names this defect reports as misplaced.
    pub fn leaked_claims(&self) -> &[String] {
        match self {
            StructuralError::MixedClaims { foreign, .. } => foreign,
            StructuralError::HeaderLeakage { keys } | StructuralError::PayloadLeakage { keys } => {
                keys
            }
            _ => &[],
        }
    }
}

/// Every structural defect found by one check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralVerdict {
    errors: Vec<StructuralError>,
}

impl StructuralVerdict {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[StructuralError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<StructuralError> {
        self.errors
    }

    fn push(&mut self, error: StructuralError) {
        self.errors.push(error);
    }
}

/// Split a token into exactly three segments.
///
/// # Errors
///
/// Returns [`StructuralError::SegmentCount`] with the observed count when
/// the token does not split into three parts.
pub fn split_segments(token: &str) -> Result<[&str; EXPECTED_SEGMENTS], StructuralError> {
    let parts: Vec<&str> = token.split('.').collect();
    <[&str; EXPECTED_SEGMENTS]>::try_from(parts.as_slice())
        .map_err(|_| StructuralError::SegmentCount { found: parts.len() })
}

/// Check that each segment's inferred role fits its position.
///
/// All positional defects are collected; none short-circuits another.
pub fn validate_structure(segments: &[DecodedSegment; EXPECTED_SEGMENTS]) -> StructuralVerdict {
    let [first, second, third] = segments;
    let mut verdict = StructuralVerdict::default();

    match classify(first) {
        PartRole::Payload => verdict.push(StructuralError::PayloadInHeaderPosition),
        PartRole::Mixed => verdict.push(StructuralError::MixedClaims {
            position: 1,
            foreign: first
                .object()
                .map(|map| claims_in(map, PAYLOAD_CLAIMS))
                .unwrap_or_default(),
        }),
        PartRole::Signature => verdict.push(StructuralError::BinaryInPosition { position: 1 }),
        _ => {}
    }

    match classify(second) {
        PartRole::Header => verdict.push(StructuralError::HeaderInPayloadPosition),
        PartRole::Mixed => verdict.push(StructuralError::MixedClaims {
            position: 2,
            foreign: second
                .object()
                .map(|map| claims_in(map, HEADER_CLAIMS))
                .unwrap_or_default(),
        }),
        PartRole::Signature => verdict.push(StructuralError::BinaryInPosition { position: 2 }),
        _ => {}
    }

    if third.is_structured() {
        match classify(third) {
            PartRole::Header => verdict.push(StructuralError::HeaderInSignaturePosition),
            PartRole::Payload => verdict.push(StructuralError::PayloadInSignaturePosition),
            PartRole::Mixed => verdict.push(StructuralError::StructuredSignature),
            _ => {}
        }
    }

    verdict
}

/// Report payload-only claims in the header and header-only claims in the
/// payload, independently of how the segments were classified.
pub fn check_leakage(header: &DecodedSegment, payload: &DecodedSegment) -> StructuralVerdict {
    let mut verdict = StructuralVerdict::default();

    if let Some(map) = header.object() {
        let keys = claims_in(map, PAYLOAD_CLAIMS);
        if !keys.is_empty() {
            verdict.push(StructuralError::HeaderLeakage { keys });
        }
    }

    if let Some(map) = payload.object() {
        let keys = claims_in(map, HEADER_CLAIMS);
        if !keys.is_empty() {
            verdict.push(StructuralError::PayloadLeakage { keys });
        }
    }

    verdict
}
