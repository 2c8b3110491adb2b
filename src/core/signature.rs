//! Cryptographic signature verification.
//!
//! Only algorithms on the configured allow-list are accepted. The signature
//! is checked directly over the `header.payload` signing input, so header
//! members are never forced into `jsonwebtoken`'s typed header and
//! time-based claims are left to [`super::temporal`].

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, crypto};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{ValidatorConfig, algorithm_name};

use super::segment::decode_segment;

/// Why a signature could not be verified.
///
/// Every cryptographic failure collapses to one category so callers
/// cannot probe which part of the key material was wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Clave incorrecta")]
    IncorrectKey,
}

/// Verifies compact JWS tokens against a caller-provided key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    allowed: Vec<Algorithm>,
}

impl SignatureVerifier {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            allowed: config.allowed_algorithms().to_vec(),
        }
    }

    /// Verify `token` with `key` and return its claims.
    ///
    /// HMAC algorithms use the key bytes as the shared secret; RS256 parses
    /// the key as a PEM public key. The algorithm is read from the header's
    /// `alg` member; other header members may hold any JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::IncorrectKey`] for any failure: unreadable
    /// header, algorithm off the allow-list, unusable key material, or a
    /// signature mismatch.
    pub fn verify(&self, token: &str, key: &str) -> Result<Map<String, Value>, SignatureError> {
        let (message, signature) = token
            .rsplit_once('.')
            .ok_or_else(|| refuse("token is not a valid compact JWS"))?;
        let (header, payload) = message
            .split_once('.')
            .ok_or_else(|| refuse("token is not a valid compact JWS"))?;

        let alg = header_algorithm(header)?;
        if !self.allowed.contains(&alg) {
            tracing::debug!(alg = algorithm_name(alg), "algorithm not on allow-list");
            return Err(SignatureError::IncorrectKey);
        }

        let decoding_key = decoding_key(alg, key)?;
        match crypto::verify(signature, message.as_bytes(), &decoding_key, alg) {
            Ok(true) => {}
            Ok(false) => return Err(reject(&ErrorKind::InvalidSignature)),
            Err(e) => return Err(reject(e.kind())),
        }

        decode_segment(payload)
            .object()
            .cloned()
            .ok_or_else(|| refuse("payload is not a JSON object"))
    }
}

/// The algorithm named by the header's `alg` member.
fn header_algorithm(header: &str) -> Result<Algorithm, SignatureError> {
    decode_segment(header)
        .object()
        .and_then(|map| map.get("alg"))
        .and_then(Value::as_str)
        .and_then(|alg| alg.parse::<Algorithm>().ok())
        .ok_or_else(|| refuse("header has no usable 'alg'"))
}

fn decoding_key(alg: Algorithm, key: &str) -> Result<DecodingKey, SignatureError> {
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            Ok(DecodingKey::from_secret(key.as_bytes()))
        }
        Algorithm::RS256 => {
            DecodingKey::from_rsa_pem(key.as_bytes()).map_err(|e| reject(e.kind()))
        }
        _ => Err(SignatureError::IncorrectKey),
    }
}

fn reject(kind: &ErrorKind) -> SignatureError {
    refuse(sanitize_jwt_error(kind))
}

fn refuse(cause: &'static str) -> SignatureError {
    tracing::debug!(cause, "signature verification failed");
    SignatureError::IncorrectKey
}

/// Map a `jsonwebtoken` error kind to a fixed description that never
/// includes key material or token contents.
pub fn sanitize_jwt_error(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidToken => "token is not a valid compact JWS",
        ErrorKind::InvalidSignature => "signature does not match",
        ErrorKind::InvalidAlgorithm => "algorithm mismatch",
        ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidRsaKey(_) => "key material is invalid",
        ErrorKind::InvalidKeyFormat => "key format is not supported",
        ErrorKind::Base64(_) => "segment is not valid base64url",
        ErrorKind::Json(_) => "segment is not valid JSON",
        ErrorKind::Utf8(_) => "segment is not valid UTF-8",
        _ => "verification failed",
    }
}
