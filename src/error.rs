//! Application error types for jwt-audit.
//!
//! These are failures of the tool itself (bad invocation, unreadable
//! inputs, an unreachable audit store), as opposed to findings about a
//! token. Token findings live in [`crate::core::diagnostics`] and are
//! always folded into a `ValidationOutcome` instead of surfacing here.

use thiserror::Error;

/// Errors that can occur outside the validation semantics.
#[derive(Debug, Error)]
pub enum JwtAuditError {
    /// A required request field is missing or has the wrong JSON type.
    #[error("malformed request: {reason}")]
    RequestShape {
        /// Which field is wrong and why.
        reason: String,
    },

    /// The submitted request body is not valid JSON.
    #[error("malformed request: body is not valid JSON: {reason}")]
    RequestJson {
        /// Parser message.
        reason: String,
    },

    /// The token does not have the three-part structure needed for decoding.
    #[error(
        "invalid token format: expected 'header.payload.signature' structure (found {found} parts)"
    )]
    InvalidTokenFormat {
        /// Number of `.`-separated parts observed.
        found: usize,
    },

    /// A header or payload segment could not be decoded for display.
    #[error("failed to decode {segment}: {reason}")]
    SegmentDecode {
        /// Which segment failed (`header` or `payload`).
        segment: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// Failed to read the provided key file.
    #[error("failed to read key file '{path}': {reason}")]
    KeyFileError {
        /// Path to the key file.
        path: String,
        /// Description of the read failure.
        reason: String,
    },

    /// An algorithm outside the supported allow-list was requested.
    #[error("unsupported algorithm '{algorithm}': allowed algorithms are {allowed}")]
    UnsupportedAlgorithm {
        /// The algorithm that was requested.
        algorithm: String,
        /// Comma-separated list of what is accepted.
        allowed: String,
    },

    /// Failed to parse a time expression (`--at`, `--expires-in`).
    #[error("invalid time expression '{expression}': {reason}")]
    InvalidTimeExpression {
        /// The time expression that failed to parse.
        expression: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// Claims supplied for token generation are unusable.
    #[error("invalid claims: {reason}")]
    InvalidClaims {
        /// Description of the problem.
        reason: String,
    },

    /// The signing primitive refused to produce a token.
    #[error("failed to sign token: {reason}")]
    Signing {
        /// Sanitized reason.
        reason: String,
    },

    /// The audit store could not be opened or written.
    #[error("failed to write audit record to '{path}': {reason}")]
    AuditStore {
        /// Path of the audit log.
        path: String,
        /// Description of the I/O failure.
        reason: String,
    },

    /// No token was provided via any input method.
    #[error("no token provided: pass a token as an argument, via --token-env, or through stdin")]
    NoTokenProvided,

    /// The specified environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVarNotFound {
        /// Name of the missing environment variable.
        name: String,
    },

    /// The given environment variable name cannot be looked up.
    #[error("invalid environment variable name '{name}'")]
    InvalidEnvVarName {
        /// The rejected name.
        name: String,
    },
}
