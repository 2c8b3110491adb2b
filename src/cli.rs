//! CLI argument definitions for jwt-audit.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Each subcommand has its own argument struct for type-safe parsing.
//!
//! # Security
//!
//! Argument structs holding tokens or keys implement custom `Debug` to
//! redact them and prevent accidental leakage through debug formatting,
//! error chains, or logging.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use zeroize::Zeroizing;

use crate::core::signer::DEFAULT_EXPIRES_IN;

/// An offline JWT auditor: structural, semantic and cryptographic
/// validation of JSON Web Tokens with differentiated diagnostics.
#[derive(Debug, Parser)]
#[command(name = "jwt-audit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log pipeline stages to stderr (overridden by JWT_AUDIT_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a JWT's structure, header, claims and signature.
    Validate(ValidateArgs),

    /// Decode and inspect a JWT without verifying its signature.
    Decode(DecodeArgs),

    /// Report every semantic problem in a JWT's header and claims.
    Analyze(AnalyzeArgs),

    /// Sign a claim set into an HS256 token.
    Generate(GenerateArgs),
}

/// Token source shared by subcommands that read a token.
#[derive(clap::Args)]
pub struct TokenSource {
    /// The JWT token. If omitted, reads from stdin.
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub token_env: Option<String>,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .finish()
    }
}

/// Arguments for the `validate` subcommand.
#[derive(clap::Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: TokenSource,

    /// Key to verify with: HMAC secret, or PEM public key for RS256.
    ///
    /// WARNING: Passing keys via CLI arguments may expose them in shell
    /// history. Prefer using --key-env or --key-file instead.
    #[arg(long, value_name = "KEY", value_parser = parse_zeroizing_string)]
    pub key: Option<Zeroizing<String>>,

    /// Read the key from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME", conflicts_with = "key")]
    pub key_env: Option<String>,

    /// Read the key from a file (e.g. a PEM-encoded RSA public key).
    #[arg(long, value_name = "FILE", conflicts_with_all = ["key", "key_env"])]
    pub key_file: Option<PathBuf>,

    /// Read `{"token": ..., "key": ...}` from a file, or `-` for stdin.
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["token", "token_env", "key", "key_env", "key_file"]
    )]
    pub request: Option<PathBuf>,

    /// Evaluate time-based claims at a different instant.
    ///
    /// Accepts relative expressions like "+7d", "-1h", "+30m" or
    /// absolute timestamps in ISO 8601 or Unix epoch format.
    #[arg(long, value_name = "EXPR")]
    pub at: Option<String>,

    /// Restrict accepted algorithms (repeatable). Defaults to all supported.
    #[arg(long = "allow-alg", value_name = "ALG")]
    pub allow_alg: Vec<String>,

    /// Output the outcome as raw JSON (machine-readable).
    #[arg(long)]
    pub json: bool,

    /// Append the outcome to this JSON Lines audit log (default: the
    /// JWT_AUDIT_FILE environment variable).
    #[arg(long, value_name = "FILE")]
    pub audit_log: Option<PathBuf>,

    /// Do not write an audit record.
    #[arg(long)]
    pub no_audit: bool,
}

/// Custom `Debug` that redacts the key to prevent accidental leakage.
impl fmt::Debug for ValidateArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateArgs")
            .field("source", &self.source)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("key_env", &self.key_env)
            .field("key_file", &self.key_file)
            .field("request", &self.request)
            .field("at", &self.at)
            .field("allow_alg", &self.allow_alg)
            .field("json", &self.json)
            .field("audit_log", &self.audit_log)
            .field("no_audit", &self.no_audit)
            .finish()
    }
}

/// Arguments for the `decode` subcommand.
#[derive(Debug, clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub source: TokenSource,

    /// Show temporal status relative to a different instant.
    #[arg(long, value_name = "EXPR")]
    pub at: Option<String>,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `analyze` subcommand.
#[derive(Debug, clap::Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: TokenSource,

    /// Evaluate time-based claims at a different instant.
    #[arg(long, value_name = "EXPR")]
    pub at: Option<String>,

    /// Output the report as raw JSON (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `generate` subcommand.
#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Claims as a JSON object, e.g. '{"usuario":"juan","role":"admin"}'.
    #[arg(long, value_name = "JSON")]
    pub claims: String,

    /// Token lifetime, e.g. "30m", "1h", "7d".
    #[arg(long, value_name = "DURATION", default_value = DEFAULT_EXPIRES_IN)]
    pub expires_in: String,

    /// Read the signing secret from this environment variable
    /// (default JWT_SECRET).
    #[arg(long, value_name = "VAR_NAME")]
    pub secret_env: Option<String>,

    /// Output `{"token": ...}` instead of the bare token.
    #[arg(long)]
    pub json: bool,
}

/// Parse a string into a `Zeroizing<String>` for secure CLI arguments.
fn parse_zeroizing_string(s: &str) -> Result<Zeroizing<String>, std::convert::Infallible> {
    Ok(Zeroizing::new(s.to_string()))
}
