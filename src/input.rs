//! Resolution of tokens, keys and JSON requests from the outside world.
//!
//! Sensitive values may come from an argument, a named environment
//! variable, a file or stdin. Everything returned here is already trimmed
//! and wrapped in [`Zeroizing`] where it is secret.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::error::JwtAuditError;

/// Read an environment variable after validating its name.
///
/// # Errors
///
/// Returns [`JwtAuditError::InvalidEnvVarName`] for an empty name or one
/// containing `=` or NUL, and [`JwtAuditError::EnvVarNotFound`] when the
/// variable is unset or not valid Unicode.
pub fn read_env_var(name: &str) -> Result<String, JwtAuditError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(JwtAuditError::InvalidEnvVarName {
            name: name.to_string(),
        });
    }
    std::env::var(name).map_err(|_| JwtAuditError::EnvVarNotFound {
        name: name.to_string(),
    })
}

/// Resolve the token from an argument, an environment variable or stdin,
/// in that order. Stdin is only read when it is not a terminal.
///
/// # Errors
///
/// Returns [`JwtAuditError::NoTokenProvided`] if every source is empty.
pub fn resolve_token(
    token: Option<&str>,
    token_env: Option<&str>,
) -> Result<Zeroizing<String>, JwtAuditError> {
    let raw = match (token, token_env) {
        (Some(token), _) => Zeroizing::new(token.to_string()),
        (None, Some(name)) => Zeroizing::new(read_env_var(name)?),
        (None, None) => read_stdin()?,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(JwtAuditError::NoTokenProvided);
    }
    Ok(Zeroizing::new(trimmed.to_string()))
}

fn read_stdin() -> Result<Zeroizing<String>, JwtAuditError> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(JwtAuditError::NoTokenProvided);
    }
    let mut buffer = Zeroizing::new(String::new());
    stdin
        .read_to_string(&mut buffer)
        .map_err(|_| JwtAuditError::NoTokenProvided)?;
    Ok(buffer)
}

/// Resolve the verification key from exactly one of its sources.
///
/// The empty string is a legitimate key. Key files lose trailing newlines
/// only, so PEM bodies stay intact.
///
/// # Errors
///
/// Returns [`JwtAuditError::RequestShape`] when no source is given, plus
/// environment and file errors from the chosen source.
pub fn resolve_key(
    key: Option<&Zeroizing<String>>,
    key_env: Option<&str>,
    key_file: Option<&Path>,
) -> Result<Zeroizing<String>, JwtAuditError> {
    if let Some(key) = key {
        return Ok(key.clone());
    }
    if let Some(name) = key_env {
        return Ok(Zeroizing::new(read_env_var(name)?));
    }
    if let Some(path) = key_file {
        let contents = Zeroizing::new(fs::read_to_string(path).map_err(|e| {
            JwtAuditError::KeyFileError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?);
        return Ok(Zeroizing::new(
            contents.trim_end_matches(['\r', '\n']).to_string(),
        ));
    }
    Err(JwtAuditError::RequestShape {
        reason: "a key is required (--key, --key-env, --key-file or a request body)".to_string(),
    })
}

#[derive(Deserialize)]
struct RawRequest {
    token: Option<Value>,
    key: Option<Value>,
}

/// A validation request submitted as a JSON document.
pub struct ValidationRequest {
    pub token: Zeroizing<String>,
    pub key: Zeroizing<String>,
}

impl std::fmt::Debug for ValidationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRequest")
            .field("token", &"[REDACTED]")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl ValidationRequest {
    /// Parse `{"token": string, "key": string}`.
    ///
    /// # Errors
    ///
    /// Returns [`JwtAuditError::RequestJson`] when the body is not a JSON
    /// object, and [`JwtAuditError::RequestShape`] when either field is
    /// missing, null or not a string, or when the token is blank. The
    /// token is trimmed; the key is kept verbatim and may be empty.
    pub fn parse(body: &str) -> Result<Self, JwtAuditError> {
        let raw: RawRequest =
            serde_json::from_str(body).map_err(|e| JwtAuditError::RequestJson {
                reason: e.to_string(),
            })?;

        let token = required_string(raw.token, "token")?;
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(JwtAuditError::RequestShape {
                reason: "'token' must not be empty".to_string(),
            });
        }

        Ok(Self {
            token: Zeroizing::new(trimmed.to_string()),
            key: required_string(raw.key, "key")?,
        })
    }

    /// Read a request from a file, or from stdin when `source` is `-`.
    ///
    /// # Errors
    ///
    /// Returns [`JwtAuditError::RequestShape`] if the source cannot be read,
    /// plus any error from [`ValidationRequest::parse`].
    pub fn load(source: &Path) -> Result<Self, JwtAuditError> {
        let body = if source == Path::new("-") {
            let mut buffer = Zeroizing::new(String::new());
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| JwtAuditError::RequestShape {
                    reason: format!("could not read request from stdin: {e}"),
                })?;
            buffer
        } else {
            Zeroizing::new(fs::read_to_string(source).map_err(|e| {
                JwtAuditError::RequestShape {
                    reason: format!("could not read '{}': {e}", source.display()),
                }
            })?)
        };
        Self::parse(&body)
    }
}

fn required_string(
    value: Option<Value>,
    field: &str,
) -> Result<Zeroizing<String>, JwtAuditError> {
    match value {
        Some(Value::String(s)) => Ok(Zeroizing::new(s)),
        None | Some(Value::Null) => Err(JwtAuditError::RequestShape {
            reason: format!("'{field}' is required"),
        }),
        Some(_) => Err(JwtAuditError::RequestShape {
            reason: format!("'{field}' must be a string"),
        }),
    }
}
