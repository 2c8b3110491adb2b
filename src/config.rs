//! Immutable configuration handed to the validator, signer and audit store.
//!
//! Nothing here is a process-wide global: each command builds the
//! configuration it needs from CLI arguments and the environment, then
//! passes it by value into the component that uses it.

use std::path::PathBuf;

use jsonwebtoken::Algorithm;
use zeroize::Zeroizing;

use crate::error::JwtAuditError;
use crate::input::read_env_var;

/// Algorithms the validator accepts, in the order they are reported.
pub const SUPPORTED_ALGORITHMS: [Algorithm; 4] = [
    Algorithm::HS256,
    Algorithm::HS384,
    Algorithm::HS512,
    Algorithm::RS256,
];

/// Environment variable holding the signing secret when none is named.
pub const DEFAULT_SECRET_ENV: &str = "JWT_SECRET";

/// Secret used for generation when the environment provides none.
///
/// Only suitable for local experiments; a warning is logged on use.
pub const DEVELOPMENT_SECRET: &str = "claveTemporal";

/// Environment variable naming the audit log file.
pub const AUDIT_FILE_ENV: &str = "JWT_AUDIT_FILE";

/// Canonical JOSE name of an algorithm.
pub fn algorithm_name(alg: Algorithm) -> &'static str {
    match alg {
        Algorithm::HS256 => "HS256",
        Algorithm::HS384 => "HS384",
        Algorithm::HS512 => "HS512",
        Algorithm::RS256 => "RS256",
        Algorithm::RS384 => "RS384",
        Algorithm::RS512 => "RS512",
        Algorithm::PS256 => "PS256",
        Algorithm::PS384 => "PS384",
        Algorithm::PS512 => "PS512",
        Algorithm::ES256 => "ES256",
        Algorithm::ES384 => "ES384",
        _ => "EdDSA",
    }
}

/// Comma-separated algorithm names, e.g. `HS256, HS384`.
pub fn algorithm_list(algs: &[Algorithm]) -> String {
    algs.iter()
        .map(|a| algorithm_name(*a))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    allowed_algorithms: Vec<Algorithm>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            allowed_algorithms: SUPPORTED_ALGORITHMS.to_vec(),
        }
    }
}

impl ValidatorConfig {
    /// Narrow the allow-list to the named algorithms.
    ///
    /// An empty slice keeps the full supported set. Names are matched
    /// exactly (`HS256`, not `hs256`).
    ///
    /// # Errors
    ///
    /// Returns [`JwtAuditError::UnsupportedAlgorithm`] for any name outside
    /// [`SUPPORTED_ALGORITHMS`].
    pub fn restricted_to(names: &[String]) -> Result<Self, JwtAuditError> {
        if names.is_empty() {
            return Ok(Self::default());
        }

        let mut allowed = Vec::with_capacity(names.len());
        for name in names {
            let alg = SUPPORTED_ALGORITHMS
                .into_iter()
                .find(|a| algorithm_name(*a) == name.as_str())
                .ok_or_else(|| JwtAuditError::UnsupportedAlgorithm {
                    algorithm: name.clone(),
                    allowed: algorithm_list(&SUPPORTED_ALGORITHMS),
                })?;
            if !allowed.contains(&alg) {
                allowed.push(alg);
            }
        }

        Ok(Self {
            allowed_algorithms: allowed,
        })
    }

    pub fn allowed_algorithms(&self) -> &[Algorithm] {
        &self.allowed_algorithms
    }
}

/// Token generation settings: a fixed secret and a fixed algorithm.
pub struct SignerConfig {
    secret: Zeroizing<String>,
    algorithm: Algorithm,
}

impl SignerConfig {
    pub fn new(secret: Zeroizing<String>) -> Self {
        Self {
            secret,
            algorithm: Algorithm::HS256,
        }
    }

    /// Resolve the signing secret from the environment.
    ///
    /// With an explicit variable name the variable must be set. Without
    /// one, [`DEFAULT_SECRET_ENV`] is consulted and the development secret
    /// is used as a last resort.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named variable is missing or its
    /// name is invalid.
    pub fn from_env(secret_env: Option<&str>) -> Result<Self, JwtAuditError> {
        if let Some(name) = secret_env {
            return Ok(Self::new(Zeroizing::new(read_env_var(name)?)));
        }

        match read_env_var(DEFAULT_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => Ok(Self::new(Zeroizing::new(secret))),
            _ => {
                tracing::warn!(
                    "{DEFAULT_SECRET_ENV} is not set; signing with the built-in development secret"
                );
                Ok(Self::new(Zeroizing::new(DEVELOPMENT_SECRET.to_string())))
            }
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

/// Where audit records go, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditConfig {
    Disabled,
    File(PathBuf),
}

impl AuditConfig {
    /// Pick the audit destination: `--no-audit` wins, then `--audit-log`,
    /// then [`AUDIT_FILE_ENV`]. With none of them auditing is off.
    pub fn resolve(audit_log: Option<PathBuf>, disabled: bool) -> Self {
        if disabled {
            return AuditConfig::Disabled;
        }
        audit_log
            .or_else(|| {
                std::env::var_os(AUDIT_FILE_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .map_or(AuditConfig::Disabled, AuditConfig::File)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_list() {
        let config = ValidatorConfig::default();
        assert_eq!(config.allowed_algorithms(), &SUPPORTED_ALGORITHMS);
    }

    #[test]
    fn test_restricted_to_subset() {
        let config =
            ValidatorConfig::restricted_to(&["RS256".to_string(), "HS256".to_string()]).unwrap();
        assert_eq!(
            config.allowed_algorithms(),
            &[Algorithm::RS256, Algorithm::HS256]
        );
    }

    #[test]
    fn test_restricted_to_deduplicates() {
        let config =
            ValidatorConfig::restricted_to(&["HS256".to_string(), "HS256".to_string()]).unwrap();
        assert_eq!(config.allowed_algorithms(), &[Algorithm::HS256]);
    }

    #[test]
    fn test_restricted_to_empty_keeps_default() {
        assert_eq!(
            ValidatorConfig::restricted_to(&[]).unwrap(),
            ValidatorConfig::default()
        );
    }

    #[test]
    fn test_restricted_to_rejects_unsupported() {
        let err = ValidatorConfig::restricted_to(&["ES256".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            JwtAuditError::UnsupportedAlgorithm { algorithm, .. } if algorithm == "ES256"
        ));
    }

    #[test]
    fn test_algorithm_list_formatting() {
        assert_eq!(
            algorithm_list(&SUPPORTED_ALGORITHMS),
            "HS256, HS384, HS512, RS256"
        );
    }

    #[test]
    fn test_signer_config_uses_hs256() {
        let config = SignerConfig::new(Zeroizing::new("s3cret".to_string()));
        assert_eq!(config.algorithm(), Algorithm::HS256);
        assert_eq!(config.secret(), "s3cret");
    }

    #[test]
    fn test_signer_config_explicit_env_must_exist() {
        let err = SignerConfig::from_env(Some("JWT_AUDIT_TEST_SURELY_UNSET_VAR")).err();
        assert!(matches!(
            err,
            Some(JwtAuditError::EnvVarNotFound { name }) if name == "JWT_AUDIT_TEST_SURELY_UNSET_VAR"
        ));
    }

    #[test]
    fn test_audit_config_disabled_flag_wins() {
        let config = AuditConfig::resolve(Some(PathBuf::from("audit.jsonl")), true);
        assert_eq!(config, AuditConfig::Disabled);
    }

    #[test]
    fn test_audit_config_explicit_path() {
        let config = AuditConfig::resolve(Some(PathBuf::from("audit.jsonl")), false);
        assert_eq!(config, AuditConfig::File(PathBuf::from("audit.jsonl")));
    }
}
