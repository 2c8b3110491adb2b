//! HS256 token generation.

use chrono::Duration;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Map, Value};

use crate::config::SignerConfig;
use crate::error::JwtAuditError;

/// Default lifetime of generated tokens.
pub const DEFAULT_EXPIRES_IN: &str = "1h";

/// Signs claim sets with the configured secret.
pub struct Signer {
    config: SignerConfig,
}

impl Signer {
    pub fn new(config: SignerConfig) -> Self {
        Self { config }
    }

    /// Sign `claims`, stamping `iat` and `exp`.
    ///
    /// A numeric `iat` is kept (truncated to whole seconds); a missing or
    /// non-numeric one becomes `now`. `exp` is always `iat + expires_in`.
    ///
    /// # Errors
    ///
    /// Returns [`JwtAuditError::InvalidClaims`] if `claims` is not a JSON
    /// object or the expiry overflows, and [`JwtAuditError::Signing`] if
    /// the signing primitive fails.
    pub fn sign(&self, claims: Value, expires_in: Duration, now: i64) -> Result<String, JwtAuditError> {
        let Value::Object(mut claims) = claims else {
            return Err(JwtAuditError::InvalidClaims {
                reason: "claims must be a JSON object".to_string(),
            });
        };

        let iat = normalized_iat(&claims, now);
        let exp = iat
            .checked_add(expires_in.num_seconds())
            .ok_or_else(|| JwtAuditError::InvalidClaims {
                reason: "expiry is out of range".to_string(),
            })?;
        claims.insert("iat".to_string(), Value::from(iat));
        claims.insert("exp".to_string(), Value::from(exp));

        tracing::debug!(iat, exp, claims = claims.len(), "signing token");

        encode(
            &Header::new(self.config.algorithm()),
            &claims,
            &EncodingKey::from_secret(self.config.secret().as_bytes()),
        )
        .map_err(|e| JwtAuditError::Signing {
            reason: e.to_string(),
        })
    }
}

fn normalized_iat(claims: &Map<String, Value>, now: i64) -> i64 {
    claims
        .get("iat")
        .and_then(Value::as_f64)
        .filter(|t| t.is_finite())
        .map_or(now, |t| t.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::core::validator::Validator;
    use serde_json::json;
    use zeroize::Zeroizing;

    const NOW: i64 = 1_700_000_000;

    fn signer() -> Signer {
        Signer::new(SignerConfig::new(Zeroizing::new("claveSecreta".to_string())))
    }

    fn claims_of(token: &str) -> Value {
        let outcome = Validator::new(&ValidatorConfig::default()).validate_at(token, "claveSecreta", NOW);
        assert!(outcome.is_valid(), "{:?}", outcome.error);
        outcome.data.payload.unwrap()
    }

    #[test]
    fn test_sign_stamps_iat_and_exp() {
        let token = signer()
            .sign(json!({"usuario": "juan", "role": "admin"}), Duration::hours(1), NOW)
            .unwrap();
        let claims = claims_of(&token);
        assert_eq!(claims["iat"], NOW);
        assert_eq!(claims["exp"], NOW + 3600);
        assert_eq!(claims["usuario"], "juan");
    }

    #[test]
    fn test_sign_keeps_numeric_iat() {
        let token = signer()
            .sign(json!({"usuario": "juan", "iat": 1_699_999_899.7}), Duration::minutes(10), NOW)
            .unwrap();
        let claims = claims_of(&token);
        assert_eq!(claims["iat"], NOW - 101);
        assert_eq!(claims["exp"], NOW - 101 + 600);
    }

    #[test]
    fn test_sign_replaces_non_numeric_iat() {
        let token = signer()
            .sign(json!({"usuario": "juan", "iat": "yesterday"}), Duration::hours(1), NOW)
            .unwrap();
        assert_eq!(claims_of(&token)["iat"], NOW);
    }

    #[test]
    fn test_sign_overrides_supplied_exp() {
        let token = signer()
            .sign(json!({"usuario": "juan", "exp": 1}), Duration::hours(1), NOW)
            .unwrap();
        assert_eq!(claims_of(&token)["exp"], NOW + 3600);
    }

    #[test]
    fn test_sign_rejects_non_object_claims() {
        for claims in [json!([1, 2]), json!("text"), json!(null)] {
            assert!(matches!(
                signer().sign(claims, Duration::hours(1), NOW),
                Err(JwtAuditError::InvalidClaims { .. })
            ));
        }
    }
}
