//! Shared test fixtures and helper utilities.
//!
//! Provides pre-built JWT tokens with known claims and helpers that sign
//! fresh tokens relative to the current time.
#![allow(dead_code)]

use serde_json::{Value, json};

/// A valid HS256-signed JWT for testing.
///
/// Header: `{"alg":"HS256","typ":"JWT"}`
/// Payload: `{"sub":"1234567890","name":"Test User","iat":1516239022}`
/// Secret: `"your-256-bit-secret"`
pub const VALID_HS256_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IlRlc3QgVXNlciIsImlhdCI6MTUxNjIzOTAyMn0.\
     SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

/// Secret [`VALID_HS256_TOKEN`] was signed with.
pub const VALID_HS256_SECRET: &str = "your-256-bit-secret";

/// A malformed token with only two parts (missing signature).
pub const MALFORMED_TOKEN_TWO_PARTS: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

/// A completely invalid token string.
pub const INVALID_TOKEN: &str = "not-a-valid-jwt";

/// HMAC secret used to sign test tokens for validate tests.
pub const HMAC_TEST_SECRET: &str = "validate-test-secret-key";

/// Path to the test RSA public key fixture.
pub const RSA_PUBLIC_KEY_PATH: &str = "tests/fixtures/rsa_public.pem";

/// Path to the test RSA private key fixture.
pub const RSA_PRIVATE_KEY_PATH: &str = "tests/fixtures/rsa_private.pem";

/// Current Unix time in seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Create an HS256-signed token with the given claims.
pub fn create_hs256_token(secret: &str, claims: &Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&header, claims, &key).unwrap()
}

/// Create an RS256-signed token using the test RSA private key.
pub fn create_rs256_token(claims: &Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let private_key = std::fs::read(RSA_PRIVATE_KEY_PATH).unwrap();
    let header = Header::new(Algorithm::RS256);
    let key = EncodingKey::from_rsa_pem(&private_key).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Build a token from arbitrary header and payload JSON with a dummy
/// signature, for exercising structural and header checks.
pub fn craft_token(header: &Value, payload: &Value) -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

/// Claims issued now and expiring in an hour.
pub fn standard_claims() -> Value {
    let now = now();
    json!({
        "usuario": "juan",
        "role": "admin",
        "iat": now,
        "exp": now + 3600
    })
}

/// Claims that expired a minute ago.
pub fn expired_claims() -> Value {
    let now = now();
    json!({
        "usuario": "juan",
        "iat": now - 3600,
        "exp": now - 60
    })
}
