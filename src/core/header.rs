//! Header semantics: required fields, `typ` and `alg` values.
//!
//! Rejections carry a suggestion when the offending value looks like a
//! typo of an accepted one (`JTW` for `JWT`, `HS255` for `HS256`).

use std::sync::LazyLock;

use jsonwebtoken::Algorithm;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{ValidatorConfig, algorithm_name, algorithm_list};

/// The only accepted `typ` value.
pub const EXPECTED_TYP: &str = "JWT";

/// Three or four letters drawn from J, W, T, in any order or repetition.
static TYP_TYPO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[jwt]{3,4}$").expect("typ typo pattern is valid"));

/// HMAC family with a mangled digest size, capturing the digits.
static HS_FAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^HS(25\d?|38\d?|51\d?)$").expect("HS family pattern is valid")
});

/// RSA family with a mangled digest size.
static RS_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^RS25\d?$").expect("RS family pattern is valid"));

/// A problem with the token header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Falta la propiedad 'alg' en el header")]
    MissingAlg,

    #[error("Falta la propiedad 'typ' en el header")]
    MissingTyp,

    #[error("Error de tipeo en 'typ': se encontró '{found}', debe ser 'JWT'")]
    TypTypo { found: String },

    #[error("Valor inválido en 'typ': '{found}', debe ser 'JWT'")]
    InvalidTyp { found: String },

    #[error("Error de tipeo en 'alg': se encontró '{found}', probablemente querías '{suggestion}'")]
    AlgTypo { found: String, suggestion: String },

    #[error("Algoritmo no permitido: '{found}'. Los algoritmos válidos son: {allowed}")]
    AlgNotAllowed { found: String, allowed: String },
}

impl HeaderError {
    /// The canonical value suggested for a probable typo.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            HeaderError::TypTypo { .. } => Some(EXPECTED_TYP),
            HeaderError::AlgTypo { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }
}

/// All header problems found in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderVerdict {
    errors: Vec<HeaderError>,
}

impl HeaderVerdict {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[HeaderError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<HeaderError> {
        self.errors
    }
}

/// Validates `alg` and `typ` against a fixed allow-list.
#[derive(Debug, Clone)]
pub struct HeaderChecker {
    allowed: Vec<Algorithm>,
}

impl HeaderChecker {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            allowed: config.allowed_algorithms().to_vec(),
        }
    }

    /// Check a decoded header object.
    ///
    /// `alg` and `typ` are checked independently; a missing `alg` does not
    /// hide a bad `typ`.
    pub fn check(&self, header: &Map<String, Value>) -> HeaderVerdict {
        let mut errors = Vec::new();

        let alg = header.get("alg").filter(|v| !is_blank(v));
        let typ = header.get("typ").filter(|v| !is_blank(v));

        if alg.is_none() {
            errors.push(HeaderError::MissingAlg);
        }
        if typ.is_none() {
            errors.push(HeaderError::MissingTyp);
        }

        errors.extend(typ.and_then(check_typ));
        errors.extend(alg.and_then(|alg| self.check_alg(alg)));

        HeaderVerdict { errors }
    }

    fn check_alg(&self, alg: &Value) -> Option<HeaderError> {
        let found = display_value(alg);
        if self.allowed.iter().any(|a| algorithm_name(*a) == found) {
            return None;
        }

        match suggest_algorithm(&found)
            .filter(|s| self.allowed.iter().any(|a| algorithm_name(*a) == *s))
        {
            Some(suggestion) => Some(HeaderError::AlgTypo {
                found,
                suggestion: suggestion.to_string(),
            }),
            None => Some(HeaderError::AlgNotAllowed {
                found,
                allowed: algorithm_list(&self.allowed),
            }),
        }
    }
}

fn check_typ(typ: &Value) -> Option<HeaderError> {
    let found = display_value(typ);
    if typ.as_str() == Some(EXPECTED_TYP) {
        return None;
    }

    if typ.is_string() && looks_like_jwt(&found) {
        Some(HeaderError::TypTypo { found })
    } else {
        Some(HeaderError::InvalidTyp { found })
    }
}

/// A `typ` that uses only J, W and T and contains each of them.
fn looks_like_jwt(value: &str) -> bool {
    let upper = value.to_ascii_uppercase();
    TYP_TYPO.is_match(value) && ['J', 'W', 'T'].iter().all(|c| upper.contains(*c))
}

/// Map a mangled `HS*`/`RS*` name to the nearest canonical algorithm.
fn suggest_algorithm(alg: &str) -> Option<&'static str> {
    if let Some(caps) = HS_FAMILY.captures(alg) {
        let digits = caps.get(1).map_or("", |m| m.as_str());
        return match &digits[..2] {
            "25" => Some("HS256"),
            "38" => Some("HS384"),
            "51" => Some("HS512"),
            _ => None,
        };
    }
    RS_FAMILY.is_match(alg).then_some("RS256")
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Strings render bare, everything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
