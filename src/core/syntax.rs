//! Strict compact-serialization grammar.
//!
//! ```text
//! <JWT>       ::= <Header> "." <Payload> "." <Signature>
//! <Part>      ::= <Base64URLChar>+
//! <Base64URLChar> ::= [A-Za-z0-9_-]
//! ```
//!
//! Recognised by a six-state automaton (`q0`..`q5`, accepting in `q5`).
//! Padding and the standard-alphabet `+` and `/` are rejected here even
//! though [`super::segment`] tolerates them when decoding.

use serde::Serialize;
use thiserror::Error;

/// Which of the three parts a syntax error falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPart {
    Header,
    Payload,
    Signature,
}

impl TokenPart {
    /// The automaton state that reads this part.
    pub fn state(self) -> &'static str {
        match self {
            TokenPart::Header => "q1",
            TokenPart::Payload => "q3",
            TokenPart::Signature => "q5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TokenPart::Header => "Header",
            TokenPart::Payload => "Payload",
            TokenPart::Signature => "Signature",
        }
    }

    fn index(self) -> usize {
        match self {
            TokenPart::Header => 0,
            TokenPart::Payload => 1,
            TokenPart::Signature => 2,
        }
    }
}

/// Why a token does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Token vacío")]
    Empty,

    #[error("Error en δ(q1,'.'): Se esperan exactamente 3 partes, se encontraron {found}")]
    PartCount { found: usize },

    #[error("Error en {state}: {label} vacío, se esperaba al menos un carácter Base64URL", state = .part.state(), label = .part.label())]
    EmptyPart { part: TokenPart },

    #[error(
        "Error en {state}: {label} no es una cadena Base64URL válida: carácter '{found}' en la posición {position} ({length} caracteres). Recibido: \"{content}\"",
        state = .part.state(),
        label = .part.label()
    )]
    InvalidChar {
        part: TokenPart,
        /// 1-based character position inside the part.
        position: usize,
        found: char,
        length: usize,
        content: String,
    },
}

impl SyntaxError {
    /// The offending part, when the error is confined to one.
    pub fn part(&self) -> Option<TokenPart> {
        match self {
            SyntaxError::EmptyPart { part } | SyntaxError::InvalidChar { part, .. } => Some(*part),
            SyntaxError::Empty | SyntaxError::PartCount { .. } => None,
        }
    }
}

/// Part lengths of a token the grammar accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxSummary {
    pub header_length: usize,
    pub payload_length: usize,
    pub signature_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Q0,
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
}

impl State {
    fn part(self) -> TokenPart {
        match self {
            State::Q0 | State::Q1 => TokenPart::Header,
            State::Q2 | State::Q3 => TokenPart::Payload,
            State::Q4 | State::Q5 => TokenPart::Signature,
        }
    }

    fn step(self, c: char) -> Option<State> {
        match (self, c) {
            (State::Q0 | State::Q1, c) if is_base64url(c) => Some(State::Q1),
            (State::Q1, '.') => Some(State::Q2),
            (State::Q2 | State::Q3, c) if is_base64url(c) => Some(State::Q3),
            (State::Q3, '.') => Some(State::Q4),
            (State::Q4 | State::Q5, c) if is_base64url(c) => Some(State::Q5),
            _ => None,
        }
    }
}

fn is_base64url(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Run `token` (surrounding whitespace ignored) through the automaton.
///
/// # Errors
///
/// Returns the first [`SyntaxError`] met: an empty token, a part count
/// other than three, an empty part, or a character outside `[A-Za-z0-9_-]`.
pub fn check_syntax(token: &str) -> Result<SyntaxSummary, SyntaxError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SyntaxError::Empty);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(SyntaxError::PartCount { found: parts.len() });
    }

    let mut state = State::Q0;
    let mut position = 0;
    for c in token.chars() {
        position += 1;
        state = match state.step(c) {
            Some(next) => next,
            None => return Err(reject(state, c, position, &parts)),
        };
        if c == '.' {
            position = 0;
        }
    }

    match state {
        State::Q5 => Ok(SyntaxSummary {
            header_length: parts[0].len(),
            payload_length: parts[1].len(),
            signature_length: parts[2].len(),
        }),
        other => Err(SyntaxError::EmptyPart { part: other.part() }),
    }
}

fn reject(state: State, found: char, position: usize, parts: &[&str]) -> SyntaxError {
    let part = state.part();
    if found == '.' {
        return SyntaxError::EmptyPart { part };
    }
    let content = parts[part.index()];
    SyntaxError::InvalidChar {
        part,
        position,
        found,
        length: content.chars().count(),
        content: content.to_string(),
    }
}
