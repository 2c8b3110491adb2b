//! The validation pipeline.
//!
//! Stages run in a fixed order and the first one that fails decides the
//! outcome; nothing downstream of it runs. Each stage returns
//! `Result<_, Halt>` so the sequence reads as a chain of `?`.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::config::ValidatorConfig;

use super::diagnostics::{Diagnostics, Finding};
use super::header::HeaderChecker;
use super::outcome::{
    MSG_BAD_SIGNATURE, MSG_CORRUPT, MSG_EXPIRED, MSG_HEADER, MSG_INCOMPLETE, MSG_MALFORMED,
    MSG_NOT_YET_VALID, MSG_VALID, OutcomeData, OutcomeState, ValidationOutcome,
};
use super::segment::{DecodedSegment, SegmentContent, SegmentError, decode_segment};
use super::signature::SignatureVerifier;
use super::structure::{StructuralError, check_leakage, split_segments, validate_structure};
use super::temporal::{TemporalError, evaluate_time};

/// Runs the full structural, semantic and cryptographic check.
///
/// Holds only immutable configuration, so one instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Validator {
    header_checker: HeaderChecker,
    verifier: SignatureVerifier,
}

/// Why the pipeline stopped early.
struct Halt {
    state: OutcomeState,
    message: &'static str,
    reason: Option<&'static str>,
    segments_found: Option<usize>,
}

impl Halt {
    fn invalid(message: &'static str) -> Self {
        Self {
            state: OutcomeState::Invalid,
            message,
            reason: None,
            segments_found: None,
        }
    }

    fn corrupt() -> Self {
        Self {
            state: OutcomeState::Corrupt,
            ..Self::invalid(MSG_CORRUPT)
        }
    }

    fn because(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }
}

/// Mutable state threaded through one run.
#[derive(Default)]
struct Run {
    diagnostics: Diagnostics,
    data: OutcomeData,
}

impl Run {
    /// Record `findings` and stop with `halt`.
    fn halt<I>(&mut self, findings: I, halt: Halt) -> Halt
    where
        I: IntoIterator,
        I::Item: Into<Finding>,
    {
        self.diagnostics.extend(findings);
        halt
    }
}

impl Validator {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            header_checker: HeaderChecker::new(config),
            verifier: SignatureVerifier::new(config),
        }
    }

    /// Validate `token` against `key` at the current time.
    pub fn validate(&self, token: &str, key: &str) -> ValidationOutcome {
        self.validate_at(token, key, Utc::now().timestamp())
    }

    /// Validate `token` against `key` as if the time were `now`
    /// (Unix seconds).
    ///
    /// Deterministic: the same inputs always produce the same outcome.
    pub fn validate_at(&self, token: &str, key: &str, now: i64) -> ValidationOutcome {
        let mut run = Run::default();
        let outcome = match self.run_stages(token, key, now, &mut run) {
            Ok(()) => ValidationOutcome::new(OutcomeState::Valid, MSG_VALID),
            Err(halt) => {
                let mut outcome = ValidationOutcome::new(halt.state, halt.message);
                outcome.segments_found = halt.segments_found;
                match halt.reason {
                    Some(reason) => outcome.with_reason(reason),
                    None => outcome,
                }
            }
        };
        let outcome = outcome
            .with_data(run.data)
            .with_diagnostics(run.diagnostics);

        tracing::info!(
            state = %outcome.state,
            findings = outcome.diagnostics.findings().len(),
            "validation finished"
        );
        outcome
    }

    fn run_stages(&self, token: &str, key: &str, now: i64, run: &mut Run) -> Result<(), Halt> {
        let raw = split_segments(token).map_err(|err| {
            let found = match err {
                StructuralError::SegmentCount { found } => Some(found),
                _ => None,
            };
            run.diagnostics.push(err);
            Halt {
                segments_found: found,
                ..Halt::invalid(MSG_INCOMPLETE)
            }
        })?;
        tracing::debug!("segment count ok");

        let segments = raw.map(decode_segment);
        tracing::debug!(kinds = ?segments.each_ref().map(DecodedSegment::kind), "segments decoded");
        run.data.header = segments[0].value();
        run.data.payload = segments[1].value();
        run.data.signature = Some(Value::String(raw[2].to_string()));
        let (header, payload) = decode_stage(&segments, run)?;

        let roles = validate_structure(&segments);
        if !roles.is_ok() {
            tracing::debug!(defects = roles.errors().len(), "segment roles rejected");
            return Err(run.halt(roles.into_errors(), Halt::invalid(MSG_MALFORMED)));
        }

        let header_verdict = self.header_checker.check(&header);
        if !header_verdict.is_valid() {
            tracing::debug!(defects = header_verdict.errors().len(), "header rejected");
            return Err(run.halt(header_verdict.into_errors(), Halt::invalid(MSG_HEADER)));
        }

        let leakage = check_leakage(&segments[0], &segments[1]);
        if !leakage.is_ok() {
            tracing::debug!(
                claims = ?leakage.errors().iter().flat_map(StructuralError::leaked_claims).collect::<Vec<_>>(),
                "claims in the wrong segment"
            );
            return Err(run.halt(leakage.into_errors(), Halt::invalid(MSG_MALFORMED)));
        }

        let mut emptiness = Vec::new();
        if payload.is_empty() {
            emptiness.push(StructuralError::EmptyPayload);
        }
        if raw[2].is_empty() {
            emptiness.push(StructuralError::EmptySignature);
        }
        if !emptiness.is_empty() {
            return Err(run.halt(emptiness, Halt::invalid(MSG_MALFORMED)));
        }
        tracing::debug!("structure, header and claim placement ok");

        temporal_stage(&payload, now, run)?;
        tracing::debug!("temporal claims ok");

        let claims = self.verifier.verify(token, key).map_err(|err| {
            let reason = err.to_string();
            tracing::debug!(%reason, "signature rejected");
            run.halt([err], Halt::invalid(MSG_BAD_SIGNATURE).because("Clave incorrecta"))
        })?;
        tracing::debug!("signature ok");

        run.data.payload = Some(Value::Object(claims));
        run.data.resolved_key = Some(key.to_string());
        Ok(())
    }
}

/// Require segments 1 and 2 to be JSON objects and segment 3 to decode,
/// collecting every failure before halting.
///
/// An empty third segment is left for the emptiness check.
fn decode_stage(
    segments: &[DecodedSegment; 3],
    run: &mut Run,
) -> Result<(Map<String, Value>, Map<String, Value>), Halt> {
    let mut findings = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
        let position = index + 1;
        let failure = match (&segment.content, position) {
            (SegmentContent::DecodeError(SegmentError::Empty), 3) => None,
            (SegmentContent::DecodeError(err), _) => Some(err.clone()),
            (SegmentContent::Binary, 1 | 2) => Some(SegmentError::Json {
                reason: "los bytes decodificados no son UTF-8".to_string(),
            }),
            (SegmentContent::Text(_), 1 | 2) => Some(SegmentError::Json {
                reason: "se esperaba un objeto JSON".to_string(),
            }),
            _ => None,
        };
        if let Some(source) = failure {
            findings.push(Finding::Decode { position, source });
        }
    }

    match (segments[0].object(), segments[1].object()) {
        (Some(header), Some(payload)) if findings.is_empty() => {
            Ok((header.clone(), payload.clone()))
        }
        _ => Err(run.halt(findings, Halt::corrupt())),
    }
}

fn temporal_stage(payload: &Map<String, Value>, now: i64, run: &mut Run) -> Result<(), Halt> {
    let verdict = evaluate_time(payload, now);
    run.data.issued_at = verdict.issued_at;
    run.data.expires_at = verdict.expires_at;

    match verdict.violation {
        None => Ok(()),
        Some(violation) => {
            let halt = match violation {
                TemporalError::NotYetValid { .. } => Halt::invalid(MSG_NOT_YET_VALID),
                TemporalError::Expired { .. } => Halt::invalid(MSG_EXPIRED),
            }
            .because(violation.reason());
            Err(run.halt([violation], halt))
        }
    }
}
