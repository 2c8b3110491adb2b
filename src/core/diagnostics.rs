//! The validation finding taxonomy and its accumulator.
//!
//! A [`Finding`] describes something wrong with a token. Findings never
//! escape as errors; the pipeline threads one [`Diagnostics`] value through
//! every stage and folds it into the final outcome.

use thiserror::Error;

use super::header::HeaderError;
use super::segment::SegmentError;
use super::signature::SignatureError;
use super::structure::StructuralError;
use super::temporal::TemporalError;

/// One problem found while validating a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Finding {
    /// Segment at `position` (1-based) could not be decoded.
    #[error("Error en la parte {position} del Token: {source}")]
    Decode {
        position: usize,
        source: SegmentError,
    },

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Ordered findings from one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    findings: Vec<Finding>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: impl Into<Finding>) {
        self.findings.push(finding.into());
    }

    pub fn extend<I>(&mut self, findings: I)
    where
        I: IntoIterator,
        I::Item: Into<Finding>,
    {
        self.findings.extend(findings.into_iter().map(Into::into));
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// All finding messages joined with `". "`, or `None` when empty.
    pub fn joined(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.findings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(". "),
        )
    }
}
