//! Command handlers for each CLI subcommand.
//!
//! Each subcommand is implemented in its own module and exposes
//! a single `execute` function that receives the parsed arguments.

pub mod analyze;
pub mod decode;
pub mod generate;
pub mod validate;

use std::io::{self, IsTerminal};

use chrono::Utc;

use crate::core::time_travel::parse_time_expression;
use crate::error::JwtAuditError;

/// The evaluation instant in Unix seconds: `--at` if given, else now.
fn resolve_now(at: Option<&str>) -> Result<i64, JwtAuditError> {
    let now = Utc::now();
    match at {
        Some(expression) => {
            let target = parse_time_expression(expression, now)?;
            tracing::debug!(
                expression = %target.expression,
                at = %target.timestamp,
                "evaluating at simulated time"
            );
            Ok(target.timestamp.timestamp())
        }
        None => Ok(now.timestamp()),
    }
}

/// Colors only when stdout is an interactive terminal.
fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}
