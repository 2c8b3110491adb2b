//! Handler for the `analyze` subcommand.
//!
//! Checks the token against the strict base64url grammar first, then runs
//! every header and claim rule without short-circuiting and prints the
//! full list of errors and warnings. The signature is not checked.

use std::process::ExitCode;

use anyhow::Result;
use serde_json::json;

use crate::cli::AnalyzeArgs;
use crate::core::decoder::decode_token;
use crate::core::syntax::check_syntax;
use crate::core::temporal::evaluate_claims;
use crate::display::json_printer::print_json;
use crate::display::outcome::{
    claims_report_json, render_claims_report, render_syntax, syntax_json,
};
use crate::input::resolve_token;

use super::{resolve_now, stdout_is_terminal};

/// Execute the `analyze` subcommand. Exits non-zero when the grammar
/// rejects the token or any error-level finding is reported; warnings
/// alone do not fail.
pub fn execute(args: &AnalyzeArgs) -> Result<ExitCode> {
    let token = resolve_token(
        args.source.token.as_deref(),
        args.source.token_env.as_deref(),
    )?;
    let use_color = stdout_is_terminal();

    let syntax = check_syntax(&token);
    if let Err(err) = &syntax {
        tracing::info!(part = ?err.part(), "token rejected by the grammar");
        if args.json {
            let value = json!({ "valid": false, "syntax": syntax_json(&syntax) });
            print_json(&value, false);
        } else {
            println!("{}", render_syntax(&syntax, use_color));
        }
        return Ok(ExitCode::FAILURE);
    }

    let decoded = decode_token(&token)?;
    let now = resolve_now(args.at.as_deref())?;

    let report = evaluate_claims(&decoded.header, &decoded.payload, now);
    tracing::info!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "analysis finished"
    );

    if args.json {
        let mut value = claims_report_json(&report);
        value["syntax"] = syntax_json(&syntax);
        print_json(&value, false);
    } else {
        println!("{}", render_syntax(&syntax, use_color));
        println!("{}", render_claims_report(&report, use_color));
    }

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
