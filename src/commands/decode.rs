//! Handler for the `decode` subcommand.
//!
//! Decodes and pretty-prints a JWT's header and payload without
//! verifying its signature. Supports reading the token from a CLI
//! argument, environment variable, or stdin.

use anyhow::Result;
use serde_json::Value;

use crate::cli::DecodeArgs;
use crate::core::decoder::decode_token;
use crate::display::json_printer::print_json;
use crate::display::token_status::display_token_status;
use crate::input::resolve_token;

use super::{resolve_now, stdout_is_terminal};

/// Execute the `decode` subcommand with the given arguments.
pub fn execute(args: &DecodeArgs) -> Result<()> {
    let token = resolve_token(
        args.source.token.as_deref(),
        args.source.token_env.as_deref(),
    )?;
    let decoded = decode_token(&token)?;

    if args.json {
        print_json(&decoded.to_json(), false);
        return Ok(());
    }

    let now = resolve_now(args.at.as_deref())?;
    let color = stdout_is_terminal();

    println!("Header:");
    print_json(&Value::Object(decoded.header.clone()), color);
    println!("\nPayload:");
    print_json(&Value::Object(decoded.payload.clone()), color);
    println!();
    display_token_status(&decoded.payload, now, color);
    Ok(())
}
