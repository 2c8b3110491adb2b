//! Handler for the `generate` subcommand.
//!
//! Signs a claim set with the configured HS256 secret and prints the token.

use anyhow::Result;
use chrono::Utc;
use serde_json::{Value, json};

use crate::cli::GenerateArgs;
use crate::config::SignerConfig;
use crate::core::signer::Signer;
use crate::core::time_travel::parse_duration;
use crate::display::json_printer::print_json;
use crate::error::JwtAuditError;

/// Execute the `generate` subcommand with the given arguments.
pub fn execute(args: &GenerateArgs) -> Result<()> {
    let claims: Value =
        serde_json::from_str(&args.claims).map_err(|e| JwtAuditError::InvalidClaims {
            reason: format!("not valid JSON: {e}"),
        })?;
    let expires_in = parse_duration(&args.expires_in)?;

    let signer = Signer::new(SignerConfig::from_env(args.secret_env.as_deref())?);
    let token = signer.sign(claims, expires_in, Utc::now().timestamp())?;

    if args.json {
        print_json(&json!({ "token": token }), false);
    } else {
        println!("{token}");
    }
    Ok(())
}
