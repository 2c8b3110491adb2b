//! Handler for the `validate` subcommand.
//!
//! Resolves the token and key, runs the validation pipeline, prints the
//! outcome and appends it to the audit log when one is configured.

use std::process::ExitCode;

use anyhow::Result;
use zeroize::Zeroizing;

use crate::audit::{AuditEntry, AuditRecord, AuditStore, JsonlAuditStore};
use crate::cli::ValidateArgs;
use crate::config::{AuditConfig, ValidatorConfig};
use crate::core::outcome::ValidationOutcome;
use crate::core::validator::Validator;
use crate::display::json_printer::print_json;
use crate::display::outcome::render_outcome;
use crate::error::JwtAuditError;
use crate::input::{ValidationRequest, resolve_key, resolve_token};

use super::{resolve_now, stdout_is_terminal};

/// Exit code when the outcome was computed but could not be audited.
pub const AUDIT_FAILURE_EXIT: u8 = 3;

/// Execute the `validate` subcommand with the given arguments.
///
/// Exits 0 for a valid token, 1 for an invalid or corrupt one, and
/// [`AUDIT_FAILURE_EXIT`] when the audit record could not be written.
pub fn execute(args: &ValidateArgs) -> Result<ExitCode> {
    let (token, key) = resolve_inputs(args)?;
    let config = ValidatorConfig::restricted_to(&args.allow_alg)?;
    let validator = Validator::new(&config);
    let outcome = match args.at.as_deref() {
        Some(at) => validator.validate_at(&token, &key, resolve_now(Some(at))?),
        None => validator.validate(&token, &key),
    };

    if args.json {
        print_json(&serde_json::to_value(&outcome)?, false);
    } else {
        println!("{}", render_outcome(&outcome, stdout_is_terminal()));
    }

    if let AuditConfig::File(path) = AuditConfig::resolve(args.audit_log.clone(), args.no_audit) {
        let audited = JsonlAuditStore::open(path).and_then(|store| {
            let entry = record(&store, &outcome)?;
            tracing::info!(id = entry.id, log = %store.path().display(), "outcome audited");
            Ok(entry)
        });
        if let Err(err) = audited {
            tracing::warn!(error = %err, "audit record not written");
            eprintln!("Error: {err}");
            return Ok(ExitCode::from(AUDIT_FAILURE_EXIT));
        }
    }

    Ok(if outcome.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Append `outcome` to `store`.
///
/// # Errors
///
/// Propagates the store's write failure.
pub fn record(store: &dyn AuditStore, outcome: &ValidationOutcome) -> Result<AuditRecord, JwtAuditError> {
    store.append(&AuditEntry::from_outcome(outcome))
}

fn resolve_inputs(args: &ValidateArgs) -> Result<(Zeroizing<String>, Zeroizing<String>), JwtAuditError> {
    if let Some(source) = &args.request {
        let request = ValidationRequest::load(source)?;
        return Ok((request.token, request.key));
    }

    let token = resolve_token(
        args.source.token.as_deref(),
        args.source.token_env.as_deref(),
    )?;
    let key = resolve_key(
        args.key.as_ref(),
        args.key_env.as_deref(),
        args.key_file.as_deref(),
    )?;
    Ok((token, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditStore;
    use crate::core::outcome::{MSG_BAD_SIGNATURE, MSG_VALID, OutcomeData, OutcomeState};

    #[test]
    fn test_record_redacts_key() {
        let store = MemoryAuditStore::default();
        let outcome = ValidationOutcome::new(OutcomeState::Valid, MSG_VALID).with_data(OutcomeData {
            resolved_key: Some("s3cret".to_string()),
            ..OutcomeData::default()
        });

        let record = record(&store, &outcome).unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.state, "valid");
        assert!(!record.description.to_string().contains("s3cret"));
    }

    #[test]
    fn test_record_every_outcome() {
        let store = MemoryAuditStore::default();
        record(&store, &ValidationOutcome::new(OutcomeState::Valid, MSG_VALID)).unwrap();
        record(
            &store,
            &ValidationOutcome::new(OutcomeState::Invalid, MSG_BAD_SIGNATURE)
                .with_reason("Clave incorrecta"),
        )
        .unwrap();

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].description["razon"], "Clave incorrecta");
    }
}
