//! Human-readable rendering of validation outcomes and claim reports.

use nu_ansi_term::Color;
use serde_json::{Value, json};

use crate::core::diagnostics::Finding;
use crate::core::outcome::{OutcomeState, ValidationOutcome};
use crate::core::syntax::{SyntaxError, SyntaxSummary};
use crate::core::temporal::ClaimsReport;

use super::json_printer::render_json;

/// Render an outcome as a short report: state line, message, reason,
/// findings, then any decoded data.
pub fn render_outcome(outcome: &ValidationOutcome, use_color: bool) -> String {
    let (color, label) = match outcome.state {
        OutcomeState::Valid => (Color::Green, "VALID"),
        OutcomeState::Invalid => (Color::Red, "INVALID"),
        OutcomeState::Corrupt => (Color::Magenta, "CORRUPT"),
    };
    let label = if use_color {
        color.bold().paint(label).to_string()
    } else {
        label.to_string()
    };

    let mut lines = vec![format!("{label}: {}", outcome.message)];
    if let Some(reason) = &outcome.reason {
        lines.push(format!("Razón: {reason}"));
    }
    if let Some(found) = outcome.segments_found {
        lines.push(format!("Partes encontradas: {found}"));
    }
    for finding in outcome.diagnostics.findings() {
        lines.push(format!("  - {finding}"));
        match finding {
            Finding::Header(err) => {
                if let Some(suggestion) = err.suggestion() {
                    lines.push(format!("    ¿Quisiste decir '{suggestion}'?"));
                }
            }
            Finding::Temporal(err) => lines.push(format!("    {}", err.explanation())),
            _ => {}
        }
    }

    let data = &outcome.data;
    for (title, value) in [("Header", &data.header), ("Payload", &data.payload)] {
        if let Some(value) = value {
            lines.push(format!("\n{title}:"));
            lines.push(render_json(value, use_color));
        }
    }
    if let Some(iat) = &data.issued_at {
        lines.push(format!("Emitido:  {iat}"));
    }
    if let Some(exp) = &data.expires_at {
        lines.push(format!("Expira:   {exp}"));
    }

    lines.join("\n")
}

/// JSON form of a syntax check, nested under `syntax` in `analyze --json`.
pub fn syntax_json(result: &Result<SyntaxSummary, SyntaxError>) -> Value {
    match result {
        Ok(summary) => json!({
            "valid": true,
            "headerLength": summary.header_length,
            "payloadLength": summary.payload_length,
            "signatureLength": summary.signature_length,
        }),
        Err(err) => {
            let mut value = json!({
                "valid": false,
                "error": err.to_string(),
                "part": err.part(),
            });
            if let SyntaxError::InvalidChar { length, content, .. } = err {
                value["length"] = json!(length);
                value["content"] = json!(content);
            }
            value
        }
    }
}

/// Render the outcome of the grammar check.
pub fn render_syntax(result: &Result<SyntaxSummary, SyntaxError>, use_color: bool) -> String {
    let (color, text) = match result {
        Ok(summary) => (
            Color::Green,
            format!(
                "Análisis sintáctico: aceptado en q5 (Header {}, Payload {}, Signature {} caracteres)",
                summary.header_length, summary.payload_length, summary.signature_length
            ),
        ),
        Err(err) => (Color::Red, format!("Análisis sintáctico: rechazado\n  ✗ {err}")),
    };
    if use_color {
        color.paint(text).to_string()
    } else {
        text
    }
}

/// JSON form of a claims report, as printed by `analyze --json`.
pub fn claims_report_json(report: &ClaimsReport) -> Value {
    json!({
        "valid": report.is_valid(),
        "errors": report.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "warnings": report.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "metadata": report.metadata,
    })
}

/// Render a claims report with errors first, then warnings.
pub fn render_claims_report(report: &ClaimsReport, use_color: bool) -> String {
    let paint = |color: Color, text: String| {
        if use_color {
            color.paint(text).to_string()
        } else {
            text
        }
    };

    let mut lines = Vec::new();
    lines.push(if report.is_valid() {
        paint(Color::Green, "Análisis semántico: sin errores".to_string())
    } else {
        paint(
            Color::Red,
            format!("Análisis semántico: {} error(es)", report.errors.len()),
        )
    });
    for error in &report.errors {
        lines.push(paint(Color::Red, format!("  ✗ {error}")));
    }
    for warning in &report.warnings {
        lines.push(paint(Color::Yellow, format!("  ! {warning}")));
    }

    let meta = &report.metadata;
    lines.push(format!("Claims: {}", meta.total_claims));
    if let Some(secs) = meta.time_to_expiry {
        lines.push(format!("Segundos hasta expirar: {secs}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::Diagnostics;
    use crate::core::header::HeaderError;
    use crate::core::outcome::{MSG_EXPIRED, MSG_HEADER, MSG_INCOMPLETE};
    use crate::core::syntax::check_syntax;
    use crate::core::temporal::{TemporalError, evaluate_claims};

    #[test]
    fn test_render_invalid_outcome_plain() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(TemporalError::Expired {
            at: "2023-11-14T22:13:19.000Z".to_string(),
        });
        let outcome = ValidationOutcome::new(OutcomeState::Invalid, MSG_EXPIRED)
            .with_reason("Token expirado")
            .with_diagnostics(diagnostics);

        let rendered = render_outcome(&outcome, false);
        assert!(rendered.starts_with("INVALID: El token ha superado su fecha de expiración"));
        assert!(rendered.contains("Razón: Token expirado"));
        assert!(rendered.contains("  - Token expirado: 'exp' (2023-11-14T22:13:19.000Z) ya pasó"));
        assert!(rendered.contains("    El token ha superado su fecha de expiración"));
    }

    #[test]
    fn test_render_header_typo_suggestion() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(HeaderError::TypTypo {
            found: "JTW".to_string(),
        });
        let outcome = ValidationOutcome::new(OutcomeState::Invalid, MSG_HEADER)
            .with_diagnostics(diagnostics);
        assert!(render_outcome(&outcome, false).contains("¿Quisiste decir 'JWT'?"));
    }

    #[test]
    fn test_render_segment_count() {
        let mut outcome = ValidationOutcome::new(OutcomeState::Invalid, MSG_INCOMPLETE);
        outcome.segments_found = Some(2);
        assert!(render_outcome(&outcome, false).contains("Partes encontradas: 2"));
    }

    #[test]
    fn test_claims_report_json_shape() {
        let header = serde_json::Map::new();
        let Value::Object(payload) = json!({"role": "root"}) else {
            unreachable!()
        };
        let value = claims_report_json(&evaluate_claims(&header, &payload, 0));
        assert_eq!(value["valid"], false);
        assert!(value["errors"].as_array().unwrap().len() >= 2);
        assert_eq!(value["metadata"]["totalClaims"], 1);
    }

    #[test]
    fn test_syntax_json_names_offending_part() {
        let value = syntax_json(&check_syntax("eyJh.ab+c.sig"));
        assert_eq!(value["valid"], false);
        assert_eq!(value["part"], "payload");
        assert_eq!(value["length"], 4);
        assert_eq!(value["content"], "ab+c");
        assert!(value["error"].as_str().unwrap().starts_with("Error en q3"));

        let value = syntax_json(&check_syntax("abc.de.f"));
        assert_eq!(value["valid"], true);
        assert_eq!(value["payloadLength"], 2);
    }

    #[test]
    fn test_render_syntax_plain() {
        assert!(render_syntax(&check_syntax("abc.de.f"), false).contains("aceptado en q5"));
        let rendered = render_syntax(&check_syntax("a.b"), false);
        assert!(rendered.starts_with("Análisis sintáctico: rechazado"));
        assert!(rendered.contains("se encontraron 2"));
    }

    #[test]
    fn test_render_claims_report_plain() {
        let Value::Object(header) = json!({"alg": "HS256", "typ": "JWT"}) else {
            unreachable!()
        };
        let Value::Object(payload) = json!({"iat": 0, "exp": 60}) else {
            unreachable!()
        };
        let rendered = render_claims_report(&evaluate_claims(&header, &payload, 10), false);
        assert!(rendered.starts_with("Análisis semántico: sin errores"));
        assert!(rendered.contains("Segundos hasta expirar: 50"));
    }
}
