//! Colorized JSON pretty-printing for terminal output.
//!
//! Renders JSON values with syntax highlighting:
//! - Field names in cyan
//! - Strings in green
//! - Numbers in yellow
//! - Booleans in magenta
//! - Null in red

use std::fmt::Write;

use nu_ansi_term::Color;
use serde_json::Value;

const INDENT: &str = "  ";

/// Render a JSON value with 2-space indentation.
///
/// With `use_color` false the output is plain pretty JSON, suitable for
/// piping into other tools.
pub fn render_json(value: &Value, use_color: bool) -> String {
    if !use_color {
        return serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    }
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

/// Print a JSON value to stdout, colorized when `use_color` is set.
pub fn print_json(value: &Value, use_color: bool) {
    println!("{}", render_json(value, use_color));
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => push_painted(out, Color::Red, "null"),
        Value::Bool(b) => push_painted(out, Color::Magenta, &b.to_string()),
        Value::Number(n) => push_painted(out, Color::Yellow, &n.to_string()),
        Value::String(_) => push_painted(out, Color::Green, &value.to_string()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                out.push_str(&INDENT.repeat(depth + 1));
                write_value(out, item, depth + 1);
                out.push_str(if i + 1 < items.len() { ",\n" } else { "\n" });
            }
            out.push_str(&INDENT.repeat(depth));
            out.push(']');
        }
        Value::Object(map) => {
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                out.push_str(&INDENT.repeat(depth + 1));
                push_painted(out, Color::Cyan, &Value::String(key.clone()).to_string());
                out.push_str(": ");
                write_value(out, item, depth + 1);
                out.push_str(if i + 1 < map.len() { ",\n" } else { "\n" });
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
        }
    }
}

fn push_painted(out: &mut String, color: Color, text: &str) {
    let _ = write!(out, "{}", color.paint(text));
}
