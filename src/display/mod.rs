//! Terminal display and formatting utilities.
//!
//! Handles colorized JSON output, token status and validation outcome
//! rendering for human-readable terminal output.

pub mod json_printer;
pub mod outcome;
pub mod token_status;
