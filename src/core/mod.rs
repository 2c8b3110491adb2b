//! Core business logic for JWT auditing.
//!
//! This module contains the domain logic separated from CLI concerns.
//! All types and functions here are testable without the CLI layer.
//!
//! The validation pipeline runs leaves first: [`segment`] decoding,
//! [`classifier`] role inference, [`structure`] checks, [`header`]
//! semantics, [`temporal`] claims, then [`signature`] verification, all
//! orchestrated by [`validator`]. [`syntax`] is the strict grammar check
//! used by `analyze`.

pub mod classifier;
pub mod decoder;
pub mod diagnostics;
pub mod header;
pub mod outcome;
pub mod segment;
pub mod signature;
pub mod signer;
pub mod structure;
pub mod syntax;
pub mod temporal;
pub mod time_travel;
pub mod validator;
