//! ICS 24: Host Requirements, identifier validation.

pub mod error;
pub mod identifier;
pub mod validate;
