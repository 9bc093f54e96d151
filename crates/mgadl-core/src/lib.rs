//! mgadl-core
//!
//! Pure domain types, sheet column conventions, and identity hashing.
//! No network dependency. This is the shared vocabulary of the MG-ADL
//! survey: every other crate speaks in these types.

pub mod columns;
pub mod error;
pub mod hashing;
pub mod models;
