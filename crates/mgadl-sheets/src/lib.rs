//! mgadl-sheets
//!
//! Spreadsheet persistence. A small collaborator contract ([`backend::Spreadsheet`]),
//! a Google Sheets v4 client implementing it, an in-memory implementation,
//! and the header-reconciling append built on top.

pub mod append;
pub mod backend;
pub mod error;
pub mod google;
pub mod header;
pub mod memory;
