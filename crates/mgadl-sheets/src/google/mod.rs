//! Google Sheets v4 REST backend, authenticated as a service account.

pub mod auth;
pub mod client;

pub use auth::ServiceAccountKey;
pub use client::GoogleSheets;
