//! mgadl-export
//!
//! Local artifacts for a completed questionnaire: the per-item breakdown,
//! a plain-text summary, and the single-row CSV download.

pub mod csv;
pub mod error;
pub mod render;
pub mod summary;
