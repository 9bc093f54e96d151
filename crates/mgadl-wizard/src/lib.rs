//! mgadl-wizard
//!
//! The three-step submission flow: password gate and patient details,
//! questionnaire, result. Session state is an explicit value handed to each
//! handler; the controller owns only configuration and collaborators.

pub mod clock;
pub mod controller;
pub mod error;
pub mod session;
pub mod view;
