//! Deterministic, salted digests used as de-identified keys.
//!
//! Both keys are the first 16 hex characters of a SHA-256 digest over
//! `|`-joined inputs. They are not reversible and carry no meaning beyond
//! equality.

use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::models::responses::ResponseSet;

/// Length of every hex key produced here.
pub const KEY_LEN: usize = 16;

/// Pseudonymous patient key: `sha256(name|dob|salt)`.
pub fn patient_hash(name: &str, dob: &str, salt: &str) -> String {
    short_digest(&format!("{name}|{dob}|{salt}"))
}

/// Content-addressed submission key:
/// `sha256(patient_hash|created_at|canonical_json(responses))`.
///
/// Identical responses captured at the same timestamp for the same patient
/// always produce the same id, which is what makes resends detectable.
pub fn submission_id(
    patient_hash: &str,
    created_at: &str,
    responses: &ResponseSet,
) -> Result<String, CoreError> {
    let canonical = responses.canonical_json()?;
    Ok(short_digest(&format!("{patient_hash}|{created_at}|{canonical}")))
}

fn short_digest(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    digest
        .iter()
        .take(KEY_LEN / 2)
        .map(|b| format!("{b:02x}"))
        .collect()
}
