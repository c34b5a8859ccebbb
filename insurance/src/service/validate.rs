use common::entities::insurance::{EntryPatch, NewEntry};
use regex::Regex;
use serde::Serialize;

use crate::service::expiry::parse_expiry;

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Check a full record and return it with string fields trimmed, or
/// every problem found.
pub fn validate_new(entry: &NewEntry) -> Result<NewEntry, Vec<String>> {
    let mut errors = Vec::new();
    let mut cleaned = entry.clone();

    cleaned.name = cleaned.name.trim().to_string();
    cleaned.email = cleaned.email.trim().to_string();
    cleaned.vehicle_no = cleaned.vehicle_no.trim().to_string();
    cleaned.vehicle_type = cleaned.vehicle_type.trim().to_string();
    cleaned.expiry_date = cleaned.expiry_date.trim().to_string();
    cleaned.mobile_no = cleaned
        .mobile_no
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from);

    if cleaned.name.is_empty() {
        errors.push("name is required".to_string());
    }
    if cleaned.email.is_empty() {
        errors.push("email is required".to_string());
    } else if !is_valid_email(&cleaned.email) {
        errors.push("email is not a valid address".to_string());
    }
    if cleaned.vehicle_no.is_empty() {
        errors.push("vehicleNo is required".to_string());
    }
    if cleaned.vehicle_type.is_empty() {
        errors.push("vehicleType is required".to_string());
    }
    if cleaned.expiry_date.is_empty() {
        errors.push("expiryDate is required".to_string());
    } else if parse_expiry(&cleaned.expiry_date).is_none() {
        errors.push("expiryDate is not a valid date".to_string());
    }
    if matches!(cleaned.premium, Some(p) if p < 0.0) {
        errors.push("premium must be a non-negative number".to_string());
    }
    if matches!(cleaned.coverage_amount, Some(c) if c < 0.0) {
        errors.push("coverageAmount must be a non-negative number".to_string());
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

/// Partial updates only check the fields that were supplied.
pub fn validate_patch(patch: &EntryPatch) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if matches!(&patch.name, Some(n) if n.trim().is_empty()) {
        errors.push("name must not be empty".to_string());
    }
    if let Some(email) = &patch.email {
        if !is_valid_email(email.trim()) {
            errors.push("email is not a valid address".to_string());
        }
    }
    if matches!(&patch.vehicle_no, Some(v) if v.trim().is_empty()) {
        errors.push("vehicleNo must not be empty".to_string());
    }
    if matches!(&patch.vehicle_type, Some(v) if v.trim().is_empty()) {
        errors.push("vehicleType must not be empty".to_string());
    }
    if let Some(expiry) = &patch.expiry_date {
        if parse_expiry(expiry).is_none() {
            errors.push("expiryDate is not a valid date".to_string());
        }
    }
    if matches!(patch.premium, Some(p) if p < 0.0) {
        errors.push("premium must be a non-negative number".to_string());
    }
    if matches!(patch.coverage_amount, Some(c) if c < 0.0) {
        errors.push("coverageAmount must be a non-negative number".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 1-based position in the submitted batch.
    pub row: usize,
    pub error: String,
}

/// Per-row validation for bulk imports. Rows that fail are reported
/// with their position and excluded; valid rows still commit.
pub fn validate_bulk(rows: Vec<serde_json::Value>) -> (Vec<NewEntry>, Vec<RowError>) {
    let mut valid = Vec::new();
    let mut errors = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let row_number = index + 1;
        let parsed: NewEntry = match serde_json::from_value(row) {
            Ok(parsed) => parsed,
            Err(err) => {
                errors.push(RowError {
                    row: row_number,
                    error: format!("malformed row: {err}"),
                });
                continue;
            }
        };
        match validate_new(&parsed) {
            Ok(cleaned) => valid.push(cleaned),
            Err(problems) => errors.push(RowError {
                row: row_number,
                error: problems.join("; "),
            }),
        }
    }

    (valid, errors)
}
