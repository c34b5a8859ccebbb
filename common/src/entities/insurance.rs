use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A tracked insurance policy. Wire names are camelCase to match the
/// shape the admin UI exchanges; the older `policyNumber`/`policyType`/
/// `phone` field names are accepted as input aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceEntry {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(alias = "policyNumber")]
    pub vehicle_no: String,
    #[serde(alias = "policyType")]
    pub vehicle_type: String,
    #[serde(default, alias = "phone", skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    pub expiry_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_amount: Option<f64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl InsuranceEntry {
    /// Merge a partial update into this entry. Only supplied fields
    /// change; `updatedAt` is always refreshed.
    pub fn apply(&mut self, patch: EntryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(vehicle_no) = patch.vehicle_no {
            self.vehicle_no = vehicle_no;
        }
        if let Some(vehicle_type) = patch.vehicle_type {
            self.vehicle_type = vehicle_type;
        }
        if let Some(mobile_no) = patch.mobile_no {
            self.mobile_no = Some(mobile_no);
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = expiry_date;
        }
        if let Some(premium) = patch.premium {
            self.premium = Some(premium);
        }
        if let Some(coverage_amount) = patch.coverage_amount {
            self.coverage_amount = Some(coverage_amount);
        }
        self.updated_at = Some(Utc::now().to_rfc3339());
    }
}

/// Client payload for creating an entry. `id` and `createdAt` are never
/// client-supplied; the storage backend assigns both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "policyNumber")]
    pub vehicle_no: String,
    #[serde(default, alias = "policyType")]
    pub vehicle_type: String,
    #[serde(default, alias = "phone")]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub premium: Option<f64>,
    #[serde(default)]
    pub coverage_amount: Option<f64>,
}

impl NewEntry {
    pub fn into_entry(self, id: String, created_at: String) -> InsuranceEntry {
        InsuranceEntry {
            id,
            name: self.name,
            email: self.email,
            vehicle_no: self.vehicle_no,
            vehicle_type: self.vehicle_type,
            mobile_no: self.mobile_no,
            expiry_date: self.expiry_date,
            premium: self.premium,
            coverage_amount: self.coverage_amount,
            created_at,
            updated_at: None,
        }
    }
}

/// Partial update with merge semantics. Absent fields serialize to
/// nothing, so the document-store `$set` touches only what was supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, alias = "policyNumber", skip_serializing_if = "Option::is_none")]
    pub vehicle_no: Option<String>,
    #[serde(default, alias = "policyType", skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default, alias = "phone", skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_amount: Option<f64>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.vehicle_no.is_none()
            && self.vehicle_type.is_none()
            && self.mobile_no.is_none()
            && self.expiry_date.is_none()
            && self.premium.is_none()
            && self.coverage_amount.is_none()
    }
}
