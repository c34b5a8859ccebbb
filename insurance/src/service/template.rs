use chrono::{DateTime, Utc};
use common::entities::insurance::InsuranceEntry;
use regex::{Captures, Regex};

use crate::service::expiry::{days_until_expiry, parse_expiry};

lazy_static::lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([A-Za-z]+)\}").unwrap();
}

/// Subject/body pair with `{placeholder}` tokens. The default carries
/// the standard expiry-reminder wording.
#[derive(Debug, Clone)]
pub struct ReminderTemplate {
    pub subject: String,
    pub body: String,
}

impl Default for ReminderTemplate {
    fn default() -> Self {
        Self {
            subject: "Insurance Expiry Reminder - {vehicleNo}".to_string(),
            body: "Hi {name},\n\n\
                Your {vehicleType} insurance for {vehicleNo} is expiring on {expiryDate} \
                ({daysUntilExpiry} days remaining). Please renew it before the due date \
                to avoid penalties and ensure continuous coverage.\n\n\
                Vehicle Details:\n\
                - Vehicle Number: {vehicleNo}\n\
                - Vehicle Type: {vehicleType}\n\
                - Owner: {name}\n\
                - Mobile: {mobileNo}\n\n\
                Thanks,\n\
                InsureTrack Team"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Substitute entry fields into the template. The HTML variant embeds
/// the substituted text into a fixed document shell, so the two can
/// never disagree on substituted values.
pub fn render(
    template: &ReminderTemplate,
    entry: &InsuranceEntry,
    as_of: DateTime<Utc>,
) -> RenderedEmail {
    let subject = substitute(&template.subject, entry, as_of);
    let text = substitute(&template.body, entry, as_of);
    let html = html_shell(&subject, &text);
    RenderedEmail {
        subject,
        text,
        html,
    }
}

/// Single substitution pass. Tokens outside the supported set are left
/// verbatim; supported tokens with no value render a readable stand-in
/// instead of an empty string.
fn substitute(input: &str, entry: &InsuranceEntry, as_of: DateTime<Utc>) -> String {
    PLACEHOLDER
        .replace_all(input, |caps: &Captures| {
            match resolve(&caps[1], entry, as_of) {
                Some(value) => value,
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn resolve(token: &str, entry: &InsuranceEntry, as_of: DateTime<Utc>) -> Option<String> {
    match token {
        "name" => Some(or_fallback(&entry.name, "Customer")),
        "vehicleNo" | "policyNumber" => Some(or_fallback(&entry.vehicle_no, "N/A")),
        "vehicleType" | "policyType" => Some(or_fallback(&entry.vehicle_type, "N/A")),
        "mobileNo" | "phone" => Some(or_fallback(
            entry.mobile_no.as_deref().unwrap_or(""),
            "N/A",
        )),
        "expiryDate" => Some(format_expiry(&entry.expiry_date)),
        "daysUntilExpiry" => Some(
            parse_expiry(&entry.expiry_date)
                .map(|expiry| days_until_expiry(expiry, as_of).to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        _ => None,
    }
}

fn or_fallback(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Render the stored date human-readably ("January 10, 2025");
/// unparseable values pass through untouched.
fn format_expiry(raw: &str) -> String {
    match parse_expiry(raw) {
        Some(expiry) => expiry.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

fn html_shell(title: &str, body: &str) -> String {
    let body = body.replace('\n', "<br/>\n");
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\n\
         <h2 style=\"color: #3b82f6;\">{title}</h2>\n\
         <div style=\"background-color: #f3f4f6; border-radius: 8px; padding: 16px;\">\n\
         <p>{body}</p>\n\
         </div>\n\
         <p style=\"color: #6b7280; font-size: 12px;\">\
         This is an automated reminder. Please do not reply to this email.</p>\n\
         </div>"
    )
}
