use chrono::{DateTime, Utc};
use common::error;
use log::{error, info, warn};
use serde::Serialize;

use crate::{
    service::{
        expiry::{classify, parse_expiry, ExpiryStatus},
        template::{render, ReminderTemplate},
    },
    AppState,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryOutcome {
    pub id: String,
    pub name: String,
    pub email: String,
    pub success: bool,
    pub simulated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
    pub results: Vec<EntryOutcome>,
}

/// Scan every entry and remind the ones inside the expiry window.
///
/// Selection is the window policy: anything classified `Expiring`
/// (0 < days-to-expiry <= window) is reminded; already-expired entries
/// are not. Sends run sequentially, and one entry's failure never
/// aborts the sweep. `as_of` is injectable for deterministic tests and
/// defaults to now.
pub async fn run_sweep(
    state: &AppState,
    as_of: Option<DateTime<Utc>>,
) -> error::Result<SweepReport> {
    let as_of = as_of.unwrap_or_else(Utc::now);
    let window_days = state.config.reminder_days;
    let template = ReminderTemplate::default();

    let entries = state.storage.entries.list().await?;
    let total_entries = entries.len();
    let mut results = Vec::new();

    for entry in entries {
        let Some(expiry) = parse_expiry(&entry.expiry_date) else {
            warn!(
                "skipping entry {} with unparseable expiry date {:?}",
                entry.id, entry.expiry_date
            );
            continue;
        };
        if classify(expiry, as_of, window_days) != ExpiryStatus::Expiring {
            continue;
        }

        let rendered = render(&template, &entry, as_of);
        let outcome = state
            .mailer
            .send(
                &entry.email,
                &rendered.subject,
                &rendered.text,
                Some(rendered.html.as_str()),
            );

        // The log record is best-effort; a storage hiccup must not fail
        // the entry or the sweep.
        if let Err(err) = state.storage.logs.add(outcome.to_log(&entry.email)).await {
            error!("failed to record email log for {}: {err}", entry.email);
        }

        results.push(EntryOutcome {
            id: entry.id,
            name: entry.name,
            email: entry.email,
            success: outcome.success,
            simulated: outcome.simulated,
            error: outcome.error,
        });
    }

    let sent = results.iter().filter(|r| r.success).count();
    let failed = results.len() - sent;
    info!(
        "reminder sweep finished: {sent} sent, {failed} failed, {} of {} entries selected",
        results.len(),
        total_entries
    );

    Ok(SweepReport {
        sent,
        failed,
        total: results.len(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;
    use chrono::TimeZone;
    use common::entities::{email_log::EmailStatus, insurance::NewEntry};

    fn entry(name: &str, email: &str, vehicle_no: &str, expiry_date: &str) -> NewEntry {
        NewEntry {
            name: name.to_string(),
            email: email.to_string(),
            vehicle_no: vehicle_no.to_string(),
            vehicle_type: "Car".to_string(),
            expiry_date: expiry_date.to_string(),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn sweep_reminds_only_entries_inside_the_window() {
        let state = test_state();
        let store = &state.storage.entries;

        store
            .add(entry("Asha", "asha@example.com", "MH12AB1234", "2025-01-10"))
            .await
            .unwrap();
        // expired: expiry equal to as_of
        store
            .add(entry("Ravi", "ravi@example.com", "KA01CD5678", "2025-01-05"))
            .await
            .unwrap();
        // active: well past the window
        store
            .add(entry("Meera", "meera@example.com", "TN10EF9012", "2025-03-01"))
            .await
            .unwrap();

        let as_of = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
        let report = run_sweep(&state, Some(as_of)).await.unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.results[0].email, "asha@example.com");
        assert!(report.results[0].simulated);

        let logs = state.storage.logs.list().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].recipient, "asha@example.com");
        assert_eq!(logs[0].status, EmailStatus::Simulated);
    }

    #[actix_web::test]
    async fn sweep_skips_unparseable_expiry_dates() {
        let state = test_state();
        state
            .storage
            .entries
            .add(entry("Asha", "asha@example.com", "MH12AB1234", "whenever"))
            .await
            .unwrap();

        let as_of = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
        let report = run_sweep(&state, Some(as_of)).await.unwrap();

        assert_eq!(report.total, 0);
        assert!(state.storage.logs.list().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn sweep_on_empty_store_reports_zero() {
        let state = test_state();
        let report = run_sweep(&state, None).await.unwrap();

        assert_eq!(report.sent, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(report.total, 0);
    }
}
