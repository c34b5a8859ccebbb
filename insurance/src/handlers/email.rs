use actix_web::{
    post,
    web::{self, Json},
    HttpResponse,
};
use chrono::Utc;
use common::{
    entities::insurance::NewEntry,
    error::{AddCode, Result},
};
use log::error;
use serde_json::json;

use crate::{
    service::{
        reminder,
        template::{render, ReminderTemplate},
        validate,
    },
    AppState,
};

/// On-demand version of the scheduled sweep.
#[post("/send-reminders")]
pub async fn send_reminders(state: web::Data<AppState>) -> Result<HttpResponse> {
    let report = reminder::run_sweep(&state, None).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Reminder process completed",
        "sent": report.sent,
        "failed": report.failed,
        "total": report.total,
        "results": report.results,
    })))
}

/// Send one reminder for an ad-hoc entry; the entry does not need to be
/// stored. The outcome is logged either way.
#[post("/send-single-reminder")]
pub async fn send_single_reminder(
    state: web::Data<AppState>,
    Json(entry): web::Json<NewEntry>,
) -> Result<HttpResponse> {
    if entry.name.trim().is_empty()
        || entry.email.trim().is_empty()
        || entry.expiry_date.trim().is_empty()
    {
        return Err(anyhow::anyhow!("Missing required fields").code(400));
    }
    if !validate::is_valid_email(entry.email.trim()) {
        return Err(anyhow::anyhow!("email is not a valid address").code(400));
    }

    let entry = entry.into_entry(String::new(), Utc::now().to_rfc3339());
    let rendered = render(&ReminderTemplate::default(), &entry, Utc::now());
    let outcome = state.mailer.send(
        &entry.email,
        &rendered.subject,
        &rendered.text,
        Some(rendered.html.as_str()),
    );

    if let Err(err) = state.storage.logs.add(outcome.to_log(&entry.email)).await {
        error!("failed to record email log for {}: {err}", entry.email);
    }

    Ok(HttpResponse::Ok().json(outcome))
}
