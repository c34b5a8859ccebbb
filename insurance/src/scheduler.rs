use std::time::Duration;

use actix_web::web;
use chrono::{Timelike, Utc};
use log::{error, info};

use crate::{service::reminder, AppState};

/// Daily sweep time, 08:00 UTC.
const SWEEP_HOUR: u32 = 8;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn the recurring reminder sweep. On-demand sweeps triggered over
/// HTTP run independently; overlap with the scheduled run is allowed.
pub fn start(state: web::Data<AppState>) {
    actix_web::rt::spawn(async move {
        let wait = seconds_until_hour(SWEEP_HOUR);
        info!("daily reminder sweep scheduled in {wait}s");
        tokio::time::sleep(Duration::from_secs(wait)).await;

        let mut tick = tokio::time::interval(DAY);
        loop {
            tick.tick().await;
            info!("running scheduled reminder sweep");
            match reminder::run_sweep(&state, None).await {
                Ok(report) => info!(
                    "scheduled sweep: {} sent, {} failed of {}",
                    report.sent, report.failed, report.total
                ),
                Err(err) => error!("scheduled reminder sweep failed: {err}"),
            }
        }
    });
}

fn seconds_until_hour(hour: u32) -> u64 {
    let now = Utc::now();
    let today_at = now
        .with_hour(hour)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let next = if today_at > now {
        today_at
    } else {
        today_at + chrono::Duration::days(1)
    };
    (next - now).num_seconds().max(0) as u64
}
