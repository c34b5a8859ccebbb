use std::time::Duration;

use chrono::Utc;
use common::{
    config::Config,
    entities::email_log::{EmailLogEntry, EmailStatus},
};
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use log::{error, warn};
use serde::Serialize;

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one send attempt. The dispatcher only constructs this;
/// persisting the matching log entry is the caller's job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub success: bool,
    pub simulated: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    fn simulated(reason: &str) -> Self {
        Self {
            success: true,
            simulated: true,
            message: "Email sent successfully (simulated)".to_string(),
            message_id: Some(format!("simulated-{}", Utc::now().timestamp_millis())),
            response: Some(reason.to_string()),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            simulated: false,
            message: "Failed to send email".to_string(),
            message_id: None,
            response: None,
            error: Some(error),
        }
    }

    pub fn status(&self) -> EmailStatus {
        if self.simulated {
            EmailStatus::Simulated
        } else if self.success {
            EmailStatus::Success
        } else {
            EmailStatus::Failed
        }
    }

    pub fn to_log(&self, recipient: &str) -> EmailLogEntry {
        EmailLogEntry {
            id: String::new(),
            recipient: recipient.to_string(),
            status: self.status(),
            message: self.message.clone(),
            error: self.error.clone(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// SMTP dispatcher. Without credentials, or with the email feature flag
/// off, every send short-circuits to a simulated success with no
/// network I/O; disablement wins even when credentials exist.
pub struct Mailer {
    transport: Option<SmtpTransport>,
    from: String,
    enabled: bool,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        let transport = match (&config.email_user, &config.email_password) {
            (Some(user), Some(password)) => match SmtpTransport::relay(&config.smtp_host) {
                Ok(builder) => Some(
                    builder
                        .port(config.smtp_port)
                        .credentials(Credentials::new(user.clone(), password.clone()))
                        .timeout(Some(SEND_TIMEOUT))
                        .build(),
                ),
                Err(err) => {
                    warn!(
                        "failed to configure SMTP transport for {}: {err}",
                        config.smtp_host
                    );
                    None
                }
            },
            _ => {
                warn!("email credentials not configured; sends will be simulated");
                None
            }
        };

        Self {
            transport,
            from: config.email_user.clone().unwrap_or_default(),
            enabled: config.email_enabled,
        }
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: String::new(),
            enabled: false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub fn send(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: Option<&str>,
    ) -> DispatchOutcome {
        if !self.enabled {
            return DispatchOutcome::simulated("email sending is disabled");
        }
        let Some(transport) = &self.transport else {
            return DispatchOutcome::simulated("email credentials not configured");
        };

        let to_mailbox: Mailbox = match to.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => return DispatchOutcome::failed(format!("invalid recipient address: {err}")),
        };
        let from_mailbox: Mailbox = match self.from.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => return DispatchOutcome::failed(format!("invalid sender address: {err}")),
        };

        let message_id = format!("<{}@insuretrack>", Utc::now().timestamp_micros());
        let builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .message_id(Some(message_id.clone()));

        let message = match html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            )),
            None => builder.body(text.to_string()),
        };
        let message = match message {
            Ok(message) => message,
            Err(err) => return DispatchOutcome::failed(format!("error building email: {err}")),
        };

        match transport.send(&message) {
            Ok(_) => DispatchOutcome {
                success: true,
                simulated: false,
                message: "Email sent successfully".to_string(),
                message_id: Some(message_id),
                response: Some("accepted by SMTP server".to_string()),
                error: None,
            },
            Err(err) => {
                error!("failed to send email to {to}: {err}");
                DispatchOutcome::failed(err.to_string())
            }
        }
    }
}
