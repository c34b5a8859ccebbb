use std::env;
use std::path::PathBuf;

/// Runtime configuration, read once at startup. Every knob is optional:
/// a missing mongo URI selects file-backed storage and missing SMTP
/// credentials select simulated sends.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mongo_uri: Option<String>,
    pub database_name: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub email_user: Option<String>,
    pub email_password: Option<String>,
    pub email_enabled: bool,
    pub reminder_days: i64,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT").unwrap_or(5000),
            mongo_uri: non_empty_var("MONGODB_URI"),
            database_name: non_empty_var("DATABASE_NAME")
                .unwrap_or_else(|| "insuretrack".to_string()),
            smtp_host: non_empty_var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            smtp_port: parse_var("SMTP_PORT").unwrap_or(587),
            email_user: non_empty_var("EMAIL_USER"),
            email_password: non_empty_var("EMAIL_PASSWORD"),
            email_enabled: env::var("ENABLE_EMAIL")
                .map(|v| v == "true")
                .unwrap_or(false),
            reminder_days: parse_var("REMINDER_DAYS").unwrap_or(7),
            data_dir: non_empty_var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            mongo_uri: None,
            database_name: "insuretrack".to_string(),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            email_user: None,
            email_password: None,
            email_enabled: false,
            reminder_days: 7,
            data_dir: PathBuf::from("data"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
