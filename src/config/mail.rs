// src/config/mail.rs
use anyhow::{anyhow, Context, Result};
use std::env;

/// SMTP settings for the digest mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise.
    pub secure: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: String,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(key: &str) -> Result<String> {
    non_empty(key).ok_or_else(|| anyhow!("{key} missing"))
}

impl MailSettings {
    /// Read `EMAIL_*` variables; errors name the first missing one.
    pub fn from_env() -> Result<Self> {
        let port = match non_empty("EMAIL_PORT") {
            Some(p) => p
                .parse::<u16>()
                .with_context(|| format!("invalid EMAIL_PORT {p:?}"))?,
            None => 587,
        };
        let secure = non_empty("EMAIL_SECURE")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            host: required("EMAIL_HOST")?,
            port,
            secure,
            user: non_empty("EMAIL_USER"),
            password: non_empty("EMAIL_PASSWORD"),
            from: required("EMAIL_FROM")?,
            to: required("EMAIL_TO")?,
        })
    }

    /// Like `from_env`, but `None` when no `EMAIL_HOST` is set at all.
    pub fn from_env_optional() -> Result<Option<Self>> {
        if non_empty("EMAIL_HOST").is_none() {
            return Ok(None);
        }
        Self::from_env().map(Some)
    }
}
