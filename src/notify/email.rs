// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{MailTransport, OutgoingMail};
use crate::config::MailSettings;

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailSender {
    pub fn from_settings(s: &MailSettings) -> Result<Self> {
        let builder = if s.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&s.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&s.host)
        }
        .with_context(|| format!("invalid EMAIL_HOST {}", s.host))?
        .port(s.port);

        let builder = match (&s.user, &s.password) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.clone(), pass.clone()))
            }
            _ => builder,
        };

        let from: Mailbox = s
            .from
            .parse()
            .with_context(|| format!("invalid EMAIL_FROM {}", s.from))?;

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

#[async_trait::async_trait]
impl MailTransport for EmailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let to: Mailbox = mail
            .to
            .parse()
            .with_context(|| format!("invalid recipient {}", mail.to))?;

        let msg = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.clone())
            .header(header::ContentType::TEXT_HTML)
            .body(mail.html_body.clone())
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}
