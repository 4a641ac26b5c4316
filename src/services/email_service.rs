//! Outgoing email: the provider seam, its error taxonomy and the two
//! business messages built on top of it.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::{AppConfig, SmtpConfig};
use crate::errors::AppError;
use crate::services::email_templates::{contact_email, otp_email, ContactSubmission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailErrorKind {
    SenderRejected,
    AccessDenied,
    Unknown,
}

impl EmailErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailErrorKind::SenderRejected => "SenderRejected",
            EmailErrorKind::AccessDenied => "AccessDenied",
            EmailErrorKind::Unknown => "Unknown",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            EmailErrorKind::SenderRejected => {
                "Email rejected by the provider. Please verify the sender address."
            }
            EmailErrorKind::AccessDenied => "Email provider denied access. Check the credentials.",
            EmailErrorKind::Unknown => "Failed to send email. Please try again later.",
        }
    }
}

#[derive(Debug, Error)]
#[error("email delivery failed ({}): {detail}", .kind.as_str())]
pub struct EmailDeliveryError {
    pub kind: EmailErrorKind,
    pub detail: String,
}

impl EmailDeliveryError {
    pub fn new(kind: EmailErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Maps an SMTP reply code to the provider error kind.
pub fn classify_smtp_code(code: &str) -> EmailErrorKind {
    match code {
        "530" | "534" | "535" | "538" => EmailErrorKind::AccessDenied,
        "550" | "551" | "552" | "553" | "554" | "556" => EmailErrorKind::SenderRejected,
        _ => EmailErrorKind::Unknown,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailDeliveryError>;
}

/// SMTP relay sender (Amazon SES SMTP interface or any STARTTLS relay).
pub struct SmtpEmailSender {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    pub fn new(config: &SmtpConfig, from: &str) -> Result<Self, EmailDeliveryError> {
        let from: Mailbox = from.parse().map_err(|e| {
            EmailDeliveryError::new(EmailErrorKind::SenderRejected, format!("invalid sender: {}", e))
        })?;

        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| EmailDeliveryError::new(EmailErrorKind::Unknown, e.to_string()))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { from, transport })
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<Message, EmailDeliveryError> {
        let to: Mailbox = email.to.parse().map_err(|e| {
            EmailDeliveryError::new(EmailErrorKind::Unknown, format!("invalid recipient: {}", e))
        })?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject);
        if let Some(reply_to) = email.reply_to {
            let reply_to: Mailbox = reply_to.parse().map_err(|e| {
                EmailDeliveryError::new(EmailErrorKind::Unknown, format!("invalid reply-to: {}", e))
            })?;
            builder = builder.reply_to(reply_to);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(|e| EmailDeliveryError::new(EmailErrorKind::Unknown, e.to_string()))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailDeliveryError> {
        let message = self.build_message(email)?;

        match self.transport.send(message).await {
            Ok(response) => {
                tracing::info!(code = %response.code(), "email accepted by relay");
                Ok(())
            }
            Err(e) => {
                let kind = e
                    .status()
                    .map(|code| classify_smtp_code(&code.to_string()))
                    .unwrap_or(EmailErrorKind::Unknown);
                tracing::error!(error = %e, kind = kind.as_str(), "SMTP delivery failed");
                Err(EmailDeliveryError::new(kind, e.to_string()))
            }
        }
    }
}

/// Development sender used when no relay is configured.
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailDeliveryError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "[MOCK EMAIL] not delivered, SMTP is not configured"
        );
        // bodies carry OTP codes
        tracing::debug!(to = %email.to, body = %email.text, "[MOCK EMAIL] body");
        Ok(())
    }
}

/// Picks the provider. A configured SMTP block that cannot be built is a startup error.
pub fn sender_from_config(config: &AppConfig) -> crate::errors::Result<Arc<dyn EmailSender>> {
    match &config.smtp {
        Some(smtp) => {
            let sender = SmtpEmailSender::new(smtp, &config.email_from).map_err(|e| {
                AppError::configuration(format!("SMTP sender could not be built: {}", e))
            })?;
            tracing::info!(host = %smtp.host, "SMTP email sender initialized");
            Ok(Arc::new(sender))
        }
        None => {
            tracing::info!("email not configured, using mock email sender");
            Ok(Arc::new(LogEmailSender))
        }
    }
}

/// Business-level mail operations.
#[derive(Clone)]
pub struct Mailer {
    sender: Arc<dyn EmailSender>,
    app_name: String,
    contact_recipient: String,
    otp_ttl_minutes: i64,
}

impl Mailer {
    pub fn new(sender: Arc<dyn EmailSender>, config: &AppConfig) -> Self {
        Self {
            sender,
            app_name: config.app_name.clone(),
            contact_recipient: config.contact_recipient.clone(),
            otp_ttl_minutes: config.otp_ttl_minutes,
        }
    }

    pub async fn send_otp(&self, to: &str, otp: &str) -> Result<(), EmailDeliveryError> {
        let content = otp_email(otp, &self.app_name, self.otp_ttl_minutes);
        self.sender
            .send(OutgoingEmail {
                to: to.to_string(),
                subject: content.subject,
                html: content.html,
                text: content.text,
                reply_to: None,
            })
            .await
    }

    pub async fn send_contact(&self, submission: &ContactSubmission) -> Result<(), EmailDeliveryError> {
        let content = contact_email(submission);
        self.sender
            .send(OutgoingEmail {
                to: self.contact_recipient.clone(),
                subject: content.subject,
                html: content.html,
                text: content.text,
                reply_to: Some(submission.email.clone()),
            })
            .await
    }
}
