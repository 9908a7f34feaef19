//! Failure notification over SMTP.
//!
//! Best-effort: a run that already failed should never fail harder
//! because the mail server is down, so send errors are logged and
//! swallowed by the caller.

use crate::config::EmailConfig;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address \"{address}\": {reason}")]
    Address { address: String, reason: String },

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("message build error: {0}")]
    Build(#[from] lettre::error::Error),
}

/// Compose the error-report message.
fn compose(config: &EmailConfig, stage: &str, detail: &str) -> Result<Message, NotifyError> {
    let parse = |address: &str| -> Result<Mailbox, NotifyError> {
        address.parse().map_err(|e| NotifyError::Address {
            address: address.to_string(),
            reason: format!("{e}"),
        })
    };

    let body = format!(
        "The daily anniversary run failed.\n\n\
         Stage: {stage}\n\
         Error: {detail}\n\n\
         Check the scheduler logs for the full trace.\n"
    );

    Ok(Message::builder()
        .from(parse(&config.from)?)
        .to(parse(&config.to)?)
        .subject(format!("[anniversary-daily] run failed at stage: {stage}"))
        .body(body)?)
}

/// Send an error report, if email notifications are enabled.
#[instrument(level = "info", skip_all, fields(%stage))]
pub async fn send_error_report(
    config: &EmailConfig,
    stage: &str,
    detail: &str,
) -> Result<(), NotifyError> {
    let message = compose(config, stage, detail)?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
        .port(config.smtp_port)
        .credentials(Credentials::new(
            config.smtp_user.clone(),
            config.smtp_password.clone(),
        ))
        .build();

    transport.send(message).await?;
    info!(to = %config.to, "Sent error report");
    Ok(())
}
