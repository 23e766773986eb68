//! Send operation: validate, then hand off to the transport.
//!
//! # Failure Semantics
//!
//! [`Mailer::send`] never returns an error. Every failure is folded into a
//! [`SendResult`] with `success: false`:
//!
//! - Recipient rejected: the transport is never called
//! - Subject with CR/LF: the transport is never called
//! - Transport error: caught, logged at `warn`, reported as failure
//!
//! Nothing is retried. The raw recipient field is never logged.

use super::recipients::{
    contains_line_break, is_valid_address, RecipientSpec, RejectReason, ValidationVerdict,
};
use super::transport::{Attachment, MailTransport, OutboundMessage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sender identity used for every message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MailerConfig {
    pub from_email: String,
    pub from_name: String,
}

/// Invalid mailer configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MailerError {
    #[error("sender address is not a valid mailbox")]
    InvalidFromEmail,
    #[error("sender name contains a line break")]
    InvalidFromName,
}

/// One send call.
#[derive(Debug)]
pub struct SendRequest {
    pub to: RecipientSpec,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl SendRequest {
    pub fn new(
        to: impl Into<RecipientSpec>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_text(mut self, text_body: impl Into<String>) -> Self {
        self.text_body = Some(text_body.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Why a send did not go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SendFailure {
    InvalidRecipients(RejectReason),
    HeaderInjection(&'static str),
    Delivery,
}

/// Outcome of a send call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<SendFailure>,
}

impl SendResult {
    fn delivered(message_id: String) -> Self {
        Self {
            success: true,
            message_id: Some(message_id),
            failure: None,
        }
    }

    fn failed(failure: SendFailure) -> Self {
        Self {
            success: false,
            message_id: None,
            failure: Some(failure),
        }
    }
}

/// Mail sender guarding a transport.
pub struct Mailer<T> {
    config: MailerConfig,
    transport: T,
}

impl<T: MailTransport> Mailer<T> {
    /// Build a mailer. The sender identity is checked once here.
    pub fn new(config: MailerConfig, transport: T) -> Result<Self, MailerError> {
        if contains_line_break(&config.from_email) || !is_valid_address(&config.from_email) {
            return Err(MailerError::InvalidFromEmail);
        }
        if contains_line_break(&config.from_name) {
            return Err(MailerError::InvalidFromName);
        }
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate and send one message.
    pub async fn send(&self, request: SendRequest) -> SendResult {
        let SendRequest {
            to,
            subject,
            html_body,
            text_body,
            attachments,
        } = request;

        let recipients = match to.validate() {
            ValidationVerdict::Accepted(list) => list,
            ValidationVerdict::Rejected(reason) => {
                tracing::debug!(reason = %reason, input_len = to.len(), "send rejected");
                return SendResult::failed(SendFailure::InvalidRecipients(reason));
            }
        };
        drop(to);

        if contains_line_break(&subject) {
            tracing::debug!(field = "subject", "send rejected: line break in header field");
            return SendResult::failed(SendFailure::HeaderInjection("subject"));
        }

        let message = OutboundMessage {
            from_email: self.config.from_email.clone(),
            from_name: self.config.from_name.clone(),
            to: recipients,
            subject,
            html_body,
            text_body,
            attachments,
        };

        match self.transport.deliver(&message).await {
            Ok(receipt) => {
                tracing::info!(
                    message_id = %receipt.message_id,
                    recipients = message.to.len(),
                    "mail delivered"
                );
                SendResult::delivered(receipt.message_id)
            }
            Err(err) => {
                tracing::warn!(error = %err, recipients = message.to.len(), "mail delivery failed");
                SendResult::failed(SendFailure::Delivery)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::transport::{DeliveryError, DeliveryReceipt};

    #[test]
    fn config_rejects_invalid_sender() {
        struct Never;
        #[async_trait::async_trait]
        impl MailTransport for Never {
            async fn deliver(&self, _message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
                unreachable!("not called in this test")
            }
        }

        let bad_email = MailerConfig {
            from_email: "noreply@x.com\r\nBcc: a@x.com".into(),
            from_name: "App".into(),
        };
        assert_eq!(Mailer::new(bad_email, Never).err(), Some(MailerError::InvalidFromEmail));

        let bad_name = MailerConfig {
            from_email: "noreply@x.com".into(),
            from_name: "App\nBcc: a@x.com".into(),
        };
        assert_eq!(Mailer::new(bad_name, Never).err(), Some(MailerError::InvalidFromName));
    }

    #[test]
    fn send_result_wire_shape() {
        let ok = serde_json::to_value(SendResult::delivered("m-1".into())).unwrap();
        assert_eq!(ok, serde_json::json!({ "success": true, "messageId": "m-1" }));

        let failed = serde_json::to_value(SendResult::failed(SendFailure::InvalidRecipients(
            RejectReason::LineBreak,
        )))
        .unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["failure"]["kind"], "invalid_recipients");
        assert_eq!(failed["failure"]["detail"], "line_break");
    }

    #[test]
    fn config_deserializes() {
        let config: MailerConfig =
            serde_json::from_str(r#"{ "from_email": "noreply@x.com", "from_name": "App" }"#).unwrap();
        assert_eq!(config.from_name, "App");
    }
}
