//! Outbound mail transport seam.
//!
//! The crate never talks to a mail server itself. A [`MailTransport`]
//! implementation (SMTP client, provider HTTP API, test double) receives a
//! fully validated [`OutboundMessage`] and reports a receipt or an error.
//! Timeouts and cancellation belong to the transport.

use super::recipients::RecipientList;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// File attached to an outbound message.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Message handed to the transport. Recipients are already validated.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub from_email: String,
    pub from_name: String,
    pub to: RecipientList,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Proof of acceptance by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

/// Failure reported by a transport.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Could not reach the mail service
    #[error("connection error: {0}")]
    Connection(String),

    /// The mail service refused the message
    #[error("message rejected ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    /// The transport gave up waiting
    #[error("delivery timed out")]
    Timeout,

    /// Anything else
    #[error("delivery failed: {0}")]
    Other(String),
}

/// Something that can deliver an [`OutboundMessage`].
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError>;
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for Arc<T> {
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
        (**self).deliver(message).await
    }
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for Box<T> {
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
        (**self).deliver(message).await
    }
}
