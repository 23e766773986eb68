//! Outbound mail: recipient guarding and the send operation.
//!
//! Only pre-send validation lives here. Delivery is delegated to a
//! [`MailTransport`] implementation supplied by the caller.

pub mod mailer;
pub mod recipients;
pub mod transport;

pub use mailer::*;
pub use recipients::*;
pub use transport::*;
