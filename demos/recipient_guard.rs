use async_trait::async_trait;
use gql_error_shield::mail::{
    DeliveryError, DeliveryReceipt, MailTransport, Mailer, MailerConfig, OutboundMessage,
    SendRequest, validate_recipients,
};
use std::sync::atomic::{AtomicU64, Ordering};

/// Prints what would go on the wire instead of sending it.
#[derive(Default)]
struct ConsoleTransport {
    next_id: AtomicU64,
}

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        println!("   From: \"{}\" <{}>", message.from_name, message.from_email);
        for mailbox in &message.to {
            println!("   To:   {mailbox}");
        }
        println!("   Subject: {}", message.subject);
        Ok(DeliveryReceipt {
            message_id: format!("console-{id}"),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("--- Recipient Guard Example ---\n");

    println!("1. [PARSE] a header-style address list:");
    for input in [
        "\"User One\" <a@x.com>, b@x.com",
        "user@x.com\r\nBCC: evil@example.com",
        "not-an-address",
    ] {
        let verdict = validate_recipients(input);
        match verdict.into_result() {
            Ok(list) => println!("   {input:?} -> {} recipient(s)", list.len()),
            Err(reason) => println!("   {input:?} -> rejected ({reason})"),
        }
    }

    let config = MailerConfig {
        from_email: "noreply@example.com".into(),
        from_name: "Example App".into(),
    };
    let mailer = match Mailer::new(config, ConsoleTransport::default()) {
        Ok(mailer) => mailer,
        Err(err) => {
            eprintln!("bad sender configuration: {err}");
            return;
        }
    };

    println!("\n2. [SEND] clean request:");
    let result = mailer
        .send(SendRequest::new("\"User One\" <a@x.com>, b@x.com", "Welcome", "<p>hi</p>"))
        .await;
    println!("   -> {result:?}");

    println!("\n3. [SEND] injected request never reaches the transport:");
    let result = mailer
        .send(SendRequest::new("user@x.com\r\nBCC: evil@example.com", "Welcome", "<p>hi</p>"))
        .await;
    println!("   -> {result:?}");
}
