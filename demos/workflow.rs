//! End-to-end walk through the invoice lifecycle against a local sled db.
use std::sync::Arc;

use invoice_flow::invoice::{InvoiceDetails, LineItem};
use invoice_flow::party::Actor;
use invoice_flow::service::InvoiceService;
use invoice_flow::status::InvoiceStatus;
use invoice_flow::types::PublicId;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let db = sled::open("invoice-flow-demo")?;

    if !db.is_empty() {
        db.clear()?;
    }

    let service = InvoiceService::new(Arc::new(db));

    let issuer = Actor::new(PublicId::generate("user")?);
    let recipient = Actor::new(PublicId::generate("user")?);

    let details = InvoiceDetails::new()
        .add_item(LineItem::new("itm_widget", 2, "10.00".parse()?, 10))
        .add_item(LineItem::new("itm_gadget", 5, "3.20".parse()?, 0))
        .bill_to_party(recipient.public_id().clone());

    let record = service.create_invoice(details, &issuer)?;
    println!(
        "created {} for {} ({})",
        record.invoice_number(),
        record.total_amount(),
        record.status()
    );

    let record = service.update_status(record.invoice_number(), &recipient, InvoiceStatus::Approved)?;
    println!("recipient approved, now {}", record.status());

    let number = record.invoice_number().to_string();
    let record = service.update_status(&number, &issuer, InvoiceStatus::Paid)?;
    println!("issuer settled, now {}", record.status());

    println!("\naudit trail:");
    for entry in record.audit_log() {
        println!(
            "  {} {:?} by {}",
            entry.at.to_datetime_utc().to_rfc3339(),
            entry.action,
            entry.actor
        );
    }

    Ok(())
}
