//! Outbound notification seam.
//!
//! The gateway emits events after a successful mutation; delivering them to
//! the counterparty's sessions is an external concern behind the sink trait.
use crate::status::InvoiceStatus;
use crate::types::PublicId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceEvent {
    /// A new invoice targets a recipient. `recipient` is absent for manual
    /// counterparties, which have no sessions to push to.
    Issued {
        invoice_number: String,
        recipient: Option<PublicId>,
    },
    StatusChanged {
        invoice_number: String,
        from: InvoiceStatus,
        to: InvoiceStatus,
    },
}

pub trait NotificationSink: Send + Sync {
    fn deliver(&self, event: &InvoiceEvent);
}

/// Default sink, reports through the tracing subscriber.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, event: &InvoiceEvent) {
        match event {
            InvoiceEvent::Issued {
                invoice_number,
                recipient,
            } => {
                tracing::info!(invoice = %invoice_number, recipient = ?recipient, "issued event");
            }
            InvoiceEvent::StatusChanged {
                invoice_number,
                from,
                to,
            } => {
                tracing::info!(invoice = %invoice_number, %from, %to, "status event");
            }
        }
    }
}
