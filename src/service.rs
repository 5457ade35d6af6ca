//! Service layer API for invoice workflow operations
use std::sync::Arc;

use crate::error::{InvoiceError, TransitionError, ValidationError};
use crate::invoice::{self, InvoiceDetails, LineItem};
use crate::notify::{InvoiceEvent, LogSink, NotificationSink};
use crate::party::{self, Actor, ActorRole};
use crate::record::{self, InvoiceRecord};
use crate::status::InvoiceStatus;
use crate::types::{Counterparty, Money};
use crate::utils;

/// Last known state of a deleted invoice, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedInvoice {
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub total_amount: Money,
}

/// Single choke point for every invoice mutation and query. All status
/// changes re-validate the state machine against freshly read state, and
/// every write is a conditional update on the bytes that were read.
pub struct InvoiceService {
    instance: Arc<sled::Db>,
    sink: Arc<dyn NotificationSink>,
}

impl InvoiceService {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self {
            instance,
            sink: Arc::new(LogSink),
        }
    }

    /// Same service with a caller-provided sink for outbound events.
    pub fn with_sink(instance: Arc<sled::Db>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { instance, sink }
    }

    fn load_record(&self, invoice_number: &str) -> Result<(InvoiceRecord, Vec<u8>), InvoiceError> {
        InvoiceRecord::load(&self.instance, invoice_number)
    }

    /// Issue a new invoice. The acting party becomes the issuer, the status
    /// starts at pending, and the total is computed here, never taken from
    /// the caller.
    pub fn create_invoice(
        &self,
        details: InvoiceDetails,
        issuer: &Actor,
    ) -> Result<InvoiceRecord, InvoiceError> {
        let finalised = details.validate_and_finalise()?;

        let invoice_number = format!("INV-{:06}", self.instance.generate_id()?);
        let id = utils::tagged_id("inv");

        let record = InvoiceRecord::new(
            id,
            invoice_number.clone(),
            issuer.public_id().clone(),
            finalised.counterparty,
            finalised.details_hash.clone(),
            finalised.total,
        );

        // snapshot first: content-addressed, so a stray write is harmless
        self.instance
            .insert(finalised.details_hash.as_bytes(), finalised.details_cbor)?;
        record.cas_save(&self.instance, None)?;

        tracing::info!(invoice = %invoice_number, total = %record.total_amount(), "invoice created");
        self.sink.deliver(&InvoiceEvent::Issued {
            invoice_number,
            recipient: record.bill_to().public_id().cloned(),
        });

        Ok(record)
    }

    /// Replace the line items of a pending invoice. Writes a new snapshot
    /// and recomputes the total.
    pub fn update_items(
        &self,
        invoice_number: &str,
        actor: &Actor,
        items: Vec<LineItem>,
    ) -> Result<InvoiceRecord, InvoiceError> {
        let (mut record, prev) = self.load_record(invoice_number)?;

        if party::resolve_role(&record, actor)? != ActorRole::Issuer {
            return Err(TransitionError::IssuerOnly.into());
        }
        if record.status() != InvoiceStatus::Pending {
            return Err(TransitionError::Locked {
                status: record.status(),
            }
            .into());
        }
        if items.is_empty() {
            return Err(ValidationError::NoItems.into());
        }
        for item in &items {
            item.validate()?;
        }

        let (details_hash, details_cbor) = invoice::snapshot_items(&items)?;
        let total = invoice::total_amount(&items);
        record.apply_items(details_hash.clone(), total, actor.public_id());

        self.instance.insert(details_hash.as_bytes(), details_cbor)?;
        record.cas_save(&self.instance, Some(&prev))?;

        tracing::debug!(invoice = %invoice_number, total = %total, "line items revised");

        Ok(record)
    }

    /// Repoint a pending invoice at a different counterparty.
    pub fn update_counterparty(
        &self,
        invoice_number: &str,
        actor: &Actor,
        bill_to: Counterparty,
    ) -> Result<InvoiceRecord, InvoiceError> {
        let (mut record, prev) = self.load_record(invoice_number)?;

        if party::resolve_role(&record, actor)? != ActorRole::Issuer {
            return Err(TransitionError::IssuerOnly.into());
        }
        if record.status() != InvoiceStatus::Pending {
            return Err(TransitionError::Locked {
                status: record.status(),
            }
            .into());
        }

        record.apply_counterparty(bill_to, actor.public_id());
        record.cas_save(&self.instance, Some(&prev))?;

        Ok(record)
    }

    /// Move an invoice through the state machine. The actor's role is
    /// resolved against the stored parties and the transition checked
    /// against the table before anything is written.
    pub fn update_status(
        &self,
        invoice_number: &str,
        actor: &Actor,
        target: InvoiceStatus,
    ) -> Result<InvoiceRecord, InvoiceError> {
        let (mut record, prev) = self.load_record(invoice_number)?;

        let role = party::resolve_role(&record, actor)?;
        let from = record.status();
        InvoiceStatus::check_transition(from, target, role)?;

        record.apply_status(target, actor.public_id());
        record.cas_save(&self.instance, Some(&prev))?;

        tracing::info!(invoice = %invoice_number, %from, to = %target, %role, "status changed");
        self.sink.deliver(&InvoiceEvent::StatusChanged {
            invoice_number: invoice_number.to_string(),
            from,
            to: target,
        });

        Ok(record)
    }

    /// Remove a pending invoice. Declining a received invoice is a status
    /// transition, not a delete, so this is issuer-only; a declined invoice
    /// stays on record.
    pub fn delete_invoice(
        &self,
        invoice_number: &str,
        actor: &Actor,
    ) -> Result<DeletedInvoice, InvoiceError> {
        let (record, prev) = self.load_record(invoice_number)?;

        if party::resolve_role(&record, actor)? != ActorRole::Issuer {
            return Err(TransitionError::IssuerOnly.into());
        }
        if record.status() != InvoiceStatus::Pending {
            return Err(TransitionError::NotDeletable {
                status: record.status(),
            }
            .into());
        }

        match self.instance.compare_and_swap(
            invoice_number.as_bytes(),
            Some(prev.as_slice()),
            None::<&[u8]>,
        )? {
            Ok(()) => {}
            Err(_) => return Err(InvoiceError::Conflict(invoice_number.to_string())),
        }

        tracing::info!(invoice = %invoice_number, "invoice deleted");

        Ok(DeletedInvoice {
            invoice_number: record.invoice_number().to_string(),
            status: record.status(),
            total_amount: record.total_amount(),
        })
    }

    /// Fetch one invoice with its current line items.
    pub fn get_invoice(
        &self,
        invoice_number: &str,
    ) -> Result<(InvoiceRecord, Vec<LineItem>), InvoiceError> {
        let (record, _) = self.load_record(invoice_number)?;
        let items = record::load_items(&self.instance, record.details_hash())?;

        Ok((record, items))
    }

    /// Invoices the actor issued.
    pub fn list_issued(&self, actor: &Actor) -> Result<Vec<InvoiceRecord>, InvoiceError> {
        self.scan(|record| record.bill_from() == actor.public_id())
    }

    /// Invoices addressed to the actor as a registered recipient.
    pub fn list_received(&self, actor: &Actor) -> Result<Vec<InvoiceRecord>, InvoiceError> {
        self.scan(|record| record.bill_to().public_id() == Some(actor.public_id()))
    }

    fn scan(
        &self,
        keep: impl Fn(&InvoiceRecord) -> bool,
    ) -> Result<Vec<InvoiceRecord>, InvoiceError> {
        let mut records = Vec::new();

        // record keys carry the invoice number prefix; snapshots are keyed
        // by hash and never match
        for entry in self.instance.scan_prefix("INV-") {
            let (_, bytes) = entry?;
            let record = InvoiceRecord::decode(&bytes)?;
            if keep(&record) {
                records.push(record);
            }
        }

        Ok(records)
    }
}
