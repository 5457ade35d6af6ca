//! Stored invoice record, its audit trail, and sled persistence.
use chrono::Utc;
use sled::Db;

use crate::error::InvoiceError;
use crate::invoice::LineItem;
use crate::status::InvoiceStatus;
use crate::types::{Counterparty, Money, PublicId, TimeStamp};

/// One lifecycle action taken against an invoice, who took it and when.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct AuditEntry {
    #[n(0)]
    pub actor: PublicId,
    #[n(1)]
    pub at: TimeStamp<Utc>,
    #[n(2)]
    pub action: AuditAction,
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum AuditAction {
    #[n(0)]
    Created {
        #[n(0)]
        details_hash: String,
    },
    #[n(1)]
    ItemsRevised {
        #[n(0)]
        details_hash: String,
    },
    #[n(2)]
    StatusChanged {
        #[n(0)]
        from: InvoiceStatus,
        #[n(1)]
        to: InvoiceStatus,
    },
    #[n(3)]
    CounterpartyChanged,
}

/// The mutable record of an invoice. Line items live in immutable
/// content-addressed snapshots; the record points at the current one.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct InvoiceRecord {
    #[n(0)]
    id: String,
    #[n(1)]
    invoice_number: String,
    #[n(2)]
    bill_from: PublicId,
    #[n(3)]
    bill_to: Counterparty,
    #[n(4)]
    details_hash: String,
    #[n(5)]
    total_amount: Money,
    #[n(6)]
    status: InvoiceStatus,
    #[n(7)]
    created_at: TimeStamp<Utc>,
    #[n(8)]
    updated_at: TimeStamp<Utc>,
    #[n(9)]
    audit_log: Vec<AuditEntry>,
}

impl InvoiceRecord {
    pub(crate) fn new(
        id: String,
        invoice_number: String,
        bill_from: PublicId,
        bill_to: Counterparty,
        details_hash: String,
        total_amount: Money,
    ) -> Self {
        let now = TimeStamp::new();
        let created = AuditEntry {
            actor: bill_from.clone(),
            at: now.clone(),
            action: AuditAction::Created {
                details_hash: details_hash.clone(),
            },
        };

        Self {
            id,
            invoice_number,
            bill_from,
            bill_to,
            details_hash,
            total_amount,
            status: InvoiceStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
            audit_log: vec![created],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }
    pub fn bill_from(&self) -> &PublicId {
        &self.bill_from
    }
    pub fn bill_to(&self) -> &Counterparty {
        &self.bill_to
    }
    pub fn details_hash(&self) -> &str {
        &self.details_hash
    }
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }
    pub fn status(&self) -> InvoiceStatus {
        self.status
    }
    pub fn created_at(&self) -> &TimeStamp<Utc> {
        &self.created_at
    }
    pub fn updated_at(&self) -> &TimeStamp<Utc> {
        &self.updated_at
    }
    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    fn touch(&mut self, actor: &PublicId, action: AuditAction) {
        let now = TimeStamp::new();
        self.audit_log.push(AuditEntry {
            actor: actor.clone(),
            at: now.clone(),
            action,
        });
        self.updated_at = now;
    }

    /// Apply a transition already cleared by the state machine.
    pub(crate) fn apply_status(&mut self, to: InvoiceStatus, actor: &PublicId) {
        let from = self.status;
        self.status = to;
        self.touch(actor, AuditAction::StatusChanged { from, to });
    }

    /// Point the record at a new item snapshot and its recomputed total.
    pub(crate) fn apply_items(&mut self, details_hash: String, total: Money, actor: &PublicId) {
        self.details_hash = details_hash.clone();
        self.total_amount = total;
        self.touch(actor, AuditAction::ItemsRevised { details_hash });
    }

    pub(crate) fn apply_counterparty(&mut self, bill_to: Counterparty, actor: &PublicId) {
        self.bill_to = bill_to;
        self.touch(actor, AuditAction::CounterpartyChanged);
    }

    pub fn encode(&self) -> Result<Vec<u8>, InvoiceError> {
        Ok(minicbor::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, InvoiceError> {
        Ok(minicbor::decode(bytes)?)
    }

    /// Load a record along with the exact bytes it was decoded from. The
    /// bytes are the precondition for any later conditional save.
    pub fn load(db: &Db, invoice_number: &str) -> Result<(Self, Vec<u8>), InvoiceError> {
        let bytes = db
            .get(invoice_number.as_bytes())?
            .ok_or_else(|| InvoiceError::NotFound(invoice_number.to_string()))?;
        let record = Self::decode(&bytes)?;

        Ok((record, bytes.to_vec()))
    }

    /// Persist against the exact bytes previously read (or against absence,
    /// for a fresh record). A lost race surfaces as a conflict, never as a
    /// silent overwrite.
    pub fn cas_save(&self, db: &Db, expected: Option<&[u8]>) -> Result<(), InvoiceError> {
        let encoded = self.encode()?;

        match db.compare_and_swap(self.invoice_number.as_bytes(), expected, Some(encoded))? {
            Ok(()) => Ok(()),
            Err(_) => Err(InvoiceError::Conflict(self.invoice_number.clone())),
        }
    }
}

/// Fetch the line items behind a content address.
pub fn load_items(db: &Db, details_hash: &str) -> Result<Vec<LineItem>, InvoiceError> {
    let bytes = db
        .get(details_hash.as_bytes())?
        .ok_or_else(|| InvoiceError::MissingSnapshot(details_hash.to_string()))?;

    Ok(minicbor::decode(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record() -> InvoiceRecord {
        InvoiceRecord::new(
            "inv1example".to_string(),
            "INV-000001".to_string(),
            PublicId::new("user_1issuer"),
            Counterparty::System {
                public_id: PublicId::new("user_1recipient"),
            },
            "hash_abc".to_string(),
            Money::ZERO,
        )
    }

    #[test]
    fn new_record_is_pending_with_a_created_entry() {
        let record = test_record();

        assert_eq!(record.status(), InvoiceStatus::Pending);
        assert_eq!(record.audit_log().len(), 1);
        assert!(matches!(
            record.audit_log()[0].action,
            AuditAction::Created { .. }
        ));
    }

    #[test]
    fn apply_status_appends_to_the_audit_log() {
        let mut record = test_record();
        let actor = PublicId::new("user_1recipient");

        record.apply_status(InvoiceStatus::Approved, &actor);

        assert_eq!(record.status(), InvoiceStatus::Approved);
        assert_eq!(record.audit_log().len(), 2);
        assert_eq!(
            record.audit_log()[1].action,
            AuditAction::StatusChanged {
                from: InvoiceStatus::Pending,
                to: InvoiceStatus::Approved,
            }
        );
        assert!(record.updated_at() >= record.created_at());
    }

    #[test]
    fn record_encoding() {
        let original = test_record();

        let encoding = original.encode().unwrap();
        let decode = InvoiceRecord::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }
}
