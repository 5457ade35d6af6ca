//! Resolves which side of an invoice an authenticated actor stands on.
use std::fmt;

use crate::error::InvoiceError;
use crate::record::InvoiceRecord;
use crate::types::PublicId;

/// The two sides of an invoice that can act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Issuer,
    Recipient,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActorRole::Issuer => "issuer",
            ActorRole::Recipient => "recipient",
        })
    }
}

/// Authenticated acting party. Passed explicitly into every gateway call,
/// there is no ambient session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    public_id: PublicId,
}

impl Actor {
    pub fn new(public_id: PublicId) -> Self {
        Self { public_id }
    }
    pub fn public_id(&self) -> &PublicId {
        &self.public_id
    }
}

/// Classify `actor` against the invoice's stored parties. An actor matching
/// neither side fails closed. A manual counterparty has no public id, so
/// nobody ever resolves to recipient on such an invoice.
pub fn resolve_role(record: &InvoiceRecord, actor: &Actor) -> Result<ActorRole, InvoiceError> {
    if record.bill_from() == actor.public_id() {
        return Ok(ActorRole::Issuer);
    }
    match record.bill_to().public_id() {
        Some(id) if id == actor.public_id() => Ok(ActorRole::Recipient),
        _ => Err(InvoiceError::Unauthorized {
            actor: actor.public_id().to_string(),
            invoice: record.invoice_number().to_string(),
        }),
    }
}
