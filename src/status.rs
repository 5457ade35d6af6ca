//! The closed set of invoice statuses and the legal transitions between them.
use std::fmt;
use std::str::FromStr;

use crate::error::{TransitionError, ValidationError};
use crate::party::ActorRole;

/// Lifecycle status of an invoice. `Pending` is the only initial status;
/// `Declined` and `Paid` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode)]
pub enum InvoiceStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Approved,
    #[n(2)]
    Declined,
    #[n(3)]
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Declined => "declined",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Declined | InvoiceStatus::Paid)
    }

    /// The transition table. Returns the role that may perform the move, or
    /// `None` when no such transition exists.
    pub fn required_role(from: InvoiceStatus, to: InvoiceStatus) -> Option<ActorRole> {
        use InvoiceStatus::*;

        match (from, to) {
            (Pending, Approved) => Some(ActorRole::Recipient),
            (Pending, Declined) => Some(ActorRole::Recipient),
            (Approved, Declined) => Some(ActorRole::Recipient),
            (Approved, Paid) => Some(ActorRole::Issuer),
            _ => None,
        }
    }

    /// Check one transition for one actor. Anything outside the table is
    /// rejected, never coerced.
    pub fn check_transition(
        from: InvoiceStatus,
        to: InvoiceStatus,
        role: ActorRole,
    ) -> Result<(), TransitionError> {
        if from.is_terminal() {
            return Err(TransitionError::Terminal { from });
        }
        match Self::required_role(from, to) {
            None => Err(TransitionError::Undefined { from, to }),
            Some(required) if required != role => {
                Err(TransitionError::WrongRole { from, to, required })
            }
            Some(_) => Ok(()),
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ValidationError;

    /// Case-insensitive, canonical lowercase. "clear" and "disapproved" are
    /// deprecated spellings from the legacy system, accepted as aliases of
    /// approved and declined.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(InvoiceStatus::Pending),
            "approved" | "clear" => Ok(InvoiceStatus::Approved),
            "declined" | "disapproved" => Ok(InvoiceStatus::Declined),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}
