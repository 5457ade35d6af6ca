use crate::party::ActorRole;
use crate::status::InvoiceStatus;

/// Rejections raised while checking invoice input at the boundary.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("an invoice needs at least one line item")]
    NoItems,
    #[error("line item quantity must be at least one")]
    ZeroQuantity,
    #[error("line item rate may not be negative")]
    NegativeRate,
    #[error("discount percentage must be between 0 and 100, got {0}")]
    DiscountOutOfRange(u8),
    #[error("a registered counterparty and a manual contact are mutually exclusive")]
    AmbiguousCounterparty,
    #[error("invoice has no counterparty")]
    MissingCounterparty,
    #[error("a manual contact needs an email or phone number")]
    UnreachableContact,
    #[error("unknown invoice status '{0}'")]
    UnknownStatus(String),
}

/// Rejections raised by the status state machine.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("no transition from {from} to {to} exists")]
    Undefined {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },
    #[error("{from} is a terminal status")]
    Terminal { from: InvoiceStatus },
    #[error("only the {required} may move an invoice from {from} to {to}")]
    WrongRole {
        from: InvoiceStatus,
        to: InvoiceStatus,
        required: ActorRole,
    },
    #[error("edits are locked once an invoice is {status}")]
    Locked { status: InvoiceStatus },
    #[error("a {status} invoice cannot be deleted")]
    NotDeletable { status: InvoiceStatus },
    #[error("only the issuer may edit or delete an invoice")]
    IssuerOnly,
}

/// Top-level error surface of the mutation gateway. Every kind is reported
/// distinctly so callers can render a precise message.
#[derive(thiserror::Error, Debug)]
pub enum InvoiceError {
    #[error("invoice {0} not found")]
    NotFound(String),
    #[error("party {actor} is neither issuer nor recipient of invoice {invoice}")]
    Unauthorized { actor: String, invoice: String },
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invoice {0} changed concurrently, reload and retry")]
    Conflict(String),
    #[error("line item snapshot {0} is missing from the store")]
    MissingSnapshot(String),
    #[error("storage failure")]
    Storage(#[from] sled::Error),
    #[error("stored record could not be decoded")]
    Decode(#[from] minicbor::decode::Error),
    #[error("record could not be encoded")]
    Encode(#[from] minicbor::encode::Error<std::convert::Infallible>),
}
