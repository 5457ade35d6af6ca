//! Core invoice details, line items, and the draft builder
use rust_decimal::Decimal;

use crate::error::{InvoiceError, ValidationError};
use crate::types::{Contact, Counterparty, Money, PublicId};

/// One ordered line on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct LineItem {
    #[n(0)]
    inventory_id: String,
    #[n(1)]
    quantity: u32,
    #[n(2)]
    rate: Money,
    #[n(3)]
    discount_pct: u8,
}

impl LineItem {
    pub fn new(inventory_id: impl Into<String>, quantity: u32, rate: Money, discount_pct: u8) -> Self {
        Self {
            inventory_id: inventory_id.into(),
            quantity,
            rate,
            discount_pct,
        }
    }

    pub fn inventory_id(&self) -> &str {
        &self.inventory_id
    }
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
    pub fn rate(&self) -> Money {
        self.rate
    }
    pub fn discount_pct(&self) -> u8 {
        self.discount_pct
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        if self.rate.is_negative() {
            return Err(ValidationError::NegativeRate);
        }
        if self.discount_pct > 100 {
            return Err(ValidationError::DiscountOutOfRange(self.discount_pct));
        }
        Ok(())
    }

    /// qty x rate x (1 - discount/100), rounded to two decimal places.
    pub fn line_total(&self) -> Money {
        let gross = self.rate.amount() * Decimal::from(self.quantity);
        let keep = Decimal::from(100u32.saturating_sub(u32::from(self.discount_pct)))
            / Decimal::ONE_HUNDRED;

        Money::new((gross * keep).round_dp(2))
    }
}

/// Sum of the line totals. The stored total is always recomputed from the
/// current items, never taken from the caller.
pub fn total_amount(items: &[LineItem]) -> Money {
    items.iter().map(LineItem::line_total).sum()
}

/// Serialize an item set to its canonical CBOR form and content address.
/// The hash is the storage key of the immutable snapshot.
pub fn snapshot_items(items: &[LineItem]) -> Result<(String, Vec<u8>), InvoiceError> {
    let cbor = minicbor::to_vec(items)?;
    let hash = sha256::digest(&cbor);

    Ok((hash, cbor))
}

/// Draft invoice under construction. Fields are collected loosely and only
/// checked by [`InvoiceDetails::validate_and_finalise`].
#[derive(Debug, Default, Clone)]
pub struct InvoiceDetails {
    items: Vec<LineItem>,
    bill_to_public_id: Option<PublicId>,
    bill_to_name: Option<String>,
    bill_to_email: Option<String>,
    bill_to_phone: Option<String>,
    bill_to_address: Option<String>,
}

/// Outcome of finalising a draft: the resolved counterparty, the validated
/// items with their recomputed total, and the snapshot ready to persist.
#[derive(Debug, Clone)]
pub struct FinalisedInvoice {
    pub counterparty: Counterparty,
    pub items: Vec<LineItem>,
    pub total: Money,
    pub details_hash: String,
    pub details_cbor: Vec<u8>,
}

impl InvoiceDetails {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }
    pub fn bill_to_party(mut self, public_id: PublicId) -> Self {
        self.bill_to_public_id = Some(public_id);
        self
    }
    pub fn bill_to_name(mut self, name: &str) -> Self {
        self.bill_to_name = Some(name.to_string());
        self
    }
    pub fn bill_to_email(mut self, email: &str) -> Self {
        self.bill_to_email = Some(email.to_string());
        self
    }
    pub fn bill_to_phone(mut self, phone: &str) -> Self {
        self.bill_to_phone = Some(phone.to_string());
        self
    }
    pub fn bill_to_address(mut self, address: &str) -> Self {
        self.bill_to_address = Some(address.to_string());
        self
    }

    /// Resolve the counterparty fields into exactly one of the two forms.
    pub fn counterparty(&self) -> Result<Counterparty, ValidationError> {
        let has_contact = self.bill_to_name.is_some()
            || self.bill_to_email.is_some()
            || self.bill_to_phone.is_some()
            || self.bill_to_address.is_some();

        match (&self.bill_to_public_id, has_contact) {
            (Some(_), true) => Err(ValidationError::AmbiguousCounterparty),
            (Some(public_id), false) => Ok(Counterparty::System {
                public_id: public_id.clone(),
            }),
            (None, true) => {
                if self.bill_to_email.is_none() && self.bill_to_phone.is_none() {
                    return Err(ValidationError::UnreachableContact);
                }
                Ok(Counterparty::Manual {
                    contact: Contact {
                        name: self.bill_to_name.clone().unwrap_or_default(),
                        email: self.bill_to_email.clone(),
                        phone: self.bill_to_phone.clone(),
                        address: self.bill_to_address.clone(),
                    },
                })
            }
            (None, false) => Err(ValidationError::MissingCounterparty),
        }
    }

    /// Checks every field, then returns the resolved counterparty together
    /// with the canonical snapshot of the items and their total.
    pub fn validate_and_finalise(&self) -> Result<FinalisedInvoice, InvoiceError> {
        if self.items.is_empty() {
            return Err(ValidationError::NoItems.into());
        }
        for item in &self.items {
            item.validate()?;
        }
        let counterparty = self.counterparty()?;
        let total = total_amount(&self.items);
        let (details_hash, details_cbor) = snapshot_items(&self.items)?;

        Ok(FinalisedInvoice {
            counterparty,
            items: self.items.clone(),
            total,
            details_hash,
            details_cbor,
        })
    }
}
