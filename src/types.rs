//! Shared value types and their CBOR encodings
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::utils;

/// Stable, externally visible identifier for a registered party. Distinct
/// from any internal record id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode)]
#[cbor(transparent)]
pub struct PublicId(#[n(0)] String);

impl PublicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    /// Mint a fresh id under the given human-readable prefix.
    pub fn generate(hrp: &str) -> anyhow::Result<Self> {
        Ok(Self(utils::new_uuid_to_bech32(hrp)?))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form contact details for a counterparty that is not a system user.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Contact {
    #[n(0)]
    pub name: String,
    #[n(1)]
    pub email: Option<String>,
    #[n(2)]
    pub phone: Option<String>,
    #[n(3)]
    pub address: Option<String>,
}

/// The billed side of an invoice. A registered party and a manual contact
/// are mutually exclusive for a given invoice.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum Counterparty {
    #[n(0)]
    System {
        #[n(0)]
        public_id: PublicId,
    },
    #[n(1)]
    Manual {
        #[n(0)]
        contact: Contact,
    },
}

impl Counterparty {
    /// The public id when the counterparty is a registered party. A manual
    /// contact has no actor behind it.
    pub fn public_id(&self) -> Option<&PublicId> {
        match self {
            Counterparty::System { public_id } => Some(public_id),
            Counterparty::Manual { .. } => None,
        }
    }
}

/// Exact decimal amount. Encoded as a string so the stored form keeps
/// whatever scale the arithmetic produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
    pub fn amount(&self) -> Decimal {
        self.0
    }
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Decimal::from_str(s)?))
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money(iter.map(|m| m.0).sum())
    }
}

impl<C> minicbor::Encode<C> for Money {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.str(&self.0.to_string())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Money {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let s = d.str()?;

        Decimal::from_str(s)
            .map(Money)
            .map_err(|_| minicbor::decode::Error::message("failed to parse decimal amount"))
    }
}

#[derive(Debug, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl<T: TimeZone> PartialEq for TimeStamp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: TimeZone> Eq for TimeStamp<T> {}

impl<T: TimeZone> PartialOrd for TimeStamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TimeZone> Ord for TimeStamp<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}
