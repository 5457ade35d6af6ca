//! Utility functions for id minting

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique party id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

// same, for prefixes known at compile time
pub(crate) fn tagged_id(hrp: &'static str) -> String {
    let hrp = bech32::Hrp::parse_unchecked(hrp);
    bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
        .expect("a 16 byte payload fits the bech32 length limit")
}
