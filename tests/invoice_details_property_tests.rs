//! Property-based tests for line item arithmetic and draft validation
//!
//! This module uses the proptest crate to verify that totals and validation
//! behave correctly across a wide range of randomly generated inputs.
//! Property tests are particularly valuable for the money arithmetic, where
//! hand-picked cases miss rounding edges.

use proptest::prelude::*;
use rust_decimal::Decimal;

use invoice_flow::invoice::{snapshot_items, total_amount, InvoiceDetails, LineItem};
use invoice_flow::types::{Money, PublicId};

// PROPERTY TEST STRATEGIES

/// Strategy to generate a non-negative rate with two decimal places
fn rate_strategy() -> impl Strategy<Value = Money> {
    (0i64..=10_000_000).prop_map(|cents| Money::new(Decimal::new(cents, 2)))
}

/// Strategy to generate a positive quantity
fn quantity_strategy() -> impl Strategy<Value = u32> {
    1u32..=1_000
}

/// Strategy to generate a legal discount percentage
fn discount_strategy() -> impl Strategy<Value = u8> {
    0u8..=100
}

/// Strategy to generate a valid line item
fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    (any::<u32>(), quantity_strategy(), rate_strategy(), discount_strategy()).prop_map(
        |(sku, qty, rate, discount)| LineItem::new(format!("itm_{}", sku), qty, rate, discount),
    )
}

/// Strategy to generate a non-empty item list
fn items_strategy() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item_strategy(), 1..=8)
}

// PROPERTY TESTS
proptest! {
    /// Property: every valid line item passes validation
    #[test]
    fn prop_valid_items_validate(item in line_item_strategy()) {
        prop_assert!(item.validate().is_ok());
    }

    /// Property: a line total never exceeds the undiscounted gross and never
    /// goes negative
    #[test]
    fn prop_line_total_is_bounded(item in line_item_strategy()) {
        let gross = Money::new(item.rate().amount() * Decimal::from(item.quantity()));

        prop_assert!(item.line_total() <= gross);
        prop_assert!(!item.line_total().is_negative());
    }

    /// Property: with no discount the line total is exactly qty x rate
    #[test]
    fn prop_zero_discount_is_exact(qty in quantity_strategy(), rate in rate_strategy()) {
        let item = LineItem::new("itm_widget", qty, rate, 0);
        let expected = Money::new((rate.amount() * Decimal::from(qty)).round_dp(2));

        prop_assert_eq!(item.line_total(), expected);
    }

    /// Property: a full discount always zeroes the line
    #[test]
    fn prop_full_discount_zeroes(qty in quantity_strategy(), rate in rate_strategy()) {
        let item = LineItem::new("itm_widget", qty, rate, 100);

        prop_assert_eq!(item.line_total(), Money::ZERO);
    }

    /// Property: the invoice total is always the sum of the line totals,
    /// recomputed from scratch
    #[test]
    fn prop_total_is_sum_of_lines(items in items_strategy()) {
        let expected: Money = items.iter().map(LineItem::line_total).sum();

        prop_assert_eq!(total_amount(&items), expected);
        prop_assert!(!total_amount(&items).is_negative());
    }

    /// Property: snapshot encoding is deterministic - the same items always
    /// produce the same content address
    #[test]
    fn prop_snapshot_hash_is_deterministic(items in items_strategy()) {
        let (hash1, cbor1) = snapshot_items(&items).unwrap();
        let (hash2, cbor2) = snapshot_items(&items).unwrap();

        prop_assert_eq!(&hash1, &hash2, "hashes should match");
        prop_assert_eq!(&cbor1, &cbor2, "encodings should match");
        prop_assert_eq!(hash1.len(), 64, "SHA256 hash should be 64 hex characters");
    }

    /// Property: changing any quantity changes the content address
    #[test]
    fn prop_changed_items_change_the_hash(items in items_strategy()) {
        let (hash1, _) = snapshot_items(&items).unwrap();

        let mut changed = items.clone();
        let bumped = LineItem::new(
            changed[0].inventory_id().to_string(),
            changed[0].quantity() + 1,
            changed[0].rate(),
            changed[0].discount_pct(),
        );
        changed[0] = bumped;

        let (hash2, _) = snapshot_items(&changed).unwrap();
        prop_assert_ne!(hash1, hash2);
    }

    /// Property: a complete draft with valid items and a registered
    /// counterparty always finalises, and the finalised total matches the
    /// recomputed one
    #[test]
    fn prop_complete_draft_finalises(items in items_strategy()) {
        let mut details = InvoiceDetails::new().bill_to_party(PublicId::new("user_1example"));
        for item in &items {
            details = details.add_item(item.clone());
        }

        let finalised = details.validate_and_finalise();
        prop_assert!(finalised.is_ok(), "complete draft should finalise: {:?}", finalised.err());

        let finalised = finalised.unwrap();
        prop_assert_eq!(finalised.total, total_amount(&items));
        prop_assert!(!finalised.details_cbor.is_empty());
    }

    /// Property: setting both counterparty forms is always rejected, no
    /// matter what the items look like
    #[test]
    fn prop_ambiguous_counterparty_always_rejected(items in items_strategy()) {
        let mut details = InvoiceDetails::new()
            .bill_to_party(PublicId::new("user_1example"))
            .bill_to_email("accounts@offline.example");
        for item in &items {
            details = details.add_item(item.clone());
        }

        prop_assert!(details.validate_and_finalise().is_err());
    }
}
