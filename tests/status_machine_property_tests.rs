//! Property-based tests for the invoice status state machine
//!
//! This module uses proptest to verify that the transition rules hold across
//! every combination of statuses and roles, not just the handful a manual
//! test would pick. The table is small, but bugs here corrupt the entire
//! invoice workflow.

use proptest::prelude::*;

use invoice_flow::error::TransitionError;
use invoice_flow::party::ActorRole;
use invoice_flow::status::InvoiceStatus;

/// Strategy to generate any status
fn status_strategy() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Pending),
        Just(InvoiceStatus::Approved),
        Just(InvoiceStatus::Declined),
        Just(InvoiceStatus::Paid),
    ]
}

/// Strategy to generate either role
fn role_strategy() -> impl Strategy<Value = ActorRole> {
    prop::bool::ANY.prop_map(|b| {
        if b {
            ActorRole::Issuer
        } else {
            ActorRole::Recipient
        }
    })
}

proptest! {
    /// Property: a transition succeeds exactly when its (from, to, role)
    /// triple is one of the four table rows. Everything else is rejected.
    #[test]
    fn prop_only_table_rows_succeed(
        from in status_strategy(),
        to in status_strategy(),
        role in role_strategy()
    ) {
        use InvoiceStatus::*;

        let in_table = matches!(
            (from, to, role),
            (Pending, Approved, ActorRole::Recipient)
                | (Pending, Declined, ActorRole::Recipient)
                | (Approved, Declined, ActorRole::Recipient)
                | (Approved, Paid, ActorRole::Issuer)
        );

        prop_assert_eq!(
            InvoiceStatus::check_transition(from, to, role).is_ok(),
            in_table,
            "from={} to={} role={}",
            from, to, role
        );
    }

    /// Property: terminal statuses have no outgoing transitions for any
    /// target and any role, and the rejection names the terminal status.
    #[test]
    fn prop_terminal_statuses_have_no_exits(
        to in status_strategy(),
        role in role_strategy()
    ) {
        for from in [InvoiceStatus::Declined, InvoiceStatus::Paid] {
            prop_assert_eq!(
                InvoiceStatus::check_transition(from, to, role),
                Err(TransitionError::Terminal { from })
            );
        }
    }

    /// Property: the wrong role is told which role is required, it is never
    /// silently allowed through.
    #[test]
    fn prop_wrong_role_is_named(
        from in status_strategy(),
        to in status_strategy(),
        role in role_strategy()
    ) {
        if let Some(required) = InvoiceStatus::required_role(from, to) {
            if required != role && !from.is_terminal() {
                prop_assert_eq!(
                    InvoiceStatus::check_transition(from, to, role),
                    Err(TransitionError::WrongRole { from, to, required })
                );
            }
        }
    }

    /// Property: the canonical spelling round-trips through the parser, in
    /// any casing.
    #[test]
    fn prop_canonical_spelling_roundtrips(status in status_strategy()) {
        prop_assert_eq!(status.as_str().parse::<InvoiceStatus>().unwrap(), status);
        prop_assert_eq!(
            status.as_str().to_uppercase().parse::<InvoiceStatus>().unwrap(),
            status
        );
    }

    /// Property: checking a transition never mutates anything - repeated
    /// checks agree.
    #[test]
    fn prop_check_is_idempotent(
        from in status_strategy(),
        to in status_strategy(),
        role in role_strategy()
    ) {
        let first = InvoiceStatus::check_transition(from, to, role);
        let second = InvoiceStatus::check_transition(from, to, role);

        prop_assert_eq!(first, second);
    }
}
