//! Ledger invariant checking.
//!
//! [`validate_ledger`] runs a full scan over a [`ClassLedger`] snapshot
//! and collects every violation rather than short-circuiting, so a
//! corrupt store can be diagnosed in a single pass.
//!
//! Checks are grouped into three sub-modules:
//! - [`capacity`]: active count vs. `max_capacity`, and rows that belong
//!   to a different class.
//! - [`uniqueness`]: at most one active booking and one waiting entry per
//!   member, and the booked/waiting mutual exclusivity.
//! - [`ordering`]: priority orders are positive and unique per class.
//!
//! Each sub-module exposes a single
//! `check(&ClassLedger, &mut Vec<LedgerViolation>)` function and is
//! read-only over the snapshot.

mod capacity;
mod ordering;
mod uniqueness;

use crate::error::LedgerViolation;
use crate::ledger::ClassLedger;

/// Validate a class ledger snapshot, returning all detected violations.
///
/// An empty result means every testable ledger property holds for this
/// snapshot: the capacity ceiling, per-member uniqueness, mutual
/// exclusivity, and deterministic waitlist ordering.
pub fn validate_ledger(ledger: &ClassLedger) -> Vec<LedgerViolation> {
    let mut violations = Vec::new();
    capacity::check(ledger, &mut violations);
    uniqueness::check(ledger, &mut violations);
    ordering::check(ledger, &mut violations);
    violations
}
