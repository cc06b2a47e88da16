//! Waitlist ordering checks.
//!
//! Priority orders are assigned strictly increasing from 1 and never
//! reused, which is what makes promotion tie-break deterministic. The
//! uniqueness check spans ALL entries regardless of status — a removed
//! entry keeps its number forever.

use std::collections::HashMap;

use classbook_types::WaitlistEntryId;

use crate::error::LedgerViolation;
use crate::ledger::ClassLedger;

pub(crate) fn check(ledger: &ClassLedger, violations: &mut Vec<LedgerViolation>) {
    let mut seen: HashMap<u32, WaitlistEntryId> = HashMap::new();
    for entry in &ledger.entries {
        if entry.priority_order == 0 {
            violations.push(LedgerViolation::ZeroPriorityOrder { entry_id: entry.id });
        }
        if let Some(first) = seen.get(&entry.priority_order) {
            violations.push(LedgerViolation::DuplicatePriorityOrder {
                priority_order: entry.priority_order,
                first: *first,
                second: entry.id,
            });
        } else {
            seen.insert(entry.priority_order, entry.id);
        }
    }
}
