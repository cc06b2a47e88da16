//! Per-member uniqueness checks.
//!
//! At most one active booking and at most one waiting entry per member,
//! and never both at once (mutual exclusivity). Cancelled bookings and
//! terminal waitlist entries are invisible to these checks — the audit
//! trail is expected to accumulate them.

use std::collections::HashMap;

use classbook_types::{BookingId, MemberId, WaitlistEntryId};

use crate::error::LedgerViolation;
use crate::ledger::ClassLedger;

pub(crate) fn check(ledger: &ClassLedger, violations: &mut Vec<LedgerViolation>) {
    let mut active_by_member: HashMap<MemberId, BookingId> = HashMap::new();
    for booking in ledger.bookings.iter().filter(|b| b.is_active()) {
        if let Some(first) = active_by_member.get(&booking.member_id) {
            violations.push(LedgerViolation::DuplicateActiveBooking {
                member_id: booking.member_id,
                first: *first,
                second: booking.id,
            });
        } else {
            active_by_member.insert(booking.member_id, booking.id);
        }
    }

    let mut waiting_by_member: HashMap<MemberId, WaitlistEntryId> = HashMap::new();
    for entry in ledger.entries.iter().filter(|e| e.is_waiting()) {
        if let Some(first) = waiting_by_member.get(&entry.member_id) {
            violations.push(LedgerViolation::DuplicateWaitingEntry {
                member_id: entry.member_id,
                first: *first,
                second: entry.id,
            });
        } else {
            waiting_by_member.insert(entry.member_id, entry.id);
        }

        if let Some(booking_id) = active_by_member.get(&entry.member_id) {
            violations.push(LedgerViolation::BookedAndWaiting {
                member_id: entry.member_id,
                booking_id: *booking_id,
                entry_id: entry.id,
            });
        }
    }
}
