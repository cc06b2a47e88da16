//! Capacity and structural checks.
//!
//! The capacity ceiling is the core correctness property of the whole
//! ledger: at no point may active bookings exceed `max_capacity`. Rows
//! referencing a foreign class are reported here too, since a polluted
//! snapshot would make the count meaningless.

use crate::error::LedgerViolation;
use crate::ledger::ClassLedger;
use crate::queries;

pub(crate) fn check(ledger: &ClassLedger, violations: &mut Vec<LedgerViolation>) {
    for booking in &ledger.bookings {
        if booking.class_id != ledger.class.id {
            violations.push(LedgerViolation::ForeignBookingRow {
                booking_id: booking.id,
                expected: ledger.class.id,
                found: booking.class_id,
            });
        }
    }
    for entry in &ledger.entries {
        if entry.class_id != ledger.class.id {
            violations.push(LedgerViolation::ForeignWaitlistRow {
                entry_id: entry.id,
                expected: ledger.class.id,
                found: entry.class_id,
            });
        }
    }

    let active = queries::active_booking_count(&ledger.bookings);
    if active > ledger.class.max_capacity {
        violations.push(LedgerViolation::Overbooked {
            class_id: ledger.class.id,
            active,
            max_capacity: ledger.class.max_capacity,
        });
    }
}
