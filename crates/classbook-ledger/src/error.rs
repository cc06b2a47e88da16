use classbook_types::{BookingId, ClassId, MemberId, WaitlistEntryId};
use serde::{Deserialize, Serialize};

/// Describes a specific booking-ledger invariant violation.
///
/// Grouped by check module: capacity/structure, per-member uniqueness,
/// waitlist ordering. A healthy ledger produces none of these under any
/// sequence of coordinator operations; their presence means the store was
/// mutated outside the coordinator or a conditional write was bypassed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerViolation {
    /// Active bookings exceed the class capacity.
    Overbooked {
        class_id: ClassId,
        active: u32,
        max_capacity: u32,
    },
    /// A booking row references a different class than the ledger's.
    ForeignBookingRow {
        booking_id: BookingId,
        expected: ClassId,
        found: ClassId,
    },
    /// A waitlist row references a different class than the ledger's.
    ForeignWaitlistRow {
        entry_id: WaitlistEntryId,
        expected: ClassId,
        found: ClassId,
    },

    /// More than one active booking for the same member.
    DuplicateActiveBooking {
        member_id: MemberId,
        first: BookingId,
        second: BookingId,
    },
    /// More than one waiting entry for the same member.
    DuplicateWaitingEntry {
        member_id: MemberId,
        first: WaitlistEntryId,
        second: WaitlistEntryId,
    },
    /// A member simultaneously holds an active booking and a waiting
    /// entry for the same class.
    BookedAndWaiting {
        member_id: MemberId,
        booking_id: BookingId,
        entry_id: WaitlistEntryId,
    },

    /// Priority orders start at 1; zero means the assignment rule was
    /// bypassed.
    ZeroPriorityOrder { entry_id: WaitlistEntryId },
    /// Two entries share a priority order, breaking deterministic
    /// promotion tie-breaking.
    DuplicatePriorityOrder {
        priority_order: u32,
        first: WaitlistEntryId,
        second: WaitlistEntryId,
    },
}

impl std::fmt::Display for LedgerViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbooked {
                class_id,
                active,
                max_capacity,
            } => write!(
                f,
                "class {class_id} has {active} active bookings over capacity {max_capacity}"
            ),
            Self::ForeignBookingRow {
                booking_id,
                expected,
                found,
            } => write!(
                f,
                "booking {booking_id} belongs to class {found}, expected {expected}"
            ),
            Self::ForeignWaitlistRow {
                entry_id,
                expected,
                found,
            } => write!(
                f,
                "waitlist entry {entry_id} belongs to class {found}, expected {expected}"
            ),
            Self::DuplicateActiveBooking {
                member_id,
                first,
                second,
            } => write!(
                f,
                "member {member_id} holds active bookings {first} and {second}"
            ),
            Self::DuplicateWaitingEntry {
                member_id,
                first,
                second,
            } => write!(
                f,
                "member {member_id} holds waiting entries {first} and {second}"
            ),
            Self::BookedAndWaiting {
                member_id,
                booking_id,
                entry_id,
            } => write!(
                f,
                "member {member_id} is booked ({booking_id}) while waiting ({entry_id})"
            ),
            Self::ZeroPriorityOrder { entry_id } => {
                write!(f, "waitlist entry {entry_id} has priority order 0")
            }
            Self::DuplicatePriorityOrder {
                priority_order,
                first,
                second,
            } => write!(
                f,
                "entries {first} and {second} share priority order {priority_order}"
            ),
        }
    }
}
