use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::id::{BookingId, MemberId, WaitlistEntryId};
use crate::waitlist::WaitlistEntry;

/// Successful result of a booking request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booked {
    pub booking: Booking,
}

/// Successful result of a cancellation, carrying whether the freed slot
/// was handed to a waiting member (for UI messaging).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancelled {
    pub booking_id: BookingId,
    pub promotion: Option<Promotion>,
}

/// A waitlist entry converted into an active booking after a slot freed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub entry_id: WaitlistEntryId,
    pub member_id: MemberId,
    pub booking_id: BookingId,
}

/// Successful result of joining a waitlist.
///
/// `position` is the 1-based rank among currently waiting entries, not
/// the raw `priority_order` (which keeps gaps from removed entries).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waitlisted {
    pub entry: WaitlistEntry,
    pub position: u32,
}

/// Successful result of leaving a waitlist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removed {
    pub entry_id: WaitlistEntryId,
}
