use chrono::{DateTime, Utc};
use classbook_types::{
    Booking, BookingId, ClassId, GymClass, MemberId, PolicyRejection, WaitlistEntry,
    WaitlistEntryId,
};

use crate::queries;

/// Precondition check for a booking request.
///
/// Check order is started, already-booked, capacity — the started gate is
/// a precondition on the class itself and wins over member-specific
/// rejections. A full class is reported as [`PolicyRejection::ClassFull`];
/// the caller is expected to offer the waitlist separately, never to
/// auto-enroll (two-step UX).
///
/// A waiting entry is deliberately not a bar: the member may book a free
/// slot directly, and the store resolves their entry in the same write
/// that creates the booking.
///
/// Passing this gate does not authorize the insert on its own: the store
/// re-validates capacity at write time, so a racing request that consumed
/// the last slot still loses there.
pub fn booking_gate(
    class: &GymClass,
    member_id: MemberId,
    existing: Option<&Booking>,
    active_count: u32,
    now: DateTime<Utc>,
) -> Result<(), PolicyRejection> {
    if class.has_started(now) {
        return Err(PolicyRejection::ClassAlreadyStarted {
            class_id: class.id,
            scheduled_at: class.scheduled_at,
        });
    }
    if existing.is_some() {
        return Err(PolicyRejection::AlreadyBooked {
            class_id: class.id,
            member_id,
        });
    }
    if active_count >= class.max_capacity {
        return Err(PolicyRejection::ClassFull {
            class_id: class.id,
            max_capacity: class.max_capacity,
        });
    }
    Ok(())
}

/// Precondition check for a cancellation. Returns the id of the booking
/// to cancel.
///
/// Cancellation is barred once the class has started, the same uniform
/// freeze applied to every other mutation of a started class.
pub fn cancel_gate(
    class: &GymClass,
    member_id: MemberId,
    active: Option<&Booking>,
    now: DateTime<Utc>,
) -> Result<BookingId, PolicyRejection> {
    if class.has_started(now) {
        return Err(PolicyRejection::ClassAlreadyStarted {
            class_id: class.id,
            scheduled_at: class.scheduled_at,
        });
    }
    match active {
        Some(booking) => Ok(booking.id),
        None => Err(PolicyRejection::NoActiveBooking {
            class_id: class.id,
            member_id,
        }),
    }
}

/// Precondition check for joining the waitlist.
///
/// Booking and waitlisting are mutually exclusive per member per class,
/// so an active booking rejects before an existing waiting entry does.
/// Capacity is deliberately NOT checked — joining is always allowed once
/// the member lacks a booking, even if a slot just freed by race; the
/// promotion pass reconciles that.
pub fn join_gate(
    class: &GymClass,
    member_id: MemberId,
    active: Option<&Booking>,
    waiting: Option<&WaitlistEntry>,
    now: DateTime<Utc>,
) -> Result<(), PolicyRejection> {
    if class.has_started(now) {
        return Err(PolicyRejection::ClassAlreadyStarted {
            class_id: class.id,
            scheduled_at: class.scheduled_at,
        });
    }
    if active.is_some() {
        return Err(PolicyRejection::AlreadyBooked {
            class_id: class.id,
            member_id,
        });
    }
    if waiting.is_some() {
        return Err(PolicyRejection::AlreadyWaitlisted {
            class_id: class.id,
            member_id,
        });
    }
    Ok(())
}

/// Precondition check for leaving the waitlist. Returns the id of the
/// entry to remove.
///
/// No started-class check: leaving only shrinks the queue and cannot
/// violate capacity, so it stays permitted after the class starts.
pub fn leave_gate(
    class_id: ClassId,
    member_id: MemberId,
    waiting: Option<&WaitlistEntry>,
) -> Result<WaitlistEntryId, PolicyRejection> {
    match waiting {
        Some(entry) => Ok(entry.id),
        None => Err(PolicyRejection::NotWaitlisted {
            class_id,
            member_id,
        }),
    }
}

/// Select the waitlist entry to promote after a cancellation, if any.
///
/// Re-checks capacity first: if a concurrent booking already consumed the
/// freed slot, no promotion is possible. Otherwise picks the waiting
/// entry with the minimum `priority_order`. Ties cannot occur because
/// priority assignment is strictly increasing per class.
///
/// Exactly one candidate per cancellation event — this never loops to
/// fill multiple slots; each cancellation independently triggers its own
/// single-candidate pass.
pub fn promotion_candidate<'a>(
    class: &GymClass,
    active_count: u32,
    entries: &'a [WaitlistEntry],
) -> Option<&'a WaitlistEntry> {
    if active_count >= class.max_capacity {
        return None;
    }
    queries::first_waiting(entries)
}
