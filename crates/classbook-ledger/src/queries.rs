use classbook_types::{Booking, GymClass, MemberId, WaitlistEntry};

/// Number of active bookings — the sole capacity gate input.
///
/// Must be recomputed from fresh rows at every booking decision, never
/// cached across requests.
/// Scan complexity: O(n).
pub fn active_booking_count(bookings: &[Booking]) -> u32 {
    bookings.iter().filter(|b| b.is_active()).count() as u32
}

/// Returns the member's active booking, if one exists.
///
/// Scan complexity: O(n).
pub fn active_booking_for(bookings: &[Booking], member_id: MemberId) -> Option<&Booking> {
    bookings
        .iter()
        .find(|b| b.member_id == member_id && b.is_active())
}

/// Returns the member's waiting entry, if one exists.
///
/// Scan complexity: O(n).
pub fn waiting_entry_for(entries: &[WaitlistEntry], member_id: MemberId) -> Option<&WaitlistEntry> {
    entries
        .iter()
        .find(|e| e.member_id == member_id && e.is_waiting())
}

/// Whether the class has room for another active booking.
///
/// Scan complexity: O(n).
pub fn has_free_slot(class: &GymClass, bookings: &[Booking]) -> bool {
    active_booking_count(bookings) < class.max_capacity
}

/// Priority order for the next entry joining the waitlist.
///
/// Computed as the maximum over ALL entries plus one (1 for an empty
/// list), regardless of status — a removed or promoted entry never frees
/// its number, which keeps assignment strictly increasing in join order.
/// Scan complexity: O(n).
pub fn next_priority_order(entries: &[WaitlistEntry]) -> u32 {
    entries
        .iter()
        .map(|e| e.priority_order)
        .max()
        .map_or(1, |max| max + 1)
}

/// 1-based queue rank of the waiting entry with the given priority order.
///
/// Counts waiting entries at or below `priority_order`, so gaps left by
/// removed entries do not inflate the rank.
/// Scan complexity: O(n).
pub fn waiting_position(entries: &[WaitlistEntry], priority_order: u32) -> u32 {
    entries
        .iter()
        .filter(|e| e.is_waiting() && e.priority_order <= priority_order)
        .count() as u32
}

/// Waiting entries sorted by ascending priority order.
///
/// Priority orders are unique within a class, so the result is total and
/// deterministic.
pub fn waiting_in_priority_order(entries: &[WaitlistEntry]) -> Vec<&WaitlistEntry> {
    let mut waiting: Vec<&WaitlistEntry> = entries.iter().filter(|e| e.is_waiting()).collect();
    waiting.sort_by_key(|e| e.priority_order);
    waiting
}

/// The highest-priority (minimum `priority_order`) waiting entry, if any.
///
/// Scan complexity: O(n).
pub fn first_waiting(entries: &[WaitlistEntry]) -> Option<&WaitlistEntry> {
    entries
        .iter()
        .filter(|e| e.is_waiting())
        .min_by_key(|e| e.priority_order)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use classbook_types::{BookingStatus, ClassId, WaitlistStatus};

    use super::*;

    fn class(max_capacity: u32) -> GymClass {
        GymClass::new(
            ClassId::random(),
            max_capacity,
            Utc::now() + Duration::hours(1),
        )
        .unwrap()
    }

    fn booking(class: &GymClass, status: BookingStatus) -> Booking {
        let mut booking = Booking::new(class.id, MemberId::random());
        booking.status = status;
        booking
    }

    fn entry(class: &GymClass, priority_order: u32, status: WaitlistStatus) -> WaitlistEntry {
        let mut entry = WaitlistEntry::new(class.id, MemberId::random(), priority_order);
        entry.status = status;
        entry
    }

    #[test]
    fn active_count_ignores_cancelled_rows() {
        let class = class(5);
        let bookings = vec![
            booking(&class, BookingStatus::Booked),
            booking(&class, BookingStatus::Cancelled),
            booking(&class, BookingStatus::Booked),
        ];

        assert_eq!(active_booking_count(&bookings), 2);
        assert!(has_free_slot(&class, &bookings));
    }

    #[test]
    fn active_booking_for_skips_the_members_cancelled_rows() {
        let class = class(5);
        let member_id = MemberId::random();
        let mut cancelled = Booking::new(class.id, member_id);
        cancelled.status = BookingStatus::Cancelled;
        let active = Booking::new(class.id, member_id);
        let bookings = vec![cancelled, active.clone()];

        assert_eq!(active_booking_for(&bookings, member_id), Some(&active));
        assert!(active_booking_for(&bookings, MemberId::random()).is_none());
    }

    #[test]
    fn next_priority_order_never_reuses_a_removed_entrys_number() {
        let class = class(2);
        assert_eq!(next_priority_order(&[]), 1);

        let entries = vec![
            entry(&class, 1, WaitlistStatus::Promoted),
            entry(&class, 2, WaitlistStatus::Removed),
            entry(&class, 3, WaitlistStatus::Waiting),
        ];
        assert_eq!(next_priority_order(&entries), 4);

        // The maximum entry being removed still blocks its number.
        let entries = vec![
            entry(&class, 1, WaitlistStatus::Waiting),
            entry(&class, 7, WaitlistStatus::Removed),
        ];
        assert_eq!(next_priority_order(&entries), 8);
    }

    #[test]
    fn waiting_position_collapses_gaps() {
        let class = class(2);
        let entries = vec![
            entry(&class, 1, WaitlistStatus::Promoted),
            entry(&class, 2, WaitlistStatus::Waiting),
            entry(&class, 3, WaitlistStatus::Removed),
            entry(&class, 4, WaitlistStatus::Waiting),
        ];

        assert_eq!(waiting_position(&entries, 2), 1);
        assert_eq!(waiting_position(&entries, 4), 2);
    }

    #[test]
    fn first_waiting_picks_the_minimum_priority_order() {
        let class = class(2);
        let entries = vec![
            entry(&class, 3, WaitlistStatus::Waiting),
            entry(&class, 1, WaitlistStatus::Promoted),
            entry(&class, 2, WaitlistStatus::Waiting),
        ];

        assert_eq!(first_waiting(&entries).map(|e| e.priority_order), Some(2));

        let ordered = waiting_in_priority_order(&entries);
        let priorities: Vec<u32> = ordered.iter().map(|e| e.priority_order).collect();
        similar_asserts::assert_eq!(priorities, vec![2, 3]);
    }
}
