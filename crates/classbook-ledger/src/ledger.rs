use classbook_types::{Booking, GymClass, WaitlistEntry};

/// An owned snapshot of one class's booking and waitlist rows.
///
/// Assembled from the persistence store at a point in time, for invariant
/// validation and diagnostics. The coordinator's operational path does
/// NOT work from a snapshot — it re-reads fresh counts per decision and
/// relies on the store's conditional writes, because a snapshot held
/// across requests is exactly the stale-read double-booking hazard.
///
/// Rows referencing a different class are not rejected at construction;
/// [`crate::validate_ledger`] reports them as violations instead, so a
/// corrupt snapshot can be diagnosed rather than refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassLedger {
    pub class: GymClass,
    pub bookings: Vec<Booking>,
    pub entries: Vec<WaitlistEntry>,
}

impl ClassLedger {
    pub fn new(class: GymClass, bookings: Vec<Booking>, entries: Vec<WaitlistEntry>) -> Self {
        Self {
            class,
            bookings,
            entries,
        }
    }
}
