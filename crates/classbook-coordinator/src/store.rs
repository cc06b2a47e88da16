use async_trait::async_trait;
use classbook_types::{
    Booking, BookingId, BookingStatus, ClassId, GymClass, MemberId, WaitlistEntry, WaitlistEntryId,
    WaitlistStatus,
};

/// Durable storage contract for classes, bookings, and waitlist entries.
///
/// The coordinator's count-then-write sequences are classic check-then-act
/// patterns, so the two insert operations must be conditional writes:
/// implementations re-validate the condition at write time, inside
/// whatever transaction or lock makes the write atomic, and reject with
/// the matching conflict error when a racing writer got there first. The
/// coordinator treats its own pre-checks as advisory fast-paths only.
///
/// - [`insert_booking`](Self::insert_booking) re-checks both the capacity
///   ceiling and the one-active-booking-per-member rule, and resolves the
///   member's waiting entry (marks it `Removed`) in the same write — a
///   direct booking supersedes the queue spot, and booking while waiting
///   must never be observable.
/// - [`insert_waitlist_entry`](Self::insert_waitlist_entry) re-checks
///   that the proposed priority order is still past the class maximum,
///   that the member has no waiting entry, and that the member holds no
///   active booking (the other half of mutual exclusivity).
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Fetch a class record.
    async fn class(&self, class_id: ClassId) -> Result<GymClass, StoreError>;

    /// Count bookings with status `Booked` for the class. Always a fresh
    /// read; implementations must not serve a cached value.
    async fn count_active_bookings(&self, class_id: ClassId) -> Result<u32, StoreError>;

    /// The member's active booking for the class, if any.
    async fn find_active_booking(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Option<Booking>, StoreError>;

    /// Conditionally create an active booking.
    ///
    /// Fails with [`StoreError::SlotContended`] when the capacity
    /// re-check loses, or [`StoreError::DuplicateBooking`] when the
    /// member already holds an active booking. On success, any waiting
    /// entry for the member is marked `Removed` within the same atomic
    /// write; a promotion overwrites that to `Promoted` right after.
    async fn insert_booking(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Booking, StoreError>;

    /// Overwrite a booking's status.
    async fn update_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<(), StoreError>;

    /// The member's waiting entry for the class, if any.
    async fn find_waiting_entry(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Option<WaitlistEntry>, StoreError>;

    /// Conditionally create a waiting entry with the given priority order.
    ///
    /// Fails with [`StoreError::StalePriority`] when another join raced
    /// past the proposed order, [`StoreError::DuplicateWaiting`] when
    /// the member already has a waiting entry, or
    /// [`StoreError::DuplicateBooking`] when the member holds an active
    /// booking — booked members never enter the queue, even when the
    /// booking landed after the caller's pre-checks.
    async fn insert_waitlist_entry(
        &self,
        class_id: ClassId,
        member_id: MemberId,
        priority_order: u32,
    ) -> Result<WaitlistEntry, StoreError>;

    /// Overwrite a waitlist entry's status.
    async fn update_waitlist_status(
        &self,
        entry_id: WaitlistEntryId,
        status: WaitlistStatus,
    ) -> Result<(), StoreError>;

    /// Waiting entries for the class, ascending by priority order.
    async fn waiting_entries_by_priority(
        &self,
        class_id: ClassId,
    ) -> Result<Vec<WaitlistEntry>, StoreError>;

    /// Every waitlist entry for the class, any status. Used for priority
    /// assignment (removed entries never free their number) and audits.
    async fn waitlist_entries(&self, class_id: ClassId) -> Result<Vec<WaitlistEntry>, StoreError>;

    /// Every booking row for the class, any status. Used for audits.
    async fn bookings(&self, class_id: ClassId) -> Result<Vec<Booking>, StoreError>;
}

/// Failures surfaced by a [`BookingStore`].
///
/// The conflict variants (`SlotContended`, `DuplicateBooking`,
/// `DuplicateWaiting`, `StalePriority`) are the losing side of a
/// conditional write. Operations that can give them policy meaning map
/// them to a rejection at the call site; everywhere else they surface as
/// retryable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("class {0} not found")]
    ClassMissing(ClassId),
    #[error("booking {0} not found")]
    BookingMissing(BookingId),
    #[error("waitlist entry {0} not found")]
    EntryMissing(WaitlistEntryId),
    #[error("class {0} is at capacity, conditional insert rejected")]
    SlotContended(ClassId),
    #[error("member {member_id} already holds an active booking for class {class_id}")]
    DuplicateBooking {
        class_id: ClassId,
        member_id: MemberId,
    },
    #[error("member {member_id} already has a waiting entry for class {class_id}")]
    DuplicateWaiting {
        class_id: ClassId,
        member_id: MemberId,
    },
    #[error("priority order {priority_order} is not past the current maximum for class {class_id}")]
    StalePriority {
        class_id: ClassId,
        priority_order: u32,
    },
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}
