use chrono::Utc;
use classbook_ledger::{ClassLedger, LedgerViolation, gate, queries, validate_ledger};
use classbook_types::{
    Booked, BookingStatus, Cancelled, ClassId, GymClass, MemberId, PolicyRejection, Promotion,
    Removed, Waitlisted, WaitlistStatus,
};

use crate::error::CoordinatorError;
use crate::store::{BookingStore, StoreError};

/// Accepts member booking, cancellation, and waitlist requests for a
/// class and produces consistent, capacity-respecting outcomes.
///
/// The coordinator is the single source of truth for booking state:
/// presentation layers are read-only subscribers that re-query after
/// each mutating call. Every decision reads fresh counts through the
/// store — nothing is cached across requests — and the store's
/// conditional inserts settle any race the pre-checks could not see.
///
/// Requests for different classes are fully independent; requests for
/// the same class are serialized only at the store's conditional writes.
pub struct BookingCoordinator<S> {
    store: S,
}

impl<S: BookingStore> BookingCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Book the member into the class.
    ///
    /// A full class is a rejection, not an implicit waitlist enrollment —
    /// joining the waitlist is a separate, explicit member action. When
    /// the conditional insert loses the last-slot race the loser also
    /// receives [`PolicyRejection::ClassFull`].
    ///
    /// A member who is already waiting may book directly when a slot is
    /// free; the store resolves their waiting entry in the same write
    /// that creates the booking, so they never hold both.
    pub async fn request_booking(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Booked, CoordinatorError> {
        let class = self.store.class(class_id).await?;
        let existing = self.store.find_active_booking(class_id, member_id).await?;
        let active_count = self.store.count_active_bookings(class_id).await?;
        gate::booking_gate(&class, member_id, existing.as_ref(), active_count, Utc::now())?;

        match self.store.insert_booking(class_id, member_id).await {
            Ok(booking) => {
                tracing::debug!(%class_id, %member_id, booking_id = %booking.id, "booking accepted");
                Ok(Booked { booking })
            }
            Err(StoreError::SlotContended(_)) => Err(PolicyRejection::ClassFull {
                class_id,
                max_capacity: class.max_capacity,
            }
            .into()),
            Err(StoreError::DuplicateBooking { .. }) => Err(PolicyRejection::AlreadyBooked {
                class_id,
                member_id,
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Cancel the member's active booking, then run one promotion pass
    /// for the freed slot.
    pub async fn cancel_booking(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Cancelled, CoordinatorError> {
        let class = self.store.class(class_id).await?;
        let active = self.store.find_active_booking(class_id, member_id).await?;
        let booking_id = gate::cancel_gate(&class, member_id, active.as_ref(), Utc::now())?;

        self.store
            .update_booking_status(booking_id, BookingStatus::Cancelled)
            .await?;
        tracing::debug!(%class_id, %member_id, %booking_id, "booking cancelled");

        let promotion = self.promote_after_cancel(&class).await;
        Ok(Cancelled {
            booking_id,
            promotion,
        })
    }

    /// Join the class waitlist.
    ///
    /// Capacity is not consulted: once the member lacks a booking,
    /// joining is always allowed, even if a slot just freed by race —
    /// the next promotion pass reconciles that.
    pub async fn join_waitlist(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Waitlisted, CoordinatorError> {
        let class = self.store.class(class_id).await?;
        let active = self.store.find_active_booking(class_id, member_id).await?;
        let waiting = self.store.find_waiting_entry(class_id, member_id).await?;
        gate::join_gate(
            &class,
            member_id,
            active.as_ref(),
            waiting.as_ref(),
            Utc::now(),
        )?;

        let all_entries = self.store.waitlist_entries(class_id).await?;
        let priority_order = queries::next_priority_order(&all_entries);
        let entry = match self
            .store
            .insert_waitlist_entry(class_id, member_id, priority_order)
            .await
        {
            Ok(entry) => entry,
            Err(StoreError::DuplicateWaiting { .. }) => {
                return Err(PolicyRejection::AlreadyWaitlisted {
                    class_id,
                    member_id,
                }
                .into());
            }
            // A booking that landed after our pre-checks wins; the member
            // gets the same rejection the gate would have given.
            Err(StoreError::DuplicateBooking { .. }) => {
                return Err(PolicyRejection::AlreadyBooked {
                    class_id,
                    member_id,
                }
                .into());
            }
            // StalePriority means another join raced past us; retryable.
            Err(err) => return Err(err.into()),
        };

        let entries = self.store.waitlist_entries(class_id).await?;
        let position = queries::waiting_position(&entries, entry.priority_order);
        tracing::debug!(%class_id, %member_id, entry_id = %entry.id, position, "joined waitlist");
        Ok(Waitlisted { entry, position })
    }

    /// Remove the member's waiting entry. Permitted at any time, started
    /// class or not — leaving only shrinks the queue.
    pub async fn leave_waitlist(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Removed, CoordinatorError> {
        // Class lookup first so an unknown id reports as stale caller
        // state rather than NotWaitlisted.
        self.store.class(class_id).await?;
        let waiting = self.store.find_waiting_entry(class_id, member_id).await?;
        let entry_id = gate::leave_gate(class_id, member_id, waiting.as_ref())?;

        self.store
            .update_waitlist_status(entry_id, WaitlistStatus::Removed)
            .await?;
        tracing::debug!(%class_id, %member_id, %entry_id, "left waitlist");
        Ok(Removed { entry_id })
    }

    /// Snapshot the class through the store and check every ledger
    /// invariant. An empty result is a healthy class.
    pub async fn audit(&self, class_id: ClassId) -> Result<Vec<LedgerViolation>, CoordinatorError> {
        let class = self.store.class(class_id).await?;
        let bookings = self.store.bookings(class_id).await?;
        let entries = self.store.waitlist_entries(class_id).await?;
        Ok(validate_ledger(&ClassLedger::new(class, bookings, entries)))
    }

    /// Offer the freed slot to the highest-priority waiting member.
    /// Exactly one candidate per cancellation event.
    ///
    /// Losing a race (a concurrent booking consumed the slot, or the
    /// candidate booked themselves in) and transient store failures are
    /// absorbed: the entry stays waiting and is reconsidered on the next
    /// cancellation for the class. The cancellation itself still reports
    /// success either way.
    async fn promote_after_cancel(&self, class: &GymClass) -> Option<Promotion> {
        let active_count = match self.store.count_active_bookings(class.id).await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(class_id = %class.id, error = %err, "promotion skipped: count unavailable");
                return None;
            }
        };
        let waiting = match self.store.waiting_entries_by_priority(class.id).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(class_id = %class.id, error = %err, "promotion skipped: waitlist unavailable");
                return None;
            }
        };
        let candidate = gate::promotion_candidate(class, active_count, &waiting)?.clone();

        let booking = match self.store.insert_booking(class.id, candidate.member_id).await {
            Ok(booking) => booking,
            Err(err) => {
                tracing::warn!(
                    class_id = %class.id,
                    entry_id = %candidate.id,
                    error = %err,
                    "promotion abandoned, entry stays waiting"
                );
                return None;
            }
        };
        if let Err(err) = self
            .store
            .update_waitlist_status(candidate.id, WaitlistStatus::Promoted)
            .await
        {
            // The booking stands; the entry is left for the next audit to
            // flag rather than silently revoking the member's slot.
            tracing::warn!(
                entry_id = %candidate.id,
                booking_id = %booking.id,
                error = %err,
                "promoted booking created but entry not marked promoted"
            );
        }
        tracing::info!(
            class_id = %class.id,
            member_id = %candidate.member_id,
            entry_id = %candidate.id,
            booking_id = %booking.id,
            "waitlist entry promoted"
        );
        Some(Promotion {
            entry_id: candidate.id,
            member_id: candidate.member_id,
            booking_id: booking.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Duration;
    use classbook_types::{
        Booking, BookingId, GymClass, WaitlistEntry, WaitlistEntryId, WaitlistStatus,
    };

    use super::*;
    use crate::memory::MemoryStore;

    async fn coordinator_with_class(
        max_capacity: u32,
    ) -> (BookingCoordinator<MemoryStore>, ClassId) {
        let class = GymClass::new(
            ClassId::random(),
            max_capacity,
            Utc::now() + Duration::hours(1),
        )
        .unwrap();
        let class_id = class.id;
        let store = MemoryStore::new();
        store.add_class(class).await;
        (BookingCoordinator::new(store), class_id)
    }

    async fn coordinator_with_started_class(
        max_capacity: u32,
    ) -> (BookingCoordinator<MemoryStore>, ClassId) {
        let class = GymClass::new(
            ClassId::random(),
            max_capacity,
            Utc::now() - Duration::minutes(30),
        )
        .unwrap();
        let class_id = class.id;
        let store = MemoryStore::new();
        store.add_class(class).await;
        (BookingCoordinator::new(store), class_id)
    }

    fn rejection(err: CoordinatorError) -> PolicyRejection {
        match err {
            CoordinatorError::Rejected(rejection) => rejection,
            other => panic!("expected policy rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn booking_rebooking_and_full_class() {
        let (coordinator, class_id) = coordinator_with_class(1).await;
        let member_x = MemberId::random();
        let member_y = MemberId::random();

        let booked = coordinator.request_booking(class_id, member_x).await.unwrap();
        assert_eq!(booked.booking.member_id, member_x);

        let err = coordinator
            .request_booking(class_id, member_x)
            .await
            .unwrap_err();
        assert!(matches!(
            rejection(err),
            PolicyRejection::AlreadyBooked { .. }
        ));

        let err = coordinator
            .request_booking(class_id, member_y)
            .await
            .unwrap_err();
        let rejected = rejection(err);
        assert!(matches!(
            rejected,
            PolicyRejection::ClassFull { max_capacity: 1, .. }
        ));
        assert_eq!(
            rejected.user_message(),
            "This class is full, join the waitlist."
        );

        let waitlisted = coordinator.join_waitlist(class_id, member_y).await.unwrap();
        assert_eq!(waitlisted.position, 1);
        assert_eq!(waitlisted.entry.priority_order, 1);
    }

    #[tokio::test]
    async fn cancellation_promotes_the_first_waiting_member() {
        let (coordinator, class_id) = coordinator_with_class(2).await;
        let member_a = MemberId::random();
        let member_b = MemberId::random();
        let member_w = MemberId::random();

        coordinator.request_booking(class_id, member_a).await.unwrap();
        coordinator.request_booking(class_id, member_b).await.unwrap();
        coordinator.join_waitlist(class_id, member_w).await.unwrap();

        let cancelled = coordinator.cancel_booking(class_id, member_a).await.unwrap();
        let promotion = cancelled.promotion.expect("freed slot should promote");
        assert_eq!(promotion.member_id, member_w);

        // The promoted member now holds an active booking and the slot
        // count is back at capacity.
        let store = coordinator.store();
        assert_eq!(store.count_active_bookings(class_id).await.unwrap(), 2);
        assert!(
            store
                .find_active_booking(class_id, member_w)
                .await
                .unwrap()
                .is_some()
        );
        let entries = store.waitlist_entries(class_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, WaitlistStatus::Promoted);

        similar_asserts::assert_eq!(coordinator.audit(class_id).await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn cancellation_with_empty_waitlist_frees_the_slot() {
        let (coordinator, class_id) = coordinator_with_class(2).await;
        let member_a = MemberId::random();
        let member_b = MemberId::random();

        coordinator.request_booking(class_id, member_a).await.unwrap();
        coordinator.request_booking(class_id, member_b).await.unwrap();

        let cancelled = coordinator.cancel_booking(class_id, member_a).await.unwrap();
        assert!(cancelled.promotion.is_none());
        assert_eq!(
            coordinator
                .store()
                .count_active_bookings(class_id)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn promotions_follow_priority_order_one_per_cancellation() {
        let (coordinator, class_id) = coordinator_with_class(1).await;
        let member_a = MemberId::random();
        let waiters = [MemberId::random(), MemberId::random(), MemberId::random()];

        coordinator.request_booking(class_id, member_a).await.unwrap();
        for (index, member) in waiters.iter().enumerate() {
            let waitlisted = coordinator.join_waitlist(class_id, *member).await.unwrap();
            assert_eq!(waitlisted.position, index as u32 + 1);
        }

        let first = coordinator.cancel_booking(class_id, member_a).await.unwrap();
        assert_eq!(first.promotion.unwrap().member_id, waiters[0]);

        // The promoted member cancels; the next-lowest priority follows.
        let second = coordinator
            .cancel_booking(class_id, waiters[0])
            .await
            .unwrap();
        assert_eq!(second.promotion.unwrap().member_id, waiters[1]);

        let still_waiting = coordinator
            .store()
            .waiting_entries_by_priority(class_id)
            .await
            .unwrap();
        assert_eq!(still_waiting.len(), 1);
        assert_eq!(still_waiting[0].member_id, waiters[2]);

        similar_asserts::assert_eq!(coordinator.audit(class_id).await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn repeated_cancellation_is_rejected_without_a_second_promotion() {
        let (coordinator, class_id) = coordinator_with_class(2).await;
        let member_a = MemberId::random();
        let member_b = MemberId::random();
        let waiter_1 = MemberId::random();
        let waiter_2 = MemberId::random();

        coordinator.request_booking(class_id, member_a).await.unwrap();
        coordinator.request_booking(class_id, member_b).await.unwrap();
        coordinator.join_waitlist(class_id, waiter_1).await.unwrap();
        coordinator.join_waitlist(class_id, waiter_2).await.unwrap();

        let cancelled = coordinator.cancel_booking(class_id, member_a).await.unwrap();
        assert_eq!(cancelled.promotion.unwrap().member_id, waiter_1);

        let err = coordinator
            .cancel_booking(class_id, member_a)
            .await
            .unwrap_err();
        assert!(matches!(
            rejection(err),
            PolicyRejection::NoActiveBooking { .. }
        ));

        // The second waiter was not promoted by the rejected cancel.
        let waiting = coordinator
            .store()
            .waiting_entries_by_priority(class_id)
            .await
            .unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].member_id, waiter_2);
    }

    #[test_log::test(tokio::test)]
    async fn last_free_slot_race_books_exactly_one_member() {
        let (coordinator, class_id) = coordinator_with_class(1).await;
        let member_x = MemberId::random();
        let member_y = MemberId::random();

        let (result_x, result_y) = tokio::join!(
            coordinator.request_booking(class_id, member_x),
            coordinator.request_booking(class_id, member_y),
        );

        let winners = [&result_x, &result_y]
            .iter()
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(winners, 1, "exactly one racer may win the last slot");

        let loser = if result_x.is_err() { result_x } else { result_y };
        assert!(matches!(
            rejection(loser.unwrap_err()),
            PolicyRejection::ClassFull { .. }
        ));
        assert_eq!(
            coordinator
                .store()
                .count_active_bookings(class_id)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn started_class_freezes_everything_except_leaving() {
        let (coordinator, class_id) = coordinator_with_started_class(5).await;
        let member = MemberId::random();

        for err in [
            coordinator.request_booking(class_id, member).await.unwrap_err(),
            coordinator.cancel_booking(class_id, member).await.unwrap_err(),
            coordinator.join_waitlist(class_id, member).await.unwrap_err(),
        ] {
            assert!(matches!(
                rejection(err),
                PolicyRejection::ClassAlreadyStarted { .. }
            ));
        }

        // A member who queued before the start may still leave.
        coordinator
            .store()
            .seed_entry(WaitlistEntry::new(class_id, member, 1))
            .await;
        let removed = coordinator.leave_waitlist(class_id, member).await.unwrap();
        let entries = coordinator.store().waitlist_entries(class_id).await.unwrap();
        assert_eq!(entries[0].id, removed.entry_id);
        assert_eq!(entries[0].status, WaitlistStatus::Removed);
    }

    #[tokio::test]
    async fn leaving_and_rejoining_moves_to_the_back_of_the_queue() {
        let (coordinator, class_id) = coordinator_with_class(1).await;
        let member_a = MemberId::random();
        let member_w = MemberId::random();
        let member_v = MemberId::random();

        coordinator.request_booking(class_id, member_a).await.unwrap();
        coordinator.join_waitlist(class_id, member_w).await.unwrap();
        coordinator.join_waitlist(class_id, member_v).await.unwrap();

        let err = coordinator.join_waitlist(class_id, member_w).await.unwrap_err();
        assert!(matches!(
            rejection(err),
            PolicyRejection::AlreadyWaitlisted { .. }
        ));

        coordinator.leave_waitlist(class_id, member_w).await.unwrap();
        let err = coordinator.leave_waitlist(class_id, member_w).await.unwrap_err();
        assert!(matches!(
            rejection(err),
            PolicyRejection::NotWaitlisted { .. }
        ));

        // Rejoining never reuses the old priority order.
        let rejoined = coordinator.join_waitlist(class_id, member_w).await.unwrap();
        assert_eq!(rejoined.entry.priority_order, 3);
        assert_eq!(rejoined.position, 2);
    }

    #[tokio::test]
    async fn direct_booking_takes_the_waiting_member_out_of_the_queue() {
        let (coordinator, class_id) = coordinator_with_class(2).await;
        let member_a = MemberId::random();
        let member_w = MemberId::random();

        coordinator.request_booking(class_id, member_a).await.unwrap();
        // One slot still free; waiting ahead of a hoped-for cancellation
        // is allowed, and so is booking the free slot directly.
        coordinator.join_waitlist(class_id, member_w).await.unwrap();
        coordinator.request_booking(class_id, member_w).await.unwrap();

        let store = coordinator.store();
        assert!(
            store
                .find_waiting_entry(class_id, member_w)
                .await
                .unwrap()
                .is_none()
        );
        let entries = store.waitlist_entries(class_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, WaitlistStatus::Removed);
        similar_asserts::assert_eq!(coordinator.audit(class_id).await.unwrap(), Vec::new());

        // Now booked, the member cannot re-enter the queue.
        let err = coordinator.join_waitlist(class_id, member_w).await.unwrap_err();
        assert!(matches!(
            rejection(err),
            PolicyRejection::AlreadyBooked { .. }
        ));
    }

    #[tokio::test]
    async fn unknown_class_reports_not_found_not_a_rejection() {
        let coordinator = BookingCoordinator::new(MemoryStore::new());
        let err = coordinator
            .request_booking(ClassId::random(), MemberId::random())
            .await
            .unwrap_err();

        assert!(matches!(err, CoordinatorError::ClassNotFound(_)));
        assert!(!err.is_retryable());
    }

    /// Store wrapper that fails booking inserts on demand, for exercising
    /// the promotion abandonment path.
    struct FlakyStore {
        inner: MemoryStore,
        fail_booking_inserts: AtomicBool,
    }

    impl FlakyStore {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                fail_booking_inserts: AtomicBool::new(false),
            }
        }

        fn fail_booking_inserts(&self, fail: bool) {
            self.fail_booking_inserts.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl BookingStore for FlakyStore {
        async fn class(&self, class_id: ClassId) -> Result<GymClass, StoreError> {
            self.inner.class(class_id).await
        }

        async fn count_active_bookings(&self, class_id: ClassId) -> Result<u32, StoreError> {
            self.inner.count_active_bookings(class_id).await
        }

        async fn find_active_booking(
            &self,
            class_id: ClassId,
            member_id: MemberId,
        ) -> Result<Option<Booking>, StoreError> {
            self.inner.find_active_booking(class_id, member_id).await
        }

        async fn insert_booking(
            &self,
            class_id: ClassId,
            member_id: MemberId,
        ) -> Result<Booking, StoreError> {
            if self.fail_booking_inserts.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("injected outage".into()));
            }
            self.inner.insert_booking(class_id, member_id).await
        }

        async fn update_booking_status(
            &self,
            booking_id: BookingId,
            status: BookingStatus,
        ) -> Result<(), StoreError> {
            self.inner.update_booking_status(booking_id, status).await
        }

        async fn find_waiting_entry(
            &self,
            class_id: ClassId,
            member_id: MemberId,
        ) -> Result<Option<WaitlistEntry>, StoreError> {
            self.inner.find_waiting_entry(class_id, member_id).await
        }

        async fn insert_waitlist_entry(
            &self,
            class_id: ClassId,
            member_id: MemberId,
            priority_order: u32,
        ) -> Result<WaitlistEntry, StoreError> {
            self.inner
                .insert_waitlist_entry(class_id, member_id, priority_order)
                .await
        }

        async fn update_waitlist_status(
            &self,
            entry_id: WaitlistEntryId,
            status: WaitlistStatus,
        ) -> Result<(), StoreError> {
            self.inner.update_waitlist_status(entry_id, status).await
        }

        async fn waiting_entries_by_priority(
            &self,
            class_id: ClassId,
        ) -> Result<Vec<WaitlistEntry>, StoreError> {
            self.inner.waiting_entries_by_priority(class_id).await
        }

        async fn waitlist_entries(
            &self,
            class_id: ClassId,
        ) -> Result<Vec<WaitlistEntry>, StoreError> {
            self.inner.waitlist_entries(class_id).await
        }

        async fn bookings(&self, class_id: ClassId) -> Result<Vec<Booking>, StoreError> {
            self.inner.bookings(class_id).await
        }
    }

    #[test_log::test(tokio::test)]
    async fn abandoned_promotion_leaves_the_entry_waiting_for_the_next_cancel() {
        let class = GymClass::new(ClassId::random(), 1, Utc::now() + Duration::hours(1)).unwrap();
        let class_id = class.id;
        let store = MemoryStore::new();
        store.add_class(class).await;
        let coordinator = BookingCoordinator::new(FlakyStore::new(store));

        let member_a = MemberId::random();
        let member_w = MemberId::random();
        coordinator.request_booking(class_id, member_a).await.unwrap();
        coordinator.join_waitlist(class_id, member_w).await.unwrap();

        // The promote-side insert fails; the cancellation still succeeds
        // and the entry stays waiting.
        coordinator.store().fail_booking_inserts(true);
        let cancelled = coordinator.cancel_booking(class_id, member_a).await.unwrap();
        assert!(cancelled.promotion.is_none());
        let waiting = coordinator
            .store()
            .waiting_entries_by_priority(class_id)
            .await
            .unwrap();
        assert_eq!(waiting.len(), 1);

        // The entry is reconsidered on the next cancellation.
        coordinator.store().fail_booking_inserts(false);
        let member_b = MemberId::random();
        coordinator.request_booking(class_id, member_b).await.unwrap();
        let cancelled = coordinator.cancel_booking(class_id, member_b).await.unwrap();
        assert_eq!(cancelled.promotion.unwrap().member_id, member_w);
    }
}
