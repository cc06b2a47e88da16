use std::collections::HashMap;

use async_trait::async_trait;
use classbook_types::{
    Booking, BookingId, BookingStatus, ClassId, GymClass, MemberId, WaitlistEntry, WaitlistEntryId,
    WaitlistStatus,
};
use tokio::sync::Mutex;

use crate::store::{BookingStore, StoreError};

/// In-memory [`BookingStore`] backed by a single `tokio::sync::Mutex`.
///
/// Every call takes the lock over the full table set, which makes each
/// store operation atomic: the conditional inserts re-validate capacity,
/// priority, and booked/waiting exclusivity under the same lock that
/// performs the write, so racing coordinator calls cannot overbook or
/// leave a member both booked and waiting. Suitable for tests and
/// single-process deployments; a SQL-backed store would express the same
/// conditions as constraint-guarded transactional writes.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    classes: HashMap<ClassId, GymClass>,
    bookings: Vec<Booking>,
    entries: Vec<WaitlistEntry>,
}

impl Tables {
    fn class(&self, class_id: ClassId) -> Result<&GymClass, StoreError> {
        self.classes
            .get(&class_id)
            .ok_or(StoreError::ClassMissing(class_id))
    }

    fn active_count(&self, class_id: ClassId) -> u32 {
        self.bookings
            .iter()
            .filter(|b| b.class_id == class_id && b.is_active())
            .count() as u32
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. Class scheduling belongs to a collaborator
    /// outside the coordinator; this is the hand-over seam.
    pub async fn add_class(&self, class: GymClass) {
        self.tables.lock().await.classes.insert(class.id, class);
    }

    #[cfg(test)]
    pub(crate) async fn seed_entry(&self, entry: WaitlistEntry) {
        self.tables.lock().await.entries.push(entry);
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn class(&self, class_id: ClassId) -> Result<GymClass, StoreError> {
        self.tables.lock().await.class(class_id).cloned()
    }

    async fn count_active_bookings(&self, class_id: ClassId) -> Result<u32, StoreError> {
        let tables = self.tables.lock().await;
        tables.class(class_id)?;
        Ok(tables.active_count(class_id))
    }

    async fn find_active_booking(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Option<Booking>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bookings
            .iter()
            .find(|b| b.class_id == class_id && b.member_id == member_id && b.is_active())
            .cloned())
    }

    async fn insert_booking(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Booking, StoreError> {
        let mut tables = self.tables.lock().await;
        let max_capacity = tables.class(class_id)?.max_capacity;

        let duplicate = tables
            .bookings
            .iter()
            .any(|b| b.class_id == class_id && b.member_id == member_id && b.is_active());
        if duplicate {
            return Err(StoreError::DuplicateBooking {
                class_id,
                member_id,
            });
        }
        if tables.active_count(class_id) >= max_capacity {
            return Err(StoreError::SlotContended(class_id));
        }

        // A booked member must not stay in the queue. Resolving the
        // waiting entry under the same lock keeps the booked-and-waiting
        // state unobservable; a promotion overwrites this to Promoted.
        if let Some(entry) = tables
            .entries
            .iter_mut()
            .find(|e| e.class_id == class_id && e.member_id == member_id && e.is_waiting())
        {
            entry.status = WaitlistStatus::Removed;
        }

        let booking = Booking::new(class_id, member_id);
        tables.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let booking = tables
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or(StoreError::BookingMissing(booking_id))?;
        booking.status = status;
        Ok(())
    }

    async fn find_waiting_entry(
        &self,
        class_id: ClassId,
        member_id: MemberId,
    ) -> Result<Option<WaitlistEntry>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .entries
            .iter()
            .find(|e| e.class_id == class_id && e.member_id == member_id && e.is_waiting())
            .cloned())
    }

    async fn insert_waitlist_entry(
        &self,
        class_id: ClassId,
        member_id: MemberId,
        priority_order: u32,
    ) -> Result<WaitlistEntry, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.class(class_id)?;

        let booked = tables
            .bookings
            .iter()
            .any(|b| b.class_id == class_id && b.member_id == member_id && b.is_active());
        if booked {
            return Err(StoreError::DuplicateBooking {
                class_id,
                member_id,
            });
        }

        let duplicate = tables
            .entries
            .iter()
            .any(|e| e.class_id == class_id && e.member_id == member_id && e.is_waiting());
        if duplicate {
            return Err(StoreError::DuplicateWaiting {
                class_id,
                member_id,
            });
        }

        // Priority must be strictly past the maximum over ALL entries
        // (any status) and at least 1; a stale proposal lost a join race.
        let current_max = tables
            .entries
            .iter()
            .filter(|e| e.class_id == class_id)
            .map(|e| e.priority_order)
            .max()
            .unwrap_or(0);
        if priority_order <= current_max || priority_order == 0 {
            return Err(StoreError::StalePriority {
                class_id,
                priority_order,
            });
        }

        let entry = WaitlistEntry::new(class_id, member_id, priority_order);
        tables.entries.push(entry.clone());
        Ok(entry)
    }

    async fn update_waitlist_status(
        &self,
        entry_id: WaitlistEntryId,
        status: WaitlistStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let entry = tables
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or(StoreError::EntryMissing(entry_id))?;
        entry.status = status;
        Ok(())
    }

    async fn waiting_entries_by_priority(
        &self,
        class_id: ClassId,
    ) -> Result<Vec<WaitlistEntry>, StoreError> {
        let tables = self.tables.lock().await;
        let mut waiting: Vec<WaitlistEntry> = tables
            .entries
            .iter()
            .filter(|e| e.class_id == class_id && e.is_waiting())
            .cloned()
            .collect();
        waiting.sort_by_key(|e| e.priority_order);
        Ok(waiting)
    }

    async fn waitlist_entries(&self, class_id: ClassId) -> Result<Vec<WaitlistEntry>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .entries
            .iter()
            .filter(|e| e.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn bookings(&self, class_id: ClassId) -> Result<Vec<Booking>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bookings
            .iter()
            .filter(|b| b.class_id == class_id)
            .cloned()
            .collect())
    }
}
