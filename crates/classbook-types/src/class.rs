use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::ClassId;

/// An offered class session with a fixed capacity and scheduled time.
///
/// `max_capacity` is set at scheduling time and is immutable for the
/// lifetime of the record. The booking coordinator treats the record as
/// read-only; creation belongs to a scheduling collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymClass {
    pub id: ClassId,
    pub max_capacity: u32,
    pub scheduled_at: DateTime<Utc>,
}

impl GymClass {
    /// Build a class record. A zero capacity is rejected up front so the
    /// capacity gate never has to reason about an unfillable class.
    pub fn new(
        id: ClassId,
        max_capacity: u32,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if max_capacity == 0 {
            return Err(DomainError::ZeroCapacity { class_id: id });
        }
        Ok(Self {
            id,
            max_capacity,
            scheduled_at,
        })
    }

    /// Whether the class has started (or finished) as of `now`.
    ///
    /// A started class is frozen for booking purposes: no new bookings,
    /// no cancellations, no waitlist joins.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at <= now
    }
}
