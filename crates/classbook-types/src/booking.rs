use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{BookingId, ClassId, MemberId};

/// Booking lifecycle: `(none) -> Booked -> Cancelled`.
///
/// There is no pending state — creation is an atomic accept/reject — and
/// no path back from `Cancelled`. Re-booking after a cancellation creates
/// a brand new row, keeping the ledger append-only for audit purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Booked,
    /// Terminal.
    Cancelled,
}

impl BookingStatus {
    /// Whether the booking has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Booked => write!(f, "Booked"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// One booking row. Rows are never physically deleted; cancellation only
/// flips `status`.
///
/// Timestamp is wall-clock for audit purposes — capacity decisions are
/// based on status counts, never on `created_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub class_id: ClassId,
    pub member_id: MemberId,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Fresh active booking with a random id, stamped now.
    pub fn new(class_id: ClassId, member_id: MemberId) -> Self {
        Self {
            id: BookingId::random(),
            class_id,
            member_id,
            status: BookingStatus::Booked,
            created_at: Utc::now(),
        }
    }

    /// An active booking counts against class capacity.
    pub fn is_active(&self) -> bool {
        matches!(self.status, BookingStatus::Booked)
    }
}
