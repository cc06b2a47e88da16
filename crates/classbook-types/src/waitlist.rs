use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ClassId, MemberId, WaitlistEntryId};

/// Waitlist lifecycle: `(none) -> Waiting -> {Promoted | Removed}`.
///
/// Both outcomes are terminal; there is no path back to `Waiting`.
/// Re-joining after removal creates a new entry with a fresh (higher)
/// `priority_order`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitlistStatus {
    Waiting,
    /// Terminal. The entry was granted a freed slot and a booking was
    /// created for its member.
    Promoted,
    /// Terminal. The member left voluntarily or was pruned.
    Removed,
}

impl WaitlistStatus {
    /// Whether the entry has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Promoted | Self::Removed)
    }
}

impl std::fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Promoted => write!(f, "Promoted"),
            Self::Removed => write!(f, "Removed"),
        }
    }
}

/// One waitlist row for a class.
///
/// `priority_order` is assigned at creation as the class's current maximum
/// plus one (or 1 for an empty list), so values are strictly increasing in
/// join order and never reused — a removed entry leaves a gap rather than
/// freeing its number. Lower value means earlier in the queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: WaitlistEntryId,
    pub class_id: ClassId,
    pub member_id: MemberId,
    pub priority_order: u32,
    pub status: WaitlistStatus,
    pub created_at: DateTime<Utc>,
}

impl WaitlistEntry {
    /// Fresh waiting entry with a random id, stamped now. The caller is
    /// responsible for computing `priority_order`; the store re-validates
    /// it at write time.
    pub fn new(class_id: ClassId, member_id: MemberId, priority_order: u32) -> Self {
        Self {
            id: WaitlistEntryId::random(),
            class_id,
            member_id,
            priority_order,
            status: WaitlistStatus::Waiting,
            created_at: Utc::now(),
        }
    }

    /// A waiting entry is eligible for promotion.
    pub fn is_waiting(&self) -> bool {
        matches!(self.status, WaitlistStatus::Waiting)
    }
}
