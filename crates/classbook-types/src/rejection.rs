use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ClassId, MemberId};

/// Deterministic business-rule rejection.
///
/// These are expected outcomes of normal operation, never retried
/// automatically: retrying cannot succeed without an intervening state
/// change. Each variant carries the ids involved for logging and maps to
/// a fixed user-facing message via [`Self::user_message`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PolicyRejection {
    /// The member already holds an active booking for this class.
    #[error("member {member_id} already holds an active booking for class {class_id}")]
    AlreadyBooked {
        class_id: ClassId,
        member_id: MemberId,
    },
    /// Active bookings have reached `max_capacity`. Also produced when a
    /// racing request consumed the last slot between the capacity check
    /// and the conditional insert.
    #[error("class {class_id} is at its capacity of {max_capacity}")]
    ClassFull { class_id: ClassId, max_capacity: u32 },
    /// The class started at `scheduled_at`; bookings, cancellations, and
    /// waitlist joins are frozen from that instant.
    #[error("class {class_id} already started at {scheduled_at}")]
    ClassAlreadyStarted {
        class_id: ClassId,
        scheduled_at: DateTime<Utc>,
    },
    /// The member already has a waiting entry for this class.
    #[error("member {member_id} is already on the waitlist for class {class_id}")]
    AlreadyWaitlisted {
        class_id: ClassId,
        member_id: MemberId,
    },
    /// No waiting entry exists for this member and class.
    #[error("member {member_id} is not on the waitlist for class {class_id}")]
    NotWaitlisted {
        class_id: ClassId,
        member_id: MemberId,
    },
    /// No active booking exists for this member and class.
    #[error("member {member_id} has no active booking for class {class_id}")]
    NoActiveBooking {
        class_id: ClassId,
        member_id: MemberId,
    },
}

impl PolicyRejection {
    /// Stable, user-facing message for each rejection kind.
    ///
    /// Presentation layers surface these verbatim; the `Display` impl is
    /// the operator-facing form with ids.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AlreadyBooked { .. } => "You are already booked into this class.",
            Self::ClassFull { .. } => "This class is full, join the waitlist.",
            Self::ClassAlreadyStarted { .. } => "This class has already started.",
            Self::AlreadyWaitlisted { .. } => "You are already on the waitlist for this class.",
            Self::NotWaitlisted { .. } => "You are not on the waitlist for this class.",
            Self::NoActiveBooking { .. } => "You have no active booking for this class.",
        }
    }
}
