use classbook_types::{BookingId, ClassId, PolicyRejection, WaitlistEntryId};

use crate::store::StoreError;

/// Coordinator failure surface, split by what the caller should do next.
///
/// - [`Rejected`](Self::Rejected): deterministic business-rule violation,
///   surfaced verbatim to the member; retrying cannot succeed without a
///   state change.
/// - [`ClassNotFound`](Self::ClassNotFound), and the booking/entry
///   not-found variants: stale caller state (a row that does not exist),
///   distinct from any business rule. A retry reads the same absence, so
///   none of these are retryable.
/// - [`Unavailable`](Self::Unavailable): persistence failure or a lost
///   write race with no policy meaning; safe to retry. The coordinator
///   itself never retries — that is the caller's responsibility.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Rejected(#[from] PolicyRejection),
    #[error("class {0} not found")]
    ClassNotFound(ClassId),
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),
    #[error("waitlist entry {0} not found")]
    EntryNotFound(WaitlistEntryId),
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

impl CoordinatorError {
    /// Whether the caller may sensibly retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// The rejection, when this is a policy error.
    pub fn rejection(&self) -> Option<&PolicyRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// Default store-error mapping for call sites where a conflict has no
/// policy meaning: write conflicts become retryable `Unavailable`, while
/// missing rows keep their non-retryable not-found kind (the row will
/// still be gone on the retry). `request_booking` and `join_waitlist`
/// intercept the conflicts they can translate into rejections before
/// this runs.
impl From<StoreError> for CoordinatorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ClassMissing(class_id) => Self::ClassNotFound(class_id),
            StoreError::BookingMissing(booking_id) => Self::BookingNotFound(booking_id),
            StoreError::EntryMissing(entry_id) => Self::EntryNotFound(entry_id),
            StoreError::Unavailable(message) => Self::Unavailable(message),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
