pub mod booking;
pub mod class;
pub mod error;
pub mod id;
pub mod outcome;
pub mod rejection;
pub mod waitlist;

pub use booking::{Booking, BookingStatus};
pub use class::GymClass;
pub use error::DomainError;
pub use id::{BookingId, ClassId, MemberId, WaitlistEntryId};
pub use outcome::{Booked, Cancelled, Promotion, Removed, Waitlisted};
pub use rejection::PolicyRejection;
pub use waitlist::{WaitlistEntry, WaitlistStatus};
