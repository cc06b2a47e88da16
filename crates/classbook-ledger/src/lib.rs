//! Pure booking-ledger logic for a single class.
//!
//! Everything in this crate is synchronous and side-effect free:
//! - [`queries`]: derived quantities over booking and waitlist rows
//!   (active count, next priority order, queue positions).
//! - [`gate`]: the decision layer — precondition checks for the four
//!   member operations plus promotion candidate selection.
//! - [`invariants`]: snapshot validation that reports every violated
//!   ledger property (overbooking, duplicate actives, ordering).
//!
//! The coordinator crate drives these decisions through a persistence
//! store; the store's conditional writes are what make the decisions
//! safe under concurrency. Nothing here may be cached across requests —
//! stale counts are exactly the double-booking hazard.

pub mod error;
pub mod gate;
pub mod invariants;
pub mod ledger;
pub mod queries;

pub use error::LedgerViolation;
pub use gate::{booking_gate, cancel_gate, join_gate, leave_gate, promotion_candidate};
pub use invariants::validate_ledger;
pub use ledger::ClassLedger;
