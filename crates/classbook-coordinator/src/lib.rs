//! The booking coordinator: accepts member booking, cancellation, and
//! waitlist requests for a class and produces capacity-respecting
//! outcomes by driving the pure decision gates through a persistence
//! store.
//!
//! The store's two conditional inserts carry the atomicity contract:
//! capacity and priority ordering are re-validated at write time, so two
//! racing requests for the last slot resolve to exactly one `Booked` and
//! one `ClassFull`.

mod coordinator;
mod error;
mod memory;
mod store;

pub use coordinator::BookingCoordinator;
pub use error::CoordinatorError;
pub use memory::MemoryStore;
pub use store::{BookingStore, StoreError};
