//! `stockroom-core`: shared primitives for the console access layer.
//!
//! No IO, no async, no knowledge of roles or routes.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::UserId;
