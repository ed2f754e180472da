//! In-process fan-out of dashboard events to Server-Sent Event subscribers.

pub mod hub;
pub mod router;

pub use hub::{EventHub, Room};
pub use router::events_router;
