//! Interaction flows that drive the game between states
//!
//! Everything here is built from one resilience primitive: capture, decide,
//! act, retried through a bounded poll. Flows block the single control
//! thread with explicit sleeps; a timed-out poll is an ordinary `false`,
//! not an error.

pub mod instance_service;
pub mod poll;
pub mod spawn;

pub use instance_service::{FindInstanceReport, InstanceService};
pub use poll::poll_until;
pub use spawn::attempt_order;
