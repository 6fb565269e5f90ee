//! Priority-ordered allocation of resources to waiting requesters.
//!
//! The [`AllocationEngine`] owns a min-heap of waiting requesters keyed by
//! `(urgency, arrival)`, a FIFO pool of free resources, the registry of all
//! resources, a binding table and an append-only discharge history. Every
//! mutating call runs to completion, including the matching pass it
//! triggers, before returning.
//!
//! # Lifecycle
//!
//! ```text
//! register_requester ──> Waiting ──(match)──> Assigned ──(release_resource)──> Discharged
//!                          ^   │
//!                          └───┘ reprioritize
//! ```
//!
//! # Concurrency
//!
//! The queue, pool, registry and history form one mutable unit. If shared
//! between threads, wrap the whole engine in a single lock; never lock its
//! parts independently.

mod binding;
mod clock;
mod config;
mod engine;
mod error;
mod types;

pub use binding::{BindingConflict, BindingTable};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AllocatorConfig;
pub use engine::AllocationEngine;
pub use error::{AllocationError, InvariantViolation};
pub use types::{AllocationStats, Snapshot};
