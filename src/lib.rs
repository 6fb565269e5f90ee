//! Priority-ordered bed allocation.
//!
//! Matches scarce, interchangeable resources (beds) to waiting requesters
//! (patients), most urgent first and earliest arrival within one urgency.
//!
//! - **Queue**: Generic array-backed binary min-heap with an id index,
//!   supporting removal and re-keying by identity in O(log n).
//! - **Model**: Plain requester and resource records. The binding between
//!   them is held by the engine, not by the records.
//! - **Allocation**: The engine owning the waiting queue, the FIFO pool of
//!   free resources, the resource registry and the discharge history.
//!   Every registration, release and re-prioritization re-runs matching.
//! - **Persistence**: Comma-delimited flat files for saving and restoring
//!   engine state.
//!
//! # Example
//!
//! ```
//! use u_bedalloc::allocation::{AllocationEngine, AllocatorConfig, ManualClock};
//! use u_bedalloc::model::{Requester, RequesterId, Resource, ResourceId};
//!
//! let mut engine =
//!     AllocationEngine::with_clock(AllocatorConfig::default(), ManualClock::new(0)).unwrap();
//!
//! for (id, name, urgency) in [(101, "John Doe", 3), (102, "Jane Smith", 1), (103, "Robert Johnson", 2)] {
//!     engine.register_requester(Requester::new(id, name, urgency)).unwrap();
//! }
//! for (id, location) in [(1, "ICU-101"), (2, "ICU-102"), (3, "Ward-A-001")] {
//!     engine.register_resource(Resource::new(id, location)).unwrap();
//! }
//!
//! assert_eq!(engine.bound_resource(RequesterId(102)), Some(ResourceId(1)));
//! assert_eq!(engine.bound_resource(RequesterId(103)), Some(ResourceId(2)));
//! assert_eq!(engine.bound_resource(RequesterId(101)), Some(ResourceId(3)));
//! ```
//!
//! # Logging
//!
//! State transitions are reported through [`tracing`]; install a
//! subscriber in the host application to see them.

pub mod allocation;
pub mod model;
pub mod persistence;
pub mod queue;
