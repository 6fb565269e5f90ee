//! Entity records: requesters and resources.
//!
//! Both are plain data. The relation between them (which requester holds
//! which resource) is owned by the
//! [`AllocationEngine`](crate::allocation::AllocationEngine) as a pair of
//! lookup tables, so neither entity refers to the other.

mod requester;
mod resource;

pub use requester::{Requester, RequesterId, RequesterState, Urgency};
pub use resource::{Resource, ResourceId, ResourceKind};

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;
