//! Error taxonomy for allocation operations.

use thiserror::Error;

use crate::model::{RequesterId, RequesterState, ResourceId};

/// A rejected allocation operation.
///
/// Every failing operation returns before mutating engine state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// No requester with this id was ever registered.
    #[error("unknown requester {0}")]
    UnknownRequester(RequesterId),

    /// No resource with this id was ever registered.
    #[error("unknown resource {0}")]
    UnknownResource(ResourceId),

    /// The resource exists but nothing is bound to it.
    #[error("resource {0} is not occupied")]
    ResourceNotOccupied(ResourceId),

    /// The requester exists but is no longer queued.
    #[error("requester {id} is {state}, not waiting")]
    NotWaiting {
        id: RequesterId,
        state: RequesterState,
    },

    #[error("requester {0} is already registered")]
    DuplicateRequester(RequesterId),

    #[error("resource {0} is already registered")]
    DuplicateResource(ResourceId),

    /// Urgency outside the configured range.
    #[error("urgency {value} outside accepted range {min}..={max}")]
    InvalidUrgency { value: u8, min: u8, max: u8 },

    #[error("invalid allocator configuration: {0}")]
    InvalidConfig(String),
}

impl AllocationError {
    /// Unknown id, or a release of a resource that is already free.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AllocationError::UnknownRequester(_)
                | AllocationError::UnknownResource(_)
                | AllocationError::ResourceNotOccupied(_)
        )
    }

    /// The target exists but is in the wrong lifecycle state.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, AllocationError::NotWaiting { .. })
    }
}

/// A broken structural invariant, reported by
/// [`AllocationEngine::check_invariants`](super::AllocationEngine::check_invariants).
///
/// Never expected under exclusive, single-threaded use; seeing one is a
/// defect in the engine, not a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("allocation invariant violated: {0}")]
pub struct InvariantViolation(pub String);
