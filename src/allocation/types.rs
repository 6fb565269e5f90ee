//! Read-only summaries of engine state.

use std::collections::BTreeMap;

use crate::model::{Requester, Resource, Urgency};

/// Point-in-time counters, as shown on an occupancy report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationStats {
    pub total_resources: usize,
    pub occupied_resources: usize,
    pub available_resources: usize,
    pub waiting: usize,
    pub assigned: usize,
    pub discharged: usize,
    /// Occupied share of all resources, in percent. 0 with no resources.
    pub occupancy_rate: f64,
    /// Requester count per urgency level, across all lifecycle states.
    pub by_urgency: BTreeMap<Urgency, usize>,
}

/// Everything needed to rebuild an engine.
///
/// Bindings are not part of a snapshot: see
/// [`AllocationEngine::restore`](super::AllocationEngine::restore).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Waiting, assigned and discharged requesters.
    pub requesters: Vec<Requester>,
    /// All resources in registration order.
    pub resources: Vec<Resource>,
    /// Discharge history in departure order.
    pub discharged: Vec<Requester>,
}
