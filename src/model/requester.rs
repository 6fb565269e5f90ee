//! Requesters (patients) waiting for or holding a resource.

use std::fmt;

use crate::queue::HeapItem;

use super::EpochMillis;

/// Unique requester identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequesterId(pub u32);

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered urgency level. Lower values are more urgent.
///
/// The accepted range is enforced by
/// [`AllocatorConfig`](crate::allocation::AllocatorConfig), not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Urgency(pub u8);

impl Urgency {
    /// Returns the raw level.
    pub fn level(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a requester.
///
/// `Waiting -> Assigned -> Discharged`; discharge is terminal and there is
/// no path back from `Assigned` to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RequesterState {
    /// Queued for a resource.
    Waiting,
    /// Bound to a resource.
    Assigned,
    /// Released from its resource; kept in the discharge history.
    Discharged,
}

impl fmt::Display for RequesterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequesterState::Waiting => "Waiting",
            RequesterState::Assigned => "Assigned",
            RequesterState::Discharged => "Discharged",
        };
        f.write_str(label)
    }
}

/// A requester record.
///
/// Plain data: the binding to a resource lives in the allocation engine,
/// not here. `arrival` and `state` are stamped by the engine on
/// registration; the values set by [`Requester::new`] are placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Requester {
    /// Unique identifier.
    pub id: RequesterId,
    /// Display name.
    pub name: String,
    /// Current urgency.
    pub urgency: Urgency,
    /// Arrival timestamp; the tie-break within one urgency (earlier wins).
    pub arrival: EpochMillis,
    /// Lifecycle state.
    pub state: RequesterState,
    /// Set on the transition to `Assigned`.
    pub assigned_at: Option<EpochMillis>,
    /// Set once, on the transition to `Discharged`.
    pub discharged_at: Option<EpochMillis>,
}

impl Requester {
    /// Creates a waiting requester with no arrival stamp yet.
    pub fn new(id: u32, name: impl Into<String>, urgency: u8) -> Self {
        Self {
            id: RequesterId(id),
            name: name.into(),
            urgency: Urgency(urgency),
            arrival: 0,
            state: RequesterState::Waiting,
            assigned_at: None,
            discharged_at: None,
        }
    }

    /// Returns `true` while queued.
    pub fn is_waiting(&self) -> bool {
        self.state == RequesterState::Waiting
    }

    /// Returns `true` while bound to a resource.
    pub fn is_assigned(&self) -> bool {
        self.state == RequesterState::Assigned
    }

    /// Returns `true` once discharged.
    pub fn is_discharged(&self) -> bool {
        self.state == RequesterState::Discharged
    }
}

impl HeapItem for Requester {
    type Id = RequesterId;
    type Key = (Urgency, EpochMillis);

    fn id(&self) -> RequesterId {
        self.id
    }

    fn key(&self) -> (Urgency, EpochMillis) {
        (self.urgency, self.arrival)
    }
}
