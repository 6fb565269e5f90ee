//! Allocation engine: binds waiting requesters to free resources.
//!
//! # Matching
//!
//! After every mutating operation the engine runs one matching pass:
//!
//! 1. While a resource is free and a requester is waiting:
//!    a. Take the resource at the front of the available pool (FIFO)
//!    b. Extract the minimum `(urgency, arrival)` requester
//!    c. Bind them, mark the resource occupied, mark the requester assigned
//! 2. If a binding cannot be created, put both back and stop
//!
//! Any free resource satisfies any requester; resource kind is not checked.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use tracing::{debug, error, info, warn};

use crate::model::{Requester, RequesterId, RequesterState, Resource, ResourceId};
use crate::queue::PriorityQueue;

use super::binding::BindingTable;
use super::clock::{Clock, SystemClock};
use super::config::AllocatorConfig;
use super::error::{AllocationError, InvariantViolation};
use super::types::{AllocationStats, Snapshot};

/// Priority-ordered matching of requesters to interchangeable resources.
///
/// Owns the waiting queue, the FIFO pool of free resources, the registry
/// of all resources, the binding table and the discharge history. These
/// form one unit: `&mut self` on every mutating call is the only
/// serialization it needs.
///
/// # Examples
///
/// ```
/// use u_bedalloc::allocation::{AllocationEngine, AllocatorConfig, ManualClock};
/// use u_bedalloc::model::{Requester, Resource, ResourceId, RequesterId};
///
/// let mut engine =
///     AllocationEngine::with_clock(AllocatorConfig::default(), ManualClock::new(0)).unwrap();
///
/// engine.register_requester(Requester::new(101, "John Doe", 3)).unwrap();
/// engine.register_requester(Requester::new(102, "Jane Smith", 1)).unwrap();
/// engine.register_resource(Resource::new(1, "ICU-101")).unwrap();
///
/// assert_eq!(engine.bound_resource(RequesterId(102)), Some(ResourceId(1)));
/// assert_eq!(engine.waiting_count(), 1);
///
/// engine.release_resource(ResourceId(1)).unwrap();
/// assert_eq!(engine.bound_resource(RequesterId(101)), Some(ResourceId(1)));
/// assert_eq!(engine.discharged().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AllocationEngine<C: Clock = SystemClock> {
    config: AllocatorConfig,
    clock: C,
    queue: PriorityQueue<Requester>,
    available: VecDeque<ResourceId>,
    resources: Vec<Resource>,
    resource_index: HashMap<ResourceId, usize>,
    assigned: HashMap<RequesterId, Requester>,
    bindings: BindingTable,
    history: Vec<Requester>,
    history_index: HashMap<RequesterId, usize>,
}

impl AllocationEngine<SystemClock> {
    /// Creates an engine with the default configuration and wall clock.
    pub fn new() -> Self {
        let config = AllocatorConfig::default();
        Self::empty(config, SystemClock::new())
    }

    /// Creates an engine with the wall clock.
    pub fn with_config(config: AllocatorConfig) -> Result<Self, AllocationError> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl Default for AllocationEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> AllocationEngine<C> {
    /// Creates an empty engine with an explicit time source.
    pub fn with_clock(config: AllocatorConfig, clock: C) -> Result<Self, AllocationError> {
        config.validate().map_err(AllocationError::InvalidConfig)?;
        Ok(Self::empty(config, clock))
    }

    fn empty(config: AllocatorConfig, clock: C) -> Self {
        let queue = PriorityQueue::with_capacity(config.queue_capacity);
        Self {
            config,
            clock,
            queue,
            available: VecDeque::new(),
            resources: Vec::new(),
            resource_index: HashMap::new(),
            assigned: HashMap::new(),
            bindings: BindingTable::new(),
            history: Vec::new(),
            history_index: HashMap::new(),
        }
    }

    /// Rebuilds an engine from a snapshot without running a matching pass.
    ///
    /// - Discharged requesters come from `snapshot.discharged`; entries of
    ///   `snapshot.requesters` that are discharged (or already in history)
    ///   are skipped.
    /// - Every other requester re-enters the queue as waiting, keeping its
    ///   saved arrival stamp.
    /// - Bindings are not persisted, so every resource is restored free and
    ///   joins the available pool in registry order.
    ///
    /// The clock is advanced past the newest restored timestamp. Matching
    /// resumes on the next mutating call (or an explicit
    /// [`match_waiting`](Self::match_waiting)).
    pub fn restore(
        config: AllocatorConfig,
        clock: C,
        snapshot: Snapshot,
    ) -> Result<Self, AllocationError> {
        let mut engine = Self::with_clock(config, clock)?;
        let mut latest = 0;

        for mut resource in snapshot.resources {
            if engine.resource_index.contains_key(&resource.id) {
                return Err(AllocationError::DuplicateResource(resource.id));
            }
            resource.occupied = false;
            engine.available.push_back(resource.id);
            engine
                .resource_index
                .insert(resource.id, engine.resources.len());
            engine.resources.push(resource);
        }

        for mut requester in snapshot.discharged {
            engine.config.check_urgency(requester.urgency.level())?;
            if engine.history_index.contains_key(&requester.id) {
                return Err(AllocationError::DuplicateRequester(requester.id));
            }
            let discharged_at = requester.discharged_at.unwrap_or(requester.arrival);
            requester.state = RequesterState::Discharged;
            requester.discharged_at = Some(discharged_at);
            latest = latest.max(requester.arrival).max(discharged_at);
            engine
                .history_index
                .insert(requester.id, engine.history.len());
            engine.history.push(requester);
        }

        for mut requester in snapshot.requesters {
            if requester.is_discharged() || engine.history_index.contains_key(&requester.id) {
                continue;
            }
            engine.config.check_urgency(requester.urgency.level())?;
            requester.state = RequesterState::Waiting;
            requester.assigned_at = None;
            requester.discharged_at = None;
            latest = latest.max(requester.arrival);
            if let Err(dup) = engine.queue.insert(requester) {
                return Err(AllocationError::DuplicateRequester(dup.id));
            }
        }

        engine.clock.observe(latest);
        info!(
            waiting = engine.queue.len(),
            resources = engine.resources.len(),
            discharged = engine.history.len(),
            "engine restored"
        );
        Ok(engine)
    }

    /// Captures the current state for persistence.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            requesters: self.list_for_display().into_iter().cloned().collect(),
            resources: self.resources.clone(),
            discharged: self.history.clone(),
        }
    }

    // ---- mutating operations ----

    /// Registers a resource and runs a matching pass.
    ///
    /// A registered resource never carries a binding yet, so it always
    /// enters the available pool free; a set `occupied` flag is cleared.
    pub fn register_resource(&mut self, mut resource: Resource) -> Result<(), AllocationError> {
        if self.resource_index.contains_key(&resource.id) {
            warn!(resource = %resource.id, "duplicate resource registration");
            return Err(AllocationError::DuplicateResource(resource.id));
        }
        if resource.occupied {
            warn!(resource = %resource.id, "occupied flag without binding cleared on registration");
            resource.occupied = false;
        }

        info!(
            resource = %resource.id,
            location = %resource.location,
            kind = %resource.kind,
            "resource registered"
        );
        self.available.push_back(resource.id);
        self.resource_index.insert(resource.id, self.resources.len());
        self.resources.push(resource);

        self.match_waiting();
        Ok(())
    }

    /// Queues a requester with `arrival = now`, then runs a matching pass
    /// if any resource is free.
    pub fn register_requester(&mut self, mut requester: Requester) -> Result<(), AllocationError> {
        self.config.check_urgency(requester.urgency.level())?;
        if self.is_known_requester(requester.id) {
            warn!(requester = %requester.id, "duplicate requester registration");
            return Err(AllocationError::DuplicateRequester(requester.id));
        }

        requester.arrival = self.clock.now();
        requester.state = RequesterState::Waiting;
        requester.assigned_at = None;
        requester.discharged_at = None;

        info!(
            requester = %requester.id,
            urgency = %requester.urgency,
            arrival = requester.arrival,
            "requester registered"
        );
        if let Err(rejected) = self.queue.insert(requester) {
            return Err(AllocationError::DuplicateRequester(rejected.id));
        }

        if !self.available.is_empty() {
            self.match_waiting();
        }
        Ok(())
    }

    /// Discharges the requester bound to `id`, frees the resource, and
    /// offers it to the highest-priority waiter.
    ///
    /// Fails without change if the resource is unknown or already free.
    /// Returns the discharged requester's id.
    pub fn release_resource(&mut self, id: ResourceId) -> Result<RequesterId, AllocationError> {
        let Some(&pos) = self.resource_index.get(&id) else {
            warn!(resource = %id, "release of unknown resource");
            return Err(AllocationError::UnknownResource(id));
        };
        if !self.resources[pos].occupied {
            warn!(resource = %id, "release of free resource");
            return Err(AllocationError::ResourceNotOccupied(id));
        }

        let Some(requester_id) = self.bindings.unbind_resource(id) else {
            panic!("resource {id} is flagged occupied but holds no binding");
        };
        let Some(mut requester) = self.assigned.remove(&requester_id) else {
            panic!("requester {requester_id} is bound to resource {id} but not assigned");
        };

        let now = self.clock.now();
        requester.state = RequesterState::Discharged;
        requester.discharged_at = Some(now);
        info!(
            requester = %requester_id,
            resource = %id,
            discharged_at = now,
            "requester discharged"
        );
        self.history_index.insert(requester_id, self.history.len());
        self.history.push(requester);

        self.resources[pos].occupied = false;
        self.available.push_back(id);
        info!(resource = %id, "resource released");

        self.match_waiting();
        Ok(requester_id)
    }

    /// Re-keys a waiting requester: new urgency, arrival reset to now,
    /// then a matching pass.
    ///
    /// Only waiting requesters can be re-prioritized; an assigned one is
    /// never preempted. Resetting the arrival stamp means the requester
    /// ranks behind others already at `new_urgency` who arrived earlier.
    pub fn reprioritize(
        &mut self,
        id: RequesterId,
        new_urgency: u8,
    ) -> Result<(), AllocationError> {
        let urgency = self.config.check_urgency(new_urgency)?;
        if !self.queue.contains(id) {
            let err = match self.state_of(id) {
                Some(state) => AllocationError::NotWaiting { id, state },
                None => AllocationError::UnknownRequester(id),
            };
            warn!(requester = %id, error = %err, "reprioritize rejected");
            return Err(err);
        }

        let Some(mut requester) = self.queue.remove_by_id(id) else {
            return Err(AllocationError::UnknownRequester(id));
        };
        let previous = requester.urgency;
        requester.urgency = urgency;
        requester.arrival = self.clock.now();
        info!(
            requester = %id,
            from = %previous,
            to = %urgency,
            arrival = requester.arrival,
            "requester reprioritized"
        );
        if let Err(rejected) = self.queue.insert(requester) {
            return Err(AllocationError::DuplicateRequester(rejected.id));
        }

        self.match_waiting();
        Ok(())
    }

    /// Runs one matching pass; returns the number of new bindings.
    ///
    /// Called automatically by every mutating operation. Calling it
    /// directly is only useful after [`restore`](Self::restore).
    pub fn match_waiting(&mut self) -> usize {
        debug!(
            waiting = self.queue.len(),
            available = self.available.len(),
            "matching pass start"
        );
        let mut matched = 0;

        while !self.available.is_empty() && !self.queue.is_empty() {
            let Some(resource_id) = self.available.pop_front() else {
                break;
            };
            let Some(mut requester) = self.queue.extract_min() else {
                self.available.push_front(resource_id);
                break;
            };

            if let Err(conflict) = self.bindings.bind(requester.id, resource_id) {
                error!(error = %conflict, "binding failed; stopping matching pass");
                self.available.push_front(resource_id);
                let reinserted = self.queue.insert(requester).is_ok();
                debug_assert!(reinserted, "extracted requester could not be re-queued");
                break;
            }

            let now = self.clock.now();
            requester.state = RequesterState::Assigned;
            requester.assigned_at = Some(now);
            let pos = self.resource_index[&resource_id];
            self.resources[pos].occupied = true;

            info!(
                requester = %requester.id,
                resource = %resource_id,
                urgency = %requester.urgency,
                "requester matched"
            );
            self.assigned.insert(requester.id, requester);
            matched += 1;
        }

        debug!(matched, waiting = self.queue.len(), "matching pass done");
        matched
    }

    // ---- counts ----

    pub fn waiting_count(&self) -> usize {
        self.queue.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn total_resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    pub fn discharged_count(&self) -> usize {
        self.history.len()
    }

    // ---- read-only views ----

    /// Waiting requesters (queue level order), then assigned requesters
    /// (in the registry order of their resources), then discharged
    /// requesters (history order).
    pub fn list_for_display(&self) -> Vec<&Requester> {
        let total = self.queue.len() + self.assigned.len() + self.history.len();
        let mut out = Vec::with_capacity(total);
        out.extend(self.queue.iter());
        out.extend(self.assigned());
        out.extend(self.history.iter());
        out
    }

    /// All resources in registration order.
    pub fn list_resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Free resources in the order they will be handed out.
    pub fn available_resources(&self) -> Vec<&Resource> {
        self.available
            .iter()
            .filter_map(|id| self.resource(*id))
            .collect()
    }

    /// The waiting queue, for level-order visualization.
    pub fn queue(&self) -> &PriorityQueue<Requester> {
        &self.queue
    }

    /// Waiting requesters in level order.
    pub fn waiting(&self) -> &[Requester] {
        self.queue.as_slice()
    }

    /// The heap array split into tree levels.
    pub fn queue_levels(&self) -> Vec<&[Requester]> {
        self.queue.levels()
    }

    /// The requester the next free resource goes to.
    pub fn peek_next(&self) -> Option<&Requester> {
        self.queue.peek_min()
    }

    /// Assigned requesters in the registry order of their resources.
    pub fn assigned(&self) -> Vec<&Requester> {
        self.resources
            .iter()
            .filter_map(|res| self.bindings.requester_of(res.id))
            .filter_map(|id| self.assigned.get(&id))
            .collect()
    }

    /// Discharge history in departure order.
    pub fn discharged(&self) -> &[Requester] {
        &self.history
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resource_index.get(&id).map(|&pos| &self.resources[pos])
    }

    /// Looks up a requester in any lifecycle state.
    pub fn find_requester(&self, id: RequesterId) -> Option<&Requester> {
        self.queue
            .find_by_id(id)
            .or_else(|| self.assigned.get(&id))
            .or_else(|| self.history_index.get(&id).map(|&pos| &self.history[pos]))
    }

    /// Lifecycle state of a requester, if known.
    pub fn state_of(&self, id: RequesterId) -> Option<RequesterState> {
        self.find_requester(id).map(|r| r.state)
    }

    /// Resource currently bound to a requester.
    pub fn bound_resource(&self, requester: RequesterId) -> Option<ResourceId> {
        self.bindings.resource_of(requester)
    }

    /// Requester currently bound to a resource.
    pub fn occupant(&self, resource: ResourceId) -> Option<&Requester> {
        self.bindings
            .requester_of(resource)
            .and_then(|id| self.assigned.get(&id))
    }

    /// Case-insensitive substring match on name, in display order.
    pub fn find_requesters_by_name(&self, needle: &str) -> Vec<&Requester> {
        let needle = needle.to_lowercase();
        self.list_for_display()
            .into_iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Requesters at one urgency level, in display order.
    pub fn requesters_by_urgency(&self, level: u8) -> Vec<&Requester> {
        self.list_for_display()
            .into_iter()
            .filter(|r| r.urgency.level() == level)
            .collect()
    }

    /// Case-insensitive substring match on the kind label, registry order.
    pub fn find_resources_by_kind(&self, needle: &str) -> Vec<&Resource> {
        let needle = needle.to_lowercase();
        self.resources
            .iter()
            .filter(|r| r.kind.label().to_lowercase().contains(&needle))
            .collect()
    }

    /// Like [`find_resources_by_kind`](Self::find_resources_by_kind), free
    /// resources only.
    pub fn find_available_resources_by_kind(&self, needle: &str) -> Vec<&Resource> {
        self.find_resources_by_kind(needle)
            .into_iter()
            .filter(|r| !r.occupied)
            .collect()
    }

    pub fn stats(&self) -> AllocationStats {
        let total = self.resources.len();
        let occupied = self.bindings.len();
        let occupancy_rate = if total > 0 {
            occupied as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let mut by_urgency = BTreeMap::new();
        for requester in self.list_for_display() {
            *by_urgency.entry(requester.urgency).or_insert(0) += 1;
        }
        AllocationStats {
            total_resources: total,
            occupied_resources: occupied,
            available_resources: self.available.len(),
            waiting: self.queue.len(),
            assigned: self.assigned.len(),
            discharged: self.history.len(),
            occupancy_rate,
            by_urgency,
        }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Verifies every structural invariant of the engine.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let fail = |msg: String| Err(InvariantViolation(msg));

        if !self.queue.is_heap() {
            return fail("waiting queue is out of heap order".into());
        }
        if let Some(r) = self.queue.iter().find(|r| r.state != RequesterState::Waiting) {
            return fail(format!("queued requester {} is {}", r.id, r.state));
        }
        if !self.bindings.is_symmetric() {
            return fail("binding lookups disagree".into());
        }
        if self.bindings.len() != self.assigned.len() {
            return fail(format!(
                "{} bindings but {} assigned requesters",
                self.bindings.len(),
                self.assigned.len()
            ));
        }
        for (id, r) in &self.assigned {
            if r.state != RequesterState::Assigned {
                return fail(format!("assigned requester {id} is {}", r.state));
            }
            if self.bindings.resource_of(*id).is_none() {
                return fail(format!("assigned requester {id} has no binding"));
            }
        }
        for resource in &self.resources {
            let bound = self.bindings.requester_of(resource.id).is_some();
            if resource.occupied != bound {
                return fail(format!(
                    "resource {} occupied={} but bound={}",
                    resource.id, resource.occupied, bound
                ));
            }
        }

        let mut pooled = HashSet::new();
        for id in &self.available {
            match self.resource(*id) {
                None => return fail(format!("available pool holds unknown resource {id}")),
                Some(r) if r.occupied => {
                    return fail(format!("available pool holds occupied resource {id}"))
                }
                Some(_) => {}
            }
            if !pooled.insert(*id) {
                return fail(format!("resource {id} is pooled twice"));
            }
        }
        let free = self.resources.iter().filter(|r| !r.occupied).count();
        if free != self.available.len() {
            return fail(format!(
                "{free} free resources but {} in the available pool",
                self.available.len()
            ));
        }

        for r in &self.history {
            if r.state != RequesterState::Discharged || r.discharged_at.is_none() {
                return fail(format!("history entry {} is not discharged", r.id));
            }
        }

        let mut seen = HashSet::new();
        let all = self
            .queue
            .iter()
            .map(|r| r.id)
            .chain(self.assigned.keys().copied())
            .chain(self.history.iter().map(|r| r.id));
        for id in all {
            if !seen.insert(id) {
                return fail(format!("requester {id} is in more than one lifecycle state"));
            }
        }
        Ok(())
    }

    fn is_known_requester(&self, id: RequesterId) -> bool {
        self.queue.contains(id)
            || self.assigned.contains_key(&id)
            || self.history_index.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::ManualClock;
    use proptest::prelude::*;

    fn engine() -> AllocationEngine<ManualClock> {
        AllocationEngine::with_clock(AllocatorConfig::default(), ManualClock::new(1_000)).unwrap()
    }

    fn ids(requesters: &[&Requester]) -> Vec<u32> {
        requesters.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn test_requesters_wait_without_resources() {
        let mut e = engine();
        e.register_requester(Requester::new(101, "John Doe", 3)).unwrap();
        e.register_requester(Requester::new(102, "Jane Smith", 1)).unwrap();

        assert_eq!(e.waiting_count(), 2);
        assert_eq!(e.peek_next().map(|r| r.id), Some(RequesterId(102)));
        assert!(e.check_invariants().is_ok());
    }

    #[test]
    fn test_queue_levels_follow_heap_array() {
        let mut e = engine();
        for (id, urgency) in [(1, 3), (2, 2), (3, 1), (4, 3)] {
            e.register_requester(Requester::new(id, "r", urgency)).unwrap();
        }

        let levels = e.queue_levels();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0][0].id, RequesterId(3));
        assert_eq!(levels.iter().map(|l| l.len()).sum::<usize>(), 4);
        assert!(levels[1].len() == 2 && levels[2].len() == 1);
    }

    #[test]
    fn test_binding_conflict_stops_matching_and_restores_both_sides() {
        let mut e = engine();
        e.bindings.bind(RequesterId(7), ResourceId(99)).unwrap();
        e.register_requester(Requester::new(7, "Stale", 1)).unwrap();
        e.register_resource(Resource::new(1, "ICU-101")).unwrap();

        assert_eq!(e.match_waiting(), 0);
        assert!(e.queue().contains(RequesterId(7)));
        assert_eq!(e.state_of(RequesterId(7)), Some(RequesterState::Waiting));
        assert_eq!(e.available.front(), Some(&ResourceId(1)));
        assert_eq!(e.available_count(), 1);
        assert!(!e.resource(ResourceId(1)).unwrap().occupied);
        assert!(e.queue().is_heap());
    }

    #[test]
    fn test_resource_waits_without_requesters() {
        let mut e = engine();
        e.register_resource(Resource::new(1, "ICU-101")).unwrap();

        assert_eq!(e.available_count(), 1);
        assert_eq!(e.total_resource_count(), 1);
        assert!(e.occupant(ResourceId(1)).is_none());
    }

    #[test]
    fn test_register_stamps_arrival_from_clock() {
        let mut e = engine();
        let mut r = Requester::new(1, "a", 2);
        r.arrival = 42;
        r.state = RequesterState::Discharged;
        e.register_requester(r).unwrap();

        let stored = e.find_requester(RequesterId(1)).unwrap();
        assert_eq!(stored.arrival, 1_000);
        assert!(stored.is_waiting());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut e = engine();
        e.register_resource(Resource::new(1, "ICU-101")).unwrap();
        e.register_requester(Requester::new(7, "a", 2)).unwrap();

        assert_eq!(
            e.register_resource(Resource::new(1, "Ward-1")),
            Err(AllocationError::DuplicateResource(ResourceId(1)))
        );
        // 7 is now assigned; its id stays taken.
        assert_eq!(
            e.register_requester(Requester::new(7, "b", 1)),
            Err(AllocationError::DuplicateRequester(RequesterId(7)))
        );
        e.release_resource(ResourceId(1)).unwrap();
        // Discharged ids stay taken too.
        assert!(e.register_requester(Requester::new(7, "c", 1)).is_err());
        assert_eq!(e.total_resource_count(), 1);
    }

    #[test]
    fn test_invalid_urgency_rejected_before_mutation() {
        let mut e = engine();
        let err = e.register_requester(Requester::new(1, "a", 9)).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidUrgency { value: 9, .. }));
        assert_eq!(e.waiting_count(), 0);

        e.register_requester(Requester::new(2, "b", 2)).unwrap();
        assert!(e.reprioritize(RequesterId(2), 0).is_err());
        assert_eq!(e.find_requester(RequesterId(2)).unwrap().urgency.level(), 2);
    }

    #[test]
    fn test_occupied_flag_cleared_on_registration() {
        let mut e = engine();
        let mut bed = Resource::new(1, "ICU-101");
        bed.occupied = true;
        e.register_resource(bed).unwrap();

        assert_eq!(e.available_count(), 1);
        assert!(e.check_invariants().is_ok());
    }

    #[test]
    fn test_resources_handed_out_fifo() {
        let mut e = engine();
        e.register_resource(Resource::new(3, "Ward-3")).unwrap();
        e.register_resource(Resource::new(1, "ICU-1")).unwrap();
        e.register_requester(Requester::new(10, "a", 2)).unwrap();
        e.register_requester(Requester::new(11, "b", 2)).unwrap();

        assert_eq!(e.bound_resource(RequesterId(10)), Some(ResourceId(3)));
        assert_eq!(e.bound_resource(RequesterId(11)), Some(ResourceId(1)));
    }

    #[test]
    fn test_released_resource_goes_to_back_of_pool() {
        let mut e = engine();
        e.register_requester(Requester::new(10, "a", 1)).unwrap();
        e.register_resource(Resource::new(1, "ICU-1")).unwrap();
        e.register_resource(Resource::new(2, "ICU-2")).unwrap();

        e.release_resource(ResourceId(1)).unwrap();
        let pool: Vec<ResourceId> = e.available_resources().iter().map(|r| r.id).collect();
        assert_eq!(pool, vec![ResourceId(2), ResourceId(1)]);
    }

    #[test]
    fn test_release_failures_leave_state_unchanged() {
        let mut e = engine();
        e.register_resource(Resource::new(1, "ICU-1")).unwrap();
        e.register_requester(Requester::new(10, "a", 1)).unwrap();
        e.register_resource(Resource::new(2, "ICU-2")).unwrap();

        let before = (e.waiting_count(), e.available_count(), e.assigned_count());
        assert_eq!(
            e.release_resource(ResourceId(2)),
            Err(AllocationError::ResourceNotOccupied(ResourceId(2)))
        );
        assert_eq!(
            e.release_resource(ResourceId(99)),
            Err(AllocationError::UnknownResource(ResourceId(99)))
        );
        let after = (e.waiting_count(), e.available_count(), e.assigned_count());
        assert_eq!(before, after);
        assert_eq!(e.bound_resource(RequesterId(10)), Some(ResourceId(1)));
        assert!(e.discharged().is_empty());
    }

    #[test]
    fn test_release_twice_fails_second_time() {
        let mut e = engine();
        e.register_resource(Resource::new(1, "ICU-1")).unwrap();
        e.register_requester(Requester::new(10, "a", 1)).unwrap();

        assert_eq!(e.release_resource(ResourceId(1)), Ok(RequesterId(10)));
        assert!(e.release_resource(ResourceId(1)).unwrap_err().is_not_found());
        assert_eq!(e.discharged_count(), 1);
    }

    #[test]
    fn test_discharge_time_after_assignment() {
        let mut e = engine();
        e.register_resource(Resource::new(1, "ICU-1")).unwrap();
        e.register_requester(Requester::new(10, "a", 1)).unwrap();
        e.release_resource(ResourceId(1)).unwrap();

        let r = &e.discharged()[0];
        assert!(r.is_discharged());
        let assigned = r.assigned_at.unwrap();
        let discharged = r.discharged_at.unwrap();
        assert!(discharged >= assigned);
        assert!(assigned >= r.arrival);
    }

    #[test]
    fn test_reprioritize_unknown_and_not_waiting() {
        let mut e = engine();
        e.register_resource(Resource::new(1, "ICU-1")).unwrap();
        e.register_requester(Requester::new(10, "a", 3)).unwrap();

        assert_eq!(
            e.reprioritize(RequesterId(99), 1),
            Err(AllocationError::UnknownRequester(RequesterId(99)))
        );
        let err = e.reprioritize(RequesterId(10), 1).unwrap_err();
        assert_eq!(
            err,
            AllocationError::NotWaiting {
                id: RequesterId(10),
                state: RequesterState::Assigned
            }
        );
        assert_eq!(e.find_requester(RequesterId(10)).unwrap().urgency.level(), 3);

        e.release_resource(ResourceId(1)).unwrap();
        assert!(e.reprioritize(RequesterId(10), 1).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_reprioritize_resets_arrival_behind_earlier_peers() {
        let mut e = engine();
        e.register_requester(Requester::new(1, "early", 1)).unwrap();
        e.register_requester(Requester::new(2, "escalated", 3)).unwrap();

        e.reprioritize(RequesterId(2), 1).unwrap();
        // Same urgency, but the reset arrival ranks it behind requester 1.
        assert_eq!(e.peek_next().map(|r| r.id), Some(RequesterId(1)));
        let escalated = e.find_requester(RequesterId(2)).unwrap();
        assert!(escalated.arrival > e.find_requester(RequesterId(1)).unwrap().arrival);
    }

    #[test]
    fn test_list_for_display_order() {
        let mut e = engine();
        e.register_requester(Requester::new(1, "a", 1)).unwrap();
        e.register_requester(Requester::new(2, "b", 2)).unwrap();
        e.register_requester(Requester::new(3, "c", 3)).unwrap();
        e.register_requester(Requester::new(4, "d", 3)).unwrap();
        e.register_resource(Resource::new(20, "Ward-20")).unwrap();
        e.register_resource(Resource::new(10, "ICU-10")).unwrap();
        e.register_resource(Resource::new(30, "Ward-30")).unwrap();
        // 1 -> 20, 2 -> 10, 3 -> 30; 4 waits.
        e.release_resource(ResourceId(10)).unwrap();
        // 2 discharged, 4 -> 10.

        let listed = ids(&e.list_for_display());
        assert_eq!(listed, vec![1, 4, 3, 2]);
        assert_eq!(e.waiting_count(), 0);
    }

    #[test]
    fn test_search_queries() {
        let mut e = engine();
        e.register_requester(Requester::new(1, "John Doe", 1)).unwrap();
        e.register_requester(Requester::new(2, "Jane Doe", 2)).unwrap();
        e.register_requester(Requester::new(3, "Bob Brown", 2)).unwrap();
        e.register_resource(Resource::new(1, "ICU-101")).unwrap();
        e.register_resource(Resource::new(2, "Ward-A-001")).unwrap();
        e.register_resource(Resource::new(3, "ICU-102")).unwrap();
        e.register_resource(Resource::new(4, "icu-103")).unwrap();

        assert_eq!(ids(&e.find_requesters_by_name("doe")), vec![1, 2]);
        assert_eq!(ids(&e.requesters_by_urgency(2)), vec![2, 3]);

        let icu: Vec<u32> = e.find_resources_by_kind("icu").iter().map(|r| r.id.0).collect();
        assert_eq!(icu, vec![1, 3, 4]);
        let free_icu: Vec<u32> = e
            .find_available_resources_by_kind("ICU")
            .iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(free_icu, vec![4]);
    }

    #[test]
    fn test_stats() {
        let mut e = engine();
        assert_eq!(e.stats().occupancy_rate, 0.0);

        e.register_resource(Resource::new(1, "ICU-1")).unwrap();
        e.register_resource(Resource::new(2, "ICU-2")).unwrap();
        e.register_requester(Requester::new(10, "a", 1)).unwrap();
        e.register_requester(Requester::new(11, "b", 1)).unwrap();
        e.register_requester(Requester::new(12, "c", 3)).unwrap();
        e.release_resource(ResourceId(1)).unwrap();

        let stats = e.stats();
        assert_eq!(stats.total_resources, 2);
        assert_eq!(stats.occupied_resources, 2);
        assert_eq!(stats.available_resources, 0);
        assert_eq!(stats.waiting, 0);
        assert_eq!(stats.assigned, 2);
        assert_eq!(stats.discharged, 1);
        assert!((stats.occupancy_rate - 100.0).abs() < 1e-10);
        assert_eq!(stats.by_urgency.get(&crate::model::Urgency(1)), Some(&2));
        assert_eq!(stats.by_urgency.get(&crate::model::Urgency(3)), Some(&1));
    }

    #[test]
    fn test_restore_does_not_match() {
        let mut waiting = Requester::new(1, "a", 2);
        waiting.arrival = 5_000;
        let mut assigned = Requester::new(2, "b", 1);
        assigned.arrival = 4_000;
        assigned.state = RequesterState::Assigned;
        let mut gone = Requester::new(3, "c", 1);
        gone.arrival = 1_000;
        gone.state = RequesterState::Discharged;
        gone.discharged_at = Some(6_000);
        let mut bed = Resource::new(1, "ICU-1");
        bed.occupied = true;

        let snapshot = Snapshot {
            requesters: vec![waiting, assigned, gone.clone()],
            resources: vec![bed, Resource::new(2, "Ward-2")],
            discharged: vec![gone],
        };
        let mut e =
            AllocationEngine::restore(AllocatorConfig::default(), ManualClock::new(0), snapshot)
                .unwrap();

        assert_eq!(e.waiting_count(), 2);
        assert_eq!(e.available_count(), 2);
        assert_eq!(e.discharged_count(), 1);
        assert_eq!(e.peek_next().map(|r| r.id), Some(RequesterId(2)));
        assert!(e.clock().peek() > 6_000);
        assert!(e.check_invariants().is_ok());

        assert_eq!(e.match_waiting(), 2);
        assert_eq!(e.bound_resource(RequesterId(2)), Some(ResourceId(1)));
        assert_eq!(e.bound_resource(RequesterId(1)), Some(ResourceId(2)));
    }

    #[test]
    fn test_restore_rejects_duplicates() {
        let snapshot = Snapshot {
            requesters: vec![Requester::new(1, "a", 1), Requester::new(1, "b", 1)],
            resources: vec![],
            discharged: vec![],
        };
        let result =
            AllocationEngine::restore(AllocatorConfig::default(), ManualClock::new(0), snapshot);
        assert_eq!(
            result.unwrap_err(),
            AllocationError::DuplicateRequester(RequesterId(1))
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AllocatorConfig::default().with_urgency_range(3, 1);
        let result = AllocationEngine::with_clock(config, ManualClock::new(0));
        assert!(matches!(result, Err(AllocationError::InvalidConfig(_))));
    }

    // ---- random operation sequences ----

    #[derive(Debug, Clone)]
    enum Op {
        Requester(u8),
        Resource,
        Release(u32),
        Reprioritize(u32, u8),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u8..=3).prop_map(Op::Requester),
            Just(Op::Resource),
            (0u32..12).prop_map(Op::Release),
            (0u32..40, 1u8..=3).prop_map(|(id, u)| Op::Reprioritize(id, u)),
        ]
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_after_every_operation(ops in prop::collection::vec(arb_op(), 0..80)) {
            let mut e = engine();
            let mut next_requester = 0u32;
            let mut next_resource = 0u32;

            for op in ops {
                match op {
                    Op::Requester(u) => {
                        e.register_requester(Requester::new(next_requester, "r", u)).unwrap();
                        next_requester += 1;
                    }
                    Op::Resource => {
                        e.register_resource(Resource::new(next_resource, "Ward")).unwrap();
                        next_resource += 1;
                    }
                    Op::Release(id) => {
                        let before = (e.waiting_count(), e.available_count(), e.discharged_count());
                        if e.release_resource(ResourceId(id)).is_err() {
                            let after = (e.waiting_count(), e.available_count(), e.discharged_count());
                            prop_assert_eq!(before, after);
                        }
                    }
                    Op::Reprioritize(id, u) => {
                        let _ = e.reprioritize(RequesterId(id), u);
                    }
                }

                prop_assert!(e.check_invariants().is_ok(), "{:?}", e.check_invariants());
                // Never a free resource and a waiting requester at the same time.
                prop_assert!(e.available_count() == 0 || e.waiting_count() == 0);
                let states = e.list_for_display().len();
                prop_assert_eq!(states, next_requester as usize);
            }
        }
    }
}
