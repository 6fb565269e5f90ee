//! Bidirectional requester/resource binding table.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::{RequesterId, ResourceId};

/// Either side of a proposed binding is already bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot bind requester {requester} to resource {resource}: already bound")]
pub struct BindingConflict {
    pub requester: RequesterId,
    pub resource: ResourceId,
}

/// One-to-one relation between assigned requesters and occupied resources,
/// held as two lookups kept in step.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    by_requester: HashMap<RequesterId, ResourceId>,
    by_resource: HashMap<ResourceId, RequesterId>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active bindings.
    pub fn len(&self) -> usize {
        self.by_requester.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_requester.is_empty()
    }

    /// Binds `requester` to `resource`. Fails without change if either is
    /// already bound.
    pub fn bind(
        &mut self,
        requester: RequesterId,
        resource: ResourceId,
    ) -> Result<(), BindingConflict> {
        if self.by_requester.contains_key(&requester) || self.by_resource.contains_key(&resource)
        {
            return Err(BindingConflict {
                requester,
                resource,
            });
        }
        self.by_requester.insert(requester, resource);
        self.by_resource.insert(resource, requester);
        Ok(())
    }

    /// Removes the binding held by `resource`, returning its requester.
    pub fn unbind_resource(&mut self, resource: ResourceId) -> Option<RequesterId> {
        let requester = self.by_resource.remove(&resource)?;
        self.by_requester.remove(&requester);
        Some(requester)
    }

    /// Resource bound to `requester`, if any.
    pub fn resource_of(&self, requester: RequesterId) -> Option<ResourceId> {
        self.by_requester.get(&requester).copied()
    }

    /// Requester bound to `resource`, if any.
    pub fn requester_of(&self, resource: ResourceId) -> Option<RequesterId> {
        self.by_resource.get(&resource).copied()
    }

    /// Returns `true` if both lookups describe the same relation.
    pub fn is_symmetric(&self) -> bool {
        self.by_requester.len() == self.by_resource.len()
            && self
                .by_requester
                .iter()
                .all(|(req, res)| self.by_resource.get(res) == Some(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_lookup() {
        let mut table = BindingTable::new();
        table.bind(RequesterId(1), ResourceId(10)).unwrap();

        assert_eq!(table.resource_of(RequesterId(1)), Some(ResourceId(10)));
        assert_eq!(table.requester_of(ResourceId(10)), Some(RequesterId(1)));
        assert_eq!(table.len(), 1);
        assert!(table.is_symmetric());
    }

    #[test]
    fn test_double_bind_rejected_either_side() {
        let mut table = BindingTable::new();
        table.bind(RequesterId(1), ResourceId(10)).unwrap();

        assert!(table.bind(RequesterId(1), ResourceId(11)).is_err());
        assert!(table.bind(RequesterId(2), ResourceId(10)).is_err());
        assert_eq!(table.len(), 1);
        assert!(table.requester_of(ResourceId(11)).is_none());
    }

    #[test]
    fn test_unbind_clears_both_sides() {
        let mut table = BindingTable::new();
        table.bind(RequesterId(1), ResourceId(10)).unwrap();

        assert_eq!(table.unbind_resource(ResourceId(10)), Some(RequesterId(1)));
        assert!(table.resource_of(RequesterId(1)).is_none());
        assert!(table.is_empty());
        assert!(table.unbind_resource(ResourceId(10)).is_none());
    }
}
