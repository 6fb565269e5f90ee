//! Resources (beds) that requesters are bound to.

use std::fmt;

/// Unique resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type classification of a resource.
///
/// Informational only: matching does not check it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    /// Intensive care.
    Icu,
    /// Regular ward.
    RegularWard,
    /// Private room.
    PrivateRoom,
    /// Anything without a more specific classification.
    General,
    /// An explicit label outside the built-in set.
    Other(String),
}

impl ResourceKind {
    /// Derives the kind from a location label such as `"ICU-101"` or
    /// `"Ward-A-001"`. Case-insensitive; first match wins in the order
    /// ICU, WARD, PRIVATE.
    pub fn from_location(location: &str) -> Self {
        let upper = location.to_uppercase();
        if upper.contains("ICU") {
            ResourceKind::Icu
        } else if upper.contains("WARD") {
            ResourceKind::RegularWard
        } else if upper.contains("PRIVATE") {
            ResourceKind::PrivateRoom
        } else {
            ResourceKind::General
        }
    }

    /// Parses a display label back into a kind.
    pub fn from_label(label: &str) -> Self {
        match label {
            "ICU" => ResourceKind::Icu,
            "Regular Ward" => ResourceKind::RegularWard,
            "Private Room" => ResourceKind::PrivateRoom,
            "General" => ResourceKind::General,
            other => ResourceKind::Other(other.to_string()),
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            ResourceKind::Icu => "ICU",
            ResourceKind::RegularWard => "Regular Ward",
            ResourceKind::PrivateRoom => "Private Room",
            ResourceKind::General => "General",
            ResourceKind::Other(label) => label,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resource record.
///
/// `occupied` is maintained by the allocation engine and is `true` exactly
/// when the engine holds a binding for this id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    /// Unique identifier.
    pub id: ResourceId,
    /// Location label, e.g. `"ICU-101"`.
    pub location: String,
    /// Type classification.
    pub kind: ResourceKind,
    /// Occupancy flag.
    pub occupied: bool,
}

impl Resource {
    /// Creates a free resource whose kind is derived from `location`.
    pub fn new(id: u32, location: impl Into<String>) -> Self {
        let location = location.into();
        let kind = ResourceKind::from_location(&location);
        Self::with_kind(id, location, kind)
    }

    /// Creates a free resource with an explicit kind.
    pub fn with_kind(id: u32, location: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: ResourceId(id),
            location: location.into(),
            kind,
            occupied: false,
        }
    }
}
