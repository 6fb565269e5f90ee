//! Allocation engine configuration.

use crate::model::Urgency;

use super::error::AllocationError;

/// Configuration for an [`AllocationEngine`](super::AllocationEngine).
///
/// # Examples
///
/// ```
/// use u_bedalloc::allocation::AllocatorConfig;
///
/// let config = AllocatorConfig::default()
///     .with_urgency_range(1, 5)
///     .with_queue_capacity(64);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_urgency, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocatorConfig {
    /// Most urgent accepted level (inclusive).
    pub min_urgency: u8,
    /// Least urgent accepted level (inclusive).
    pub max_urgency: u8,
    /// Initial capacity hint for the waiting queue.
    pub queue_capacity: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            min_urgency: 1,
            max_urgency: 3,
            queue_capacity: 16,
        }
    }
}

impl AllocatorConfig {
    /// Sets the accepted urgency range (inclusive on both ends).
    pub fn with_urgency_range(mut self, min: u8, max: u8) -> Self {
        self.min_urgency = min;
        self.max_urgency = max;
        self
    }

    /// Sets the initial queue capacity.
    pub fn with_queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_urgency > self.max_urgency {
            return Err(format!(
                "min_urgency ({}) must not exceed max_urgency ({})",
                self.min_urgency, self.max_urgency
            ));
        }
        Ok(())
    }

    /// Checks a raw urgency level against the accepted range.
    pub fn check_urgency(&self, level: u8) -> Result<Urgency, AllocationError> {
        if level < self.min_urgency || level > self.max_urgency {
            return Err(AllocationError::InvalidUrgency {
                value: level,
                min: self.min_urgency,
                max: self.max_urgency,
            });
        }
        Ok(Urgency(level))
    }
}
