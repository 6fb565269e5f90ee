//! Core trait for heap entries.

use std::hash::Hash;

/// An entry that can live in a [`PriorityQueue`](super::PriorityQueue).
///
/// Ordering follows the minimization convention: the entry with the
/// **smallest** key is extracted first. Every entry also carries an
/// identity that is independent of its key, so the queue can locate,
/// remove, or re-key an entry without scanning.
///
/// # Examples
///
/// ```
/// use u_bedalloc::queue::HeapItem;
///
/// struct Job {
///     id: u32,
///     priority: u8,
///     submitted: i64,
/// }
///
/// impl HeapItem for Job {
///     type Id = u32;
///     type Key = (u8, i64);
///     fn id(&self) -> u32 { self.id }
///     fn key(&self) -> (u8, i64) { (self.priority, self.submitted) }
/// }
/// ```
pub trait HeapItem {
    /// Identity type. Must be unique among entries of one queue.
    type Id: Copy + Eq + Hash + std::fmt::Debug;

    /// Ordering key. Lower keys are higher priority.
    type Key: Ord;

    /// Returns the identity of this entry.
    fn id(&self) -> Self::Id;

    /// Returns the current ordering key of this entry.
    fn key(&self) -> Self::Key;
}
