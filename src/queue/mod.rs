//! Priority-ordered waiting queue.
//!
//! A generic binary min-heap over any [`HeapItem`]. Beyond the usual
//! insert / peek / extract-min, entries can be found, removed, or re-keyed
//! by identity, which the allocation engine needs for re-prioritization.
//!
//! # Design
//!
//! The heap keeps an `id -> index` map alongside the level-order array.
//! Every swap updates both, so `find_by_id` is O(1) and `remove_by_id` /
//! `update_priority` are O(log n) instead of a linear scan.
//!
//! `update_priority` is a remove followed by a fresh insert rather than a
//! decrease-key: removal always restores heap order before the insert, so
//! it is correct whether the key went up or down.

mod heap;
mod types;

pub use heap::PriorityQueue;
pub use types::HeapItem;
