//! Array-backed binary min-heap with an identity index.

use std::collections::HashMap;

use super::types::HeapItem;

/// Binary min-heap keyed by [`HeapItem::key`], addressable by [`HeapItem::id`].
///
/// Entries are stored in level order: the root at index 0 and the children
/// of index `i` at `2i + 1` and `2i + 2`. An auxiliary `id -> index` map is
/// kept in step with every swap, so lookup is O(1) and removal or
/// re-keying by id is O(log n).
///
/// # Examples
///
/// ```
/// use u_bedalloc::queue::{HeapItem, PriorityQueue};
///
/// #[derive(Debug)]
/// struct Job { id: u32, priority: u8 }
///
/// impl HeapItem for Job {
///     type Id = u32;
///     type Key = u8;
///     fn id(&self) -> u32 { self.id }
///     fn key(&self) -> u8 { self.priority }
/// }
///
/// let mut queue = PriorityQueue::new();
/// queue.insert(Job { id: 1, priority: 3 }).unwrap();
/// queue.insert(Job { id: 2, priority: 1 }).unwrap();
///
/// assert_eq!(queue.peek_min().map(|j| j.id), Some(2));
/// assert_eq!(queue.remove_by_id(2).map(|j| j.id), Some(2));
/// assert_eq!(queue.extract_min().map(|j| j.id), Some(1));
/// assert!(queue.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PriorityQueue<T: HeapItem> {
    items: Vec<T>,
    index: HashMap<T::Id, usize>,
}

impl<T: HeapItem> PriorityQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates an empty queue with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of entries in the queue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts an entry and sifts it up into place.
    ///
    /// Returns the entry back if another entry with the same id is
    /// already queued.
    pub fn insert(&mut self, item: T) -> Result<(), T> {
        let id = item.id();
        if self.index.contains_key(&id) {
            return Err(item);
        }
        let pos = self.items.len();
        self.items.push(item);
        self.index.insert(id, pos);
        self.sift_up(pos);
        Ok(())
    }

    /// Returns the minimum entry without removing it.
    pub fn peek_min(&self) -> Option<&T> {
        self.items.first()
    }

    /// Removes and returns the minimum entry.
    pub fn extract_min(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.take_at(0))
    }

    /// Looks up an entry by id, regardless of its heap position.
    pub fn find_by_id(&self, id: T::Id) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    /// Returns `true` if an entry with this id is queued.
    pub fn contains(&self, id: T::Id) -> bool {
        self.index.contains_key(&id)
    }

    /// Removes the entry with this id and restores heap order.
    ///
    /// The last entry is moved into the vacated slot and then sifted up
    /// if it is smaller than its new parent, otherwise down.
    pub fn remove_by_id(&mut self, id: T::Id) -> Option<T> {
        let pos = *self.index.get(&id)?;
        Some(self.take_at(pos))
    }

    /// Re-keys an entry: removes any queued entry with the same id, then
    /// inserts `item` with its current key.
    ///
    /// Returns the entry that was replaced, or `None` if the id was not
    /// queued (in which case `item` is simply inserted).
    pub fn update_priority(&mut self, item: T) -> Option<T> {
        let previous = self.remove_by_id(item.id());
        let pos = self.items.len();
        self.index.insert(item.id(), pos);
        self.items.push(item);
        self.sift_up(pos);
        previous
    }

    /// Read-only view of the backing array in level order.
    ///
    /// Intended for visualization; index `i` has children `2i + 1` and `2i + 2`.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Entry at a level-order index, if any.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Iterates entries in level order (not priority order).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Splits the backing array into tree levels: level 0 is the root,
    /// level `k` holds indices `2^k - 1 .. 2^(k+1) - 1`.
    pub fn levels(&self) -> Vec<&[T]> {
        let mut levels = Vec::new();
        let mut start = 0;
        let mut width = 1;
        while start < self.items.len() {
            let end = (start + width).min(self.items.len());
            levels.push(&self.items[start..end]);
            start += width;
            width *= 2;
        }
        levels
    }

    /// Checks heap order (parent key <= child key at every index) and
    /// that the id index agrees with the backing array.
    pub fn is_heap(&self) -> bool {
        if self.index.len() != self.items.len() {
            return false;
        }
        let ordered = (1..self.items.len())
            .all(|i| self.items[parent(i)].key() <= self.items[i].key());
        let indexed = self
            .items
            .iter()
            .enumerate()
            .all(|(pos, item)| self.index.get(&item.id()) == Some(&pos));
        ordered && indexed
    }

    fn take_at(&mut self, pos: usize) -> T {
        let removed = self.items.swap_remove(pos);
        self.index.remove(&removed.id());

        if pos < self.items.len() {
            self.index.insert(self.items[pos].id(), pos);
            if pos > 0 && self.items[pos].key() < self.items[parent(pos)].key() {
                self.sift_up(pos);
            } else {
                self.sift_down(pos);
            }
        }
        removed
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let up = parent(pos);
            if self.items[up].key() <= self.items[pos].key() {
                break;
            }
            self.swap(pos, up);
            pos = up;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;

            if left < len && self.items[left].key() < self.items[smallest].key() {
                smallest = left;
            }
            if right < len && self.items[right].key() < self.items[smallest].key() {
                smallest = right;
            }
            if smallest == pos {
                return;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.items.swap(a, b);
        self.index.insert(self.items[a].id(), a);
        self.index.insert(self.items[b].id(), b);
    }
}

impl<T: HeapItem> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}
