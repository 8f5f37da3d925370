//! Minimum-priority frontier shared by the best-first searches.

use std::{cmp::Ordering, collections::BinaryHeap};

/// Priority queue yielding the entry with the lowest priority first.
///
/// Entries with equal priority are yielded in insertion order, which keeps
/// every search built on top of the frontier deterministic.
#[derive(Debug)]
pub struct MinFrontier<T> {
    heap: BinaryHeap<Entry<T>>,
    next_sequence: u64,
}

impl<T> MinFrontier<T> {
    /// Creates an empty frontier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Queues `item` with the provided priority.
    pub fn push(&mut self, item: T, priority: f32) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Entry {
            priority,
            sequence,
            item,
        });
    }

    /// Removes the lowest-priority entry, returning it with its priority.
    pub fn pop(&mut self) -> Option<(T, f32)> {
        self.heap.pop().map(|entry| (entry.item, entry.priority))
    }

    /// Priority of the entry that `pop` would return next.
    #[must_use]
    pub fn peek_priority(&self) -> Option<f32> {
        self.heap.peek().map(|entry| entry.priority)
    }

    /// Reports whether the frontier holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl<T> Default for MinFrontier<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Entry<T> {
    priority: f32,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse both keys.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::MinFrontier;

    #[test]
    fn pops_lowest_priority_first() {
        let mut frontier = MinFrontier::new();
        frontier.push('c', 3.0);
        frontier.push('a', 1.0);
        frontier.push('b', 2.0);
        assert_eq!(frontier.peek_priority(), Some(1.0));
        assert_eq!(frontier.pop(), Some(('a', 1.0)));
        assert_eq!(frontier.pop(), Some(('b', 2.0)));
        assert_eq!(frontier.pop(), Some(('c', 3.0)));
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn ties_resolve_in_insertion_order() {
        let mut frontier = MinFrontier::new();
        frontier.push("first", 5.0);
        frontier.push("second", 5.0);
        frontier.push("third", 5.0);
        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.pop().map(|(item, _)| item), Some("first"));
        assert_eq!(frontier.pop().map(|(item, _)| item), Some("second"));
        assert_eq!(frontier.pop().map(|(item, _)| item), Some("third"));
        assert!(frontier.is_empty());
    }
}
