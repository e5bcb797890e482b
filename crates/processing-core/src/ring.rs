//! Fixed-capacity circular history.

/// Circular buffer that keeps the most recent `capacity` samples.
///
/// Pushing never fails: once full, each push overwrites the oldest entry.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: Vec<T>,
    capacity: usize,
    /// Index of the oldest entry once the buffer is full.
    head: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.items.len() < self.capacity {
            self.items.push(value);
        } else {
            self.items[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items[self.head..]
            .iter()
            .chain(self.items[..self.head].iter())
    }

    /// Chronologically ordered snapshot.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Most recently pushed value.
    pub fn latest(&self) -> Option<&T> {
        if self.items.is_empty() {
            None
        } else if self.items.len() < self.capacity {
            self.items.last()
        } else {
            let idx = (self.head + self.capacity - 1) % self.capacity;
            self.items.get(idx)
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn partial_fill_keeps_push_order() {
        let mut ring = RingBuffer::new(4);
        ring.push(1);
        ring.push(2);
        ring.push(3);
        assert_eq!(ring.to_vec(), vec![1, 2, 3]);
        assert_eq!(ring.latest(), Some(&3));
        assert!(!ring.is_full());
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut ring = RingBuffer::new(3);
        for v in 1..=7 {
            ring.push(v);
        }
        assert_eq!(ring.to_vec(), vec![5, 6, 7]);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.latest(), Some(&7));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut ring = RingBuffer::new(0);
        ring.push('a');
        ring.push('b');
        assert_eq!(ring.capacity(), 1);
        assert_eq!(ring.to_vec(), vec!['b']);
    }

    #[test]
    fn clear_resets_order() {
        let mut ring = RingBuffer::new(2);
        ring.push(1);
        ring.push(2);
        ring.push(3);
        ring.clear();
        assert!(ring.is_empty());
        ring.push(9);
        assert_eq!(ring.to_vec(), vec![9]);
    }

    proptest! {
        #[test]
        fn snapshot_is_tail_of_pushes(
            capacity in 1usize..80,
            values in proptest::collection::vec(any::<i32>(), 0..200),
        ) {
            let mut ring = RingBuffer::new(capacity);
            for v in &values {
                ring.push(*v);
            }
            let keep = values.len().min(capacity);
            let expected = values[values.len() - keep..].to_vec();
            prop_assert_eq!(ring.to_vec(), expected);
        }
    }
}
