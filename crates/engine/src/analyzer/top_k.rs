use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Heap entry ordered by key, then by arrival.
#[derive(Debug, Clone)]
struct Ranked<T> {
    key: f64,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Keeps the `capacity` items with the largest keys seen so far.
///
/// Backed by a min-heap: a new item only gets in once the heap is full if
/// its key is strictly greater than the current minimum, which is then
/// evicted. Among equal keys the earliest arrival is evicted first.
#[derive(Debug, Clone)]
pub struct TopK<T> {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked<T>>>,
    next_seq: u64,
}

impl<T> TopK<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
            next_seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Smallest key currently held.
    pub fn min_key(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.key)
    }

    /// Would an item with this key be kept right now?
    pub fn accepts(&self, key: f64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            return true;
        }
        self.min_key().map_or(true, |min| key > min)
    }

    /// Offer an item; `make` is only called when the item is kept.
    /// Returns whether it was kept.
    pub fn offer_with<F>(&mut self, key: f64, make: F) -> bool
    where
        F: FnOnce() -> T,
    {
        if !self.accepts(key) {
            return false;
        }

        let entry = Ranked {
            key,
            seq: self.next_seq,
            item: make(),
        };
        self.next_seq += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(entry));
        } else if let Some(mut min) = self.heap.peek_mut() {
            *min = Reverse(entry);
        }
        true
    }

    pub fn offer(&mut self, key: f64, item: T) -> bool {
        self.offer_with(key, || item)
    }

    /// Fold another set into this one, keeping the overall largest `capacity`.
    pub fn merge(&mut self, other: TopK<T>) {
        for (key, item) in other.into_sorted_desc() {
            if !self.offer(key, item) && self.heap.len() >= self.capacity {
                // sorted descending: nothing after this can get in either
                break;
            }
        }
    }

    /// Items by key descending; equal keys keep arrival order.
    pub fn sorted_desc(&self) -> Vec<(f64, &T)> {
        let mut entries: Vec<&Ranked<T>> = self.heap.iter().map(|Reverse(e)| e).collect();
        entries.sort_by(|a, b| b.key.total_cmp(&a.key).then_with(|| a.seq.cmp(&b.seq)));
        entries.into_iter().map(|e| (e.key, &e.item)).collect()
    }

    pub fn into_sorted_desc(self) -> Vec<(f64, T)> {
        let mut entries: Vec<Ranked<T>> = self.heap.into_iter().map(|Reverse(e)| e).collect();
        entries.sort_by(|a, b| b.key.total_cmp(&a.key).then_with(|| a.seq.cmp(&b.seq)));
        entries.into_iter().map(|e| (e.key, e.item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<T>(top: &TopK<T>) -> Vec<f64> {
        top.sorted_desc().into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_keeps_largest() {
        let mut top = TopK::new(2);
        for d in [10.0, 50.0, 20.0, 100.0, 5.0] {
            top.offer(d, ());
        }
        assert_eq!(keys(&top), vec![100.0, 50.0]);
    }

    #[test]
    fn test_under_capacity_keeps_everything() {
        let mut top = TopK::new(10);
        for d in [3.0, 1.0, 2.0] {
            top.offer(d, ());
        }
        assert_eq!(keys(&top), vec![3.0, 2.0, 1.0]);
        assert_eq!(top.len(), 3);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut top = TopK::new(0);
        assert!(!top.offer(1.0, "x"));
        assert!(top.is_empty());
    }

    #[test]
    fn test_equal_key_does_not_evict() {
        let mut top = TopK::new(2);
        top.offer(5.0, "a");
        top.offer(7.0, "b");
        assert!(!top.offer(5.0, "c"));

        let items: Vec<_> = top.sorted_desc().into_iter().map(|(_, i)| *i).collect();
        assert_eq!(items, vec!["b", "a"]);
    }

    #[test]
    fn test_offer_with_is_lazy() {
        let mut top = TopK::new(1);
        top.offer(10.0, String::from("kept"));

        let mut called = false;
        top.offer_with(1.0, || {
            called = true;
            String::from("dropped")
        });
        assert!(!called);
    }

    #[test]
    fn test_permutation_invariance() {
        let values: Vec<f64> = (0..50).map(|i| ((i * 37) % 101) as f64).collect();
        let mut expected = values.clone();
        expected.sort_by(|a, b| b.total_cmp(a));
        expected.truncate(7);

        let orders: Vec<Vec<f64>> = vec![
            values.clone(),
            values.iter().rev().cloned().collect(),
            {
                let mut sorted = values.clone();
                sorted.sort_by(|a, b| a.total_cmp(b));
                sorted
            },
            {
                let mut interleaved = Vec::new();
                let (evens, odds): (Vec<_>, Vec<_>) =
                    values.iter().enumerate().partition(|(i, _)| i % 2 == 0);
                interleaved.extend(odds.into_iter().map(|(_, v)| *v));
                interleaved.extend(evens.into_iter().map(|(_, v)| *v));
                interleaved
            },
        ];

        for order in orders {
            let mut top = TopK::new(7);
            for v in order {
                top.offer(v, ());
            }
            assert_eq!(keys(&top), expected);
        }
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let values: Vec<f64> = (1..=40).map(|i| ((i * 13) % 41) as f64).collect();

        let mut single = TopK::new(5);
        for v in &values {
            single.offer(*v, ());
        }

        let (left_values, right_values) = values.split_at(17);
        let mut left = TopK::new(5);
        let mut right = TopK::new(5);
        left_values.iter().for_each(|v| {
            left.offer(*v, ());
        });
        right_values.iter().for_each(|v| {
            right.offer(*v, ());
        });

        let mut merged_lr = left.clone();
        merged_lr.merge(right.clone());
        let mut merged_rl = right;
        merged_rl.merge(left);

        assert_eq!(keys(&merged_lr), keys(&single));
        assert_eq!(keys(&merged_rl), keys(&single));
    }
}
