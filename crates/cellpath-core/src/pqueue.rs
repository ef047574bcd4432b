pub use std::cmp::Reverse;

/// Binary min-heap ordered by a caller-supplied [`Comparer`].
///
/// There is no decrease-key operation. Searches push a fresh entry whenever an item improves and
/// discard outdated entries when they are popped.
///
/// The layout of the heap depends only on the sequence of pushes and pops, so equal items are
/// always popped in the same order for the same sequence of operations.
pub struct PriorityQueue<T, C> {
    cmp: C,
    heap: Vec<T>,
}

/// Trait for ordering items in a [`PriorityQueue`].
pub trait Comparer<T> {
    /// Perform `<=` comparison, where "lesser" items are popped first.
    fn le(&self, lhs: &T, rhs: &T) -> bool;
}

/// Orders items by a key extracted from each item.
#[derive(Clone, Copy, Debug)]
pub struct Key<F>(pub F);

impl<T, C: Comparer<T>> PriorityQueue<T, C> {
    /// Creates an empty queue.
    pub fn new(cmp: C) -> Self {
        PriorityQueue { cmp, heap: vec![] }
    }

    /// Creates an empty queue with space for at least `capacity` items.
    pub fn with_capacity(cmp: C, capacity: usize) -> Self {
        PriorityQueue {
            cmp,
            heap: Vec::with_capacity(capacity),
        }
    }

    /// Adds an item.
    pub fn push(&mut self, item: T) {
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes and returns the least item, if any.
    pub fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let ret = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(ret)
    }

    /// Returns the least item without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    /// Number of items, including outdated entries that have not been popped yet.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Removes all items, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent_index = (index - 1) / 2;
            if self.cmp.le(&self.heap[parent_index], &self.heap[index]) {
                break;
            }
            self.heap.swap(parent_index, index);
            index = parent_index;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let child_1_index = index * 2 + 1;
            if child_1_index >= self.heap.len() {
                break;
            }

            let child_2_index = child_1_index + 1;
            let child_index = if child_2_index < self.heap.len()
                && !self
                    .cmp
                    .le(&self.heap[child_1_index], &self.heap[child_2_index])
            {
                child_2_index
            } else {
                child_1_index
            };

            if self.cmp.le(&self.heap[index], &self.heap[child_index]) {
                break;
            }

            self.heap.swap(index, child_index);
            index = child_index;
        }
    }
}

impl<T, K: PartialOrd, F: Fn(&T) -> K> Comparer<T> for Key<F> {
    fn le(&self, lhs: &T, rhs: &T) -> bool {
        (self.0)(lhs) <= (self.0)(rhs)
    }
}

impl<T, C: Comparer<T>> Comparer<T> for Reverse<C> {
    fn le(&self, lhs: &T, rhs: &T) -> bool {
        self.0.le(rhs, lhs)
    }
}

macro_rules! tuple_comparer_impl {
    ($($typ:ident $index:tt)*) => {
        impl<T, $($typ: Comparer<T>),*> Comparer<T> for ($($typ,)*) {
            fn le(&self, lhs: &T, rhs: &T) -> bool {
                tuple_comparer_impl!(@cmp self lhs rhs $($index)*)
            }
        }
    };
    (@cmp $self:ident $lhs:ident $rhs:ident $last:tt) => {
        $self.$last.le($lhs, $rhs)
    };
    (@cmp $self:ident $lhs:ident $rhs:ident $next:tt $($rest:tt)+) => {{
        let l_leq_r = $self.$next.le($lhs, $rhs);
        let r_leq_l = $self.$next.le($rhs, $lhs);
        if l_leq_r && r_leq_l {
            tuple_comparer_impl!(@cmp $self $lhs $rhs $($rest)*)
        } else {
            l_leq_r
        }
    }};
}

tuple_comparer_impl!(A 0);
tuple_comparer_impl!(A 0 B 1);
tuple_comparer_impl!(A 0 B 1 C 2);
tuple_comparer_impl!(A 0 B 1 C 2 D 3);
