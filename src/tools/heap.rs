//! Indexed priority queue used twice by `huffman`: once to merge symbol
//! frequencies into code lengths, once to enumerate symbols for canonical
//! code assignment.
//!
//! This is a direct port of the array-based heap in
//! `examples/original_source/comp.c` (`PriorityQueue`/`putPrio`/`getPrio`).
//! It is a *max*-heap over the stored `priority` value: `pop` always returns
//! the element with the largest priority currently queued. `huffman` stores
//! `-freq` as the priority so that the symbol with the smallest frequency
//! comes out first, matching standard Huffman merge order. (spec.md's prose
//! calls this a "min-heap"; the reference code it is distilled from is
//! unambiguously a max-heap over the same numbers — see DESIGN.md.)

/// 1-indexed binary max-heap over `(payload, priority)` pairs. Slot 0 is
/// scratch space holding a copy of the most-recently-popped element, so
/// callers can read its priority after the pop (`last_priority`).
pub struct IndexedPriorityQueue {
    top: usize,
    data: Vec<usize>,
    priority: Vec<i64>,
}

impl IndexedPriorityQueue {
    /// `capacity` must be at least as large as the number of `push` calls
    /// ever made against this queue.
    pub fn create(capacity: usize) -> Self {
        Self {
            top: 1,
            data: vec![0; capacity + 2],
            priority: vec![0; capacity + 2],
        }
    }

    pub fn len(&self) -> usize {
        self.top - 1
    }

    pub fn is_empty(&self) -> bool {
        self.top <= 1
    }

    pub fn push(&mut self, payload: usize, priority: i64) {
        let mut i = self.top;
        self.top += 1;
        while i > 1 {
            let parent = i >> 1;
            if self.priority[parent] > priority {
                break;
            }
            self.priority[i] = self.priority[parent];
            self.data[i] = self.data[parent];
            i = parent;
        }
        self.priority[i] = priority;
        self.data[i] = payload;
    }

    /// Removes and returns the payload with the largest priority. Panics if
    /// the queue is empty; callers are expected to check `len`/`is_empty`
    /// first, exactly as `generateLength`/`generatePrefix` track `prio.top`.
    pub fn pop(&mut self) -> usize {
        let ret = self.data[1];
        self.data[0] = self.data[1];
        self.priority[0] = self.priority[1];
        assert!(self.top > 1, "pop on empty IndexedPriorityQueue");
        self.top -= 1;
        let mut i = 1;
        loop {
            let mut child = i << 1;
            if child >= self.top {
                break;
            }
            if self.priority[child] < self.priority[child + 1] {
                child += 1;
            }
            if self.priority[child] <= self.priority[self.top] {
                break;
            }
            self.data[i] = self.data[child];
            self.priority[i] = self.priority[child];
            i = child;
        }
        self.data[i] = self.data[self.top];
        self.priority[i] = self.priority[self.top];
        ret
    }

    /// Priority of the element most recently returned by `pop`.
    pub fn last_priority(&self) -> i64 {
        self.priority[0]
    }
}
