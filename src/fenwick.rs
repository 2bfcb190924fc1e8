//! Binary-indexed (Fenwick) tree over per-node length deltas.
//!
//! Keyed by `nodeIndex` (spec §3.1/§4.3): supports O(log n) point update
//! and prefix-sum query, dynamic growth, and a binary-search helper used
//! by `pointAtStringLocation` (§4.3). Grounded on the prefix-aggregate
//! idiom in `tree_nav.rs`'s O(log n) line/byte walks, generalized from a
//! recursive tree descent into an explicit array.
//!
//! Indices are 0-based from the caller's perspective; the internal array
//! is 1-based, the classic Fenwick layout.

/// Growth policy from spec §4.5 Stage 4: never shrink, double or pad by
/// at least 100 slots, whichever is larger.
fn grown_capacity(current: usize, required: usize) -> usize {
    (current * 2).max(required + 100)
}

#[derive(Debug, Clone)]
pub struct FenwickTree {
    // 1-indexed; tree[0] is unused.
    tree: Vec<i64>,
    len: usize,
}

impl FenwickTree {
    pub fn new(capacity: usize) -> Self {
        Self { tree: vec![0; capacity + 1], len: capacity }
    }

    pub fn capacity(&self) -> usize {
        self.len
    }

    /// Grows the backing array to cover at least `required` indices,
    /// preserving every stored sum. Amortized O(1) per logical growth.
    pub fn ensure_capacity(&mut self, required: usize) {
        if required <= self.len {
            return;
        }
        let new_cap = grown_capacity(self.len, required);
        self.tree.resize(new_cap + 1, 0);
        self.len = new_cap;
    }

    /// Point update: adds `delta` at 0-based `index`.
    pub fn update(&mut self, index: usize, delta: i64) {
        if delta == 0 {
            return;
        }
        self.ensure_capacity(index + 1);
        let mut i = index + 1; // to 1-based
        while i <= self.len {
            self.tree[i] += delta;
            i += i & i.wrapping_neg();
        }
    }

    /// Inclusive prefix sum over `[0, index]`. Returns 0 for an
    /// out-of-range negative-length prefix (`index` wrapping below 0 is
    /// not representable since `index: usize`; callers use `prefix_sum`
    /// with a `None` sentinel for "before index 0" via `prefix_sum_exclusive`).
    pub fn prefix_sum(&self, index: usize) -> i64 {
        if self.len == 0 {
            return 0;
        }
        let mut i = (index + 1).min(self.len);
        let mut sum = 0i64;
        while i > 0 {
            sum += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    /// Prefix sum over `[0, index)`, i.e. the absolute start of the
    /// content window belonging to node at `index` (spec invariant 6).
    pub fn prefix_sum_exclusive(&self, index: usize) -> i64 {
        if index == 0 {
            0
        } else {
            self.prefix_sum(index - 1)
        }
    }

    pub fn range_query(&self, start: usize, end_inclusive: usize) -> i64 {
        if end_inclusive < start {
            return 0;
        }
        self.prefix_sum(end_inclusive) - self.prefix_sum_exclusive(start)
    }

    pub fn total_sum(&self) -> i64 {
        if self.len == 0 {
            0
        } else {
            self.prefix_sum(self.len - 1)
        }
    }

    /// Binary search over the implicit prefix-sum array for the first
    /// 0-based index whose inclusive prefix sum is `>= target`. All
    /// stored deltas are assumed non-negative in aggregate (lengths),
    /// so prefix sums are monotonic. Returns `None` if no index
    /// satisfies the condition (target exceeds the total sum).
    pub fn find_first_index_with_prefix(&self, target: i64) -> Option<usize> {
        if target <= 0 {
            return Some(0).filter(|_| self.len > 0);
        }
        if target > self.total_sum() {
            return None;
        }

        // Standard Fenwick descent: find largest 1-indexed position `pos`
        // such that prefix_sum(pos) < target, then the answer is pos
        // (0-based) since prefix_sum(pos+1) >= target.
        let mut pos = 0usize;
        let mut remaining = target - 1; // looking for the first pos with cumulative >= target
        let mut log = 1usize;
        while (log << 1) <= self.len {
            log <<= 1;
        }
        let mut step = log;
        let mut acc = 0i64;
        while step > 0 {
            let next = pos + step;
            if next <= self.len && acc + self.tree[next] <= remaining {
                pos = next;
                acc += self.tree[next];
            }
            step >>= 1;
        }
        let candidate = pos; // 0-based index of first position with prefix_sum > remaining == target-1
        if candidate >= self.len {
            None
        } else {
            Some(candidate)
        }
    }
}
