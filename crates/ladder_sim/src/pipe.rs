//! Fixed-latency alignment of predictions with hardware responses.
//!
//! A [`DelayPipe`] of depth `N` is a circular buffer of `N + 1` slots whose
//! write and read cursors are always `N` slots apart. A value staged with
//! [`push_back`](DelayPipe::push_back) during cycle `t` becomes the
//! [`head`](DelayPipe::head) during cycle `t + N` and only then.

/// A fixed-depth delay line.
///
/// The caller must stage exactly one value between successive calls to
/// [`step`](Self::step), including an explicit "nothing expected" value on
/// idle cycles. This is not enforced: a missing push leaves the slot holding
/// whatever it held `N + 1` cycles earlier.
#[derive(Debug, Clone)]
pub struct DelayPipe<T> {
    slots: Vec<T>,
    wr: usize,
    rd: usize,
}

impl<T: Clone + Default> DelayPipe<T> {
    /// Creates a cleared pipe with latency `depth`.
    pub fn new(depth: usize) -> Self {
        let mut pipe = Self {
            slots: vec![T::default(); depth + 1],
            wr: 0,
            rd: 0,
        };
        pipe.clear();
        pipe
    }

    /// The latency of this pipe in cycles.
    pub fn depth(&self) -> usize {
        self.slots.len() - 1
    }

    /// Stages `value` at the write cursor, replacing anything staged there.
    pub fn push_back(&mut self, value: T) {
        self.slots[self.wr] = value;
    }

    /// The value due in the current cycle.
    pub fn head(&self) -> &T {
        &self.slots[self.rd]
    }

    /// Advances both cursors by one slot.
    pub fn step(&mut self) {
        let n = self.slots.len();
        self.wr = (self.wr + 1) % n;
        self.rd = (self.rd + 1) % n;
    }

    /// Resets every slot to its default and the cursors to their initial offset.
    pub fn clear(&mut self) {
        self.slots.fill(T::default());
        self.wr = self.depth();
        self.rd = 0;
    }
}
