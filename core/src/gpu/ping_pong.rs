//! Double buffering

/// A pair of buffers where one is written while the other is read.
///
/// `swap()` makes the previously written buffer the one that is read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PingPong<T> {
    /// The two buffers.
    buffers: [T; 2],

    /// Index of the buffer currently written.
    active: usize,
}

impl<T> PingPong<T> {
    /// Returns a new pair with `a` active.
    ///
    /// * `a` - Initially active buffer.
    /// * `b` - Initially previous buffer.
    pub fn new(a: T, b: T) -> Self {
        Self {
            buffers: [a, b],
            active: 0,
        }
    }

    /// Returns the buffer to write into.
    pub fn active(&self) -> &T {
        &self.buffers[self.active]
    }

    /// Returns the buffer written before the last swap.
    pub fn previous(&self) -> &T {
        &self.buffers[1 - self.active]
    }

    /// Exchanges the roles of the two buffers.
    pub fn swap(&mut self) {
        self.active = 1 - self.active;
    }

    /// Consumes the pair and returns both buffers.
    pub fn into_inner(self) -> [T; 2] {
        self.buffers
    }
}
