//! FIFO list of requests suspended behind an in-flight refresh.

use std::collections::VecDeque;

/// Waiters in arrival order.
#[derive(Debug)]
pub struct PendingQueue<W> {
    waiters: VecDeque<W>,
}

impl<W> PendingQueue<W> {
    pub fn new() -> Self {
        Self {
            waiters: VecDeque::new(),
        }
    }

    pub fn push(&mut self, waiter: W) {
        self.waiters.push_back(waiter);
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Take every waiter, oldest first, leaving the queue empty.
    pub fn drain(&mut self) -> impl Iterator<Item = W> {
        std::mem::take(&mut self.waiters).into_iter()
    }
}

impl<W> Default for PendingQueue<W> {
    fn default() -> Self {
        Self::new()
    }
}
