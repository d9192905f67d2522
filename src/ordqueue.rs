//! Fan-in of per-segment frame batches that arrive in any order
//!
//! Every segment index must be pushed exactly once, even if its batch is empty.
//! The iterator yields batches strictly by index, holding back the ones that arrived early.

use crate::error::GifResult;
use crossbeam_channel::{Receiver, Sender};
use std::collections::BTreeMap;
use std::iter::FusedIterator;

pub struct OrdQueue<T> {
    sender: Sender<(usize, T)>,
}

impl<T> Clone for OrdQueue<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

pub struct OrdQueueIter<T> {
    receiver: Receiver<(usize, T)>,
    next_index: usize,
    early: BTreeMap<usize, T>,
}

/// `capacity` should be the number of indices that will be pushed,
/// so that pushing never blocks before the iterator starts draining.
pub fn new<T>(capacity: usize) -> (OrdQueue<T>, OrdQueueIter<T>) {
    let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));
    (OrdQueue { sender }, OrdQueueIter {
        receiver,
        next_index: 0,
        early: BTreeMap::new(),
    })
}

impl<T: Send> OrdQueue<T> {
    #[inline]
    pub fn push(&self, index: usize, batch: T) -> GifResult<()> {
        self.sender.send((index, batch))?;
        Ok(())
    }
}

impl<T> FusedIterator for OrdQueueIter<T> {}

impl<T> Iterator for OrdQueueIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while !self.early.contains_key(&self.next_index) {
            match self.receiver.recv() {
                Ok((index, batch)) => {
                    self.early.insert(index, batch);
                },
                // All senders gone. A missing index is skipped, the rest still come out in order.
                Err(_) => break,
            }
        }

        let (index, batch) = self.early.pop_first()?;
        self.next_index = index + 1;
        Some(batch)
    }
}
