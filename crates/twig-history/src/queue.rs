use std::collections::{HashSet, VecDeque};

use twig_types::ObjectId;

use crate::error::{HistoryError, HistoryResult};

/// Ordered, duplicate-free queue of commit ids.
///
/// Pushing an id that is already queued is ignored, so insertion order is
/// the order of first appearance.
#[derive(Clone, Debug, Default)]
pub struct AncestorQueue {
    order: VecDeque<ObjectId>,
    members: HashSet<ObjectId>,
}

impl AncestorQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` unless it is already queued. Returns whether it was added.
    pub fn push(&mut self, id: ObjectId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    /// Remove and return the oldest id.
    pub fn pop_front(&mut self) -> Option<ObjectId> {
        let id = self.order.pop_front()?;
        self.members.remove(&id);
        Some(id)
    }

    /// The oldest id, if any.
    pub fn front(&self) -> Option<&ObjectId> {
        self.order.front()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Discard ids from the front until `id` is at the front.
    ///
    /// Fails without modifying the queue if `id` is not queued.
    pub fn pop_until(&mut self, id: &ObjectId) -> HistoryResult<()> {
        if !self.contains(id) {
            return Err(HistoryError::NotQueued(*id));
        }
        while self.front() != Some(id) {
            self.pop_front();
        }
        Ok(())
    }

    /// Iterate in queue order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectId> {
        self.order.iter()
    }

    /// Consume the queue into a vector in queue order.
    pub fn into_vec(self) -> Vec<ObjectId> {
        self.order.into()
    }
}

impl Extend<ObjectId> for AncestorQueue {
    fn extend<I: IntoIterator<Item = ObjectId>>(&mut self, iter: I) {
        for id in iter {
            self.push(id);
        }
    }
}

impl FromIterator<ObjectId> for AncestorQueue {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}
