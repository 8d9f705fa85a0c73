//! Correlation from indexed records back to the caller's objects.

use crate::config::DuplicatePolicy;
use crate::error::EvalError;
use crate::index::RecordId;
use tracing::warn;

/// Maps each distinct record to the input object(s) it was flattened from.
///
/// Slots are addressed by [`RecordId`], so ids must be inserted in the order
/// the index hands them out.
#[derive(Debug)]
pub struct BackMap<'a, T> {
    slots: Vec<Vec<(usize, &'a T)>>,
    policy: DuplicatePolicy,
    collisions: usize,
}

impl<'a, T> BackMap<'a, T> {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            slots: Vec::new(),
            policy,
            collisions: 0,
        }
    }

    /// Associate `object` (at input `position`) with record `id`.
    pub fn insert(&mut self, id: RecordId, position: usize, object: &'a T) -> Result<(), EvalError> {
        let idx = id.index();
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, Vec::new);
        }

        let slot = &mut self.slots[idx];
        if let Some(&(first, _)) = slot.first() {
            self.collisions += 1;
            warn!(
                first,
                position,
                policy = ?self.policy,
                "Input objects flatten to identical records"
            );
            match self.policy {
                DuplicatePolicy::KeepFirst => {}
                DuplicatePolicy::KeepLast => {
                    slot.clear();
                    slot.push((position, object));
                }
                DuplicatePolicy::KeepAll => slot.push((position, object)),
                DuplicatePolicy::Reject => {
                    return Err(EvalError::DuplicateRecord {
                        first,
                        second: position,
                    })
                }
            }
        } else {
            slot.push((position, object));
        }
        Ok(())
    }

    /// Objects correlated with `id`, in input order.
    pub fn resolve(&self, id: RecordId) -> impl Iterator<Item = &'a T> + '_ {
        self.slots
            .get(id.index())
            .into_iter()
            .flatten()
            .map(|&(_, object)| object)
    }

    /// Number of objects that landed on an already occupied record
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
