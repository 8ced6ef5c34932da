//! Append-only transcript and its flattened block view.
//!
//! The message list lives behind an `Arc` that is swapped on every change and never mutated
//! through a shared reference, so derived views can detect change with `Arc::ptr_eq`.

pub mod flatten;
pub mod tokenizer;

use std::sync::Arc;

use crate::core::message::Message;

pub use flatten::{flatten, FlattenCache};

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Arc<Vec<Message>>,
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &Arc<Vec<Message>> {
        &self.messages
    }

    /// Bumped on every replacement of the message list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn push(&mut self, message: Message) {
        self.replace_with(|messages| messages.push(message));
    }

    /// Rewrites the message at `index` into a fresh list. No-op when out of range.
    pub fn update_at(&mut self, index: usize, update: impl FnOnce(&mut Message)) {
        if index >= self.messages.len() {
            return;
        }
        self.replace_with(|messages| {
            if let Some(message) = messages.get_mut(index) {
                update(message);
            }
        });
    }

    /// Removes the message at `index` when `predicate` holds. Returns whether it was removed.
    pub fn remove_at_if(
        &mut self,
        index: usize,
        predicate: impl FnOnce(&Message) -> bool,
    ) -> bool {
        if !self.messages.get(index).is_some_and(predicate) {
            return false;
        }
        self.replace_with(|messages| {
            messages.remove(index);
        });
        true
    }

    pub fn clear(&mut self) {
        self.replace_with(Vec::clear);
    }

    fn replace_with(&mut self, change: impl FnOnce(&mut Vec<Message>)) {
        let mut next = Vec::clone(&self.messages);
        change(&mut next);
        self.messages = Arc::new(next);
        self.revision += 1;
    }
}
