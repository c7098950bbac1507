use serde::{Deserialize, Serialize};

/// Anything stored in a [`Collection`] is addressed by a stable string id.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Items that can be pinned to the top of a listing.
pub trait Pinnable {
    fn is_pinned(&self) -> bool;
    fn set_pinned(&mut self, pinned: bool);
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CollectionError {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("duplicate id: {0}")]
    DuplicateId(String),
}

/// Ordered list of keyed items. Order is the on-screen order and the persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection { items: Vec::new() }
    }
}

impl<T: Keyed> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Collection { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.key() == id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn prepend(&mut self, item: T) -> Result<(), CollectionError> {
        self.ensure_unique(item.key())?;
        self.items.insert(0, item);
        Ok(())
    }

    pub fn append(&mut self, item: T) -> Result<(), CollectionError> {
        self.ensure_unique(item.key())?;
        self.items.push(item);
        Ok(())
    }

    pub fn update<F>(&mut self, id: &str, f: F) -> Result<(), CollectionError>
    where
        F: FnOnce(&mut T),
    {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.key() == id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        f(item);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<T, CollectionError> {
        let idx = self
            .position(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        Ok(self.items.remove(idx))
    }

    /// Drops every item the predicate rejects and returns how many were removed.
    pub fn for_each_mut<F>(&mut self, f: F)
    where
        F: FnMut(&mut T),
    {
        self.items.iter_mut().for_each(f);
    }

    pub fn retain<F>(&mut self, f: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(f);
        before - self.items.len()
    }

    /// Array-move within the list. Returns false when nothing moved.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        array_move(&mut self.items, from, to)
    }

    /// Moves the item with `id` to position `to`.
    pub fn move_to(&mut self, id: &str, to: usize) -> Result<bool, CollectionError> {
        let from = self
            .position(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        Ok(self.reorder(from, to))
    }

    fn ensure_unique(&self, id: &str) -> Result<(), CollectionError> {
        if self.contains(id) {
            return Err(CollectionError::DuplicateId(id.to_string()));
        }
        Ok(())
    }
}

impl<T: Keyed + Pinnable> Collection<T> {
    /// Flips the pin flag and returns the new value.
    pub fn toggle_pin(&mut self, id: &str) -> Result<bool, CollectionError> {
        let mut pinned = false;
        self.update(id, |item| {
            pinned = !item.is_pinned();
            item.set_pinned(pinned);
        })?;
        Ok(pinned)
    }

    /// Pinned items first, each group in stored order.
    pub fn pinned_first(&self) -> Vec<&T> {
        let (mut pinned, rest): (Vec<&T>, Vec<&T>) =
            self.items.iter().partition(|item| item.is_pinned());
        pinned.extend(rest);
        pinned
    }
}

/// Remove-then-insert move. Out-of-range `from` is a no-op, `to` is clamped to the last slot.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }
    let to = to.min(items.len() - 1);
    if from == to {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}
