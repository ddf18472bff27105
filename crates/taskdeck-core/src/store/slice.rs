//! Slice: one resource list plus its request lifecycle.

use std::fmt;

use crate::domain::{Entity, ErrorKind, Id};

/// Last failure recorded on a slice.
///
/// `message` is what the user sees; `kind` and `operation` are kept for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceError {
    pub message: String,
    pub kind: ErrorKind,
    pub operation: &'static str,
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SliceError {}

/// Object-safe part of a slice: the phase transitions that do not touch items.
///
/// Lets the dispatcher drive any slice through pending/rejected/cancelled
/// without knowing its element type.
pub trait SliceControl {
    fn begin(&mut self);
    fn reject(&mut self, error: SliceError);
    fn cancel(&mut self);
    fn is_loading(&self) -> bool;
}

/// Slice state.
///
/// State transitions:
/// - idle -> loading (begin)
/// - loading -> idle with data replaced/merged and error cleared (fulfilled)
/// - loading -> idle with error set and data unchanged (rejected)
/// - loading -> idle with nothing else changed (cancelled)
///
/// `data` is `None` until the first successful fetch, so "not loaded" and
/// "loaded but empty" stay distinguishable.
#[derive(Debug, Clone)]
pub struct Slice<T> {
    data: Option<Vec<T>>,

    /// Requests dispatched but not yet resolved. Loading is `pending > 0`.
    pending: usize,

    error: Option<SliceError>,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            data: None,
            pending: 0,
            error: None,
        }
    }
}

impl<T: Entity> Slice<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&[T]> {
        self.data.as_deref()
    }

    /// Items, empty when nothing has been loaded yet.
    pub fn items(&self) -> &[T] {
        self.data().unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&SliceError> {
        self.error.as_ref()
    }

    pub fn get(&self, id: &Id<T::Marker>) -> Option<&T> {
        self.items().iter().find(|item| item.id() == id)
    }

    /// Fulfilled with a full list: data becomes exactly `items`.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.data = Some(items);
        self.fulfill();
    }

    /// Fulfilled with one entity: replace it by id, or append it.
    pub fn upsert(&mut self, item: T) {
        self.merge(item);
        self.fulfill();
    }

    /// Fulfilled delete: drop the entity with `id`.
    pub fn remove(&mut self, id: &Id<T::Marker>) {
        self.drop_item(id);
        self.fulfill();
    }

    /// Fulfilled without touching items.
    pub fn fulfill(&mut self) {
        self.settle();
        self.error = None;
    }

    /// Replace an existing entity by id without settling a request.
    /// Used to keep a sibling slice in sync; never inserts.
    pub fn merge_existing(&mut self, item: &T) {
        if let Some(items) = self.data.as_mut()
            && let Some(slot) = items.iter_mut().find(|x| x.id() == item.id())
        {
            *slot = item.clone();
        }
    }

    /// Drop an entity by id without settling a request.
    pub fn drop_item(&mut self, id: &Id<T::Marker>) {
        if let Some(items) = self.data.as_mut() {
            items.retain(|x| x.id() != id);
        }
    }

    fn merge(&mut self, item: T) {
        let items = self.data.get_or_insert_with(Vec::new);
        match items.iter_mut().find(|x| x.id() == item.id()) {
            Some(slot) => *slot = item,
            None => items.push(item),
        }
    }
}

impl<T> Slice<T> {
    fn settle(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }
}

impl<T> SliceControl for Slice<T> {
    fn begin(&mut self) {
        self.pending += 1;
    }

    fn reject(&mut self, error: SliceError) {
        self.settle();
        self.error = Some(error);
    }

    fn cancel(&mut self) {
        self.settle();
    }

    fn is_loading(&self) -> bool {
        self.pending > 0
    }
}
