//! Ordered sub-resource collections
//!
//! [`Collection`] is the generic ordered store behind presets and templates.
//! It keeps insertion order, never reorders on replace, and clones in O(1)
//! thanks to [`im::Vector`].

use std::fmt::{Debug, Display};

use im::Vector;
use serde::{Deserialize, Serialize};

/// A record with a stable identity inside a collection
pub trait Record: Clone + PartialEq + Debug {
    /// Identifier type
    type Id: Clone + PartialEq + Display + Debug;

    /// Collection kind used in error messages ("preset", "template")
    const KIND: &'static str;

    /// Identifier of this record
    fn id(&self) -> &Self::Id;
}

/// Insertion-ordered records addressed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<R: Clone> {
    items: Vector<R>,
}

impl<R: Record> Collection<R> {
    /// Empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vector::new(),
        }
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.items.iter()
    }

    /// Record with `id`
    #[must_use]
    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|r| r.id() == id)
    }

    /// Position of the record with `id`
    #[must_use]
    pub fn position(&self, id: &R::Id) -> Option<usize> {
        self.items.iter().position(|r| r.id() == id)
    }

    /// Whether a record with `id` exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &R::Id) -> bool {
        self.position(id).is_some()
    }

    /// Append a record at the end
    #[inline]
    pub fn push_back(&mut self, record: R) {
        self.items.push_back(record);
    }

    /// Replace the record with `id` in place, returning the old record
    ///
    /// Returns `None` (and changes nothing) if no record has `id`.
    pub fn replace(&mut self, id: &R::Id, record: R) -> Option<R> {
        let index = self.position(id)?;
        Some(self.items.set(index, record))
    }

    /// Remove the record with `id`
    pub fn remove(&mut self, id: &R::Id) -> Option<R> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// First id that occurs more than once
    #[must_use]
    pub fn first_duplicate(&self) -> Option<&R::Id> {
        self.items.iter().enumerate().find_map(|(i, r)| {
            self.items
                .iter()
                .skip(i + 1)
                .any(|other| other.id() == r.id())
                .then(|| r.id())
        })
    }

    /// Whether both collections share storage
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.items.ptr_eq(&other.items)
    }
}

impl<R: Record> Default for Collection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> FromIterator<R> for Collection<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
