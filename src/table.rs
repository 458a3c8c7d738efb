//! Grouped column storage shared by the phase and common-receiver readers.
//!
//! Nested columns hold one inner sequence per event (or event pair). A
//! reader opens a group when it accepts a header line and appends detail
//! values to the most recent group.

use std::ops::Deref;

use serde::Serialize;

/// A column of per-group sequences.
///
/// Dereferences to `[Vec<T>]`, so `column[i]` is the i-th group and
/// `column.len()` is the number of groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Grouped<T>(Vec<Vec<T>>);

impl<T> Grouped<T> {
    /// Create an empty column with no groups.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Open a new, empty group at the end of the column.
    pub fn start_group(&mut self) {
        self.0.push(Vec::new());
    }

    /// Append a value to the most recent group.
    ///
    /// Returns `false` and drops the value if no group has been started.
    pub fn append(&mut self, value: T) -> bool {
        match self.0.last_mut() {
            Some(group) => {
                group.push(value);
                true
            }
            None => false,
        }
    }

    /// The most recent group, if any.
    pub fn current(&self) -> Option<&[T]> {
        self.0.last().map(Vec::as_slice)
    }

    /// Total number of values across all groups.
    pub fn total_len(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Iterate over every value in group order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter().flatten()
    }

    pub fn into_inner(self) -> Vec<Vec<T>> {
        self.0
    }
}

impl<T> Default for Grouped<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Grouped<T> {
    type Target = [Vec<T>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<Vec<Vec<T>>> for Grouped<T> {
    fn from(groups: Vec<Vec<T>>) -> Self {
        Self(groups)
    }
}

/// Whether a reader currently has an open group to attach detail lines to.
///
/// Readers start in [`GroupState::NoOpenGroup`], move to [`GroupState::Open`]
/// on a header they could parse, and fall back to `NoOpenGroup` on a header
/// they had to drop. Detail lines seen while no group is open are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupState {
    #[default]
    NoOpenGroup,
    Open,
}

impl GroupState {
    #[inline]
    pub fn is_open(self) -> bool {
        matches!(self, GroupState::Open)
    }
}
