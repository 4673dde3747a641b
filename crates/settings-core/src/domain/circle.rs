//! Circles: named, collapsible groups in the contact list.
//!
//! # Unstable indices
//!
//! A circle is identified by its position in the list, not by a stable id.
//! [`CircleList::remove`] moves the last circle into the removed slot so that
//! indices always stay contiguous (`0..len`).  After a removal the index that
//! used to belong to the last circle is gone; any caller still holding it must
//! re-read the list.
//!
//! ```text
//! before remove(0):  [A, B, C]
//! after  remove(0):  [C, B]
//! ```

use serde::{Deserialize, Serialize};

/// One circle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleRecord {
    pub name: String,
    pub expanded: bool,
}

impl Default for CircleRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            expanded: true,
        }
    }
}

/// Ordered list of circles addressed by unstable positional index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CircleList {
    circles: Vec<CircleRecord>,
}

impl CircleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a collapsed circle and returns its index.
    ///
    /// An empty `name` is replaced with `Circle #<n>`, where `n` is the count
    /// after insertion.
    pub fn add(&mut self, name: &str) -> usize {
        let name = if name.is_empty() {
            format!("Circle #{}", self.circles.len() + 1)
        } else {
            name.to_string()
        };
        self.circles.push(CircleRecord {
            name,
            expanded: false,
        });
        self.circles.len() - 1
    }

    /// Appends `record` unchanged.  Used when rebuilding from a file.
    pub fn push(&mut self, record: CircleRecord) {
        self.circles.push(record);
    }

    /// Removes the circle at `index` by swapping the last circle into its
    /// slot.  Returns the new count, or `None` if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<usize> {
        if index >= self.circles.len() {
            return None;
        }
        self.circles.swap_remove(index);
        Some(self.circles.len())
    }

    pub fn get(&self, index: usize) -> Option<&CircleRecord> {
        self.circles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CircleRecord> {
        self.circles.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CircleRecord> {
        self.circles.iter()
    }

    pub fn clear(&mut self) {
        self.circles.clear();
    }
}

impl FromIterator<CircleRecord> for CircleList {
    fn from_iter<I: IntoIterator<Item = CircleRecord>>(iter: I) -> Self {
        Self {
            circles: iter.into_iter().collect(),
        }
    }
}
