//! Pending contact requests.
//!
//! The queue keeps arrival order and holds at most one request per sender
//! address.  A repeat request from the same sender replaces the message of the
//! existing entry and marks it unread again instead of appending.

use serde::{Deserialize, Serialize};

/// A contact request waiting for the user to accept or reject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub address: String,
    pub message: String,
    pub read: bool,
}

/// Ordered list of pending requests, unique by sender address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQueue {
    requests: Vec<PendingRequest>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request from `address`.
    ///
    /// Returns `true` if a new entry was appended and `false` if an existing
    /// entry for the same address was updated.
    pub fn add(&mut self, address: &str, message: &str) -> bool {
        if let Some(existing) = self.requests.iter_mut().find(|r| r.address == address) {
            existing.message = message.to_string();
            existing.read = false;
            return false;
        }
        self.requests.push(PendingRequest {
            address: address.to_string(),
            message: message.to_string(),
            read: false,
        });
        true
    }

    /// Appends `request` unchanged.  Used when rebuilding from a file.
    pub fn push(&mut self, request: PendingRequest) {
        if !self.requests.iter().any(|r| r.address == request.address) {
            self.requests.push(request);
        }
    }

    pub fn unread_count(&self) -> usize {
        self.requests.iter().filter(|r| !r.read).count()
    }

    pub fn get(&self, index: usize) -> Option<&PendingRequest> {
        self.requests.get(index)
    }

    /// Marks the request at `index` read.  Returns `false` if out of range.
    pub fn mark_read(&mut self, index: usize) -> bool {
        match self.requests.get_mut(index) {
            Some(request) => {
                request.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for request in &mut self.requests {
            request.read = true;
        }
    }

    /// Removes the request at `index`, shifting later entries down.
    pub fn remove(&mut self, index: usize) -> Option<PendingRequest> {
        if index < self.requests.len() {
            Some(self.requests.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> {
        self.requests.iter()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}
