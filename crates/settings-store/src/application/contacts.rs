//! Per-contact settings, circles and pending contact requests.
//!
//! # Lazy contact records
//!
//! Every per-contact setter goes through [`ContactStore::get_or_insert`]: setting
//! any single field of an unknown contact creates a full record with every
//! other field at its default.  Getters never create records; they return the
//! default value for unknown contacts.
//!
//! # Circle indices
//!
//! Circles are addressed by position.  Removing a circle moves the last circle
//! into the freed slot, so an index obtained before a removal may name a
//! different circle afterwards.  The store rewrites contact memberships to
//! follow the move; callers holding indices must re-read them.
//!
//! [`ContactStore::get_or_insert`]: settings_core::ContactStore::get_or_insert

use chrono::{DateTime, Utc};
use settings_core::{AutoAcceptCall, CircleRecord, ContactRecord, PendingRequest, PublicKey};
use tracing::debug;

use super::events::SettingsEvent;
use super::store::{SettingsStore, StoreError};

impl SettingsStore {
    // ── Contacts: read ───────────────────────────────────────────────────────

    /// Snapshot of one contact, `None` if unknown.
    pub fn contact(&self, key: &PublicKey) -> Option<ContactRecord> {
        self.read(|st| st.personal.contacts.find(key).cloned())
    }

    /// Snapshot of every contact, in unspecified order.
    pub fn contacts(&self) -> Vec<ContactRecord> {
        self.read(|st| st.personal.contacts.iter().cloned().collect())
    }

    pub fn contact_count(&self) -> usize {
        self.read(|st| st.personal.contacts.len())
    }

    fn contact_field<T: Default>(&self, key: &PublicKey, f: impl FnOnce(&ContactRecord) -> T) -> T {
        self.read(|st| st.personal.contacts.find(key).map(f).unwrap_or_default())
    }

    /// Last known full address of the contact, empty if unknown.
    pub fn contact_address(&self, key: &PublicKey) -> String {
        self.contact_field(key, |c| c.address.clone())
    }

    pub fn contact_alias(&self, key: &PublicKey) -> String {
        self.contact_field(key, |c| c.alias.clone())
    }

    pub fn contact_note(&self, key: &PublicKey) -> String {
        self.contact_field(key, |c| c.note.clone())
    }

    /// Auto-accept directory for files from the contact, empty for "ask".
    pub fn auto_accept_dir(&self, key: &PublicKey) -> String {
        self.contact_field(key, |c| c.auto_accept_dir.clone())
    }

    pub fn auto_accept_call(&self, key: &PublicKey) -> AutoAcceptCall {
        self.contact_field(key, |c| c.auto_accept_call)
    }

    pub fn auto_group_invite(&self, key: &PublicKey) -> bool {
        self.contact_field(key, |c| c.auto_group_invite)
    }

    /// Circle the contact belongs to, if any.
    pub fn contact_circle(&self, key: &PublicKey) -> Option<usize> {
        self.contact_field(key, |c| c.circle)
    }

    pub fn contact_activity(&self, key: &PublicKey) -> Option<DateTime<Utc>> {
        self.contact_field(key, |c| c.activity)
    }

    // ── Contacts: write ──────────────────────────────────────────────────────

    /// Sets one field of `key`'s record, creating the record if needed, and
    /// emits `event` if the value changed.
    fn update_contact<T: PartialEq + Clone>(
        &self,
        key: PublicKey,
        value: T,
        field: impl FnOnce(&mut ContactRecord) -> &mut T,
        event: impl FnOnce(PublicKey, T) -> SettingsEvent,
    ) {
        self.mutate(|st, events| {
            let slot = field(st.personal.contacts.get_or_insert(key));
            if *slot != value {
                *slot = value.clone();
                events.push(event(key, value));
            }
        });
    }

    /// Stores a contact's full address.  The contact key is derived from it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidAddress`] if no key can be derived.
    pub fn update_contact_address(&self, address: &str) -> Result<PublicKey, StoreError> {
        let key = PublicKey::from_address(address)?;
        let address = address.trim().to_string();
        self.update_contact(
            key,
            address,
            |c| &mut c.address,
            |key, address| SettingsEvent::ContactAddressChanged { key, address },
        );
        Ok(key)
    }

    pub fn set_contact_alias(&self, key: PublicKey, alias: impl Into<String>) {
        self.update_contact(
            key,
            alias.into(),
            |c| &mut c.alias,
            |key, alias| SettingsEvent::ContactAliasChanged { key, alias },
        );
    }

    pub fn set_contact_note(&self, key: PublicKey, note: impl Into<String>) {
        self.update_contact(
            key,
            note.into(),
            |c| &mut c.note,
            |key, note| SettingsEvent::ContactNoteChanged { key, note },
        );
    }

    pub fn set_auto_accept_dir(&self, key: PublicKey, dir: impl Into<String>) {
        self.update_contact(
            key,
            dir.into(),
            |c| &mut c.auto_accept_dir,
            |key, dir| SettingsEvent::ContactAutoAcceptDirChanged { key, dir },
        );
    }

    pub fn set_auto_accept_call(&self, key: PublicKey, flags: AutoAcceptCall) {
        self.update_contact(
            key,
            flags,
            |c| &mut c.auto_accept_call,
            |key, flags| SettingsEvent::ContactAutoAcceptCallChanged { key, flags },
        );
    }

    pub fn set_auto_group_invite(&self, key: PublicKey, enabled: bool) {
        self.update_contact(
            key,
            enabled,
            |c| &mut c.auto_group_invite,
            |key, enabled| SettingsEvent::ContactAutoGroupInviteChanged { key, enabled },
        );
    }

    /// Puts the contact in circle `circle`, or in none.  The index is not
    /// checked against the circle list.
    pub fn set_contact_circle(&self, key: PublicKey, circle: Option<usize>) {
        self.update_contact(
            key,
            circle,
            |c| &mut c.circle,
            |key, circle| SettingsEvent::ContactCircleChanged { key, circle },
        );
    }

    /// Records the contact's last activity.  Kept in memory regardless of the
    /// logging flag; only written to disk while logging is enabled.
    pub fn set_contact_activity(&self, key: PublicKey, activity: DateTime<Utc>) {
        self.mutate(|st, events| {
            let record = st.personal.contacts.get_or_insert(key);
            if record.activity != Some(activity) {
                record.activity = Some(activity);
                events.push(SettingsEvent::ContactActivityChanged { key, activity });
            }
        });
    }

    /// Deletes the contact's record.  Returns `false` if there was none.
    pub fn remove_contact(&self, key: &PublicKey) -> bool {
        self.mutate(|st, events| {
            let removed = st.personal.contacts.remove(key).is_some();
            if removed {
                events.push(SettingsEvent::ContactRemoved(*key));
            }
            removed
        })
    }

    /// Persists the personal settings after a change to `key`.
    pub fn save_contact(&self, key: &PublicKey) {
        debug!(contact = %key, "saving contact settings");
        self.save_active_personal();
    }

    // ── Circles ──────────────────────────────────────────────────────────────

    pub fn circle_count(&self) -> usize {
        self.read(|st| st.personal.circles.len())
    }

    /// Snapshot of every circle in index order.
    pub fn circles(&self) -> Vec<CircleRecord> {
        self.read(|st| st.personal.circles.iter().cloned().collect())
    }

    pub fn circle_name(&self, index: usize) -> Option<String> {
        self.read(|st| st.personal.circles.get(index).map(|c| c.name.clone()))
    }

    pub fn circle_expanded(&self, index: usize) -> Option<bool> {
        self.read(|st| st.personal.circles.get(index).map(|c| c.expanded))
    }

    /// Appends a collapsed circle, saves, and returns its index.
    ///
    /// An empty `name` becomes `Circle #<n>`.
    pub fn add_circle(&self, name: &str) -> usize {
        let index = self.mutate(|st, events| {
            let index = st.personal.circles.add(name);
            let name = st
                .personal
                .circles
                .get(index)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            events.push(SettingsEvent::CircleAdded { index, name });
            index
        });
        self.save_active_personal();
        index
    }

    /// Renames circle `index` and saves.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CircleOutOfRange`] if there is no such circle.
    pub fn set_circle_name(&self, index: usize, name: &str) -> Result<(), StoreError> {
        self.mutate(|st, events| {
            let count = st.personal.circles.len();
            let circle = st
                .personal
                .circles
                .get_mut(index)
                .ok_or(StoreError::CircleOutOfRange { index, count })?;
            if circle.name != name {
                circle.name = name.to_string();
                events.push(SettingsEvent::CircleRenamed {
                    index,
                    name: name.to_string(),
                });
            }
            Ok::<_, StoreError>(())
        })?;
        self.save_active_personal();
        Ok(())
    }

    /// Sets whether circle `index` is shown expanded.  Memory only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CircleOutOfRange`] if there is no such circle.
    pub fn set_circle_expanded(&self, index: usize, expanded: bool) -> Result<(), StoreError> {
        self.mutate(|st, events| {
            let count = st.personal.circles.len();
            let circle = st
                .personal
                .circles
                .get_mut(index)
                .ok_or(StoreError::CircleOutOfRange { index, count })?;
            if circle.expanded != expanded {
                circle.expanded = expanded;
                events.push(SettingsEvent::CircleExpandedChanged { index, expanded });
            }
            Ok(())
        })
    }

    /// Removes circle `index`, moving the last circle into its slot, and
    /// saves.  Returns the new circle count.
    ///
    /// Contacts in the removed circle leave it; contacts in the moved circle
    /// follow it to `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CircleOutOfRange`] if there is no such circle.
    pub fn remove_circle(&self, index: usize) -> Result<usize, StoreError> {
        let count = self.mutate(|st, events| {
            let before = st.personal.circles.len();
            let count = st
                .personal
                .circles
                .remove(index)
                .ok_or(StoreError::CircleOutOfRange {
                    index,
                    count: before,
                })?;
            st.personal.contacts.clear_circle(index);
            if index != count {
                st.personal.contacts.move_circle(count, index);
            }
            events.push(SettingsEvent::CircleRemoved { index, count });
            Ok::<_, StoreError>(count)
        })?;
        self.save_active_personal();
        Ok(count)
    }

    // ── Pending requests ─────────────────────────────────────────────────────

    /// Queues a contact request.  A repeat from the same address replaces the
    /// message and marks it unread again.
    ///
    /// Returns `true` if a new entry was appended.
    pub fn add_friend_request(&self, address: &str, message: &str) -> bool {
        self.mutate(|st, events| {
            let added = st.personal.requests.add(address, message);
            events.push(SettingsEvent::FriendRequestQueued {
                address: address.to_string(),
                message: message.to_string(),
            });
            added
        })
    }

    pub fn friend_request_count(&self) -> usize {
        self.read(|st| st.personal.requests.len())
    }

    pub fn unread_friend_requests(&self) -> usize {
        self.read(|st| st.personal.requests.unread_count())
    }

    pub fn friend_request(&self, index: usize) -> Option<PendingRequest> {
        self.read(|st| st.personal.requests.get(index).cloned())
    }

    /// Snapshot of the queue in arrival order.
    pub fn friend_requests(&self) -> Vec<PendingRequest> {
        self.read(|st| st.personal.requests.iter().cloned().collect())
    }

    /// Marks every pending request read.
    pub fn clear_unread_friend_requests(&self) {
        self.mutate(|st, events| {
            if st.personal.requests.unread_count() > 0 {
                st.personal.requests.mark_all_read();
                events.push(SettingsEvent::FriendRequestsAllRead);
            }
        });
    }

    /// # Errors
    ///
    /// Returns [`StoreError::RequestOutOfRange`] if there is no such request.
    pub fn read_friend_request(&self, index: usize) -> Result<(), StoreError> {
        self.mutate(|st, events| {
            let count = st.personal.requests.len();
            if !st.personal.requests.mark_read(index) {
                return Err(StoreError::RequestOutOfRange { index, count });
            }
            events.push(SettingsEvent::FriendRequestRead(index));
            Ok(())
        })
    }

    /// Removes the request at `index`; later requests shift down by one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RequestOutOfRange`] if there is no such request.
    pub fn remove_friend_request(&self, index: usize) -> Result<PendingRequest, StoreError> {
        self.mutate(|st, events| {
            let count = st.personal.requests.len();
            let removed = st
                .personal
                .requests
                .remove(index)
                .ok_or(StoreError::RequestOutOfRange { index, count })?;
            events.push(SettingsEvent::FriendRequestRemoved(index));
            Ok(removed)
        })
    }
}
