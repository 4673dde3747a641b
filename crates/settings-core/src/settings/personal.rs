//! Personal settings: the part of the configuration owned by one profile.
//!
//! [`PersonalSettings`] is the in-memory model the store works with.
//! [`PersonalDocument`] is the shape written to `<profile>.ini`:
//!
//! ```toml
//! [Privacy]
//! typingNotification = true
//! enableLogging = true
//! blackList = "ADDR1\nADDR2"
//!
//! [GUI]
//! compactLayout = true
//! friendSortingMethod = 0
//!
//! [Proxy]
//! proxyType = 1
//! proxyAddr = "127.0.0.1"
//! proxyPort = 9050
//!
//! [[Friends.Friend]]
//! addr = "7651...8A39218F515C39A6"
//! alias = "Alice"
//! circle = -1
//!
//! [[Requests.Request]]
//! addr = "..."
//! message = "hi"
//! read = false
//!
//! [[Circles.Circle]]
//! name = "Work"
//! expanded = true
//! ```
//!
//! Converting between the two applies the privacy policy: last-activity
//! timestamps are only read and only written while logging is enabled.
//!
//! [`PersonalDocument::from_toml`] decodes each key and each list entry on
//! its own, so one unusable value never costs the contact list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::circle::{CircleList, CircleRecord};
use crate::domain::contact::{AutoAcceptCall, ContactRecord, ContactStore, PublicKey};
use crate::domain::proxy::ProxySettings;
use crate::domain::request::{PendingRequest, RequestQueue};

use super::lenient;

/// How the contact list is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum FriendSortingMethod {
    #[default]
    Name,
    Activity,
}

impl From<i32> for FriendSortingMethod {
    fn from(value: i32) -> Self {
        match value {
            0 => FriendSortingMethod::Name,
            1 => FriendSortingMethod::Activity,
            other => {
                warn!(value = other, "unknown contact sorting mode, sorting by name");
                FriendSortingMethod::Name
            }
        }
    }
}

impl From<FriendSortingMethod> for i32 {
    fn from(value: FriendSortingMethod) -> Self {
        match value {
            FriendSortingMethod::Name => 0,
            FriendSortingMethod::Activity => 1,
        }
    }
}

// ── In-memory model ───────────────────────────────────────────────────────────

/// Privacy flags of the active profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacySettings {
    pub typing_notification: bool,
    /// Gates chat history and per-contact activity timestamps.
    pub enable_logging: bool,
    /// Blocked addresses, one per entry.
    pub block_list: Vec<String>,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            typing_notification: true,
            enable_logging: true,
            block_list: Vec::new(),
        }
    }
}

/// Everything stored in a profile's personal file.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalSettings {
    pub privacy: PrivacySettings,
    pub contacts: ContactStore,
    pub requests: RequestQueue,
    pub circles: CircleList,
    pub proxy: ProxySettings,
    pub compact_layout: bool,
    pub sorting_mode: FriendSortingMethod,
}

impl Default for PersonalSettings {
    fn default() -> Self {
        Self {
            privacy: PrivacySettings::default(),
            contacts: ContactStore::new(),
            requests: RequestQueue::new(),
            circles: CircleList::new(),
            proxy: ProxySettings::default(),
            compact_layout: true,
            sorting_mode: FriendSortingMethod::default(),
        }
    }
}

impl PersonalSettings {
    /// Rebuilds the model from a parsed document.
    ///
    /// Contacts are keyed by the key derived from their stored address;
    /// entries whose address yields no key are skipped.  Activity is taken
    /// from the file only when the document's own privacy section enables
    /// logging.
    pub fn from_document(doc: PersonalDocument) -> Self {
        let privacy = PrivacySettings {
            typing_notification: doc.privacy.typing_notification,
            enable_logging: doc.privacy.enable_logging,
            block_list: doc
                .privacy
                .black_list
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        };

        let mut contacts = ContactStore::new();
        for entry in doc.friends.friend {
            let key = match PublicKey::from_address(&entry.addr) {
                Ok(key) => key,
                Err(e) => {
                    warn!(address = %entry.addr, "skipping contact with unusable address: {e}");
                    continue;
                }
            };
            let mut record = ContactRecord::new(key);
            record.address = entry.addr;
            record.alias = entry.alias;
            record.note = entry.note;
            record.auto_accept_dir = if entry.auto_accept_dir.is_empty() {
                entry.legacy_auto_accept.unwrap_or_default()
            } else {
                entry.auto_accept_dir
            };
            record.auto_accept_call = entry.auto_accept_call;
            record.auto_group_invite = entry.auto_group_invite;
            record.circle = usize::try_from(entry.circle).ok();
            if privacy.enable_logging {
                record.activity = entry.activity;
            }
            contacts.insert(record);
        }

        let mut requests = RequestQueue::new();
        for entry in doc.requests.request {
            requests.push(PendingRequest {
                address: entry.addr,
                message: entry.message,
                read: entry.read,
            });
        }

        Self {
            privacy,
            contacts,
            requests,
            circles: doc.circles.circle.into_iter().collect(),
            proxy: doc.proxy,
            compact_layout: doc.gui.compact_layout,
            sorting_mode: doc.gui.friend_sorting_method,
        }
    }

    /// Builds the document to write.  Activity timestamps are included only
    /// while logging is enabled.
    pub fn to_document(&self) -> PersonalDocument {
        let log_activity = self.privacy.enable_logging;
        let friend = self
            .contacts
            .iter()
            .map(|record| FriendEntry {
                addr: record.address.clone(),
                alias: record.alias.clone(),
                note: record.note.clone(),
                auto_accept_dir: record.auto_accept_dir.clone(),
                legacy_auto_accept: None,
                auto_accept_call: record.auto_accept_call,
                auto_group_invite: record.auto_group_invite,
                circle: record
                    .circle
                    .and_then(|c| i32::try_from(c).ok())
                    .unwrap_or(-1),
                activity: if log_activity { record.activity } else { None },
            })
            .collect();

        let request = self
            .requests
            .iter()
            .map(|r| RequestEntry {
                addr: r.address.clone(),
                message: r.message.clone(),
                read: r.read,
            })
            .collect();

        PersonalDocument {
            privacy: PrivacySection {
                typing_notification: self.privacy.typing_notification,
                enable_logging: self.privacy.enable_logging,
                black_list: self.privacy.block_list.join("\n"),
            },
            gui: PersonalGuiSection {
                compact_layout: self.compact_layout,
                friend_sorting_method: self.sorting_mode,
            },
            proxy: self.proxy.clone(),
            friends: FriendsSection { friend },
            requests: RequestsSection { request },
            circles: CirclesSection {
                circle: self.circles.iter().cloned().collect(),
            },
        }
    }
}

// ── On-disk document ──────────────────────────────────────────────────────────

/// Serde shape of a personal settings file.
///
/// Unknown sections and keys are ignored, so the global file can be read
/// through this type as a legacy fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDocument {
    #[serde(rename = "Privacy")]
    pub privacy: PrivacySection,
    #[serde(rename = "GUI")]
    pub gui: PersonalGuiSection,
    #[serde(rename = "Proxy")]
    pub proxy: ProxySettings,
    #[serde(rename = "Friends")]
    pub friends: FriendsSection,
    #[serde(rename = "Requests")]
    pub requests: RequestsSection,
    #[serde(rename = "Circles")]
    pub circles: CirclesSection,
}

impl PersonalDocument {
    /// Parses the text of a personal settings file (or of the global file
    /// read as a legacy fallback).
    ///
    /// Scalars that do not fit their field take the field's default with a
    /// warning: an out-of-range proxy type becomes no proxy, a port above
    /// 65535 becomes 0.  Friend, request and circle entries are decoded one
    /// by one, so the other entries survive a bad one.
    ///
    /// # Errors
    ///
    /// Returns the parser error only when `text` is not a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let mut doc = lenient::parse(text)?;
        let mut friends = lenient::take_section(&mut doc, "Friends");
        let mut requests = lenient::take_section(&mut doc, "Requests");
        let mut circles = lenient::take_section(&mut doc, "Circles");
        Ok(Self {
            privacy: lenient::decode("Privacy", lenient::take_section(&mut doc, "Privacy")),
            gui: lenient::decode("GUI", lenient::take_section(&mut doc, "GUI")),
            proxy: lenient::decode("Proxy", lenient::take_section(&mut doc, "Proxy")),
            friends: FriendsSection {
                friend: lenient::decode_entries("Friends", &mut friends, "Friend"),
            },
            requests: RequestsSection {
                request: lenient::decode_entries("Requests", &mut requests, "Request"),
            },
            circles: CirclesSection {
                circle: lenient::decode_entries("Circles", &mut circles, "Circle"),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrivacySection {
    pub typing_notification: bool,
    pub enable_logging: bool,
    /// Newline-joined blocked addresses.
    pub black_list: String,
}

impl Default for PrivacySection {
    fn default() -> Self {
        Self {
            typing_notification: true,
            enable_logging: true,
            black_list: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalGuiSection {
    pub compact_layout: bool,
    pub friend_sorting_method: FriendSortingMethod,
}

impl Default for PersonalGuiSection {
    fn default() -> Self {
        Self {
            compact_layout: true,
            friend_sorting_method: FriendSortingMethod::Name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendsSection {
    #[serde(rename = "Friend")]
    pub friend: Vec<FriendEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FriendEntry {
    pub addr: String,
    pub alias: String,
    pub note: String,
    pub auto_accept_dir: String,
    /// Older files stored the auto-accept directory under this key.
    #[serde(rename = "autoAccept", skip_serializing_if = "Option::is_none")]
    pub legacy_auto_accept: Option<String>,
    pub auto_accept_call: AutoAcceptCall,
    pub auto_group_invite: bool,
    /// Circle index, `-1` for none.
    pub circle: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<DateTime<Utc>>,
}

impl Default for FriendEntry {
    fn default() -> Self {
        Self {
            addr: String::new(),
            alias: String::new(),
            note: String::new(),
            auto_accept_dir: String::new(),
            legacy_auto_accept: None,
            auto_accept_call: AutoAcceptCall::default(),
            auto_group_invite: false,
            circle: -1,
            activity: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestsSection {
    #[serde(rename = "Request")]
    pub request: Vec<RequestEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestEntry {
    pub addr: String,
    pub message: String,
    pub read: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CirclesSection {
    #[serde(rename = "Circle")]
    pub circle: Vec<CircleRecord>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ADDRESS: &str =
        "76518406F6A9F2217E8DC487CC783C25CC16A15EB36FF32E335A235342C48A39218F515C39A6";

    fn key() -> PublicKey {
        PublicKey::from_address(ADDRESS).unwrap()
    }

    fn sample() -> PersonalSettings {
        let mut s = PersonalSettings::default();
        s.contacts.update_address(ADDRESS).unwrap();
        let record = s.contacts.get_or_insert(key());
        record.alias = "Alice".to_string();
        record.circle = Some(0);
        record.auto_accept_call = AutoAcceptCall(AutoAcceptCall::AUDIO);
        record.activity = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        s.circles.add("Work");
        s.requests.add("ABC", "hi");
        s.privacy.block_list = vec!["X".to_string(), "Y".to_string()];
        s
    }

    #[test]
    fn test_default_flags() {
        let s = PersonalSettings::default();
        assert!(s.privacy.typing_notification);
        assert!(s.privacy.enable_logging);
        assert!(s.compact_layout);
        assert_eq!(s.sorting_mode, FriendSortingMethod::Name);
    }

    #[test]
    fn test_document_round_trip_through_toml() {
        // Arrange
        let original = sample();

        // Act
        let text = toml::to_string_pretty(&original.to_document()).expect("serialize");
        let doc: PersonalDocument = toml::from_str(&text).expect("deserialize");
        let restored = PersonalSettings::from_document(doc);

        // Assert
        assert_eq!(restored, original);
    }

    #[test]
    fn test_activity_is_dropped_when_logging_disabled_at_save() {
        let mut s = sample();
        s.privacy.enable_logging = false;

        let doc = s.to_document();

        assert!(doc.friends.friend.iter().all(|f| f.activity.is_none()));
        let text = toml::to_string_pretty(&doc).expect("serialize");
        assert!(!text.contains("activity"));
    }

    #[test]
    fn test_activity_is_ignored_on_load_when_file_disables_logging() {
        // Arrange
        let mut doc = sample().to_document();
        doc.privacy.enable_logging = false;
        assert!(doc.friends.friend[0].activity.is_some());

        // Act
        let s = PersonalSettings::from_document(doc);

        // Assert
        assert_eq!(s.contacts.find(&key()).unwrap().activity, None);
    }

    #[test]
    fn test_legacy_auto_accept_key_backs_empty_dir() {
        let text = format!(
            "[[Friends.Friend]]\naddr = \"{ADDRESS}\"\nautoAccept = \"/home/a/Downloads\"\n"
        );
        let doc: PersonalDocument = toml::from_str(&text).expect("deserialize");

        let s = PersonalSettings::from_document(doc);

        assert_eq!(
            s.contacts.find(&key()).unwrap().auto_accept_dir,
            "/home/a/Downloads"
        );
    }

    #[test]
    fn test_missing_circle_means_none_and_is_written_as_minus_one() {
        let text = format!("[[Friends.Friend]]\naddr = \"{ADDRESS}\"\n");
        let doc: PersonalDocument = toml::from_str(&text).expect("deserialize");

        let s = PersonalSettings::from_document(doc);

        assert_eq!(s.contacts.find(&key()).unwrap().circle, None);
        assert_eq!(s.to_document().friends.friend[0].circle, -1);
    }

    #[test]
    fn test_contacts_with_bad_addresses_are_skipped() {
        let text = format!(
            "[[Friends.Friend]]\naddr = \"garbage\"\n\n[[Friends.Friend]]\naddr = \"{ADDRESS}\"\n"
        );
        let doc: PersonalDocument = toml::from_str(&text).expect("deserialize");

        let s = PersonalSettings::from_document(doc);

        assert_eq!(s.contacts.len(), 1);
    }

    #[test]
    fn test_corrupt_proxy_type_and_sorting_mode_are_repaired() {
        let text = "[Proxy]\nproxyType = 9\n\n[GUI]\nfriendSortingMethod = 5\n";
        let doc: PersonalDocument = toml::from_str(text).expect("deserialize");

        let s = PersonalSettings::from_document(doc);

        assert_eq!(s.proxy.proxy_type, crate::ProxyType::None);
        assert_eq!(s.sorting_mode, FriendSortingMethod::Name);
    }

    #[test]
    fn test_global_file_sections_are_ignored_by_personal_schema() {
        let text = "[General]\ntranslation = \"de\"\n\n[GUI]\nshowWindow = false\ncompactLayout = false\n";
        let doc: PersonalDocument = toml::from_str(text).expect("deserialize");
        assert!(!doc.gui.compact_layout);
        assert!(doc.friends.friend.is_empty());
    }

    #[test]
    fn test_out_of_range_proxy_values_keep_contacts_loaded() {
        // Arrange
        let text = format!(
            "[Proxy]\nproxyType = 4294967296\nproxyAddr = \"10.0.0.1\"\nproxyPort = 70000\n\n\
             [[Friends.Friend]]\naddr = \"{ADDRESS}\"\nalias = \"Alice\"\n"
        );

        // Act
        let doc = PersonalDocument::from_toml(&text).expect("parse");
        let s = PersonalSettings::from_document(doc);

        // Assert
        assert_eq!(s.proxy.proxy_type, crate::ProxyType::None);
        assert_eq!(s.proxy.proxy_addr, "10.0.0.1");
        assert_eq!(s.proxy.proxy_port, 0);
        assert_eq!(s.contacts.len(), 1);
        assert_eq!(s.contacts.find(&key()).unwrap().alias, "Alice");
    }

    #[test]
    fn test_bad_friend_value_resets_only_that_field() {
        // Arrange: autoAcceptCall does not fit in a byte, circle is text.
        let text = format!(
            "[[Friends.Friend]]\naddr = \"{ADDRESS}\"\nalias = \"Alice\"\n\
             autoAcceptCall = 300\ncircle = \"work\"\nautoGroupInvite = true\n"
        );

        // Act
        let s = PersonalSettings::from_document(PersonalDocument::from_toml(&text).expect("parse"));

        // Assert
        let record = s.contacts.find(&key()).unwrap();
        assert_eq!(record.alias, "Alice");
        assert_eq!(record.auto_accept_call, AutoAcceptCall::default());
        assert_eq!(record.circle, None);
        assert!(record.auto_group_invite);
    }

    #[test]
    fn test_mistyped_privacy_key_keeps_requests_and_circles() {
        let text = "[Privacy]\nenableLogging = 2\ntypingNotification = false\n\n\
                    [[Requests.Request]]\naddr = \"X\"\nmessage = \"hi\"\nread = \"no\"\n\n\
                    [[Circles.Circle]]\nname = \"Work\"\nexpanded = false\n";

        let s = PersonalSettings::from_document(PersonalDocument::from_toml(text).expect("parse"));

        assert!(s.privacy.enable_logging);
        assert!(!s.privacy.typing_notification);
        assert_eq!(s.requests.get(0).unwrap().message, "hi");
        assert!(!s.requests.get(0).unwrap().read);
        assert_eq!(s.circles.len(), 1);
        assert!(!s.circles.get(0).unwrap().expanded);
    }

    #[test]
    fn test_from_toml_matches_serde_for_valid_files() {
        let original = sample();
        let text = toml::to_string_pretty(&original.to_document()).expect("serialize");

        let restored = PersonalSettings::from_document(PersonalDocument::from_toml(&text).expect("parse"));

        assert_eq!(restored, original);
    }

    #[test]
    fn test_empty_block_list_lines_are_dropped() {
        let mut doc = PersonalDocument::default();
        doc.privacy.black_list = "\nA\n\nB\n".to_string();
        let s = PersonalSettings::from_document(doc);
        assert_eq!(s.privacy.block_list, vec!["A", "B"]);
    }

    #[test]
    fn test_duplicate_requests_in_file_collapse() {
        let text = "[[Requests.Request]]\naddr = \"X\"\nmessage = \"a\"\n\n[[Requests.Request]]\naddr = \"X\"\nmessage = \"b\"\n";
        let doc: PersonalDocument = toml::from_str(text).expect("deserialize");
        let s = PersonalSettings::from_document(doc);
        assert_eq!(s.requests.len(), 1);
        assert_eq!(s.requests.get(0).unwrap().message, "a");
    }
}
