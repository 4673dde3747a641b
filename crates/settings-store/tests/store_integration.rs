//! Integration tests for the settings store over real files.
//!
//! Every test works in its own temporary directory named with a fresh UUID,
//! so tests can run in parallel without sharing files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};
use settings_core::{Passkey, ProxyType, PublicKey};
use settings_store::infrastructure::profile::LocalProfile;
use settings_store::infrastructure::storage::cipher;
use settings_store::infrastructure::storage::repository::FileRepository;
use settings_store::{SettingsEvent, SettingsLocation, SettingsStore};
use uuid::Uuid;

const ALICE_ADDR: &str =
    "76518406F6A9F2217E8DC487CC783C25CC16A15EB36FF32E335A235342C48A39218F515C39A6";

// ── Helpers ───────────────────────────────────────────────────────────────────

struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("settings-store-it-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("create temp dir");
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.0).ok();
    }
}

fn open(dir: &Path) -> SettingsStore {
    SettingsStore::new(
        Arc::new(FileRepository::new()),
        SettingsLocation::fixed(dir),
    )
    .expect("store starts")
}

fn alice_key() -> PublicKey {
    PublicKey::from_address(ALICE_ADDR).unwrap()
}

// ── Round trips ───────────────────────────────────────────────────────────────

#[test]
fn test_clear_text_profile_round_trip_across_restart() {
    // Arrange
    let tmp = TempDir::new();
    let profile = LocalProfile::unencrypted("alice");
    {
        let store = open(tmp.path());
        store.update_profile_data(Some(&profile)).unwrap();
        let key = store.update_contact_address(ALICE_ADDR).unwrap();
        store.set_contact_alias(key, "Alice");
        let work = store.add_circle("Work");
        store.set_contact_circle(key, Some(work));
        store.add_friend_request("REQ-ADDR", "let's talk");
        store.set_proxy_type(ProxyType::Socks5);
        store.set_proxy_addr("127.0.0.1");
        store.set_proxy_port(9050u16);
        store.set_block_list(vec!["SPAMMER".to_string()]);
        store.save_active_personal();
        store.sync();
    }

    // Act
    let store = open(tmp.path());
    assert_eq!(store.current_profile(), "alice");
    store.update_profile_data(Some(&profile)).unwrap();

    // Assert
    let key = alice_key();
    assert_eq!(store.contact_alias(&key), "Alice");
    assert_eq!(store.contact_address(&key), ALICE_ADDR);
    assert_eq!(store.contact_circle(&key), Some(0));
    assert_eq!(store.circle_name(0).as_deref(), Some("Work"));
    assert_eq!(store.friend_request(0).unwrap().message, "let's talk");
    let proxy = store.proxy();
    assert_eq!(proxy.proxy_type, ProxyType::Socks5);
    assert_eq!(proxy.proxy_addr, "127.0.0.1");
    assert_eq!(proxy.proxy_port, 9050);
    assert_eq!(store.block_list(), vec!["SPAMMER"]);
}

#[test]
fn test_encrypted_profile_round_trip() {
    // Arrange
    let tmp = TempDir::new();
    let passkey = Passkey::from_bytes([0x42; 32]);
    let profile = LocalProfile::with_passkey("carol", passkey.clone());
    {
        let store = open(tmp.path());
        store.update_profile_data(Some(&profile)).unwrap();
        store.set_contact_note(alice_key(), "encrypted note");
        store.save_active_personal();
        store.sync();
    }

    // Act
    let raw = std::fs::read(tmp.path().join("carol.ini")).unwrap();
    let store = open(tmp.path());
    store.update_profile_data(Some(&profile)).unwrap();

    // Assert
    assert!(cipher::is_encrypted(&raw));
    assert_eq!(store.contact_note(&alice_key()), "encrypted note");
}

#[test]
fn test_encrypted_profile_without_or_with_wrong_passkey_degrades_to_defaults() {
    // Arrange
    let tmp = TempDir::new();
    let owner = LocalProfile::with_passkey("dave", Passkey::from_bytes([1; 32]));
    {
        let store = open(tmp.path());
        store.update_profile_data(Some(&owner)).unwrap();
        store.set_contact_alias(alice_key(), "Alice");
        store.save_active_personal();
        store.sync();
    }
    let store = open(tmp.path());

    // Act / Assert: no passkey
    store
        .update_profile_data(Some(&LocalProfile::unencrypted("dave")))
        .unwrap();
    assert_eq!(store.contact_count(), 0);

    // Act / Assert: wrong passkey
    store
        .update_profile_data(Some(&LocalProfile::with_passkey(
            "dave",
            Passkey::from_bytes([2; 32]),
        )))
        .unwrap();
    assert_eq!(store.contact_count(), 0);
}

#[test]
fn test_mistyped_password_session_leaves_encrypted_file_intact() {
    // Arrange
    let tmp = TempDir::new();
    let owner = LocalProfile::with_password("hana", "right").unwrap();
    {
        let store = open(tmp.path());
        store.update_profile_data(Some(&owner)).unwrap();
        store.set_contact_alias(alice_key(), "Alice");
        store.save_active_personal();
        store.sync();
    }
    let before = std::fs::read(tmp.path().join("hana.ini")).unwrap();

    // Act: a session opened with the wrong password edits circles.
    {
        let typo = LocalProfile::with_password("hana", "typo").unwrap();
        let store = open(tmp.path());
        store.update_profile_data(Some(&typo)).unwrap();
        assert_eq!(store.contact_count(), 0);
        store.add_circle("x");
        store.save_contact(&alice_key());
        store.sync();
    }

    // Assert
    assert_eq!(std::fs::read(tmp.path().join("hana.ini")).unwrap(), before);
    let store = open(tmp.path());
    store.update_profile_data(Some(&owner)).unwrap();
    assert_eq!(store.contact_alias(&alice_key()), "Alice");
    assert_eq!(store.circle_count(), 0);
}

#[test]
fn test_disabling_logging_drops_activity_on_save() {
    // Arrange
    let tmp = TempDir::new();
    let profile = LocalProfile::unencrypted("erin");
    let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    {
        let store = open(tmp.path());
        store.update_profile_data(Some(&profile)).unwrap();
        store.set_contact_activity(alice_key(), when);
        store.set_enable_logging(false);
        store.save_active_personal();
        store.sync();
    }

    // Act
    let store = open(tmp.path());
    store.update_profile_data(Some(&profile)).unwrap();

    // Assert
    assert!(store.contact(&alice_key()).is_some());
    assert_eq!(store.contact_activity(&alice_key()), None);
    assert!(!store.enable_logging());
}

#[test]
fn test_activity_survives_while_logging_enabled() {
    let tmp = TempDir::new();
    let profile = LocalProfile::unencrypted("erin");
    let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    {
        let store = open(tmp.path());
        store.update_profile_data(Some(&profile)).unwrap();
        store.set_contact_activity(alice_key(), when);
        store.save_active_personal();
        store.sync();
    }

    let store = open(tmp.path());
    store.update_profile_data(Some(&profile)).unwrap();

    assert_eq!(store.contact_activity(&alice_key()), Some(when));
}

// ── Load repairs ──────────────────────────────────────────────────────────────

#[test]
fn test_out_of_range_proxy_type_loads_as_none() {
    let tmp = TempDir::new();
    std::fs::write(
        tmp.path().join("frank.ini"),
        "[Proxy]\nproxyType = 7\nproxyAddr = \"10.0.0.1\"\nproxyPort = 3128\n",
    )
    .unwrap();
    let store = open(tmp.path());

    store
        .update_profile_data(Some(&LocalProfile::unencrypted("frank")))
        .unwrap();

    assert_eq!(store.proxy_type(), ProxyType::None);
    assert_eq!(store.proxy_addr(), "10.0.0.1");
}

#[test]
fn test_bad_proxy_values_keep_contacts_on_disk() {
    // Arrange
    let tmp = TempDir::new();
    let text = format!(
        "[Proxy]\nproxyType = 4294967296\nproxyPort = 70000\n\n\
         [[Friends.Friend]]\naddr = \"{ALICE_ADDR}\"\nalias = \"Alice\"\n"
    );
    std::fs::write(tmp.path().join("frank.ini"), text).unwrap();
    let frank = LocalProfile::unencrypted("frank");

    // Act
    {
        let store = open(tmp.path());
        store.update_profile_data(Some(&frank)).unwrap();
        assert_eq!(store.contact_alias(&alice_key()), "Alice");
        store.add_circle("x");
        store.sync();
    }
    let store = open(tmp.path());
    store.update_profile_data(Some(&frank)).unwrap();

    // Assert
    assert_eq!(store.contact_count(), 1);
    assert_eq!(store.contact_alias(&alice_key()), "Alice");
    assert_eq!(store.proxy_type(), ProxyType::None);
    assert_eq!(store.proxy_port(), 0);
    assert_eq!(store.circle_name(0).as_deref(), Some("x"));
}

#[test]
fn test_mistyped_global_key_keeps_the_rest_of_the_file() {
    // Arrange
    let tmp = TempDir::new();
    std::fs::write(
        tmp.path().join("settings.ini"),
        "[General]\ntranslation = \"nl\"\nautoAwayTime = \"ten\"\n",
    )
    .unwrap();

    // Act
    {
        let store = open(tmp.path());
        store
            .update_profile_data(Some(&LocalProfile::unencrypted("ivan")))
            .unwrap();
        store.sync();
    }
    let store = open(tmp.path());

    // Assert
    assert_eq!(store.translation(), "nl");
    assert_eq!(store.auto_away_time(), 10);
}

#[test]
fn test_negative_auto_away_time_in_file_is_repaired() {
    let tmp = TempDir::new();
    std::fs::write(
        tmp.path().join("settings.ini"),
        "[General]\nautoAwayTime = -3\ntranslation = \"nl\"\n",
    )
    .unwrap();

    let store = open(tmp.path());

    assert_eq!(store.auto_away_time(), 10);
    assert_eq!(store.translation(), "nl");
}

#[test]
fn test_legacy_auto_accept_key_backs_empty_directory() {
    let tmp = TempDir::new();
    let text = format!(
        "[[Friends.Friend]]\naddr = \"{ALICE_ADDR}\"\nautoAccept = \"/downloads/alice\"\n"
    );
    std::fs::write(tmp.path().join("gina.ini"), text).unwrap();
    let store = open(tmp.path());

    store
        .update_profile_data(Some(&LocalProfile::unencrypted("gina")))
        .unwrap();

    assert_eq!(store.auto_accept_dir(&alice_key()), "/downloads/alice");
}

#[test]
fn test_first_run_uses_bundled_defaults_without_writing() {
    let tmp = TempDir::new();

    let store = open(tmp.path());
    store.sync();

    assert!(store.is_loaded());
    assert_eq!(store.style(), "Fusion");
    assert!(!tmp.path().join("settings.ini").exists());
}

// ── Save gating ───────────────────────────────────────────────────────────────

#[test]
fn test_profile_switch_persists_current_profile_pointer() {
    let tmp = TempDir::new();
    let store = open(tmp.path());

    store
        .update_profile_data(Some(&LocalProfile::unencrypted("henry")))
        .unwrap();
    store.sync();

    let text = std::fs::read_to_string(tmp.path().join("settings.ini")).unwrap();
    assert!(text.contains("currentProfile = \"henry\""));
}

#[test]
fn test_reset_deletes_personal_file_and_suppresses_saves() {
    // Arrange
    let tmp = TempDir::new();
    let store = open(tmp.path());
    store
        .update_profile_data(Some(&LocalProfile::unencrypted("ivy")))
        .unwrap();
    store.add_circle("Friends");
    store.sync();
    let personal = tmp.path().join("ivy.ini");
    assert!(personal.exists());

    // Act
    store.reset_to_default();
    store.add_circle("After reset");
    store.save_global();
    store.sync();

    // Assert
    assert!(!personal.exists());
    assert!(tmp.path().join("settings.ini").exists());
}

#[test]
fn test_save_after_reset_does_not_write_global_file() {
    let tmp = TempDir::new();
    let store = open(tmp.path());

    store.reset_to_default();
    store.set_translation("fr");
    store.save_global();
    store.sync();

    assert!(!tmp.path().join("settings.ini").exists());
}

#[test]
fn test_save_from_other_thread_is_written_after_sync() {
    // Arrange
    let tmp = TempDir::new();
    let store = Arc::new(open(tmp.path()));
    store
        .update_profile_data(Some(&LocalProfile::unencrypted("jack")))
        .unwrap();

    // Act
    let worker_store = Arc::clone(&store);
    thread::spawn(move || {
        worker_store.set_contact_alias(alice_key(), "from another thread");
        worker_store.save_personal(&LocalProfile::unencrypted("jack"));
    })
    .join()
    .unwrap();
    store.sync();

    // Assert
    let text = std::fs::read_to_string(tmp.path().join("jack.ini")).unwrap();
    assert!(text.contains("from another thread"));
}

#[test]
fn test_concurrent_setters_and_saves_produce_consistent_file() {
    // Arrange
    let tmp = TempDir::new();
    let store = Arc::new(open(tmp.path()));
    let profile = LocalProfile::unencrypted("kim");
    store.update_profile_data(Some(&profile)).unwrap();

    // Act
    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25u8 {
                    let mut bytes = [0u8; 32];
                    bytes[0] = t;
                    bytes[1] = i;
                    store.set_contact_alias(PublicKey::from_bytes(bytes), format!("{t}/{i}"));
                    store.save_active_personal();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    store.save_active_personal();
    store.sync();
    drop(store);

    // Assert
    let reopened = open(tmp.path());
    reopened.update_profile_data(Some(&profile)).unwrap();
    assert_eq!(reopened.contact_count(), 100);
}

// ── Portable mode ─────────────────────────────────────────────────────────────

#[test]
fn test_portable_toggle_moves_global_file() {
    // Arrange
    let tmp = TempDir::new();
    let location = SettingsLocation {
        user_dir: tmp.path().join("user"),
        portable_dir: Some(tmp.path().join("app")),
    };
    let store = SettingsStore::new(Arc::new(FileRepository::new()), location.clone()).unwrap();
    store.set_translation("sv");
    store.save_global();
    store.sync();
    assert!(tmp.path().join("user/settings.ini").exists());

    // Act
    store.set_make_portable(true);
    store.sync();
    drop(store);

    // Assert
    assert!(!tmp.path().join("user/settings.ini").exists());
    assert!(tmp.path().join("app/settings.ini").exists());
    let reopened = SettingsStore::new(Arc::new(FileRepository::new()), location).unwrap();
    assert!(reopened.make_portable());
    assert_eq!(reopened.translation(), "sv");
}

// ── Events ────────────────────────────────────────────────────────────────────

#[test]
fn test_event_channel_reports_profile_switch() {
    let tmp = TempDir::new();
    let store = open(tmp.path());
    let mut rx = store.events();

    store
        .update_profile_data(Some(&LocalProfile::unencrypted("lena")))
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(events.contains(&SettingsEvent::CurrentProfileChanged("lena".to_string())));
    assert!(events.contains(&SettingsEvent::PersonalLoaded("lena".to_string())));
    let id_events = events
        .iter()
        .filter(|e| matches!(e, SettingsEvent::CurrentProfileIdChanged(_)))
        .count();
    assert_eq!(id_events, 1);
}
