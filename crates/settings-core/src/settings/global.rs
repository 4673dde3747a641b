//! Global settings: everything that does not belong to a single profile.
//!
//! The on-disk layout is one TOML table per section.  Keys use the camelCase
//! names the settings file has always used:
//!
//! ```toml
//! [General]
//! translation = "en"
//! currentProfile = "alice"
//! autoAwayTime = 10
//!
//! [Advanced]
//! makeToxPortable = false
//! enableIPv6 = true
//! ```
//!
//! Every section is `#[serde(default)]`, so a missing section, a missing key or
//! an empty file yields the documented default for each absent value.
//! [`GlobalSettings::from_toml`] goes further and decodes key by key, so a
//! value of the wrong type only resets its own key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::lenient;

/// Default number of minutes of inactivity before the status goes "away".
pub const DEFAULT_AUTO_AWAY_MINUTES: i32 = 10;

/// Default size limit for auto-accepted file transfers (20 MiB).
pub const DEFAULT_AUTO_ACCEPT_MAX_SIZE: u64 = 20 << 20;

/// Smiley pack used when none is configured.
pub const DEFAULT_SMILEY_PACK: &str = ":/smileys/emojione/emoticons.xml";

/// Widget style used when none is configured.
pub const DEFAULT_STYLE: &str = "Fusion";

// ── Value types ───────────────────────────────────────────────────────────────

/// How text emphasis markers (`*bold*`, `_italic_`) are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum StyleType {
    /// Markers are shown as typed, no styling.
    None,
    /// Styling applied, markers kept.
    #[default]
    WithChars,
    /// Styling applied, markers hidden.
    WithoutChars,
}

impl From<i32> for StyleType {
    fn from(value: i32) -> Self {
        match value {
            0 => StyleType::None,
            1 => StyleType::WithChars,
            2 => StyleType::WithoutChars,
            other => {
                warn!(value = other, "unknown style preference, using default");
                StyleType::default()
            }
        }
    }
}

impl From<StyleType> for i32 {
    fn from(value: StyleType) -> Self {
        match value {
            StyleType::None => 0,
            StyleType::WithChars => 1,
            StyleType::WithoutChars => 2,
        }
    }
}

/// A rectangle in screen pixels.  All zero means "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn is_null(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// Complete global settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    #[serde(rename = "Login")]
    pub login: LoginSection,
    #[serde(rename = "General")]
    pub general: GeneralSection,
    #[serde(rename = "Advanced")]
    pub advanced: AdvancedSection,
    /// Opaque per-widget state blobs keyed by widget name.
    #[serde(rename = "Widgets")]
    pub widgets: BTreeMap<String, Vec<u8>>,
    #[serde(rename = "GUI")]
    pub gui: GuiSection,
    #[serde(rename = "Chat")]
    pub chat: ChatSection,
    #[serde(rename = "State")]
    pub state: StateSection,
    #[serde(rename = "Audio")]
    pub audio: AudioSection,
    #[serde(rename = "Video")]
    pub video: VideoSection,
}

impl GlobalSettings {
    /// Parses the text of a global settings file.
    ///
    /// Each key is decoded on its own.  A value that does not fit its field
    /// is logged and replaced by that field's default; the other keys are
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns the parser error only when `text` is not a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let mut doc = lenient::parse(text)?;
        let mut section = |name: &str| lenient::take_section(&mut doc, name);
        Ok(Self {
            login: lenient::decode("Login", section("Login")),
            general: lenient::decode("General", section("General")),
            advanced: lenient::decode("Advanced", section("Advanced")),
            widgets: lenient::decode("Widgets", section("Widgets")),
            gui: lenient::decode("GUI", section("GUI")),
            chat: lenient::decode("Chat", section("Chat")),
            state: lenient::decode("State", section("State")),
            audio: lenient::decode("Audio", section("Audio")),
            video: lenient::decode("Video", section("Video")),
        })
    }

    /// Applies the sanity repairs done on every load: a negative auto-away
    /// time and an empty widget style fall back to their defaults.
    pub fn repair(&mut self) {
        if self.general.auto_away_time < 0 {
            warn!(
                value = self.general.auto_away_time,
                "negative auto-away time, using default"
            );
            self.general.auto_away_time = DEFAULT_AUTO_AWAY_MINUTES;
        }
        if self.gui.style.is_empty() {
            self.gui.style = DEFAULT_STYLE.to_string();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginSection {
    pub auto_login: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralSection {
    pub translation: String,
    pub show_system_tray: bool,
    pub autostart_in_tray: bool,
    pub close_to_tray: bool,
    /// Name of the profile that was active last.
    pub current_profile: String,
    /// Minutes; negative values are repaired to the default.
    pub auto_away_time: i32,
    pub check_updates: bool,
    pub notify_sound: bool,
    pub notify_hide: bool,
    pub busy_sound: bool,
    pub auto_save_enabled: bool,
    pub global_auto_accept_dir: String,
    pub auto_accept_max_size: u64,
    pub style_preference: StyleType,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            translation: "en".to_string(),
            show_system_tray: true,
            autostart_in_tray: false,
            close_to_tray: false,
            current_profile: String::new(),
            auto_away_time: DEFAULT_AUTO_AWAY_MINUTES,
            check_updates: true,
            notify_sound: true,
            notify_hide: false,
            busy_sound: false,
            auto_save_enabled: false,
            global_auto_accept_dir: default_download_dir(),
            auto_accept_max_size: DEFAULT_AUTO_ACCEPT_MAX_SIZE,
            style_preference: StyleType::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvancedSection {
    /// Store settings next to the executable instead of the user config dir.
    #[serde(rename = "makeToxPortable")]
    pub make_portable: bool,
    #[serde(rename = "enableIPv6")]
    pub enable_ipv6: bool,
    #[serde(rename = "forceTCP")]
    pub force_tcp: bool,
    pub enable_lan_discovery: bool,
    pub db_sync_type: i32,
}

impl Default for AdvancedSection {
    fn default() -> Self {
        Self {
            make_portable: false,
            enable_ipv6: true,
            force_tcp: false,
            enable_lan_discovery: true,
            db_sync_type: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuiSection {
    pub show_window: bool,
    pub notify: bool,
    pub desktop_notify: bool,
    pub group_always_notify: bool,
    pub groupchat_position: bool,
    pub separate_window: bool,
    pub dont_group_windows: bool,
    pub show_identicons: bool,
    pub smiley_pack: String,
    pub emoji_font_point_size: i32,
    pub first_column_handle_pos: i32,
    pub second_column_handle_pos_from_right: i32,
    pub timestamp_format: String,
    pub date_format: String,
    pub minimize_on_close: bool,
    pub minimize_to_tray: bool,
    pub light_tray_icon: bool,
    pub use_emoticons: bool,
    pub status_change_notification_enabled: bool,
    pub spell_checking_enabled: bool,
    pub theme_color: i32,
    pub style: String,
    pub name_colors: bool,
}

impl Default for GuiSection {
    fn default() -> Self {
        Self {
            show_window: true,
            notify: true,
            desktop_notify: true,
            group_always_notify: true,
            groupchat_position: true,
            separate_window: false,
            dont_group_windows: false,
            show_identicons: true,
            smiley_pack: DEFAULT_SMILEY_PACK.to_string(),
            emoji_font_point_size: 24,
            first_column_handle_pos: 50,
            second_column_handle_pos_from_right: 50,
            timestamp_format: "hh:mm:ss".to_string(),
            date_format: "yyyy-MM-dd".to_string(),
            minimize_on_close: false,
            minimize_to_tray: false,
            light_tray_icon: false,
            use_emoticons: true,
            status_change_notification_enabled: false,
            spell_checking_enabled: true,
            theme_color: 0,
            style: DEFAULT_STYLE.to_string(),
            name_colors: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatSection {
    /// Font description, `family,pointSize`.
    pub chat_message_font: String,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            chat_message_font: "sans-serif,12".to_string(),
        }
    }
}

/// Window and splitter geometry blobs saved by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateSection {
    pub window_geometry: Vec<u8>,
    pub window_state: Vec<u8>,
    pub splitter_state: Vec<u8>,
    pub dialog_geometry: Vec<u8>,
    pub dialog_splitter_state: Vec<u8>,
    pub dialog_settings_geometry: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioSection {
    pub in_dev: String,
    pub audio_in_dev_enabled: bool,
    pub out_dev: String,
    pub audio_out_dev_enabled: bool,
    /// Input gain in decibels.
    pub in_gain: f64,
    pub audio_threshold: f64,
    pub out_volume: i32,
    pub enable_test_sound: bool,
    /// Kbit/s.
    pub audio_bitrate: i32,
    pub enable_backend2: bool,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            in_dev: String::new(),
            audio_in_dev_enabled: true,
            out_dev: String::new(),
            audio_out_dev_enabled: true,
            in_gain: 0.0,
            audio_threshold: 0.0,
            out_volume: 100,
            enable_test_sound: true,
            audio_bitrate: 64,
            enable_backend2: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoSection {
    pub video_dev: String,
    pub screen_grabbed: bool,
    #[serde(rename = "camVideoFPS")]
    pub cam_video_fps: u16,
    // Tables last so the TOML writer never has to emit a value after them.
    pub cam_video_res: Rect,
    pub screen_region: Rect,
}

/// The user's home directory, or empty when it cannot be determined.
fn default_download_dir() -> String {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
