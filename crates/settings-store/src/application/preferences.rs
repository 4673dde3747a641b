//! Getters and setters for the scalar settings.
//!
//! Most scalars follow the same pattern: the getter clones the value out under
//! the lock, the setter stores the new value and, only if it differs, emits
//! the matching [`SettingsEvent`].  The [`preferences!`] macro generates that
//! pair for every field listed below.  The few scalars with extra rules
//! (auto-away repair, widget blobs, the block list) are written by hand at the
//! end of the file.
//!
//! Setters change memory only.  Call `save_global` or `save_personal` to
//! persist.

use settings_core::{
    FriendSortingMethod, ProxySettings, ProxyType, Rect, StyleType, DEFAULT_AUTO_AWAY_MINUTES,
};
use tracing::debug;

use super::events::SettingsEvent;
use super::store::SettingsStore;

/// Generates `getter` / `set_getter` pairs over a field path of `StoreState`.
///
/// ```text
/// translation, set_translation: String = global.general.translation => TranslationChanged;
/// ```
macro_rules! preferences {
    ($(
        $(#[$meta:meta])*
        $getter:ident, $setter:ident : $ty:ty = $($field:ident).+ => $event:ident;
    )*) => {
        impl SettingsStore {
            $(
                $(#[$meta])*
                pub fn $getter(&self) -> $ty {
                    self.read(|st| Clone::clone(&st.$($field).+))
                }

                pub fn $setter(&self, value: impl Into<$ty>) {
                    let value: $ty = value.into();
                    self.mutate(|st, events| {
                        if st.$($field).+ != value {
                            st.$($field).+ = Clone::clone(&value);
                            events.push(SettingsEvent::$event(value));
                        }
                    });
                }
            )*
        }
    };
}

// ── Global: Login / General ───────────────────────────────────────────────────

preferences! {
    auto_login, set_auto_login: bool = global.login.auto_login => AutoLoginChanged;
    /// UI language code, e.g. `"en"`.
    translation, set_translation: String = global.general.translation => TranslationChanged;
    show_system_tray, set_show_system_tray: bool = global.general.show_system_tray => ShowSystemTrayChanged;
    autostart_in_tray, set_autostart_in_tray: bool = global.general.autostart_in_tray => AutostartInTrayChanged;
    close_to_tray, set_close_to_tray: bool = global.general.close_to_tray => CloseToTrayChanged;
    check_updates, set_check_updates: bool = global.general.check_updates => CheckUpdatesChanged;
    notify_sound, set_notify_sound: bool = global.general.notify_sound => NotifySoundChanged;
    notify_hide, set_notify_hide: bool = global.general.notify_hide => NotifyHideChanged;
    busy_sound, set_busy_sound: bool = global.general.busy_sound => BusySoundChanged;
    auto_save_enabled, set_auto_save_enabled: bool = global.general.auto_save_enabled => AutoSaveEnabledChanged;
    /// Directory incoming files are saved to when no per-contact directory is set.
    global_auto_accept_dir, set_global_auto_accept_dir: String = global.general.global_auto_accept_dir => GlobalAutoAcceptDirChanged;
    /// Bytes.
    auto_accept_max_size, set_auto_accept_max_size: u64 = global.general.auto_accept_max_size => AutoAcceptMaxSizeChanged;
    style_preference, set_style_preference: StyleType = global.general.style_preference => StylePreferenceChanged;
}

// ── Global: Advanced ──────────────────────────────────────────────────────────

preferences! {
    enable_ipv6, set_enable_ipv6: bool = global.advanced.enable_ipv6 => EnableIpv6Changed;
    force_tcp, set_force_tcp: bool = global.advanced.force_tcp => ForceTcpChanged;
    enable_lan_discovery, set_enable_lan_discovery: bool = global.advanced.enable_lan_discovery => EnableLanDiscoveryChanged;
    /// Stored and reported only; nothing in the store interprets it.
    db_sync_type, set_db_sync_type: i32 = global.advanced.db_sync_type => DbSyncTypeChanged;
}

// ── Global: GUI / Chat / State ────────────────────────────────────────────────

preferences! {
    show_window, set_show_window: bool = global.gui.show_window => ShowWindowChanged;
    notify, set_notify: bool = global.gui.notify => NotifyChanged;
    desktop_notify, set_desktop_notify: bool = global.gui.desktop_notify => DesktopNotifyChanged;
    group_always_notify, set_group_always_notify: bool = global.gui.group_always_notify => GroupAlwaysNotifyChanged;
    groupchat_position, set_groupchat_position: bool = global.gui.groupchat_position => GroupchatPositionChanged;
    separate_window, set_separate_window: bool = global.gui.separate_window => SeparateWindowChanged;
    dont_group_windows, set_dont_group_windows: bool = global.gui.dont_group_windows => DontGroupWindowsChanged;
    show_identicons, set_show_identicons: bool = global.gui.show_identicons => ShowIdenticonsChanged;
    smiley_pack, set_smiley_pack: String = global.gui.smiley_pack => SmileyPackChanged;
    emoji_font_point_size, set_emoji_font_point_size: i32 = global.gui.emoji_font_point_size => EmojiFontPointSizeChanged;
    first_column_handle_pos, set_first_column_handle_pos: i32 = global.gui.first_column_handle_pos => FirstColumnHandlePosChanged;
    second_column_handle_pos_from_right, set_second_column_handle_pos_from_right: i32 =
        global.gui.second_column_handle_pos_from_right => SecondColumnHandlePosFromRightChanged;
    timestamp_format, set_timestamp_format: String = global.gui.timestamp_format => TimestampFormatChanged;
    date_format, set_date_format: String = global.gui.date_format => DateFormatChanged;
    minimize_on_close, set_minimize_on_close: bool = global.gui.minimize_on_close => MinimizeOnCloseChanged;
    minimize_to_tray, set_minimize_to_tray: bool = global.gui.minimize_to_tray => MinimizeToTrayChanged;
    light_tray_icon, set_light_tray_icon: bool = global.gui.light_tray_icon => LightTrayIconChanged;
    use_emoticons, set_use_emoticons: bool = global.gui.use_emoticons => UseEmoticonsChanged;
    status_change_notification_enabled, set_status_change_notification_enabled: bool =
        global.gui.status_change_notification_enabled => StatusChangeNotificationEnabledChanged;
    spell_checking_enabled, set_spell_checking_enabled: bool = global.gui.spell_checking_enabled => SpellCheckingEnabledChanged;
    theme_color, set_theme_color: i32 = global.gui.theme_color => ThemeColorChanged;
    /// Widget style name.  Not validated against the installed styles.
    style, set_style: String = global.gui.style => StyleChanged;
    name_colors, set_name_colors: bool = global.gui.name_colors => NameColorsChanged;

    chat_message_font, set_chat_message_font: String = global.chat.chat_message_font => ChatMessageFontChanged;

    window_geometry, set_window_geometry: Vec<u8> = global.state.window_geometry => WindowGeometryChanged;
    window_state, set_window_state: Vec<u8> = global.state.window_state => WindowStateChanged;
    splitter_state, set_splitter_state: Vec<u8> = global.state.splitter_state => SplitterStateChanged;
    dialog_geometry, set_dialog_geometry: Vec<u8> = global.state.dialog_geometry => DialogGeometryChanged;
    dialog_splitter_state, set_dialog_splitter_state: Vec<u8> = global.state.dialog_splitter_state => DialogSplitterStateChanged;
    dialog_settings_geometry, set_dialog_settings_geometry: Vec<u8> =
        global.state.dialog_settings_geometry => DialogSettingsGeometryChanged;
}

// ── Global: Audio / Video ─────────────────────────────────────────────────────

preferences! {
    in_dev, set_in_dev: String = global.audio.in_dev => InDevChanged;
    audio_in_dev_enabled, set_audio_in_dev_enabled: bool = global.audio.audio_in_dev_enabled => AudioInDevEnabledChanged;
    out_dev, set_out_dev: String = global.audio.out_dev => OutDevChanged;
    audio_out_dev_enabled, set_audio_out_dev_enabled: bool = global.audio.audio_out_dev_enabled => AudioOutDevEnabledChanged;
    /// Decibels.
    in_gain, set_in_gain: f64 = global.audio.in_gain => InGainChanged;
    audio_threshold, set_audio_threshold: f64 = global.audio.audio_threshold => AudioThresholdChanged;
    out_volume, set_out_volume: i32 = global.audio.out_volume => OutVolumeChanged;
    enable_test_sound, set_enable_test_sound: bool = global.audio.enable_test_sound => EnableTestSoundChanged;
    audio_bitrate, set_audio_bitrate: i32 = global.audio.audio_bitrate => AudioBitrateChanged;
    enable_backend2, set_enable_backend2: bool = global.audio.enable_backend2 => EnableBackend2Changed;

    video_dev, set_video_dev: String = global.video.video_dev => VideoDevChanged;
    cam_video_res, set_cam_video_res: Rect = global.video.cam_video_res => CamVideoResChanged;
    screen_region, set_screen_region: Rect = global.video.screen_region => ScreenRegionChanged;
    screen_grabbed, set_screen_grabbed: bool = global.video.screen_grabbed => ScreenGrabbedChanged;
    cam_video_fps, set_cam_video_fps: u16 = global.video.cam_video_fps => CamVideoFpsChanged;
}

// ── Personal scalars ──────────────────────────────────────────────────────────

preferences! {
    typing_notification, set_typing_notification: bool = personal.privacy.typing_notification => TypingNotificationChanged;
    /// Also gates whether contact activity is kept on save.
    enable_logging, set_enable_logging: bool = personal.privacy.enable_logging => EnableLoggingChanged;
    compact_layout, set_compact_layout: bool = personal.compact_layout => CompactLayoutChanged;
    sorting_mode, set_sorting_mode: FriendSortingMethod = personal.sorting_mode => SortingModeChanged;
    proxy_type, set_proxy_type: ProxyType = personal.proxy.proxy_type => ProxyTypeChanged;
    proxy_addr, set_proxy_addr: String = personal.proxy.proxy_addr => ProxyAddressChanged;
    proxy_port, set_proxy_port: u16 = personal.proxy.proxy_port => ProxyPortChanged;
}

// ── Hand-written accessors ────────────────────────────────────────────────────

impl SettingsStore {
    /// Minutes of inactivity before the status goes away.
    pub fn auto_away_time(&self) -> i32 {
        self.read(|st| st.global.general.auto_away_time)
    }

    /// Sets the auto-away delay.  Negative values are replaced by the default.
    pub fn set_auto_away_time(&self, minutes: i32) {
        let minutes = if minutes < 0 {
            debug!(minutes, "negative auto-away time, using default");
            DEFAULT_AUTO_AWAY_MINUTES
        } else {
            minutes
        };
        self.mutate(|st, events| {
            if st.global.general.auto_away_time != minutes {
                st.global.general.auto_away_time = minutes;
                events.push(SettingsEvent::AutoAwayTimeChanged(minutes));
            }
        });
    }

    /// Saved state blob of the widget `name`, empty if none.
    pub fn widget_data(&self, name: &str) -> Vec<u8> {
        self.read(|st| st.global.widgets.get(name).cloned().unwrap_or_default())
    }

    pub fn set_widget_data(&self, name: &str, data: Vec<u8>) {
        self.mutate(|st, events| {
            if st.global.widgets.get(name) != Some(&data) {
                st.global.widgets.insert(name.to_string(), data);
                events.push(SettingsEvent::WidgetDataChanged(name.to_string()));
            }
        });
    }

    /// Blocked addresses.
    pub fn block_list(&self) -> Vec<String> {
        self.read(|st| st.personal.privacy.block_list.clone())
    }

    pub fn set_block_list(&self, list: Vec<String>) {
        self.mutate(|st, events| {
            if st.personal.privacy.block_list != list {
                st.personal.privacy.block_list = list.clone();
                events.push(SettingsEvent::BlockListChanged(list));
            }
        });
    }

    /// Snapshot of the proxy configuration.
    pub fn proxy(&self) -> ProxySettings {
        self.read(|st| st.personal.proxy.clone())
    }
}
