//! Change notifications.
//!
//! Every setter that changes a value emits one [`SettingsEvent`] carrying the
//! new value.  Events are collected while the store lock is held and delivered
//! after it has been released, synchronously on the calling thread and before
//! the setter returns.  A listener may therefore call back into the store
//! without deadlocking, but it must be quick: the setter's caller waits for it.
//!
//! # Consuming events (for beginners)
//!
//! Two ways to listen:
//!
//! - [`EventBus::subscribe`] registers a closure that runs for every event.
//! - [`EventBus::channel`] returns a Tokio unbounded receiver, convenient
//!   from async code: `while let Some(event) = rx.recv().await { .. }`.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use settings_core::{
    AutoAcceptCall, FriendSortingMethod, ProxyType, PublicKey, Rect, StyleType,
};
use tokio::sync::mpsc;

/// One change to the settings, with the new value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    // ── Login / General ──
    AutoLoginChanged(bool),
    TranslationChanged(String),
    ShowSystemTrayChanged(bool),
    AutostartInTrayChanged(bool),
    CloseToTrayChanged(bool),
    CurrentProfileChanged(String),
    CurrentProfileIdChanged(u32),
    AutoAwayTimeChanged(i32),
    CheckUpdatesChanged(bool),
    NotifySoundChanged(bool),
    NotifyHideChanged(bool),
    BusySoundChanged(bool),
    AutoSaveEnabledChanged(bool),
    GlobalAutoAcceptDirChanged(String),
    AutoAcceptMaxSizeChanged(u64),
    StylePreferenceChanged(StyleType),

    // ── Advanced ──
    MakePortableChanged(bool),
    EnableIpv6Changed(bool),
    ForceTcpChanged(bool),
    EnableLanDiscoveryChanged(bool),
    DbSyncTypeChanged(i32),

    // ── Widgets ──
    /// Carries the widget name; read the blob with `widget_data`.
    WidgetDataChanged(String),

    // ── GUI ──
    ShowWindowChanged(bool),
    NotifyChanged(bool),
    DesktopNotifyChanged(bool),
    GroupAlwaysNotifyChanged(bool),
    GroupchatPositionChanged(bool),
    SeparateWindowChanged(bool),
    DontGroupWindowsChanged(bool),
    ShowIdenticonsChanged(bool),
    SmileyPackChanged(String),
    EmojiFontPointSizeChanged(i32),
    FirstColumnHandlePosChanged(i32),
    SecondColumnHandlePosFromRightChanged(i32),
    TimestampFormatChanged(String),
    DateFormatChanged(String),
    MinimizeOnCloseChanged(bool),
    MinimizeToTrayChanged(bool),
    LightTrayIconChanged(bool),
    UseEmoticonsChanged(bool),
    StatusChangeNotificationEnabledChanged(bool),
    SpellCheckingEnabledChanged(bool),
    ThemeColorChanged(i32),
    StyleChanged(String),
    NameColorsChanged(bool),

    // ── Chat / State ──
    ChatMessageFontChanged(String),
    WindowGeometryChanged(Vec<u8>),
    WindowStateChanged(Vec<u8>),
    SplitterStateChanged(Vec<u8>),
    DialogGeometryChanged(Vec<u8>),
    DialogSplitterStateChanged(Vec<u8>),
    DialogSettingsGeometryChanged(Vec<u8>),

    // ── Audio / Video ──
    InDevChanged(String),
    AudioInDevEnabledChanged(bool),
    OutDevChanged(String),
    AudioOutDevEnabledChanged(bool),
    InGainChanged(f64),
    AudioThresholdChanged(f64),
    OutVolumeChanged(i32),
    EnableTestSoundChanged(bool),
    AudioBitrateChanged(i32),
    EnableBackend2Changed(bool),
    VideoDevChanged(String),
    CamVideoResChanged(Rect),
    ScreenRegionChanged(Rect),
    ScreenGrabbedChanged(bool),
    CamVideoFpsChanged(u16),

    // ── Personal scalars ──
    TypingNotificationChanged(bool),
    EnableLoggingChanged(bool),
    BlockListChanged(Vec<String>),
    CompactLayoutChanged(bool),
    SortingModeChanged(FriendSortingMethod),
    ProxyTypeChanged(ProxyType),
    ProxyAddressChanged(String),
    ProxyPortChanged(u16),

    // ── Contacts ──
    ContactAddressChanged { key: PublicKey, address: String },
    ContactAliasChanged { key: PublicKey, alias: String },
    ContactNoteChanged { key: PublicKey, note: String },
    ContactAutoAcceptDirChanged { key: PublicKey, dir: String },
    ContactAutoAcceptCallChanged { key: PublicKey, flags: AutoAcceptCall },
    ContactAutoGroupInviteChanged { key: PublicKey, enabled: bool },
    ContactCircleChanged { key: PublicKey, circle: Option<usize> },
    ContactActivityChanged { key: PublicKey, activity: DateTime<Utc> },
    ContactRemoved(PublicKey),

    // ── Circles ──
    CircleAdded { index: usize, name: String },
    CircleRenamed { index: usize, name: String },
    CircleExpandedChanged { index: usize, expanded: bool },
    /// `count` is the number of circles left.
    CircleRemoved { index: usize, count: usize },

    // ── Requests ──
    FriendRequestQueued { address: String, message: String },
    FriendRequestRead(usize),
    FriendRequestRemoved(usize),
    FriendRequestsAllRead,

    // ── Lifecycle ──
    /// Personal settings of `profile` were (re)loaded.
    PersonalLoaded(String),
}

/// A registered listener.
pub type Listener = Arc<dyn Fn(&SettingsEvent) + Send + Sync>;

/// Listener registry.
///
/// Channel receivers handed out by [`channel`](EventBus::channel) are kept
/// apart from plain listeners so a sender whose receiver is gone can be
/// dropped.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<Listener>>,
    channels: RwLock<Vec<mpsc::UnboundedSender<SettingsEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for every future event.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&SettingsEvent) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Returns a receiver that gets a copy of every future event.
    ///
    /// The sender is unregistered once the receiver has been dropped.
    pub fn channel(&self) -> mpsc::UnboundedReceiver<SettingsEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        channels.retain(|sender| !sender.is_closed());
        channels.push(tx);
        rx
    }

    /// Delivers `event` to every listener in registration order, then to
    /// every open channel.
    pub fn emit(&self, event: &SettingsEvent) {
        // Snapshot first so a listener may subscribe without deadlocking.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(event);
        }

        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of channels whose receiver was still open at the last emit or
    /// registration.
    pub fn channel_count(&self) -> usize {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
