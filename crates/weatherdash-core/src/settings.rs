//! Theme and language preferences.
//!
//! `Settings` owns the active theme and language, persists both through a
//! [`PreferenceStore`] and mirrors them onto a [`PresentationRoot`] (the
//! document-level attributes the view layer renders against).

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::storage::PreferenceStore;

/// Storage key for the theme preference
pub const THEME_KEY: &str = "theme";
/// Storage key for the language preference
pub const LOCALE_KEY: &str = "locale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(UnknownSetting(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Fa,
}

impl Language {
    /// BCP 47 language tag
    pub fn tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
            Self::Fa => "fa",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Ar | Self::Fa)
    }

    pub fn direction(self) -> TextDirection {
        if self.is_rtl() {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "ar" => Ok(Self::Ar),
            "fa" => Ok(Self::Fa),
            other => Err(UnknownSetting(other.to_string())),
        }
    }
}

/// Unrecognized stored or user-supplied setting value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown setting value: {0}")]
pub struct UnknownSetting(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// An entry of the language picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageOption {
    pub value: Language,
    pub label: &'static str,
    pub flag: &'static str,
}

const LANGUAGE_OPTIONS: [LanguageOption; 3] = [
    LanguageOption {
        value: Language::En,
        label: "English",
        flag: "🇺🇸",
    },
    LanguageOption {
        value: Language::Ar,
        label: "العربية",
        flag: "🇸🇦",
    },
    LanguageOption {
        value: Language::Fa,
        label: "فارسی",
        flag: "🇮🇷",
    },
];

/// Document-level presentation attributes driven by the settings.
pub trait PresentationRoot: Send + Sync {
    fn apply_theme(&self, theme: ThemeMode);
    fn apply_locale(&self, language: Language);
    fn set_dir(&self, dir: TextDirection);
    fn set_lang(&self, tag: &str);
}

/// Current values of the presentation root
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentAttributes {
    pub theme: ThemeMode,
    pub locale: Language,
    pub dir: TextDirection,
    pub lang: String,
}

/// In-process presentation root that records the applied attributes.
#[derive(Debug, Default)]
pub struct DocumentRoot {
    attrs: RwLock<DocumentAttributes>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes(&self) -> DocumentAttributes {
        self.attrs.read().clone()
    }
}

impl PresentationRoot for DocumentRoot {
    fn apply_theme(&self, theme: ThemeMode) {
        self.attrs.write().theme = theme;
    }

    fn apply_locale(&self, language: Language) {
        self.attrs.write().locale = language;
    }

    fn set_dir(&self, dir: TextDirection) {
        self.attrs.write().dir = dir;
    }

    fn set_lang(&self, tag: &str) {
        self.attrs.write().lang = tag.to_string();
    }
}

/// Snapshot of the settings published to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsState {
    pub theme: ThemeMode,
    pub language: Language,
}

impl SettingsState {
    pub fn is_rtl(&self) -> bool {
        self.language.is_rtl()
    }
}

pub struct Settings {
    storage: Arc<dyn PreferenceStore>,
    root: Arc<dyn PresentationRoot>,
    state: watch::Sender<SettingsState>,
    initialized: AtomicBool,
}

impl Settings {
    /// Create settings from persisted values, defaulting to light/en.
    ///
    /// Nothing is applied to the presentation root until [`Settings::init`].
    pub fn new(storage: Arc<dyn PreferenceStore>, root: Arc<dyn PresentationRoot>) -> Self {
        let theme = read_setting::<ThemeMode>(storage.as_ref(), THEME_KEY);
        let language = read_setting::<Language>(storage.as_ref(), LOCALE_KEY);

        Self {
            storage,
            root,
            state: watch::Sender::new(SettingsState { theme, language }),
            initialized: AtomicBool::new(false),
        }
    }

    /// Apply the current theme and language to the presentation root.
    /// Only the first call has an effect.
    pub fn init(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let state = self.state();
        self.root.apply_theme(state.theme);
        self.apply_language(state.language);
        tracing::info!(
            "Settings initialized: theme={}, language={}",
            state.theme,
            state.language
        );
    }

    pub fn state(&self) -> SettingsState {
        *self.state.borrow()
    }

    pub fn theme(&self) -> ThemeMode {
        self.state.borrow().theme
    }

    pub fn language(&self) -> Language {
        self.state.borrow().language
    }

    pub fn is_rtl(&self) -> bool {
        self.state.borrow().is_rtl()
    }

    pub fn language_options(&self) -> &'static [LanguageOption] {
        &LANGUAGE_OPTIONS
    }

    /// Receive the settings after every change
    pub fn subscribe(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    pub fn set_theme(&self, theme: ThemeMode) {
        self.state.send_modify(|s| s.theme = theme);
        self.root.apply_theme(theme);
        persist(self.storage.as_ref(), THEME_KEY, theme.as_str());
    }

    pub fn toggle_theme(&self) {
        self.set_theme(self.theme().toggled());
    }

    pub fn set_language(&self, language: Language) {
        self.state.send_modify(|s| s.language = language);
        persist(self.storage.as_ref(), LOCALE_KEY, language.tag());
        self.apply_language(language);
    }

    fn apply_language(&self, language: Language) {
        self.root.apply_locale(language);
        self.root.set_dir(language.direction());
        self.root.set_lang(language.tag());
    }
}

fn read_setting<T>(storage: &dyn PreferenceStore, key: &str) -> T
where
    T: FromStr + Default,
{
    storage
        .get(key)
        .and_then(|raw| match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unknown stored {} value: {}", key, raw);
                None
            }
        })
        .unwrap_or_default()
}

fn persist(storage: &dyn PreferenceStore, key: &str, value: &str) {
    if let Err(e) = storage.set(key, value) {
        tracing::warn!("Failed to persist {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn settings_with(storage: Arc<MemoryStorage>) -> (Settings, Arc<DocumentRoot>) {
        let root = Arc::new(DocumentRoot::new());
        let settings = Settings::new(storage, root.clone());
        (settings, root)
    }

    #[test]
    fn test_defaults_to_light_english() {
        let (settings, _) = settings_with(Arc::new(MemoryStorage::new()));
        assert_eq!(settings.theme(), ThemeMode::Light);
        assert_eq!(settings.language(), Language::En);
        assert!(!settings.is_rtl());
    }

    #[test]
    fn test_language_options() {
        let (settings, _) = settings_with(Arc::new(MemoryStorage::new()));
        let values: Vec<_> = settings.language_options().iter().map(|o| o.value).collect();
        assert_eq!(values, vec![Language::En, Language::Ar, Language::Fa]);
    }

    #[test]
    fn test_rtl_detection() {
        let (settings, _) = settings_with(Arc::new(MemoryStorage::new()));

        settings.set_language(Language::Ar);
        assert!(settings.is_rtl());

        settings.set_language(Language::Fa);
        assert!(settings.is_rtl());

        settings.set_language(Language::En);
        assert!(!settings.is_rtl());
    }

    #[test]
    fn test_toggle_theme_is_involutive() {
        let storage = Arc::new(MemoryStorage::new());
        let (settings, root) = settings_with(storage.clone());

        settings.toggle_theme();
        assert_eq!(settings.theme(), ThemeMode::Dark);
        assert_eq!(root.attributes().theme, ThemeMode::Dark);

        settings.toggle_theme();
        assert_eq!(settings.theme(), ThemeMode::Light);
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_set_language_updates_document() {
        let storage = Arc::new(MemoryStorage::new());
        let (settings, root) = settings_with(storage.clone());

        settings.set_language(Language::Ar);
        let attrs = root.attributes();
        assert_eq!(attrs.dir, TextDirection::Rtl);
        assert_eq!(attrs.lang, "ar");
        assert_eq!(attrs.locale, Language::Ar);
        assert_eq!(storage.get(LOCALE_KEY).as_deref(), Some("ar"));

        settings.set_language(Language::En);
        let attrs = root.attributes();
        assert_eq!(attrs.dir.as_str(), "ltr");
        assert_eq!(attrs.lang, "en");
    }

    #[test]
    fn test_persisted_values_are_restored() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(THEME_KEY, "dark").unwrap();
        storage.set(LOCALE_KEY, "fa").unwrap();

        let (settings, root) = settings_with(storage);
        assert_eq!(settings.theme(), ThemeMode::Dark);
        assert_eq!(settings.language(), Language::Fa);

        // Nothing is applied before init
        assert_eq!(root.attributes(), DocumentAttributes::default());

        settings.init();
        let attrs = root.attributes();
        assert_eq!(attrs.theme, ThemeMode::Dark);
        assert_eq!(attrs.dir, TextDirection::Rtl);
        assert_eq!(attrs.lang, "fa");
    }

    #[test]
    fn test_unknown_stored_values_fall_back() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(THEME_KEY, "sepia").unwrap();
        storage.set(LOCALE_KEY, "de").unwrap();

        let (settings, _) = settings_with(storage);
        assert_eq!(settings.theme(), ThemeMode::Light);
        assert_eq!(settings.language(), Language::En);
    }

    #[test]
    fn test_init_applies_once() {
        let (settings, root) = settings_with(Arc::new(MemoryStorage::new()));
        settings.init();
        assert_eq!(root.attributes().lang, "en");

        // Overwrite the root behind the settings' back; a second init must not touch it
        root.set_lang("xx");
        settings.init();
        assert_eq!(root.attributes().lang, "xx");
    }

    #[test]
    fn test_subscribers_see_changes() {
        let (settings, _) = settings_with(Arc::new(MemoryStorage::new()));
        let mut rx = settings.subscribe();

        settings.set_language(Language::Ar);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_rtl());
    }
}
