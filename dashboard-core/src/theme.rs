//! Light/dark theme preference, persisted across runs.

use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::chart::Color;

/// Preference key the theme is stored under.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Anything other than `"dark"` (including nothing) reads as light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => ThemePreference::Dark,
            _ => ThemePreference::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn colors(self) -> ThemeColors {
        let (primary, text, background, border) = match self {
            ThemePreference::Light => ("#2196F3", "#333333", "#F5F5F5", "#DDDDDD"),
            ThemePreference::Dark => ("#64B5F6", "#E0E0E0", "#1E1E1E", "#444444"),
        };

        ThemeColors {
            primary: Color::new(primary),
            text: Color::new(text),
            background: Color::new(background),
            border: Color::new(border),
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColors {
    pub primary: Color,
    pub text: Color,
    pub background: Color,
    pub border: Color,
}

/// Everything a panel needs to know about presentation, handed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub theme: ThemePreference,
    pub colors: ThemeColors,
}

impl RenderSettings {
    pub fn for_theme(theme: ThemePreference) -> Self {
        Self { theme, colors: theme.colors() }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::for_theme(ThemePreference::default())
    }
}

/// Small string key/value storage for user preferences.
pub trait PreferenceStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept in a flat TOML table on disk.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences file: {}", self.path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences file: {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(&values).context("Failed to serialize preferences")?;
        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write preferences file: {}", self.path.display()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug)]
struct ThemeState {
    current: ThemePreference,
    subscribers: Vec<mpsc::UnboundedSender<ThemePreference>>,
}

/// Single source of truth for the active theme.
#[derive(Debug)]
pub struct ThemeStore {
    store: Arc<dyn PreferenceStore>,
    state: Mutex<ThemeState>,
}

impl ThemeStore {
    /// Reads the stored preference once. An unreadable store falls back to
    /// light so the dashboard still starts.
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let stored = store.get(THEME_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "could not read theme preference, using light");
            None
        });
        let current = ThemePreference::from_stored(stored.as_deref());

        Self { store, state: Mutex::new(ThemeState { current, subscribers: Vec::new() }) }
    }

    pub fn current(&self) -> ThemePreference {
        self.state.lock().current
    }

    pub fn colors(&self) -> ThemeColors {
        self.current().colors()
    }

    pub fn settings(&self) -> RenderSettings {
        RenderSettings::for_theme(self.current())
    }

    /// Flips the theme, persists it, and notifies each subscriber once.
    /// Nothing changes if the preference cannot be written.
    pub fn toggle(&self) -> Result<ThemePreference> {
        let mut state = self.state.lock();
        let next = state.current.toggled();

        self.store
            .set(THEME_KEY, next.as_str())
            .context("Failed to persist theme preference")?;
        state.current = next;
        state.subscribers.retain(|tx| tx.send(next).is_ok());

        info!(theme = %next, "theme toggled");
        Ok(next)
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ThemePreference> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().subscribers.push(tx);
        rx
    }
}
