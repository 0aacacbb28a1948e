//! Starboard defaults.

use derive_getters::Getters;
use nugu_core::StarboardSettings;
use serde::{Deserialize, Serialize};

/// Defaults applied to guilds that have not configured the starboard.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct StarboardConfig {
    /// Stars needed before a message is mirrored
    #[serde(default = "default_minimum")]
    default_minimum: usize,

    /// Reaction emoji that count as stars
    #[serde(default = "default_emoji")]
    default_emoji: Vec<String>,
}

fn default_minimum() -> usize {
    1
}

fn default_emoji() -> Vec<String> {
    vec!["⭐".to_string(), "🌟".to_string()]
}

impl Default for StarboardConfig {
    fn default() -> Self {
        Self {
            default_minimum: default_minimum(),
            default_emoji: default_emoji(),
        }
    }
}

impl StarboardConfig {
    /// Settings a guild starts from before any admin command.
    pub fn initial_settings(&self) -> StarboardSettings {
        StarboardSettings::new(None, self.default_minimum, self.default_emoji.clone())
    }

    /// Stored settings with these defaults filled in.
    ///
    /// Never-configured guilds get [`initial_settings`](Self::initial_settings);
    /// an emptied emoji list falls back to the default emoji.
    ///
    /// ```
    /// use nugu_core::StarboardSettings;
    /// use nugu_starboard::StarboardConfig;
    ///
    /// let config = StarboardConfig::default().with_default_minimum(3);
    /// assert_eq!(*config.effective(StarboardSettings::default()).minimum(), 3);
    ///
    /// let mut emptied = StarboardSettings::with_channel(9);
    /// emptied.toggle_emoji("⭐");
    /// emptied.toggle_emoji("🌟");
    /// assert_eq!(config.effective(emptied).emoji().len(), 2);
    /// ```
    pub fn effective(&self, stored: StarboardSettings) -> StarboardSettings {
        if stored == StarboardSettings::default() {
            return self.initial_settings();
        }
        if stored.emoji().is_empty() {
            return StarboardSettings::new(
                *stored.channel_id(),
                *stored.minimum(),
                self.default_emoji.clone(),
            );
        }
        stored
    }
}
