//! Starboard records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Location of the mirrored post in the starboard channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MirrorPost {
    /// Starboard channel at the time of posting
    pub channel_id: u64,
    /// Mirrored message
    pub message_id: u64,
}

/// Stars collected by one message.
///
/// The star count is always the size of the starrer set.
///
/// ```
/// use nugu_core::StarboardEntry;
///
/// let mut entry = StarboardEntry::new(1, 2, 3, 4);
/// assert!(entry.add_starrer(10));
/// assert!(!entry.add_starrer(10));
/// assert_eq!(entry.stars(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarboardEntry {
    /// Guild of the source message
    pub guild_id: u64,
    /// Source message
    pub message_id: u64,
    /// Channel of the source message
    pub channel_id: u64,
    /// Author of the source message
    pub author_id: u64,
    /// Text of the source message at the first star
    #[serde(default)]
    pub content: String,
    /// Attachment URLs at the first star
    #[serde(default)]
    pub attachment_urls: Vec<String>,
    /// Image taken from the source message's embeds
    #[serde(default)]
    pub embed_image_url: Option<String>,
    /// Users who starred the message
    #[serde(default)]
    pub starrers: BTreeSet<u64>,
    /// When the first star was given
    pub first_starred: DateTime<Utc>,
    /// Mirrored post, present only while the minimum is met
    #[serde(default)]
    pub mirror: Option<MirrorPost>,
}

impl StarboardEntry {
    /// A fresh entry with no stars.
    pub fn new(guild_id: u64, channel_id: u64, message_id: u64, author_id: u64) -> Self {
        Self {
            guild_id,
            message_id,
            channel_id,
            author_id,
            content: String::new(),
            attachment_urls: Vec::new(),
            embed_image_url: None,
            starrers: BTreeSet::new(),
            first_starred: Utc::now(),
            mirror: None,
        }
    }

    /// Number of distinct starrers.
    pub fn stars(&self) -> usize {
        self.starrers.len()
    }

    /// Add a starrer; false if they had already starred.
    pub fn add_starrer(&mut self, user_id: u64) -> bool {
        self.starrers.insert(user_id)
    }

    /// Remove a starrer; false if they had not starred.
    pub fn remove_starrer(&mut self, user_id: u64) -> bool {
        self.starrers.remove(&user_id)
    }
}

/// Per-guild starboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct StarboardSettings {
    /// Channel that receives mirrored posts; disabled when unset
    #[serde(default)]
    channel_id: Option<u64>,
    /// Stars needed before a message is mirrored
    #[serde(default = "default_minimum")]
    minimum: usize,
    /// Reaction emoji that count as stars
    #[serde(default = "default_emoji")]
    emoji: Vec<String>,
}

fn default_minimum() -> usize {
    1
}

fn default_emoji() -> Vec<String> {
    vec!["⭐".to_string(), "🌟".to_string()]
}

impl Default for StarboardSettings {
    fn default() -> Self {
        Self {
            channel_id: None,
            minimum: default_minimum(),
            emoji: default_emoji(),
        }
    }
}

impl StarboardSettings {
    /// Settings from explicit values; the minimum is clamped to one.
    pub fn new(channel_id: Option<u64>, minimum: usize, emoji: Vec<String>) -> Self {
        Self {
            channel_id,
            minimum: minimum.max(1),
            emoji,
        }
    }

    /// Settings with the given channel and defaults elsewhere.
    pub fn with_channel(channel_id: u64) -> Self {
        Self {
            channel_id: Some(channel_id),
            ..Self::default()
        }
    }

    /// Set or clear the starboard channel.
    pub fn set_channel(&mut self, channel_id: Option<u64>) {
        self.channel_id = channel_id;
    }

    /// Set the minimum; values below one are clamped to one.
    pub fn set_minimum(&mut self, minimum: usize) {
        self.minimum = minimum.max(1);
    }

    /// Add the emoji if missing, remove it otherwise. Returns whether it is now enabled.
    ///
    /// ```
    /// use nugu_core::StarboardSettings;
    ///
    /// let mut settings = StarboardSettings::default();
    /// assert!(!settings.toggle_emoji("⭐"));
    /// assert!(settings.toggle_emoji("⭐"));
    /// ```
    pub fn toggle_emoji(&mut self, emoji: &str) -> bool {
        if let Some(pos) = self.emoji.iter().position(|e| e == emoji) {
            self.emoji.remove(pos);
            false
        } else {
            self.emoji.push(emoji.to_string());
            true
        }
    }

    /// Whether a reaction with `emoji` counts as a star.
    pub fn counts_as_star(&self, emoji: &str) -> bool {
        self.emoji.iter().any(|e| e == emoji)
    }

    /// Emoji shown in mirror footers.
    pub fn display_emoji(&self) -> &str {
        self.emoji.first().map(String::as_str).unwrap_or("⭐")
    }
}
