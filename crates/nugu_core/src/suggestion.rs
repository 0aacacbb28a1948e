//! Moderation suggestions.

use crate::{Gender, SuggestionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation state of a suggestion.
///
/// Pending is persisted as the empty string.
///
/// ```
/// use nugu_core::SuggestionStatus;
///
/// let json = serde_json::to_string(&SuggestionStatus::Pending).unwrap();
/// assert_eq!(json, "\"\"");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum SuggestionStatus {
    /// Waiting in the queue
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "pending")]
    Pending,
    /// Added to the game
    #[serde(rename = "approved")]
    #[strum(serialize = "approved")]
    Approved,
    /// Rejected by a moderator
    #[serde(rename = "denied")]
    #[strum(serialize = "denied")]
    Denied,
}

/// Fields a moderator may edit on the head suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SuggestionField {
    /// Idol name
    Name,
    /// Group name
    Group,
    /// Gender
    Gender,
    /// Moderator notes
    Notes,
}

/// A user-submitted picture waiting for moderation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Store-assigned identifier
    pub id: SuggestionId,
    /// Submitting user
    pub user_id: u64,
    /// Channel the suggestion was made in
    pub channel_id: u64,
    /// Guild of that channel, if any
    #[serde(default)]
    pub guild_id: Option<u64>,
    /// Proposed gender
    pub gender: Gender,
    /// Proposed group name
    pub group_name: String,
    /// Proposed idol name
    pub name: String,
    /// URL the picture was fetched from
    pub image_url: String,
    /// Perceptual hash of the original picture
    pub image_hash: String,
    /// Key of the resized picture in object storage
    pub object_name: String,
    /// Whether the group already exists
    #[serde(default)]
    pub group_match: bool,
    /// Whether the idol already exists
    #[serde(default)]
    pub idol_match: bool,
    /// Moderator notes
    #[serde(default)]
    pub notes: String,
    /// Moderation state
    #[serde(default)]
    pub status: SuggestionStatus,
    /// Moderator who resolved the suggestion
    #[serde(default)]
    pub processed_by: Option<u64>,
    /// Last time the record changed
    pub last_modified: DateTime<Utc>,
}

impl Suggestion {
    /// Message sent to the submitter once the suggestion is resolved.
    ///
    /// ```
    /// use nugu_core::{Gender, Suggestion, SuggestionId, SuggestionStatus};
    ///
    /// let mut s = Suggestion {
    ///     id: SuggestionId::generate(),
    ///     user_id: 1,
    ///     channel_id: 2,
    ///     guild_id: None,
    ///     gender: Gender::Girl,
    ///     group_name: "ITZY".into(),
    ///     name: "Yeji".into(),
    ///     image_url: "https://x/y.png".into(),
    ///     image_hash: String::new(),
    ///     object_name: String::new(),
    ///     group_match: false,
    ///     idol_match: false,
    ///     notes: "Bad cropping.".into(),
    ///     status: SuggestionStatus::Denied,
    ///     processed_by: None,
    ///     last_modified: chrono::Utc::now(),
    /// };
    /// assert_eq!(
    ///     s.resolution_message(),
    ///     "**Idol Suggestion Denied**\nIdol: ITZY Yeji\nImage: <https://x/y.png>\nNotes: Bad cropping."
    /// );
    /// s.status = SuggestionStatus::Approved;
    /// s.notes.clear();
    /// assert!(s.resolution_message().starts_with("**Idol Suggestion Approved**"));
    /// ```
    pub fn resolution_message(&self) -> String {
        let verdict = match self.status {
            SuggestionStatus::Approved => "Approved",
            SuggestionStatus::Denied => "Denied",
            SuggestionStatus::Pending => "Pending",
        };
        let mut message = format!(
            "**Idol Suggestion {}**\nIdol: {} {}\nImage: <{}>",
            verdict, self.group_name, self.name, self.image_url
        );
        if !self.notes.is_empty() {
            message.push_str("\nNotes: ");
            message.push_str(&self.notes);
        }
        message
    }
}
