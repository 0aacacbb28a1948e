//! Idol records.

use crate::IdolId;
use serde::{Deserialize, Serialize};

/// Gender of an idol.
///
/// ```
/// use nugu_core::Gender;
/// use std::str::FromStr;
///
/// assert_eq!(Gender::from_str("Girl").unwrap(), Gender::Girl);
/// assert_eq!(Gender::Boy.to_string(), "boy");
/// assert!(Gender::from_str("mixed").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gender {
    /// Male idol
    Boy,
    /// Female idol
    Girl,
}

/// One picture of an idol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdolImage {
    /// Key in object storage
    pub object_name: String,
    /// Perceptual hash of the picture
    pub hash_string: String,
    /// Bytes kept in memory so running games can still show a removed image
    #[serde(skip)]
    pub bytes: Option<Vec<u8>>,
}

impl IdolImage {
    /// Create an image record without cached bytes.
    pub fn new(object_name: impl Into<String>, hash_string: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            hash_string: hash_string.into(),
            bytes: None,
        }
    }
}

/// Counters derived from game history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdolStats {
    /// Games the idol appeared in
    pub games: u64,
    /// Games the idol won
    pub game_wins: u64,
    /// Rounds the idol appeared in
    pub rounds: u64,
    /// Rounds the idol won
    pub round_wins: u64,
}

/// An idol and the images that represent them.
///
/// An idol with no images is soft-deleted rather than removed because game
/// history keeps referencing its id.
///
/// ```
/// use nugu_core::{Gender, Idol, IdolImage};
///
/// let mut idol = Idol::new("Irene", "Red Velvet", Gender::Girl);
/// assert!(!idol.is_active());
///
/// idol.images.push(IdolImage::new("obj-1", "a:ff"));
/// assert!(idol.is_active());
/// assert_eq!(idol.name_and_group(), "Red VelvetIrene");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idol {
    /// Store-assigned identifier
    pub id: IdolId,
    /// Display name
    pub name: String,
    /// Alternative spellings accepted when matching the name
    #[serde(default)]
    pub name_aliases: Vec<String>,
    /// Canonical group name
    pub group_name: String,
    /// Gender
    pub gender: Gender,
    /// Pictures, in insertion order
    #[serde(default)]
    pub images: Vec<IdolImage>,
    /// Soft-delete flag
    #[serde(default)]
    pub deleted: bool,
    /// Derived game counters
    #[serde(default)]
    pub stats: IdolStats,
}

impl Idol {
    /// Create an idol with a fresh id and no images.
    pub fn new(name: impl Into<String>, group_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: IdolId::generate(),
            name: name.into(),
            name_aliases: Vec::new(),
            group_name: group_name.into(),
            gender,
            images: Vec::new(),
            deleted: false,
            stats: IdolStats::default(),
        }
    }

    /// Concatenation key used for exact identity checks.
    pub fn name_and_group(&self) -> String {
        format!("{}{}", self.group_name, self.name)
    }

    /// Label for chat replies, e.g. `Nayeon (TWICE)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.group_name)
    }

    /// Active idols are the only ones used for matching and new games.
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.images.is_empty()
    }

    /// Find an image by its object storage key.
    pub fn image(&self, object_name: &str) -> Option<&IdolImage> {
        self.images.iter().find(|i| i.object_name == object_name)
    }
}
