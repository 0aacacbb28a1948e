//! Store-assigned identifiers.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Default,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of an idol record.
    ///
    /// ```
    /// use nugu_core::IdolId;
    ///
    /// let a = IdolId::generate();
    /// let b = IdolId::generate();
    /// assert_ne!(a, b);
    /// assert_eq!(IdolId::from("abc").as_str(), "abc");
    /// ```
    IdolId
);
string_id!(
    /// Identifier of a stored suggestion.
    SuggestionId
);
string_id!(
    /// Identifier of a recorded game.
    GameId
);
