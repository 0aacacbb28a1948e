//! Loose string comparison for user-entered names.

/// Lowercase `s` and drop every character that is not alphanumeric.
///
/// ```
/// use nugu_core::alphanumeric;
///
/// assert_eq!(alphanumeric("IZ*ONE"), "izone");
/// assert_eq!(alphanumeric("Girls' Generation"), "girlsgeneration");
/// ```
pub fn alphanumeric(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two strings ignoring case, whitespace and punctuation.
///
/// ```
/// use nugu_core::alphanumeric_compare;
///
/// assert!(alphanumeric_compare("IZ*ONE", "iz one"));
/// assert!(!alphanumeric_compare("Twice", "Itzy"));
/// ```
pub fn alphanumeric_compare(a: &str, b: &str) -> bool {
    let mut left = a
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase);
    let mut right = b
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(l), Some(r)) if l == r => continue,
            _ => return false,
        }
    }
}
