//! Command argument splitting.

use nugu_error::{NuguResult, ValidationError, ValidationErrorKind};

/// Replace typographic quotes with their ASCII equivalents.
///
/// Mobile keyboards insert curly quotes, which would otherwise break
/// quoted arguments.
pub fn normalize_quotes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect()
}

/// Split a command line into shell-style arguments.
///
/// Whitespace separates arguments; single or double quotes group words and a
/// backslash escapes the next character.
///
/// ```
/// use nugu_core::split_args;
///
/// let args = split_args(r#"suggest girl "Red Velvet" Irene"#).unwrap();
/// assert_eq!(args, vec!["suggest", "girl", "Red Velvet", "Irene"]);
/// ```
///
/// # Errors
///
/// Returns a validation error for unterminated quotes or a trailing escape.
pub fn split_args(input: &str) -> NuguResult<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => {
                let escaped = chars.next().ok_or_else(|| {
                    ValidationError::new(ValidationErrorKind::InvalidArguments(
                        "trailing escape".to_string(),
                    ))
                })?;
                current.push(escaped);
                in_arg = true;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        Err(ValidationError::new(ValidationErrorKind::InvalidArguments(
            "unterminated quote".to_string(),
        )))?
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}
