//! Embeds for mirrored posts, starrer lists and top pages.

use chrono::{DateTime, Utc};
use nugu_core::StarboardEntry;
use nugu_interface::{Embed, UserInfo};
use regex::Regex;
use std::sync::LazyLock;

/// Sidebar colour of starboard embeds.
pub const STARBOARD_COLOR: u32 = 0xFFD700;

/// Lines per top page.
pub const TOP_PAGE_SIZE: usize = 5;

/// Longest top line in characters.
pub const TOP_LINE_LIMIT: usize = 400;

const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>]+").expect("Valid URL regex"));

/// Format a count with thousands separators.
///
/// ```
/// use nugu_starboard::with_commas;
///
/// assert_eq!(with_commas(7), "7");
/// assert_eq!(with_commas(1234567), "1,234,567");
/// ```
pub fn with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `Mon Jan  2 15:04:05 2006` style timestamp.
fn ansic(ts: &DateTime<Utc>) -> String {
    ts.format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Picture shown on the mirror.
///
/// The embed image wins, then the first attachment, then the first URL in
/// the text ending in an image extension.
pub fn mirror_image(entry: &StarboardEntry) -> Option<String> {
    if let Some(url) = entry.embed_image_url.as_ref().filter(|u| !u.is_empty()) {
        return Some(url.clone());
    }
    if let Some(url) = entry.attachment_urls.first() {
        return Some(url.clone());
    }
    URL.find_iter(&entry.content)
        .map(|m| m.as_str())
        .find(|url| {
            let lower = url.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        })
        .map(str::to_string)
}

/// The mirrored post for an entry.
pub fn mirror_embed(
    entry: &StarboardEntry,
    author: Option<&UserInfo>,
    channel_name: &str,
    emoji: &str,
) -> Embed {
    let mut description = entry.content.clone();
    for url in &entry.attachment_urls {
        description.push('\n');
        description.push_str(url);
    }

    Embed {
        author: Some(format!(
            "@{} in #{}:",
            author.map_or("N/A", |a| a.name.as_str()),
            channel_name
        )),
        author_icon_url: author.and_then(|a| a.avatar_url.clone()),
        description: (!description.is_empty()).then_some(description),
        color: Some(STARBOARD_COLOR),
        image_url: mirror_image(entry),
        footer: Some(format!(
            "{} {} | Message #{} | First starred at {}",
            emoji,
            with_commas(entry.stars()),
            entry.message_id,
            ansic(&entry.first_starred)
        )),
        ..Embed::default()
    }
}

/// Join names as `a, b and c`.
///
/// ```
/// use nugu_starboard::join_names;
///
/// let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
/// assert_eq!(join_names(&names(&["@a"])), "@a");
/// assert_eq!(join_names(&names(&["@a", "@b"])), "@a and @b");
/// assert_eq!(join_names(&names(&["@a", "@b", "@c"])), "@a, @b and @c");
/// ```
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}

/// Who starred a message.
pub fn starrers_embed(
    entry: &StarboardEntry,
    author_name: &str,
    channel_name: &str,
    starrer_names: &[String],
    emoji: &str,
) -> Embed {
    let mut description = join_names(starrer_names);
    if !description.is_empty() {
        description.push(' ');
    }
    description.push_str(&format!("({} {})", with_commas(entry.stars()), emoji));

    Embed {
        title: Some(format!(
            "Starrers of message #{} by @{} in #{}:",
            entry.message_id, author_name, channel_name
        )),
        description: Some(description),
        color: Some(STARBOARD_COLOR),
        ..Embed::default()
    }
}

/// Short text of an entry for the top list.
fn summary(entry: &StarboardEntry) -> String {
    let mut content = entry.content.clone();
    if let Some(first) = entry.attachment_urls.first() {
        if content.is_empty() {
            content = first.clone();
            if entry.attachment_urls.len() > 1 {
                content.push_str(" ...");
            }
        } else if !content.ends_with("...") {
            content.push_str(" ...");
        }
    }
    if let Some(image) = entry.embed_image_url.as_ref().filter(|u| !u.is_empty()) {
        if content.is_empty() {
            content = image.clone();
        } else if !content.ends_with("...") {
            content.push_str(" ...");
        }
    }
    content
}

/// One line of the top list, cut to [`TOP_LINE_LIMIT`] characters.
pub fn top_line(rank: usize, author_name: &str, entry: &StarboardEntry, emoji: &str) -> String {
    let line = format!(
        "{}. by {} ({} {}): {}",
        rank,
        author_name,
        with_commas(entry.stars()),
        emoji,
        summary(entry)
    );
    if line.chars().count() > TOP_LINE_LIMIT {
        let mut cut: String = line.chars().take(TOP_LINE_LIMIT - 1).collect();
        cut.push_str(" ...");
        cut
    } else {
        line
    }
}

/// Group lines into pages of [`TOP_PAGE_SIZE`].
pub fn top_pages(lines: &[String], guild_name: &str) -> Vec<Embed> {
    let total = lines.chunks(TOP_PAGE_SIZE).len();
    lines
        .chunks(TOP_PAGE_SIZE)
        .enumerate()
        .map(|(index, page)| Embed {
            title: Some(format!("Top starred messages on {}", guild_name)),
            description: Some(page.join("\n")),
            color: Some(STARBOARD_COLOR),
            footer: Some(format!("Page {} of {}", index + 1, total)),
            ..Embed::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(content: &str) -> StarboardEntry {
        let mut entry = StarboardEntry::new(1, 2, 3, 4);
        entry.content = content.to_string();
        entry
    }

    #[test]
    fn embed_image_wins_over_attachments() {
        let mut e = entry("look https://x/a.png");
        e.attachment_urls = vec!["https://cdn/b.jpg".to_string()];
        assert_eq!(mirror_image(&e).as_deref(), Some("https://cdn/b.jpg"));
        e.embed_image_url = Some("https://embed/c.gif".to_string());
        assert_eq!(mirror_image(&e).as_deref(), Some("https://embed/c.gif"));
    }

    #[test]
    fn first_image_url_in_text_is_used() {
        let e = entry("see https://x/page.html and https://x/pic.JPEG now");
        assert_eq!(mirror_image(&e).as_deref(), Some("https://x/pic.JPEG"));
        assert_eq!(mirror_image(&entry("no pictures here")), None);
    }

    #[test]
    fn mirror_footer_and_author() {
        let mut e = entry("hello");
        e.first_starred = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        e.add_starrer(10);
        e.add_starrer(11);
        let author = UserInfo {
            id: 4,
            name: "jisoo".to_string(),
            ..UserInfo::default()
        };

        let embed = mirror_embed(&e, Some(&author), "general", "⭐");
        assert_eq!(embed.author.as_deref(), Some("@jisoo in #general:"));
        assert_eq!(
            embed.footer.as_deref(),
            Some("⭐ 2 | Message #3 | First starred at Mon Jan  2 15:04:05 2006")
        );
        assert_eq!(embed.color, Some(STARBOARD_COLOR));

        let anonymous = mirror_embed(&e, None, "general", "⭐");
        assert_eq!(anonymous.author.as_deref(), Some("@N/A in #general:"));
    }

    #[test]
    fn top_line_summarises_attachments_and_truncates() {
        let mut e = entry("");
        e.attachment_urls = vec!["https://a/1.png".to_string(), "https://a/2.png".to_string()];
        e.add_starrer(9);
        assert_eq!(top_line(1, "lisa", &e, "⭐"), "1. by lisa (1 ⭐): https://a/1.png ...");

        let long = entry(&"x".repeat(500));
        let line = top_line(2, "lisa", &long, "⭐");
        assert_eq!(line.chars().count(), TOP_LINE_LIMIT + 3);
        assert!(line.ends_with(" ..."));
    }

    #[test]
    fn pages_hold_five_lines() {
        let lines: Vec<String> = (1..=12).map(|i| format!("line {}", i)).collect();
        let pages = top_pages(&lines, "Blink");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].description.as_deref(), Some("line 11\nline 12"));
        assert_eq!(pages[0].footer.as_deref(), Some("Page 1 of 3"));
    }
}
