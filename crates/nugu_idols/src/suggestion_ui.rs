//! Message and embed text for the suggestion channel.

use crate::catalog::SimilarImage;
use crate::suggestions::DENIAL_REASONS;
use nugu_core::Suggestion;
use nugu_interface::{Embed, EmbedField, UserInfo};

/// Sidebar colour of every suggestion channel embed.
pub const SUGGESTION_COLOR: u32 = 0x0FADED;

/// File name of the attached suggestion picture.
pub const SUGGESTION_IMAGE_NAME: &str = "example_round.png";

/// Approve reaction.
pub const APPROVE_EMOJI: &str = "✅";
/// Deny reaction.
pub const DENY_EMOJI: &str = "❌";
/// Deny-with-reason reaction.
pub const REASON_EMOJI: &str = "🔢";

const MATCHED: &str = "✅";
const UNMATCHED: &str = "❓";

/// Pinned instructions for moderators.
///
/// ```
/// use nugu_idols::help_message;
///
/// let help = help_message("!");
/// assert!(help.starts_with("```Editable Fields: name, group, gender, notes\n"));
/// assert!(help.contains("Command: !s-edit {field} new field value..."));
/// assert!(help.contains("\n5. Bad cropping.```"));
/// ```
pub fn help_message(prefix: &str) -> String {
    let mut help = format!(
        "```Editable Fields: name, group, gender, notes\nCommand: {}s-edit {{field}} new field value...\n\n",
        prefix
    );
    for (index, reason) in DENIAL_REASONS.iter().enumerate() {
        help.push_str(&format!("\n{}. {}", index + 1, reason));
    }
    help.push_str("```");
    help
}

/// Text of the queue counter message.
pub fn queue_count_message(count: usize) -> String {
    format!("Suggestions in queue: {}", count)
}

/// Embed shown when nothing is waiting.
pub fn empty_queue_embed() -> Embed {
    Embed {
        author: Some("No suggestions in queue".to_string()),
        color: Some(SUGGESTION_COLOR),
        ..Embed::default()
    }
}

/// Moderation embed for the head of the queue.
///
/// `submitter` and `origin` are `None` when the lookups failed; `origin` is
/// the guild name (if any) and the channel name.
pub fn suggestion_embed(
    suggestion: &Suggestion,
    submitter: Option<&UserInfo>,
    origin: Option<(Option<&str>, &str)>,
) -> Embed {
    let mark = |matched: bool| if matched { MATCHED } else { UNMATCHED };

    let suggested_by = match submitter {
        Some(user) => format!("{} \n({})", user.name, user.id),
        None => "*No User Info Found*".to_string(),
    };
    let suggested_from = match origin {
        Some((Some(guild), channel)) => format!("G: {} \nC: #{}", guild, channel),
        Some((None, channel)) => format!("C: #{}", channel),
        None => "*No Guild Info Found*".to_string(),
    };
    let notes = if suggestion.notes.is_empty() {
        "*No notes entered*".to_string()
    } else {
        suggestion.notes.clone()
    };

    Embed {
        color: Some(SUGGESTION_COLOR),
        image_url: Some(format!("attachment://{}", SUGGESTION_IMAGE_NAME)),
        fields: vec![
            EmbedField::inline(
                format!("Idol Name {}", mark(suggestion.idol_match)),
                &suggestion.name,
            ),
            EmbedField::inline(
                format!("Group Name {}", mark(suggestion.group_match)),
                &suggestion.group_name,
            ),
            EmbedField::inline("Gender", suggestion.gender.to_string()),
            EmbedField::inline("Suggested By", suggested_by),
            EmbedField::inline("Suggested From", suggested_from),
            EmbedField::inline(
                "Timestamp",
                suggestion
                    .last_modified
                    .format("%b %-d, %Y %-I:%M%P (%Z)")
                    .to_string(),
            ),
            EmbedField::inline("Notes", notes),
            EmbedField::inline("Image URL", &suggestion.image_url),
        ],
        ..Embed::default()
    }
}

/// Listing of game images close to the suggested one, best match first.
pub fn similar_images_embed(similar: &[SimilarImage]) -> Embed {
    Embed {
        title: Some("Possible Matching Images".to_string()),
        color: Some(SUGGESTION_COLOR),
        fields: similar
            .iter()
            .take(25)
            .map(|s| {
                EmbedField::inline(
                    format!("{} {}", s.group_name, s.name),
                    format!("`{}` (distance {})", s.image.object_name, s.distance),
                )
            })
            .collect(),
        footer: Some(format!("Images Found: {}", similar.len())),
        ..Embed::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nugu_core::{Gender, SuggestionId, SuggestionStatus};

    fn suggestion() -> Suggestion {
        Suggestion {
            id: SuggestionId::generate(),
            user_id: 10,
            channel_id: 20,
            guild_id: Some(30),
            gender: Gender::Boy,
            group_name: "BTS".to_string(),
            name: "Jimin".to_string(),
            image_url: "https://img/jimin.png".to_string(),
            image_hash: "0".to_string(),
            object_name: "obj".to_string(),
            group_match: true,
            idol_match: false,
            notes: String::new(),
            status: SuggestionStatus::Pending,
            processed_by: None,
            last_modified: chrono::Utc
                .with_ymd_and_hms(2006, 1, 2, 15, 4, 5)
                .unwrap(),
        }
    }

    #[test]
    fn embed_marks_matches_and_fills_fallbacks() {
        let embed = suggestion_embed(&suggestion(), None, None);
        let names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "Idol Name ❓",
                "Group Name ✅",
                "Gender",
                "Suggested By",
                "Suggested From",
                "Timestamp",
                "Notes",
                "Image URL",
            ]
        );
        assert_eq!(embed.fields[2].value, "boy");
        assert_eq!(embed.fields[3].value, "*No User Info Found*");
        assert_eq!(embed.fields[4].value, "*No Guild Info Found*");
        assert_eq!(embed.fields[5].value, "Jan 2, 2006 3:04pm (UTC)");
        assert_eq!(embed.fields[6].value, "*No notes entered*");
        assert_eq!(
            embed.image_url.as_deref(),
            Some("attachment://example_round.png")
        );
    }

    #[test]
    fn embed_shows_submitter_and_origin() {
        let user = UserInfo {
            id: 10,
            name: "army".to_string(),
            ..UserInfo::default()
        };
        let embed = suggestion_embed(&suggestion(), Some(&user), Some((Some("Bangtan"), "pics")));

        assert_eq!(embed.fields[3].value, "army \n(10)");
        assert_eq!(embed.fields[4].value, "G: Bangtan \nC: #pics");
    }

    #[test]
    fn count_message_text() {
        assert_eq!(queue_count_message(3), "Suggestions in queue: 3");
        assert_eq!(
            empty_queue_embed().author.as_deref(),
            Some("No suggestions in queue")
        );
    }
}
