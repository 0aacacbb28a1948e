//! Reply text and embeds for command results.

use nugu_idols::{CatalogSummary, GuessStats, HighScores, MissedIdols, RankingEntry, UserStats};
use nugu_interface::{Embed, EmbedField};

/// Longest text a single chat message may carry.
pub const MESSAGE_LIMIT: usize = 2000;

/// Colour of statistics embeds.
pub const STATS_COLOR: u32 = 0x5865F2;

/// Reply to a moderator-only command from anyone else.
pub const MODERATOR_ONLY: &str = "You need the Manage Messages permission to do that.";

/// Reply to a guild-only command sent in a direct message.
pub const GUILD_ONLY: &str = "This command only works in a server.";

/// Split text into messages of at most `limit` characters, breaking between
/// lines where possible.
///
/// ```
/// use nugu_social::chunk_lines;
///
/// assert_eq!(chunk_lines("ab\ncd\nef", 5), vec!["ab\ncd", "ef"]);
/// assert_eq!(chunk_lines("abcdefg", 3), vec!["abc", "def", "g"]);
/// ```
pub fn chunk_lines(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            continue;
        }
        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        // A single line longer than the limit is cut hard.
        let chars: Vec<char> = line.chars().collect();
        let mut pieces = chars.chunks(limit.max(1)).peekable();
        while let Some(piece) = pieces.next() {
            let piece: String = piece.iter().collect();
            if pieces.peek().is_some() {
                chunks.push(piece);
            } else {
                current_len = piece.chars().count();
                current = piece;
            }
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Listing of the active idols.
pub fn catalog_summary_text(summary: &CatalogSummary) -> String {
    let mut text = format!(
        "**{} idols** ({} girls, {} boys) in **{} groups** ({} girl groups, {} boy groups)",
        summary.total,
        summary.girls,
        summary.boys,
        summary.girl_groups + summary.boy_groups,
        summary.girl_groups,
        summary.boy_groups
    );
    for (group, idols) in &summary.groups {
        text.push_str(&format!("\n**{}**: {}", group, idols.join(", ")));
    }
    text
}

fn score(slot: Option<usize>) -> String {
    slot.map_or_else(|| "-".to_string(), |s| s.to_string())
}

fn high_score_lines(scores: &HighScores) -> String {
    [
        ("Overall", scores.overall),
        ("Easy", scores.easy),
        ("Medium", scores.medium),
        ("Hard", scores.hard),
        ("Koreaboo", scores.koreaboo),
        ("Girls", scores.girl),
        ("Boys", scores.boy),
        ("Mixed", scores.mixed),
        ("Idol names", scores.idol),
        ("Group names", scores.group),
        ("Multiplayer", scores.multi),
    ]
    .iter()
    .map(|(label, slot)| format!("{}: {}", label, score(*slot)))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Player statistics embed.
pub fn user_stats_embed(title: &str, stats: &UserStats) -> Embed {
    let missed_idol = stats
        .most_missed_idol
        .as_ref()
        .map_or_else(|| "-".to_string(), |(group, name)| format!("{} {}", group, name));
    Embed {
        title: Some(title.to_string()),
        color: Some(STATS_COLOR),
        fields: vec![
            EmbedField::inline(
                "Games Played",
                format!("{} solo, {} multiplayer", stats.solo_games, stats.multi_games),
            ),
            EmbedField::inline("Total Points", stats.total_points.to_string()),
            EmbedField::inline("Average Score", score(stats.average_score)),
            EmbedField::inline(
                "Correct Guesses",
                format!("{:.1}%", stats.correct_percentage),
            ),
            EmbedField::inline("Most Missed Idol", missed_idol),
            EmbedField::inline(
                "Most Missed Group",
                stats.most_missed_group.clone().unwrap_or_else(|| "-".to_string()),
            ),
            EmbedField::block("High Scores", high_score_lines(&stats.high_scores)),
        ],
        ..Embed::default()
    }
}

/// One line of guess counts for an idol or group.
///
/// ```
/// use nugu_idols::GuessStats;
/// use nugu_social::guess_stats_text;
///
/// let stats = GuessStats { correct: 3, incorrect: 1 };
/// assert_eq!(
///     guess_stats_text("TWICE", &stats),
///     "**TWICE** was guessed 4 times: 3 correct, 1 incorrect (75.0%)."
/// );
/// ```
pub fn guess_stats_text(label: &str, stats: &GuessStats) -> String {
    format!(
        "**{}** was guessed {} times: {} correct, {} incorrect ({:.1}%).",
        label,
        stats.total(),
        stats.correct,
        stats.incorrect,
        stats.percentage()
    )
}

/// Most missed idols, one line per miss count.
pub fn missed_text(missed: &[MissedIdols]) -> String {
    if missed.is_empty() {
        return "No idols have been missed yet.".to_string();
    }
    missed
        .iter()
        .map(|group| {
            let idols: Vec<String> = group
                .idols
                .iter()
                .map(|(g, n)| format!("{} {}", g, n))
                .collect();
            format!("**{}**: {}", group.misses, idols.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Leaderboard embed.
pub fn ranking_embed(entries: &[RankingEntry], by_server: bool) -> Embed {
    let description = if entries.is_empty() {
        "No games match those filters.".to_string()
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let who = if by_server {
                    format!("Server {}", entry.guild_id)
                } else {
                    format!("<@{}>", entry.user_id)
                };
                format!(
                    "{}. {}: {} ({}, {}{})",
                    index + 1,
                    who,
                    entry.score,
                    entry.difficulty,
                    entry.gender,
                    if entry.is_multigame { ", multi" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    Embed {
        title: Some(if by_server {
            "Top servers".to_string()
        } else {
            "Top players".to_string()
        }),
        description: Some(description),
        color: Some(STATS_COLOR),
        ..Embed::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nugu_core::{Difficulty, GameGender};

    #[test]
    fn long_lines_are_cut() {
        let text = format!("short\n{}\ntail", "x".repeat(7));
        assert_eq!(chunk_lines(&text, 5), vec!["short", "xxxxx", "xx", "tail"]);
        assert!(chunk_lines("", 5).is_empty());
    }

    #[test]
    fn summary_lists_groups() {
        let summary = CatalogSummary {
            total: 3,
            girls: 2,
            boys: 1,
            girl_groups: 1,
            boy_groups: 1,
            groups: vec![
                ("BTS".to_string(), vec!["Jin".to_string()]),
                (
                    "TWICE".to_string(),
                    vec!["Momo".to_string(), "Nayeon (2)".to_string()],
                ),
            ],
        };
        assert_eq!(
            catalog_summary_text(&summary),
            "**3 idols** (2 girls, 1 boys) in **2 groups** (1 girl groups, 1 boy groups)\n\
             **BTS**: Jin\n**TWICE**: Momo, Nayeon (2)"
        );
    }

    #[test]
    fn ranking_lines() {
        let entries = vec![RankingEntry {
            user_id: 7,
            guild_id: 1,
            score: 12,
            difficulty: Difficulty::Hard,
            gender: GameGender::Girl,
            is_multigame: false,
        }];
        let embed = ranking_embed(&entries, false);
        assert_eq!(embed.description.as_deref(), Some("1. <@7>: 12 (hard, girl)"));
        assert_eq!(
            ranking_embed(&[], true).description.as_deref(),
            Some("No games match those filters.")
        );
    }
}
