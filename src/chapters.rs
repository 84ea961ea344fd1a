use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:(\d{1,2}):)?(\d{1,2}):(\d{2})").expect("valid regex"));

static LEADING_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-:.]+\s+").expect("valid regex"));

/// A named marker parsed from a video description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    pub start_sec: u32,
}

/// Extract chapters from description lines such as `2:45 Verse 1` or `01:15:20 - Outro`.
///
/// Lines without a title after the timestamp are skipped. The result is sorted by start.
pub fn parse_chapters(description: &str) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = description
        .lines()
        .filter_map(|line| {
            let captures = TIMESTAMP.captures(line)?;
            let whole = captures.get(0)?;

            let part = |i: usize| {
                captures
                    .get(i)
                    .and_then(|m| m.as_str().parse::<u32>().ok())
                    .unwrap_or(0)
            };
            let start_sec = part(1) * 3600 + part(2) * 60 + part(3);

            let rest = line[whole.end()..].trim();
            let title = LEADING_SEPARATOR.replace(rest, "").trim().to_string();

            (!title.is_empty()).then_some(Chapter { title, start_sec })
        })
        .collect();

    chapters.sort_by_key(|chapter| chapter.start_sec);
    chapters
}

/// The last chapter that has started by `at`. `chapters` must be sorted.
pub fn current_chapter(chapters: &[Chapter], at: f64) -> Option<&Chapter> {
    chapters
        .iter()
        .take_while(|chapter| f64::from(chapter.start_sec) <= at)
        .last()
}
