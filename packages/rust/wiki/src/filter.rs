//! Rules deciding whether an italicised string on the wiki is a movie title.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Shortest accepted title, in characters.
const MIN_TITLE_LEN: usize = 3;

/// Single-word titles must be at least this long.
const MIN_SINGLE_WORD_LEN: usize = 4;

/// Lowercase fragments that mark a candidate as something other than a movie:
/// other shows, the podcast itself and its awards, cast names, page chrome.
const DENYLIST: &[&str] = &[
    "cobra kai",
    "season",
    "episodes",
    "pilot",
    "watchalong",
    "awards",
    "the scott hasn't seenies",
    "march of the penguins",
    "september 5",
    "twin peaks",
    "martin",
    "sprague hasn't seen",
    "did",
    "next",
    "the scott hasn't seenies awards",
    "scott hasn't seen",
];

/// TV episode / season / multi-part references.
static EPISODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)episode|season|part \d+").expect("episode regex"));

/// Stateless part of the filter: everything except duplicate detection.
///
/// `title` is expected to be trimmed already.
pub fn is_movie_title(title: &str) -> bool {
    if title.chars().count() < MIN_TITLE_LEN {
        return false;
    }

    let lower = title.to_lowercase();
    if DENYLIST.iter().any(|phrase| lower.contains(phrase)) {
        return false;
    }

    if EPISODE_RE.is_match(title) {
        return false;
    }

    let mut words = title.split_whitespace();
    let single_word = words.next().is_some() && words.next().is_none();
    if single_word && title.chars().count() < MIN_SINGLE_WORD_LEN {
        return false;
    }

    true
}

/// Filter for one extraction pass.
///
/// Remembers every trimmed candidate it has seen, accepted or not, so a
/// repeated string is dropped on its second appearance. A fresh filter
/// starts with an empty memory.
#[derive(Debug, Default)]
pub struct TitleFilter {
    seen: HashSet<String>,
}

impl TitleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed title if it passes every rule.
    pub fn accept(&mut self, raw: &str) -> Option<String> {
        let title = raw.trim();

        if !self.seen.insert(title.to_string()) {
            return None;
        }

        is_movie_title(title).then(|| title.to_string())
    }
}
