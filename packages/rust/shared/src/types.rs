//! Core domain types for seenlist.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scraped entries
// ---------------------------------------------------------------------------

/// A filtered title scraped from the wiki, with its episode air date when the
/// title sat in a table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
}

// ---------------------------------------------------------------------------
// TMDB payloads
// ---------------------------------------------------------------------------

/// One hit from TMDB's `/search/movie`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// TMDB catalog id.
    pub id: u64,
    pub title: String,
    /// Path fragment such as `/abc.jpg`, joined with the poster base URL.
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

// ---------------------------------------------------------------------------
// ResolvedEntry
// ---------------------------------------------------------------------------

/// A title matched against TMDB, carrying everything the output needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// Title as TMDB spells it.
    pub title: String,
    /// TMDB catalog id.
    pub tmdb_id: u64,
    /// IMDb id; Radarr rejects entries without one.
    pub imdb_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

impl ResolvedEntry {
    /// Whether the entry can be handed to Radarr.
    pub fn is_importable(&self) -> bool {
        !self.imdb_id.trim().is_empty()
    }
}

/// The record Radarr's custom list import reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarrMovie {
    pub title: String,
    pub imdb_id: String,
    /// Empty string when TMDB has no poster.
    pub poster_url: String,
}

impl From<&ResolvedEntry> for RadarrMovie {
    fn from(entry: &ResolvedEntry) -> Self {
        Self {
            title: entry.title.clone(),
            imdb_id: entry.imdb_id.clone(),
            poster_url: entry.poster_url.clone().unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineOutcome
// ---------------------------------------------------------------------------

/// Everything a resolution run produced, before sorting.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub entries: Vec<ResolvedEntry>,
    pub succeeded: usize,
    pub failed: usize,
}
