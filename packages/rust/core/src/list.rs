//! Final list assembly: ordering, dedup, and the Radarr JSON file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::{info, warn};

use seenlist_shared::{OutputConfig, RadarrMovie, ResolvedEntry, Result, SeenlistError};

/// Timestamp format for snapshot files, e.g. `20240131_094500`.
const SNAPSHOT_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Sort entries by title (plain byte order) and drop repeated IMDb ids.
///
/// The result depends only on the set of entries, not on the order they
/// were collected in: ties on title are broken by IMDb id, then TMDB id, and
/// when two wiki titles resolved to the same movie the first in that order
/// is kept.
pub fn build_list(mut entries: Vec<ResolvedEntry>) -> Vec<ResolvedEntry> {
    entries.sort_by(|a, b| {
        a.title
            .cmp(&b.title)
            .then_with(|| a.imdb_id.cmp(&b.imdb_id))
            .then_with(|| a.tmdb_id.cmp(&b.tmdb_id))
    });

    let mut seen = HashSet::new();
    entries.retain(|e| seen.insert(e.imdb_id.clone()));
    entries
}

/// Compact JSON array of [`RadarrMovie`] records with a trailing newline.
pub fn to_json(entries: &[ResolvedEntry]) -> Result<String> {
    let movies: Vec<RadarrMovie> = entries.iter().map(RadarrMovie::from).collect();
    let mut json = serde_json::to_string(&movies)
        .map_err(|e| SeenlistError::validation(format!("failed to serialize list: {e}")))?;
    json.push('\n');
    Ok(json)
}

/// Parse a list previously written by [`to_json`].
pub fn parse_list(json: &str) -> Result<Vec<RadarrMovie>> {
    serde_json::from_str(json).map_err(|e| SeenlistError::Decode(format!("list file: {e}")))
}

/// Write the list to `path`, creating parent directories.
pub fn write_list(entries: &[ResolvedEntry], path: &Path) -> Result<()> {
    let json = to_json(entries)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SeenlistError::io(parent, e))?;
    }

    std::fs::write(path, json).map_err(|e| SeenlistError::io(path, e))?;
    info!(path = %path.display(), count = entries.len(), "saved list");
    Ok(())
}

/// Write `<stem>.json` and, if configured, a `<stem>_<timestamp>.json`
/// snapshot. Returns the paths written.
///
/// A failed snapshot is logged and skipped; a failed main file is an error.
/// Nothing is written for an empty list.
pub fn persist<Tz>(
    entries: &[ResolvedEntry],
    output: &OutputConfig,
    now: &DateTime<Tz>,
) -> Result<Vec<PathBuf>>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if entries.is_empty() {
        warn!("no movies found to save");
        return Ok(Vec::new());
    }

    let mut written = Vec::new();

    if output.timestamped {
        let stamp = now.format(SNAPSHOT_FORMAT);
        let snapshot = output.dir.join(format!("{}_{stamp}.json", output.file_stem));
        match write_list(entries, &snapshot) {
            Ok(()) => written.push(snapshot),
            Err(e) => warn!(path = %snapshot.display(), error = %e, "failed to save snapshot"),
        }
    }

    let main = output.dir.join(format!("{}.json", output.file_stem));
    write_list(entries, &main)?;
    written.push(main);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(title: &str, imdb: &str) -> ResolvedEntry {
        ResolvedEntry {
            title: title.into(),
            tmdb_id: 1,
            imdb_id: imdb.into(),
            poster_url: None,
            release_date: None,
            genres: vec![],
        }
    }

    fn titles(entries: &[ResolvedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn sorts_by_title() {
        let list = build_list(vec![
            entry("Movie C", "tt3"),
            entry("Movie A", "tt1"),
            entry("Movie B", "tt2"),
        ]);
        assert_eq!(titles(&list), vec!["Movie A", "Movie B", "Movie C"]);
    }

    #[test]
    fn sort_is_bytewise_not_locale_aware() {
        let list = build_list(vec![
            entry("alien", "tt1"),
            entry("Zodiac", "tt2"),
            entry("Élite Squad", "tt3"),
            entry("Alien", "tt4"),
        ]);
        assert_eq!(titles(&list), vec!["Alien", "Zodiac", "alien", "Élite Squad"]);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = vec![entry("Dune", "tt1"), entry("Dune", "tt0"), entry("Ghost", "tt2")];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(build_list(a), build_list(b));
    }

    #[test]
    fn duplicate_imdb_ids_collapse() {
        let list = build_list(vec![
            entry("Face/Off", "tt0119094"),
            entry("Face/Off", "tt0119094"),
            entry("Ghost", "tt0099653"),
        ]);
        assert_eq!(titles(&list), vec!["Face/Off", "Ghost"]);
    }

    #[test]
    fn json_round_trip_preserves_pairs() {
        let mut with_poster = entry("Space Jam", "tt0117705");
        with_poster.poster_url = Some("https://img.example/sj.jpg".into());
        let list = build_list(vec![with_poster, entry("Dune", "tt1160419")]);

        let json = to_json(&list).unwrap();
        assert!(json.ends_with("]\n"));
        assert!(json.contains(r#""poster_url":"""#));

        let parsed = parse_list(&json).unwrap();
        let pairs: Vec<_> = parsed.iter().map(|m| (m.title.as_str(), m.imdb_id.as_str())).collect();
        assert_eq!(pairs, vec![("Dune", "tt1160419"), ("Space Jam", "tt0117705")]);
    }

    #[test]
    fn output_is_stable_across_runs() {
        let first = to_json(&build_list(vec![entry("B", "tt2"), entry("A", "tt1")])).unwrap();
        let second = to_json(&build_list(vec![entry("A", "tt1"), entry("B", "tt2")])).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn persist_writes_main_and_snapshot() {
        let dir = std::env::temp_dir().join(format!("seenlist-persist-{}", Uuid::now_v7()));
        let output = OutputConfig {
            dir: dir.clone(),
            file_stem: "list".into(),
            timestamped: true,
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 9, 45, 0).unwrap();

        let written = persist(&[entry("Dune", "tt1160419")], &output, &now).unwrap();
        assert_eq!(
            written,
            vec![dir.join("list_20240131_094500.json"), dir.join("list.json")]
        );

        let main = std::fs::read_to_string(dir.join("list.json")).unwrap();
        let snapshot = std::fs::read_to_string(dir.join("list_20240131_094500.json")).unwrap();
        assert_eq!(main, snapshot);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn persist_skips_empty_list() {
        let dir = std::env::temp_dir().join(format!("seenlist-empty-{}", Uuid::now_v7()));
        let output = OutputConfig {
            dir: dir.clone(),
            file_stem: "list".into(),
            timestamped: false,
        };
        let written = persist(&[], &output, &Utc::now()).unwrap();
        assert!(written.is_empty());
        assert!(!dir.exists());
    }
}
