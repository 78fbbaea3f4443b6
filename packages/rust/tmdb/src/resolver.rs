//! Title to [`ResolvedEntry`] resolution, including the split-title fallback.

use tracing::{debug, instrument};

use seenlist_shared::{ResolvedEntry, Result, SeenlistError};

use crate::client::SearchApi;
use crate::genres::genre_names;

/// Separator used on the wiki for double features, e.g. `Fast & Furious / Furious 7`.
const TITLE_SEPARATOR: char = '/';

/// Resolves wiki titles against a [`SearchApi`].
#[derive(Debug, Clone)]
pub struct MetadataResolver<C> {
    client: C,
    poster_base_url: String,
}

impl<C: SearchApi> MetadataResolver<C> {
    pub fn new(client: C, poster_base_url: impl Into<String>) -> Self {
        Self {
            client,
            poster_base_url: poster_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Resolve a title.
    ///
    /// Titles containing `/` are first searched verbatim; if that fails for
    /// any reason the trimmed text before the first `/` is searched instead.
    #[instrument(skip(self))]
    pub async fn resolve(&self, title: &str) -> Result<ResolvedEntry> {
        if !title.contains(TITLE_SEPARATOR) {
            return self.resolve_exact(title).await;
        }

        match self.resolve_exact(title).await {
            Ok(entry) => return Ok(entry),
            Err(e) => debug!(error = %e, "full title failed, trying first part"),
        }

        let first = title.split(TITLE_SEPARATOR).next().unwrap_or_default().trim();
        if !first.is_empty() {
            match self.resolve_exact(first).await {
                Ok(entry) => return Ok(entry),
                Err(e) => debug!(first, error = %e, "first part failed"),
            }
        }

        Err(SeenlistError::not_found(
            title,
            "tried full title and first part",
        ))
    }

    /// Take the top search hit for `title` and look up its IMDb id.
    async fn resolve_exact(&self, title: &str) -> Result<ResolvedEntry> {
        let results = self.client.search_by_title(title).await?;
        let Some(hit) = results.into_iter().next() else {
            return Err(SeenlistError::not_found(title, "empty result set"));
        };

        let imdb_id = self.client.fetch_imdb_id(hit.id).await?;

        Ok(ResolvedEntry {
            poster_url: self.poster_url(hit.poster_path.as_deref()),
            genres: genre_names(&hit.genre_ids),
            release_date: hit.release_date.filter(|d| !d.is_empty()),
            tmdb_id: hit.id,
            imdb_id,
            title: hit.title,
        })
    }

    fn poster_url(&self, poster_path: Option<&str>) -> Option<String> {
        let path = poster_path.filter(|p| !p.is_empty())?;
        let sep = if path.starts_with('/') { "" } else { "/" };
        Some(format!("{}{sep}{path}", self.poster_base_url))
    }
}
