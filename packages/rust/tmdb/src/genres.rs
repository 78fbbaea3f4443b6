//! TMDB movie genre ids.

/// TMDB's fixed movie genre list, id to slug.
pub const GENRES: &[(u32, &str)] = &[
    (28, "action"),
    (12, "adventure"),
    (16, "animation"),
    (35, "comedy"),
    (80, "crime"),
    (99, "documentary"),
    (18, "drama"),
    (10751, "family"),
    (14, "fantasy"),
    (36, "history"),
    (27, "horror"),
    (10402, "music"),
    (9648, "mystery"),
    (10749, "romance"),
    (878, "science_fiction"),
    (10770, "tv_movie"),
    (53, "thriller"),
    (10752, "war"),
    (37, "western"),
];

/// Slug for a single genre id.
pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .find_map(|&(gid, name)| (gid == id).then_some(name))
}

/// Map genre ids to slugs, dropping ids TMDB may have added since.
pub fn genre_names(ids: &[u32]) -> Vec<String> {
    ids.iter()
        .filter_map(|&id| genre_name(id))
        .map(String::from)
        .collect()
}
