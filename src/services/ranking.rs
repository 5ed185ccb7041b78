use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Datelike;

use super::{require_genre, LikeIndex};
use crate::{
    db::EntityStore,
    error::AppResult,
    models::{Film, FilmId, PopularQuery},
};

/// Sorts films by like count descending, breaking ties by id ascending
///
/// Films missing from `counts` rank as if nobody liked them. This is the one
/// popularity ordering shared by ranking, co-preference, filmography and
/// search.
pub fn sort_by_popularity(films: &mut [Film], counts: &HashMap<FilmId, u64>) {
    films.sort_by_key(|film| (Reverse(counts.get(&film.id).copied().unwrap_or(0)), film.id));
}

/// Keeps the `limit` most popular films
pub fn top_n(mut films: Vec<Film>, counts: &HashMap<FilmId, u64>, limit: usize) -> Vec<Film> {
    sort_by_popularity(&mut films, counts);
    films.truncate(limit);
    films
}

/// Genre and release-year filters, combined with AND
pub fn matches_filters(film: &Film, query: &PopularQuery) -> bool {
    let genre_ok = query.genre_id.map_or(true, |genre_id| film.has_genre(genre_id));
    let year_ok = query.year.map_or(true, |year| film.release_date.year() == year);
    genre_ok && year_ok
}

/// Produces the bounded top-N list of most liked films
pub struct PopularityRanker {
    store: Arc<dyn EntityStore>,
    likes: LikeIndex,
}

impl PopularityRanker {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let likes = LikeIndex::new(store.clone());
        Self { store, likes }
    }

    pub async fn rank(&self, query: &PopularQuery) -> AppResult<Vec<Film>> {
        let limit = query.limit()?;
        if let Some(genre_id) = query.genre_id {
            require_genre(self.store.as_ref(), genre_id).await?;
        }

        let candidates: Vec<Film> = self
            .store
            .all_films()
            .await?
            .into_iter()
            .filter(|film| matches_filters(film, query))
            .collect();

        let counts = self.likes.counts_for(&candidates).await?;
        Ok(top_n(candidates, &counts, limit))
    }
}
