use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{require_film, require_user};
use crate::{
    db::EntityStore,
    error::AppResult,
    models::{Film, FilmId, UserId},
};

/// Per-film like counts and per-user liked sets, read from the Like relation
///
/// Holds no state of its own: every call re-reads the store, so counts always
/// reflect the latest committed likes.
#[derive(Clone)]
pub struct LikeIndex {
    store: Arc<dyn EntityStore>,
}

impl LikeIndex {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Like counts for the given films; films nobody liked map to zero
    pub async fn counts_for(&self, films: &[Film]) -> AppResult<HashMap<FilmId, u64>> {
        if films.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<FilmId> = films.iter().map(|f| f.id).collect();
        self.store.like_counts(&ids).await
    }

    pub async fn liked_by(&self, user_id: UserId) -> AppResult<HashSet<FilmId>> {
        self.store.liked_film_ids(user_id).await
    }

    /// Records a like once both ids resolve; repeating it is a no-op
    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        require_film(self.store.as_ref(), film_id).await?;
        require_user(self.store.as_ref(), user_id).await?;
        self.store.add_like(film_id, user_id).await
    }

    /// Removes a like once both ids resolve; a missing like is a no-op
    pub async fn delete_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        require_film(self.store.as_ref(), film_id).await?;
        require_user(self.store.as_ref(), user_id).await?;
        self.store.delete_like(film_id, user_id).await
    }
}
