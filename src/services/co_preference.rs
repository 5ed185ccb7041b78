use std::collections::HashSet;
use std::sync::Arc;

use super::{ranking::sort_by_popularity, require_user, LikeIndex};
use crate::{
    db::EntityStore,
    error::AppResult,
    models::{Film, FilmId, UserId},
};

/// Films two users have both liked, most popular first
pub struct CoPreferenceResolver {
    store: Arc<dyn EntityStore>,
    likes: LikeIndex,
}

impl CoPreferenceResolver {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let likes = LikeIndex::new(store.clone());
        Self { store, likes }
    }

    /// Intersection of both users' liked films, ordered by overall like count
    ///
    /// The result does not depend on argument order.
    pub async fn common_films(&self, user_id: UserId, other_id: UserId) -> AppResult<Vec<Film>> {
        require_user(self.store.as_ref(), user_id).await?;
        require_user(self.store.as_ref(), other_id).await?;

        let liked = self.likes.liked_by(user_id).await?;
        let shared: HashSet<FilmId> = if user_id == other_id {
            liked
        } else {
            let other = self.likes.liked_by(other_id).await?;
            liked.intersection(&other).copied().collect()
        };

        if shared.is_empty() {
            return Ok(Vec::new());
        }

        let mut films: Vec<Film> = self
            .store
            .all_films()
            .await?
            .into_iter()
            .filter(|film| shared.contains(&film.id))
            .collect();

        let counts = self.likes.counts_for(&films).await?;
        sort_by_popularity(&mut films, &counts);
        Ok(films)
    }
}
