use std::sync::Arc;

use super::{ranking::sort_by_popularity, require_director, LikeIndex};
use crate::{
    db::EntityStore,
    error::AppResult,
    models::{DirectorId, DirectorSort, Film},
};

/// Resolves the films attached to a director
pub struct DirectorFilmography {
    store: Arc<dyn EntityStore>,
    likes: LikeIndex,
}

impl DirectorFilmography {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let likes = LikeIndex::new(store.clone());
        Self { store, likes }
    }

    pub async fn films_by_director(
        &self,
        director_id: DirectorId,
        sort: DirectorSort,
    ) -> AppResult<Vec<Film>> {
        require_director(self.store.as_ref(), director_id).await?;

        let mut films: Vec<Film> = self
            .store
            .all_films()
            .await?
            .into_iter()
            .filter(|film| film.has_director(director_id))
            .collect();

        match sort {
            DirectorSort::None => films.sort_by_key(|film| film.id),
            DirectorSort::Year => films.sort_by_key(|film| (film.release_date, film.id)),
            DirectorSort::Likes => {
                let counts = self.likes.counts_for(&films).await?;
                sort_by_popularity(&mut films, &counts);
            }
        }

        Ok(films)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::EntityStore;
    use crate::error::AppError;
    use crate::services::test_support::{date, draft, ids, scenario};

    #[tokio::test]
    async fn test_by_year_earliest_first() {
        let s = scenario().await;
        let filmography = DirectorFilmography::new(s.store.clone());

        let films = filmography
            .films_by_director(s.director.id, DirectorSort::Year)
            .await
            .unwrap();
        assert_eq!(ids(&films), vec![s.a.id, s.c.id]);
    }

    #[tokio::test]
    async fn test_by_year_ties_broken_by_id() {
        let s = scenario().await;
        let twin = s
            .store
            .create_film(&draft(
                "Same Day",
                s.a.release_date,
                vec![],
                vec![s.director.id],
            ))
            .await
            .unwrap();
        let filmography = DirectorFilmography::new(s.store.clone());

        let films = filmography
            .films_by_director(s.director.id, DirectorSort::Year)
            .await
            .unwrap();
        assert_eq!(ids(&films), vec![s.a.id, twin.id, s.c.id]);
    }

    #[tokio::test]
    async fn test_by_likes_most_liked_first() {
        let s = scenario().await;
        let filmography = DirectorFilmography::new(s.store.clone());

        let films = filmography
            .films_by_director(s.director.id, DirectorSort::Likes)
            .await
            .unwrap();
        assert_eq!(ids(&films), vec![s.c.id, s.a.id]);
    }

    #[tokio::test]
    async fn test_unsorted_is_id_order() {
        let s = scenario().await;
        let early = s
            .store
            .create_film(&draft(
                "Early Work",
                date(1996, 2, 2),
                vec![],
                vec![s.director.id],
            ))
            .await
            .unwrap();
        let filmography = DirectorFilmography::new(s.store.clone());

        let first = filmography
            .films_by_director(s.director.id, DirectorSort::None)
            .await
            .unwrap();
        let second = filmography
            .films_by_director(s.director.id, DirectorSort::None)
            .await
            .unwrap();
        assert_eq!(ids(&first), vec![s.a.id, s.c.id, early.id]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_director_without_films_is_empty() {
        let s = scenario().await;
        let idle = s.store.create_director("Idle Hands").await.unwrap();
        let filmography = DirectorFilmography::new(s.store.clone());

        let films = filmography
            .films_by_director(idle.id, DirectorSort::Likes)
            .await
            .unwrap();
        assert!(films.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_director_fails() {
        let s = scenario().await;
        let filmography = DirectorFilmography::new(s.store.clone());

        let err = filmography
            .films_by_director(31, DirectorSort::Year)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DirectorNotFound(31)));
    }
}
