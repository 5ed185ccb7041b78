use std::sync::Arc;

use super::{ranking::sort_by_popularity, LikeIndex};
use crate::{
    db::EntityStore,
    error::AppResult,
    models::{Film, SearchField, SearchFields},
};

/// True when any selected field contains `needle`
///
/// `needle` must already be lowercased.
pub fn matches_query(film: &Film, needle: &str, fields: SearchFields) -> bool {
    let title_hit =
        fields.contains(SearchField::Title) && film.name.to_lowercase().contains(needle);
    let director_hit = fields.contains(SearchField::Director)
        && film
            .directors
            .iter()
            .any(|director| director.name.to_lowercase().contains(needle));
    title_hit || director_hit
}

/// Case-insensitive substring search over titles and director names
pub struct CatalogSearch {
    store: Arc<dyn EntityStore>,
    likes: LikeIndex,
}

impl CatalogSearch {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let likes = LikeIndex::new(store.clone());
        Self { store, likes }
    }

    /// Films matching `query` in any selected field, most liked first
    ///
    /// A blank query matches nothing.
    pub async fn search(&self, query: &str, fields: SearchFields) -> AppResult<Vec<Film>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut films: Vec<Film> = self
            .store
            .all_films()
            .await?
            .into_iter()
            .filter(|film| matches_query(film, &needle, fields))
            .collect();

        let counts = self.likes.counts_for(&films).await?;
        sort_by_popularity(&mut films, &counts);
        Ok(films)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{EntityStore, MockEntityStore};
    use crate::services::test_support::{date, draft, ids, scenario};

    #[tokio::test]
    async fn test_title_match_is_case_insensitive() {
        let s = scenario().await;
        let search = CatalogSearch::new(s.store.clone());

        let films = search.search("lADy", SearchFields::TITLE).await.unwrap();
        assert_eq!(ids(&films), vec![s.c.id]);
    }

    #[tokio::test]
    async fn test_director_match() {
        let s = scenario().await;
        let search = CatalogSearch::new(s.store.clone());

        let films = search.search("gerwig", SearchFields::DIRECTOR).await.unwrap();
        assert_eq!(ids(&films), vec![s.c.id, s.a.id]);

        // director field alone ignores titles
        let films = search.search("heat", SearchFields::DIRECTOR).await.unwrap();
        assert!(films.is_empty());
    }

    #[tokio::test]
    async fn test_both_fields_is_union() {
        let s = scenario().await;
        let matrix = s.store.create_director("Matrix Crew").await.unwrap();
        let by_title = s
            .store
            .create_film(&draft("The Matrix", date(1999, 3, 31), vec![], vec![]))
            .await
            .unwrap();
        let by_director = s
            .store
            .create_film(&draft("Bound", date(1996, 9, 13), vec![], vec![matrix.id]))
            .await
            .unwrap();
        s.store.add_like(by_director.id, s.users[0].id).await.unwrap();

        let search = CatalogSearch::new(s.store.clone());

        let films = search.search("matrix", SearchFields::BOTH).await.unwrap();
        assert_eq!(ids(&films), vec![by_director.id, by_title.id]);

        let films = search.search("matrix", SearchFields::TITLE).await.unwrap();
        assert_eq!(ids(&films), vec![by_title.id]);
    }

    #[tokio::test]
    async fn test_film_matching_both_fields_appears_once() {
        let s = scenario().await;
        let search = CatalogSearch::new(s.store.clone());

        // "a" hits every title and the director's name
        let films = search.search("a", SearchFields::BOTH).await.unwrap();
        assert_eq!(ids(&films), vec![s.b.id, s.c.id, s.a.id]);
    }

    #[tokio::test]
    async fn test_blank_query_matches_nothing() {
        // The store must not even be scanned
        let search = CatalogSearch::new(Arc::new(MockEntityStore::new()));

        assert!(search.search("", SearchFields::TITLE).await.unwrap().is_empty());
        assert!(search.search("   ", SearchFields::BOTH).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let s = scenario().await;
        let search = CatalogSearch::new(s.store.clone());
        assert!(search
            .search("zzz", SearchFields::BOTH)
            .await
            .unwrap()
            .is_empty());
    }
}
