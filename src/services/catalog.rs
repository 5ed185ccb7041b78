use std::sync::Arc;

use super::{
    require_director, require_film, CatalogSearch, CoPreferenceResolver, DirectorFilmography,
    LikeIndex, PopularityRanker,
};
use crate::{
    config::Config,
    db::{create_pool, run_migrations, EntityStore, PgEntityStore},
    error::{AppError, AppResult},
    models::{
        Director, DirectorId, DirectorSort, Film, FilmDraft, FilmId, Genre, PopularQuery,
        SearchFields, UserId,
    },
};

/// Entry point the request-handling layer calls into
///
/// Bundles the ranking and search components over one shared store and adds
/// the film and director pass-through operations. Holds no mutable state, so
/// a single instance can serve concurrent callers.
pub struct FilmCatalog {
    store: Arc<dyn EntityStore>,
    likes: LikeIndex,
    ranker: PopularityRanker,
    co_preference: CoPreferenceResolver,
    filmography: DirectorFilmography,
    search: CatalogSearch,
}

impl FilmCatalog {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            likes: LikeIndex::new(store.clone()),
            ranker: PopularityRanker::new(store.clone()),
            co_preference: CoPreferenceResolver::new(store.clone()),
            filmography: DirectorFilmography::new(store.clone()),
            search: CatalogSearch::new(store.clone()),
            store,
        }
    }

    /// Connects to PostgreSQL, applies migrations and builds the catalog
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url, config.max_connections).await?;
        run_migrations(&pool).await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Film catalog connected to PostgreSQL"
        );

        Ok(Self::new(Arc::new(PgEntityStore::new(pool))))
    }

    // ------------------------------------------------------------------
    // Films
    // ------------------------------------------------------------------

    pub async fn create_film(&self, draft: &FilmDraft) -> AppResult<Film> {
        tracing::info!(film_name = %draft.name, "Creating film");
        draft.validate().inspect_err(|e| {
            tracing::warn!(error = %e, film_name = %draft.name, "Rejected film");
        })?;

        let film = self.store.create_film(draft).await?;
        tracing::info!(film_id = film.id, "Film created");
        Ok(film)
    }

    /// Replaces every field of an existing film
    pub async fn update_film(&self, film_id: FilmId, draft: &FilmDraft) -> AppResult<Film> {
        tracing::info!(film_id, "Updating film");
        draft.validate().inspect_err(|e| {
            tracing::warn!(error = %e, film_id, "Rejected film update");
        })?;

        self.store
            .update_film(film_id, draft)
            .await?
            .ok_or(AppError::FilmNotFound(film_id))
    }

    pub async fn delete_film(&self, film_id: FilmId) -> AppResult<()> {
        tracing::info!(film_id, "Deleting film");
        if self.store.delete_film(film_id).await? {
            Ok(())
        } else {
            Err(AppError::FilmNotFound(film_id))
        }
    }

    pub async fn get_film(&self, film_id: FilmId) -> AppResult<Film> {
        tracing::debug!(film_id, "Fetching film");
        require_film(self.store.as_ref(), film_id).await
    }

    pub async fn all_films(&self) -> AppResult<Vec<Film>> {
        self.store.all_films().await
    }

    // ------------------------------------------------------------------
    // Directors and genres
    // ------------------------------------------------------------------

    pub async fn create_director(&self, name: &str) -> AppResult<Director> {
        tracing::info!(director_name = name, "Creating director");
        Director::validate_name(name)?;
        self.store.create_director(name.trim()).await
    }

    pub async fn get_director(&self, director_id: DirectorId) -> AppResult<Director> {
        require_director(self.store.as_ref(), director_id).await
    }

    pub async fn all_directors(&self) -> AppResult<Vec<Director>> {
        self.store.all_directors().await
    }

    pub async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        self.store.all_genres().await
    }

    // ------------------------------------------------------------------
    // Likes
    // ------------------------------------------------------------------

    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        tracing::info!(film_id, user_id, "Adding like");
        self.likes.add_like(film_id, user_id).await?;
        tracing::info!(film_id, user_id, "Like added");
        Ok(())
    }

    pub async fn delete_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        tracing::info!(film_id, user_id, "Deleting like");
        self.likes.delete_like(film_id, user_id).await?;
        tracing::info!(film_id, user_id, "Like deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ranking and search
    // ------------------------------------------------------------------

    /// Most liked films, optionally restricted to a genre and release year
    pub async fn popular(&self, query: &PopularQuery) -> AppResult<Vec<Film>> {
        tracing::info!(
            count = ?query.count,
            genre_id = ?query.genre_id,
            year = ?query.year,
            "Ranking popular films"
        );
        let films = self.ranker.rank(query).await?;
        tracing::debug!(result_count = films.len(), "Popular films ranked");
        Ok(films)
    }

    /// Films both users liked, most popular first
    pub async fn common_films(&self, user_id: UserId, other_id: UserId) -> AppResult<Vec<Film>> {
        tracing::info!(user_id, other_id, "Resolving common films");
        let films = self.co_preference.common_films(user_id, other_id).await?;
        tracing::debug!(result_count = films.len(), "Common films resolved");
        Ok(films)
    }

    pub async fn films_by_director(
        &self,
        director_id: DirectorId,
        sort: DirectorSort,
    ) -> AppResult<Vec<Film>> {
        tracing::info!(director_id, sort = ?sort, "Resolving director filmography");
        let films = self.filmography.films_by_director(director_id, sort).await?;
        tracing::debug!(result_count = films.len(), "Filmography resolved");
        Ok(films)
    }

    pub async fn search(&self, query: &str, fields: SearchFields) -> AppResult<Vec<Film>> {
        tracing::info!(query, fields = ?fields, "Searching films");
        let films = self.search.search(query, fields).await?;
        tracing::debug!(result_count = films.len(), "Search complete");
        Ok(films)
    }

    /// Search with a raw field selector such as `"title,director"`
    pub async fn search_films(&self, query: &str, by: &str) -> AppResult<Vec<Film>> {
        let fields = by.parse::<SearchFields>().inspect_err(|e| {
            tracing::warn!(error = %e, by, "Rejected search field selector");
        })?;
        self.search(query, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockEntityStore;
    use crate::services::test_support::{date, draft, ids, scenario, COMEDY};

    #[tokio::test]
    async fn test_create_film_rejects_pre_cinema_date_before_store() {
        // No expectations: reaching the store would panic
        let catalog = FilmCatalog::new(Arc::new(MockEntityStore::new()));

        let err = catalog
            .create_film(&draft("Too Early", date(1890, 1, 1), vec![], vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_film() {
        let s = scenario().await;
        let catalog = FilmCatalog::new(s.store.clone());
        let update = draft("Ghost", date(2010, 1, 1), vec![], vec![]);

        assert!(matches!(
            catalog.update_film(500, &update).await,
            Err(AppError::FilmNotFound(500))
        ));
        assert!(matches!(
            catalog.delete_film(500).await,
            Err(AppError::FilmNotFound(500))
        ));
        assert!(matches!(
            catalog.get_film(500).await,
            Err(AppError::FilmNotFound(500))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_genres() {
        let s = scenario().await;
        let catalog = FilmCatalog::new(s.store.clone());

        let mut update = draft("Heat", s.b.release_date, vec![COMEDY], vec![]);
        update.duration = 170;
        let film = catalog.update_film(s.b.id, &update).await.unwrap();

        assert_eq!(film.duration, 170);
        assert!(film.has_genre(COMEDY));
        assert_eq!(film.genres.len(), 1);

        let comedies = catalog
            .popular(&PopularQuery::top(10).with_genre(COMEDY))
            .await
            .unwrap();
        assert_eq!(ids(&comedies), vec![s.b.id, s.c.id, s.a.id]);
    }

    #[tokio::test]
    async fn test_create_director_validates_name() {
        let s = scenario().await;
        let catalog = FilmCatalog::new(s.store.clone());

        assert!(matches!(
            catalog.create_director("  ").await,
            Err(AppError::Validation(_))
        ));
        let director = catalog.create_director(" Agnès Varda ").await.unwrap();
        assert_eq!(director.name, "Agnès Varda");
        assert_eq!(catalog.get_director(director.id).await.unwrap(), director);
        assert_eq!(catalog.all_directors().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_films_rejects_unknown_field() {
        let s = scenario().await;
        let catalog = FilmCatalog::new(s.store.clone());

        let err = catalog.search_films("heat", "title,year").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let films = catalog.search_films("heat", "title").await.unwrap();
        assert_eq!(ids(&films), vec![s.b.id]);
    }

    #[tokio::test]
    async fn test_deleted_film_leaves_rankings() {
        let s = scenario().await;
        let catalog = FilmCatalog::new(s.store.clone());

        catalog.delete_film(s.b.id).await.unwrap();
        let films = catalog.popular(&PopularQuery::top(2)).await.unwrap();
        assert_eq!(ids(&films), vec![s.c.id, s.a.id]);
    }
}
