//! Entity Store abstraction
//!
//! Durable storage for films, users, directors, genres and likes. The ranking
//! and search services only consume this trait, so any backend that honors
//! the read contract can sit behind the catalog.

use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    models::{
        Director, DirectorId, Film, FilmDraft, FilmId, Genre, GenreId, NewUser, User, UserId,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{create_pool, run_migrations, PgEntityStore};

/// Trait for catalog storage backends
///
/// Lookups return `Ok(None)` for unknown ids; turning that into a typed
/// not-found error is the caller's job. Like mutations are idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>>;

    /// All films in id order
    async fn all_films(&self) -> AppResult<Vec<Film>>;

    /// Stores a new film, resolving its genre and director references
    async fn create_film(&self, draft: &FilmDraft) -> AppResult<Film>;

    /// Replaces every field of an existing film; `Ok(None)` when absent
    async fn update_film(&self, id: FilmId, draft: &FilmDraft) -> AppResult<Option<Film>>;

    /// Returns whether a film was removed
    async fn delete_film(&self, id: FilmId) -> AppResult<bool>;

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>>;

    async fn create_user(&self, user: &NewUser) -> AppResult<User>;

    async fn get_director(&self, id: DirectorId) -> AppResult<Option<Director>>;

    async fn all_directors(&self) -> AppResult<Vec<Director>>;

    async fn create_director(&self, name: &str) -> AppResult<Director>;

    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>>;

    async fn all_genres(&self) -> AppResult<Vec<Genre>>;

    /// Number of users who liked the film
    async fn like_count(&self, film_id: FilmId) -> AppResult<u64>;

    /// Like counts for many films at once
    ///
    /// Default implementation issues one `like_count` per film. Backends with
    /// a grouped query should override it.
    async fn like_counts(&self, film_ids: &[FilmId]) -> AppResult<HashMap<FilmId, u64>> {
        let mut counts = HashMap::with_capacity(film_ids.len());
        for &film_id in film_ids {
            counts.insert(film_id, self.like_count(film_id).await?);
        }
        Ok(counts)
    }

    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<HashSet<FilmId>>;

    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()>;

    async fn delete_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()>;
}
