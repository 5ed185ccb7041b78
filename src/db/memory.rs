use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::EntityStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        Director, DirectorId, Film, FilmDraft, FilmId, Genre, GenreId, NewUser, User, UserId,
    },
};

const STANDARD_GENRES: [&str; 6] = [
    "Comedy",
    "Drama",
    "Cartoon",
    "Thriller",
    "Documentary",
    "Action",
];

/// Process-local entity store
///
/// Keeps every relation in ordered maps so scans come back in id order.
/// Cloning shares the underlying data.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

struct StoreInner {
    films: BTreeMap<FilmId, Film>,
    users: BTreeMap<UserId, User>,
    directors: BTreeMap<DirectorId, Director>,
    genres: BTreeMap<GenreId, Genre>,
    /// (film, user) pairs
    likes: BTreeSet<(FilmId, UserId)>,
    next_film_id: FilmId,
    next_user_id: UserId,
    next_director_id: DirectorId,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store seeded with the standard genres
    pub fn new() -> Self {
        let genres = STANDARD_GENRES
            .iter()
            .zip(1..)
            .map(|(name, id)| {
                (
                    id,
                    Genre {
                        id,
                        name: name.to_string(),
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                films: BTreeMap::new(),
                users: BTreeMap::new(),
                directors: BTreeMap::new(),
                genres,
                likes: BTreeSet::new(),
                next_film_id: 1,
                next_user_id: 1,
                next_director_id: 1,
            })),
        }
    }
}

impl StoreInner {
    /// Builds the stored film, failing on unknown genre or director ids
    fn resolve(&self, id: FilmId, draft: &FilmDraft) -> AppResult<Film> {
        let mut genres = Vec::new();
        for genre_id in dedup(&draft.genre_ids) {
            let genre = self
                .genres
                .get(&genre_id)
                .ok_or(AppError::GenreNotFound(genre_id))?;
            genres.push(genre.clone());
        }

        let mut directors = Vec::new();
        for director_id in dedup(&draft.director_ids) {
            let director = self
                .directors
                .get(&director_id)
                .ok_or(AppError::DirectorNotFound(director_id))?;
            directors.push(director.clone());
        }

        Ok(Film {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            release_date: draft.release_date,
            duration: draft.duration,
            mpa: draft.mpa,
            genres,
            directors,
        })
    }
}

/// Sorted, duplicate-free copy of a reference list
fn dedup(ids: &[i64]) -> BTreeSet<i64> {
    ids.iter().copied().collect()
}

#[async_trait::async_trait]
impl EntityStore for InMemoryStore {
    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        let inner = self.inner.read().await;
        Ok(inner.films.get(&id).cloned())
    }

    async fn all_films(&self) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        Ok(inner.films.values().cloned().collect())
    }

    async fn create_film(&self, draft: &FilmDraft) -> AppResult<Film> {
        let mut inner = self.inner.write().await;
        let id = inner.next_film_id;
        let film = inner.resolve(id, draft)?;
        inner.next_film_id += 1;
        inner.films.insert(id, film.clone());
        Ok(film)
    }

    async fn update_film(&self, id: FilmId, draft: &FilmDraft) -> AppResult<Option<Film>> {
        let mut inner = self.inner.write().await;
        if !inner.films.contains_key(&id) {
            return Ok(None);
        }
        let film = inner.resolve(id, draft)?;
        inner.films.insert(id, film.clone());
        Ok(Some(film))
    }

    async fn delete_film(&self, id: FilmId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.films.remove(&id).is_some();
        if removed {
            inner.likes.retain(|(film_id, _)| *film_id != id);
        }
        Ok(removed)
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        let id = inner.next_user_id;
        inner.next_user_id += 1;
        let user = User {
            id,
            email: user.email.clone(),
            name: user.name.clone(),
            birthday: user.birthday,
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_director(&self, id: DirectorId) -> AppResult<Option<Director>> {
        let inner = self.inner.read().await;
        Ok(inner.directors.get(&id).cloned())
    }

    async fn all_directors(&self) -> AppResult<Vec<Director>> {
        let inner = self.inner.read().await;
        Ok(inner.directors.values().cloned().collect())
    }

    async fn create_director(&self, name: &str) -> AppResult<Director> {
        let mut inner = self.inner.write().await;
        let id = inner.next_director_id;
        inner.next_director_id += 1;
        let director = Director {
            id,
            name: name.to_string(),
        };
        inner.directors.insert(id, director.clone());
        Ok(director)
    }

    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>> {
        let inner = self.inner.read().await;
        Ok(inner.genres.get(&id).cloned())
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        let inner = self.inner.read().await;
        Ok(inner.genres.values().cloned().collect())
    }

    async fn like_count(&self, film_id: FilmId) -> AppResult<u64> {
        let inner = self.inner.read().await;
        let count = inner
            .likes
            .range((film_id, UserId::MIN)..=(film_id, UserId::MAX))
            .count();
        Ok(count as u64)
    }

    async fn like_counts(&self, film_ids: &[FilmId]) -> AppResult<HashMap<FilmId, u64>> {
        let wanted: HashSet<FilmId> = film_ids.iter().copied().collect();
        let inner = self.inner.read().await;

        let mut counts: HashMap<FilmId, u64> = wanted.iter().map(|id| (*id, 0)).collect();
        for (film_id, _) in inner.likes.iter().filter(|(f, _)| wanted.contains(f)) {
            *counts.entry(*film_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<HashSet<FilmId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .likes
            .iter()
            .filter(|(_, u)| *u == user_id)
            .map(|(f, _)| *f)
            .collect())
    }

    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.likes.insert((film_id, user_id));
        Ok(())
    }

    async fn delete_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.likes.remove(&(film_id, user_id));
        Ok(())
    }
}
