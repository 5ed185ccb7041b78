use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};

use super::EntityStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        Director, DirectorId, Film, FilmDraft, FilmId, Genre, GenreId, MpaRating, NewUser, User,
        UserId,
    },
};

const FILM_COLUMNS: &str = "id, name, description, release_date, duration, mpa_id";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct FilmRow {
    id: FilmId,
    name: String,
    description: String,
    release_date: NaiveDate,
    duration: i32,
    mpa_id: i16,
}

impl FilmRow {
    fn into_film(self, genres: Vec<Genre>, directors: Vec<Director>) -> AppResult<Film> {
        let mpa = MpaRating::from_id(self.mpa_id).ok_or_else(|| {
            AppError::Internal(format!(
                "Film {} has unknown MPA rating id {}",
                self.id, self.mpa_id
            ))
        })?;

        Ok(Film {
            id: self.id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa,
            genres,
            directors,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    birthday: Option<NaiveDate>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            birthday: row.birthday,
        }
    }
}

/// Entity store backed by PostgreSQL
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attaches genres and directors to bare film rows, keeping row order
    async fn hydrate(&self, rows: Vec<FilmRow>) -> AppResult<Vec<Film>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<FilmId> = rows.iter().map(|r| r.id).collect();

        let genre_rows: Vec<(FilmId, GenreId, String)> = sqlx::query_as(
            r#"
            SELECT fg.film_id, g.id, g.name
            FROM film_genres fg
            JOIN genres g ON g.id = fg.genre_id
            WHERE fg.film_id = ANY($1)
            ORDER BY g.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let director_rows: Vec<(FilmId, DirectorId, String)> = sqlx::query_as(
            r#"
            SELECT fd.film_id, d.id, d.name
            FROM film_directors fd
            JOIN directors d ON d.id = fd.director_id
            WHERE fd.film_id = ANY($1)
            ORDER BY d.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<FilmId, Vec<Genre>> = HashMap::new();
        for (film_id, id, name) in genre_rows {
            genres.entry(film_id).or_default().push(Genre { id, name });
        }

        let mut directors: HashMap<FilmId, Vec<Director>> = HashMap::new();
        for (film_id, id, name) in director_rows {
            directors
                .entry(film_id)
                .or_default()
                .push(Director { id, name });
        }

        rows.into_iter()
            .map(|row| {
                let film_genres = genres.remove(&row.id).unwrap_or_default();
                let film_directors = directors.remove(&row.id).unwrap_or_default();
                row.into_film(film_genres, film_directors)
            })
            .collect()
    }

    /// Fails with the first genre or director id that does not resolve
    async fn check_references(
        tx: &mut Transaction<'_, Postgres>,
        genre_ids: &[GenreId],
        director_ids: &[DirectorId],
    ) -> AppResult<()> {
        let found: HashSet<GenreId> =
            sqlx::query_scalar::<_, GenreId>("SELECT id FROM genres WHERE id = ANY($1)")
                .bind(genre_ids)
                .fetch_all(&mut **tx)
                .await?
                .into_iter()
                .collect();
        if let Some(missing) = genre_ids.iter().find(|id| !found.contains(id)) {
            return Err(AppError::GenreNotFound(*missing));
        }

        let found: HashSet<DirectorId> =
            sqlx::query_scalar::<_, DirectorId>("SELECT id FROM directors WHERE id = ANY($1)")
                .bind(director_ids)
                .fetch_all(&mut **tx)
                .await?
                .into_iter()
                .collect();
        if let Some(missing) = director_ids.iter().find(|id| !found.contains(id)) {
            return Err(AppError::DirectorNotFound(*missing));
        }

        Ok(())
    }

    async fn write_links(
        tx: &mut Transaction<'_, Postgres>,
        film_id: FilmId,
        genre_ids: &[GenreId],
        director_ids: &[DirectorId],
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO film_genres (film_id, genre_id) SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(film_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO film_directors (film_id, director_id) SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(film_id)
        .bind(director_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

/// Sorted, duplicate-free copy of a reference list
fn dedup(ids: &[i64]) -> Vec<i64> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

#[async_trait::async_trait]
impl EntityStore for PgEntityStore {
    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        let query = format!("SELECT {FILM_COLUMNS} FROM films WHERE id = $1");
        let row = sqlx::query_as::<_, FilmRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn all_films(&self) -> AppResult<Vec<Film>> {
        let query = format!("SELECT {FILM_COLUMNS} FROM films ORDER BY id");
        let rows = sqlx::query_as::<_, FilmRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn create_film(&self, draft: &FilmDraft) -> AppResult<Film> {
        let genre_ids = dedup(&draft.genre_ids);
        let director_ids = dedup(&draft.director_ids);

        let mut tx = self.pool.begin().await?;
        Self::check_references(&mut tx, &genre_ids, &director_ids).await?;

        let id: FilmId = sqlx::query_scalar(
            r#"
            INSERT INTO films (name, description, release_date, duration, mpa_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.release_date)
        .bind(draft.duration)
        .bind(draft.mpa.id())
        .fetch_one(&mut *tx)
        .await?;

        Self::write_links(&mut tx, id, &genre_ids, &director_ids).await?;
        tx.commit().await?;

        tracing::debug!(film_id = id, "Inserted film");

        self.get_film(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Film {} vanished after insert", id)))
    }

    async fn update_film(&self, id: FilmId, draft: &FilmDraft) -> AppResult<Option<Film>> {
        let genre_ids = dedup(&draft.genre_ids);
        let director_ids = dedup(&draft.director_ids);

        let mut tx = self.pool.begin().await?;
        Self::check_references(&mut tx, &genre_ids, &director_ids).await?;

        let updated = sqlx::query(
            r#"
            UPDATE films
            SET name = $1, description = $2, release_date = $3, duration = $4, mpa_id = $5
            WHERE id = $6
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.release_date)
        .bind(draft.duration)
        .bind(draft.mpa.id())
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }

        sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM film_directors WHERE film_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::write_links(&mut tx, id, &genre_ids, &director_ids).await?;
        tx.commit().await?;

        self.get_film(id).await
    }

    async fn delete_film(&self, id: FilmId) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM films WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, birthday FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, name, birthday)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, birthday
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.birthday)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_director(&self, id: DirectorId) -> AppResult<Option<Director>> {
        let row: Option<(DirectorId, String)> =
            sqlx::query_as("SELECT id, name FROM directors WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, name)| Director { id, name }))
    }

    async fn all_directors(&self) -> AppResult<Vec<Director>> {
        let rows: Vec<(DirectorId, String)> =
            sqlx::query_as("SELECT id, name FROM directors ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Director { id, name })
            .collect())
    }

    async fn create_director(&self, name: &str) -> AppResult<Director> {
        let id: DirectorId =
            sqlx::query_scalar("INSERT INTO directors (name) VALUES ($1) RETURNING id")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(Director {
            id,
            name: name.to_string(),
        })
    }

    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>> {
        let row: Option<(GenreId, String)> =
            sqlx::query_as("SELECT id, name FROM genres WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, name)| Genre { id, name }))
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        let rows: Vec<(GenreId, String)> =
            sqlx::query_as("SELECT id, name FROM genres ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Genre { id, name })
            .collect())
    }

    async fn like_count(&self, film_id: FilmId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE film_id = $1")
            .bind(film_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn like_counts(&self, film_ids: &[FilmId]) -> AppResult<HashMap<FilmId, u64>> {
        let rows: Vec<(FilmId, i64)> = sqlx::query_as(
            r#"
            SELECT film_id, COUNT(*)
            FROM likes
            WHERE film_id = ANY($1)
            GROUP BY film_id
            "#,
        )
        .bind(film_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut counts: HashMap<FilmId, u64> = film_ids.iter().map(|id| (*id, 0)).collect();
        for (film_id, count) in rows {
            counts.insert(film_id, count as u64);
        }
        Ok(counts)
    }

    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<HashSet<FilmId>> {
        let ids: Vec<FilmId> = sqlx::query_scalar("SELECT film_id FROM likes WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO likes (film_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(film_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        sqlx::query("DELETE FROM likes WHERE film_id = $1 AND user_id = $2")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
