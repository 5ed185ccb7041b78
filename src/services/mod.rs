pub mod catalog;
pub mod co_preference;
pub mod filmography;
pub mod likes;
pub mod ranking;
pub mod search;

pub use catalog::FilmCatalog;
pub use co_preference::CoPreferenceResolver;
pub use filmography::DirectorFilmography;
pub use likes::LikeIndex;
pub use ranking::PopularityRanker;
pub use search::CatalogSearch;

use crate::{
    db::EntityStore,
    error::{AppError, AppResult},
    models::{Director, DirectorId, Film, FilmId, Genre, GenreId, User, UserId},
};

// Lookups that turn an unresolved id into its typed not-found error.

pub(crate) async fn require_film(store: &dyn EntityStore, id: FilmId) -> AppResult<Film> {
    store.get_film(id).await?.ok_or(AppError::FilmNotFound(id))
}

pub(crate) async fn require_user(store: &dyn EntityStore, id: UserId) -> AppResult<User> {
    store.get_user(id).await?.ok_or(AppError::UserNotFound(id))
}

pub(crate) async fn require_director(
    store: &dyn EntityStore,
    id: DirectorId,
) -> AppResult<Director> {
    store
        .get_director(id)
        .await?
        .ok_or(AppError::DirectorNotFound(id))
}

pub(crate) async fn require_genre(store: &dyn EntityStore, id: GenreId) -> AppResult<Genre> {
    store.get_genre(id).await?.ok_or(AppError::GenreNotFound(id))
}
