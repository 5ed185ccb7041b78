use crate::models::{DirectorId, FilmId, GenreId, UserId};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Film not found: {0}")]
    FilmNotFound(FilmId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Director not found: {0}")]
    DirectorNotFound(DirectorId),

    #[error("Genre not found: {0}")]
    GenreNotFound(GenreId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for every kind of unresolved identifier
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::FilmNotFound(_)
                | AppError::UserNotFound(_)
                | AppError::DirectorNotFound(_)
                | AppError::GenreNotFound(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
