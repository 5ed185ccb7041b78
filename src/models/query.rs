use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::GenreId;
use crate::error::AppError;

pub const DEFAULT_POPULAR_COUNT: i64 = 10;

/// Arguments for the popularity ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularQuery {
    /// Maximum number of films; `None` means [`DEFAULT_POPULAR_COUNT`]
    pub count: Option<i64>,
    pub genre_id: Option<GenreId>,
    pub year: Option<i32>,
}

impl PopularQuery {
    pub fn top(count: i64) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn with_genre(mut self, genre_id: GenreId) -> Self {
        self.genre_id = Some(genre_id);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Resolves the requested count, rejecting non-positive values
    pub fn limit(&self) -> Result<usize, AppError> {
        match self.count {
            None => Ok(DEFAULT_POPULAR_COUNT as usize),
            Some(n) if n > 0 => usize::try_from(n)
                .map_err(|_| AppError::Validation(format!("Count {} is too large", n))),
            Some(n) => Err(AppError::Validation(format!(
                "Count must be positive, got {}",
                n
            ))),
        }
    }
}

/// Ordering applied to a director's filmography
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectorSort {
    /// Film id ascending
    #[default]
    None,
    /// Release date ascending
    Year,
    /// Like count descending
    Likes,
}

impl FromStr for DirectorSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(DirectorSort::None),
            "year" => Ok(DirectorSort::Year),
            "likes" => Ok(DirectorSort::Likes),
            other => Err(AppError::Validation(format!(
                "Unknown sort mode '{}', expected 'year' or 'likes'",
                other
            ))),
        }
    }
}

/// A film attribute the catalog search can match against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Director,
}

impl FromStr for SearchField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "director" => Ok(SearchField::Director),
            other => Err(AppError::Validation(format!(
                "Unknown search field '{}', expected 'title' or 'director'",
                other
            ))),
        }
    }
}

/// Non-empty selection of search fields, matched with OR semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFields {
    title: bool,
    director: bool,
}

impl SearchFields {
    pub const TITLE: SearchFields = SearchFields {
        title: true,
        director: false,
    };
    pub const DIRECTOR: SearchFields = SearchFields {
        title: false,
        director: true,
    };
    pub const BOTH: SearchFields = SearchFields {
        title: true,
        director: true,
    };

    pub fn from_fields(fields: &[SearchField]) -> Result<Self, AppError> {
        let selection = SearchFields {
            title: fields.contains(&SearchField::Title),
            director: fields.contains(&SearchField::Director),
        };
        if !selection.title && !selection.director {
            return Err(AppError::Validation(
                "At least one search field is required".to_string(),
            ));
        }
        Ok(selection)
    }

    pub fn contains(&self, field: SearchField) -> bool {
        match field {
            SearchField::Title => self.title,
            SearchField::Director => self.director,
        }
    }
}

impl FromStr for SearchFields {
    type Err = AppError;

    /// Parses a comma separated list such as `"title,director"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .split(',')
            .filter(|token| !token.trim().is_empty())
            .map(SearchField::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        SearchFields::from_fields(&fields)
    }
}
