use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Director, DirectorId, FilmId, Genre, GenreId};
use crate::error::{AppError, AppResult};

/// Earliest recognized cinema release (the Lumière screening)
pub const CINEMA_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1895, 12, 28) {
    Some(date) => date,
    None => panic!("invalid cinema epoch"),
};

pub const MAX_DESCRIPTION_LEN: usize = 200;

/// MPA film rating classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MpaRating {
    #[default]
    #[serde(rename = "G")]
    G,
    #[serde(rename = "PG")]
    Pg,
    #[serde(rename = "PG-13")]
    Pg13,
    #[serde(rename = "R")]
    R,
    #[serde(rename = "NC-17")]
    Nc17,
}

impl MpaRating {
    /// Stable numeric id used by the relational store
    pub fn id(self) -> i16 {
        match self {
            MpaRating::G => 1,
            MpaRating::Pg => 2,
            MpaRating::Pg13 => 3,
            MpaRating::R => 4,
            MpaRating::Nc17 => 5,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(MpaRating::G),
            2 => Some(MpaRating::Pg),
            3 => Some(MpaRating::Pg13),
            4 => Some(MpaRating::R),
            5 => Some(MpaRating::Nc17),
            _ => None,
        }
    }
}

/// A film as stored in the catalog, with its genres and directors resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// Runtime in minutes
    pub duration: i32,
    pub mpa: MpaRating,
    pub genres: Vec<Genre>,
    pub directors: Vec<Director>,
}

impl Film {
    pub fn has_genre(&self, genre_id: GenreId) -> bool {
        self.genres.iter().any(|g| g.id == genre_id)
    }

    pub fn has_director(&self, director_id: DirectorId) -> bool {
        self.directors.iter().any(|d| d.id == director_id)
    }
}

/// Client-supplied film fields for creation and full-record updates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    #[serde(default)]
    pub mpa: MpaRating,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub director_ids: Vec<DirectorId>,
}

impl FilmDraft {
    /// Checks the field constraints a film must satisfy before it is stored
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Film name must not be blank".to_string()));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::Validation(format!(
                "Film description must be at most {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
        if self.duration <= 0 {
            return Err(AppError::Validation(
                "Film duration must be positive".to_string(),
            ));
        }
        if self.release_date < CINEMA_EPOCH {
            return Err(AppError::Validation(format!(
                "Release date is before {}",
                CINEMA_EPOCH
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> FilmDraft {
        FilmDraft {
            name: "The Matrix".to_string(),
            description: "A hacker learns the truth".to_string(),
            release_date: NaiveDate::from_ymd_opt(1999, 3, 31).unwrap(),
            duration: 136,
            mpa: MpaRating::R,
            genre_ids: vec![6],
            director_ids: vec![],
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_release_date_on_epoch_is_accepted() {
        let mut film = draft();
        film.release_date = CINEMA_EPOCH;
        assert!(film.validate().is_ok());
    }

    #[test]
    fn test_release_date_before_epoch_is_rejected() {
        let mut film = draft();
        film.release_date = NaiveDate::from_ymd_opt(1895, 12, 27).unwrap();
        let err = film.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("1895-12-28"));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut film = draft();
        film.name = "   ".to_string();
        assert!(matches!(film.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_non_positive_duration_is_rejected() {
        let mut film = draft();
        film.duration = 0;
        assert!(matches!(film.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_long_description_is_rejected() {
        let mut film = draft();
        film.description = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(matches!(film.validate(), Err(AppError::Validation(_))));

        film.description = "x".repeat(MAX_DESCRIPTION_LEN);
        assert!(film.validate().is_ok());
    }

    #[test]
    fn test_mpa_ids_are_stable() {
        for id in 1..=5 {
            let rating = MpaRating::from_id(id).unwrap();
            assert_eq!(rating.id(), id);
        }
        assert_eq!(MpaRating::from_id(0), None);
        assert_eq!(MpaRating::from_id(6), None);
    }

    #[test]
    fn test_mpa_serialization() {
        let json = serde_json::to_string(&MpaRating::Pg13).unwrap();
        assert_eq!(json, "\"PG-13\"");

        let rating: MpaRating = serde_json::from_str("\"NC-17\"").unwrap();
        assert_eq!(rating, MpaRating::Nc17);
    }

    #[test]
    fn test_draft_defaults_optional_fields() {
        let draft: FilmDraft = serde_json::from_str(
            r#"{"name":"Nosferatu","release_date":"1922-03-04","duration":94}"#,
        )
        .unwrap();
        assert_eq!(draft.mpa, MpaRating::G);
        assert!(draft.genre_ids.is_empty());
        assert!(draft.director_ids.is_empty());
        assert!(draft.validate().is_ok());
    }
}
