use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DirectorId, GenreId, UserId};
use crate::error::{AppError, AppResult};

/// A catalog user; only read by the ranking code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
}

/// Fields for registering a user with a store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Director {
    pub id: DirectorId,
    pub name: String,
}

impl Director {
    /// Director names must contain something other than whitespace
    pub fn validate_name(name: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Director name must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_director_name_validation() {
        assert!(Director::validate_name("Lana Wachowski").is_ok());
        assert!(matches!(
            Director::validate_name(""),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            Director::validate_name(" \t"),
            Err(AppError::Validation(_))
        ));
    }
}
