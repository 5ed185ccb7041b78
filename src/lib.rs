//! Film ranking and search engine for a movie catalog.
//!
//! Tracks films, users, likes and director associations on top of a
//! pluggable [`db::EntityStore`], and answers popularity, co-preference,
//! filmography and text-search queries through [`FilmCatalog`].

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::FilmCatalog;
