pub mod film;
pub mod people;
pub mod query;

pub use film::{Film, FilmDraft, MpaRating, CINEMA_EPOCH, MAX_DESCRIPTION_LEN};
pub use people::{Director, Genre, NewUser, User};
pub use query::{DirectorSort, PopularQuery, SearchField, SearchFields, DEFAULT_POPULAR_COUNT};

pub type FilmId = i64;
pub type UserId = i64;
pub type DirectorId = i64;
pub type GenreId = i64;
