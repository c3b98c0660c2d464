//! Typed endpoint surface over the movie-tracking backend
//!
//! Thin, strongly-typed wrappers around [`cinetrack_session::SessionClient`]
//! for every backend route: browse/detail/rate movies, manage the personal
//! collection, fetch recommendations, and search by title, person, or
//! genre. Auth handling (bearer attachment, refresh-on-401, retry) lives
//! entirely in the session layer; this crate only shapes requests and
//! decodes responses.
//!
//! Caller input that can be rejected without a network round trip
//! (zero ids, out-of-range ratings, empty search terms) fails fast with
//! [`cinetrack_session::Error::Validation`].

pub mod collection;
pub mod models;
pub mod movies;
pub mod recommendations;
pub mod search;

pub use models::{CollectionEntry, Genre, Movie, Page, RatingResponse, Video};
pub use search::SearchQuery;

pub use cinetrack_session::{Error, Result, SessionClient};
