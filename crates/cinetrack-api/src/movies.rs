//! Movie browsing, detail, videos, and rating

use cinetrack_session::{Error, Result, SessionClient};
use tracing::debug;

use crate::models::{Movie, Page, RateRequest, RatingResponse, Video};

/// Movies currently in theaters.
pub async fn now_showing(session: &SessionClient) -> Result<Page<Movie>> {
    session.get("/api/movies/now_showing/").await?.json()
}

/// Popular movies. Public endpoint, works unauthenticated.
pub async fn popular(session: &SessionClient) -> Result<Page<Movie>> {
    session.get("/api/movies/popular/").await?.json()
}

/// Full detail for one movie, including the caller's own rating when
/// authenticated.
pub async fn detail(session: &SessionClient, tmdb_id: u64) -> Result<Movie> {
    ensure_tmdb_id(tmdb_id)?;
    session.get(&format!("/api/movies/{tmdb_id}/")).await?.json()
}

/// Trailers and clips for one movie.
pub async fn videos(session: &SessionClient, tmdb_id: u64) -> Result<Page<Video>> {
    ensure_tmdb_id(tmdb_id)?;
    session
        .get(&format!("/api/movies/{tmdb_id}/videos/"))
        .await?
        .json()
}

/// Submit a rating for a movie. Ratings are whole stars, 1 through 5.
pub async fn rate(session: &SessionClient, tmdb_id: u64, rating: u8) -> Result<RatingResponse> {
    ensure_tmdb_id(tmdb_id)?;
    if !(1..=5).contains(&rating) {
        return Err(Error::Validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )));
    }
    debug!(tmdb_id, rating, "submitting rating");
    session
        .put(&format!("/api/movies/{tmdb_id}/rate/"), &RateRequest { rating })
        .await?
        .json()
}

pub(crate) fn ensure_tmdb_id(tmdb_id: u64) -> Result<()> {
    if tmdb_id == 0 {
        return Err(Error::Validation("tmdb_id must be positive".into()));
    }
    Ok(())
}
