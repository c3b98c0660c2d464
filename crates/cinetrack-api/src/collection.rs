//! Personal collection management

use cinetrack_session::{Result, SessionClient};
use tracing::debug;

use crate::models::{AddEntryRequest, CollectionEntry};
use crate::movies::ensure_tmdb_id;

/// The authenticated user's full collection.
pub async fn list(session: &SessionClient) -> Result<Vec<CollectionEntry>> {
    session.get("/api/collection/").await?.json()
}

/// Add a movie to the collection. Rating and notes start empty and are
/// filled in later through the rating endpoint.
pub async fn add(session: &SessionClient, tmdb_id: u64) -> Result<()> {
    ensure_tmdb_id(tmdb_id)?;
    debug!(tmdb_id, "adding movie to collection");
    session
        .post(
            &format!("/api/collection/{tmdb_id}/"),
            &AddEntryRequest {
                rating: None,
                notes: String::new(),
            },
        )
        .await?;
    Ok(())
}

/// Remove a movie from the collection.
pub async fn remove(session: &SessionClient, tmdb_id: u64) -> Result<()> {
    ensure_tmdb_id(tmdb_id)?;
    debug!(tmdb_id, "removing movie from collection");
    session
        .delete(&format!("/api/collection/{tmdb_id}/remove/"))
        .await?;
    Ok(())
}

/// Whether the collection contains a given movie.
pub async fn contains(session: &SessionClient, tmdb_id: u64) -> Result<bool> {
    ensure_tmdb_id(tmdb_id)?;
    let entries = list(session).await?;
    Ok(entries
        .iter()
        .any(|e| e.movie_details.as_ref().is_some_and(|m| m.tmdb_id == tmdb_id)))
}
