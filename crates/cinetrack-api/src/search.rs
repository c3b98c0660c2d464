//! Search by title, person, or genre

use cinetrack_session::{ApiRequest, Error, Method, Result, SessionClient};
use tracing::debug;

use crate::models::{Genre, Movie, Page};

/// One search criterion for the advanced search endpoint.
#[derive(Debug, Clone)]
pub enum SearchQuery {
    Title(String),
    Person(String),
    GenreId(u64),
}

impl SearchQuery {
    /// Query-string parameter for this criterion. Empty terms are a
    /// caller error and rejected before dispatch.
    fn param(&self) -> Result<(&'static str, String)> {
        match self {
            SearchQuery::Title(title) => {
                let title = title.trim();
                if title.is_empty() {
                    return Err(Error::Validation("search title must not be empty".into()));
                }
                Ok(("title", title.to_string()))
            }
            SearchQuery::Person(person) => {
                let person = person.trim();
                if person.is_empty() {
                    return Err(Error::Validation("search person must not be empty".into()));
                }
                Ok(("person", person.to_string()))
            }
            SearchQuery::GenreId(id) => {
                if *id == 0 {
                    return Err(Error::Validation("genre_id must be positive".into()));
                }
                Ok(("genre_id", id.to_string()))
            }
        }
    }
}

/// Run an advanced search with one criterion.
pub async fn advanced(session: &SessionClient, query: &SearchQuery) -> Result<Page<Movie>> {
    let (name, value) = query.param()?;
    debug!(criterion = name, "running advanced search");
    session
        .send(ApiRequest::new(Method::GET, "/api/search/advanced/").query(name, value))
        .await?
        .json()
}

/// All genres known to the backend.
pub async fn genres(session: &SessionClient) -> Result<Vec<Genre>> {
    session.get("/api/genres/").await?.json()
}

/// Search by genre name: resolve the name against the genre list
/// (case-insensitive substring match), then search by the matched id.
/// Returns `None` when no genre matches.
pub async fn by_genre_name(
    session: &SessionClient,
    name: &str,
) -> Result<Option<Page<Movie>>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("genre name must not be empty".into()));
    }
    let needle = name.to_lowercase();
    let all = genres(session).await?;
    let Some(genre) = all.iter().find(|g| g.name.to_lowercase().contains(&needle)) else {
        return Ok(None);
    };
    advanced(session, &SearchQuery::GenreId(genre.tmdb_id))
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::extract::Query;
    use axum::routing::get;
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn start_backend() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = axum::Router::new()
            .route(
                "/api/search/advanced/",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    // Echo which criterion arrived as a fake result title
                    let criterion = ["title", "person", "genre_id"]
                        .iter()
                        .find(|k| params.contains_key(**k))
                        .copied()
                        .unwrap_or("none");
                    Json(json!({"results": [{"tmdb_id": 1, "title": criterion}]}))
                }),
            )
            .route(
                "/api/genres/",
                get(|| async {
                    Json(json!([
                        {"tmdb_id": 28, "name": "Action"},
                        {"tmdb_id": 878, "name": "Science Fiction"}
                    ]))
                }),
            );

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn session(base_url: &str) -> SessionClient {
        SessionClient::builder().base_url(base_url).build().unwrap()
    }

    #[tokio::test]
    async fn advanced_sends_the_right_criterion() {
        let url = start_backend().await;
        let session = session(&url);

        let page = advanced(&session, &SearchQuery::Title("matrix".into()))
            .await
            .unwrap();
        assert_eq!(page.results[0].title, "title");

        let page = advanced(&session, &SearchQuery::Person("reeves".into()))
            .await
            .unwrap();
        assert_eq!(page.results[0].title, "person");

        let page = advanced(&session, &SearchQuery::GenreId(28)).await.unwrap();
        assert_eq!(page.results[0].title, "genre_id");
    }

    #[tokio::test]
    async fn genres_decode() {
        let url = start_backend().await;
        let all = genres(&session(&url)).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].tmdb_id, 28);
    }

    #[tokio::test]
    async fn by_genre_name_matches_case_insensitive_substring() {
        let url = start_backend().await;
        let session = session(&url);

        let page = by_genre_name(&session, "science").await.unwrap();
        assert!(page.is_some());

        let page = by_genre_name(&session, "western").await.unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn empty_terms_fail_fast() {
        let session = session("http://127.0.0.1:9");
        let result = advanced(&session, &SearchQuery::Title("  ".into())).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = by_genre_name(&session, "").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = advanced(&session, &SearchQuery::GenreId(0)).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
