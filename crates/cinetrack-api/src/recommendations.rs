//! Personalized recommendations (computed server-side)

use cinetrack_session::{Result, SessionClient};

use crate::models::{Movie, Page};

/// Recommendations for the authenticated user.
pub async fn list(session: &SessionClient) -> Result<Page<Movie>> {
    session.get("/api/recommendations/").await?.json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::routing::get;
    use serde_json::json;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn list_decodes_page() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route(
            "/api/recommendations/",
            get(|| async { Json(json!({"results": [{"tmdb_id": 13, "title": "Forrest Gump"}]})) }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let session = SessionClient::builder()
            .base_url(format!("http://{addr}"))
            .build()
            .unwrap();
        let page = list(&session).await.unwrap();
        assert_eq!(page.results[0].title, "Forrest Gump");
    }
}
