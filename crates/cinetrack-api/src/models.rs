//! Wire models for backend responses
//!
//! Field names mirror the backend's JSON exactly. Most fields are
//! optional because listing endpoints return sparse movie objects while
//! the detail endpoint fills everything in.

use serde::{Deserialize, Serialize};

/// A movie as returned by listing, detail, and search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub tmdb_id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Present only on the detail endpoint, and only when the
    /// authenticated user has rated this movie.
    #[serde(default)]
    pub user_rating: Option<f64>,
}

/// Paged listing wrapper: `{"results": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// One entry of the user's personal collection.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionEntry {
    pub id: u64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub movie_details: Option<Movie>,
}

/// A genre as returned by `/api/genres/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub tmdb_id: u64,
    pub name: String,
}

/// A trailer or clip attached to a movie.
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Response to a rating submission.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingResponse {
    pub rating: f64,
}

/// Body for rating a movie.
#[derive(Debug, Serialize)]
pub(crate) struct RateRequest {
    pub rating: u8,
}

/// Body for adding a movie to the collection. The backend expects both
/// fields present even when empty.
#[derive(Debug, Serialize)]
pub(crate) struct AddEntryRequest {
    pub rating: Option<f64>,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_listing_movie_decodes() {
        let json = r#"{"tmdb_id": 550, "title": "Fight Club"}"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.tmdb_id, 550);
        assert!(movie.poster_path.is_none());
        assert!(movie.user_rating.is_none());
    }

    #[test]
    fn detail_movie_decodes_with_user_rating() {
        let json = r#"{
            "tmdb_id": 550,
            "title": "Fight Club",
            "overview": "An insomniac office worker...",
            "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
            "release_date": "1999-10-15",
            "vote_average": 8.4,
            "user_rating": 5
        }"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.user_rating, Some(5.0));
        assert_eq!(movie.vote_average, Some(8.4));
    }

    #[test]
    fn page_defaults_to_empty_results() {
        let page: Page<Movie> = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn collection_entry_decodes_nested_movie_details() {
        let json = r#"{
            "id": 7,
            "rating": 4,
            "notes": "",
            "movie_details": {
                "tmdb_id": 603,
                "title": "The Matrix",
                "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
                "release_date": "1999-03-30"
            }
        }"#;
        let entry: CollectionEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.rating, Some(4.0));
        assert_eq!(entry.movie_details.unwrap().tmdb_id, 603);
    }

    #[test]
    fn genre_decodes() {
        let json = r#"{"tmdb_id": 28, "name": "Action"}"#;
        let genre: Genre = serde_json::from_str(json).unwrap();
        assert_eq!(genre.name, "Action");
    }

    #[test]
    fn video_type_field_maps_to_kind() {
        let json = r#"{"key": "SUXWAEX2jlg", "site": "YouTube", "type": "Trailer"}"#;
        let video: Video = serde_json::from_str(json).unwrap();
        assert_eq!(video.kind.as_deref(), Some("Trailer"));
    }

    #[test]
    fn add_entry_request_serializes_null_rating() {
        let body = AddEntryRequest {
            rating: None,
            notes: String::new(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"rating":null,"notes":""}"#);
    }
}
