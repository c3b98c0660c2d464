//! Token endpoint interactions
//!
//! Handles the three unauthenticated token flows:
//! 1. Login (`POST /api/token/`)
//! 2. Registration (`POST /api/register/`, tokens nested under `tokens`)
//! 3. Refresh (`POST /api/token/refresh/`)
//!
//! The refresh response may or may not rotate the refresh credential;
//! absence of a `refresh` field means "unchanged".

use serde::{Deserialize, Serialize};

use crate::constants::{REGISTER_PATH, TOKEN_PATH, TOKEN_REFRESH_PATH};
use crate::error::{Error, Result};

/// Access/refresh pair returned by the login endpoint (and nested inside
/// the registration response).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response from the refresh endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshResponse {
    pub access: String,
    /// Present only when the backend rotates the refresh credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RegisterResponse {
    tokens: TokenPair,
}

/// Exchange email/password for a token pair (login).
pub async fn obtain(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<TokenPair> {
    let response = client
        .post(endpoint(base_url, TOKEN_PATH))
        .json(&PasswordGrant { email, password })
        .send()
        .await
        .map_err(|e| Error::Network(format!("login request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = read_body(response).await;
        return Err(Error::Server {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<TokenPair>()
        .await
        .map_err(|e| Error::Decode(format!("invalid login response: {e}")))
}

/// Create an account and receive an initial token pair.
pub async fn register(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<TokenPair> {
    let response = client
        .post(endpoint(base_url, REGISTER_PATH))
        .json(&PasswordGrant { email, password })
        .send()
        .await
        .map_err(|e| Error::Network(format!("registration request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = read_body(response).await;
        return Err(Error::Server {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<RegisterResponse>()
        .await
        .map(|r| r.tokens)
        .map_err(|e| Error::Decode(format!("invalid registration response: {e}")))
}

/// Obtain a new access credential using a refresh credential.
///
/// Called only from the request pipeline's single-flight refresh step.
/// Any error here makes the refresh operation fail; the caller decides
/// what that means for the session.
pub async fn refresh(
    client: &reqwest::Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<RefreshResponse> {
    let response = client
        .post(endpoint(base_url, TOKEN_REFRESH_PATH))
        .json(&RefreshGrant {
            refresh: refresh_token,
        })
        .send()
        .await
        .map_err(|e| Error::Network(format!("refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = read_body(response).await;
        return Err(Error::Server {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<RefreshResponse>()
        .await
        .map_err(|e| Error::Decode(format!("invalid refresh response: {e}")))
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

async fn read_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<no body>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_deserializes() {
        let json = r#"{"access":"at_abc","refresh":"rt_def"}"#;
        let pair: TokenPair = serde_json::from_str(json).unwrap();
        assert_eq!(pair.access, "at_abc");
        assert_eq!(pair.refresh, "rt_def");
    }

    #[test]
    fn refresh_response_without_rotation() {
        let json = r#"{"access":"at_new"}"#;
        let resp: RefreshResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access, "at_new");
        assert!(resp.refresh.is_none());
    }

    #[test]
    fn refresh_response_with_rotation() {
        let json = r#"{"access":"at_new","refresh":"rt_new"}"#;
        let resp: RefreshResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.refresh.as_deref(), Some("rt_new"));
    }

    #[test]
    fn register_response_unwraps_nested_tokens() {
        let json = r#"{"tokens":{"access":"at_reg","refresh":"rt_reg"}}"#;
        let resp: RegisterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.tokens.access, "at_reg");
        assert_eq!(resp.tokens.refresh, "rt_reg");
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        assert_eq!(
            endpoint("http://127.0.0.1:8000/", TOKEN_PATH),
            "http://127.0.0.1:8000/api/token/"
        );
        assert_eq!(
            endpoint("http://127.0.0.1:8000", TOKEN_REFRESH_PATH),
            "http://127.0.0.1:8000/api/token/refresh/"
        );
    }

    #[tokio::test]
    async fn obtain_maps_unreachable_backend_to_network_error() {
        // Port 9 (discard) on localhost is not listening
        let client = reqwest::Client::new();
        let result = obtain(&client, "http://127.0.0.1:9", "a@b.c", "pw").await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
