//! Session-aware request client
//!
//! All backend calls go through [`SessionClient::send`], which attaches
//! the stored access credential, detects 401, coordinates a single
//! in-flight refresh shared by every concurrent caller, and retries the
//! original request exactly once with the refreshed credential.
//!
//! Concurrency model: the refresh operation is a memoized
//! [`Shared`] future. The first 401 of a cycle creates it, later 401s
//! attach to it, and whoever observes it settle clears the slot so the
//! next cycle starts fresh. At most one refresh call is ever in flight.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::constants::{ACCESS_TOKEN_KEY, DEFAULT_BASE_URL, REFRESH_TOKEN_KEY};
use crate::error::{Error, Result};
use crate::event::{SessionEvent, SessionEvents};
use crate::store::{CredentialPair, MemoryStore, SessionStore, read_credentials, write_credentials};
use crate::token;

type RefreshFuture = Shared<BoxFuture<'static, Result<String>>>;

/// Description of an outbound call: method, path relative to the base
/// URL, optional query/header extras, and an optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body. Serialization failure is a caller bug and is
    /// rejected before dispatch.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::Validation(format!("unserializable request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// A decoded backend response: status code plus raw body bytes.
///
/// Only returned for non-401 success statuses; everything else surfaces
/// as a typed [`Error`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::Decode(format!("invalid response body: {e}")))
    }
}

/// Builder for [`SessionClient`].
pub struct SessionClientBuilder {
    base_url: String,
    timeout: Duration,
    store: Option<Arc<dyn SessionStore>>,
    http: Option<reqwest::Client>,
}

impl SessionClientBuilder {
    /// Backend base URL. Must carry an http(s) scheme.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout for the underlying HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Credential storage. Defaults to an in-memory store.
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Bring your own reqwest client (ignores `timeout`).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> Result<SessionClient> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::Network(format!("building http client: {e}")))?,
        };

        Ok(SessionClient {
            inner: Arc::new(Inner {
                http,
                base_url: self.base_url.trim_end_matches('/').to_string(),
                store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
                events: SessionEvents::new(),
                refresh: Mutex::new(None),
                invalidate_gate: tokio::sync::Mutex::new(()),
            }),
        })
    }
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    events: SessionEvents,
    /// The singleton in-flight refresh operation. `Some` only while a
    /// refresh cycle is active; cleared once settled.
    refresh: Mutex<Option<RefreshFuture>>,
    /// Serializes clear-and-emit during invalidation so concurrent
    /// rejected retries produce at most one `Invalidated` event.
    invalidate_gate: tokio::sync::Mutex<()>,
}

/// Session-aware HTTP client over the movie backend.
///
/// Cheap to clone; all clones share credentials, the HTTP connection
/// pool, and the single-flight refresh slot.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<Inner>,
}

impl SessionClient {
    pub fn builder() -> SessionClientBuilder {
        SessionClientBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            store: None,
            http: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Subscribe to session lifecycle events. The hosting application
    /// uses this to navigate to the login view on invalidation.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Whether a full credential pair is currently stored. A lone
    /// access credential without its refresh counterpart cannot survive
    /// expiry, so it does not count as an authenticated session.
    pub async fn is_authenticated(&self) -> bool {
        read_credentials(self.inner.store.as_ref()).await.is_some()
    }

    /// Log in with email/password and store the returned credential pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let pair = token::obtain(&self.inner.http, &self.inner.base_url, email, password).await?;
        write_credentials(
            self.inner.store.as_ref(),
            &CredentialPair {
                access: pair.access,
                refresh: pair.refresh,
            },
        )
        .await?;
        info!("login succeeded, credentials stored");
        Ok(())
    }

    /// Register a new account and store the returned credential pair.
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        let pair = token::register(&self.inner.http, &self.inner.base_url, email, password).await?;
        write_credentials(
            self.inner.store.as_ref(),
            &CredentialPair {
                access: pair.access,
                refresh: pair.refresh,
            },
        )
        .await?;
        info!("registration succeeded, credentials stored");
        Ok(())
    }

    /// Clear stored credentials. The session becomes Anonymous.
    pub async fn logout(&self) -> Result<()> {
        self.inner.store.clear().await?;
        debug!("logged out, credentials cleared");
        Ok(())
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::POST, path).json(body)?).await
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::PUT, path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    /// Dispatch a request through the full auth pipeline.
    ///
    /// 1. Attach the stored access credential, if any (public endpoints
    ///    dispatch unauthenticated).
    /// 2. On 401, run or join the single-flight refresh, then retry the
    ///    original request once with the new credential.
    /// 3. A 401 on the retry is terminal: credentials are cleared and
    ///    [`Error::AuthUnrecoverable`] is returned without another
    ///    refresh cycle.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        if request.path.is_empty() || !request.path.starts_with('/') {
            return Err(Error::Validation(format!(
                "path must start with '/', got: {:?}",
                request.path
            )));
        }

        let access = self.inner.store.get(ACCESS_TOKEN_KEY).await;
        let response = self.dispatch(&request, access.as_deref()).await?;
        if response.status != 401 {
            return settle(response);
        }

        debug!(path = %request.path, "received 401, entering refresh cycle");
        let new_access = self.refresh_access().await?;

        let retry = self.dispatch(&request, Some(&new_access)).await?;
        if retry.status == 401 {
            warn!(path = %request.path, "refreshed credential rejected, session is unrecoverable");
            self.invalidate_once().await;
            return Err(Error::AuthUnrecoverable(
                "refreshed credential rejected by backend".into(),
            ));
        }
        settle(retry)
    }

    /// Perform the raw HTTP exchange, without any 401 handling.
    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse> {
        let url = format!("{}{}", self.inner.base_url, request.path);
        let mut builder = self.inner.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("request to {url} failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("reading response from {url} failed: {e}")))?;

        Ok(ApiResponse { status, body })
    }

    /// Run or join the single-flight refresh operation and return the new
    /// access credential.
    async fn refresh_access(&self) -> Result<String> {
        let fut = {
            let mut slot = self.inner.refresh.lock().expect("refresh slot poisoned");
            match slot.as_ref() {
                Some(fut) => {
                    debug!("refresh already in flight, attaching");
                    fut.clone()
                }
                None => {
                    let inner = self.inner.clone();
                    let fut: RefreshFuture = run_refresh(inner).boxed().shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        let outcome = fut.clone().await;

        // Clear the memoized future once settled so the next 401
        // generation starts a fresh cycle.
        let mut slot = self.inner.refresh.lock().expect("refresh slot poisoned");
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&fut)) {
            *slot = None;
        }

        outcome
    }

    /// Clear credentials and emit `Invalidated` at most once for the
    /// credential generation that just failed. When several waiters of
    /// the same refresh all see their retry rejected, they race here;
    /// only the caller that still finds credentials stored emits.
    async fn invalidate_once(&self) {
        let _gate = self.inner.invalidate_gate.lock().await;
        let had_credentials = self.inner.store.get(ACCESS_TOKEN_KEY).await.is_some()
            || self.inner.store.get(REFRESH_TOKEN_KEY).await.is_some();
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "failed to clear credential store during invalidation");
        }
        if had_credentials {
            self.inner.events.emit(SessionEvent::Invalidated);
        }
    }
}

/// The body of the singleton refresh operation. Runs at most once per
/// 401 generation regardless of how many requests hit 401 concurrently.
async fn run_refresh(inner: Arc<Inner>) -> Result<String> {
    let Some(refresh_token) = inner.store.get(REFRESH_TOKEN_KEY).await else {
        warn!("401 with no stored refresh credential, session is unrecoverable");
        invalidate_inner(&inner).await;
        return Err(Error::AuthUnrecoverable(
            "no refresh credential stored".into(),
        ));
    };

    match token::refresh(&inner.http, &inner.base_url, &refresh_token).await {
        Ok(refreshed) => {
            inner.store.set(ACCESS_TOKEN_KEY, &refreshed.access).await?;
            if let Some(rotated) = &refreshed.refresh {
                inner.store.set(REFRESH_TOKEN_KEY, rotated).await?;
            }
            info!(rotated = refreshed.refresh.is_some(), "credential refresh succeeded");
            Ok(refreshed.access)
        }
        Err(e) => {
            warn!(error = %e, "credential refresh failed, clearing session");
            invalidate_inner(&inner).await;
            Err(Error::AuthUnrecoverable(format!(
                "credential refresh failed: {e}"
            )))
        }
    }
}

async fn invalidate_inner(inner: &Inner) {
    if let Err(e) = inner.store.clear().await {
        warn!(error = %e, "failed to clear credential store during invalidation");
    }
    inner.events.emit(SessionEvent::Invalidated);
}

fn settle(response: ApiResponse) -> Result<ApiResponse> {
    if (200..300).contains(&response.status) {
        Ok(response)
    } else {
        Err(Error::Server {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        })
    }
}
