//! Session-aware request client for the movie-tracking backend
//!
//! Wraps every outbound HTTP call to the backend: attaches the stored
//! bearer credential, detects 401, performs a single coordinated token
//! refresh, retries the original request once, and on irrecoverable
//! failure clears the session and broadcasts an invalidation event the
//! hosting application can react to (typically by navigating to login).
//!
//! Request flow:
//! 1. Caller issues a request through [`SessionClient`]
//! 2. The stored access credential (if any) is attached as a bearer header
//! 3. On 401, concurrent callers attach to one shared refresh operation
//! 4. On refresh success the original request is retried exactly once
//! 5. On refresh failure, credentials are cleared and
//!    [`SessionEvent::Invalidated`] is emitted exactly once

pub mod client;
pub mod constants;
pub mod error;
pub mod event;
pub mod store;
pub mod token;

pub use client::{ApiRequest, ApiResponse, SessionClient, SessionClientBuilder};
pub use constants::*;
pub use error::{Error, Result};
pub use event::SessionEvent;
pub use store::{CredentialPair, FileStore, MemoryStore, SessionStore};
pub use token::{RefreshResponse, TokenPair};

// Re-exported so downstream crates don't need a direct reqwest dependency
// just to name HTTP methods.
pub use reqwest::Method;
