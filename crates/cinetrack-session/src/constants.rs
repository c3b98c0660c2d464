//! Backend endpoint paths and credential storage keys
//!
//! The storage keys are fixed: the backend's web client persisted tokens
//! under these exact names, and the file store keeps them for
//! compatibility. Divergent historical copies used `access`/`refresh`;
//! the camel-cased names are canonical.

/// Storage key for the short-lived access credential.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key for the longer-lived refresh credential.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Login endpoint: `{email, password}` -> `{access, refresh}`.
pub const TOKEN_PATH: &str = "/api/token/";

/// Refresh endpoint: `{refresh}` -> `{access}` (refresh may rotate).
pub const TOKEN_REFRESH_PATH: &str = "/api/token/refresh/";

/// Registration endpoint: `{email, password}` -> `{tokens: {access, refresh}}`.
pub const REGISTER_PATH: &str = "/api/register/";

/// Default backend base URL (local development server).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
