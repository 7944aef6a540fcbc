//! HTTP middleware components.
//!
//! Middleware run before route handlers; authentication resolves the API
//! key, meters the quota window, and can short-circuit the request.

/// API key authentication and quota middleware
pub mod auth;
