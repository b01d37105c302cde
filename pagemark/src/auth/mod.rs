//! Authentication and authorization system.
//!
//! # Authentication
//!
//! Browser sessions are a pair of JWT cookies: a short-lived access token
//! checked on every request, and a long-lived refresh token accepted only by
//! the refresh endpoint. Sessions are created at login (password or OAuth)
//! and destroyed at logout by expiring the cookies.
//!
//! # Authorization
//!
//! All access decisions are made centrally by the [`gate`] module: a
//! middleware that resolves the session, classifies the request path against
//! statically declared page/API route tables, and either passes the request
//! through, redirects (pages), or short-circuits with a JSON error (API).
//! Admin handlers additionally take the [`current_user::AdminUser`] extractor
//! so a route wired outside the declared tables still refuses non-admins.
//!
//! # Modules
//!
//! - [`gate`]: the access control gate (route tables + middleware)
//! - [`session`]: session token creation/verification and cookie helpers
//! - [`current_user`]: extractor for the authenticated user in handlers
//! - [`password`]: Argon2 password hashing and verification
//! - [`oauth`]: OAuth initiation URLs and signed state tokens

pub mod current_user;
pub mod gate;
pub mod oauth;
pub mod password;
pub mod session;
