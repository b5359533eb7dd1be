//! Async client for the Crucible Player, VM, and Caster REST APIs.
//!
//! - **[`ApiClient`]** issues authenticated JSON requests. Every request
//!   carries a bearer token from the shared [`TokenCache`]; a 401 invalidates
//!   the token and the request is retried exactly once.
//! - **[`TokenCache`]** performs the OAuth2 password grant and caches the
//!   token behind a read/write lock.
//! - Endpoint wrappers live in [`player`], [`vm`], and [`caster`] as
//!   `impl ApiClient` blocks, with their wire types alongside.

pub mod auth;
pub mod caster;
pub mod client;
pub mod error;
pub mod player;
pub mod transport;
pub mod vm;

pub use auth::{AccessToken, Credentials, TokenCache};
pub use client::{ApiClient, ApiEndpoints, Service, extract_error_message, normalize_api_url};
pub use error::Error;
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
