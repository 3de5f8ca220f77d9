//! Persistence layer for a desktop geocaching application.
//!
//! This crate is the glue between the app and the user's disk:
//! - `paths`: per-user config/cache directory resolution
//! - `session`: HTTP session (cookies + fixed headers) persisted across runs
//! - `config`: line-based `key=value` files for login and map position
//! - `imagecache`: local files for remotely-fetched images, downloaded on miss
//!
//! Everything is synchronous blocking I/O. Failures that the app treats
//! as recoverable (missing or corrupt files, failed downloads) degrade
//! to defaults and are logged via `tracing`; the typed variants on each
//! store expose the distinction for callers that care.

pub mod config;
pub mod error;
pub mod imagecache;
pub mod paths;
pub mod session;

pub use config::{ConfigStore, Credentials, MapPosition};
pub use error::StoreError;
pub use imagecache::ImageCache;
pub use paths::AppPaths;
pub use session::{Session, SessionData, SessionStore, StoredCookie};
