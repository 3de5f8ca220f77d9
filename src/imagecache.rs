//! Local disk cache for remotely-fetched images.
//!
//! Images are keyed by the basename of their source URL with query and
//! fragment stripped, so `/images/foo.png?x=1` lands in the cache
//! directory as `foo.png`. A file that exists is served as-is; there is
//! no eviction, no expiry and no de-duplication of concurrent downloads.

use std::borrow::Cow;
use std::fs::File;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::paths::AppPaths;
use crate::session::Session;

/// Site-relative image paths are resolved against this base.
const SITE_BASE_URL: &str = "https://www.geocaching.com";

/// Reference handed back for anything that could not be cached.
pub const NOT_FOUND_PLACEHOLDER: &str = "../assets/notfound.svg";

pub struct ImageCache {
    cache_dir: PathBuf,
}

impl ImageCache {
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            cache_dir: paths.cache_dir.clone(),
        }
    }

    /// Resolve `url` to a `file://` reference, downloading on miss.
    ///
    /// Local references and the not-found placeholder pass through
    /// unchanged. Any failure is logged and yields the placeholder.
    pub fn cache_image(&self, url: &str, session: &Session) -> String {
        if url.starts_with("file://") || url.starts_with(NOT_FOUND_PLACEHOLDER) {
            return url.to_string();
        }

        match self.fetch(url, session) {
            Ok(path) => format!("file://{}", path.display()),
            Err(err) => {
                warn!(url, error = %err, "could not cache image");
                NOT_FOUND_PLACEHOLDER.to_string()
            }
        }
    }

    /// Typed variant of [`ImageCache::cache_image`]: returns the local
    /// path, downloading the image if it is not already cached.
    pub fn fetch(&self, url: &str, session: &Session) -> Result<PathBuf, StoreError> {
        let url = absolutize(url);
        let name = local_name(&url).ok_or_else(|| StoreError::InvalidUrl(url.to_string()))?;
        let path = self.cache_dir.join(name);

        if path.exists() {
            debug!(url = %url, path = %path.display(), "image already cached");
            return Ok(path);
        }

        std::fs::create_dir_all(&self.cache_dir)?;
        debug!(url = %url, path = %path.display(), "downloading image");

        let mut response = session.get(&url)?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(StoreError::HttpStatus(status));
        }

        let mut file = File::create(&path)?;
        if let Err(err) = response.copy_to(&mut file) {
            // Keep the "file exists implies fully downloaded" invariant
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(err.into());
        }
        Ok(path)
    }
}

/// Prefix site-relative image paths with the fixed site base.
fn absolutize(url: &str) -> Cow<'_, str> {
    if url.starts_with("/images/") {
        Cow::Owned(format!("{}{}", SITE_BASE_URL, url))
    } else {
        Cow::Borrowed(url)
    }
}

/// URL basename with query and fragment stripped, or `None` when that
/// leaves nothing usable (e.g. a URL ending in `/`).
fn local_name(url: &str) -> Option<&str> {
    // Strip query and fragment first so a `/` inside either cannot
    // leak into the basename.
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let base = path.rsplit('/').next().unwrap_or(path).trim();
    if base.is_empty() {
        None
    } else {
        Some(base)
    }
}
