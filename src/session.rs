//! HTTP session persistence.
//!
//! The session is the browser-like HTTP client the app logs in with.
//! Its cookie state survives application runs as an explicit, versioned
//! JSON record rather than an opaque serialized client, so a format
//! change degrades to a fresh session instead of undefined behavior.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::blocking::{Client, Response};
use reqwest::cookie::Jar;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::paths::AppPaths;

/// Session file name in the config directory
const SESSION_FILE: &str = "session.json";

/// On-disk format version; bump when `SessionData` changes shape.
pub const FORMAT_VERSION: u32 = 1;

/// Fixed browser-like User-Agent sent with every request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub domain: String,
    pub path: String,
    pub name: String,
    pub value: String,
}

/// What actually lands on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub format_version: u32,
    pub cookies: Vec<StoredCookie>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            cookies: Vec::new(),
        }
    }
}

/// A live HTTP session: a blocking client with the fixed headers plus
/// the cookie state that gets persisted.
#[derive(Debug)]
pub struct Session {
    client: Client,
    jar: Arc<Jar>,
    data: SessionData,
}

impl Session {
    /// Fresh session with the fixed headers and no cookies.
    pub fn fresh() -> Result<Self, StoreError> {
        Self::from_data(SessionData::default())
    }

    fn from_data(data: SessionData) -> Result<Self, StoreError> {
        let jar = Arc::new(Jar::default());
        for cookie in &data.cookies {
            add_to_jar(&jar, cookie);
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(jar.clone())
            .build()?;
        Ok(Self { client, jar, data })
    }

    /// Blocking GET through the session client.
    pub fn get(&self, url: &str) -> Result<Response, StoreError> {
        Ok(self.client.get(url).send()?)
    }

    /// Record a cookie in both the live jar and the persisted state,
    /// replacing any stored cookie with the same domain/path/name.
    /// The app calls this after a successful login.
    pub fn store_cookie(&mut self, domain: &str, path: &str, name: &str, value: &str) {
        let cookie = StoredCookie {
            domain: domain.to_string(),
            path: path.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        };
        self.data.cookies.retain(|c| {
            !(c.domain == cookie.domain && c.path == cookie.path && c.name == cookie.name)
        });
        add_to_jar(&self.jar, &cookie);
        self.data.cookies.push(cookie);
    }

    /// Stored value for a cookie by name, if any.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.data
            .cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.data.cookies.is_empty()
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }
}

/// Replay a stored cookie into a live jar.
fn add_to_jar(jar: &Jar, cookie: &StoredCookie) {
    let origin = format!("https://{}/", cookie.domain.trim_start_matches('.'));
    if let Ok(url) = origin.parse::<Url>() {
        jar.add_cookie_str(
            &format!(
                "{}={}; Domain={}; Path={}",
                cookie.name, cookie.value, cookie.domain, cookie.path
            ),
            &url,
        );
    }
}

pub struct SessionStore {
    config_dir: PathBuf,
}

impl SessionStore {
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            config_dir: paths.config_dir.clone(),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.config_dir.join(SESSION_FILE)
    }

    /// Typed load: a missing file, a corrupt file and a file from an
    /// incompatible format version are distinct errors.
    pub fn try_load(&self) -> Result<Session, StoreError> {
        let path = self.session_path();
        if !path.exists() {
            return Err(StoreError::NotFound { path });
        }
        let contents = std::fs::read_to_string(&path)?;
        let data: SessionData = serde_json::from_str(&contents).map_err(|source| {
            StoreError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        if data.format_version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: data.format_version,
                expected: FORMAT_VERSION,
            });
        }
        Session::from_data(data)
    }

    /// Load the previous session, falling back to a fresh one when the
    /// file is missing, corrupt or from an incompatible version. Losing
    /// a saved session is never fatal; the only hard error here is
    /// failing to build the HTTP client itself.
    pub fn load(&self) -> Result<Session, StoreError> {
        match self.try_load() {
            Ok(session) => {
                debug!(path = %self.session_path().display(), "session reloaded");
                Ok(session)
            }
            Err(err) if err.is_not_found() => {
                debug!("no saved session, starting fresh");
                Session::fresh()
            }
            Err(err) => {
                warn!(error = %err, "failed to load saved session, starting fresh");
                Session::fresh()
            }
        }
    }

    /// Save the session's cookie state, overwriting any previous file.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.config_dir)?;
        let contents = serde_json::to_string_pretty(session.data())?;
        std::fs::write(self.session_path(), contents)?;
        debug!(path = %self.session_path().display(), "session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &std::path::Path) -> SessionStore {
        SessionStore::new(&AppPaths::with_dirs(dir, dir.join("cache")))
    }

    #[test]
    fn test_load_without_file_yields_fresh_session() {
        let tmp = tempfile::tempdir().unwrap();
        let session = store_in(tmp.path()).load().unwrap();
        assert!(session.is_empty());
        assert_eq!(session.data().format_version, FORMAT_VERSION);
    }

    #[test]
    fn test_save_then_load_round_trips_cookies() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());

        let mut session = Session::fresh().unwrap();
        session.store_cookie(".geocaching.com", "/", "gspkauth", "abc123");
        store.save(&session).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.cookie("gspkauth"), Some("abc123"));
        assert_eq!(reloaded.data().cookies, session.data().cookies);
    }

    #[test]
    fn test_store_cookie_replaces_same_name() {
        let mut session = Session::fresh().unwrap();
        session.store_cookie(".geocaching.com", "/", "gspkauth", "old");
        session.store_cookie(".geocaching.com", "/", "gspkauth", "new");
        assert_eq!(session.data().cookies.len(), 1);
        assert_eq!(session.cookie("gspkauth"), Some("new"));
    }

    #[test]
    fn test_corrupt_file_is_distinguished_but_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        std::fs::write(tmp.path().join(SESSION_FILE), "not json at all").unwrap();

        let err = store.try_load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        let session = store.load().unwrap();
        assert!(session.is_empty());
    }

    #[test]
    fn test_future_format_version_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        std::fs::write(
            tmp.path().join(SESSION_FILE),
            r#"{"format_version": 99, "cookies": []}"#,
        )
        .unwrap();

        let err = store.try_load().unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion { found: 99, .. }
        ));
    }
}
