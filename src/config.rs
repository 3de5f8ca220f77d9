//! Line-based `key=value` config files.
//!
//! Two files live under the config directory: `geocaching.ini` for the
//! stored login and `lastpos.ini` for the last viewed map position.
//! The format is deliberately ad hoc: one `key=value` pair per line,
//! split on the first `=`, unknown keys ignored.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::paths::AppPaths;

/// Stored login file name
const AUTH_FILE: &str = "geocaching.ini";

/// Last map position file name
const POSITION_FILE: &str = "lastpos.ini";

/// Stored login. Plaintext on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Last viewed map position. Fields stay strings end to end; the map
/// widget consumes them verbatim and nothing here validates the numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPosition {
    pub lat: String,
    pub lon: String,
    pub zoom: String,
    pub gps_lock: String,
}

impl Default for MapPosition {
    /// Sydney at street level with GPS lock on.
    fn default() -> Self {
        Self {
            lat: "-33.86".to_string(),
            lon: "151.20".to_string(),
            zoom: "18".to_string(),
            gps_lock: "1".to_string(),
        }
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            config_dir: paths.config_dir.clone(),
        }
    }

    /// Raw contents of a named file under the config directory.
    pub fn read(&self, name: &str) -> Result<String, StoreError> {
        let path = self.config_dir.join(name);
        if !path.exists() {
            return Err(StoreError::NotFound { path });
        }
        Ok(std::fs::read_to_string(&path)?)
    }

    /// Like [`ConfigStore::read`], but any failure is logged and yields
    /// an empty string.
    pub fn read_or_default(&self, name: &str) -> String {
        match self.read(name) {
            Ok(contents) => contents,
            Err(err) if err.is_not_found() => {
                debug!(file = name, "config file not present");
                String::new()
            }
            Err(err) => {
                warn!(file = name, error = %err, "failed to read config file");
                String::new()
            }
        }
    }

    /// Write a named file, overwriting any existing content.
    pub fn write(&self, name: &str, contents: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.config_dir)?;
        let path = self.config_dir.join(name);
        std::fs::write(&path, contents)?;
        debug!(path = %path.display(), "wrote config file");
        Ok(())
    }

    /// Stored login, with empty fields for anything not configured.
    pub fn get_auth(&self) -> Credentials {
        let data = self.read_or_default(AUTH_FILE);
        let mut creds = Credentials::default();
        for (key, value) in parse_lines(&data) {
            match key {
                "username" => creds.username = value.to_string(),
                "password" => creds.password = value.to_string(),
                _ => {}
            }
        }
        creds
    }

    pub fn save_auth(&self, creds: &Credentials) -> Result<(), StoreError> {
        let contents = format!("username={}\npassword={}", creds.username, creds.password);
        self.write(AUTH_FILE, &contents)
    }

    /// Last viewed map position. An absent, empty or unreadable file
    /// yields the default; keys missing from an otherwise-present file
    /// keep their default values.
    pub fn get_position(&self) -> MapPosition {
        let data = self.read_or_default(POSITION_FILE);
        let mut pos = MapPosition::default();
        for (key, value) in parse_lines(&data) {
            match key {
                "lat" => pos.lat = value.to_string(),
                "lon" => pos.lon = value.to_string(),
                "zoom" => pos.zoom = value.to_string(),
                "gps_lock" => pos.gps_lock = value.to_string(),
                _ => {}
            }
        }
        pos
    }

    pub fn save_position(&self, pos: &MapPosition) -> Result<(), StoreError> {
        let contents = format!(
            "lat={}\nlon={}\nzoom={}\ngps_lock={}",
            pos.lat, pos.lon, pos.zoom, pos.gps_lock
        );
        self.write(POSITION_FILE, &contents)
    }
}

/// Split `key=value` lines on the first `=`; lines without one are
/// skipped, values may themselves contain `=`.
fn parse_lines(contents: &str) -> impl Iterator<Item = (&str, &str)> {
    contents.lines().filter_map(|line| line.split_once('='))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &std::path::Path) -> ConfigStore {
        ConfigStore::new(&AppPaths::with_dirs(dir, dir.join("cache")))
    }

    #[test]
    fn test_get_position_without_file_returns_default() {
        let tmp = tempfile::tempdir().unwrap();
        let pos = store_in(tmp.path()).get_position();
        assert_eq!(
            (
                pos.lat.as_str(),
                pos.lon.as_str(),
                pos.zoom.as_str(),
                pos.gps_lock.as_str()
            ),
            ("-33.86", "151.20", "18", "1")
        );
    }

    #[test]
    fn test_save_position_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let saved = MapPosition {
            lat: "51.4778".to_string(),
            lon: "-0.0014".to_string(),
            zoom: "15".to_string(),
            gps_lock: "0".to_string(),
        };
        store.save_position(&saved).unwrap();
        assert_eq!(store.get_position(), saved);
    }

    #[test]
    fn test_get_position_with_partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.write(POSITION_FILE, "lat=10.0\nlon=20.0").unwrap();

        let pos = store.get_position();
        assert_eq!(pos.lat, "10.0");
        assert_eq!(pos.lon, "20.0");
        assert_eq!(pos.zoom, "18");
        assert_eq!(pos.gps_lock, "1");
    }

    #[test]
    fn test_get_auth_without_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let creds = store_in(tmp.path()).get_auth();
        assert_eq!(creds, Credentials::default());
    }

    #[test]
    fn test_get_auth_parses_values_containing_equals() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store
            .write(AUTH_FILE, "username=alice\npassword=a=b=c\nignored line")
            .unwrap();

        let creds = store.get_auth();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "a=b=c");
    }

    #[test]
    fn test_save_auth_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let creds = Credentials {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        };
        store.save_auth(&creds).unwrap();
        assert_eq!(store.get_auth(), creds);
    }

    #[test]
    fn test_read_distinguishes_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());

        let err = store.read("missing.ini").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.read_or_default("missing.ini"), "");

        store.write("present.ini", "key=value").unwrap();
        assert_eq!(store.read("present.ini").unwrap(), "key=value");
    }
}
