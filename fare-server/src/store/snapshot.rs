//! JSON snapshot file for routes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::BusRoute;

use super::error::StoreError;

/// Snapshot contents as read back from disk.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    saved_at: DateTime<Utc>,
    routes: Vec<BusRoute>,
}

/// Snapshot contents as written, borrowing the routes.
#[derive(Serialize)]
struct SnapshotFileRef<'a> {
    saved_at: DateTime<Utc>,
    routes: Vec<&'a BusRoute>,
}

/// A JSON file holding every route.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// snapshot, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load routes from the snapshot.
    ///
    /// A missing file is an empty store. An unreadable or invalid file is an
    /// error, so a corrupt snapshot is never silently replaced.
    pub fn load(&self) -> Result<Vec<BusRoute>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let file: SnapshotFile =
            serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            path = %self.path.display(),
            saved_at = %file.saved_at,
            routes = file.routes.len(),
            "snapshot loaded"
        );
        Ok(file.routes)
    }

    /// Write every route to the snapshot.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<'a>(&self, routes: impl IntoIterator<Item = &'a BusRoute>) -> Result<(), StoreError> {
        let file = SnapshotFileRef {
            saved_at: Utc::now(),
            routes: routes.into_iter().collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            if let Err(e) = std::fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %e, "could not remove temporary snapshot");
            }
            return Err(self.io_error(source));
        }

        debug!(path = %self.path.display(), routes = file.routes.len(), "snapshot saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BusType, StopSequence};
    use tempfile::tempdir;

    fn sample_route() -> BusRoute {
        let mut route = BusRoute::new("2", "Colombo - Galle", vec![BusType::Normal]).unwrap();
        route
            .replace_stops(
                BusType::Normal,
                StopSequence::new(["Colombo", "Panadura", "Galle"]).unwrap(),
            )
            .unwrap();
        route
            .replace_fares(BusType::Normal, vec![80.0, 300.0, 240.0])
            .unwrap();
        route
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let snapshot = Snapshot::new(dir.path().join("routes.json"));
        let route = sample_route();

        snapshot.save([&route]).unwrap();
        let loaded = snapshot.load().unwrap();

        assert_eq!(loaded, vec![route]);
        assert!(!snapshot.tmp_path().exists());
    }

    #[test]
    fn missing_snapshot_is_empty() {
        let dir = tempdir().unwrap();
        let snapshot = Snapshot::new(dir.path().join("absent.json"));
        assert!(snapshot.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Snapshot::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn invalid_route_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");
        let snapshot = Snapshot::new(&path);
        snapshot.save([&sample_route()]).unwrap();

        // Break the size invariant by hand
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&contents).unwrap();
        json["routes"][0]["fareMatrix"]["NORMAL"] = serde_json::json!([1.0]);
        std::fs::write(&path, json.to_string()).unwrap();

        assert!(matches!(snapshot.load(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("routes.json");
        Snapshot::new(&path).save([&sample_route()]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        // A non-empty directory at the snapshot path makes the rename fail.
        let path = dir.path().join("routes.json");
        std::fs::create_dir_all(path.join("blocker")).unwrap();
        let snapshot = Snapshot::new(&path);

        assert!(matches!(
            snapshot.save([&sample_route()]),
            Err(StoreError::Io { .. })
        ));
        assert!(!snapshot.tmp_path().exists());
        assert!(path.join("blocker").is_dir());
    }

    #[test]
    fn tmp_path_is_a_sibling() {
        let snapshot = Snapshot::new("data/routes.json");
        assert_eq!(snapshot.tmp_path(), PathBuf::from("data/routes.json.tmp"));
    }
}
