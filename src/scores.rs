use crate::consts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level key the score data is stored under, both on disk and in the
/// export/import document.
pub(crate) const STORE_KEY: &str = "nodsnake";

/// One finished run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct ScoreRecord {
    pub(crate) score: u32,
    pub(crate) time: DateTime<Utc>,
}

/// Everything persisted under [`STORE_KEY`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ScoreData {
    pub(crate) high_score: u32,
    /// Past results, oldest first, at most [`consts::HISTORY_CAP`] of them.
    pub(crate) history: Vec<ScoreRecord>,
}

/// The full persisted document: the data nested under the application key.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct ScoreDocument {
    #[serde(rename = "nodsnake")]
    pub(crate) data: ScoreData,
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("failed to determine path to local data directory")]
    NoPath,
    #[error("failed to create parent directories")]
    Mkdir(#[source] std::io::Error),
    #[error("failed to write score data")]
    Write(#[source] std::io::Error),
    #[error("failed to remove score data")]
    Remove(#[source] std::io::Error),
    #[error("failed to serialize score data")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub(crate) enum ImportError {
    #[error("document has no {STORE_KEY:?} object at the top level")]
    Shape,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where score data lives.
///
/// Reads are best-effort: `None` means "nothing usable here", and the
/// store falls back to empty defaults.  Only writes report errors.
pub(crate) trait ScoreBackend: std::fmt::Debug {
    fn read(&self) -> Option<String>;
    fn write(&mut self, raw: &str) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

impl<B: ScoreBackend + ?Sized> ScoreBackend for Box<B> {
    fn read(&self) -> Option<String> {
        (**self).read()
    }

    fn write(&mut self, raw: &str) -> Result<(), StoreError> {
        (**self).write(raw)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Score data in a JSON file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub(crate) fn new(path: PathBuf) -> FileBackend {
        FileBackend { path }
    }

    /// The standard location of the score file.
    pub(crate) fn default_path() -> Result<PathBuf, StoreError> {
        dirs::data_local_dir()
            .map(|p| p.join("nodsnake").join("scores.json"))
            .ok_or(StoreError::NoPath)
    }
}

impl ScoreBackend for FileBackend {
    fn read(&self) -> Option<String> {
        fs_err::read_to_string(&self.path).ok()
    }

    fn write(&mut self, raw: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent).map_err(StoreError::Mkdir)?;
        }
        fs_err::write(&self.path, raw).map_err(StoreError::Write)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs_err::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Remove(e)),
        }
    }
}

/// In-memory stand-in used when no data directory is available.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct MemoryBackend {
    raw: Option<String>,
}

impl ScoreBackend for MemoryBackend {
    fn read(&self) -> Option<String> {
        self.raw.clone()
    }

    fn write(&mut self, raw: &str) -> Result<(), StoreError> {
        self.raw = Some(raw.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.raw = None;
        Ok(())
    }
}

/// High score and run history, persisted through a [`ScoreBackend`].
///
/// Unreadable or corrupt stored data is treated as empty defaults and
/// never reported; failures to *write* are returned to the caller, once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ScoreStore<B> {
    backend: B,
}

impl ScoreStore<Box<dyn ScoreBackend>> {
    /// Store scores at `path` when given, otherwise at the standard
    /// location, falling back to an in-memory store when no data directory
    /// can be determined.
    pub(crate) fn open(path: Option<PathBuf>) -> ScoreStore<Box<dyn ScoreBackend>> {
        let backend: Box<dyn ScoreBackend> = match path.map_or_else(FileBackend::default_path, Ok)
        {
            Ok(path) => Box::new(FileBackend::new(path)),
            Err(_) => Box::new(MemoryBackend::default()),
        };
        ScoreStore::new(backend)
    }
}

impl<B: ScoreBackend> ScoreStore<B> {
    pub(crate) fn new(backend: B) -> ScoreStore<B> {
        ScoreStore { backend }
    }

    fn read(&self) -> ScoreData {
        let Some(raw) = self.backend.read() else {
            return ScoreData::default();
        };
        serde_json::from_str::<ScoreDocument>(&raw)
            .map(|doc| doc.data)
            .unwrap_or_default()
    }

    fn write(&mut self, data: ScoreData) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string(&ScoreDocument { data }).map_err(StoreError::Serialize)?;
        self.backend.write(&raw)
    }

    pub(crate) fn high_score(&self) -> u32 {
        self.read().high_score
    }

    /// Raise the stored high score if `score` strictly beats it.  Returns
    /// whether an update happened.
    pub(crate) fn maybe_set_high_score(&mut self, score: u32) -> Result<bool, StoreError> {
        let mut data = self.read();
        if score <= data.high_score {
            return Ok(false);
        }
        data.high_score = score;
        self.write(data)?;
        Ok(true)
    }

    /// Past results, oldest first.
    pub(crate) fn history(&self) -> Vec<ScoreRecord> {
        self.read().history
    }

    /// Append a result stamped with the current time, evicting the oldest
    /// entries beyond the cap.
    pub(crate) fn push_history(&mut self, score: u32) -> Result<(), StoreError> {
        self.record(score, Utc::now())
    }

    fn record(&mut self, score: u32, time: DateTime<Utc>) -> Result<(), StoreError> {
        let mut data = self.read();
        data.history.push(ScoreRecord { score, time });
        if data.history.len() > consts::HISTORY_CAP {
            let excess = data.history.len() - consts::HISTORY_CAP;
            data.history.drain(..excess);
        }
        self.write(data)
    }

    /// The full persisted document, ready for serialization.
    pub(crate) fn export(&self) -> ScoreDocument {
        ScoreDocument { data: self.read() }
    }

    /// Replace the stored data with `json`, which must carry a
    /// [`STORE_KEY`] object at the top level.  Field values inside it are
    /// coerced leniently; a bad root shape is an error and leaves the
    /// stored data untouched.
    pub(crate) fn import(&mut self, json: &Value) -> Result<(), ImportError> {
        let nested = json
            .get(STORE_KEY)
            .and_then(Value::as_object)
            .ok_or(ImportError::Shape)?;
        let high_score = nested
            .get("highScore")
            .and_then(Value::as_u64)
            .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX));
        let history = nested
            .get("history")
            .and_then(Value::as_array)
            .map_or_else(Vec::new, |entries| {
                entries
                    .iter()
                    .take(consts::HISTORY_CAP)
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            });
        self.write(ScoreData {
            high_score,
            history,
        })?;
        Ok(())
    }

    /// Drop all persisted data for this application.
    pub(crate) fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn store() -> ScoreStore<MemoryBackend> {
        ScoreStore::new(MemoryBackend::default())
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn empty_store_defaults() {
        let store = store();
        assert_eq!(store.high_score(), 0);
        assert_eq!(store.history(), vec![]);
    }

    #[test]
    fn corrupt_data_reads_as_defaults() {
        let mut store = store();
        store.backend.raw = Some("{not json".to_owned());
        assert_eq!(store.high_score(), 0);
        assert_eq!(store.history(), vec![]);
    }

    #[test]
    fn high_score_only_moves_up() {
        let mut store = store();
        assert!(store.maybe_set_high_score(5).unwrap());
        assert!(!store.maybe_set_high_score(3).unwrap());
        assert_eq!(store.high_score(), 5);
        assert!(!store.maybe_set_high_score(5).unwrap());
        assert!(store.maybe_set_high_score(9).unwrap());
        assert_eq!(store.high_score(), 9);
    }

    #[test]
    fn history_is_ordered_oldest_first() {
        let mut store = store();
        store.record(10, at(100)).unwrap();
        store.record(20, at(200)).unwrap();
        let scores = store.history().iter().map(|r| r.score).collect::<Vec<_>>();
        assert_eq!(scores, vec![10, 20]);
    }

    #[test]
    fn history_evicts_oldest_beyond_the_cap() {
        let mut store = store();
        for i in 1..=201 {
            store.record(i, at(i64::from(i))).unwrap();
        }
        let history = store.history();
        assert_eq!(history.len(), 200);
        assert_eq!(history[0].score, 2);
        assert_eq!(history[199].score, 201);
    }

    #[test]
    fn import_rejects_a_missing_top_level_object() {
        let mut store = store();
        store.maybe_set_high_score(7).unwrap();
        for json in [
            serde_json::json!({}),
            serde_json::json!([1, 2, 3]),
            serde_json::json!({"nodsnake": 5}),
        ] {
            assert!(matches!(store.import(&json), Err(ImportError::Shape)));
        }
        // The stored data was left alone.
        assert_eq!(store.high_score(), 7);
    }

    #[test]
    fn import_replaces_stored_data() {
        let mut store = store();
        store.record(42, at(100)).unwrap();
        let json = serde_json::json!({
            "nodsnake": {
                "highScore": 90,
                "history": [{"score": 90, "time": "2026-08-05T12:00:00Z"}],
            }
        });
        store.import(&json).unwrap();
        assert_eq!(store.high_score(), 90);
        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 90);
    }

    #[test]
    fn import_coerces_odd_values() {
        let mut store = store();
        let json = serde_json::json!({
            "nodsnake": {
                "highScore": -3,
                "history": [
                    {"score": 10, "time": "2026-08-05T12:00:00Z"},
                    {"score": "ten", "time": "2026-08-05T12:00:00Z"},
                    "garbage",
                ],
            }
        });
        store.import(&json).unwrap();
        assert_eq!(store.high_score(), 0);
        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 10);
    }

    #[test]
    fn import_truncates_history_to_the_cap() {
        let mut store = store();
        let entries = (0..250)
            .map(|i| serde_json::json!({"score": i, "time": "2026-08-05T12:00:00Z"}))
            .collect::<Vec<_>>();
        let json = serde_json::json!({"nodsnake": {"highScore": 1, "history": entries}});
        store.import(&json).unwrap();
        let history = store.history();
        assert_eq!(history.len(), 200);
        assert_eq!(history[0].score, 0);
        assert_eq!(history[199].score, 199);
    }

    #[test]
    fn export_round_trips_through_import() {
        let mut store = store();
        store.maybe_set_high_score(30).unwrap();
        store.record(30, at(100)).unwrap();
        store.record(10, at(200)).unwrap();
        let exported = serde_json::to_value(store.export()).unwrap();

        let mut other = self::store();
        other.import(&exported).unwrap();
        assert_eq!(other.export(), store.export());
    }

    #[test]
    fn persisted_document_shape() {
        let mut store = store();
        store.record(10, at(100)).unwrap();
        store.maybe_set_high_score(10).unwrap();
        let raw = store.backend.raw.clone().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["nodsnake"]["highScore"], 10);
        assert_eq!(value["nodsnake"]["history"][0]["score"], 10);
        // Timestamps are ISO-8601 strings.
        assert!(value["nodsnake"]["history"][0]["time"]
            .as_str()
            .unwrap()
            .starts_with("1970-01-01T00:01:40"));
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = store();
        store.maybe_set_high_score(50).unwrap();
        store.clear().unwrap();
        assert_eq!(store.high_score(), 0);
        assert_eq!(store.history(), vec![]);
    }

    mod file_backend {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn round_trip_on_disk() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("scores.json");
            let mut store = ScoreStore::new(FileBackend::new(path.clone()));
            assert_eq!(store.high_score(), 0);
            assert!(store.maybe_set_high_score(25).unwrap());

            let reopened = ScoreStore::new(FileBackend::new(path));
            assert_eq!(reopened.high_score(), 25);
        }

        #[test]
        fn corrupt_file_reads_as_defaults() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("scores.json");
            fs_err::write(&path, "]]junk[[").unwrap();
            let store = ScoreStore::new(FileBackend::new(path));
            assert_eq!(store.high_score(), 0);
        }

        #[test]
        fn clear_removes_the_file_and_is_idempotent() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("scores.json");
            let mut store = ScoreStore::new(FileBackend::new(path.clone()));
            store.maybe_set_high_score(5).unwrap();
            assert!(path.exists());
            store.clear().unwrap();
            assert!(!path.exists());
            store.clear().unwrap();
        }
    }
}
