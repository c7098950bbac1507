use directories::ProjectDirs;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const PROJECT_DIR_NAME: &str = ".route";

/// Fixed keys of the persisted blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Board,
    Inbox,
    JournalBooks,
    JournalEntries,
    BrandAssets,
    FocusWidgets,
    FocusRituals,
    FocusEnergy,
    FocusTimer,
    Artifacts,
    UserName,
    PrivacyAccepted,
}

impl StorageKey {
    pub const ALL: [StorageKey; 12] = [
        StorageKey::Board,
        StorageKey::Inbox,
        StorageKey::JournalBooks,
        StorageKey::JournalEntries,
        StorageKey::BrandAssets,
        StorageKey::FocusWidgets,
        StorageKey::FocusRituals,
        StorageKey::FocusEnergy,
        StorageKey::FocusTimer,
        StorageKey::Artifacts,
        StorageKey::UserName,
        StorageKey::PrivacyAccepted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Board => "board",
            StorageKey::Inbox => "inbox",
            StorageKey::JournalBooks => "journal-books",
            StorageKey::JournalEntries => "journal-entries",
            StorageKey::BrandAssets => "brand-assets",
            StorageKey::FocusWidgets => "focus-widgets",
            StorageKey::FocusRituals => "focus-rituals",
            StorageKey::FocusEnergy => "focus-energy",
            StorageKey::FocusTimer => "focus-timer",
            StorageKey::Artifacts => "ai-artifacts",
            StorageKey::UserName => "user-name",
            StorageKey::PrivacyAccepted => "privacy-accepted",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse stored value for {key}: {source}")]
    Parse {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not serialize value for {key}: {source}")]
    Serialize {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("store rejected write for {0}")]
    WriteRejected(String),
    #[error("could not locate a user data directory")]
    NoDataDir,
}

/// String-to-blob store. Each key is read and written independently.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(FileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// In-process store; `read_only` makes every write fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    read_only: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn read_only() -> Self {
        MemoryStore {
            read_only: true,
            ..MemoryStore::default()
        }
    }

    pub fn with_entry(mut self, key: StorageKey, value: &str) -> Self {
        self.entries.insert(key.as_str().to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: StorageKey) -> Option<&str> {
        self.entries.get(key.as_str()).map(String::as_str)
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::WriteRejected(key.to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::WriteRejected(key.to_string()));
        }
        self.entries.remove(key);
        Ok(())
    }
}

pub fn read_json<T, S>(store: &S, key: StorageKey) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    match store.get(key.as_str())? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Parse { key, source }),
        None => Ok(None),
    }
}

pub fn write_json<T, S>(store: &mut S, key: StorageKey, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    S: KvStore + ?Sized,
{
    let serialized = serde_json::to_string_pretty(value)
        .map_err(|source| StoreError::Serialize { key, source })?;
    store.set(key.as_str(), &serialized)
}

/// In-memory value mirrored to one storage key. Every mutation through
/// [`Synced::update`] writes the whole value back; failures are logged and
/// swallowed so the in-memory copy stays authoritative.
#[derive(Debug, Clone)]
pub struct Synced<T> {
    key: StorageKey,
    value: T,
}

impl<T> Synced<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Reads the stored blob. A missing or unparsable blob is replaced by
    /// `seed()`, which is written back immediately.
    pub fn load<S, F>(store: &mut S, key: StorageKey, seed: F) -> Self
    where
        S: KvStore + ?Sized,
        F: FnOnce() -> T,
    {
        let loaded = match read_json::<T, S>(store, key) {
            Ok(Some(value)) => {
                info!("event=store_load key={} status=ok", key);
                return Synced { key, value };
            }
            Ok(None) => {
                info!("event=store_load key={} status=seeded reason=missing", key);
                Synced { key, value: seed() }
            }
            Err(err) => {
                warn!(
                    "event=store_load key={} status=seeded reason=unreadable error={}",
                    key, err
                );
                Synced { key, value: seed() }
            }
        };
        loaded.save(store);
        loaded
    }

    pub fn key(&self) -> StorageKey {
        self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Direct access; the caller is responsible for calling [`Synced::save`].
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn update<S, F, R>(&mut self, store: &mut S, f: F) -> R
    where
        S: KvStore + ?Sized,
        F: FnOnce(&mut T) -> R,
    {
        let result = f(&mut self.value);
        self.save(store);
        result
    }

    /// Runs a repair pass and persists only if it reports a change.
    pub fn repair<S, F>(&mut self, store: &mut S, f: F) -> bool
    where
        S: KvStore + ?Sized,
        F: FnOnce(&mut T) -> bool,
    {
        let changed = f(&mut self.value);
        if changed {
            info!("event=store_repair key={}", self.key);
            self.save(store);
        }
        changed
    }

    pub fn replace<S>(&mut self, store: &mut S, value: T)
    where
        S: KvStore + ?Sized,
    {
        self.value = value;
        self.save(store);
    }

    pub fn save<S>(&self, store: &mut S)
    where
        S: KvStore + ?Sized,
    {
        if let Err(err) = self.try_save(store) {
            error!("event=store_save key={} status=failed error={}", self.key, err);
        }
    }

    pub fn try_save<S>(&self, store: &mut S) -> Result<(), StoreError>
    where
        S: KvStore + ?Sized,
    {
        write_json(store, self.key, &self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataScope {
    Project,
    Global,
    Override,
}

impl DataScope {
    pub fn label(self) -> &'static str {
        match self {
            DataScope::Project => "project",
            DataScope::Global => "global",
            DataScope::Override => "override",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataLocation {
    pub dir: PathBuf,
    pub scope: DataScope,
}

/// Creates `.route/` under `cwd` if needed.
pub fn init_project_dir(cwd: &Path) -> Result<DataLocation, StoreError> {
    let dir = cwd.join(PROJECT_DIR_NAME);
    fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
        path: dir.clone(),
        source,
    })?;
    Ok(DataLocation {
        dir,
        scope: DataScope::Project,
    })
}

/// Override, then nearest project `.route/` walking up from `start`, then the
/// per-user data directory.
pub fn locate_data_dir(
    start: &Path,
    override_dir: Option<PathBuf>,
) -> Result<DataLocation, StoreError> {
    if let Some(dir) = override_dir {
        return Ok(DataLocation {
            dir,
            scope: DataScope::Override,
        });
    }
    if let Some(dir) = find_project_dir(start) {
        return Ok(DataLocation {
            dir,
            scope: DataScope::Project,
        });
    }
    Ok(DataLocation {
        dir: global_data_dir()?,
        scope: DataScope::Global,
    })
}

fn find_project_dir(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_data_dir() -> Result<PathBuf, StoreError> {
    let dirs = ProjectDirs::from("", "", "founders-route").ok_or(StoreError::NoDataDir)?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Board;

    #[test]
    fn file_store_roundtrip_and_missing_key() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path().join("data")).unwrap();
        assert_eq!(store.get("board").unwrap(), None);
        store.set("board", "[1,2]").unwrap();
        assert_eq!(store.get("board").unwrap().as_deref(), Some("[1,2]"));
        assert!(store.path_for("board").exists());
        store.remove("board").unwrap();
        store.remove("board").unwrap();
        assert_eq!(store.get("board").unwrap(), None);
    }

    #[test]
    fn load_seeds_and_writes_back() {
        let mut store = MemoryStore::new();
        let synced = Synced::load(&mut store, StorageKey::Board, Board::seed);
        assert_eq!(synced.get(), &Board::seed());
        assert!(store.raw(StorageKey::Board).is_some());
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn load_malformed_falls_back_to_seed() {
        let mut store = MemoryStore::new().with_entry(StorageKey::Board, "{not json");
        let synced = Synced::load(&mut store, StorageKey::Board, Board::seed);
        assert_eq!(synced.get(), &Board::seed());
        let reloaded: Board = read_json(&store, StorageKey::Board).unwrap().unwrap();
        assert_eq!(reloaded, Board::seed());
    }

    #[test]
    fn load_existing_does_not_write() {
        let mut store = MemoryStore::new().with_entry(StorageKey::UserName, "\"Ada\"");
        let synced: Synced<Option<String>> =
            Synced::load(&mut store, StorageKey::UserName, || None);
        assert_eq!(synced.get().as_deref(), Some("Ada"));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn update_persists_every_change() {
        let mut store = MemoryStore::new();
        let mut synced: Synced<Vec<u32>> = Synced::load(&mut store, StorageKey::Inbox, Vec::new);
        synced.update(&mut store, |v| v.push(1));
        synced.update(&mut store, |v| v.push(2));
        assert_eq!(store.writes(), 3);
        let stored: Vec<u32> = read_json(&store, StorageKey::Inbox).unwrap().unwrap();
        assert_eq!(stored, vec![1, 2]);
    }

    #[test]
    fn write_failures_are_swallowed() {
        let mut store = MemoryStore::read_only();
        let mut synced: Synced<Vec<u32>> = Synced::load(&mut store, StorageKey::Inbox, Vec::new);
        synced.update(&mut store, |v| v.push(7));
        assert_eq!(synced.get(), &vec![7]);
        assert!(matches!(
            synced.try_save(&mut store),
            Err(StoreError::WriteRejected(_))
        ));
    }

    #[test]
    fn repair_saves_only_on_change() {
        let mut store = MemoryStore::new().with_entry(StorageKey::FocusEnergy, "3");
        let mut synced: Synced<u8> = Synced::load(&mut store, StorageKey::FocusEnergy, || 3);
        assert!(!synced.repair(&mut store, |_| false));
        assert_eq!(store.writes(), 0);
        assert!(synced.repair(&mut store, |v| {
            *v = 4;
            true
        }));
        assert_eq!(store.raw(StorageKey::FocusEnergy), Some("4"));
    }

    #[test]
    fn locate_prefers_override_then_project() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        init_project_dir(tmp.path()).unwrap();

        let found = locate_data_dir(&nested, None).unwrap();
        assert_eq!(found.scope, DataScope::Project);
        assert_eq!(found.dir, tmp.path().join(PROJECT_DIR_NAME));

        let forced = locate_data_dir(&nested, Some(tmp.path().join("elsewhere"))).unwrap();
        assert_eq!(forced.scope, DataScope::Override);
    }

    #[test]
    fn storage_keys_are_unique() {
        let mut names: Vec<_> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), StorageKey::ALL.len());
    }
}
