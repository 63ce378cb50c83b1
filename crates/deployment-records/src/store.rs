use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use ethers::utils::{hex, keccak256};
use eyre::{eyre, Result, WrapErr};
use tracing::debug;

use crate::DeploymentRecord;

/// A key-value store of deployment records keyed by logical name. Records are
/// only ever added or replaced.
pub trait RecordStore {
    fn get(&self, logical_name: &str) -> Result<Option<DeploymentRecord>>;

    fn put(&mut self, record: DeploymentRecord) -> Result<()>;
}

/// An in-memory record store.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<String, DeploymentRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, logical_name: &str) -> Result<Option<DeploymentRecord>> {
        Ok(self.records.get(logical_name).cloned())
    }

    fn put(&mut self, record: DeploymentRecord) -> Result<()> {
        self.records.insert(record.logical_name.clone(), record);
        Ok(())
    }
}

/// A record store that keeps one JSON file per logical name in a directory per
/// network. Logical names are display names and may contain any character, so
/// each file is named after the keccak hash of its logical name, i.e.
/// `<root>/<network>/<hex hash>.json`. The name itself is kept in the record.
#[derive(Clone, Debug)]
pub struct JsonRecordStore {
    dir: PathBuf,
}

impl JsonRecordStore {
    /// Opens the partition of `root` that belongs to `network`, creating it if
    /// it doesn't exist yet.
    pub fn open(root: impl AsRef<Path>, network: &str) -> Result<Self> {
        check_path_component(network)
            .wrap_err_with(|| format!("invalid network name {:?}", network))?;
        let dir = root.as_ref().join(network);
        fs::create_dir_all(&dir)
            .wrap_err_with(|| format!("couldn't create record directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// The directory holding this network's records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file holding the record of `logical_name`.
    pub fn path(&self, logical_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", hex::encode(keccak256(logical_name))))
    }
}

impl RecordStore for JsonRecordStore {
    fn get(&self, logical_name: &str) -> Result<Option<DeploymentRecord>> {
        let path = self.path(logical_name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .wrap_err_with(|| format!("couldn't read {}", path.display()))?;
        let record: DeploymentRecord = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("couldn't parse {}", path.display()))?;
        if record.logical_name != logical_name {
            return Err(eyre!(
                "{} holds the record of {:?}",
                path.display(),
                record.logical_name
            ));
        }
        Ok(Some(record))
    }

    fn put(&mut self, record: DeploymentRecord) -> Result<()> {
        let path = self.path(&record.logical_name);
        let contents = serde_json::to_string_pretty(&record)?;

        // Write next to the target and rename so that a crash never leaves a
        // truncated record behind.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, contents)
            .wrap_err_with(|| format!("couldn't write {}", staging.display()))?;
        fs::rename(&staging, &path)
            .wrap_err_with(|| format!("couldn't replace {}", path.display()))?;
        debug!(
            logical_name = %record.logical_name,
            path = %path.display(),
            "wrote deployment record"
        );

        Ok(())
    }
}

fn check_path_component(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(eyre!("name must not be empty, \".\" or \"..\""));
    }
    if name.contains(['/', '\\']) {
        return Err(eyre!("name must not contain path separators"));
    }
    Ok(())
}
