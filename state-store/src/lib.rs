use redgram_core::{ForwarderError, StateError};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod tests;

/// Durable ledger of post identifiers that have already been forwarded.
///
/// Backed by a JSON object mapping id → true (the shape the bot has always
/// written, so existing state files keep working). The ledger is append-only;
/// it never evicts, bounded in practice by listing size × run frequency.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl DedupStore {
    /// Load the ledger from `path`. A missing file yields an empty ledger —
    /// the first run starts from nothing, not from an error. An unreadable
    /// or corrupt file is logged and treated as empty as well; every post in
    /// the next listing will be re-forwarded.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ForwarderError> {
        let path = path.into();

        let seen = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, bool>>(&contents) {
                Ok(entries) => entries.into_keys().collect(),
                Err(err) => {
                    warn!(
                        "State file {} is not valid JSON ({}), starting from an empty ledger",
                        path.display(),
                        err
                    );
                    HashSet::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("State file {} not found, starting fresh", path.display());
                HashSet::new()
            }
            Err(err) => {
                return Err(StateError::ReadFailed {
                    path: path.display().to_string(),
                    source: err,
                }
                .into())
            }
        };

        debug!("Loaded {} forwarded ids from {}", seen.len(), path.display());
        Ok(Self { path, seen })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn mark(&mut self, id: &str) {
        self.seen.insert(id.to_string());
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the ledger to disk atomically: serialize to a sibling temp
    /// file, then rename over the target. A crash between write-start and
    /// write-end leaves the previous ledger intact instead of a truncated
    /// file that would force full re-forwarding on the next run.
    pub fn persist(&self) -> Result<(), ForwarderError> {
        let entries: BTreeMap<&str, bool> = self.seen.iter().map(|id| (id.as_str(), true)).collect();
        let contents = serde_json::to_string_pretty(&entries)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).map_err(|err| StateError::WriteFailed {
            path: tmp_path.display().to_string(),
            source: err,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|err| StateError::ReplaceFailed {
            path: self.path.display().to_string(),
            source: err,
        })?;

        debug!("Persisted {} forwarded ids to {}", self.seen.len(), self.path.display());
        Ok(())
    }
}
