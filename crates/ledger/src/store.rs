use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{error::LedgerError, state::LedgerState};

/// What to do when persisted state exists but cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Log a warning and start from a fresh zero state. Demo default.
    Lenient,
    /// Fail startup with [`LedgerError::CorruptState`].
    Strict,
}

/// Durable storage for the ledger: one JSON document, rewritten whole on each
/// accepted submission via a write-temp-then-rename swap so a crash can never
/// leave a truncated file behind.
#[derive(Debug)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name used in summary and receipt descriptors.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Loads the persisted state, or a fresh zero state if none exists.
    pub fn load(&self, policy: LoadPolicy) -> Result<LedgerState, LedgerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted state, starting fresh");
                return Ok(LedgerState::default());
            }
            Err(err) => return Err(LedgerError::PersistenceFailure(err)),
        };

        match serde_json::from_str::<LedgerState>(&raw) {
            Ok(mut state) => {
                state.rebuild_index();
                debug!(
                    path = %self.path.display(),
                    votes = state.votes.len(),
                    "loaded persisted ledger state"
                );
                Ok(state)
            }
            Err(source) => match policy {
                LoadPolicy::Lenient => {
                    warn!(
                        path = %self.path.display(),
                        %source,
                        "persisted state is corrupt, starting fresh"
                    );
                    Ok(LedgerState::default())
                }
                LoadPolicy::Strict => Err(LedgerError::CorruptState {
                    path: self.path.clone(),
                    source,
                }),
            },
        }
    }

    /// Atomically replaces the stats file with a snapshot of `state`.
    pub fn save(&self, state: &LedgerState) -> Result<(), LedgerError> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            fs::create_dir_all(dir).map_err(LedgerError::PersistenceFailure)?;
        }

        let json = serde_json::to_vec_pretty(state)
            .map_err(|err| LedgerError::PersistenceFailure(io::Error::other(err)))?;

        let mut tmp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir),
            None => tempfile::NamedTempFile::new_in("."),
        }
        .map_err(LedgerError::PersistenceFailure)?;

        io::Write::write_all(&mut tmp, &json).map_err(LedgerError::PersistenceFailure)?;
        tmp.persist(&self.path)
            .map_err(|err| LedgerError::PersistenceFailure(err.error))?;
        Ok(())
    }
}
