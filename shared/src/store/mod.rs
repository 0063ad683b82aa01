//! Plan document state: actions, the reducer, and the store that persists it
//!
//! All writes to the document go through [`Store::dispatch`]. The store owns the only
//! copy of [`AppState`] and saves it to [`DurableStorage`] after every action that
//! changes the document.

pub mod action;
pub mod manure_systems;
pub mod reconcile;
pub mod reducer;
pub mod storage;

pub use action::Action;
pub use reducer::{reduce, AppState};
pub use storage::{DurableStorage, MemoryStorage, STATE_KEY};

use crate::error::NmpResult;
use crate::models::NmpFile;

/// Result of a successful dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// False when the new state could not be written to durable storage
    pub persisted: bool,
}

/// Single writer over the app state
pub struct Store<S: DurableStorage> {
    state: AppState,
    storage: S,
    key: String,
}

impl<S: DurableStorage> Store<S> {
    /// Load saved state under [`STATE_KEY`], falling back to defaults
    pub fn load(storage: S) -> Self {
        Self::load_with_key(storage, STATE_KEY)
    }

    pub fn load_with_key(storage: S, key: &str) -> Self {
        let state = match storage.read(key) {
            Ok(Some(json)) => match serde_json::from_str::<AppState>(&json) {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Discarding unreadable saved state: {}", e);
                    AppState::default()
                }
            },
            Ok(None) => AppState::default(),
            Err(e) => {
                tracing::error!("Failed to read saved state: {}", e);
                AppState::default()
            }
        };

        Self {
            state,
            storage,
            key: key.to_string(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply an action and persist the result.
    ///
    /// A reducer error resets the state to defaults and is returned. A failed write
    /// keeps the new in-memory state and reports `persisted: false`.
    pub fn dispatch(&mut self, action: Action) -> NmpResult<DispatchOutcome> {
        tracing::debug!(action = action.name(), year = action.year(), "Dispatching action");
        let persist = action.mutates_document();

        match reduce(&self.state, action) {
            Ok(next) => self.state = next,
            Err(e) => {
                tracing::error!("Action failed, resetting plan: {}", e);
                self.state = AppState::default();
                return Err(e);
            }
        }

        if !persist {
            return Ok(DispatchOutcome { persisted: true });
        }
        Ok(DispatchOutcome {
            persisted: self.persist(),
        })
    }

    fn persist(&self) -> bool {
        let written = serde_json::to_string(&self.state)
            .map_err(Into::into)
            .and_then(|json| self.storage.write(&self.key, &json));
        match written {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to save plan: {}", e);
                false
            }
        }
    }

    /// The plan as `.nmp` file contents
    pub fn export_nmp(&self) -> NmpResult<String> {
        Ok(serde_json::to_string_pretty(&self.state.nmp_file)?)
    }

    /// Replace the plan with the contents of a `.nmp` file
    pub fn import_nmp(&mut self, json: &str) -> NmpResult<DispatchOutcome> {
        let file: NmpFile = serde_json::from_str(json)?;
        self.dispatch(Action::OverwriteNmpFile {
            new_file: Box::new(file),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NmpError;
    use crate::models::NmpFileYear;

    struct FailingStorage;

    impl DurableStorage for FailingStorage {
        fn read(&self, _key: &str) -> NmpResult<Option<String>> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> NmpResult<()> {
            Err(NmpError::Storage("quota exceeded".to_string()))
        }
    }

    fn file_with_year(year: &str) -> NmpFile {
        NmpFile {
            years: vec![NmpFileYear::new(year)],
            ..Default::default()
        }
    }

    #[test]
    fn test_dispatch_persists_and_reloads() {
        let mut store = Store::load(MemoryStorage::new());
        let outcome = store
            .dispatch(Action::OverwriteNmpFile {
                new_file: Box::new(file_with_year("2025")),
            })
            .unwrap();
        assert!(outcome.persisted);

        let saved = store.storage().read(STATE_KEY).unwrap().unwrap();
        let reloaded = Store::load(MemoryStorage::with_entry(STATE_KEY, &saved));
        assert_eq!(reloaded.state(), store.state());
    }

    #[test]
    fn test_unreadable_state_loads_defaults() {
        let store = Store::load(MemoryStorage::with_entry(STATE_KEY, "not json"));
        assert_eq!(store.state(), &AppState::default());
    }

    #[test]
    fn test_fatal_error_resets_state() {
        let mut store = Store::load(MemoryStorage::new());
        store
            .import_nmp(&serde_json::to_string(&file_with_year("2025")).unwrap())
            .unwrap();

        let err = store
            .dispatch(Action::ClearAnimals {
                year: "2030".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, NmpError::MissingYear("2030".to_string()));
        assert_eq!(store.state(), &AppState::default());
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let mut store = Store::load(FailingStorage);
        let outcome = store.dispatch(Action::ResetNmpFile).unwrap();
        assert!(!outcome.persisted);
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut store = Store::load(MemoryStorage::new());
        store
            .dispatch(Action::OverwriteNmpFile {
                new_file: Box::new(file_with_year("2025")),
            })
            .unwrap();
        let exported = store.export_nmp().unwrap();

        let mut other = Store::load(MemoryStorage::new());
        other.import_nmp(&exported).unwrap();
        assert_eq!(other.state().nmp_file, store.state().nmp_file);
    }

    #[test]
    fn test_invalid_import_keeps_state() {
        let mut store = Store::load(MemoryStorage::new());
        store
            .dispatch(Action::OverwriteNmpFile {
                new_file: Box::new(file_with_year("2025")),
            })
            .unwrap();
        let err = store.import_nmp("{\"years\": 5}").unwrap_err();
        assert!(matches!(err, NmpError::InvalidDocument(_)));
        assert_eq!(store.state().nmp_file.years.len(), 1);
    }
}
