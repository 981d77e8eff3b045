//! Last-fetched backend data.
//!
//! Each region (system panel, model table) is replaced wholesale when its
//! fetch resolves and fails independently of the other.

use crate::fit::ModelFitRecord;
use crate::hardware::SystemInfoRecord;

/// Lifecycle of one fetched region.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// No response yet.
    Loading,
    Loaded(T),
    /// Last fetch failed and there is nothing to show in its place.
    Failed(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    pub system: LoadState<SystemInfoRecord>,
    pub models: LoadState<Vec<ModelFitRecord>>,
}

impl RecordStore {
    /// Current model records, empty unless loaded.
    pub fn records(&self) -> &[ModelFitRecord] {
        self.models.loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn replace_models(&mut self, records: Vec<ModelFitRecord>) {
        self.models = LoadState::Loaded(records);
    }

    /// A failed model fetch replaces the table with an error placeholder.
    pub fn fail_models(&mut self, reason: String) {
        self.models = LoadState::Failed(reason);
    }

    pub fn replace_system(&mut self, info: SystemInfoRecord) {
        self.system = LoadState::Loaded(info);
    }

    /// A failed system fetch keeps a previously loaded record on screen.
    pub fn fail_system(&mut self, reason: String) {
        if !matches!(self.system, LoadState::Loaded(_)) {
            self.system = LoadState::Failed(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::test_support::record;

    fn info() -> SystemInfoRecord {
        SystemInfoRecord {
            cpu: "cpu".into(),
            cores: 8,
            ram_gb: 16.0,
            gpu: "None".into(),
            gpu_backend: None,
            vram_gb: None,
            unified_memory: false,
            ollama_available: false,
            ollama_installed_count: 0,
        }
    }

    #[test]
    fn starts_loading_with_no_records() {
        let store = RecordStore::default();
        assert!(store.models.is_loading());
        assert!(store.system.is_loading());
        assert!(store.records().is_empty());
    }

    #[test]
    fn model_failure_replaces_table() {
        let mut store = RecordStore::default();
        store.replace_models(vec![record("a")]);
        store.fail_models("down".into());
        assert_eq!(store.models, LoadState::Failed("down".into()));
        assert!(store.records().is_empty());
        store.replace_models(vec![record("b")]);
        assert_eq!(store.records()[0].name, "b");
    }

    #[test]
    fn system_failure_keeps_prior_record() {
        let mut store = RecordStore::default();
        store.fail_system("down".into());
        assert_eq!(store.system, LoadState::Failed("down".into()));
        store.replace_system(info());
        store.fail_system("down again".into());
        assert_eq!(store.system.loaded(), Some(&info()));
    }
}
