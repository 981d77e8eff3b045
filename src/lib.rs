pub mod backend;
pub mod error;
pub mod filter;
pub mod fit;
pub mod hardware;
pub mod html;
pub mod pipeline;
pub mod projector;
pub mod selection;
pub mod sort;
pub mod state;
pub mod store;

pub use backend::{Backend, HttpBackend, SnapshotBackend, SystemCommand};
pub use error::BackendError;
pub use filter::{ColumnFilters, Filters};
pub use fit::{FitLevel, ModelFitRecord, RunMode};
pub use hardware::SystemInfoRecord;
pub use pipeline::{TableView, ViewModel, render};
pub use selection::Selection;
pub use sort::{SortKey, SortState};
pub use state::{Event, Session, ViewState, update};
pub use store::{LoadState, RecordStore};
