//! Filter → sort → project. Produces the complete [`ViewModel`] for a
//! session; drawing surfaces only ever read the view model.

use tracing::debug;

use crate::filter;
use crate::fit::FitLevel;
use crate::projector::{self, DetailView, RowView, SystemPanel};
use crate::sort::SortKey;
use crate::state::Session;
use crate::store::LoadState;

/// What the table region shows. The four states are always distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub enum TableView {
    /// Before the first model-fit response.
    Loading,
    /// The last model-fit fetch failed.
    Failed(String),
    /// Loaded, but no record passes the filters (or the set is empty).
    Empty,
    Rows(Vec<RowView>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SystemView {
    Loading,
    Failed(String),
    Loaded(SystemPanel),
}

/// Header cell state for one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHeader {
    pub key: SortKey,
    pub label: &'static str,
    /// `Some(ascending)` on the active sort column.
    pub sorted: Option<bool>,
}

impl ColumnHeader {
    pub fn arrow(&self) -> &'static str {
        match self.sorted {
            Some(true) => " ▲",
            Some(false) => " ▼",
            None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub system: SystemView,
    pub columns: Vec<ColumnHeader>,
    pub table: TableView,
    pub visible: usize,
    pub total: usize,
    pub count_label: String,
    pub detail: Option<DetailView>,
    /// Option lists for the filter controls, derived from the loaded set.
    pub category_options: Vec<String>,
    pub fit_level_options: Vec<FitLevel>,
    pub provider_options: Vec<String>,
    pub quant_options: Vec<String>,
    /// Number of constrained filter axes.
    pub active_filters: usize,
}

impl ViewModel {
    /// Row keys in display order.
    pub fn row_keys(&self) -> Vec<&str> {
        match &self.table {
            TableView::Rows(rows) => rows.iter().map(|r| r.key.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Run the full pipeline. Identical sessions always yield identical output.
pub fn render(session: &Session) -> ViewModel {
    let view = &session.view;
    let records = session.store.records();

    let filtered = view.filters.apply(records);
    let sorted = view.sort.sorted(&filtered);
    let rows: Vec<RowView> = sorted
        .iter()
        .map(|r| projector::project_row(r, view.selection.is_selected(&r.name)))
        .collect();

    let visible = rows.len();
    let total = records.len();
    debug!(visible, total, "rendered");

    let table = match &session.store.models {
        LoadState::Loading => TableView::Loading,
        LoadState::Failed(reason) => TableView::Failed(reason.clone()),
        LoadState::Loaded(_) if rows.is_empty() => TableView::Empty,
        LoadState::Loaded(_) => TableView::Rows(rows),
    };

    let system = match &session.store.system {
        LoadState::Loading => SystemView::Loading,
        LoadState::Failed(reason) => SystemView::Failed(reason.clone()),
        LoadState::Loaded(info) => SystemView::Loaded(projector::project_system(info)),
    };

    let columns = SortKey::TABLE_COLUMNS
        .iter()
        .map(|&key| ColumnHeader {
            key,
            label: key.label(),
            sorted: (key == view.sort.key).then_some(view.sort.ascending),
        })
        .collect();

    // Detail resolves against the unfiltered set: a filtered-out selection
    // stays inspectable.
    let detail = view
        .selection
        .resolve(records)
        .map(projector::project_detail);

    ViewModel {
        system,
        columns,
        table,
        visible,
        total,
        count_label: format!("{} of {} records", visible, total),
        detail,
        category_options: filter::category_options(records),
        fit_level_options: filter::fit_level_options(records),
        provider_options: filter::provider_options(records),
        quant_options: filter::quant_options(records),
        active_filters: view.filters.active_count(),
    }
}
