//! View state and its transitions.
//!
//! All state lives in [`Session`]. User input and fetch results arrive as
//! [`Event`] values and [`update`] maps `(session, event)` to the next
//! session. No I/O happens here; drawing and fetching are the caller's job.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::error::BackendError;
use crate::filter::{ColumnFilters, Filters};
use crate::fit::{FitLevel, ModelFitRecord};
use crate::hardware::SystemInfoRecord;
use crate::selection::Selection;
use crate::sort::{SortKey, SortState};
use crate::store::RecordStore;

/// Filter, sort and selection state. Survives refreshes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub sort: SortState,
    pub filters: Filters,
    pub selection: Selection,
}

#[derive(Debug)]
pub enum Event {
    SearchChanged(String),
    FitLevelSelected(Option<FitLevel>),
    CategorySelected(Option<String>),
    InstalledOnlySet(bool),
    /// Empty set shows every provider.
    ProvidersSelected(BTreeSet<String>),
    ColumnFiltersChanged(ColumnFilters),
    ClearFilters,
    HeaderClicked(SortKey),
    RowClicked(String),
    CloseDetail,
    EscapePressed,
    SystemInfoFetched(Result<SystemInfoRecord, BackendError>),
    ModelFitsFetched(Result<Vec<ModelFitRecord>, BackendError>),
}

/// Everything the render pipeline reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub store: RecordStore,
    pub view: ViewState,
}

impl Session {
    pub fn new(view: ViewState) -> Self {
        Self {
            store: RecordStore::default(),
            view,
        }
    }

    /// In-place form of [`update`].
    pub fn apply(&mut self, event: Event) {
        *self = update(std::mem::take(self), event);
    }
}

/// The state machine. Every transition goes through here.
pub fn update(mut session: Session, event: Event) -> Session {
    let view = &mut session.view;
    match event {
        Event::SearchChanged(text) => {
            debug!(search = %text, "search changed");
            view.filters.search_text = text;
        }
        Event::FitLevelSelected(level) => {
            debug!(?level, "fit filter changed");
            view.filters.fit_level = level;
        }
        Event::CategorySelected(category) => {
            debug!(?category, "category filter changed");
            view.filters.category = category;
        }
        Event::InstalledOnlySet(on) => {
            debug!(installed_only = on, "installed filter changed");
            view.filters.installed_only = on;
        }
        Event::ProvidersSelected(providers) => {
            debug!(?providers, "provider filter changed");
            view.filters.providers = providers;
        }
        Event::ColumnFiltersChanged(columns) => {
            debug!(?columns, "column filters changed");
            view.filters.columns = columns;
        }
        Event::ClearFilters => {
            view.filters = Filters::default();
        }
        Event::HeaderClicked(key) => {
            view.sort = view.sort.click(key);
            debug!(key = key.field_name(), ascending = view.sort.ascending, "sort changed");
        }
        Event::RowClicked(name) => {
            debug!(%name, "row selected");
            view.selection = Selection::select(name);
        }
        Event::CloseDetail | Event::EscapePressed => {
            view.selection = std::mem::take(&mut view.selection).close();
        }
        Event::SystemInfoFetched(Ok(info)) => {
            info!(cpu = %info.cpu, cores = info.cores, "system info loaded");
            session.store.replace_system(info);
        }
        Event::SystemInfoFetched(Err(e)) => {
            warn!(command = e.command(), error = %e, "system info fetch failed");
            session.store.fail_system(e.to_string());
        }
        Event::ModelFitsFetched(Ok(records)) => {
            info!(count = records.len(), "model fits loaded");
            session.store.replace_models(records);
            revalidate_selection(&mut session);
        }
        Event::ModelFitsFetched(Err(e)) => {
            warn!(command = e.command(), error = %e, "model fit fetch failed");
            session.store.fail_models(e.to_string());
            revalidate_selection(&mut session);
        }
    }
    session
}

fn revalidate_selection(session: &mut Session) {
    let before = session.view.selection.key().map(str::to_owned);
    session.view.selection =
        std::mem::take(&mut session.view.selection).revalidate(session.store.records());
    if let (Some(name), None) = (before, session.view.selection.key()) {
        debug!(%name, "selected record no longer present; selection cleared");
    }
}
