use std::sync::Arc;
use std::sync::mpsc;

use llmfit_view::backend::{Backend, SystemCommand};
use llmfit_view::pipeline::{self, ViewModel};
use llmfit_view::state::{Event, Session, ViewState};
use llmfit_view::filter::{self, ColumnFilters};
use llmfit_view::fit::RunMode;
use llmfit_view::sort::SortKey;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    /// Column-filter editor overlay.
    Filters,
}

/// Rows of the column-filter editor, top to bottom.
pub const FILTER_ROWS: [&str; 8] = [
    "Score", "tok/s", "Params", "Mem %", "Ctx", "Mode", "Quant", "Provider",
];

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    /// Highlighted row in the column-filter editor.
    pub filter_row: usize,

    // State + its last projection
    pub session: Session,
    pub vm: ViewModel,

    // Table cursor (row index into the visible rows)
    pub selected_row: usize,

    // Background fetches
    backend: Arc<dyn Backend>,
    system_command: SystemCommand,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
    /// Fetch results still expected from worker threads.
    pub pending: usize,
    /// Animation frame counter, incremented every tick while fetching.
    pub tick_count: u64,
    pub source: String,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, system_command: SystemCommand, view: ViewState) -> Self {
        let (tx, rx) = mpsc::channel();
        let session = Session::new(view);
        let vm = pipeline::render(&session);
        let source = backend.describe();
        let cursor_position = session.view.filters.search_text.chars().count();
        let mut app = App {
            should_quit: false,
            input_mode: InputMode::Normal,
            cursor_position,
            filter_row: 0,
            session,
            vm,
            selected_row: 0,
            backend,
            system_command,
            tx,
            rx,
            pending: 0,
            tick_count: 0,
            source,
        };
        app.refresh();
        app
    }

    /// Apply one event and re-run the render pipeline.
    pub fn dispatch(&mut self, event: Event) {
        self.session.apply(event);
        self.vm = pipeline::render(&self.session);
        self.clamp_cursor();
    }

    fn visible_len(&self) -> usize {
        self.vm.row_keys().len()
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.selected_row = 0;
        } else if self.selected_row >= len {
            self.selected_row = len - 1;
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.pending > 0
    }

    /// Fire both fetches on a worker thread. Results arrive through `tick`.
    /// Overlapping refreshes are not cancelled; whichever resolves last wins.
    pub fn refresh(&mut self) {
        let backend = Arc::clone(&self.backend);
        let command = self.system_command;
        let tx = self.tx.clone();
        self.pending += 2;
        debug!(source = %self.source, system = command.command_name(), "refresh started");
        std::thread::spawn(move || {
            let _ = tx.send(Event::SystemInfoFetched(command.fetch(backend.as_ref())));
            let _ = tx.send(Event::ModelFitsFetched(backend.get_model_fits()));
        });
    }

    /// Ask the host to re-detect installed models, then reload the table so
    /// the installed flags follow.
    pub fn refresh_installed(&mut self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.pending += 2;
        debug!(source = %self.source, "installed refresh started");
        std::thread::spawn(move || {
            let _ = tx.send(Event::SystemInfoFetched(backend.refresh_installed()));
            let _ = tx.send(Event::ModelFitsFetched(backend.get_model_fits()));
        });
    }

    /// Drain completed fetches. Called on every loop iteration.
    pub fn tick(&mut self) {
        if self.is_refreshing() {
            self.tick_count = self.tick_count.wrapping_add(1);
        }
        while let Ok(event) = self.rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.dispatch(event);
        }
    }

    // ── Navigation ─────────────────────────────────────────────

    pub fn move_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let len = self.visible_len();
        if len > 0 && self.selected_row < len - 1 {
            self.selected_row += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(10);
    }

    pub fn page_down(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected_row = (self.selected_row + 10).min(len - 1);
        }
    }

    pub fn home(&mut self) {
        self.selected_row = 0;
    }

    pub fn end(&mut self) {
        self.selected_row = self.visible_len().saturating_sub(1);
    }

    /// Row click on the row under the cursor.
    pub fn select_current(&mut self) {
        let key = self
            .vm
            .row_keys()
            .get(self.selected_row)
            .map(|k| k.to_string());
        if let Some(key) = key {
            self.dispatch(Event::RowClicked(key));
        }
    }

    pub fn close_detail(&mut self) {
        self.dispatch(Event::EscapePressed);
    }

    // ── Filters and sort ───────────────────────────────────────

    /// Cycles through the fit levels present in the loaded set.
    pub fn cycle_fit_filter(&mut self) {
        let next = filter::cycle_option(
            self.session.view.filters.fit_level.as_ref(),
            &self.vm.fit_level_options,
        );
        self.dispatch(Event::FitLevelSelected(next));
    }

    pub fn cycle_category(&mut self) {
        let next = filter::cycle_option(
            self.session.view.filters.category.as_ref(),
            &self.vm.category_options,
        );
        self.dispatch(Event::CategorySelected(next));
    }

    pub fn toggle_installed_only(&mut self) {
        let on = !self.session.view.filters.installed_only;
        self.dispatch(Event::InstalledOnlySet(on));
    }

    pub fn clear_filters(&mut self) {
        self.cursor_position = 0;
        self.dispatch(Event::ClearFilters);
    }

    pub fn sort_next_column(&mut self) {
        let key = self.session.view.sort.key.next_column();
        self.dispatch(Event::HeaderClicked(key));
    }

    pub fn sort_prev_column(&mut self) {
        let key = self.session.view.sort.key.prev_column();
        self.dispatch(Event::HeaderClicked(key));
    }

    /// Same-column header click: flips direction.
    pub fn flip_sort(&mut self) {
        let key: SortKey = self.session.view.sort.key;
        self.dispatch(Event::HeaderClicked(key));
    }

    // ── Column filters ─────────────────────────────────────────

    pub fn enter_column_filters(&mut self) {
        self.input_mode = InputMode::Filters;
    }

    pub fn exit_column_filters(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn filter_row_up(&mut self) {
        self.filter_row = self.filter_row.saturating_sub(1);
    }

    pub fn filter_row_down(&mut self) {
        self.filter_row = (self.filter_row + 1).min(FILTER_ROWS.len() - 1);
    }

    /// The provider filter as the editor shows it: a single provider, or none.
    fn single_provider(&self) -> Option<&String> {
        let providers = &self.session.view.filters.providers;
        if providers.len() == 1 {
            providers.iter().next()
        } else {
            None
        }
    }

    /// Advance the highlighted row to its next value.
    pub fn adjust_column_filter(&mut self) {
        if self.filter_row == 7 {
            let next = filter::cycle_option(self.single_provider(), &self.vm.provider_options);
            self.dispatch(Event::ProvidersSelected(next.into_iter().collect()));
            return;
        }
        let mut columns = self.session.view.filters.columns.clone();
        match self.filter_row {
            0 => columns.min_score = step(columns.min_score, filter::SCORE_STEPS),
            1 => columns.min_tps = step(columns.min_tps, filter::TPS_STEPS),
            2 => columns.min_params_b = step(columns.min_params_b, filter::PARAMS_STEPS),
            3 => columns.max_mem_pct = step(columns.max_mem_pct, filter::MEM_PCT_STEPS),
            4 => columns.min_context_k = step(columns.min_context_k, filter::CONTEXT_K_STEPS),
            5 => columns.run_mode = filter::cycle_option(columns.run_mode.as_ref(), &RunMode::ALL),
            _ => {
                columns.quant = filter::cycle_option(columns.quant.as_ref(), &self.vm.quant_options)
            }
        }
        self.dispatch(Event::ColumnFiltersChanged(columns));
    }

    /// Reset the highlighted row to "any".
    pub fn reset_column_filter(&mut self) {
        if self.filter_row == 7 {
            self.dispatch(Event::ProvidersSelected(Default::default()));
            return;
        }
        let mut columns = self.session.view.filters.columns.clone();
        match self.filter_row {
            0 => columns.min_score = None,
            1 => columns.min_tps = None,
            2 => columns.min_params_b = None,
            3 => columns.max_mem_pct = None,
            4 => columns.min_context_k = None,
            5 => columns.run_mode = None,
            _ => columns.quant = None,
        }
        self.dispatch(Event::ColumnFiltersChanged(columns));
    }

    /// Current value label for an editor row.
    pub fn column_filter_label(&self, row: usize) -> String {
        let columns: &ColumnFilters = &self.session.view.filters.columns;
        let bound = |dir: &str, value: Option<f64>, unit: &str| match value {
            Some(v) => format!("{} {}{}", dir, v, unit),
            None => "Any".to_string(),
        };
        match row {
            0 => bound("≥", columns.min_score, ""),
            1 => bound("≥", columns.min_tps, ""),
            2 => bound("≥", columns.min_params_b, "B"),
            3 => bound("≤", columns.max_mem_pct, "%"),
            4 => bound("≥", columns.min_context_k, "k"),
            5 => columns.run_mode.map(|m| m.text()).unwrap_or("All").to_string(),
            6 => columns.quant.clone().unwrap_or_else(|| "All".to_string()),
            _ => match self.session.view.filters.providers.len() {
                0 => "All".to_string(),
                1 => self.single_provider().cloned().unwrap_or_default(),
                n => format!("{} selected", n),
            },
        }
    }

    // ── Search ─────────────────────────────────────────────────

    pub fn enter_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn exit_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    fn search_text(&self) -> &str {
        &self.session.view.filters.search_text
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.search_text()
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.search_text().len())
    }

    pub fn search_input(&mut self, c: char) {
        let mut text = self.search_text().to_string();
        text.insert(self.byte_index(self.cursor_position), c);
        self.cursor_position += 1;
        self.dispatch(Event::SearchChanged(text));
    }

    pub fn search_backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let mut text = self.search_text().to_string();
            text.remove(self.byte_index(self.cursor_position));
            self.dispatch(Event::SearchChanged(text));
        }
    }

    pub fn search_delete(&mut self) {
        if self.cursor_position < self.search_text().chars().count() {
            let mut text = self.search_text().to_string();
            text.remove(self.byte_index(self.cursor_position));
            self.dispatch(Event::SearchChanged(text));
        }
    }

    pub fn clear_search(&mut self) {
        self.cursor_position = 0;
        self.dispatch(Event::SearchChanged(String::new()));
    }
}

fn step(current: Option<f64>, steps: &[f64]) -> Option<f64> {
    filter::cycle_option(current.as_ref(), steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmfit_view::error::Result;
    use llmfit_view::{ModelFitRecord, SystemInfoRecord};

    struct Fixed;

    impl Backend for Fixed {
        fn describe(&self) -> String {
            "fixed".into()
        }

        fn get_system_info(&self) -> Result<SystemInfoRecord> {
            Ok(serde_json::from_str(r#"{"cpu":"c","cores":2,"ram_gb":4.0}"#).unwrap())
        }

        fn get_model_fits(&self) -> Result<Vec<ModelFitRecord>> {
            let rec = |name: &str, score: f64| -> ModelFitRecord {
                serde_json::from_value(serde_json::json!({
                    "name": name, "provider": "p", "params": "7B", "score": score,
                    "fit_level": "Good", "estimated_tps": 1.0, "best_quant": "Q4_K_M",
                    "run_mode": "GPU", "utilization_pct": 10.0, "context_length": 4096,
                    "memory_required_gb": 1.0, "memory_available_gb": 8.0,
                    "score_memory": 1.0, "score_speed": 1.0, "score_quality": 1.0,
                    "score_context": 1.0
                }))
                .unwrap()
            };
            Ok(vec![rec("org/low", 10.0), rec("org/high", 90.0)])
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new(Arc::new(Fixed), SystemCommand::Info, ViewState::default());
        while app.is_refreshing() {
            if let Ok(event) = app.rx.recv() {
                app.pending -= 1;
                app.dispatch(event);
            }
        }
        app
    }

    #[test]
    fn refresh_loads_both_regions() {
        let app = loaded_app();
        assert_eq!(app.vm.row_keys(), vec!["org/high", "org/low"]);
        assert!(matches!(
            app.vm.system,
            llmfit_view::pipeline::SystemView::Loaded(_)
        ));
    }

    #[test]
    fn enter_selects_row_under_cursor() {
        let mut app = loaded_app();
        app.move_down();
        app.select_current();
        assert_eq!(app.vm.detail.as_ref().unwrap().key, "org/low");
        app.close_detail();
        assert!(app.vm.detail.is_none());
    }

    #[test]
    fn search_editing_updates_filter() {
        let mut app = loaded_app();
        for c in "low".chars() {
            app.search_input(c);
        }
        assert_eq!(app.vm.row_keys(), vec!["org/low"]);
        app.search_backspace();
        assert_eq!(app.session.view.filters.search_text, "lo");
        app.clear_search();
        assert_eq!(app.vm.count_label, "2 of 2 records");
    }

    #[test]
    fn column_filter_editor_cycles_and_resets() {
        let mut app = loaded_app();
        app.enter_column_filters();
        assert_eq!(app.column_filter_label(0), "Any");

        // Score ≥ 30 hides org/low (10).
        app.adjust_column_filter();
        assert_eq!(app.column_filter_label(0), "≥ 30");
        assert_eq!(app.vm.row_keys(), vec!["org/high"]);
        assert_eq!(app.vm.active_filters, 1);

        app.reset_column_filter();
        assert_eq!(app.vm.count_label, "2 of 2 records");

        for _ in 0..7 {
            app.filter_row_down();
        }
        assert_eq!(app.filter_row, FILTER_ROWS.len() - 1);
        app.adjust_column_filter();
        assert_eq!(app.column_filter_label(7), "p");
        app.adjust_column_filter();
        assert_eq!(app.column_filter_label(7), "All");
        app.exit_column_filters();
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn fit_cycle_only_offers_present_levels() {
        let mut app = loaded_app();
        app.cycle_fit_filter();
        assert_eq!(
            app.session.view.filters.fit_level,
            Some(llmfit_view::FitLevel::Good)
        );
        app.cycle_fit_filter();
        assert_eq!(app.session.view.filters.fit_level, None);
    }

    #[test]
    fn cursor_clamps_when_rows_shrink() {
        let mut app = loaded_app();
        app.end();
        assert_eq!(app.selected_row, 1);
        app.search_input('h');
        app.search_input('i');
        assert_eq!(app.selected_row, 0);
    }
}
