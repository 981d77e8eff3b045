mod display;
mod tui_app;
mod tui_events;
mod tui_ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use llmfit_view::backend::{Backend, HttpBackend, SnapshotBackend, SystemCommand};
use llmfit_view::pipeline::{self, TableView};
use llmfit_view::state::{Event, Session, ViewState};
use llmfit_view::filter::ColumnFilters;
use llmfit_view::fit::RunMode;
use llmfit_view::{FitLevel, Filters, SortKey, SortState, html, projector};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "llmfit-view")]
#[command(about = "Browse, filter and sort llmfit model-fit results", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read system info and model fits from a JSON snapshot file (takes precedence over --url)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Base URL of a host serving the backend commands
    #[arg(long, env = "LLMFIT_VIEW_URL", default_value = "http://localhost:7878")]
    url: String,

    /// Request timeout for the HTTP host, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Command name the host uses for the system-info fetch
    #[arg(long, value_enum, default_value_t = SystemCommand::Info)]
    system_command: SystemCommand,

    /// Initial search text (matches model name or provider)
    #[arg(long, global = true)]
    search: Option<String>,

    /// Show only models with this fit level
    #[arg(long, value_enum, global = true)]
    fit: Option<FitArg>,

    /// Show only models in this category
    #[arg(long, global = true)]
    category: Option<String>,

    /// Show only installed models
    #[arg(long, global = true)]
    installed: bool,

    /// Show only models from this provider (repeatable)
    #[arg(long = "provider", global = true)]
    providers: Vec<String>,

    /// Minimum composite score
    #[arg(long, global = true)]
    min_score: Option<f64>,

    /// Minimum estimated tokens per second
    #[arg(long, global = true)]
    min_tps: Option<f64>,

    /// Minimum parameter count, in billions
    #[arg(long, global = true)]
    min_params: Option<f64>,

    /// Maximum memory utilization, in percent
    #[arg(long, global = true)]
    max_mem: Option<f64>,

    /// Minimum context window, in thousands of tokens
    #[arg(long, global = true)]
    min_context: Option<f64>,

    /// Show only models with this run mode
    #[arg(long, value_enum, global = true)]
    mode: Option<ModeArg>,

    /// Show only models with this best quantization (e.g. Q4_K_M)
    #[arg(long, global = true)]
    quant: Option<String>,

    /// Show only models whose use case mentions this text
    #[arg(long, global = true)]
    use_case: Option<String>,

    /// Sort column
    #[arg(long, value_enum, global = true, default_value_t = SortKey::Score)]
    sort: SortKey,

    /// Sort ascending instead of descending
    #[arg(long, global = true)]
    asc: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file (the TUI otherwise discards them)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show system hardware specifications
    System,

    /// Print the filtered, sorted model table
    Table {
        /// Limit number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show detailed information about a specific model
    Info {
        /// Full model name or a unique partial name
        model: String,
    },

    /// Render the current view as a standalone HTML document
    Html {
        /// Select this model so the detail panel is included
        #[arg(long)]
        select: Option<String>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FitArg {
    Perfect,
    Good,
    Marginal,
    Tight,
}

impl From<FitArg> for FitLevel {
    fn from(f: FitArg) -> Self {
        match f {
            FitArg::Perfect => FitLevel::Perfect,
            FitArg::Good => FitLevel::Good,
            FitArg::Marginal => FitLevel::Marginal,
            FitArg::Tight => FitLevel::TooTight,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    Gpu,
    Moe,
    CpuGpu,
    Cpu,
}

impl From<ModeArg> for RunMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Gpu => RunMode::Gpu,
            ModeArg::Moe => RunMode::MoeOffload,
            ModeArg::CpuGpu => RunMode::CpuOffload,
            ModeArg::Cpu => RunMode::CpuOnly,
        }
    }
}

impl Cli {
    fn backend(&self) -> Arc<dyn Backend> {
        match &self.snapshot {
            Some(path) => Arc::new(SnapshotBackend::new(path)),
            None => Arc::new(HttpBackend::new(
                self.url.clone(),
                Duration::from_secs(self.timeout_secs),
            )),
        }
    }

    fn initial_view(&self) -> ViewState {
        ViewState {
            sort: SortState {
                key: self.sort,
                ascending: self.asc,
            },
            filters: Filters {
                search_text: self.search.clone().unwrap_or_default(),
                fit_level: self.fit.map(FitLevel::from),
                category: self.category.clone(),
                installed_only: self.installed,
                providers: self.providers.iter().cloned().collect(),
                columns: ColumnFilters {
                    min_score: self.min_score,
                    min_tps: self.min_tps,
                    min_params_b: self.min_params,
                    max_mem_pct: self.max_mem,
                    min_context_k: self.min_context,
                    run_mode: self.mode.map(RunMode::from),
                    quant: self.quant.clone(),
                    use_case: self.use_case.clone(),
                },
            },
            ..ViewState::default()
        }
    }
}

fn init_tracing(
    verbose: bool,
    log_file: Option<&PathBuf>,
    interactive: bool,
) -> std::io::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("llmfit_view={}", level).into());

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .init();
        }
        // Anything written to the terminal would tear the TUI.
        None if interactive => {}
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

/// Fetch both regions synchronously for the one-shot subcommands.
fn load_session(cli: &Cli, backend: &dyn Backend) -> Session {
    let mut session = Session::new(cli.initial_view());
    session.apply(Event::SystemInfoFetched(cli.system_command.fetch(backend)));
    session.apply(Event::ModelFitsFetched(backend.get_model_fits()));
    session
}

fn run_info(cli: &Cli, backend: &dyn Backend, query: &str) {
    match backend.get_model_detail(query) {
        Ok(Some(record)) => {
            display::display_model_detail(&projector::project_detail(&record));
            return;
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "model detail lookup failed, searching the full list"),
    }

    let mut session = load_session(cli, backend);
    let records = session.store.records();

    let query_lower = query.to_lowercase();
    let partial: Vec<&str> = records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&query_lower))
        .map(|r| r.name.as_str())
        .collect();

    let name = match partial.as_slice() {
        [one] => one.to_string(),
        [] => {
            if let TableView::Failed(reason) = pipeline::render(&session).table {
                eprintln!("Error loading models: {}", reason);
                std::process::exit(1);
            }
            println!("\nNo model found matching '{}'", query);
            return;
        }
        many => {
            println!("\nMultiple models found. Please be more specific:");
            for m in many {
                println!("  - {}", m);
            }
            return;
        }
    };

    session.apply(Event::RowClicked(name));
    if let Some(detail) = pipeline::render(&session).detail {
        display::display_model_detail(&detail);
    }
}

fn run_tui(cli: &Cli, backend: Arc<dyn Backend>) -> std::io::Result<()> {
    // Setup terminal
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;

    let backend_impl = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend_impl)?;

    // Create app state; the first refresh starts immediately
    let mut app = tui_app::App::new(backend, cli.system_command, cli.initial_view());

    // Main loop
    let result = loop {
        if let Err(e) = terminal.draw(|frame| tui_ui::draw(frame, &mut app)) {
            break Err(e);
        }

        if let Err(e) = tui_events::handle_events(&mut app) {
            break Err(e);
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn main() {
    let cli = Cli::parse();

    let interactive = cli.command.is_none();
    if let Err(e) = init_tracing(cli.verbose, cli.log_file.as_ref(), interactive) {
        eprintln!("Cannot open log file: {}", e);
        std::process::exit(1);
    }

    let backend = cli.backend();
    tracing::debug!(source = %backend.describe(), "backend selected");

    if let Some(command) = &cli.command {
        match command {
            Commands::System => {
                let mut session = Session::new(cli.initial_view());
                session.apply(Event::SystemInfoFetched(
                    cli.system_command.fetch(backend.as_ref()),
                ));
                display::display_system(&pipeline::render(&session).system);
            }

            Commands::Table { limit } => {
                let session = load_session(&cli, backend.as_ref());
                let vm = pipeline::render(&session);
                display::display_system(&vm.system);
                display::display_table(&vm, *limit);
            }

            Commands::Info { model } => {
                run_info(&cli, backend.as_ref(), model);
            }

            Commands::Html { select } => {
                let mut session = load_session(&cli, backend.as_ref());
                if let Some(name) = select {
                    session.apply(Event::RowClicked(name.clone()));
                }
                print!("{}", html::render_document(&pipeline::render(&session)));
            }
        }
        return;
    }

    // Default: launch TUI
    if let Err(e) = run_tui(&cli, backend) {
        eprintln!("Error running TUI: {}", e);
        std::process::exit(1);
    }
}
