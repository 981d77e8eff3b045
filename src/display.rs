use colored::*;
use llmfit_view::FitLevel;
use llmfit_view::pipeline::{SystemView, TableView, ViewModel};
use llmfit_view::projector::{Bar, DetailView, RowView};
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Model")]
    name: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "tok/s")]
    tps: String,
    #[tabled(rename = "Quant")]
    quant: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Mem %")]
    mem_use: String,
    #[tabled(rename = "Context")]
    context: String,
    #[tabled(rename = "Inst")]
    installed: String,
}

impl From<&RowView> for ModelRow {
    fn from(r: &RowView) -> Self {
        ModelRow {
            status: format!("{} {}", r.fit_icon, r.fit_label),
            name: r.subtitle.clone(),
            provider: r.provider.clone(),
            size: r.params.clone(),
            score: r.score.clone(),
            tps: r.tps.clone(),
            quant: r.quant.clone(),
            mode: r.run_mode.clone(),
            mem_use: r.utilization.clone(),
            context: r.context.clone(),
            installed: if r.installed { "✓" } else { "" }.to_string(),
        }
    }
}

fn fit_color(level: FitLevel) -> Color {
    match level {
        FitLevel::Perfect => Color::Green,
        FitLevel::Good => Color::Yellow,
        FitLevel::Marginal => Color::TrueColor { r: 255, g: 165, b: 0 },
        FitLevel::TooTight => Color::Red,
    }
}

pub fn display_system(system: &SystemView) {
    println!("\n{}", "=== System Specifications ===".bold().cyan());
    match system {
        SystemView::Loading => println!("Detecting hardware..."),
        SystemView::Failed(reason) => {
            println!("{}", format!("Error loading system info: {}", reason).red())
        }
        SystemView::Loaded(p) => {
            println!("{}: {}", "CPU".bold(), p.cpu);
            println!("{}: {}", "RAM".bold(), p.ram);
            println!("{}: {}", "GPU".bold(), p.gpu);
            println!("{}: {}", "VRAM".bold(), p.vram);
            println!("{}: {}", "Backend".bold(), p.backend);
            println!("{}: {}", "Ollama".bold(), p.ollama);
        }
    }
    println!();
}

pub fn display_table(vm: &ViewModel, limit: Option<usize>) {
    let active = vm
        .columns
        .iter()
        .find(|c| c.sorted.is_some())
        .map(|c| format!("{}{}", c.label, c.arrow()))
        .unwrap_or_default();

    match &vm.table {
        TableView::Loading => {
            println!("\n{}", "Loading models...".dimmed());
        }
        TableView::Failed(reason) => {
            println!("\n{}", format!("Error loading models: {}", reason).red());
        }
        TableView::Empty => {
            println!("\n{}", "No models match the current filters.".yellow());
        }
        TableView::Rows(rows) => {
            println!("\n{}", "=== Model Compatibility Analysis ===".bold().cyan());
            match vm.active_filters {
                0 => println!("Sorted by {}\n", active),
                n => println!("Sorted by {}, {} filter(s) active\n", active, n),
            }
            let shown = limit.unwrap_or(rows.len()).min(rows.len());
            let table_rows: Vec<ModelRow> = rows[..shown].iter().map(ModelRow::from).collect();
            let table = Table::new(table_rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
    }
    println!("{}", vm.count_label.dimmed());
}

fn bar_line(bar: &Bar, width: usize) -> String {
    let filled = ((bar.fill_pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "  {:<8} {}{} {}",
        bar.label,
        "█".repeat(filled),
        "░".repeat(width - filled),
        bar.value
    )
}

pub fn display_model_detail(d: &DetailView) {
    println!("\n{}", format!("=== {} ===", d.title).bold().cyan());
    println!("{}", d.name.dimmed());
    println!();
    println!("{}: {}", "Provider".bold(), d.provider);
    println!("{}: {}", "Parameters".bold(), d.params);
    println!("{}: {}", "Quantization".bold(), d.quant);
    println!("{}: {}", "Context Length".bold(), d.context_tokens);
    println!("{}: {}", "Category".bold(), d.category);
    println!("{}: {}", "Use Case".bold(), d.use_case);
    println!(
        "{}: {}",
        "Installed".bold(),
        if d.installed { "yes" } else { "no" }
    );
    println!();

    println!("{}", "Fit Analysis:".bold().underline());
    println!(
        "  Status: {} {}",
        d.fit_icon,
        d.fit_label.color(fit_color(d.fit_level))
    );
    println!("  Score: {}", d.score);
    println!("  Run Mode: {}", d.run_mode);
    println!("  Speed: {}", d.tps);
    println!("  Memory: {}", d.memory);
    println!("{}", bar_line(&d.utilization, 30));
    println!();

    println!("{}", "Score Breakdown:".bold().underline());
    for bar in &d.score_bars {
        println!("{}", bar_line(bar, 30));
    }
    println!();

    if !d.notes.is_empty() {
        println!("{}", "Notes:".bold().underline());
        for note in &d.notes {
            println!("  {}", note);
        }
        println!();
    }
}
