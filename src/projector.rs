//! Record → display projection.
//!
//! Pure formatting: rounding, unit suffixes and bar widths. The underlying
//! records are never modified, and the full `name` is carried through as the
//! row key even where a shortened title is displayed.

use crate::fit::{FitLevel, ModelFitRecord};
use crate::hardware::SystemInfoRecord;

/// Sub-scores are reported on a 0-30 scale.
pub const SUB_SCORE_MAX: f64 = 30.0;

/// One table row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    /// Full record name; the selection key.
    pub key: String,
    pub title: String,
    pub subtitle: String,
    pub provider: String,
    pub params: String,
    pub score: String,
    pub fit_level: FitLevel,
    pub fit_icon: String,
    pub fit_label: String,
    pub tps: String,
    pub quant: String,
    pub run_mode: String,
    pub utilization: String,
    pub context: String,
    pub installed: bool,
    pub category: String,
    pub selected: bool,
}

/// A horizontal bar: numeric label plus a fill width in percent (0-100).
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub value: String,
    pub fill_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub key: String,
    pub title: String,
    pub name: String,
    pub provider: String,
    pub params: String,
    pub score: String,
    pub fit_level: FitLevel,
    pub fit_icon: String,
    pub fit_label: String,
    pub run_mode: String,
    pub quant: String,
    pub tps: String,
    pub context: String,
    pub context_tokens: String,
    pub memory: String,
    pub utilization: Bar,
    pub score_bars: [Bar; 4],
    pub category: String,
    pub use_case: String,
    pub installed: bool,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemPanel {
    pub cpu: String,
    pub ram: String,
    pub gpu: String,
    pub vram: String,
    pub backend: String,
    pub ollama: String,
}

pub fn project_row(r: &ModelFitRecord, selected: bool) -> RowView {
    RowView {
        key: r.name.clone(),
        title: r.short_name().to_string(),
        subtitle: r.name.clone(),
        provider: r.provider.clone(),
        params: r.params.clone(),
        score: format_score(r.score),
        fit_level: r.fit_level,
        fit_icon: r.fit_emoji().to_string(),
        fit_label: r.fit_text().to_string(),
        tps: format_tps(r.estimated_tps),
        quant: r.best_quant.clone(),
        run_mode: r.run_mode_text().to_string(),
        utilization: format_utilization(r.utilization_pct),
        context: format_context(r.context_length),
        installed: r.installed,
        category: r.category.clone(),
        selected,
    }
}

pub fn project_detail(r: &ModelFitRecord) -> DetailView {
    DetailView {
        key: r.name.clone(),
        title: r.short_name().to_string(),
        name: r.name.clone(),
        provider: r.provider.clone(),
        params: r.params.clone(),
        score: format_score(r.score),
        fit_level: r.fit_level,
        fit_icon: r.fit_emoji().to_string(),
        fit_label: r.fit_text().to_string(),
        run_mode: r.run_mode_text().to_string(),
        quant: r.best_quant.clone(),
        tps: format!("{} tok/s", format_tps(r.estimated_tps)),
        context: format_context(r.context_length),
        context_tokens: format!("{} tokens", r.context_length),
        memory: format!(
            "{} / {}",
            format_gb(r.memory_required_gb),
            format_gb(r.memory_available_gb)
        ),
        utilization: Bar {
            label: "Memory",
            value: format_utilization(r.utilization_pct),
            fill_pct: utilization_fill(r.utilization_pct),
        },
        score_bars: [
            sub_score_bar("Memory", r.score_memory),
            sub_score_bar("Speed", r.score_speed),
            sub_score_bar("Quality", r.score_quality),
            sub_score_bar("Context", r.score_context),
        ],
        category: r.category.clone(),
        use_case: r.use_case.clone(),
        installed: r.installed,
        notes: r.notes.clone(),
    }
}

pub fn project_system(s: &SystemInfoRecord) -> SystemPanel {
    let gpu = if s.has_gpu() {
        s.gpu.clone()
    } else {
        "None".to_string()
    };
    let vram = match (s.vram(), s.unified_memory) {
        (Some(v), true) => format!("{} (shared)", format_gb(v)),
        (Some(v), false) => format_gb(v),
        (None, _) => "N/A".to_string(),
    };
    let ollama = if s.ollama_available {
        format!("Running ({} installed)", s.ollama_installed_count)
    } else {
        "Not running".to_string()
    };
    SystemPanel {
        cpu: format!("{} ({} cores)", s.cpu, s.cores),
        ram: format_gb(s.ram_gb),
        gpu,
        vram,
        backend: s
            .gpu_backend
            .clone()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
        ollama,
    }
}

/// Round half away from zero at `decimals` places. All display formatters
/// share this rule.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

pub fn format_score(score: f64) -> String {
    format!("{:.0}", round_to(score, 0))
}

pub fn format_sub_score(score: f64) -> String {
    format!("{:.1}", round_to(score, 1))
}

pub fn format_tps(tps: f64) -> String {
    format!("{:.1}", round_to(tps, 1))
}

pub fn format_gb(gb: f64) -> String {
    format!("{:.1} GB", round_to(gb, 1))
}

/// Context window in thousands of tokens: 8192 → "8k".
pub fn format_context(tokens: u32) -> String {
    format!("{}k", round_to(f64::from(tokens) / 1000.0, 0))
}

/// Utilization label, uncapped: 143.7 → "143.7%".
pub fn format_utilization(pct: Option<f64>) -> String {
    match pct {
        Some(p) if p.is_finite() => format!("{:.1}%", round_to(p, 1)),
        _ => "N/A".to_string(),
    }
}

/// Bar width for utilization, clamped to [0, 100]. Unbounded is a full bar.
pub fn utilization_fill(pct: Option<f64>) -> f64 {
    match pct {
        Some(p) if !p.is_nan() => p.clamp(0.0, 100.0),
        _ => 100.0,
    }
}

/// Bar width for a 0-30 sub-score: `clamp(value / 30, 0, 1) * 100`.
pub fn sub_score_fill(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    (value / SUB_SCORE_MAX).clamp(0.0, 1.0) * 100.0
}

fn sub_score_bar(label: &'static str, value: f64) -> Bar {
    Bar {
        label,
        value: format_sub_score(value),
        fill_pct: sub_score_fill(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::test_support::record;

    #[test]
    fn halves_round_away_from_zero_everywhere() {
        assert_eq!(format_score(86.5), "87");
        assert_eq!(format_score(2.5), "3");
        assert_eq!(format_score(86.4), "86");
        assert_eq!(format_sub_score(0.25), "0.3");
        assert_eq!(format_tps(12.25), "12.3");
        assert_eq!(format_gb(4.45), "4.5");
        assert_eq!(format_utilization(Some(12.25)), "12.3%");
    }

    #[test]
    fn context_rounds_to_thousands() {
        assert_eq!(format_context(8192), "8k");
        assert_eq!(format_context(131072), "131k");
        assert_eq!(format_context(32768), "33k");
        assert_eq!(format_context(2048), "2k");
        assert_eq!(format_context(500), "1k");
        assert_eq!(format_context(2500), "3k");
    }

    #[test]
    fn utilization_label_uncapped_bar_capped() {
        assert_eq!(format_utilization(Some(143.7)), "143.7%");
        assert_eq!(utilization_fill(Some(143.7)), 100.0);
        assert_eq!(utilization_fill(Some(42.5)), 42.5);
        assert_eq!(utilization_fill(Some(-3.0)), 0.0);
        assert_eq!(format_utilization(None), "N/A");
        assert_eq!(utilization_fill(None), 100.0);
    }

    #[test]
    fn sub_score_fill_is_clamped_fraction_of_thirty() {
        assert_eq!(sub_score_fill(15.0), 50.0);
        assert_eq!(sub_score_fill(30.0), 100.0);
        assert_eq!(sub_score_fill(45.0), 100.0);
        assert_eq!(sub_score_fill(-1.0), 0.0);
        assert!((sub_score_fill(7.5) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn row_title_is_short_name_but_key_is_full() {
        let mut r = record("meta-llama/Llama-3.1-8B-Instruct");
        r.score = 87.6;
        r.estimated_tps = 42.25;
        let row = project_row(&r, true);
        assert_eq!(row.title, "Llama-3.1-8B-Instruct");
        assert_eq!(row.subtitle, "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(row.key, r.name);
        assert_eq!(row.score, "88");
        assert_eq!(row.context, "8k");
        assert!(row.selected);
    }

    #[test]
    fn detail_projection() {
        let mut r = record("org/m");
        r.utilization_pct = Some(143.7);
        r.memory_required_gb = 34.5;
        r.memory_available_gb = 24.0;
        r.score_memory = 12.0;
        r.notes = vec!["Insufficient VRAM".into()];
        let d = project_detail(&r);
        assert_eq!(d.utilization.value, "143.7%");
        assert_eq!(d.utilization.fill_pct, 100.0);
        assert_eq!(d.memory, "34.5 GB / 24.0 GB");
        assert_eq!(d.score_bars[0].value, "12.0");
        assert_eq!(d.score_bars[0].fill_pct, 40.0);
        assert_eq!(d.context_tokens, "8192 tokens");
        assert_eq!(d.notes, vec!["Insufficient VRAM"]);
    }

    #[test]
    fn system_panel_handles_absent_gpu() {
        let s = SystemInfoRecord {
            cpu: "Ryzen 9 7950X".into(),
            cores: 16,
            ram_gb: 63.7,
            gpu: "None".into(),
            gpu_backend: None,
            vram_gb: Some(0.0),
            unified_memory: false,
            ollama_available: true,
            ollama_installed_count: 3,
        };
        let p = project_system(&s);
        assert_eq!(p.cpu, "Ryzen 9 7950X (16 cores)");
        assert_eq!(p.ram, "63.7 GB");
        assert_eq!(p.gpu, "None");
        assert_eq!(p.vram, "N/A");
        assert_eq!(p.backend, "N/A");
        assert_eq!(p.ollama, "Running (3 installed)");
    }

    #[test]
    fn system_panel_unified_memory() {
        let s = SystemInfoRecord {
            cpu: "Apple M3 Max".into(),
            cores: 14,
            ram_gb: 36.0,
            gpu: "Apple M3 Max".into(),
            gpu_backend: Some("Metal".into()),
            vram_gb: Some(27.0),
            unified_memory: true,
            ollama_available: false,
            ollama_installed_count: 0,
        };
        let p = project_system(&s);
        assert_eq!(p.vram, "27.0 GB (shared)");
        assert_eq!(p.backend, "Metal");
        assert_eq!(p.ollama, "Not running");
    }
}
