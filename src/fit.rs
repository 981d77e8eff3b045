use serde::{Deserialize, Serialize};

/// Memory fit -- how well the model matches the available memory pool.
/// Computed upstream; this crate only displays, filters and sorts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitLevel {
    #[serde(alias = "perfect")]
    Perfect, // Recommended memory met on GPU
    #[serde(alias = "good")]
    Good, // Fits with headroom
    #[serde(alias = "marginal")]
    Marginal, // Minimum memory met but tight
    #[serde(alias = "tight", alias = "too_tight", alias = "Too Tight")]
    TooTight, // Does not fit in available memory
}

impl FitLevel {
    /// Severity order, best first. Used for filter option lists.
    pub const ALL: [FitLevel; 4] = [
        FitLevel::Perfect,
        FitLevel::Good,
        FitLevel::Marginal,
        FitLevel::TooTight,
    ];

    /// Wire identifier, also the value compared when sorting by fit level.
    pub fn as_str(&self) -> &'static str {
        match self {
            FitLevel::Perfect => "Perfect",
            FitLevel::Good => "Good",
            FitLevel::Marginal => "Marginal",
            FitLevel::TooTight => "TooTight",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            FitLevel::Perfect => "🟢",
            FitLevel::Good => "🟡",
            FitLevel::Marginal => "🟠",
            FitLevel::TooTight => "🔴",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            FitLevel::Perfect => "Perfect",
            FitLevel::Good => "Good",
            FitLevel::Marginal => "Marginal",
            FitLevel::TooTight => "Too Tight",
        }
    }
}

/// Execution path -- how inference will run on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunMode {
    #[serde(rename = "GPU", alias = "gpu", alias = "Gpu")]
    Gpu, // Fully loaded into VRAM
    #[serde(rename = "MoE", alias = "moe-offload", alias = "MoeOffload")]
    MoeOffload, // Active experts in VRAM, inactive offloaded to RAM
    #[serde(rename = "CPU+GPU", alias = "cpu-offload", alias = "CpuOffload")]
    CpuOffload, // Partial GPU offload, spills to system RAM
    #[serde(rename = "CPU", alias = "cpu-only", alias = "CpuOnly")]
    CpuOnly, // Entirely in system RAM
}

impl RunMode {
    /// Filter cycle order.
    pub const ALL: [RunMode; 4] = [
        RunMode::Gpu,
        RunMode::MoeOffload,
        RunMode::CpuOffload,
        RunMode::CpuOnly,
    ];

    pub fn text(&self) -> &'static str {
        match self {
            RunMode::Gpu => "GPU",
            RunMode::MoeOffload => "MoE",
            RunMode::CpuOffload => "CPU+GPU",
            RunMode::CpuOnly => "CPU",
        }
    }
}

/// One model-compatibility assessment as delivered by the backend.
///
/// Records are immutable once fetched. `name` is unique within a fetched set
/// and serves as both the row key and the selection key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFitRecord {
    pub name: String,
    pub provider: String,
    pub params: String,
    pub score: f64,
    pub fit_level: FitLevel,
    /// Icon glyph sent alongside the level. Empty means "use the level's own".
    #[serde(default)]
    pub fit_emoji: String,
    pub estimated_tps: f64,
    pub best_quant: String,
    pub run_mode: RunMode,
    /// `None` when the upstream memory pool was empty (unbounded utilization).
    #[serde(default)]
    pub utilization_pct: Option<f64>,
    pub context_length: u32,
    #[serde(default)]
    pub installed: bool,
    pub memory_required_gb: f64,
    pub memory_available_gb: f64,
    #[serde(alias = "score_fit")]
    pub score_memory: f64,
    pub score_speed: f64,
    pub score_quality: f64,
    pub score_context: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ModelFitRecord {
    pub fn fit_emoji(&self) -> &str {
        if self.fit_emoji.is_empty() {
            self.fit_level.emoji()
        } else {
            &self.fit_emoji
        }
    }

    pub fn fit_text(&self) -> &str {
        self.fit_level.text()
    }

    pub fn run_mode_text(&self) -> &str {
        self.run_mode.text()
    }

    /// Parameter count in billions, parsed from labels like "8B", "46.7B"
    /// or "500M". `None` for anything else (e.g. "8x7B").
    pub fn params_b(&self) -> Option<f64> {
        let label = self.params.trim();
        let (digits, scale) = match label.chars().last()?.to_ascii_uppercase() {
            'T' => (&label[..label.len() - 1], 1000.0),
            'B' => (&label[..label.len() - 1], 1.0),
            'M' => (&label[..label.len() - 1], 0.001),
            'K' => (&label[..label.len() - 1], 0.000_001),
            _ => return None,
        };
        digits.trim().parse::<f64>().ok().map(|n| n * scale)
    }

    /// Repo part of the name: everything after the last `/`.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A plausible record with neutral values; tests override what they need.
    pub fn record(name: &str) -> ModelFitRecord {
        ModelFitRecord {
            name: name.to_string(),
            provider: name.split('/').next().unwrap_or("unknown").to_string(),
            params: "7B".to_string(),
            score: 50.0,
            fit_level: FitLevel::Good,
            fit_emoji: String::new(),
            estimated_tps: 10.0,
            best_quant: "Q4_K_M".to_string(),
            run_mode: RunMode::Gpu,
            utilization_pct: Some(50.0),
            context_length: 8192,
            installed: false,
            memory_required_gb: 4.0,
            memory_available_gb: 8.0,
            score_memory: 15.0,
            score_speed: 15.0,
            score_quality: 15.0,
            score_context: 15.0,
            category: "General".to_string(),
            use_case: "General purpose".to_string(),
            notes: Vec::new(),
        }
    }
}
