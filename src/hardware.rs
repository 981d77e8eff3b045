use serde::{Deserialize, Serialize};

/// Host capabilities as reported by the backend's hardware probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfoRecord {
    pub cpu: String,
    pub cores: usize,
    pub ram_gb: f64,
    /// GPU name. The backend sends "None" when no GPU was detected.
    #[serde(default)]
    pub gpu: String,
    #[serde(default)]
    pub gpu_backend: Option<String>,
    #[serde(default)]
    pub vram_gb: Option<f64>,
    #[serde(default)]
    pub unified_memory: bool, // Apple Silicon: GPU shares system RAM
    #[serde(default)]
    pub ollama_available: bool,
    #[serde(default)]
    pub ollama_installed_count: usize,
}

impl SystemInfoRecord {
    pub fn has_gpu(&self) -> bool {
        let gpu = self.gpu.trim();
        !gpu.is_empty() && !gpu.eq_ignore_ascii_case("none")
    }

    /// Dedicated VRAM, treating zero as "no VRAM".
    pub fn vram(&self) -> Option<f64> {
        self.vram_gb.filter(|v| *v > 0.0)
    }
}
