#![allow(dead_code)]

use llmfit_view::{BackendError, Event, FitLevel, ModelFitRecord, Session};

/// Build a record through the wire format so tests exercise deserialization too.
pub fn record(name: &str, score: f64, fit_level: FitLevel, installed: bool) -> ModelFitRecord {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "provider": name.split('/').next().unwrap_or(name),
        "params": "7B",
        "score": score,
        "fit_level": fit_level.as_str(),
        "estimated_tps": score / 2.0,
        "best_quant": "Q4_K_M",
        "run_mode": "GPU",
        "utilization_pct": 60.0,
        "context_length": 8192,
        "installed": installed,
        "memory_required_gb": 4.0,
        "memory_available_gb": 8.0,
        "score_fit": 20.0,
        "score_speed": 15.0,
        "score_quality": 25.0,
        "score_context": 10.0,
        "category": "General",
        "use_case": "General purpose",
        "notes": []
    }))
    .expect("valid record")
}

pub fn loaded(records: Vec<ModelFitRecord>) -> Session {
    let mut session = Session::default();
    session.apply(Event::ModelFitsFetched(Ok(records)));
    session
}

pub fn transport_error(command: &'static str) -> BackendError {
    BackendError::Transport {
        command,
        details: "connection refused".to_string(),
    }
}
