use std::collections::BTreeSet;

use crate::fit::{FitLevel, ModelFitRecord, RunMode};

/// Threshold steps offered by the terminal front end, loosest first.
pub const SCORE_STEPS: &[f64] = &[30.0, 50.0, 60.0, 70.0, 80.0, 90.0];
pub const TPS_STEPS: &[f64] = &[5.0, 10.0, 20.0, 30.0, 50.0, 100.0];
pub const PARAMS_STEPS: &[f64] = &[1.0, 3.0, 7.0, 13.0, 30.0, 70.0];
pub const MEM_PCT_STEPS: &[f64] = &[200.0, 100.0, 90.0, 80.0, 70.0, 50.0];
pub const CONTEXT_K_STEPS: &[f64] = &[4.0, 8.0, 16.0, 32.0, 64.0, 128.0];

/// Per-column bounds and selectors. `None` on a field means no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFilters {
    pub min_score: Option<f64>,
    pub min_tps: Option<f64>,
    /// Lower bound in billions. Records whose params label doesn't parse fail it.
    pub min_params_b: Option<f64>,
    /// Upper bound on utilization. Records without utilization fail it.
    pub max_mem_pct: Option<f64>,
    /// Lower bound in thousands of tokens.
    pub min_context_k: Option<f64>,
    pub run_mode: Option<RunMode>,
    /// Exact quantization label.
    pub quant: Option<String>,
    /// Case-insensitive substring of the use-case description.
    pub use_case: Option<String>,
}

impl ColumnFilters {
    pub fn matches(&self, record: &ModelFitRecord) -> bool {
        at_least(self.min_score, Some(record.score))
            && at_least(self.min_tps, Some(record.estimated_tps))
            && at_least(self.min_params_b, record.params_b())
            && at_most(self.max_mem_pct, record.utilization_pct)
            && at_least(
                self.min_context_k,
                Some(f64::from(record.context_length) / 1000.0),
            )
            && self.run_mode.is_none_or(|mode| record.run_mode == mode)
            && self
                .quant
                .as_deref()
                .is_none_or(|quant| record.best_quant == quant)
            && self.use_case.as_deref().is_none_or(|needle| {
                record
                    .use_case
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }

    pub fn active_count(&self) -> usize {
        [
            self.min_score.is_some(),
            self.min_tps.is_some(),
            self.min_params_b.is_some(),
            self.max_mem_pct.is_some(),
            self.min_context_k.is_some(),
            self.run_mode.is_some(),
            self.quant.is_some(),
            self.use_case.is_some(),
        ]
        .iter()
        .filter(|&&a| a)
        .count()
    }
}

fn at_least(bound: Option<f64>, value: Option<f64>) -> bool {
    match (bound, value) {
        (None, _) => true,
        (Some(b), Some(v)) => v >= b,
        (Some(_), None) => false,
    }
}

fn at_most(bound: Option<f64>, value: Option<f64>) -> bool {
    match (bound, value) {
        (None, _) => true,
        (Some(b), Some(v)) => v <= b,
        (Some(_), None) => false,
    }
}

/// User-controlled row filters. `Default` is "no filter" on every axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub search_text: String,
    pub fit_level: Option<FitLevel>,
    pub category: Option<String>,
    pub installed_only: bool,
    /// Providers to show. Empty shows every provider.
    pub providers: BTreeSet<String>,
    pub columns: ColumnFilters,
}

impl Filters {
    /// True iff the record satisfies every active predicate.
    ///
    /// Cheap flag and enum checks run first; the lowercase substring search
    /// runs last.
    pub fn matches(&self, record: &ModelFitRecord) -> bool {
        self.matches_installed(record)
            && self.matches_fit_level(record)
            && self.matches_category(record)
            && self.matches_provider(record)
            && self.columns.matches(record)
            && self.matches_search(record)
    }

    pub fn matches_search(&self, record: &ModelFitRecord) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        record.name.to_lowercase().contains(&needle)
            || record.provider.to_lowercase().contains(&needle)
    }

    pub fn matches_fit_level(&self, record: &ModelFitRecord) -> bool {
        self.fit_level.is_none_or(|level| record.fit_level == level)
    }

    pub fn matches_category(&self, record: &ModelFitRecord) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| record.category == category)
    }

    pub fn matches_installed(&self, record: &ModelFitRecord) -> bool {
        !self.installed_only || record.installed
    }

    pub fn matches_provider(&self, record: &ModelFitRecord) -> bool {
        self.providers.is_empty() || self.providers.contains(&record.provider)
    }

    /// Number of constrained axes. Each column filter counts on its own.
    pub fn active_count(&self) -> usize {
        [
            !self.search_text.is_empty(),
            self.fit_level.is_some(),
            self.category.is_some(),
            self.installed_only,
            !self.providers.is_empty(),
        ]
        .iter()
        .filter(|&&a| a)
        .count()
            + self.columns.active_count()
    }

/// Records passing all filters, in input order.
    pub fn apply<'a>(&self, records: &'a [ModelFitRecord]) -> Vec<&'a ModelFitRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Distinct categories present in the record set, sorted.
pub fn category_options(records: &[ModelFitRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.category.clone())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct providers present in the record set, sorted.
pub fn provider_options(records: &[ModelFitRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.provider.clone())
        .filter(|p| !p.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct quantization labels present in the record set, sorted.
pub fn quant_options(records: &[ModelFitRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.best_quant.clone())
        .filter(|q| !q.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fit levels present in the record set, best first.
pub fn fit_level_options(records: &[ModelFitRecord]) -> Vec<FitLevel> {
    FitLevel::ALL
        .into_iter()
        .filter(|level| records.iter().any(|r| r.fit_level == *level))
        .collect()
}

/// Next value in a filter cycle: all → first → ... → last → all. A current
/// value that is no longer offered resets to "all".
pub fn cycle_option<T: PartialEq + Clone>(current: Option<&T>, options: &[T]) -> Option<T> {
    let next = match current.map(|c| options.iter().position(|o| o == c)) {
        None => 0,
        Some(None) => return None,
        Some(Some(i)) => i + 1,
    };
    options.get(next).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::test_support::record;

    fn sample() -> Vec<ModelFitRecord> {
        let mut a = record("meta-llama/Llama-3.1-8B");
        a.provider = "Meta".into();
        a.category = "Chat".into();
        a.installed = true;
        let mut b = record("Qwen/Qwen2.5-Coder-7B");
        b.provider = "Alibaba".into();
        b.category = "Coding".into();
        b.fit_level = FitLevel::Perfect;
        let mut c = record("mistralai/Mistral-7B");
        c.provider = "Mistral AI".into();
        c.category = "Chat".into();
        c.fit_level = FitLevel::TooTight;
        vec![a, b, c]
    }

    fn names(rows: Vec<&ModelFitRecord>) -> Vec<&str> {
        rows.into_iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn default_filters_pass_everything() {
        let records = sample();
        assert_eq!(Filters::default().apply(&records).len(), 3);
        assert_eq!(Filters::default().active_count(), 0);
    }

    #[test]
    fn search_is_case_insensitive_on_name_or_provider() {
        let records = sample();
        let f = Filters {
            search_text: "QWEN".into(),
            ..Filters::default()
        };
        assert_eq!(names(f.apply(&records)), vec!["Qwen/Qwen2.5-Coder-7B"]);

        let f = Filters {
            search_text: "mistral ai".into(),
            ..Filters::default()
        };
        assert_eq!(names(f.apply(&records)), vec!["mistralai/Mistral-7B"]);
    }

    #[test]
    fn search_does_not_look_at_other_fields() {
        let records = sample();
        let f = Filters {
            search_text: "coding".into(),
            ..Filters::default()
        };
        assert!(f.apply(&records).is_empty());
    }

    #[test]
    fn predicates_compose_conjunctively() {
        let records = sample();
        let f = Filters {
            category: Some("Chat".into()),
            installed_only: true,
            ..Filters::default()
        };
        assert_eq!(names(f.apply(&records)), vec!["meta-llama/Llama-3.1-8B"]);
        assert_eq!(f.active_count(), 2);

        let f = Filters {
            category: Some("Chat".into()),
            fit_level: Some(FitLevel::Perfect),
            ..Filters::default()
        };
        assert!(f.apply(&records).is_empty());
    }

    #[test]
    fn category_match_is_exact() {
        let records = sample();
        let f = Filters {
            category: Some("chat".into()),
            ..Filters::default()
        };
        assert!(f.apply(&records).is_empty());
    }

    #[test]
    fn option_lists() {
        let records = sample();
        assert_eq!(category_options(&records), vec!["Chat", "Coding"]);
        assert_eq!(
            fit_level_options(&records),
            vec![FitLevel::Perfect, FitLevel::Good, FitLevel::TooTight]
        );
    }

    #[test]
    fn provider_filter_is_a_set() {
        let records = sample();
        let mut f = Filters::default();
        f.providers.insert("Meta".into());
        f.providers.insert("Alibaba".into());
        assert_eq!(
            names(f.apply(&records)),
            vec!["meta-llama/Llama-3.1-8B", "Qwen/Qwen2.5-Coder-7B"]
        );
        assert_eq!(f.active_count(), 1);
        assert_eq!(provider_options(&records), vec!["Alibaba", "Meta", "Mistral AI"]);
    }

    #[test]
    fn numeric_column_bounds() {
        let mut records = sample();
        records[0].score = 91.0;
        records[1].score = 70.0;
        records[2].score = 40.0;
        records[1].utilization_pct = None;
        records[2].params = "46.7B".into();

        let f = Filters {
            columns: ColumnFilters {
                min_score: Some(70.0),
                ..ColumnFilters::default()
            },
            ..Filters::default()
        };
        assert_eq!(
            names(f.apply(&records)),
            vec!["meta-llama/Llama-3.1-8B", "Qwen/Qwen2.5-Coder-7B"]
        );

        // Missing utilization fails an upper bound.
        let f = Filters {
            columns: ColumnFilters {
                max_mem_pct: Some(100.0),
                ..ColumnFilters::default()
            },
            ..Filters::default()
        };
        assert_eq!(f.apply(&records).len(), 2);
        assert!(f.apply(&records).iter().all(|r| r.name != "Qwen/Qwen2.5-Coder-7B"));

        let f = Filters {
            columns: ColumnFilters {
                min_params_b: Some(13.0),
                min_context_k: Some(8.0),
                ..ColumnFilters::default()
            },
            ..Filters::default()
        };
        assert_eq!(names(f.apply(&records)), vec!["mistralai/Mistral-7B"]);
        assert_eq!(f.active_count(), 2);
    }

    #[test]
    fn column_selectors() {
        let mut records = sample();
        records[0].run_mode = RunMode::CpuOnly;
        records[1].best_quant = "Q8_0".into();
        records[2].use_case = "Code generation and completion".into();

        let by_mode = Filters {
            columns: ColumnFilters {
                run_mode: Some(RunMode::CpuOnly),
                ..ColumnFilters::default()
            },
            ..Filters::default()
        };
        assert_eq!(names(by_mode.apply(&records)), vec!["meta-llama/Llama-3.1-8B"]);

        let by_quant = Filters {
            columns: ColumnFilters {
                quant: Some("Q8_0".into()),
                ..ColumnFilters::default()
            },
            ..Filters::default()
        };
        assert_eq!(names(by_quant.apply(&records)), vec!["Qwen/Qwen2.5-Coder-7B"]);
        assert_eq!(quant_options(&records), vec!["Q4_K_M", "Q8_0"]);

        let by_use_case = Filters {
            columns: ColumnFilters {
                use_case: Some("CODE".into()),
                ..ColumnFilters::default()
            },
            ..Filters::default()
        };
        assert_eq!(names(by_use_case.apply(&records)), vec!["mistralai/Mistral-7B"]);
    }

    #[test]
    fn option_cycles() {
        let opts = vec!["Chat".to_string(), "Coding".to_string()];
        let chat = "Chat".to_string();
        let coding = "Coding".to_string();
        assert_eq!(cycle_option(None, &opts), Some(chat.clone()));
        assert_eq!(cycle_option(Some(&chat), &opts), Some(coding.clone()));
        assert_eq!(cycle_option(Some(&coding), &opts), None);
        // A value that vanished after a refresh resets to "all".
        assert_eq!(cycle_option(Some(&"Vision".to_string()), &opts), None);
        assert_eq!(cycle_option::<String>(None, &[]), None);

        assert_eq!(cycle_option(None, SCORE_STEPS), Some(30.0));
        assert_eq!(cycle_option(Some(&90.0), SCORE_STEPS), None);

        let mut mode = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            mode = cycle_option(mode.as_ref(), &RunMode::ALL);
            seen.push(mode);
        }
        assert_eq!(seen[0], Some(RunMode::Gpu));
        assert_eq!(seen[3], Some(RunMode::CpuOnly));
        assert_eq!(seen[4], None);
    }
}
