use std::cmp::Ordering;

use crate::fit::ModelFitRecord;

/// Record fields the table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum SortKey {
    Name,
    Provider,
    Params,
    #[default]
    Score,
    FitLevel,
    EstimatedTps,
    BestQuant,
    RunMode,
    UtilizationPct,
    ContextLength,
    Installed,
    MemoryRequiredGb,
    MemoryAvailableGb,
    ScoreMemory,
    ScoreSpeed,
    ScoreQuality,
    ScoreContext,
    Category,
    UseCase,
}

/// Runtime value of a sort field. Comparison rules depend on the variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Bool(bool),
    Number(f64),
}

impl SortKey {
    /// Columns shown in the table, left to right.
    pub const TABLE_COLUMNS: [SortKey; 10] = [
        SortKey::Name,
        SortKey::Params,
        SortKey::Score,
        SortKey::FitLevel,
        SortKey::EstimatedTps,
        SortKey::BestQuant,
        SortKey::RunMode,
        SortKey::UtilizationPct,
        SortKey::ContextLength,
        SortKey::Installed,
    ];

    /// Field name as it appears on the wire.
    pub fn field_name(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Provider => "provider",
            SortKey::Params => "params",
            SortKey::Score => "score",
            SortKey::FitLevel => "fit_level",
            SortKey::EstimatedTps => "estimated_tps",
            SortKey::BestQuant => "best_quant",
            SortKey::RunMode => "run_mode",
            SortKey::UtilizationPct => "utilization_pct",
            SortKey::ContextLength => "context_length",
            SortKey::Installed => "installed",
            SortKey::MemoryRequiredGb => "memory_required_gb",
            SortKey::MemoryAvailableGb => "memory_available_gb",
            SortKey::ScoreMemory => "score_memory",
            SortKey::ScoreSpeed => "score_speed",
            SortKey::ScoreQuality => "score_quality",
            SortKey::ScoreContext => "score_context",
            SortKey::Category => "category",
            SortKey::UseCase => "use_case",
        }
    }

    /// Column header text.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Model",
            SortKey::Provider => "Provider",
            SortKey::Params => "Params",
            SortKey::Score => "Score",
            SortKey::FitLevel => "Fit",
            SortKey::EstimatedTps => "tok/s",
            SortKey::BestQuant => "Quant",
            SortKey::RunMode => "Mode",
            SortKey::UtilizationPct => "Mem %",
            SortKey::ContextLength => "Context",
            SortKey::Installed => "Installed",
            SortKey::MemoryRequiredGb => "Mem Req",
            SortKey::MemoryAvailableGb => "Mem Avail",
            SortKey::ScoreMemory => "Memory",
            SortKey::ScoreSpeed => "Speed",
            SortKey::ScoreQuality => "Quality",
            SortKey::ScoreContext => "Ctx Score",
            SortKey::Category => "Category",
            SortKey::UseCase => "Use Case",
        }
    }

    pub fn value<'a>(&self, r: &'a ModelFitRecord) -> FieldValue<'a> {
        match self {
            SortKey::Name => FieldValue::Text(&r.name),
            SortKey::Provider => FieldValue::Text(&r.provider),
            SortKey::Params => FieldValue::Text(&r.params),
            SortKey::Score => FieldValue::Number(r.score),
            SortKey::FitLevel => FieldValue::Text(r.fit_level.as_str()),
            SortKey::EstimatedTps => FieldValue::Number(r.estimated_tps),
            SortKey::BestQuant => FieldValue::Text(&r.best_quant),
            SortKey::RunMode => FieldValue::Text(r.run_mode.text()),
            // Unbounded utilization sorts above every finite value.
            SortKey::UtilizationPct => {
                FieldValue::Number(r.utilization_pct.unwrap_or(f64::INFINITY))
            }
            SortKey::ContextLength => FieldValue::Number(f64::from(r.context_length)),
            SortKey::Installed => FieldValue::Bool(r.installed),
            SortKey::MemoryRequiredGb => FieldValue::Number(r.memory_required_gb),
            SortKey::MemoryAvailableGb => FieldValue::Number(r.memory_available_gb),
            SortKey::ScoreMemory => FieldValue::Number(r.score_memory),
            SortKey::ScoreSpeed => FieldValue::Number(r.score_speed),
            SortKey::ScoreQuality => FieldValue::Number(r.score_quality),
            SortKey::ScoreContext => FieldValue::Number(r.score_context),
            SortKey::Category => FieldValue::Text(&r.category),
            SortKey::UseCase => FieldValue::Text(&r.use_case),
        }
    }

    /// Next table column, wrapping. Keys outside the table restart at the first column.
    pub fn next_column(&self) -> SortKey {
        let cols = SortKey::TABLE_COLUMNS;
        match cols.iter().position(|k| k == self) {
            Some(i) => cols[(i + 1) % cols.len()],
            None => cols[0],
        }
    }

    pub fn prev_column(&self) -> SortKey {
        let cols = SortKey::TABLE_COLUMNS;
        match cols.iter().position(|k| k == self) {
            Some(0) | None => cols[cols.len() - 1],
            Some(i) => cols[i - 1],
        }
    }
}

/// Active sort column and direction. Defaults to score, descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortState {
    /// Header click: same key flips direction, a new key starts descending.
    pub fn click(self, key: SortKey) -> SortState {
        if key == self.key {
            SortState {
                key,
                ascending: !self.ascending,
            }
        } else {
            SortState {
                key,
                ascending: false,
            }
        }
    }

    /// Ordering of `a` relative to `b` under this sort.
    ///
    /// Descending order swaps the operands rather than reversing the result.
    pub fn compare(&self, a: &ModelFitRecord, b: &ModelFitRecord) -> Ordering {
        let (first, second) = if self.ascending { (a, b) } else { (b, a) };
        compare_values(self.key.value(first), self.key.value(second))
    }

    /// A new, stably sorted ordering of `rows`. Ties keep their input order.
    pub fn sorted<'a>(&self, rows: &[&'a ModelFitRecord]) -> Vec<&'a ModelFitRecord> {
        let mut out = rows.to_vec();
        out.sort_by(|a, b| self.compare(a, b));
        out
    }
}

fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => compare_text(x, y),
        (x, y) => as_number(x).total_cmp(&as_number(y)),
    }
}

/// Case-insensitive comparison: code-point order after Unicode lowercase
/// folding, not locale collation. Strings that differ only in case compare
/// equal, so the stable sort keeps their order.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn as_number(v: FieldValue<'_>) -> f64 {
    match v {
        FieldValue::Number(n) => n,
        FieldValue::Bool(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        // Only reachable if a key mixes kinds; text has no numeric value.
        FieldValue::Text(_) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::test_support::record;

    fn names(rows: &[&ModelFitRecord]) -> Vec<String> {
        rows.iter().map(|r| r.name.clone()).collect()
    }

    fn scored(name: &str, score: f64) -> ModelFitRecord {
        let mut r = record(name);
        r.score = score;
        r
    }

    #[test]
    fn default_is_score_descending() {
        let records = [scored("a", 10.0), scored("b", 90.0), scored("c", 50.0)];
        let rows: Vec<_> = records.iter().collect();
        let sorted = SortState::default().sorted(&rows);
        assert_eq!(names(&sorted), vec!["b", "c", "a"]);
        // input untouched
        assert_eq!(names(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn text_sort_ignores_case() {
        let records = [record("Zeta"), record("alpha"), record("Mid")];
        let rows: Vec<_> = records.iter().collect();
        let asc = SortState {
            key: SortKey::Name,
            ascending: true,
        };
        assert_eq!(names(&asc.sorted(&rows)), vec!["alpha", "Mid", "Zeta"]);
        let desc = SortState {
            key: SortKey::Name,
            ascending: false,
        };
        assert_eq!(names(&desc.sorted(&rows)), vec!["Zeta", "Mid", "alpha"]);
    }

    #[test]
    fn booleans_sort_as_numbers() {
        let mut yes = record("yes");
        yes.installed = true;
        let no = record("no");
        let records = [no, yes];
        let rows: Vec<_> = records.iter().collect();
        let desc = SortState {
            key: SortKey::Installed,
            ascending: false,
        };
        assert_eq!(names(&desc.sorted(&rows)), vec!["yes", "no"]);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let records = [scored("first", 70.0), scored("second", 70.0), scored("top", 99.0)];
        let rows: Vec<_> = records.iter().collect();
        let desc = SortState::default();
        assert_eq!(names(&desc.sorted(&rows)), vec!["top", "first", "second"]);
        let asc = desc.click(SortKey::Score);
        assert_eq!(names(&asc.sorted(&rows)), vec!["first", "second", "top"]);
    }

    #[test]
    fn unbounded_utilization_sorts_highest() {
        let mut inf = record("inf");
        inf.utilization_pct = None;
        let mut big = record("big");
        big.utilization_pct = Some(400.0);
        let records = [big, inf];
        let rows: Vec<_> = records.iter().collect();
        let desc = SortState::default().click(SortKey::UtilizationPct);
        assert_eq!(names(&desc.sorted(&rows)), vec!["inf", "big"]);
    }

    #[test]
    fn click_same_key_flips_and_new_key_resets() {
        let s = SortState::default();
        let s = s.click(SortKey::Score);
        assert!(s.ascending);
        let s = s.click(SortKey::Score);
        assert!(!s.ascending);

        let s = SortState {
            key: SortKey::Name,
            ascending: true,
        };
        let s = s.click(SortKey::EstimatedTps);
        assert_eq!(s.key, SortKey::EstimatedTps);
        assert!(!s.ascending);
    }

    #[test]
    fn column_cycle_wraps() {
        assert_eq!(SortKey::Name.next_column(), SortKey::Params);
        assert_eq!(SortKey::Installed.next_column(), SortKey::Name);
        assert_eq!(SortKey::Name.prev_column(), SortKey::Installed);
        assert_eq!(SortKey::UseCase.next_column(), SortKey::Name);
    }
}
