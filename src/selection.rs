use crate::fit::ModelFitRecord;

/// Which record, if any, is focused in the detail panel.
///
/// Keyed by record name, not by row position, so it is independent of the
/// current filter and sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Selected(String),
}

impl Selection {
    pub fn select(name: impl Into<String>) -> Self {
        Selection::Selected(name.into())
    }

    /// Close control or Escape. Closing an empty selection is a no-op.
    pub fn close(self) -> Self {
        Selection::None
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Selected(name) => Some(name),
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.key() == Some(name)
    }

    /// Drop the selection when `records` no longer contains its key.
    pub fn revalidate(self, records: &[ModelFitRecord]) -> Self {
        match self {
            Selection::Selected(name) if records.iter().any(|r| r.name == name) => {
                Selection::Selected(name)
            }
            _ => Selection::None,
        }
    }

    /// Resolve against the full (unfiltered) record set.
    pub fn resolve<'a>(&self, records: &'a [ModelFitRecord]) -> Option<&'a ModelFitRecord> {
        let key = self.key()?;
        records.iter().find(|r| r.name == key)
    }
}
