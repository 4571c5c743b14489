//! A single run-log row: ordered `(column, value)` pairs.

use serde::{Deserialize, Serialize};
use subprompt_core::WeightedPrompt;

/// Separator between sub-prompt texts in the `subprompts` column.
pub const SUBPROMPT_SEPARATOR: &str = " | ";
/// Separator between weights in the `weights` column.
pub const WEIGHT_SEPARATOR: &str = ";";

/// One run's parameters, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    columns: Vec<(String, String)>,
}

impl RunRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any earlier value for the same name.
    pub fn with(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl ToString) {
        let column = column.into();
        let value = value.to_string();
        match self.columns.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Record a prompt together with its tokenized sub-prompts and weights.
    pub fn from_prompt(prompt: &str, weighted: &WeightedPrompt) -> Self {
        let weights = weighted
            .weights()
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(WEIGHT_SEPARATOR);

        Self::new()
            .with("prompt", prompt)
            .with("subprompts", weighted.texts().join(SUBPROMPT_SEPARATOR))
            .with("weights", weights)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Move a column to the front (used for the run id and timestamp).
    pub(crate) fn prepend(&mut self, column: impl Into<String>, value: impl ToString) {
        let column = column.into();
        self.columns.retain(|(c, _)| *c != column);
        self.columns.insert(0, (column, value.to_string()));
    }
}
