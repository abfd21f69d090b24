//! Stream configuration.

use serde::{Deserialize, Serialize};

/// Shape of the rows a stream yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowFormat {
    /// Name to value mappings.
    #[default]
    Record,
    /// Positional tuples in schema order.
    Tuple,
}

/// Options of a stream. Stage outputs inherit the options of their input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    pub row_format: RowFormat,
}

impl StreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options yielding positional tuples.
    pub fn tuples() -> Self {
        Self::new().with_row_format(RowFormat::Tuple)
    }

    pub fn with_row_format(mut self, row_format: RowFormat) -> Self {
        self.row_format = row_format;
        self
    }

    /// Parse options from JSON, e.g. `{"row_format": "tuple"}`.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
