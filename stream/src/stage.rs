//! Pipeline stage vocabulary.
//!
//! Describes the stages for consumers that translate pipelines rather than
//! run them, such as code generators.

use std::fmt;

/// The five pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Project,
    Filter,
    Sort,
    Group,
    Union,
}

/// Number of rows a stage emits relative to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OnePerInput,
    AtMostOnePerInput,
    OnePerDistinctKey,
    SumOfInputs,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::Project,
        StageKind::Filter,
        StageKind::Sort,
        StageKind::Group,
        StageKind::Union,
    ];

    /// Pseudo-SQL keyword of the stage.
    pub fn keyword(&self) -> &'static str {
        match self {
            StageKind::Project => "select",
            StageKind::Filter => "where",
            StageKind::Sort => "orderby",
            StageKind::Group => "groupby",
            StageKind::Union => "unionall",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            StageKind::Project | StageKind::Sort => Cardinality::OnePerInput,
            StageKind::Filter => Cardinality::AtMostOnePerInput,
            StageKind::Group => Cardinality::OnePerDistinctKey,
            StageKind::Union => Cardinality::SumOfInputs,
        }
    }

    /// Whether the stage drains its whole input before emitting.
    pub fn materializes(&self) -> bool {
        matches!(self, StageKind::Sort | StageKind::Group)
    }

    /// Whether aggregate expressions may appear in the stage.
    pub fn accepts_aggregates(&self) -> bool {
        matches!(self, StageKind::Group)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
