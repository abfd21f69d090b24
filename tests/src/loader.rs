//! Loader for JSON fixtures.
//!
//! A fixture is a JSON object holding the rows of one source stream:
//!
//! ```json
//! {
//!   "columns": [{"name": "nom", "kind": "str"}, {"name": "age"}],
//!   "options": {"row_format": "record"},
//!   "rows": [{"nom": "j", "age": 10}]
//! }
//! ```
//!
//! `columns` and `options` are optional. Without `columns` the schema is
//! inferred from the first row; a column without `kind` is of unknown type.

use std::path::Path;

use serde::Deserialize;
use sqllike_core::ValueKind;
use sqllike_stream::{Row, RowStream, StreamOptions, StreamResult};

use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFile {
    #[serde(default)]
    columns: Option<Vec<ColumnDecl>>,
    #[serde(default)]
    options: StreamOptions,
    rows: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnDecl {
    name: String,
    #[serde(default)]
    kind: Option<String>,
}

/// The rows of one source stream, with its optional declared columns.
#[derive(Debug, Clone)]
pub struct Fixture {
    name: String,
    columns: Option<Vec<(String, ValueKind)>>,
    options: StreamOptions,
    rows: Vec<Row>,
}

impl Fixture {
    /// Parse a fixture from a JSON string.
    pub fn parse(name: &str, source: &str) -> HarnessResult<Self> {
        let file: FixtureFile = serde_json::from_str(source)
            .map_err(|e| HarnessError::fixture_parse(name, e.to_string()))?;

        let columns = match file.columns {
            Some(decls) => Some(
                decls
                    .into_iter()
                    .map(|decl| {
                        let kind = match decl.kind.as_deref() {
                            Some(k) => k
                                .parse::<ValueKind>()
                                .map_err(|e| HarnessError::fixture_parse(name, e))?,
                            None => ValueKind::Unknown,
                        };
                        Ok((decl.name, kind))
                    })
                    .collect::<HarnessResult<Vec<_>>>()?,
            ),
            None => None,
        };

        let rows = file
            .rows
            .iter()
            .enumerate()
            .map(|(i, json)| {
                Row::from_json(json).ok_or_else(|| {
                    HarnessError::fixture_parse(
                        name,
                        format!("row {} is not an object or array of scalars", i),
                    )
                })
            })
            .collect::<HarnessResult<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            columns,
            options: file.options,
            rows,
        })
    }

    /// Load a fixture file; its name is the file stem.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let source =
            std::fs::read_to_string(path).map_err(|e| HarnessError::file_read(path, e))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("<fixture>");
        Self::parse(name, &source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// A fresh stream over the fixture's rows.
    pub fn stream(&self) -> StreamResult<RowStream> {
        let rows = self.rows.clone();
        match &self.columns {
            Some(columns) => RowStream::new(columns.clone(), rows, self.options.clone()),
            None => RowStream::infer(rows, self.options.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqllike_core::Value;

    #[test]
    fn test_parse_inferred_fixture() {
        let fixture = Fixture::parse("p", r#"{"rows": [{"nom": "j", "age": 10}]}"#).unwrap();
        assert_eq!(fixture.rows().len(), 1);
        let stream = fixture.stream().unwrap();
        assert_eq!(stream.names(), ["nom", "age"]);
    }

    #[test]
    fn test_parse_declared_columns() {
        let source = r#"{
            "columns": [{"name": "age", "kind": "float"}, {"name": "nom"}],
            "options": {"row_format": "tuple"},
            "rows": [[10, "j"]]
        }"#;
        let fixture = Fixture::parse("p", source).unwrap();
        let stream = fixture.stream().unwrap();
        assert_eq!(stream.names(), ["age", "nom"]);
        assert_eq!(
            stream.column("age").unwrap().declared_kind(),
            ValueKind::Float
        );
        // Integers fit float columns unchanged.
        let rows = stream.collect_rows().unwrap();
        assert_eq!(rows, vec![Row::tuple([Value::Int(10), Value::from("j")])]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Fixture::parse("p", r#"{"rows": [1]}"#),
            Err(HarnessError::FixtureParse { .. })
        ));
        assert!(matches!(
            Fixture::parse("p", r#"{"columns": [{"name": "a", "kind": "bool"}], "rows": []}"#),
            Err(HarnessError::FixtureParse { .. })
        ));
        assert!(matches!(
            Fixture::parse("p", "not json"),
            Err(HarnessError::FixtureParse { .. })
        ));
    }
}
