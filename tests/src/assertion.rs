//! Assertion types and builders for verifying step results.

use std::collections::HashMap;

use sqllike_core::Value;

use crate::error::{HarnessError, HarnessResult};

/// Expected fields of a row, keyed by column name.
pub type ExpectedRow = HashMap<String, Value>;

/// What a pipeline produced: its column names and its rows in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Output {
    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r[idx].clone()).collect())
    }
}

/// A complete assertion for a step result.
#[derive(Default)]
pub struct Assertion {
    pub columns: Option<Vec<String>>,

    pub rows: Option<usize>,
    pub empty: Option<bool>,
    pub returns: Option<Vec<ExpectedRow>>,
    pub ordered: bool,
    pub first: Option<ExpectedRow>,
    pub last: Option<ExpectedRow>,

    pub error: Option<String>,
    pub error_pattern: Option<String>,

    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&Output) -> bool>>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .field("empty", &self.empty)
            .field("returns", &self.returns)
            .field("ordered", &self.ordered)
            .field("error", &self.error)
            .field("error_pattern", &self.error_pattern)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Assertion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the assertion against a step result.
    ///
    /// Pipeline failures arrive as their rendered message.
    pub fn verify(&self, step: &str, result: &Result<Output, String>) -> HarnessResult<()> {
        if let Some(ref expected_error) = self.error {
            return match result {
                Err(msg) if msg.contains(expected_error.as_str()) => Ok(()),
                Err(msg) => Err(HarnessError::assertion_failed(
                    step,
                    format!("expected error containing '{}', got: {}", expected_error, msg),
                )),
                Ok(_) => Err(HarnessError::assertion_failed(
                    step,
                    format!(
                        "expected error containing '{}', but step succeeded",
                        expected_error
                    ),
                )),
            };
        }

        if let Some(ref pattern) = self.error_pattern {
            let re = regex_lite::Regex::new(pattern).map_err(|e| {
                HarnessError::assertion_failed(step, format!("invalid regex pattern: {}", e))
            })?;
            return match result {
                Err(msg) if re.is_match(msg) => Ok(()),
                Err(msg) => Err(HarnessError::assertion_failed(
                    step,
                    format!("expected error matching /{}/, got: {}", pattern, msg),
                )),
                Ok(_) => Err(HarnessError::assertion_failed(
                    step,
                    format!("expected error matching /{}/, but step succeeded", pattern),
                )),
            };
        }

        match result {
            Ok(output) => self.verify_output(step, output),
            Err(msg) => Err(HarnessError::assertion_failed(
                step,
                format!("step failed: {}", msg),
            )),
        }
    }

    fn verify_output(&self, step: &str, result: &Output) -> HarnessResult<()> {
        if let Some(ref expected_columns) = self.columns {
            if result.columns != *expected_columns {
                return Err(HarnessError::assertion_failed(
                    step,
                    format!(
                        "column mismatch:\n  expected: {:?}\n  actual:   {:?}",
                        expected_columns, result.columns
                    ),
                ));
            }
        }

        if let Some(expected) = self.rows {
            if result.rows.len() != expected {
                return Err(HarnessError::assertion_failed(
                    step,
                    format!("expected {} rows, got {}", expected, result.rows.len()),
                ));
            }
        }

        if let Some(expected_empty) = self.empty {
            if result.rows.is_empty() != expected_empty {
                return Err(HarnessError::assertion_failed(
                    step,
                    format!(
                        "expected {}empty, got {} rows",
                        if expected_empty { "" } else { "non-" },
                        result.rows.len()
                    ),
                ));
            }
        }

        if let Some(ref expected_rows) = self.returns {
            self.verify_returns(step, result, expected_rows)?;
        }

        if let Some(ref expected_first) = self.first {
            let Some(first) = result.rows.first() else {
                return Err(HarnessError::assertion_failed(
                    step,
                    "expected first row but result is empty",
                ));
            };
            if !row_matches(&result.columns, first, expected_first) {
                return Err(HarnessError::assertion_failed(
                    step,
                    format!(
                        "first() row mismatch:\n  expected: {}\n  actual:   {}",
                        format_row(expected_first),
                        format_row_values(&result.columns, first)
                    ),
                ));
            }
        }

        if let Some(ref expected_last) = self.last {
            let Some(last) = result.rows.last() else {
                return Err(HarnessError::assertion_failed(
                    step,
                    "expected last row but result is empty",
                ));
            };
            if !row_matches(&result.columns, last, expected_last) {
                return Err(HarnessError::assertion_failed(
                    step,
                    format!(
                        "last() row mismatch:\n  expected: {}\n  actual:   {}",
                        format_row(expected_last),
                        format_row_values(&result.columns, last)
                    ),
                ));
            }
        }

        if let Some(ref custom) = self.custom {
            if !custom(result) {
                return Err(HarnessError::assertion_failed(
                    step,
                    "custom assertion returned false",
                ));
            }
        }

        Ok(())
    }

    fn verify_returns(
        &self,
        step: &str,
        result: &Output,
        expected_rows: &[ExpectedRow],
    ) -> HarnessResult<()> {
        if result.rows.len() != expected_rows.len() {
            return Err(HarnessError::assertion_failed(
                step,
                format!(
                    "returns() row count mismatch:\n  expected: {} rows\n  actual:   {} rows\n  columns:  {:?}",
                    expected_rows.len(),
                    result.rows.len(),
                    result.columns
                ),
            ));
        }

        if self.ordered {
            for (i, (expected_row, actual)) in expected_rows.iter().zip(&result.rows).enumerate() {
                if !row_matches(&result.columns, actual, expected_row) {
                    return Err(HarnessError::assertion_failed(
                        step,
                        format!(
                            "returns().ordered() row mismatch at index {}:\n  expected: {}\n  actual:   {}",
                            i,
                            format_row(expected_row),
                            format_row_values(&result.columns, actual)
                        ),
                    ));
                }
            }
            return Ok(());
        }

        // Multiset matching: each expected row consumes one actual row.
        let mut remaining: Vec<&[Value]> = result.rows.iter().map(Vec::as_slice).collect();
        for (expected_idx, expected_row) in expected_rows.iter().enumerate() {
            match remaining
                .iter()
                .position(|row| row_matches(&result.columns, row, expected_row))
            {
                Some(idx) => {
                    remaining.remove(idx);
                }
                None => {
                    return Err(HarnessError::assertion_failed(
                        step,
                        format!(
                            "returns() missing expected row at index {}:\n  expected: {}\n  columns:  {:?}\n  remaining actual rows: {}",
                            expected_idx,
                            format_row(expected_row),
                            result.columns,
                            remaining.len()
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Builder for fluent assertion construction.
pub struct AssertionBuilder {
    assertion: Assertion,
}

impl AssertionBuilder {
    pub fn new() -> Self {
        Self {
            assertion: Assertion::new(),
        }
    }

    pub fn build(self) -> Assertion {
        self.assertion
    }

    /// Assert the output column names, in order.
    pub fn columns(mut self, names: &[&str]) -> Self {
        self.assertion.columns = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Assert the number of rows.
    pub fn rows(mut self, n: usize) -> Self {
        self.assertion.rows = Some(n);
        self
    }

    pub fn empty(mut self) -> Self {
        self.assertion.empty = Some(true);
        self
    }

    pub fn not_empty(mut self) -> Self {
        self.assertion.empty = Some(false);
        self
    }

    /// Assert the exact rows of the result.
    ///
    /// Each expected row must name every output column. Rows are matched as
    /// a multiset unless `ordered()` is set.
    pub fn returns(mut self, rows: Vec<ExpectedRow>) -> Self {
        self.assertion.returns = Some(rows);
        self
    }

    /// Make `returns()` match rows in sequence.
    pub fn ordered(mut self) -> Self {
        self.assertion.ordered = true;
        self
    }

    /// Assert that the first row carries the given fields.
    pub fn first(mut self, row: ExpectedRow) -> Self {
        self.assertion.first = Some(row);
        self
    }

    /// Assert that the last row carries the given fields.
    pub fn last(mut self, row: ExpectedRow) -> Self {
        self.assertion.last = Some(row);
        self
    }

    /// Assert that the step fails with a message containing `contains`.
    pub fn error(mut self, contains: impl Into<String>) -> Self {
        self.assertion.error = Some(contains.into());
        self
    }

    /// Assert that the step fails with a message matching `pattern`.
    pub fn error_matches(mut self, pattern: impl Into<String>) -> Self {
        self.assertion.error_pattern = Some(pattern.into());
        self
    }

    pub fn assert_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Output) -> bool + 'static,
    {
        self.assertion.custom = Some(Box::new(f));
        self
    }
}

impl Default for AssertionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Value equality with a relative tolerance on floats.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(a), Value::Float(b)) => {
            a == b || (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
        }
        _ => a == b,
    }
}

/// Strict match: the expected row names exactly the output columns.
fn row_matches(columns: &[String], row: &[Value], expected: &ExpectedRow) -> bool {
    expected.len() == columns.len()
        && columns.iter().zip(row).all(|(name, value)| {
            expected
                .get(name)
                .is_some_and(|expected_value| values_equal(value, expected_value))
        })
}

fn format_row(row: &ExpectedRow) -> String {
    let mut parts: Vec<String> = row.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
    parts.sort();
    format!("{{ {} }}", parts.join(", "))
}

fn format_row_values(columns: &[String], values: &[Value]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .zip(values)
        .map(|(col, val)| format!("{}: {}", col, val))
        .collect();
    format!("{{ {} }}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn output() -> Output {
        Output {
            columns: vec!["nom".into(), "age".into()],
            rows: vec![
                vec![Value::from("j"), Value::Int(10)],
                vec![Value::from("jean"), Value::Int(40)],
            ],
        }
    }

    #[test]
    fn test_returns_unordered_and_ordered() {
        let unordered = AssertionBuilder::new()
            .returns(vec![row! { nom: "jean", age: 40 }, row! { nom: "j", age: 10 }])
            .build();
        assert!(unordered.verify("s", &Ok(output())).is_ok());

        let ordered = AssertionBuilder::new()
            .returns(vec![row! { nom: "jean", age: 40 }, row! { nom: "j", age: 10 }])
            .ordered()
            .build();
        assert!(ordered.verify("s", &Ok(output())).is_err());
    }

    #[test]
    fn test_returns_is_strict_on_columns() {
        let assertion = AssertionBuilder::new()
            .first(row! { nom: "j" })
            .build();
        assert!(assertion.verify("s", &Ok(output())).is_err());
    }

    #[test]
    fn test_error_assertions() {
        let failed: Result<Output, String> = Err("column 'x' not found".into());
        assert!(AssertionBuilder::new()
            .error("not found")
            .build()
            .verify("s", &failed)
            .is_ok());
        assert!(AssertionBuilder::new()
            .error_matches(r"column '\w+' not found")
            .build()
            .verify("s", &failed)
            .is_ok());
        assert!(AssertionBuilder::new()
            .error("not found")
            .build()
            .verify("s", &Ok(output()))
            .is_err());
    }

    #[test]
    fn test_float_tolerance() {
        assert!(values_equal(&Value::Float(0.1 + 0.2), &Value::Float(0.3)));
        assert!(!values_equal(&Value::Float(1.0), &Value::Int(1)));
        assert!(values_equal(&Value::Na, &Value::Na));
    }
}
