//! Expression evaluation and construction-time validation.
//!
//! Evaluation walks the graph with an explicit stack, so long expression
//! chains do not grow the call stack. Parents are visited depth-first, left
//! to right. Within one call a node shared by several parents is computed
//! once.

use std::collections::{HashMap, HashSet};

use sqllike_core::{NodeId, StreamId, Value};

use crate::node::{Column, NodeKind, Slot};
use crate::{ExprError, ExprResult};

enum Frame {
    Enter(Column),
    Exit(Column),
}

impl Column {
    /// Evaluate this node for the current row.
    ///
    /// A node whose slot was bound by a driving stream reads as an input
    /// and is not re-derived.
    pub fn evaluate(&self) -> ExprResult<Value> {
        run(self, false)
    }

    /// Derive this node from its parents, ignoring a value bound on the
    /// node itself. Drivers use this for the columns they produce.
    pub fn compute(&self) -> ExprResult<Value> {
        run(self, true)
    }
}

fn run(root: &Column, force_root: bool) -> ExprResult<Value> {
    let mut done: HashMap<NodeId, Value> = HashMap::new();
    let mut stack = vec![Frame::Enter(root.clone())];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node) => {
                if done.contains_key(&node.id()) {
                    continue;
                }
                let forced = force_root && node.same_node(root);
                if !forced {
                    if let Slot::Bound(v) = &*node.slot() {
                        done.insert(node.id(), v.clone());
                        continue;
                    }
                }
                match node.kind() {
                    NodeKind::Leaf => {
                        let value = match &*node.slot() {
                            Slot::Bound(v) => v.clone(),
                            _ => return Err(ExprError::unbound_leaf(node.name())),
                        };
                        done.insert(node.id(), value);
                    }
                    NodeKind::Constant(v) => {
                        done.insert(node.id(), v.clone());
                    }
                    NodeKind::GroupAggregate { op, .. } => {
                        let result = match &*node.slot() {
                            Slot::Group(values) => op
                                .apply(values)
                                .map_err(|e| ExprError::evaluation(node.name(), e))?,
                            _ => return Err(ExprError::empty_group(node.name())),
                        };
                        node.store(Slot::Computed(result.clone()));
                        done.insert(node.id(), result);
                    }
                    NodeKind::Derived { parents, .. } => {
                        stack.push(Frame::Exit(node.clone()));
                        for parent in parents.iter().rev() {
                            stack.push(Frame::Enter(parent.clone()));
                        }
                    }
                }
            }
            Frame::Exit(node) => {
                if done.contains_key(&node.id()) {
                    continue;
                }
                if let NodeKind::Derived { op, parents } = node.kind() {
                    let args = parents
                        .iter()
                        .map(|p| {
                            done.get(&p.id())
                                .cloned()
                                .ok_or_else(|| ExprError::unbound_leaf(p.name()))
                        })
                        .collect::<ExprResult<Vec<_>>>()?;
                    let result = op
                        .apply(&args)
                        .map_err(|e| ExprError::evaluation(node.name(), e))?;
                    node.store(Slot::Computed(result.clone()));
                    done.insert(node.id(), result);
                }
            }
        }
    }

    done.remove(&root.id())
        .ok_or_else(|| ExprError::unbound_leaf(root.name()))
}

/// Check an expression usable as a row-level value over stream `owner`.
///
/// The walk stops at columns of `owner`, which are the stream's inputs.
/// Columns of another stream, leaves of no stream, and aggregates all fail.
pub fn validate_scalar_expression(expr: &Column, owner: StreamId) -> ExprResult<()> {
    let mut seen = HashSet::new();
    let mut pending = vec![expr.clone()];
    while let Some(node) = pending.pop() {
        if !seen.insert(node.id()) {
            continue;
        }
        match node.owner() {
            Some(o) if o == owner => continue,
            Some(_) => return Err(ExprError::schema_mismatch(node.name(), owner.to_string())),
            None => {}
        }
        if node.is_leaf() {
            return Err(ExprError::schema_mismatch(node.name(), owner.to_string()));
        }
        if node.is_aggregate() {
            return Err(ExprError::not_allowed(format!(
                "aggregate column '{}' used where a row value is required",
                node.name()
            )));
        }
        pending.extend(node.parents().iter().cloned());
    }
    Ok(())
}

/// Check an expression computed per group over stream `owner`.
///
/// A bare aggregate node is accepted when the expression it reduces is a
/// valid scalar expression; any other expression must itself be scalar.
pub fn validate_aggregate_expression(expr: &Column, owner: StreamId) -> ExprResult<()> {
    match expr.aggregate_input() {
        Some(input) if expr.is_free_aggregate() => validate_scalar_expression(input, owner),
        _ => validate_scalar_expression(expr, owner),
    }
}
