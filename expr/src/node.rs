//! Column expression nodes.
//!
//! A `Column` is a cheap handle to one node of the expression graph. Nodes
//! are immutable once built except for two pieces of interior state: the
//! value slot written by the driving stream, and the owner back-reference
//! set when a schema adopts the node.
//!
//! Expressions are built with builder methods rather than operator syntax:
//!
//! ```ignore
//! let age2 = age.mul(2)?;
//! let adult = age.ge(18)?.and(&nom.ne("")?)?;
//! let mean = age.avg()?;
//! ```

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use sqllike_core::{NodeId, StreamId, Value, ValueKind};

use crate::{AggregateOp, ExprError, ExprResult, Function, ScalarOp};

/// Name given to nodes built without an explicit name.
pub const DEFAULT_NAME: &str = "__unk__";

/// Contents of a node's value slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    #[default]
    Empty,
    /// Written by a driving stream for the current row.
    Bound(Value),
    /// Cached by the last evaluation.
    Computed(Value),
    /// Collection of a group, written by the group stage.
    Group(Vec<Value>),
}

/// What a node computes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Bound to a named row field.
    Leaf,
    Constant(Value),
    Derived { op: ScalarOp, parents: Vec<Column> },
    GroupAggregate { op: AggregateOp, input: Column },
}

#[derive(Debug)]
struct Node {
    id: NodeId,
    name: String,
    kind: NodeKind,
    declared: ValueKind,
    owner: Cell<Option<StreamId>>,
    slot: RefCell<Slot>,
}

/// Handle to a column expression node.
#[derive(Clone)]
pub struct Column(Rc<Node>);

/// Anything a builder accepts as an operand.
#[derive(Debug, Clone)]
pub enum Operand {
    Column(Column),
    Scalar(Value),
    /// A collection of values; never a valid operand.
    List(Vec<Value>),
}

impl Column {
    fn build(name: impl Into<String>, kind: NodeKind, declared: ValueKind) -> Self {
        Column(Rc::new(Node {
            id: NodeId::next(),
            name: name.into(),
            kind,
            declared,
            owner: Cell::new(None),
            slot: RefCell::new(Slot::Empty),
        }))
    }

    /// A leaf bound to the row field `name`.
    pub fn leaf(name: impl Into<String>, declared: ValueKind) -> Self {
        Self::build(name, NodeKind::Leaf, declared)
    }

    /// A constant node.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let declared = ValueKind::of(&value);
        Self::build(DEFAULT_NAME, NodeKind::Constant(value), declared)
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn declared_kind(&self) -> ValueKind {
        self.0.declared
    }

    /// Stream whose schema holds this node, if any.
    pub fn owner(&self) -> Option<StreamId> {
        self.0.owner.get()
    }

    pub(crate) fn set_owner(&self, owner: Option<StreamId>) {
        self.0.owner.set(owner);
    }

    /// Parent nodes, in operand order.
    pub fn parents(&self) -> &[Column] {
        match &self.0.kind {
            NodeKind::Leaf | NodeKind::Constant(_) => &[],
            NodeKind::Derived { parents, .. } => parents,
            NodeKind::GroupAggregate { input, .. } => std::slice::from_ref(input),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.0.kind, NodeKind::Leaf)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.0.kind, NodeKind::Constant(_))
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.0.kind, NodeKind::GroupAggregate { .. })
    }

    /// An aggregate not yet exposed by a stream. Once a group stage owns
    /// it, it is a plain row value of that stream.
    pub fn is_free_aggregate(&self) -> bool {
        self.is_aggregate() && self.owner().is_none()
    }

    /// An aggregate, or a column copied from one. Such a column holds a
    /// per-group result and takes no further arithmetic.
    pub fn is_group_result(&self) -> bool {
        let mut node = self.clone();
        loop {
            if node.is_aggregate() {
                return true;
            }
            let next = match node.kind() {
                NodeKind::Derived {
                    op: ScalarOp::Id,
                    parents,
                } if parents.len() == 1 => parents[0].clone(),
                _ => return false,
            };
            node = next;
        }
    }

    /// Clear this node's slot and those of the unowned nodes it is
    /// computed from.
    pub fn reset_unowned(&self) {
        let mut seen = HashSet::new();
        let mut pending = vec![self.clone()];
        while let Some(node) = pending.pop() {
            if !seen.insert(node.id()) {
                continue;
            }
            node.reset();
            pending.extend(
                node.parents()
                    .iter()
                    .filter(|p| p.owner().is_none())
                    .cloned(),
            );
        }
    }

    /// The expression an aggregate node reduces, if this is one.
    pub fn aggregate_input(&self) -> Option<&Column> {
        match &self.0.kind {
            NodeKind::GroupAggregate { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Whether two handles point at the same node.
    pub fn same_node(&self, other: &Column) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn slot(&self) -> Ref<'_, Slot> {
        self.0.slot.borrow()
    }

    pub(crate) fn store(&self, slot: Slot) {
        *self.0.slot.borrow_mut() = slot;
    }

    /// Set the current row's value. A bound node reads as an input.
    pub fn bind(&self, value: Value) {
        self.store(Slot::Bound(value));
    }

    /// Set the collection an aggregate node reduces.
    pub fn bind_group(&self, values: Vec<Value>) {
        self.store(Slot::Group(values));
    }

    pub fn reset(&self) {
        self.store(Slot::Empty);
    }

    /// Value last bound or computed, if any.
    pub fn current_value(&self) -> Option<Value> {
        match &*self.0.slot.borrow() {
            Slot::Bound(v) | Slot::Computed(v) => Some(v.clone()),
            Slot::Empty | Slot::Group(_) => None,
        }
    }

    /// A node that stands for this one in another schema, with its own slot.
    ///
    /// Unowned aggregates copy structurally so the copy stays an aggregate
    /// the group stage can feed. Everything else copies as an identity node
    /// reading this one.
    pub fn copy(&self) -> Column {
        self.renamed(self.name())
    }

    /// A copy carrying a new name.
    pub fn renamed(&self, name: impl Into<String>) -> Column {
        match &self.0.kind {
            NodeKind::GroupAggregate { op, input } if self.is_free_aggregate() => Self::build(
                name,
                NodeKind::GroupAggregate {
                    op: *op,
                    input: input.clone(),
                },
                self.declared_kind(),
            ),
            _ => Self::build(
                name,
                NodeKind::Derived {
                    op: ScalarOp::Id,
                    parents: vec![self.clone()],
                },
                self.declared_kind(),
            ),
        }
    }

    /// Apply a scalar operator to operands, wrapping scalars as constants.
    pub fn apply(op: ScalarOp, operands: Vec<Operand>) -> ExprResult<Column> {
        let arity = op.arity();
        if !arity.accepts(operands.len()) {
            return Err(ExprError::operator_arity(
                op.symbol(),
                arity.to_string(),
                operands.len(),
            ));
        }
        let mut parents = Vec::with_capacity(operands.len());
        for operand in operands {
            let column = match operand {
                Operand::Column(c) => c,
                Operand::Scalar(v) => Column::constant(v),
                Operand::List(values) => {
                    return Err(ExprError::non_column_operand(
                        op.symbol(),
                        format!("collection of {} values", values.len()),
                    ))
                }
            };
            if column.is_free_aggregate()
                || (!op.accepts_group_results() && column.is_group_result())
            {
                return Err(ExprError::not_allowed(format!(
                    "aggregate column '{}' cannot be combined with '{}'",
                    column.name(),
                    op.symbol()
                )));
            }
            parents.push(column);
        }
        let kinds: Vec<ValueKind> = parents.iter().map(Column::declared_kind).collect();
        let declared = op.result_kind(&kinds);
        Ok(Self::build(
            DEFAULT_NAME,
            NodeKind::Derived { op, parents },
            declared,
        ))
    }

    /// Apply a caller-supplied function to operands.
    pub fn call(
        function: &Function,
        operands: impl IntoIterator<Item = Operand>,
    ) -> ExprResult<Column> {
        Self::apply(
            ScalarOp::Func(function.clone()),
            operands.into_iter().collect(),
        )
    }

    fn binary(&self, op: ScalarOp, other: impl Into<Operand>) -> ExprResult<Column> {
        Self::apply(op, vec![Operand::Column(self.clone()), other.into()])
    }

    fn unary(&self, op: ScalarOp) -> ExprResult<Column> {
        Self::apply(op, vec![Operand::Column(self.clone())])
    }

    pub fn add(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Add, other)
    }

    pub fn sub(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Sub, other)
    }

    pub fn mul(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Mul, other)
    }

    /// True division; always a float.
    pub fn div(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Div, other)
    }

    pub fn floor_div(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::FloorDiv, other)
    }

    pub fn rem(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Mod, other)
    }

    pub fn pow(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Pow, other)
    }

    pub fn neg(&self) -> ExprResult<Column> {
        self.unary(ScalarOp::Neg)
    }

    pub fn eq(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Eq, other)
    }

    pub fn ne(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Ne, other)
    }

    pub fn lt(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Lt, other)
    }

    pub fn le(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Le, other)
    }

    pub fn gt(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Gt, other)
    }

    pub fn ge(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Ge, other)
    }

    pub fn and(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::And, other)
    }

    pub fn or(&self, other: impl Into<Operand>) -> ExprResult<Column> {
        self.binary(ScalarOp::Or, other)
    }

    pub fn not(&self) -> ExprResult<Column> {
        self.unary(ScalarOp::Not)
    }

    fn aggregate(&self, op: AggregateOp) -> ExprResult<Column> {
        if self.is_group_result() {
            return Err(ExprError::not_allowed(format!(
                "cannot apply '{}' to aggregate column '{}'",
                op,
                self.name()
            )));
        }
        Ok(Self::build(
            self.name(),
            NodeKind::GroupAggregate {
                op,
                input: self.clone(),
            },
            op.result_kind(self.declared_kind()),
        ))
    }

    /// Number of rows in the group.
    pub fn len(&self) -> ExprResult<Column> {
        self.aggregate(AggregateOp::Len)
    }

    /// Alias of `len`.
    pub fn count(&self) -> ExprResult<Column> {
        self.aggregate(AggregateOp::Len)
    }

    pub fn avg(&self) -> ExprResult<Column> {
        self.aggregate(AggregateOp::Avg)
    }

    pub fn sum(&self) -> ExprResult<Column> {
        self.aggregate(AggregateOp::Sum)
    }

    pub fn min(&self) -> ExprResult<Column> {
        self.aggregate(AggregateOp::Min)
    }

    pub fn max(&self) -> ExprResult<Column> {
        self.aggregate(AggregateOp::Max)
    }

    /// Render this node and its ancestors as an indented tree.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.clone(), 0usize)];
        let mut seen = HashSet::new();
        while let Some((node, depth)) = stack.pop() {
            out.push_str(&"    ".repeat(depth));
            out.push_str(&node.to_string());
            out.push('\n');
            // Shared ancestors are listed once.
            if !seen.insert(node.id()) {
                continue;
            }
            for parent in node.parents().iter().rev() {
                stack.push((parent.clone(), depth + 1));
            }
        }
        out
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            NodeKind::Leaf => write!(f, "col({},{})", self.name(), self.declared_kind()),
            NodeKind::Constant(v) => write!(f, "cst({})", v),
            NodeKind::Derived { op, .. } => write!(
                f,
                "expr({},<{}>,op:{})",
                self.name(),
                self.declared_kind(),
                op.symbol()
            ),
            NodeKind::GroupAggregate { op, .. } => write!(f, "group[{}]({})", op, self.name()),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("kind", &self.to_string())
            .field("owner", &self.owner())
            .finish()
    }
}

impl From<Column> for Operand {
    fn from(c: Column) -> Self {
        Operand::Column(c)
    }
}

impl From<&Column> for Operand {
    fn from(c: &Column) -> Self {
        Operand::Column(c.clone())
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Scalar(v)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Scalar(Value::Int(v))
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Scalar(Value::from(v))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(Value::Float(v))
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Scalar(Value::from(v))
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Scalar(Value::Str(v))
    }
}

impl From<Vec<Value>> for Operand {
    fn from(v: Vec<Value>) -> Self {
        Operand::List(v)
    }
}
