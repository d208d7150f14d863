// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The compiled query (§3 "Query") and its WHERE expression tree.

use std::collections::HashMap;

use crate::condition::ConditionMap;
use crate::error::{CsvDbError, Result};
use crate::operators::LogicalOperator;

/// A column name, or the `*` projection sentinel.
pub type Column = String;
/// A table name, interpreted literally as a filename under the configured
/// base directory.
pub type Table = String;

pub const STAR: &str = "*";

/// The typed WHERE expression tree.
///
/// This is the tagged-variant rewrite called for in SPEC_FULL.md §9: rather
/// than a single node type whose value is checked at evaluation time (as in
/// the Go original's `structs.Tree` + runtime type assertions), a leaf and
/// an internal node are distinct variants, so [`WhereExpr::eval`] can never
/// observe "a leaf with a populated right child" or "an internal node with
/// an unrecognized operator" — those states are unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereExpr {
    /// A leaf referencing a condition by its `ConditionMap` key.
    Condition(String),
    /// An internal node combining two subtrees with a logical operator.
    Logical(LogicalOperator, Box<WhereExpr>, Box<WhereExpr>),
}

impl WhereExpr {
    pub fn condition(key: impl Into<String>) -> Self {
        WhereExpr::Condition(key.into())
    }

    pub fn logical(op: LogicalOperator, left: WhereExpr, right: WhereExpr) -> Self {
        WhereExpr::Logical(op, Box::new(left), Box::new(right))
    }

    /// Evaluates this tree against one row (§4.9), given the `column ->
    /// 0-based index` map built by the executor during header resolution
    /// and the conditions this tree's leaves reference by key.
    ///
    /// Short-circuits: an `OR` node with a true left subtree, or an `AND`
    /// node with a false left subtree, never evaluates its right subtree.
    pub fn eval(
        &self,
        row: &[String],
        column_index: &HashMap<String, usize>,
        conditions: &ConditionMap,
    ) -> Result<bool> {
        match self {
            WhereExpr::Condition(key) => {
                let cond = conditions
                    .get(key)
                    .expect("condition key always present in its own ConditionMap");
                let idx = column_index
                    .get(&cond.column)
                    .expect("column_index is built from the same used_columns this condition belongs to");
                let cell = row.get(*idx).ok_or_else(|| CsvDbError::IncorrectTableRow {
                    index: *idx,
                    row: row.to_vec(),
                })?;
                cond.check(cell)
            }
            WhereExpr::Logical(op, left, right) => {
                let left_value = left.eval(row, column_index, conditions)?;
                match (op, left_value) {
                    (LogicalOperator::Or, true) => Ok(true),
                    (LogicalOperator::And, false) => Ok(false),
                    _ => {
                        let right_value = right.eval(row, column_index, conditions)?;
                        Ok(op.eval(left_value, right_value))
                    }
                }
            }
        }
    }
}

/// The compiled form of a query (§3 "Query").
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Projection list, in SELECT order. May contain the `*` sentinel.
    pub select: Vec<Column>,
    /// True iff `*` appears in `select`.
    pub star: bool,
    /// Source tables, in FROM order. Non-empty.
    pub from: Vec<Table>,
    /// The WHERE expression tree, or `None` when no WHERE clause is present.
    pub where_expr: Option<WhereExpr>,
    /// Conditions referenced by `where_expr`, keyed by their `ConditionMap`
    /// key (`COND0`, `COND1`, ...).
    pub conditions: ConditionMap,
    /// The ordered union of non-`*` projection columns (in SELECT order)
    /// with every column referenced in the WHERE tree (in first-seen order
    /// during WHERE parsing).
    pub used_columns: Vec<Column>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Value;
    use crate::operators::ComparisonOperator;

    fn index(cols: &[&str]) -> HashMap<String, usize> {
        cols.iter().enumerate().map(|(i, c)| (c.to_string(), i)).collect()
    }

    #[test]
    fn leaf_looks_up_cell_by_column_index() {
        let mut conditions = ConditionMap::new();
        let key = conditions.add(crate::condition::Condition::new(
            "age",
            ComparisonOperator::Eq,
            Value::Number(33.0),
        ));
        let expr = WhereExpr::condition(key);
        let idx = index(&["name", "age"]);
        let row = vec!["alice".to_string(), "33".to_string()];
        assert!(expr.eval(&row, &idx, &conditions).unwrap());
    }

    #[test]
    fn and_short_circuits_on_false_left() {
        let mut conditions = ConditionMap::new();
        let always_false =
            conditions.add(crate::condition::Condition::new("age", ComparisonOperator::Eq, Value::Number(1.0)));
        let would_error = conditions.add(crate::condition::Condition::new(
            "missing",
            ComparisonOperator::Eq,
            Value::Number(1.0),
        ));
        let expr = WhereExpr::logical(
            LogicalOperator::And,
            WhereExpr::condition(always_false),
            WhereExpr::condition(would_error),
        );
        let idx = index(&["age"]);
        let row = vec!["99".to_string()];
        // right subtree references a column absent from `idx`; if it were
        // evaluated, the lookup would panic. Short-circuit must prevent that.
        assert!(!expr.eval(&row, &idx, &conditions).unwrap());
    }

    #[test]
    fn or_short_circuits_on_true_left() {
        let mut conditions = ConditionMap::new();
        let always_true =
            conditions.add(crate::condition::Condition::new("age", ComparisonOperator::Eq, Value::Number(99.0)));
        let expr = WhereExpr::logical(
            LogicalOperator::Or,
            WhereExpr::condition(always_true.clone()),
            WhereExpr::condition(always_true),
        );
        let idx = index(&["age"]);
        let row = vec!["99".to_string()];
        assert!(expr.eval(&row, &idx, &conditions).unwrap());
    }

    #[test]
    fn short_row_is_incorrect_table_row() {
        let mut conditions = ConditionMap::new();
        let key =
            conditions.add(crate::condition::Condition::new("age", ComparisonOperator::Eq, Value::Number(1.0)));
        let expr = WhereExpr::condition(key);
        let idx = index(&["name", "age"]);
        let row = vec!["alice".to_string()];
        assert!(matches!(expr.eval(&row, &idx, &conditions), Err(CsvDbError::IncorrectTableRow { .. })));
    }
}
