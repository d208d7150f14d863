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

//! Atomic `column op value` comparisons and their content-addressed
//! deduplication map (§4.4, §3 "Condition" / "ConditionMap").

use std::collections::HashMap;

use crate::error::{CsvDbError, Result};
use crate::operators::ComparisonOperator;

/// Tolerance used when comparing two floats for (in)equality: the smallest
/// positive *normal* `f64`, per spec.md §4.4. See DESIGN.md / SPEC_FULL.md
/// §9(a) for why this, rather than `f64::EPSILON`, is the right constant.
const FLOAT_EQ_TOLERANCE: f64 = f64::MIN_POSITIVE;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
}

/// An atomic `column op value` comparison.
///
/// Two conditions are structurally equal (and therefore deduplicated by
/// [`ConditionMap`]) iff their column, operator and value all match.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: ComparisonOperator,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: ComparisonOperator, value: Value) -> Self {
        Self { column: column.into(), op, value }
    }

    /// Evaluates this condition against a single CSV cell value.
    pub fn check(&self, cell: &str) -> Result<bool> {
        match &self.value {
            Value::Number(cond_value) => self.check_number(cell, *cond_value),
            Value::String(cond_value) => self.check_string(cell, cond_value),
        }
    }

    fn check_number(&self, cell: &str, cond_value: f64) -> Result<bool> {
        if cell.trim().is_empty() {
            return Ok(false);
        }

        let cell_value: f64 = cell.parse().map_err(|_| CsvDbError::ConvertToFloat64 {
            column: self.column.clone(),
            value: cell.to_string(),
        })?;

        let in_delta = |a: f64, b: f64| {
            let dt = a - b;
            (-FLOAT_EQ_TOLERANCE..=FLOAT_EQ_TOLERANCE).contains(&dt)
        };

        match self.op {
            ComparisonOperator::Eq => Ok(in_delta(cell_value, cond_value)),
            ComparisonOperator::NotEq => Ok(!in_delta(cell_value, cond_value)),
            ComparisonOperator::Lt => Ok(cell_value < cond_value),
            ComparisonOperator::LtEq => Ok(cell_value <= cond_value),
            ComparisonOperator::Gt => Ok(cell_value > cond_value),
            ComparisonOperator::GtEq => Ok(cell_value >= cond_value),
        }
    }

    fn check_string(&self, cell: &str, cond_value: &str) -> Result<bool> {
        match self.op {
            ComparisonOperator::Eq => Ok(cell == cond_value),
            ComparisonOperator::NotEq => Ok(cell != cond_value),
            ComparisonOperator::Lt => Ok(cell < cond_value),
            ComparisonOperator::LtEq => Ok(cell <= cond_value),
            ComparisonOperator::Gt => Ok(cell > cond_value),
            ComparisonOperator::GtEq => Ok(cell >= cond_value),
        }
    }
}

pub const CONDITION_PREFIX: &str = "COND";

/// Content-addressed dedup map: inserting a structurally-equal condition
/// twice returns the same synthetic key (`COND0`, `COND1`, ...).
#[derive(Debug, Default, Clone)]
pub struct ConditionMap {
    by_key: HashMap<String, Condition>,
    order: Vec<String>,
}

impl ConditionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Inserts `cond`, returning its (possibly pre-existing) key.
    pub fn add(&mut self, cond: Condition) -> String {
        if let Some(key) = self.find(&cond) {
            return key;
        }

        let key = format!("{CONDITION_PREFIX}{}", self.by_key.len());
        self.order.push(key.clone());
        self.by_key.insert(key.clone(), cond);
        key
    }

    fn find(&self, cond: &Condition) -> Option<String> {
        self.order.iter().find(|key| self.by_key[*key] == *cond).cloned()
    }

    pub fn get(&self, key: &str) -> Option<&Condition> {
        self.by_key.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(col: &str, op: ComparisonOperator, value: Value) -> Condition {
        Condition::new(col, op, value)
    }

    #[test]
    fn dedup_returns_same_key_for_equal_conditions() {
        let mut map = ConditionMap::new();
        let k1 = map.add(cond("age", ComparisonOperator::Eq, Value::Number(33.0)));
        let k2 = map.add(cond("age", ComparisonOperator::Eq, Value::Number(33.0)));
        assert_eq!(k1, k2);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn distinct_conditions_get_distinct_keys() {
        let mut map = ConditionMap::new();
        let k1 = map.add(cond("age", ComparisonOperator::Eq, Value::Number(33.0)));
        let k2 = map.add(cond("age", ComparisonOperator::Eq, Value::Number(34.0)));
        assert_ne!(k1, k2);
        assert_eq!(map.len(), 2);
        assert_eq!(k1, "COND0");
        assert_eq!(k2, "COND1");
    }

    #[test]
    fn numeric_equality_uses_tolerance() {
        let c = cond("age", ComparisonOperator::Eq, Value::Number(33.0));
        assert_eq!(c.check("33").unwrap(), true);
        assert_eq!(c.check("34").unwrap(), false);
    }

    #[test]
    fn numeric_blank_cell_is_false_not_error() {
        let c = cond("age", ComparisonOperator::Eq, Value::Number(33.0));
        assert_eq!(c.check("  ").unwrap(), false);
    }

    #[test]
    fn numeric_cell_that_does_not_parse_is_an_error() {
        let c = cond("age", ComparisonOperator::Eq, Value::Number(33.0));
        assert!(c.check("not-a-number").is_err());
    }

    #[test]
    fn string_comparisons_are_lexicographic() {
        let c = cond("name", ComparisonOperator::Lt, Value::String("carol".into()));
        assert_eq!(c.check("alice").unwrap(), true);
        assert_eq!(c.check("zara").unwrap(), false);
    }

    #[test]
    fn less_or_equal_operator_semantics() {
        let c = cond("age", ComparisonOperator::LtEq, Value::Number(54.0));
        assert!(c.check("54").unwrap());
        assert!(c.check("53.9").unwrap());
        assert!(!c.check("54.1").unwrap());
    }
}
