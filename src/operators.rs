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

//! Comparison and logical operator model (§4.3).

use std::fmt;

/// The six comparison operators recognized inside a condition, ordered for
/// longest-match detection: the parser always prefers `<=`/`>=` over the
/// shorter `<`/`>`.
pub const COMPARISON_OPERATORS: &[ComparisonOperator] = &[
    ComparisonOperator::Eq,
    ComparisonOperator::NotEq,
    ComparisonOperator::Lt,
    ComparisonOperator::LtEq,
    ComparisonOperator::Gt,
    ComparisonOperator::GtEq,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::NotEq => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::LtEq => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::GtEq => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }

    /// Case-insensitive lookup, mirroring `IsOperator`/token matching in the
    /// original's `operators.go`.
    pub fn parse(tok: &str) -> Option<LogicalOperator> {
        if tok.eq_ignore_ascii_case("AND") {
            Some(LogicalOperator::And)
        } else if tok.eq_ignore_ascii_case("OR") {
            Some(LogicalOperator::Or)
        } else {
            None
        }
    }

    pub fn is_logical_operator(tok: &str) -> bool {
        LogicalOperator::parse(tok).is_some()
    }

    /// `AND` binds tighter than `OR`.
    pub fn priority(&self) -> i32 {
        match self {
            LogicalOperator::Or => 1,
            LogicalOperator::And => 2,
        }
    }

    pub fn eval(&self, left: bool, right: bool) -> bool {
        match self {
            LogicalOperator::And => left && right,
            LogicalOperator::Or => left || right,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of an arbitrary token; unrecognized tokens sort below any
/// logical operator, matching `GetPriority`'s `-1` fallback.
pub fn priority_of(tok: &str) -> i32 {
    LogicalOperator::parse(tok).map_or(-1, |op| op.priority())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_prefers_two_char_operators() {
        // `<=` must be found before `<` when scanning COMPARISON_OPERATORS.
        let text = "<=5";
        let mut best: Option<ComparisonOperator> = None;
        for op in COMPARISON_OPERATORS {
            let s = op.as_str();
            if text.starts_with(s) && best.map_or(true, |b: ComparisonOperator| s.len() > b.as_str().len()) {
                best = Some(*op);
            }
        }
        assert_eq!(best, Some(ComparisonOperator::LtEq));
    }

    #[test]
    fn and_has_higher_priority_than_or() {
        assert!(LogicalOperator::And.priority() > LogicalOperator::Or.priority());
    }

    #[test]
    fn logical_operator_is_case_insensitive() {
        assert_eq!(LogicalOperator::parse("and"), Some(LogicalOperator::And));
        assert_eq!(LogicalOperator::parse("Or"), Some(LogicalOperator::Or));
        assert_eq!(LogicalOperator::parse("XOR"), None);
    }

    #[test]
    fn eval_short_circuit_semantics() {
        assert!(LogicalOperator::Or.eval(true, false));
        assert!(!LogicalOperator::And.eval(false, true));
    }
}
