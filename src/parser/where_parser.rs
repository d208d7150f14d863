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

//! The WHERE clause parser: token-by-token scan over a small state
//! machine, shunting-yard conversion, and reduction to a typed expression
//! tree (§4.5, §4.12).

use crate::ast::WhereExpr;
use crate::condition::{Condition, ConditionMap, Value};
use crate::error::{CsvDbError, Result};
use crate::lexer::Cursor;
use crate::notation::InfixNotation;
use crate::operators::{LogicalOperator, COMPARISON_OPERATORS};
use crate::structs::{Tree, TreeStack};

/// The legal-next-token state (§4.12): tracked as "what was the previous
/// token", since the original's token stack is only ever pushed to, never
/// popped — only its top is examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastToken {
    OpenBracket,
    CloseBracketOrCondition,
    BinaryOp,
}

/// One node of the intermediate, dynamically-valued tree built directly
/// from the postfix stream — kept for parity with the auxiliary `Tree`
/// container described in §2; [`to_where_expr`] below performs the one-time
/// conversion to the statically-typed [`WhereExpr`] used for evaluation.
#[derive(Debug, Clone, PartialEq)]
enum PostfixToken {
    Condition(String),
    Operator(LogicalOperator),
}

pub struct WhereParseResult {
    pub expr: WhereExpr,
    pub conditions: ConditionMap,
    /// Columns referenced in the WHERE tree, in first-seen order.
    pub columns: Vec<String>,
}

pub fn parse(where_clause: &str) -> Result<WhereParseResult> {
    let mut cursor = Cursor::new(where_clause);
    let mut infix = InfixNotation::new();
    let mut conditions = ConditionMap::new();
    let mut columns = Vec::new();
    let mut bracket_depth: usize = 0;
    let mut last: Option<LastToken> = None;

    while !cursor.is_at_end() {
        let next = cursor.remaining().as_bytes()[0] as char;

        match last {
            None | Some(LastToken::OpenBracket) => {
                if next == '(' {
                    open_bracket(&mut cursor, &mut infix, &mut bracket_depth);
                    last = Some(LastToken::OpenBracket);
                } else {
                    process_condition(&mut cursor, &mut infix, &mut conditions, &mut columns)?;
                    last = Some(LastToken::CloseBracketOrCondition);
                }
            }
            Some(LastToken::CloseBracketOrCondition) => {
                if next == ')' {
                    close_bracket(&mut cursor, &mut infix, &mut bracket_depth)?;
                    last = Some(LastToken::CloseBracketOrCondition);
                } else {
                    let op = binary_operator(&mut cursor)?;
                    infix.add_token(op.as_str());
                    last = Some(LastToken::BinaryOp);
                }
            }
            Some(LastToken::BinaryOp) => {
                if next == '(' {
                    open_bracket(&mut cursor, &mut infix, &mut bracket_depth);
                    last = Some(LastToken::OpenBracket);
                } else {
                    process_condition(&mut cursor, &mut infix, &mut conditions, &mut columns)?;
                    last = Some(LastToken::CloseBracketOrCondition);
                }
            }
        }

        cursor.skip_space();
    }

    if bracket_depth != 0 {
        return Err(CsvDbError::IncorrectBracketPosition);
    }

    if last != Some(LastToken::CloseBracketOrCondition) {
        return Err(CsvDbError::IncorrectQuery("incomplete where clause".into()));
    }

    if infix.size() == 0 {
        return Err(CsvDbError::IncorrectQuery("empty where clause".into()));
    }

    let postfix = infix.to_postfix();
    let tree = build_tree(&postfix, &conditions)?;
    let expr = to_where_expr(&tree);

    Ok(WhereParseResult { expr, conditions, columns })
}

fn open_bracket(cursor: &mut Cursor, infix: &mut InfixNotation, depth: &mut usize) {
    infix.add_token("(");
    *depth += 1;
    cursor.advance_by(1);
}

fn close_bracket(cursor: &mut Cursor, infix: &mut InfixNotation, depth: &mut usize) -> Result<()> {
    if *depth == 0 {
        return Err(CsvDbError::IncorrectBracketPosition);
    }
    *depth -= 1;
    infix.add_token(")");
    cursor.advance_by(1);
    Ok(())
}

fn process_condition(
    cursor: &mut Cursor,
    infix: &mut InfixNotation,
    conditions: &mut ConditionMap,
    columns: &mut Vec<String>,
) -> Result<()> {
    let cond = find_condition(cursor)?;
    if !columns.contains(&cond.column) {
        columns.push(cond.column.clone());
    }
    let key = conditions.add(cond);
    infix.add_token(key);
    Ok(())
}

fn find_condition(cursor: &mut Cursor) -> Result<Condition> {
    let column = cursor.take_identifier_until(&['<', '>', '=', ' ']);
    if column.is_empty() {
        return Err(CsvDbError::IncorrectQuery("missing column in condition".into()));
    }
    let column = column.to_string();
    cursor.skip_space();

    let op = comparison_operator(cursor)?;
    cursor.skip_space();

    let value = condition_value(cursor)?;
    cursor.skip_space();

    Ok(Condition::new(column, op, value))
}

fn comparison_operator(cursor: &mut Cursor) -> Result<crate::operators::ComparisonOperator> {
    let rest = cursor.remaining();
    let best = COMPARISON_OPERATORS
        .iter()
        .filter(|op| {
            let s = op.as_str();
            rest.len() >= s.len() && rest[..s.len()].eq_ignore_ascii_case(s)
        })
        .max_by_key(|op| op.as_str().len())
        .copied();

    match best {
        Some(op) => {
            cursor.advance_by(op.as_str().len());
            Ok(op)
        }
        None => Err(CsvDbError::IncorrectQuery("unknown comparison operator".into())),
    }
}

fn condition_value(cursor: &mut Cursor) -> Result<Value> {
    let rest = cursor.remaining();
    if rest.starts_with('\'') || rest.starts_with('"') {
        Ok(Value::String(cursor.take_quoted_string()?))
    } else {
        let end = match (rest.find(' '), rest.find(')')) {
            (None, None) => rest.len(),
            (Some(s), None) => s,
            (None, Some(p)) => p,
            (Some(s), Some(p)) => s.min(p),
        };
        let text = &rest[..end];
        let number: f64 = text
            .parse()
            .map_err(|_| CsvDbError::IncorrectQuery(format!("invalid number literal '{text}'")))?;
        cursor.advance_by(end);
        Ok(Value::Number(number))
    }
}

fn binary_operator(cursor: &mut Cursor) -> Result<LogicalOperator> {
    let rest = cursor.remaining();
    let end = rest
        .find(' ')
        .ok_or_else(|| CsvDbError::IncorrectQuery("missing logical operator".into()))?;
    let token = rest[..end].to_uppercase();
    let op = match token.as_str() {
        "AND" => LogicalOperator::And,
        "OR" => LogicalOperator::Or,
        _ => return Err(CsvDbError::IncorrectQuery(format!("unknown logical operator '{token}'"))),
    };
    cursor.advance_by(end);
    Ok(op)
}

fn build_tree(postfix: &[String], conditions: &ConditionMap) -> Result<Tree<PostfixToken>> {
    let mut stack: TreeStack<PostfixToken> = TreeStack::new();

    for item in postfix {
        if let Some(op) = LogicalOperator::parse(item) {
            let right = stack
                .pop()
                .ok_or_else(|| CsvDbError::IncorrectWhereTree("missing right operand".into()))?;
            let left = stack
                .pop()
                .ok_or_else(|| CsvDbError::IncorrectWhereTree("missing left operand".into()))?;
            stack.push(Tree::node(PostfixToken::Operator(op), left, right));
        } else {
            debug_assert!(conditions.get(item).is_some());
            stack.push(Tree::leaf(PostfixToken::Condition(item.clone())));
        }
    }

    stack
        .pop()
        .ok_or_else(|| CsvDbError::IncorrectWhereTree("empty expression".into()))
}

fn to_where_expr(tree: &Tree<PostfixToken>) -> WhereExpr {
    match tree.value() {
        PostfixToken::Condition(key) => WhereExpr::condition(key.clone()),
        PostfixToken::Operator(op) => {
            let left = to_where_expr(tree.left().expect("operator node always has a left child"));
            let right = to_where_expr(tree.right().expect("operator node always has a right child"));
            WhereExpr::logical(*op, left, right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_condition() {
        let r = parse("age = 33").unwrap();
        assert_eq!(r.columns, vec!["age"]);
        assert!(matches!(r.expr, WhereExpr::Condition(_)));
    }

    #[test]
    fn and_or_precedence_tree_shape() {
        // A AND B OR C AND D -> OR(AND(A,B), AND(C,D))
        let r = parse("a = 1 AND b = 2 OR c = 3 AND d = 4").unwrap();
        match r.expr {
            WhereExpr::Logical(op, left, right) => {
                assert_eq!(op, LogicalOperator::Or);
                assert!(matches!(*left, WhereExpr::Logical(LogicalOperator::And, _, _)));
                assert!(matches!(*right, WhereExpr::Logical(LogicalOperator::And, _, _)));
            }
            _ => panic!("expected a logical node"),
        }
    }

    #[test]
    fn parentheses_group_correctly() {
        let r = parse("age <= 54 OR (country = 'Europe')").unwrap();
        match r.expr {
            WhereExpr::Logical(LogicalOperator::Or, _, right) => {
                assert!(matches!(*right, WhereExpr::Condition(_)));
            }
            _ => panic!("expected OR at root"),
        }
    }

    #[test]
    fn longest_match_operator_selection() {
        let r = parse("x <= 5").unwrap();
        let key = match &r.expr {
            WhereExpr::Condition(k) => k,
            _ => panic!("expected a leaf"),
        };
        let cond = r.conditions.get(key).unwrap();
        assert_eq!(cond.op, crate::operators::ComparisonOperator::LtEq);
    }

    #[test]
    fn escaped_quote_in_string_literal() {
        let r = parse(r#"name = "OOO \"Company Name\"""#).unwrap();
        let key = match &r.expr {
            WhereExpr::Condition(k) => k,
            _ => panic!("expected a leaf"),
        };
        let cond = r.conditions.get(key).unwrap();
        assert_eq!(cond.value, Value::String("OOO \"Company Name\"".to_string()));
    }

    #[test]
    fn unknown_comparison_operator_is_rejected() {
        assert!(parse("age == 33").is_err());
    }

    #[test]
    fn mismatched_bracket_is_rejected() {
        assert!(parse("(age = 33").is_err());
        assert!(parse("age = 33)").is_err());
    }

    #[test]
    fn trailing_logical_operator_is_rejected() {
        assert!(parse("age = 33 AND").is_err());
    }

    #[test]
    fn dedup_across_repeated_conditions() {
        let r = parse("age = 33 AND age = 33").unwrap();
        assert_eq!(r.conditions.len(), 1);
    }
}
