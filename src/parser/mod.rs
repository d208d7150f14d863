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

//! The query façade (§4.6): orchestrates SELECT → FROM → optional WHERE
//! parsing and assembles the compiled [`Query`].

pub mod list;
pub mod where_parser;

use itertools::Itertools;

use crate::ast::{Query, STAR};
use crate::condition::ConditionMap;
use crate::error::{CsvDbError, Result};
use crate::lexer::Cursor;

/// Parses a raw query string into a compiled [`Query`].
pub fn parse(raw: &str) -> Result<Query> {
    let trimmed = raw.trim();
    let mut cursor = Cursor::new(trimmed);

    let select = parse_clause(&mut cursor, "SELECT")?;
    let star_count = select.iter().filter(|c| c.as_str() == STAR).count();
    if star_count > 1 {
        return Err(CsvDbError::TooManyStarColumns);
    }
    let star = star_count == 1;

    let from = parse_clause(&mut cursor, "FROM")?;

    let mut used_columns: Vec<String> = select.iter().filter(|c| c.as_str() != STAR).cloned().collect();
    let mut where_expr = None;
    let mut conditions = ConditionMap::new();

    if !cursor.is_at_end() {
        if !cursor.starts_with_keyword("WHERE") {
            return Err(CsvDbError::IncorrectQuery("expected WHERE clause".into()));
        }
        cursor.consume_keyword("WHERE");
        cursor.skip_space();

        let result = where_parser::parse(cursor.remaining())?;
        used_columns.extend(result.columns);
        where_expr = Some(result.expr);
        conditions = result.conditions;
    }

    let used_columns = used_columns.into_iter().unique().collect();

    Ok(Query { select, star, from, where_expr, conditions, used_columns })
}

fn parse_clause(cursor: &mut Cursor, keyword: &str) -> Result<Vec<String>> {
    if !cursor.starts_with_keyword(keyword) {
        return Err(CsvDbError::IncorrectQuery(format!("expected {keyword} statement")));
    }
    cursor.consume_keyword(keyword);
    cursor.skip_space();
    list::parse_list(cursor)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::WhereExpr;

    #[test]
    fn select_star_from_single_table() {
        let q = parse("select * from users").unwrap();
        assert_eq!(q.select, vec!["*"]);
        assert!(q.star);
        assert_eq!(q.from, vec!["users"]);
        assert!(q.where_expr.is_none());
        assert!(q.used_columns.is_empty());
    }

    #[test]
    fn select_columns_with_where() {
        let q = parse("select name,age from users where age = 33").unwrap();
        assert_eq!(q.select, vec!["name", "age"]);
        assert!(!q.star);
        assert!(matches!(q.where_expr, Some(WhereExpr::Condition(_))));
        assert_eq!(q.used_columns, vec!["name", "age"]);
    }

    #[test]
    fn used_columns_union_preserves_first_seen_order() {
        let q = parse("select name from users where age <= 54 OR (country = 'Europe')").unwrap();
        assert_eq!(q.used_columns, vec!["name", "age", "country"]);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let q = parse("SeLeCt name FrOm users WhErE age = 1").unwrap();
        assert_eq!(q.select, vec!["name"]);
        assert_eq!(q.from, vec!["users"]);
        assert!(q.where_expr.is_some());
    }

    #[test]
    fn too_many_star_columns_is_rejected() {
        assert!(parse("select *, age, * from users").is_err());
    }

    #[test]
    fn missing_from_is_rejected() {
        assert!(parse("select name").is_err());
    }

    #[test]
    fn unknown_comparison_operator_is_rejected() {
        assert!(parse("select name,age from users where age == 33").is_err());
    }

    #[test]
    fn multiple_from_tables() {
        let q = parse("select name from users, accounts").unwrap();
        assert_eq!(q.from, vec!["users", "accounts"]);
    }

    #[test]
    fn trailing_garbage_after_from_is_rejected() {
        assert!(parse("select name from users bogus").is_err());
    }
}
