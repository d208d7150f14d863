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

//! The comma-and-space separated identifier list parser shared by SELECT
//! and FROM (§4.2).

use crate::error::{CsvDbError, Result};
use crate::lexer::Cursor;

/// Parses a comma-and-space separated identifier list starting at the
/// cursor, stopping at the first token that is followed by a space not
/// immediately (modulo further spaces) followed by a comma — i.e. at the
/// boundary with the next clause (`FROM`, `WHERE`, or end of input).
pub fn parse_list(cursor: &mut Cursor) -> Result<Vec<String>> {
    let mut tokens = Vec::new();

    loop {
        let rest = cursor.remaining();
        if rest.is_empty() {
            break;
        }

        let first_space = rest.find(' ');
        let first_comma = rest.find(',');

        match (first_space, first_comma) {
            (None, None) => {
                if !rest.is_empty() {
                    tokens.push(rest.to_string());
                }
                cursor.advance_by(rest.len());
                break;
            }
            (None, Some(comma)) => {
                let token = &rest[..comma];
                let consumed = comma + 1;
                if token.is_empty() || consumed >= rest.len() {
                    return Err(incorrect());
                }
                tokens.push(token.to_string());
                cursor.advance_by(consumed);
            }
            (Some(space), None) => {
                tokens.push(rest[..space].to_string());
                cursor.advance_by(space + 1);
                cursor.skip_space();
                break;
            }
            (Some(space), Some(comma)) if comma > space => {
                let between = rest[space..comma].trim();
                tokens.push(rest[..space].to_string());
                if between.is_empty() {
                    cursor.advance_by(comma + 1);
                    cursor.skip_space();
                } else {
                    cursor.advance_by(space + 1);
                    cursor.skip_space();
                    break;
                }
            }
            (Some(_), Some(comma)) => {
                let token = &rest[..comma];
                if token.is_empty() {
                    return Err(incorrect());
                }
                tokens.push(token.to_string());
                cursor.advance_by(comma + 1);
                cursor.skip_space();
            }
        }
    }

    if tokens.is_empty() {
        return Err(incorrect());
    }

    Ok(tokens)
}

fn incorrect() -> CsvDbError {
    CsvDbError::IncorrectQuery("malformed identifier list".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<(Vec<String>, String)> {
        let mut c = Cursor::new(input);
        let tokens = parse_list(&mut c)?;
        Ok((tokens, c.remaining().to_string()))
    }

    #[test]
    fn single_identifier() {
        let (tokens, rest) = parse("users").unwrap();
        assert_eq!(tokens, vec!["users"]);
        assert_eq!(rest, "");
    }

    #[test]
    fn comma_separated_no_spaces() {
        let (tokens, rest) = parse("a,b,c FROM t").unwrap();
        assert_eq!(tokens, vec!["a", "b", "c"]);
        assert_eq!(rest, "FROM t");
    }

    #[test]
    fn comma_separated_with_spaces() {
        let (tokens, rest) = parse("a, b, c FROM t").unwrap();
        assert_eq!(tokens, vec!["a", "b", "c"]);
        assert_eq!(rest, "FROM t");
    }

    #[test]
    fn stops_at_space_boundary() {
        let (tokens, rest) = parse("name FROM users").unwrap();
        assert_eq!(tokens, vec!["name"]);
        assert_eq!(rest, "FROM users");
    }

    #[test]
    fn trailing_comma_is_invalid() {
        assert!(parse("a,").is_err());
    }

    #[test]
    fn double_comma_is_invalid() {
        assert!(parse("a,, b").is_err());
    }

    #[test]
    fn empty_list_is_invalid() {
        assert!(parse("").is_err());
    }

    #[test]
    fn star_sentinel_is_a_plain_token() {
        let (tokens, rest) = parse("*, age, * FROM users").unwrap();
        assert_eq!(tokens, vec!["*", "age", "*"]);
        assert_eq!(rest, "FROM users");
    }
}
