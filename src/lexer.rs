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

//! Cursor-based scanning primitives shared by the SELECT/FROM and WHERE
//! parsers (§4.1).

use crate::error::{CsvDbError, Result};

/// A mutable cursor of byte offsets into a query string.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The unconsumed suffix of the input.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn advance_by(&mut self, n: usize) {
        self.pos += n;
    }

    /// Advances past any run of ASCII spaces.
    pub fn skip_space(&mut self) {
        let skipped = self.remaining().bytes().take_while(|b| *b == b' ').count();
        self.pos += skipped;
    }

    /// True iff the remaining input begins with `keyword` (case-insensitive)
    /// followed by a space.
    pub fn starts_with_keyword(&self, keyword: &str) -> bool {
        let rest = self.remaining();
        rest.len() > keyword.len()
            && rest[..keyword.len()].eq_ignore_ascii_case(keyword)
            && rest.as_bytes()[keyword.len()] == b' '
    }

    /// Consumes `keyword` plus the single trailing space.
    pub fn consume_keyword(&mut self, keyword: &str) {
        self.advance_by(keyword.len() + 1);
    }

    /// Returns the slice up to (not including) the first byte in
    /// `terminators`, or the whole remaining input if none is found, and
    /// advances the cursor past the returned slice.
    pub fn take_identifier_until(&mut self, terminators: &[char]) -> &'a str {
        let rest = self.remaining();
        let end = rest.find(|c| terminators.contains(&c)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Consumes a quoted string starting at the cursor, which must be
    /// positioned on an opening `'` or `"`. Returns the unescaped contents
    /// (without the surrounding quotes). See §4.4/§4.5: a match preceded by
    /// `\` is treated as escaped; `\"` and `\'` inside the value are
    /// unescaped to `"`/`'`.
    pub fn take_quoted_string(&mut self) -> Result<String> {
        let rest = self.remaining();
        let quote = rest.as_bytes()[0] as char;
        debug_assert!(quote == '\'' || quote == '"');

        let mut search_from = 1usize;
        let close_rel = loop {
            match rest[search_from..].find(quote) {
                None => return Err(CsvDbError::IncorrectQuery("unterminated string literal".into())),
                Some(found) => {
                    let abs = search_from + found;
                    if abs > 0 && rest.as_bytes()[abs - 1] == b'\\' {
                        search_from = abs + 1;
                        continue;
                    }
                    break abs;
                }
            }
        };

        let raw = &rest[1..close_rel];
        let value = raw.replace("\\\"", "\"").replace("\\'", "'");
        self.pos += close_rel + 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_space_advances_past_spaces_only() {
        let mut c = Cursor::new("   abc");
        c.skip_space();
        assert_eq!(c.remaining(), "abc");
    }

    #[test]
    fn starts_with_keyword_is_case_insensitive() {
        let c = Cursor::new("select a from t");
        assert!(c.starts_with_keyword("SELECT"));
        assert!(!c.starts_with_keyword("FROM"));
    }

    #[test]
    fn starts_with_keyword_requires_trailing_space() {
        let c = Cursor::new("selecting a from t");
        assert!(!c.starts_with_keyword("SELECT"));
    }

    #[test]
    fn take_identifier_until_stops_at_terminator() {
        let mut c = Cursor::new("age<=5");
        let id = c.take_identifier_until(&['<', '>', '=', ' ']);
        assert_eq!(id, "age");
        assert_eq!(c.remaining(), "<=5");
    }

    #[test]
    fn take_quoted_string_unescapes_double_quote() {
        let mut c = Cursor::new("\"OOO \\\"Company Name\\\"\" rest");
        let s = c.take_quoted_string().unwrap();
        assert_eq!(s, "OOO \"Company Name\"");
        assert_eq!(c.remaining(), " rest");
    }

    #[test]
    fn take_quoted_string_single_quote() {
        let mut c = Cursor::new("'Europe')");
        let s = c.take_quoted_string().unwrap();
        assert_eq!(s, "Europe");
        assert_eq!(c.remaining(), ")");
    }

    #[test]
    fn take_quoted_string_unterminated_is_error() {
        let mut c = Cursor::new("'Europe");
        assert!(c.take_quoted_string().is_err());
    }
}
