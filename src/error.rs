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

//! Crate-wide error taxonomy.
//!
//! Every error a parser, executor, worker or coordinator can produce is a
//! variant of [`CsvDbError`]. There is no panicking path in non-test code:
//! fallible operations return `Result<T, CsvDbError>` and propagate with
//! `?`, the way `sqlparser`'s own `ParserError` is threaded through this
//! crate's teacher.

use std::fmt;

pub type Result<T, E = CsvDbError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CsvDbError {
    /// Umbrella parse failure: malformed SELECT/FROM list, unknown operator,
    /// missing column, unterminated string, non-numeric literal, or any
    /// other state-machine violation in the WHERE parser.
    #[error("incorrect query: {0}")]
    IncorrectQuery(String),

    #[error("incorrect bracket positions in where statement")]
    IncorrectBracketPosition,

    #[error("too many star columns in select statement")]
    TooManyStarColumns,

    #[error("unknown comparison operator: column '{column}', operator '{op}'")]
    UnknownComparisonOperator { column: String, op: String },

    #[error("unknown value type of condition value: column '{column}'")]
    UnknownValueType { column: String },

    #[error("can't convert to float64: column '{column}', row value '{value}'")]
    ConvertToFloat64 { column: String, value: String },

    #[error("can't cast interface to string: column '{column}'")]
    CastInterfaceToString { column: String },

    #[error("can't cast interface to float64: column '{column}'")]
    CastInterfaceToFloat64 { column: String },

    #[error("query timed out after {0:?}")]
    QueryTimeout(std::time::Duration),

    #[error("table connection error: '{0}'")]
    TableConnection(String),

    #[error("table disconnection error: '{table}', real error: {source}")]
    TableDisconnection {
        table: String,
        #[source]
        source: StdIoErrorString,
    },

    #[error("table columns read error: '{0}'")]
    TableColumnsRead(String),

    #[error("table '{table}' doesn't exist")]
    TableNotExist { table: String },

    #[error("not exist column: table '{table}', columns: {}", .columns.join(", "))]
    NotExistColumn { table: String, columns: Vec<String> },

    #[error("there is not a column in row with index {index}, row: {row:?}")]
    IncorrectTableRow { index: usize, row: Vec<String> },

    #[error("incorrect where tree: {0}")]
    IncorrectWhereTree(String),

    #[error("incorrect column count: expected {expected}, got {got}")]
    IncorrectColumnCount { expected: usize, got: usize },

    #[error("incorrect column order: expected {expected:?}, got {got:?}")]
    IncorrectColumnOrder { expected: Vec<String>, got: Vec<String> },

    #[error("incorrect delimiter: must be exactly one character, got {0:?}")]
    IncorrectDelimiter(String),

    #[error("interrupted")]
    Interrupted,
}

/// `io::Error` isn't `Clone`, but `CsvDbError` needs to be (it flows through
/// broadcast-style error channels that may be observed by more than one
/// waiter). We keep the original message only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdIoErrorString(pub String);

impl fmt::Display for StdIoErrorString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StdIoErrorString {}

impl From<std::io::Error> for StdIoErrorString {
    fn from(err: std::io::Error) -> Self {
        StdIoErrorString(err.to_string())
    }
}
