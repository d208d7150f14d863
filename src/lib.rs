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

//! `csvdb`: an interactive SQL-like query engine over CSV files.
//!
//! The query compiler (`parser`, and the modules it builds on — `lexer`,
//! `operators`, `condition`, `notation`, `ast`, `structs`) turns a raw query
//! string into a typed [`ast::Query`]. The concurrent execution engine
//! (`engine`) evaluates one against a set of tables and produces a result
//! table, under a shared row limit and deadline.

pub mod ast;
pub mod condition;
pub mod config;
pub mod connector;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod logging;
pub mod notation;
pub mod operators;
pub mod output;
pub mod parser;
pub mod repl;
pub mod structs;
pub mod version;

pub use ast::Query;
pub use error::{CsvDbError, Result};
