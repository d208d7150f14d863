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

//! The interactive prompt loop (§6 "CLI"): a banner, a `CsvDB > ` prompt,
//! one query per line, `exit` to quit, EOF to quit, Ctrl-C to interrupt
//! either the pending read or the in-flight query without tearing down the
//! REPL itself (§5).

use std::sync::Arc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::connector::TableConnector;
use crate::engine;
use crate::error::CsvDbError;
use crate::output;
use crate::version;

const PROMPT: &str = "CsvDB > ";

/// Runs the REPL to completion. Returns `Ok(())` on a clean exit (`exit` or
/// EOF); startup failures are the caller's responsibility (exit code 1 per
/// §6).
pub async fn run(config: Arc<Config>, connector: Arc<dyn TableConnector>) -> rustyline::Result<()> {
    println!("{}", version::banner());
    println!("Type a query, 'exit' to quit.");

    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if trimmed.eq_ignore_ascii_case("exit") {
                    break;
                }

                match run_one_query(trimmed.to_string(), config.clone(), connector.clone()).await {
                    Ok(outcome) => print!("{}", output::render_table(&outcome.header, &outcome.rows)),
                    Err(err) => eprintln!("error: {err}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("error: {}", CsvDbError::Interrupted);
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

/// Races one query to completion against a process-level interrupt, so
/// Ctrl-C during execution cancels the query (via the deadline's shared
/// cancellation token) without exiting the REPL (§5).
async fn run_one_query(
    query: String,
    config: Arc<Config>,
    connector: Arc<dyn TableConnector>,
) -> crate::error::Result<engine::QueryOutcome> {
    let cancel = CancellationToken::new();
    let query_future = engine::run_query(query, config, connector, cancel.clone());
    tokio::pin!(query_future);

    tokio::select! {
        result = &mut query_future => result,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            // Let the cancelled query unwind and report its own outcome
            // (QueryTimeout is the closest fit: the deadline path is what
            // observes `cancel` and winds the coordinator down).
            let _ = query_future.await;
            Err(CsvDbError::Interrupted)
        }
    }
}
