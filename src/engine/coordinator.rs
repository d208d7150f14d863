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

//! The coordinator (§4.11): spawns the engine task, multiplexes headers,
//! results, and errors from every table executor under a shared deadline,
//! and assembles the final result table.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::connector::TableConnector;
use crate::engine::table::{self, ExecutorChannels, HeaderMessage};
use crate::error::{CsvDbError, Result};
use crate::parser;

/// The assembled result of one query: a header row plus zero or more
/// projected data rows, ready for §6's table writer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parses and runs `raw` to completion (or until its deadline fires), per
/// §4.11. `cancel` is shared with the caller so a process-level interrupt
/// (SIGINT) can cancel the same in-flight query the deadline would.
pub async fn run_query(
    raw: String,
    config: Arc<Config>,
    connector: Arc<dyn TableConnector>,
    cancel: CancellationToken,
) -> Result<QueryOutcome> {
    let selected = Arc::new(AtomicU32::new(0));

    let (headers_tx, mut headers_rx) = mpsc::channel::<HeaderMessage>(1);
    let (result_tx, mut result_rx) = mpsc::channel::<Vec<String>>(config.limit.max(1) as usize);
    let (error_tx, mut error_rx) = mpsc::channel::<CsvDbError>(1);
    let (finished_tx, finished_rx) = oneshot::channel::<()>();

    spawn_engine_task(raw, config.clone(), connector, selected.clone(), cancel.clone(), ExecutorChannels {
        headers_tx,
        result_tx,
        error_tx,
    }, finished_tx);

    let mut result_header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut deadline_fired = false;
    let mut headers_open = true;
    let mut result_open = true;
    let mut error_open = true;

    let deadline = tokio::time::sleep(config.timeout);
    tokio::pin!(deadline);
    tokio::pin!(finished_rx);

    loop {
        tokio::select! {
            biased;

            finished = &mut finished_rx => {
                let _ = finished;
                break;
            }
            msg = error_rx.recv(), if error_open => {
                match msg {
                    Some(err) => return Err(err),
                    None => error_open = false,
                }
            }
            msg = headers_rx.recv(), if headers_open => {
                match msg {
                    Some(msg) => record_header(&mut result_header, msg)?,
                    None => headers_open = false,
                }
            }
            row = result_rx.recv(), if result_open => {
                match row {
                    Some(row) => rows.push(row),
                    None => result_open = false,
                }
            }
            _ = &mut deadline, if !deadline_fired => {
                deadline_fired = true;
                tracing::warn!(timeout = ?config.timeout, "query deadline elapsed");
                cancel.cancel();
            }
        }
    }

    // Drain whatever arrived between the deadline firing and `finished`.
    while let Ok(msg) = headers_rx.try_recv() {
        record_header(&mut result_header, msg)?;
    }
    while let Ok(row) = result_rx.try_recv() {
        rows.push(row);
    }
    if let Ok(err) = error_rx.try_recv() {
        return Err(err);
    }

    if deadline_fired {
        return Err(CsvDbError::QueryTimeout(config.timeout));
    }

    Ok(QueryOutcome { header: result_header.unwrap_or_default(), rows })
}

/// Records one executor's header (§4.11's third bullet): the first header
/// observed anchors the expected shape; later headers are only checked
/// against it when the query projects `*`.
fn record_header(result_header: &mut Option<Vec<String>>, msg: HeaderMessage) -> Result<()> {
    match result_header {
        None => {
            *result_header = Some(msg.header);
            Ok(())
        }
        Some(first) if msg.star => {
            if first.len() != msg.header.len() {
                return Err(CsvDbError::IncorrectColumnCount { expected: first.len(), got: msg.header.len() });
            }
            if *first != msg.header {
                return Err(CsvDbError::IncorrectColumnOrder { expected: first.clone(), got: msg.header });
            }
            Ok(())
        }
        Some(_) => Ok(()),
    }
}

/// Spawns the engine task (§4.11 step 1): parses the query and, on success,
/// spawns one executor per FROM table, waits for all of them, and signals
/// `finished` exactly once, whether or not parsing succeeded.
fn spawn_engine_task(
    raw: String,
    config: Arc<Config>,
    connector: Arc<dyn TableConnector>,
    selected: Arc<AtomicU32>,
    cancel: CancellationToken,
    channels: ExecutorChannels,
    finished_tx: oneshot::Sender<()>,
) {
    tokio::spawn(async move {
        let span = tracing::info_span!("query", query = %raw);
        let _entered = span.enter();

        match parser::parse(&raw) {
            Err(err) => {
                let _ = channels.error_tx.send(err).await;
            }
            Ok(query) => {
                let query = Arc::new(query);
                let mut handles = Vec::with_capacity(query.from.len());

                for name in &query.from {
                    handles.push(tokio::spawn(table::run_executor(
                        name.clone(),
                        query.clone(),
                        config.clone(),
                        connector.clone(),
                        selected.clone(),
                        cancel.clone(),
                        channels.clone(),
                    )));
                }

                // Drop this task's own channel clones so the channels close
                // once every spawned executor (and, transitively, every
                // worker) has dropped its own clone.
                drop(channels);

                for handle in handles {
                    let _ = handle.await;
                }
            }
        }

        let _ = finished_tx.send(());
    });
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn first_header_is_recorded_without_checking() {
        let mut result_header = None;
        record_header(&mut result_header, HeaderMessage { star: true, header: vec!["a".into()] }).unwrap();
        assert_eq!(result_header, Some(vec!["a".into()]));
    }

    #[test]
    fn star_query_rejects_mismatched_length() {
        let mut result_header = Some(vec!["name".to_string(), "age".to_string()]);
        let err = record_header(&mut result_header, HeaderMessage { star: true, header: vec!["name".into()] })
            .unwrap_err();
        assert!(matches!(err, CsvDbError::IncorrectColumnCount { expected: 2, got: 1 }));
    }

    #[test]
    fn star_query_rejects_mismatched_order() {
        let mut result_header = Some(vec!["name".to_string(), "age".to_string()]);
        let err = record_header(&mut result_header, HeaderMessage {
            star: true,
            header: vec!["age".into(), "name".into()],
        })
        .unwrap_err();
        assert!(matches!(err, CsvDbError::IncorrectColumnOrder { .. }));
    }

    #[test]
    fn non_star_query_never_checks_subsequent_headers() {
        let mut result_header = Some(vec!["name".to_string()]);
        record_header(&mut result_header, HeaderMessage { star: false, header: vec!["totally".into(), "different".into()] })
            .unwrap();
        assert_eq!(result_header, Some(vec!["name".to_string()]));
    }
}
