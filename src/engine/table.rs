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

//! The table executor (§4.7) and its worker pool (§4.8): one task per FROM
//! entry, opening a CSV stream, validating headers, and fanning rows out to
//! `config.workers` evaluator tasks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::ast::{Query, STAR};
use crate::config::Config;
use crate::connector::TableConnector;
use crate::error::{CsvDbError, Result};

/// A header reported by one executor, tagged with the query's `star` flag
/// so the coordinator can decide whether cross-table shape validation (§4.11)
/// applies without needing its own copy of the parsed [`Query`].
#[derive(Debug, Clone)]
pub struct HeaderMessage {
    pub star: bool,
    pub header: Vec<String>,
}

/// The channel endpoints an executor reports through. Held by value so each
/// executor owns (and, on task exit, drops) its own clone — the coordinator
/// observes the channels closing once every executor and worker has exited.
#[derive(Clone)]
pub struct ExecutorChannels {
    pub headers_tx: mpsc::Sender<HeaderMessage>,
    pub result_tx: mpsc::Sender<Vec<String>>,
    pub error_tx: mpsc::Sender<CsvDbError>,
}

/// Runs one table's executor lifecycle end to end (§4.7, §4.12): resolve,
/// connect, read header, validate columns, spawn workers, scan rows, and
/// (implicitly, via `Drop`) close the stream on exit.
pub async fn run_executor(
    table: String,
    query: Arc<Query>,
    config: Arc<Config>,
    connector: Arc<dyn TableConnector>,
    selected: Arc<AtomicU32>,
    cancel: CancellationToken,
    channels: ExecutorChannels,
) {
    let path = config.table_path(&table);

    if !connector.exists(&path) {
        let _ = channels.error_tx.send(CsvDbError::TableNotExist { table }).await;
        return;
    }

    let stream = match connector.open(&path) {
        Ok(stream) => stream,
        Err(err) => {
            let _ = channels.error_tx.send(CsvDbError::TableConnection(err.to_string())).await;
            return;
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(stream);
    let mut records = reader.records();

    let header: Vec<String> = match records.next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        Some(Err(err)) => {
            let _ = channels.error_tx.send(CsvDbError::TableColumnsRead(err.to_string())).await;
            return;
        }
        None => {
            let _ = channels
                .error_tx
                .send(CsvDbError::TableColumnsRead(format!("table '{table}' has no header row")))
                .await;
            return;
        }
    };

    let column_index = match resolve_columns(&table, &query.used_columns, &header) {
        Ok(index) => index,
        Err(err) => {
            let _ = channels.error_tx.send(err).await;
            return;
        }
    };

    let projected_header = project(&query.select, &header, &column_index)
        .expect("the header's own columns always resolve against column_index built from it");
    if channels.headers_tx.send(HeaderMessage { star: query.star, header: projected_header }).await.is_err() {
        tracing::debug!(table, "coordinator gone before header sent");
        return;
    }

    let (row_tx, row_rx) = mpsc::channel::<Vec<String>>(config.workers.max(1));
    let row_rx = Arc::new(Mutex::new(row_rx));

    let mut worker_handles = Vec::with_capacity(config.workers);
    for _ in 0..config.workers {
        worker_handles.push(tokio::spawn(run_worker(
            row_rx.clone(),
            query.clone(),
            config.clone(),
            column_index.clone(),
            selected.clone(),
            channels.result_tx.clone(),
            channels.error_tx.clone(),
        )));
    }

    scan_rows(&mut records, &config, &selected, &cancel, row_tx).await;

    for handle in worker_handles {
        let _ = handle.await;
    }

    tracing::debug!(table, "executor finished, stream closed");
}

/// The producer half of §4.8: reads rows while under `config.limit` and
/// feeds the bounded worker channel, stopping early on EOF, a parse error,
/// or the deadline firing.
async fn scan_rows<R: std::io::Read>(
    records: &mut csv::StringRecordsIter<'_, R>,
    config: &Config,
    selected: &AtomicU32,
    cancel: &CancellationToken,
    row_tx: mpsc::Sender<Vec<String>>,
) {
    loop {
        if selected.load(Ordering::Relaxed) >= config.limit {
            break;
        }

        let record = match records.next() {
            Some(Ok(record)) => record,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "row parse error, ending table scan");
                break;
            }
            None => break,
        };

        let row: Vec<String> = record.iter().map(str::to_string).collect();

        tokio::select! {
            _ = cancel.cancelled() => break,
            send_result = row_tx.send(row) => {
                if send_result.is_err() {
                    break;
                }
            }
        }
    }
}

/// One worker (§4.8): evaluates the WHERE tree against each row it receives
/// and forwards surviving, projected rows, yielding after each row so a
/// fixed-size pool makes fair progress.
async fn run_worker(
    row_rx: Arc<Mutex<mpsc::Receiver<Vec<String>>>>,
    query: Arc<Query>,
    config: Arc<Config>,
    column_index: HashMap<String, usize>,
    selected: Arc<AtomicU32>,
    result_tx: mpsc::Sender<Vec<String>>,
    error_tx: mpsc::Sender<CsvDbError>,
) {
    loop {
        let row = {
            let mut rx = row_rx.lock().await;
            rx.recv().await
        };
        let Some(row) = row else { break };

        let matched = match &query.where_expr {
            None => Ok(true),
            Some(expr) => expr.eval(&row, &column_index, &query.conditions),
        };

        match matched {
            Ok(true) => {
                if selected.load(Ordering::Relaxed) < config.limit {
                    selected.fetch_add(1, Ordering::Relaxed);
                    match project(&query.select, &row, &column_index) {
                        Ok(projected) => {
                            if result_tx.send(projected).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            let _ = error_tx.send(err).await;
                            break;
                        }
                    }
                }
            }
            Ok(false) => {}
            Err(err) => {
                let _ = error_tx.send(err).await;
                break;
            }
        }

        tokio::task::yield_now().await;
    }
}

/// Locates each `used_column`'s 0-based index in `header` (§4.7 step 4),
/// reporting every unresolved column at once, not just the first.
fn resolve_columns(table: &str, used_columns: &[String], header: &[String]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(used_columns.len());
    let mut missing = Vec::new();

    for column in used_columns {
        match header.iter().position(|h| h == column) {
            Some(pos) => {
                index.insert(column.clone(), pos);
            }
            None => missing.push(column.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(CsvDbError::NotExistColumn { table: table.to_string(), columns: missing });
    }

    Ok(index)
}

/// Projects one row according to the SELECT list (§4.10): `*` splices the
/// whole row, any other symbol splices its resolved cell.
fn project(select: &[String], row: &[String], column_index: &HashMap<String, usize>) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(row.len());

    for symbol in select {
        if symbol == STAR {
            out.extend(row.iter().cloned());
        } else {
            let idx = *column_index
                .get(symbol)
                .expect("select columns are always included in used_columns, resolved before scanning begins");
            let cell = row.get(idx).ok_or_else(|| CsvDbError::IncorrectTableRow { index: idx, row: row.to_vec() })?;
            out.push(cell.clone());
        }
    }

    Ok(out)
}
