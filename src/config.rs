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

//! Runtime configuration (§6 "Configuration"): loaded from environment
//! variables, with an optional `.env` file read first via `dotenvy`.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CsvDbError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
const DEFAULT_WORKERS: usize = 50;
const DEFAULT_TABLE_LOCATION: &str = "./";
const DEFAULT_LIMIT: u32 = 100;
const DEFAULT_DELIMITER: char = ',';

/// The engine's runtime configuration (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Per-query wall-clock deadline.
    pub timeout: Duration,
    /// Worker tasks spawned per table executor.
    pub workers: usize,
    /// Base directory tables are resolved under.
    pub table_location: PathBuf,
    /// Upper bound (modulo §4.8's overshoot note) on result rows.
    pub limit: u32,
    /// The CSV field delimiter; must be exactly one character.
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            workers: DEFAULT_WORKERS,
            table_location: PathBuf::from(DEFAULT_TABLE_LOCATION),
            limit: DEFAULT_LIMIT,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl Config {
    /// Loads configuration from an optional `.env` file followed by the
    /// process environment, falling back to the defaults above for any
    /// variable that is unset. Recognizes `TIMEOUT`, `WORKERS`,
    /// `TABLELOCATION`, `LIMIT`, `DELIMITER`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let source = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .map_err(|e| CsvDbError::IncorrectQuery(format!("failed to read configuration: {e}")))?;

        let mut cfg = Config::default();

        if let Ok(raw) = source.get_string("timeout") {
            cfg.timeout = parse_duration(&raw)?;
        }
        if let Ok(workers) = source.get_int("workers") {
            cfg.workers = workers.max(1) as usize;
        }
        if let Ok(location) = source.get_string("tablelocation") {
            cfg.table_location = PathBuf::from(location);
        }
        if let Ok(limit) = source.get_int("limit") {
            cfg.limit = limit.max(0) as u32;
        }
        if let Ok(delimiter) = source.get_string("delimiter") {
            cfg.delimiter = parse_delimiter(&delimiter)?;
        }

        Ok(cfg)
    }

    /// Resolves `table` under [`Config::table_location`].
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.table_location.join(table)
    }
}

/// Parses a Go-style duration literal (`"500ms"`, `"2s"`, `"1ns"`): an
/// integer magnitude followed by one of the unit suffixes `ns`, `us`, `ms`,
/// `s`.
fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let unit_start = raw
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| CsvDbError::IncorrectQuery(format!("invalid timeout duration '{raw}'")))?;
    let (magnitude, unit) = raw.split_at(unit_start);
    let magnitude: u64 = magnitude
        .parse()
        .map_err(|_| CsvDbError::IncorrectQuery(format!("invalid timeout duration '{raw}'")))?;

    match unit {
        "ns" => Ok(Duration::from_nanos(magnitude)),
        "us" => Ok(Duration::from_micros(magnitude)),
        "ms" => Ok(Duration::from_millis(magnitude)),
        "s" => Ok(Duration::from_secs(magnitude)),
        _ => Err(CsvDbError::IncorrectQuery(format!("invalid timeout duration unit in '{raw}'"))),
    }
}

/// A delimiter must be exactly one character and, since the `csv` crate's
/// reader configures its delimiter as a single byte, that character must be
/// ASCII.
fn parse_delimiter(raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(CsvDbError::IncorrectDelimiter(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original() {
        let cfg = Config::default();
        assert_eq!(cfg.timeout, Duration::from_millis(500));
        assert_eq!(cfg.workers, 50);
        assert_eq!(cfg.table_location, PathBuf::from("./"));
        assert_eq!(cfg.limit, 100);
        assert_eq!(cfg.delimiter, ',');
    }

    #[test]
    fn parses_nanosecond_and_second_durations() {
        assert_eq!(parse_duration("1ns").unwrap(), Duration::from_nanos(1));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("5000ms").unwrap(), Duration::from_millis(5000));
    }

    #[test]
    fn rejects_malformed_duration() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("10").is_err());
    }

    #[test]
    fn delimiter_must_be_exactly_one_char() {
        assert_eq!(parse_delimiter(",").unwrap(), ',');
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn table_path_joins_base_directory() {
        let mut cfg = Config::default();
        cfg.table_location = PathBuf::from("/data");
        assert_eq!(cfg.table_path("users"), PathBuf::from("/data/users"));
    }
}
