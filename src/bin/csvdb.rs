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

//! Binary entry point: wires configuration, logging, and the REPL together
//! (§6 "CLI": exit code 0 on clean exit, 1 on startup configuration failure).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use csvdb::config::Config;
use csvdb::connector::FileTableConnector;
use csvdb::{logging, repl};

/// Startup flags. Everything that recurs across queries is configured via
/// [`Config::load`]; this covers only what's needed before the REPL starts.
#[derive(Debug, Parser)]
#[command(name = "csvdb", version, about = "Interactive SQL-like query engine for CSV files")]
struct Cli {
    /// Directory the rolling log file is written under.
    #[arg(long, env = "LOG_DIR", default_value = "./logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = logging::init(&cli.log_dir);

    let connector = Arc::new(FileTableConnector);

    match repl::run(config, connector).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("repl error: {err}");
            ExitCode::FAILURE
        }
    }
}
