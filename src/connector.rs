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

//! The filesystem adapter (§6 "Filesystem adapter"): a narrow, injectable
//! interface between a table name and a byte stream, so the executor never
//! touches `std::fs` directly.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Resolves a table to a readable byte stream.
///
/// Implementations must be `Send + Sync` so a single connector can be shared
/// across all per-table executor tasks spawned for one query.
pub trait TableConnector: Send + Sync {
    /// Opens a byte stream for the table at `path`.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// True iff a table exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// The only [`TableConnector`] this crate ships: tables are plain files on
/// the local filesystem, resolved under the configured base directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileTableConnector;

impl TableConnector for FileTableConnector {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(path)?;
        Ok(Box::new(file))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
