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

//! Build metadata, analogous to `internal/version` in the original: the
//! crate version baked in at compile time via `CARGO_PKG_VERSION`.

/// The crate's semantic version, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A one-line banner shown by the REPL on startup.
pub fn banner() -> String {
    format!("csvdb {VERSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_includes_the_crate_version() {
        assert!(banner().contains(VERSION));
    }
}
