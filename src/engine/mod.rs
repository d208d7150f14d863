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

//! The concurrent execution engine (§4.7-§4.11): per-table executors, their
//! worker pools, and the coordinator that multiplexes their output under a
//! shared deadline and row limit.

pub mod coordinator;
pub mod table;

pub use coordinator::{run_query, QueryOutcome};
