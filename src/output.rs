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

//! A small hand-rolled, right-aligned column writer for query results.

const COLUMN_SEPARATOR: &str = "|";
const MIN_PADDING: usize = 3;

/// Renders `header` followed by `rows` as a right-aligned, `|`-separated
/// text table with at least [`MIN_PADDING`] spaces of fill around every
/// separator.
pub fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let widths = column_widths(header, rows);

    let mut out = String::new();
    write_row(&mut out, header, &widths);
    for row in rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn column_widths(header: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = header.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i >= widths.len() {
                widths.push(cell.chars().count());
            } else {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }
    widths
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let pad = " ".repeat(MIN_PADDING);
    let separator = format!("{pad}{COLUMN_SEPARATOR}{pad}");

    let rendered: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let width = widths.get(i).copied().unwrap_or_else(|| cell.chars().count());
            format!("{cell:>width$}")
        })
        .collect();

    out.push_str(&rendered.join(&separator));
    out.push('\n');
}
