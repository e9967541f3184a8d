//! Table reconstructor
//!
//! Rebuilds a rectangular grid from rows of cells with column and row
//! spans, then emits a pipe table.

use en_html::{Element, TagKind};

use crate::walker::{Scope, Walker};

/// Placeholder for cells that rendered to nothing
pub const EMPTY_CELL: &str = "&nbsp;";
/// Slot covered by the cell above
pub const ROW_CONTINUATION: &str = "^";

const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// A rendered cell with its spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub colspan: usize,
    pub rowspan: usize,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: 1,
            rowspan: 1,
        }
    }

    pub fn spans(mut self, colspan: usize, rowspan: usize) -> Self {
        self.colspan = colspan.clamp(1, MAX_COLSPAN);
        self.rowspan = rowspan.clamp(1, MAX_ROWSPAN);
        self
    }
}

/// Place cells into a rows × columns grid
///
/// The column count is the sum of the column spans of the first row that has
/// cells; rows without cells stay blank. A column
/// span fills the following slots with empty strings; a row span fills the
/// slots below with [`ROW_CONTINUATION`]. Cells that do not fit are dropped
/// and slots never filled become [`EMPTY_CELL`].
pub fn build_grid(rows: &[Vec<Cell>]) -> Vec<Vec<String>> {
    let columns: usize = rows
        .iter()
        .map(|row| row.iter().map(|c| c.colspan).sum())
        .find(|&n| n > 0)
        .unwrap_or(0);
    let mut grid: Vec<Vec<Option<String>>> = vec![vec![None; columns]; rows.len()];

    for (i, row) in rows.iter().enumerate() {
        let mut col = 0;
        for cell in row {
            while col < columns && grid[i][col].is_some() {
                col += 1;
            }
            if col >= columns {
                log::debug!("Dropping table cell outside the grid: {}", cell.text);
                break;
            }

            let text = if cell.text.is_empty() {
                EMPTY_CELL.to_string()
            } else {
                cell.text.clone()
            };
            grid[i][col] = Some(text);

            let right = (col + cell.colspan).min(columns);
            for slot in &mut grid[i][col + 1..right] {
                *slot = Some(String::new());
            }
            for below in grid.iter_mut().skip(i + 1).take(cell.rowspan - 1) {
                below[col] = Some(ROW_CONTINUATION.to_string());
                for slot in &mut below[col + 1..right] {
                    *slot = Some(String::new());
                }
            }
        }
    }

    grid.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|c| c.unwrap_or_else(|| EMPTY_CELL.to_string()))
                .collect()
        })
        .collect()
}

/// Emit a grid as a pipe table with a separator after the first row
pub fn render_grid(grid: &[Vec<String>]) -> String {
    let mut lines: Vec<String> = grid.iter().map(|row| format!("|{}|", row.join("|"))).collect();
    if let Some(first) = grid.first() {
        let separator = vec!["---"; first.len()].join("|");
        lines.insert(1.min(lines.len()), format!("|{separator}|"));
    }
    format!("\n{}\n\n", lines.join("\n"))
}

fn cells(tr: &Element) -> Vec<&Element> {
    tr.child_elements()
        .filter(|c| matches!(c.kind(), TagKind::Td | TagKind::Th))
        .collect()
}

/// Rows of cell elements, looking through header/body/footer groups
fn collect_rows(table: &Element) -> Vec<(&Element, Vec<&Element>)> {
    let mut rows = Vec::new();
    for child in table.child_elements() {
        match child.kind() {
            TagKind::Thead | TagKind::Tbody | TagKind::Tfoot => {
                for tr in child.child_elements().filter(|e| e.kind() == TagKind::Tr) {
                    rows.push((tr, cells(tr)));
                }
            }
            TagKind::Tr => rows.push((child, cells(child))),
            // colgroup, caption
            _ => {}
        }
    }
    rows
}

impl Walker<'_> {
    fn cell(&mut self, cell: &Element, row: &Scope<'_>) -> String {
        let scope = row.child(cell);
        self.merge(&cell.children, &scope).trim().to_string()
    }

    pub(crate) fn table(&mut self, scope: &Scope<'_>) -> String {
        let mut rows = collect_rows(scope.element);
        rows.retain(|(_, cells)| !cells.is_empty());
        if rows.is_empty() {
            return String::new();
        }

        // A single cell is layout, not data
        if let [(tr, cells)] = rows.as_slice()
            && let [only] = cells.as_slice()
        {
            let row = scope.child(tr);
            return format!("\n{}\n\n", self.cell(only, &row));
        }

        let mut grid_rows = Vec::with_capacity(rows.len());
        for (tr, cells) in &rows {
            let row = scope.child(tr);
            let mut rendered = Vec::with_capacity(cells.len());
            for cell in cells {
                let text = self
                    .cell(cell, &row)
                    .replace('\n', "<br>")
                    .replace('|', "\\|");
                rendered.push(Cell::new(text).spans(
                    cell.usize_attr("colspan").unwrap_or(1),
                    cell.usize_attr("rowspan").unwrap_or(1),
                ));
            }
            grid_rows.push(rendered);
        }

        render_grid(&build_grid(&grid_rows))
    }
}
