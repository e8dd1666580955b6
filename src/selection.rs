use std::collections::BTreeSet;

use crate::grid::{CellId, GridExtent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Cell,
    Row,
    Column,
    Sheet,
}

/// What is highlighted and what clipboard/format operations act on.
///
/// `cells` is always derived from `kind` and the grid extent at the time the
/// selection was made; it is never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub kind: SelectionKind,
    pub anchor: CellId,
    pub end: Option<CellId>,
    cells: BTreeSet<CellId>,
}

impl Selection {
    pub fn single(id: CellId) -> Self {
        Self {
            kind: SelectionKind::Cell,
            anchor: id,
            end: None,
            cells: BTreeSet::from([id]),
        }
    }

    /// Rectangle spanning `start` and `end`, inclusive, in any corner order.
    pub fn range(start: CellId, end: CellId) -> Self {
        let (min_col, max_col) = (start.col.min(end.col), start.col.max(end.col));
        let (min_row, max_row) = (start.row.min(end.row), start.row.max(end.row));
        let mut cells = BTreeSet::new();
        for col in min_col..=max_col {
            for row in min_row..=max_row {
                cells.insert(CellId::new(col, row));
            }
        }
        Self {
            kind: SelectionKind::Cell,
            anchor: start,
            end: Some(end),
            cells,
        }
    }

    pub fn row(row: u32, extent: &GridExtent) -> Self {
        let cells: BTreeSet<CellId> = (0..extent.column_count()).map(|col| CellId::new(col, row)).collect();
        Self {
            kind: SelectionKind::Row,
            anchor: CellId::new(0, row),
            end: Some(CellId::new(extent.column_count() - 1, row)),
            cells,
        }
    }

    pub fn column(col: usize, extent: &GridExtent) -> Self {
        let cells: BTreeSet<CellId> = extent.rows().map(|row| CellId::new(col, row)).collect();
        Self {
            kind: SelectionKind::Column,
            anchor: CellId::new(col, 1),
            end: Some(CellId::new(col, extent.row_count())),
            cells,
        }
    }

    pub fn sheet(extent: &GridExtent) -> Self {
        let mut cells = BTreeSet::new();
        for col in 0..extent.column_count() {
            for row in extent.rows() {
                cells.insert(CellId::new(col, row));
            }
        }
        Self {
            kind: SelectionKind::Sheet,
            anchor: CellId::new(0, 1),
            end: Some(extent.last_cell()),
            cells,
        }
    }

    pub fn cells(&self) -> &BTreeSet<CellId> {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains(&id)
    }

    pub fn is_single(&self) -> bool {
        self.cells.len() == 1
    }

    /// Normalized bounds as (min_col, min_row, max_col, max_row).
    pub fn bounds(&self) -> (usize, u32, usize, u32) {
        let end = self.end.unwrap_or(self.anchor);
        (
            self.anchor.col.min(end.col),
            self.anchor.row.min(end.row),
            self.anchor.col.max(end.col),
            self.anchor.row.max(end.row),
        )
    }

    /// "B2" for one cell, "A1:C4" otherwise.
    pub fn range_label(&self) -> String {
        match self.end {
            Some(end) if self.kind != SelectionKind::Cell || end != self.anchor => {
                format!("{}:{}", self.anchor, end)
            }
            _ => self.anchor.to_string(),
        }
    }

    /// Covered cells grouped by row, in reading order.
    pub fn rows(&self) -> Vec<Vec<CellId>> {
        let mut rows: Vec<Vec<CellId>> = Vec::new();
        for id in &self.cells {
            match rows.last_mut() {
                Some(row) if row[0].row == id.row => row.push(*id),
                _ => rows.push(vec![*id]),
            }
        }
        rows
    }
}
