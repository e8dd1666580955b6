use std::fmt;
use std::str::FromStr;

pub const DEFAULT_COLUMNS: usize = 26;
pub const DEFAULT_ROWS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellIdError {
    #[error("empty cell id")]
    Empty,
    #[error("cell id {0:?} has no column letters")]
    MissingColumn(String),
    #[error("cell id {0:?} has no row number")]
    MissingRow(String),
    #[error("cell id {0:?} has an invalid row")]
    InvalidRow(String),
}

/// Address of one cell: 0-based column index plus 1-based row number.
///
/// Ordered row-major so iterating a set of ids walks the grid the way it is
/// read (left to right, then down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub row: u32,
    pub col: usize,
}

impl CellId {
    pub fn new(col: usize, row: u32) -> Self {
        Self { row, col }
    }

    pub fn column_label(&self) -> String {
        column_label(self.col)
    }

    /// Parse "A1"-style ids. Column letters must be uppercase.
    pub fn parse(s: &str) -> Result<Self, CellIdError> {
        if s.is_empty() {
            return Err(CellIdError::Empty);
        }
        let split = s.find(|c: char| !c.is_ascii_uppercase()).unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() {
            return Err(CellIdError::MissingColumn(s.to_string()));
        }
        if digits.is_empty() {
            return Err(CellIdError::MissingRow(s.to_string()));
        }
        let col = column_index(letters).ok_or_else(|| CellIdError::MissingColumn(s.to_string()))?;
        let row: u32 = digits.parse().map_err(|_| CellIdError::InvalidRow(s.to_string()))?;
        if row == 0 {
            return Err(CellIdError::InvalidRow(s.to_string()));
        }
        Ok(Self::new(col, row))
    }

    /// Like [`CellId::parse`], but a missing column falls back to `A` and a
    /// missing row to `1` instead of failing.
    pub fn parse_lenient(s: &str) -> Self {
        let letters: String = s
            .chars()
            .skip_while(|c| !c.is_ascii_uppercase())
            .take_while(|c| c.is_ascii_uppercase())
            .collect();
        let digits: String = s
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let col = column_index(&letters).unwrap_or(0);
        let row = digits.parse::<u32>().ok().filter(|r| *r > 0).unwrap_or(1);
        Self::new(col, row)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_label(self.col), self.row)
    }
}

impl FromStr for CellId {
    type Err = CellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Bijective base-26 column label: 0 -> A, 25 -> Z, 26 -> AA, 52 -> BA.
pub fn column_label(index: usize) -> String {
    let mut n = index + 1;
    let mut result = String::new();
    while n > 0 {
        n -= 1;
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        n /= 26;
    }
    result
}

/// Inverse of [`column_label`].
pub fn column_index(label: &str) -> Option<usize> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let n = label
        .bytes()
        .try_fold(0usize, |acc, b| acc.checked_mul(26)?.checked_add((b - b'A') as usize + 1))?;
    Some(n - 1)
}

/// The addressable part of the sheet. Columns and rows only ever grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridExtent {
    columns: Vec<String>,
    rows: u32,
}

impl Default for GridExtent {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}

impl GridExtent {
    pub fn new(columns: usize, rows: u32) -> Self {
        Self {
            columns: (0..columns.max(1)).map(column_label).collect(),
            rows: rows.max(1),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> u32 {
        self.rows
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.rows
    }

    pub fn contains(&self, id: CellId) -> bool {
        id.col < self.columns.len() && id.row >= 1 && id.row <= self.rows
    }

    pub fn last_cell(&self) -> CellId {
        CellId::new(self.columns.len() - 1, self.rows)
    }

    /// The cell `col_offset` columns and `row_offset` rows away from `id`, or
    /// `None` when that falls outside the current extent.
    pub fn adjacent(&self, id: CellId, col_offset: i64, row_offset: i64) -> Option<CellId> {
        let col = id.col as i64 + col_offset;
        let row = id.row as i64 + row_offset;
        if col < 0 || col >= self.columns.len() as i64 || row < 1 || row > self.rows as i64 {
            return None;
        }
        Some(CellId::new(col as usize, row as u32))
    }

    /// Appends the next column label and returns it.
    pub fn add_column(&mut self) -> String {
        let label = column_label(self.columns.len());
        self.columns.push(label.clone());
        log::info!("Added new column: {label}");
        label
    }

    /// Appends the next row number and returns it.
    pub fn add_row(&mut self) -> u32 {
        self.rows += 1;
        log::info!("Added new row: {}", self.rows);
        self.rows
    }
}
