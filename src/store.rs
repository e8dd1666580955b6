use std::collections::HashMap;
use std::fmt;

use crate::grid::CellId;

pub const DEFAULT_FONT_SIZE: u16 = 12;

/// Font sizes offered by the toolbar, smallest first.
pub const FONT_SIZES: [u16; 13] = [8, 9, 10, 11, 12, 14, 16, 18, 20, 24, 28, 32, 36];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub font_size: u16,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
        }
    }
}

impl CellStyle {
    pub fn merged(mut self, patch: StylePatch) -> Self {
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(bold) = patch.bold {
            self.bold = bold;
        }
        if let Some(italic) = patch.italic {
            self.italic = italic;
        }
        if let Some(underline) = patch.underline {
            self.underline = underline;
        }
        if let Some(strikethrough) = patch.strikethrough {
            self.strikethrough = strikethrough;
        }
        self
    }
}

impl fmt::Display for CellStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "{}pt {}{}{}{}",
            self.font_size,
            flag(self.bold, 'B'),
            flag(self.italic, 'I'),
            flag(self.underline, 'U'),
            flag(self.strikethrough, 'S')
        )
    }
}

/// Partial style update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StylePatch {
    pub font_size: Option<u16>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
}

impl StylePatch {
    pub fn font_size(size: u16) -> Self {
        Self { font_size: Some(size), ..Self::default() }
    }

    pub fn bold(on: bool) -> Self {
        Self { bold: Some(on), ..Self::default() }
    }

    pub fn italic(on: bool) -> Self {
        Self { italic: Some(on), ..Self::default() }
    }

    pub fn underline(on: bool) -> Self {
        Self { underline: Some(on), ..Self::default() }
    }

    pub fn strikethrough(on: bool) -> Self {
        Self { strikethrough: Some(on), ..Self::default() }
    }
}

/// Values and styles keyed by cell. Entries exist only for cells that were
/// written; reads of anything else give the defaults.
#[derive(Debug, Clone, Default)]
pub struct CellStore {
    values: HashMap<CellId, String>,
    styles: HashMap<CellId, CellStyle>,
}

impl CellStore {
    /// The "Sales Report Q2" table the editor opens with.
    pub fn sample() -> Self {
        let mut store = Self::default();
        let values = [
            ("A1", "Sales Report Q2"),
            ("A2", "Product"),
            ("B2", "Q1 Sales"),
            ("C2", "Q2 Sales"),
            ("D2", "Growth %"),
            ("A3", "Widget A"),
            ("B3", "1250"),
            ("C3", "1450"),
            ("D3", "16%"),
            ("A4", "Widget B"),
            ("B4", "890"),
            ("C4", "1020"),
            ("D4", "14.6%"),
            ("A5", "Widget C"),
            ("B5", "2100"),
            ("C5", "1950"),
            ("D5", "-7.1%"),
        ];
        for (id, value) in values {
            store.set_value(CellId::parse_lenient(id), value);
        }

        store.set_style(
            CellId::parse_lenient("A1"),
            StylePatch { font_size: Some(16), bold: Some(true), ..StylePatch::default() },
        );
        for id in ["A2", "B2", "C2", "D2"] {
            store.set_style(CellId::parse_lenient(id), StylePatch::bold(true));
        }
        store
    }

    pub fn value(&self, id: CellId) -> &str {
        self.values.get(&id).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn set_value(&mut self, id: CellId, value: impl Into<String>) {
        self.values.insert(id, value.into());
    }

    /// Drops the entry entirely; returns the old value if there was one.
    pub fn remove(&mut self, id: CellId) -> Option<String> {
        self.values.remove(&id)
    }

    pub fn style(&self, id: CellId) -> CellStyle {
        self.styles.get(&id).copied().unwrap_or_default()
    }

    pub fn set_style(&mut self, id: CellId, patch: StylePatch) {
        let style = self.style(id).merged(patch);
        self.styles.insert(id, style);
    }

    pub fn replace_style(&mut self, id: CellId, style: CellStyle) {
        self.styles.insert(id, style);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
