use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::clipboard::{self, ClipboardEntry, ClipboardKind, HostClipboard};
use crate::grid::{CellId, GridExtent};
use crate::selection::Selection;
use crate::store::{CellStore, CellStyle, StylePatch};

/// How long a freshly grown column/row stays highlighted.
pub const GROWTH_HIGHLIGHT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Growth {
    Column(String),
    Row(u32),
}

/// Notifications produced by sheet commands, drained once per event-loop turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetEvent {
    CellChanged(CellId),
    CellsCleared(usize),
    SelectionChanged(String),
    FormattingApplied(usize),
    Copied { range: String, cells: usize },
    Cut { range: String, cells: usize },
    Pasted { cells: usize, from_host: bool },
    ClipboardCleared,
    Grew(Growth),
}

/// Single owner of all grid state. The UI reads it and calls the command
/// methods; nothing else mutates it.
pub struct Sheet {
    extent: GridExtent,
    store: CellStore,
    selection: Selection,
    selected_cell: CellId,
    current_value: String,
    formatting: CellStyle,
    clipboard: Option<ClipboardEntry>,
    host: Box<dyn HostClipboard>,
    last_added: Option<(Growth, Instant)>,
    events: Vec<SheetEvent>,
}

impl Sheet {
    pub fn new(extent: GridExtent, store: CellStore, host: Box<dyn HostClipboard>) -> Self {
        let start = CellId::new(0, 1);
        let mut sheet = Self {
            extent,
            store,
            selection: Selection::single(start),
            selected_cell: start,
            current_value: String::new(),
            formatting: CellStyle::default(),
            clipboard: None,
            host,
            last_added: None,
            events: Vec::new(),
        };
        sheet.select_cell(start);
        sheet.events.clear();
        sheet
    }

    pub fn extent(&self) -> &GridExtent {
        &self.extent
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_cell(&self) -> CellId {
        self.selected_cell
    }

    /// The value shown in the formula bar.
    pub fn current_value(&self) -> &str {
        &self.current_value
    }

    pub fn formatting(&self) -> CellStyle {
        self.formatting
    }

    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.clipboard.as_ref()
    }

    pub fn last_added(&self) -> Option<&Growth> {
        self.last_added.as_ref().map(|(growth, _)| growth)
    }

    pub fn value(&self, id: CellId) -> &str {
        self.store.value(id)
    }

    pub fn style(&self, id: CellId) -> CellStyle {
        self.store.style(id)
    }

    pub fn drain_events(&mut self) -> Vec<SheetEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_value(&mut self, id: CellId, value: impl Into<String>) {
        let value = value.into();
        if id == self.selected_cell {
            self.current_value = value.clone();
        }
        self.store.set_value(id, value);
        self.events.push(SheetEvent::CellChanged(id));
    }

    pub fn set_style(&mut self, id: CellId, patch: StylePatch) {
        self.store.set_style(id, patch);
        if id == self.selected_cell {
            self.formatting = self.store.style(id);
        }
    }

    /// Select one cell and refresh the formula bar and formatting context
    /// from it in the same step.
    pub fn select_cell(&mut self, id: CellId) {
        self.selection = Selection::single(id);
        self.selected_cell = id;
        self.current_value = self.store.value(id).to_string();
        self.formatting = self.store.style(id);
        self.events.push(SheetEvent::SelectionChanged(self.selection.range_label()));
    }

    pub fn select_range(&mut self, start: CellId, end: CellId) {
        self.selection = Selection::range(start, end);
        self.selected_cell = start;
        self.events.push(SheetEvent::SelectionChanged(self.selection.range_label()));
    }

    pub fn select_row(&mut self, row: u32) {
        self.selection = Selection::row(row, &self.extent);
        self.events.push(SheetEvent::SelectionChanged(self.selection.range_label()));
    }

    pub fn select_column(&mut self, col: usize) {
        self.selection = Selection::column(col, &self.extent);
        self.events.push(SheetEvent::SelectionChanged(self.selection.range_label()));
    }

    pub fn select_sheet(&mut self) {
        self.selection = Selection::sheet(&self.extent);
        self.events.push(SheetEvent::SelectionChanged(self.selection.range_label()));
    }

    /// Move the selected cell one step. Down and Right grow the grid when
    /// already on the last row/column.
    pub fn move_selection(&mut self, direction: Direction) {
        let current = self.selected_cell;
        let target = match direction {
            Direction::Up => self.extent.adjacent(current, 0, -1).unwrap_or(current),
            Direction::Left => self.extent.adjacent(current, -1, 0).unwrap_or(current),
            Direction::Down => {
                if current.row >= self.extent.row_count() {
                    let row = self.extent.add_row();
                    self.mark_added(Growth::Row(row));
                }
                self.extent.adjacent(current, 0, 1).unwrap_or(current)
            }
            Direction::Right => {
                if current.col + 1 >= self.extent.column_count() {
                    let label = self.extent.add_column();
                    self.mark_added(Growth::Column(label));
                }
                self.extent.adjacent(current, 1, 0).unwrap_or(current)
            }
        };
        self.select_cell(target);
    }

    /// Grow the range selection from its anchor by one step (shift+arrow).
    pub fn extend_selection(&mut self, direction: Direction) {
        let anchor = self.selection.anchor;
        let end = self.selection.end.unwrap_or(anchor);
        let (dc, dr) = match direction {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        };
        if let Some(end) = self.extent.adjacent(end, dc, dr) {
            self.select_range(anchor, end);
        }
    }

    fn mark_added(&mut self, growth: Growth) {
        self.last_added = Some((growth.clone(), Instant::now()));
        self.events.push(SheetEvent::Grew(growth));
    }

    /// Drops the growth highlight once it has been shown long enough.
    pub fn clear_expired_highlight(&mut self, now: Instant) {
        if let Some((_, added)) = &self.last_added {
            if now.duration_since(*added) >= GROWTH_HIGHLIGHT {
                self.last_added = None;
            }
        }
    }

    pub fn set_formatting(&mut self, patch: StylePatch) {
        self.formatting = self.formatting.merged(patch);
    }

    /// Write the formatting context as the full style of every covered cell.
    pub fn apply_formatting_to_selection(&mut self) {
        for id in self.selection.cells() {
            self.store.replace_style(*id, self.formatting);
        }
        self.events.push(SheetEvent::FormattingApplied(self.selection.len()));
    }

    fn snapshot(&self, kind: ClipboardKind) -> ClipboardEntry {
        let data: BTreeMap<CellId, String> = self
            .selection
            .cells()
            .iter()
            .map(|id| (*id, self.store.value(*id).to_string()))
            .collect();
        let range = if self.selection.is_single() {
            self.selected_cell.to_string()
        } else {
            self.selection.range_label()
        };
        ClipboardEntry { kind, data, range }
    }

    fn mirror_to_host(&mut self, entry: &ClipboardEntry) {
        if let Err(err) = self.host.set_text(&entry.to_text()) {
            log::warn!("Clipboard API not available: {err}");
        }
    }

    pub fn copy(&mut self) {
        let entry = self.snapshot(ClipboardKind::Copy);
        self.mirror_to_host(&entry);
        log::debug!("copy {} ({} cells)", entry.range, entry.data.len());
        self.events.push(SheetEvent::Copied {
            range: entry.range.clone(),
            cells: entry.data.len(),
        });
        self.clipboard = Some(entry);
    }

    /// Snapshot the selection, then remove its cells right away.
    pub fn cut(&mut self) {
        let entry = self.snapshot(ClipboardKind::Cut);
        self.mirror_to_host(&entry);
        for id in entry.data.keys() {
            self.store.remove(*id);
        }
        self.current_value.clear();
        log::debug!("cut {} ({} cells)", entry.range, entry.data.len());
        self.events.push(SheetEvent::Cut {
            range: entry.range.clone(),
            cells: entry.data.len(),
        });
        self.clipboard = Some(entry);
    }

    /// Paste the internal clipboard back at the ids it was taken from. A cut
    /// can be pasted once; after that, or with nothing copied, host text is
    /// spread from `target` (default: the selected cell) rightwards and down.
    pub fn paste(&mut self, target: Option<CellId>) {
        let Some(entry) = self.clipboard.take() else {
            self.paste_from_host(target.unwrap_or(self.selected_cell));
            return;
        };

        for (id, value) in &entry.data {
            self.store.set_value(*id, value.clone());
        }
        if let Some(value) = entry.data.get(&self.selected_cell) {
            self.current_value = value.clone();
        }
        log::debug!("paste {} ({} cells)", entry.range, entry.data.len());
        self.events.push(SheetEvent::Pasted {
            cells: entry.data.len(),
            from_host: false,
        });

        if entry.kind == ClipboardKind::Copy {
            self.clipboard = Some(entry);
        }
    }

    fn paste_from_host(&mut self, target: CellId) {
        let text = match self.host.get_text() {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Clipboard API not available: {err}");
                return;
            }
        };

        let mut cells = 0;
        for (row_offset, row) in clipboard::parse_text(&text).into_iter().enumerate() {
            for (col_offset, value) in row.into_iter().enumerate() {
                if let Some(id) = self.extent.adjacent(target, col_offset as i64, row_offset as i64) {
                    if id == self.selected_cell {
                        self.current_value = value.clone();
                    }
                    self.store.set_value(id, value);
                    cells += 1;
                }
            }
        }
        log::debug!("paste {cells} cells from system clipboard at {target}");
        self.events.push(SheetEvent::Pasted { cells, from_host: true });
    }

    /// Remove every covered cell. The clipboard is left alone.
    pub fn delete(&mut self) {
        let mut cleared = 0;
        for id in self.selection.cells() {
            if self.store.remove(*id).is_some() {
                cleared += 1;
            }
        }
        self.current_value.clear();
        self.events.push(SheetEvent::CellsCleared(cleared));
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard = None;
        self.events.push(SheetEvent::ClipboardCleared);
    }
}
