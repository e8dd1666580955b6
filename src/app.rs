use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::clipboard::{DisabledClipboard, HostClipboard, SystemClipboard};
use crate::editing::Editor;
use crate::grid::{CellId, GridExtent};
use crate::search::{PaletteOutcome, SearchPalette};
use crate::sheet::{Direction, Growth, Sheet, SheetEvent};
use crate::shortcuts::{GlobalAction, KeyBinding, ShortcutGuard, Shortcuts};
use crate::store::{CellStore, FONT_SIZES, StylePatch};

pub const DEFAULT_COLUMN_WIDTH: u16 = 10;
pub const ROW_HEADER_WIDTH: u16 = 6;

/// Two clicks on the same cell within this window count as a double click.
const DOUBLE_CLICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Edit,
    Search,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub columns: usize,
    pub rows: u32,
    pub sample_data: bool,
    pub system_clipboard: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: crate::grid::DEFAULT_COLUMNS,
            rows: crate::grid::DEFAULT_ROWS,
            sample_data: true,
            system_clipboard: true,
        }
    }
}

/// Where the grid was last drawn, so mouse positions can be mapped back to
/// cells and headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridGeometry {
    pub header_y: u16,
    pub row_header_x: u16,
    /// (x, width, column index) of each visible column.
    pub columns: Vec<(u16, u16, usize)>,
    /// (y, row number) of each visible row.
    pub rows: Vec<(u16, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Corner,
    ColumnHeader(usize),
    RowHeader(u32),
    Cell(CellId),
}

impl GridGeometry {
    pub fn hit(&self, x: u16, y: u16) -> Option<Hit> {
        let column = self
            .columns
            .iter()
            .find(|(cx, width, _)| x >= *cx && x < cx + width)
            .map(|(_, _, col)| *col);
        let in_row_header = x >= self.row_header_x && x < self.row_header_x + ROW_HEADER_WIDTH;

        if y == self.header_y {
            return match column {
                Some(col) => Some(Hit::ColumnHeader(col)),
                None if in_row_header => Some(Hit::Corner),
                None => None,
            };
        }

        let row = self.rows.iter().find(|(ry, _)| *ry == y).map(|(_, row)| *row)?;
        match column {
            Some(col) => Some(Hit::Cell(CellId::new(col, row))),
            None if in_row_header => Some(Hit::RowHeader(row)),
            None => None,
        }
    }
}

pub struct App<'a> {
    pub sheet: Sheet,
    pub editor: Editor<'a>,
    pub search: SearchPalette<'a>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub scroll: (u32, usize), // (row_offset, col_offset) 0-based
    pub viewport_size: (u16, u16), // (rows, cols) visible in grid
    pub geometry: GridGeometry,
    shortcuts: Shortcuts,
    _search_shortcut: ShortcutGuard,
    last_click: Option<(CellId, Instant)>,
}

impl<'a> App<'a> {
    pub fn new(config: Config) -> Self {
        let host: Box<dyn HostClipboard> = if config.system_clipboard {
            Box::new(SystemClipboard)
        } else {
            Box::new(DisabledClipboard)
        };
        let store = if config.sample_data { CellStore::sample() } else { CellStore::default() };
        let sheet = Sheet::new(GridExtent::new(config.columns, config.rows), store, host);

        let shortcuts = Shortcuts::default();
        let search_shortcut = shortcuts.register(KeyBinding::ctrl('k'), GlobalAction::OpenSearch);

        log::info!(
            "grid {}x{}, {} cells loaded",
            sheet.extent().column_count(),
            sheet.extent().row_count(),
            sheet.store().len()
        );

        Self {
            sheet,
            editor: Editor::default(),
            search: SearchPalette::default(),
            should_quit: false,
            status_message: None,
            scroll: (0, 0),
            viewport_size: (20, 8), // Default, will be updated by UI
            geometry: GridGeometry::default(),
            shortcuts,
            _search_shortcut: search_shortcut,
            last_click: None,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.search.is_open() {
            Mode::Search
        } else if self.editor.is_editing() {
            Mode::Edit
        } else {
            Mode::View
        }
    }

    pub fn on_tick(&mut self) {
        self.sheet.clear_expired_highlight(Instant::now());
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Clear status message on any key press
        self.status_message = None;

        if let Some(action) = self.shortcuts.lookup(&key) {
            match action {
                GlobalAction::OpenSearch => self.search.open(),
            }
            return;
        }

        match self.mode() {
            Mode::Search => {
                if let PaletteOutcome::Selected(entry) = self.search.on_key(key) {
                    self.status_message = Some(format!("Selected: {} ({})", entry.name, entry.domain));
                }
            }
            Mode::Edit => self.on_edit_key(key),
            Mode::View => self.on_view_key(key),
        }

        self.process_events();
    }

    fn on_view_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('w') if ctrl => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.sheet.copy(),
            KeyCode::Char('x') if ctrl => self.sheet.cut(),
            KeyCode::Char('v') if ctrl => self.sheet.paste(None),
            KeyCode::Char('a') if ctrl => self.sheet.select_sheet(),
            KeyCode::Char('b') if alt => self.toggle_format(|s| s.bold, StylePatch::bold),
            KeyCode::Char('i') if alt => self.toggle_format(|s| s.italic, StylePatch::italic),
            KeyCode::Char('u') if alt => self.toggle_format(|s| s.underline, StylePatch::underline),
            KeyCode::Char('s') if alt => self.toggle_format(|s| s.strikethrough, StylePatch::strikethrough),
            KeyCode::Char('=') | KeyCode::Char('+') if alt => self.step_font_size(1),
            KeyCode::Char('-') if alt => self.step_font_size(-1),
            KeyCode::Delete | KeyCode::Backspace => self.sheet.delete(),
            KeyCode::F(2) => self.begin_edit(),
            KeyCode::Esc => self.sheet.select_cell(self.sheet.selected_cell()),
            // Arrow keys + Shift for selection
            KeyCode::Left if shift => self.sheet.extend_selection(Direction::Left),
            KeyCode::Right if shift => self.sheet.extend_selection(Direction::Right),
            KeyCode::Up if shift => self.sheet.extend_selection(Direction::Up),
            KeyCode::Down if shift => self.sheet.extend_selection(Direction::Down),
            KeyCode::Left => self.sheet.move_selection(Direction::Left),
            KeyCode::Right => self.sheet.move_selection(Direction::Right),
            KeyCode::Up => self.sheet.move_selection(Direction::Up),
            KeyCode::Down => self.sheet.move_selection(Direction::Down),
            KeyCode::Tab if shift => self.sheet.move_selection(Direction::Left),
            KeyCode::Tab => self.sheet.move_selection(Direction::Right),
            KeyCode::BackTab => self.sheet.move_selection(Direction::Left),
            KeyCode::Enter => {
                let direction = if shift { Direction::Up } else { Direction::Down };
                self.sheet.move_selection(direction);
                self.editor.begin_fresh(self.sheet.selected_cell());
            }
            // Start typing: overwrite the cell with a fresh draft
            KeyCode::Char(c) if !ctrl && !alt => {
                self.editor.begin_fresh(self.sheet.selected_cell());
                self.editor.insert_char(c);
            }
            _ => {}
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => {
                self.editor.cancel();
            }
            KeyCode::Enter if shift => {
                self.commit_edit();
                self.sheet.move_selection(Direction::Up);
            }
            KeyCode::Enter => {
                self.commit_edit();
                self.sheet.move_selection(Direction::Down);
                self.editor.begin_fresh(self.sheet.selected_cell());
            }
            KeyCode::Tab if shift => {
                self.commit_edit();
                self.sheet.move_selection(Direction::Left);
            }
            KeyCode::BackTab => {
                self.commit_edit();
                self.sheet.move_selection(Direction::Left);
            }
            KeyCode::Tab => {
                self.commit_edit();
                self.sheet.move_selection(Direction::Right);
            }
            _ => {
                self.editor.input(key);
            }
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.search.is_open() {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(hit) = self.geometry.hit(mouse.column, mouse.row) else {
                    return;
                };
                self.status_message = None;
                // Clicking elsewhere takes focus away from the editor
                self.commit_edit();
                match hit {
                    Hit::Corner => self.sheet.select_sheet(),
                    Hit::ColumnHeader(col) => self.sheet.select_column(col),
                    Hit::RowHeader(row) => self.sheet.select_row(row),
                    Hit::Cell(id) if mouse.modifiers.contains(KeyModifiers::SHIFT) => {
                        self.sheet.select_range(self.sheet.selected_cell(), id);
                    }
                    Hit::Cell(id) => self.click_cell(id, Instant::now()),
                }
                self.process_events();
            }
            MouseEventKind::ScrollDown => {
                let max = self.sheet.extent().row_count().saturating_sub(1);
                self.scroll.0 = (self.scroll.0 + 3).min(max);
            }
            MouseEventKind::ScrollUp => {
                self.scroll.0 = self.scroll.0.saturating_sub(3);
            }
            _ => {}
        }
    }

    fn click_cell(&mut self, id: CellId, now: Instant) {
        let double = matches!(
            self.last_click,
            Some((last, at)) if last == id && now.duration_since(at) <= DOUBLE_CLICK
        );
        self.sheet.select_cell(id);
        if double {
            self.last_click = None;
            self.begin_edit();
        } else {
            self.last_click = Some((id, now));
        }
    }

    fn begin_edit(&mut self) {
        let cell = self.sheet.selected_cell();
        self.editor.begin(cell, self.sheet.value(cell));
    }

    fn commit_edit(&mut self) {
        if let Some((cell, text)) = self.editor.commit() {
            self.sheet.set_value(cell, text);
        }
    }

    fn toggle_format(&mut self, current: fn(&crate::store::CellStyle) -> bool, patch: fn(bool) -> StylePatch) {
        let on = !current(&self.sheet.formatting());
        self.sheet.set_formatting(patch(on));
        self.sheet.apply_formatting_to_selection();
    }

    fn step_font_size(&mut self, delta: i32) {
        let size = self.sheet.formatting().font_size;
        let index = FONT_SIZES
            .iter()
            .position(|s| *s >= size)
            .unwrap_or(FONT_SIZES.len() - 1) as i32;
        let next = (index + delta).clamp(0, FONT_SIZES.len() as i32 - 1) as usize;
        self.sheet.set_formatting(StylePatch::font_size(FONT_SIZES[next]));
        self.sheet.apply_formatting_to_selection();
    }

    fn process_events(&mut self) {
        for event in self.sheet.drain_events() {
            let message = match event {
                SheetEvent::Copied { range, cells } => format!("Copied {cells} cell(s) from {range}"),
                SheetEvent::Cut { range, cells } => format!("Cut {cells} cell(s) from {range}"),
                SheetEvent::Pasted { cells, from_host: false } => format!("Pasted {cells} cell(s)"),
                SheetEvent::Pasted { cells, from_host: true } => {
                    format!("Pasted {cells} cell(s) from system clipboard")
                }
                SheetEvent::CellsCleared(cells) => format!("Cleared {cells} cell(s)"),
                SheetEvent::FormattingApplied(cells) => {
                    format!("Formatted {cells} cell(s): {}", self.sheet.formatting())
                }
                SheetEvent::ClipboardCleared => "Clipboard cleared".to_string(),
                SheetEvent::Grew(Growth::Column(label)) => format!("Added column {label}"),
                SheetEvent::Grew(Growth::Row(row)) => format!("Added row {row}"),
                SheetEvent::CellChanged(id) => {
                    log::trace!("cell {id} changed");
                    continue;
                }
                SheetEvent::SelectionChanged(range) => {
                    log::trace!("selection {range}");
                    continue;
                }
            };
            self.status_message = Some(message);
        }
        self.adjust_scroll();
    }

    fn adjust_scroll(&mut self) {
        let cursor = self.sheet.selected_cell();
        let (view_rows, view_cols) = self.viewport_size;

        // Adjust vertical scroll
        if cursor.row <= self.scroll.0 {
            self.scroll.0 = cursor.row.saturating_sub(1);
        } else if cursor.row > self.scroll.0 + view_rows as u32 {
            self.scroll.0 = cursor.row - view_rows as u32;
        }

        // Adjust horizontal scroll
        if cursor.col < self.scroll.1 {
            self.scroll.1 = cursor.col;
        } else if cursor.col >= self.scroll.1 + view_cols as usize {
            self.scroll.1 = cursor.col + 1 - view_cols as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> CellId {
        CellId::parse(s).unwrap()
    }

    fn app() -> App<'static> {
        App::new(Config {
            system_clipboard: false,
            ..Config::default()
        })
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.on_key(KeyEvent::new(code, modifiers));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn delete_clears_selected_cell() {
        let mut app = app();
        assert_eq!(app.sheet.value(id("A1")), "Sales Report Q2");
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.sheet.value(id("A1")), "");
        assert!(!app.sheet.store().contains(id("A1")));
        assert_eq!(app.status_message.as_deref(), Some("Cleared 1 cell(s)"));
    }

    #[test]
    fn escape_restores_pre_edit_value() {
        let mut app = app();
        press(&mut app, KeyCode::F(2));
        assert_eq!(app.mode(), Mode::Edit);
        type_text(&mut app, " draft");
        assert_eq!(app.editor.draft().as_deref(), Some("Sales Report Q2 draft"));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), Mode::View);
        assert_eq!(app.sheet.value(id("A1")), "Sales Report Q2");
        assert_eq!(app.sheet.current_value(), "Sales Report Q2");
    }

    #[test]
    fn typing_starts_fresh_edit_and_enter_commits() {
        let mut app = app();
        app.sheet.select_cell(id("B3"));
        type_text(&mut app, "99");
        assert_eq!(app.editor.draft().as_deref(), Some("99"));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.sheet.value(id("B3")), "99");
        // Enter moves down and opens a fresh draft there
        assert_eq!(app.sheet.selected_cell(), id("B4"));
        assert_eq!(app.mode(), Mode::Edit);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.sheet.value(id("B4")), "890");
        assert_eq!(app.sheet.selected_cell(), id("B5"));
    }

    #[test]
    fn tab_commits_and_moves_right() {
        let mut app = app();
        app.sheet.select_cell(id("E1"));
        type_text(&mut app, "x");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.mode(), Mode::View);
        assert_eq!(app.sheet.value(id("E1")), "x");
        assert_eq!(app.sheet.selected_cell(), id("F1"));
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.sheet.selected_cell(), id("E1"));
        assert_eq!(app.sheet.current_value(), "x");
    }

    #[test]
    fn backspace_while_editing_edits_the_draft() {
        let mut app = app();
        press(&mut app, KeyCode::F(2));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.sheet.value(id("A1")), "Sales Report Q");
    }

    #[test]
    fn clipboard_shortcuts() {
        let mut app = app();
        app.sheet.select_range(id("A3"), id("D3"));
        press_with(&mut app, KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(app.sheet.value(id("B3")), "");
        assert_eq!(app.status_message.as_deref(), Some("Cut 4 cell(s) from A3:D3"));
        press_with(&mut app, KeyCode::Char('v'), KeyModifiers::CONTROL);
        assert_eq!(app.sheet.value(id("B3")), "1250");
        assert!(app.sheet.clipboard().is_none());

        press_with(&mut app, KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(app.sheet.selection().len(), 26 * 50);
    }

    #[test]
    fn right_arrow_grows_grid() {
        let mut app = app();
        app.sheet.select_cell(id("Z1"));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.sheet.selected_cell(), id("AA1"));
        assert_eq!(app.status_message.as_deref(), Some("Added column AA"));
        assert!(app.scroll.1 > 0);
    }

    #[test]
    fn shift_arrows_extend_and_esc_collapses() {
        let mut app = app();
        press_with(&mut app, KeyCode::Down, KeyModifiers::SHIFT);
        press_with(&mut app, KeyCode::Right, KeyModifiers::SHIFT);
        assert_eq!(app.sheet.selection().range_label(), "A1:B2");
        press(&mut app, KeyCode::Esc);
        assert!(app.sheet.selection().is_single());
    }

    #[test]
    fn formatting_keys_apply_to_selection() {
        let mut app = app();
        app.sheet.select_cell(id("A3"));
        app.sheet.select_range(id("A3"), id("A4"));
        press_with(&mut app, KeyCode::Char('b'), KeyModifiers::ALT);
        assert!(app.sheet.style(id("A3")).bold);
        assert!(app.sheet.style(id("A4")).bold);
        press_with(&mut app, KeyCode::Char('='), KeyModifiers::ALT);
        assert_eq!(app.sheet.style(id("A4")).font_size, 14);
        press_with(&mut app, KeyCode::Char('-'), KeyModifiers::ALT);
        press_with(&mut app, KeyCode::Char('-'), KeyModifiers::ALT);
        assert_eq!(app.sheet.style(id("A3")).font_size, 11);
    }

    #[test]
    fn ctrl_k_opens_search_from_anywhere() {
        let mut app = app();
        press(&mut app, KeyCode::F(2));
        press_with(&mut app, KeyCode::Char('k'), KeyModifiers::CONTROL);
        assert_eq!(app.mode(), Mode::Search);
        type_text(&mut app, "acme");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_message.as_deref(), Some("Selected: Acme Corporation (acme.com)"));
        // the interrupted edit is still there
        assert_eq!(app.mode(), Mode::Edit);
        assert_eq!(app.sheet.value(id("A1")), "Sales Report Q2");
    }

    fn geometry() -> GridGeometry {
        GridGeometry {
            header_y: 5,
            row_header_x: 1,
            columns: vec![(8, 10, 0), (19, 10, 1), (30, 10, 2)],
            rows: vec![(6, 1), (7, 2), (8, 3)],
        }
    }

    #[test]
    fn hit_testing() {
        let g = geometry();
        assert_eq!(g.hit(2, 5), Some(Hit::Corner));
        assert_eq!(g.hit(20, 5), Some(Hit::ColumnHeader(1)));
        assert_eq!(g.hit(3, 7), Some(Hit::RowHeader(2)));
        assert_eq!(g.hit(31, 8), Some(Hit::Cell(id("C3"))));
        assert_eq!(g.hit(18, 8), None);
        assert_eq!(g.hit(31, 20), None);
    }

    fn click(app: &mut App, x: u16, y: u16, modifiers: KeyModifiers) {
        app.on_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers,
        });
    }

    #[test]
    fn clicks_select_headers_cells_and_ranges() {
        let mut app = app();
        app.geometry = geometry();
        click(&mut app, 20, 5, KeyModifiers::NONE);
        assert_eq!(app.sheet.selection().range_label(), "B1:B50");
        click(&mut app, 3, 7, KeyModifiers::NONE);
        assert_eq!(app.sheet.selection().range_label(), "A2:Z2");
        click(&mut app, 2, 5, KeyModifiers::NONE);
        assert_eq!(app.sheet.selection().len(), 26 * 50);
        click(&mut app, 9, 6, KeyModifiers::NONE);
        click(&mut app, 31, 8, KeyModifiers::SHIFT);
        assert_eq!(app.sheet.selection().range_label(), "A1:C3");
    }

    #[test]
    fn double_click_edits_and_click_away_commits() {
        let mut app = app();
        app.geometry = geometry();
        click(&mut app, 20, 7, KeyModifiers::NONE);
        click(&mut app, 20, 7, KeyModifiers::NONE);
        assert_eq!(app.mode(), Mode::Edit);
        assert_eq!(app.editor.draft().as_deref(), Some("Q1 Sales"));
        type_text(&mut app, "!");
        click(&mut app, 9, 6, KeyModifiers::NONE);
        assert_eq!(app.mode(), Mode::View);
        assert_eq!(app.sheet.value(id("B2")), "Q1 Sales!");
        assert_eq!(app.sheet.selected_cell(), id("A1"));
    }

    #[test]
    fn blank_config_starts_empty() {
        let app = App::new(Config {
            columns: 3,
            rows: 4,
            sample_data: false,
            system_clipboard: false,
        });
        assert_eq!(app.sheet.store().len(), 0);
        assert_eq!(app.sheet.extent().last_cell(), id("C4"));
    }
}
