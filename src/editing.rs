use crossterm::event::KeyEvent;
use tui_textarea::{CursorMove, TextArea};

use crate::grid::CellId;

/// In-cell editor. Holds the draft for at most one cell at a time.
#[derive(Default)]
pub enum Editor<'a> {
    #[default]
    Idle,
    Editing {
        cell: CellId,
        draft: TextArea<'a>,
        dirty: bool,
    },
}

impl<'a> Editor<'a> {
    /// Start editing with the stored value as the draft (F2, double click).
    pub fn begin(&mut self, cell: CellId, value: &str) {
        let mut draft = TextArea::from(vec![value.to_string()]);
        draft.move_cursor(CursorMove::End);
        *self = Editor::Editing { cell, draft, dirty: false };
    }

    /// Start editing with an empty draft that will overwrite the cell.
    pub fn begin_fresh(&mut self, cell: CellId) {
        *self = Editor::Editing {
            cell,
            draft: TextArea::default(),
            dirty: false,
        };
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Editor::Editing { .. })
    }

    pub fn cell(&self) -> Option<CellId> {
        match self {
            Editor::Editing { cell, .. } => Some(*cell),
            Editor::Idle => None,
        }
    }

    pub fn draft(&self) -> Option<String> {
        match self {
            Editor::Editing { draft, .. } => Some(draft.lines().join("\n")),
            Editor::Idle => None,
        }
    }

    pub fn textarea_mut(&mut self) -> Option<&mut TextArea<'a>> {
        match self {
            Editor::Editing { draft, .. } => Some(draft),
            Editor::Idle => None,
        }
    }

    /// Feed a key to the draft. Returns true when the text changed.
    pub fn input(&mut self, key: KeyEvent) -> bool {
        match self {
            Editor::Editing { draft, dirty, .. } => {
                let changed = draft.input(key);
                *dirty |= changed;
                changed
            }
            Editor::Idle => false,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Editor::Editing { draft, dirty, .. } = self {
            draft.insert_char(c);
            *dirty = true;
        }
    }

    /// Leave editing, handing back the cell and text to persist. A draft that
    /// was never touched yields nothing, so the cell keeps its value.
    pub fn commit(&mut self) -> Option<(CellId, String)> {
        match std::mem::take(self) {
            Editor::Editing { cell, draft, dirty: true } => Some((cell, draft.lines().join("\n"))),
            _ => None,
        }
    }

    /// Leave editing and throw the draft away.
    pub fn cancel(&mut self) -> Option<CellId> {
        let cell = self.cell();
        *self = Editor::Idle;
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn a1() -> CellId {
        CellId::new(0, 1)
    }

    #[test]
    fn begin_starts_from_stored_value() {
        let mut editor = Editor::default();
        editor.begin(a1(), "Sales");
        assert!(editor.is_editing());
        assert_eq!(editor.draft().as_deref(), Some("Sales"));
        editor.input(key(KeyCode::Char('!')));
        assert_eq!(editor.commit(), Some((a1(), "Sales!".to_string())));
        assert!(!editor.is_editing());
    }

    #[test]
    fn fresh_draft_is_empty() {
        let mut editor = Editor::default();
        editor.begin_fresh(a1());
        assert_eq!(editor.draft().as_deref(), Some(""));
        editor.insert_char('4');
        editor.input(key(KeyCode::Char('2')));
        assert_eq!(editor.commit(), Some((a1(), "42".to_string())));
    }

    #[test]
    fn untouched_draft_commits_nothing() {
        let mut editor = Editor::default();
        editor.begin_fresh(a1());
        assert_eq!(editor.commit(), None);
        assert!(!editor.is_editing());
    }

    #[test]
    fn cancel_discards_draft() {
        let mut editor = Editor::default();
        editor.begin(a1(), "keep");
        editor.input(key(KeyCode::Backspace));
        assert_eq!(editor.draft().as_deref(), Some("kee"));
        assert_eq!(editor.cancel(), Some(a1()));
        assert_eq!(editor.draft(), None);
        assert_eq!(editor.commit(), None);
    }

    #[test]
    fn idle_ignores_input() {
        let mut editor = Editor::default();
        assert!(!editor.input(key(KeyCode::Char('x'))));
        assert_eq!(editor.cancel(), None);
    }
}
