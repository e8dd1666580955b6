use std::collections::BTreeMap;

use crate::grid::CellId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardKind {
    Cut,
    Copy,
}

/// Internal clipboard contents, captured when the cut/copy happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub kind: ClipboardKind,
    pub data: BTreeMap<CellId, String>,
    pub range: String,
}

impl ClipboardEntry {
    /// Host clipboard text: tabs between cells of a row, newlines between rows.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        let mut current_row = None;
        for (id, value) in &self.data {
            match current_row {
                Some(row) if row == id.row => text.push('\t'),
                Some(_) => text.push('\n'),
                None => {}
            }
            current_row = Some(id.row);
            text.push_str(value);
        }
        text
    }
}

/// Splits host clipboard text into rows of tab-separated values.
pub fn parse_text(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.split('\t').map(str::to_string).collect()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    #[error("system clipboard is disabled")]
    Disabled,
    #[error("system clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("reading system clipboard failed: {0}")]
    Read(String),
    #[error("writing system clipboard failed: {0}")]
    Write(String),
}

/// The operating system clipboard, or something standing in for it.
pub trait HostClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn get_text(&mut self) -> Result<String, ClipboardError>;
}

/// Backed by arboard. A handle is opened per call so a missing display
/// server only affects the operation that needed it.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn open() -> Result<arboard::Clipboard, ClipboardError> {
        arboard::Clipboard::new().map_err(|err| ClipboardError::Unavailable(err.to_string()))
    }
}

impl HostClipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        Self::open()?
            .set_text(text.to_string())
            .map_err(|err| ClipboardError::Write(err.to_string()))
    }

    fn get_text(&mut self) -> Result<String, ClipboardError> {
        Self::open()?.get_text().map_err(|err| ClipboardError::Read(err.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct DisabledClipboard;

impl HostClipboard for DisabledClipboard {
    fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Disabled)
    }

    fn get_text(&mut self) -> Result<String, ClipboardError> {
        Err(ClipboardError::Disabled)
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub text: Option<String>,
}

#[cfg(test)]
impl HostClipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.text = Some(text.to_string());
        Ok(())
    }

    fn get_text(&mut self) -> Result<String, ClipboardError> {
        self.text.clone().ok_or_else(|| ClipboardError::Read("empty".into()))
    }
}
