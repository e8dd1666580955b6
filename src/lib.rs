//! Terminal spreadsheet grid: cell store, selection, in-cell editing,
//! cut/copy/paste and a global search palette, drawn with ratatui.

pub mod app;
pub mod clipboard;
pub mod editing;
pub mod grid;
pub mod search;
pub mod selection;
pub mod sheet;
pub mod shortcuts;
pub mod store;
pub mod ui;
