//! Global search palette over the built-in company and people directories.
//!
//! Independent of the grid: it only needs to know whether it is open, what
//! has been typed, and which result is highlighted.

use crossterm::event::{KeyCode, KeyEvent};
use tui_textarea::TextArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Companies,
    People,
}

impl Group {
    pub fn heading(self) -> &'static str {
        match self {
            Group::Companies => "Companies",
            Group::People => "People",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub id: &'static str,
    pub name: &'static str,
    pub domain: &'static str,
    pub group: Group,
}

impl Entry {
    const fn company(id: &'static str, name: &'static str, domain: &'static str) -> Self {
        Self { id, name, domain, group: Group::Companies }
    }

    const fn person(id: &'static str, name: &'static str, domain: &'static str) -> Self {
        Self { id, name, domain, group: Group::People }
    }

    /// Case-insensitive substring match on name or domain.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.domain.to_lowercase().contains(&query)
    }

    /// Stable key such as `company-3`.
    pub fn key(&self) -> String {
        match self.group {
            Group::Companies => format!("company-{}", self.id),
            Group::People => format!("person-{}", self.id),
        }
    }
}

pub static COMPANIES: [Entry; 5] = [
    Entry::company("1", "Acme Corporation", "acme.com"),
    Entry::company("2", "Global Solutions Inc", "globalsolutions.com"),
    Entry::company("3", "TechStart Ventures", "techstart.com"),
    Entry::company("4", "Manufacturing Co", "manufacturing.com"),
    Entry::company("5", "Digital Agency", "digitalagency.com"),
];

pub static PEOPLE: [Entry; 5] = [
    Entry::person("1", "John Smith", "johnsmith.com"),
    Entry::person("2", "Sarah Johnson", "sarahjohnson.com"),
    Entry::person("3", "Mike Chen", "mikechen.com"),
    Entry::person("4", "Emily Davis", "emilydavis.com"),
    Entry::person("5", "David Wilson", "davidwilson.com"),
];

/// Matching entries, companies first.
pub fn filter(query: &str) -> Vec<&'static Entry> {
    COMPANIES
        .iter()
        .chain(PEOPLE.iter())
        .filter(|entry| entry.matches(query))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteOutcome {
    /// Key consumed, palette still open.
    Handled,
    Closed,
    Selected(&'static Entry),
}

#[derive(Default)]
pub struct SearchPalette<'a> {
    open: bool,
    query: TextArea<'a>,
    selected: usize,
}

impl<'a> SearchPalette<'a> {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query = TextArea::default();
        self.selected = 0;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn query(&self) -> String {
        self.query.lines().join("")
    }

    pub fn query_input_mut(&mut self) -> &mut TextArea<'a> {
        &mut self.query
    }

    pub fn results(&self) -> Vec<&'static Entry> {
        filter(&self.query())
    }

    /// Index into [`SearchPalette::results`], clamped to what is there.
    pub fn selected_index(&self) -> usize {
        self.selected.min(self.results().len().saturating_sub(1))
    }

    fn move_selection(&mut self, delta: i32) {
        let count = self.results().len();
        if count == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected_index() as i32 + delta).rem_euclid(count as i32) as usize;
    }

    pub fn on_key(&mut self, key: KeyEvent) -> PaletteOutcome {
        match key.code {
            KeyCode::Esc => {
                self.close();
                PaletteOutcome::Closed
            }
            KeyCode::Up => {
                self.move_selection(-1);
                PaletteOutcome::Handled
            }
            KeyCode::Down => {
                self.move_selection(1);
                PaletteOutcome::Handled
            }
            KeyCode::Enter => {
                let Some(entry) = self.results().get(self.selected_index()).copied() else {
                    return PaletteOutcome::Handled;
                };
                log::info!("Selected: {}", entry.key());
                self.close();
                PaletteOutcome::Selected(entry)
            }
            _ => {
                if self.query.input(key) {
                    self.selected = 0;
                }
                PaletteOutcome::Handled
            }
        }
    }
}
