use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
};

use crate::app::{App, DEFAULT_COLUMN_WIDTH, GridGeometry, Mode, ROW_HEADER_WIDTH};
use crate::grid::{CellId, column_label};
use crate::search::Group;
use crate::sheet::Growth;
use crate::store::CellStyle;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title/toolbar
            Constraint::Length(3), // Formula bar
            Constraint::Min(0),    // Grid
            Constraint::Length(3), // Status
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_formula_bar(f, app, chunks[1]);
    draw_grid(f, app, chunks[2]);
    draw_status(f, app, chunks[3]);

    if app.mode() == Mode::Search {
        draw_search_popup(f, app);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let formatting = app.sheet.formatting();
    let toggle = |on: bool, label: &'static str, modifier: Modifier| {
        let style = if on {
            Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(modifier)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(modifier)
        };
        Span::styled(format!(" {label} "), style)
    };

    let clipboard = match app.sheet.clipboard() {
        Some(entry) => format!("  Clipboard: {:?} {}", entry.kind, entry.range),
        None => String::new(),
    };

    let line = Line::from(vec![
        Span::raw(format!("Size {:>2} ", formatting.font_size)),
        toggle(formatting.bold, "B", Modifier::BOLD),
        toggle(formatting.italic, "I", Modifier::ITALIC),
        toggle(formatting.underline, "U", Modifier::UNDERLINED),
        toggle(formatting.strikethrough, "S", Modifier::CROSSED_OUT),
        Span::raw(clipboard),
    ]);

    let title = format!(
        "Sales Report Q2 | {} cells | {} x {}",
        app.sheet.store().len(),
        app.sheet.extent().column_count(),
        app.sheet.extent().row_count()
    );
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn draw_formula_bar(f: &mut Frame, app: &mut App, area: Rect) {
    let cell = app.sheet.selected_cell();
    if let Some(textarea) = app.editor.textarea_mut() {
        let title = format!("Editing {cell} (Enter/Tab: Save+Move, Esc: Cancel)");
        textarea.set_block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(&*textarea, area);
        return;
    }

    let line = Line::from(vec![
        Span::styled(format!("{cell:<6}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" fx ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.sheet.current_value().to_string()),
    ]);
    f.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
}

/// Terminal rendering of a cell style. Font size has no terminal equivalent
/// and only shows in the toolbar.
fn cell_text_style(style: CellStyle) -> Style {
    let mut s = Style::default();
    if style.bold {
        s = s.add_modifier(Modifier::BOLD);
    }
    if style.italic {
        s = s.add_modifier(Modifier::ITALIC);
    }
    if style.underline {
        s = s.add_modifier(Modifier::UNDERLINED);
    }
    if style.strikethrough {
        s = s.add_modifier(Modifier::CROSSED_OUT);
    }
    s
}

/// Truncate to the column width with a trailing `~`.
fn fit(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let truncated: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{truncated}~")
    } else {
        value.to_string()
    }
}

fn draw_grid(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Grid");
    let inner = block.inner(area);

    let available_width = inner.width.saturating_sub(ROW_HEADER_WIDTH);
    let available_height = inner.height.saturating_sub(1); // -1 for header row

    let extent = app.sheet.extent();
    let start_col = app.scroll.1.min(extent.column_count() - 1);
    let start_row = app.scroll.0 + 1;

    let col_width = DEFAULT_COLUMN_WIDTH + 1; // +1 for spacing
    let num_cols = ((available_width / col_width) as usize)
        .max(1)
        .min(extent.column_count() - start_col);
    let num_rows = (available_height as u32)
        .max(1)
        .min(extent.row_count().saturating_sub(start_row - 1));

    // Update viewport size for scroll calculations
    app.viewport_size = (available_height.max(1), ((available_width / col_width) as u16).max(1));

    let mut geometry = GridGeometry {
        header_y: inner.y,
        row_header_x: inner.x,
        columns: Vec::with_capacity(num_cols),
        rows: Vec::with_capacity(num_rows as usize),
    };

    let last_added = app.sheet.last_added();
    let added_style = Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD);
    let header_style = Style::default().add_modifier(Modifier::BOLD);

    let mut rows = Vec::new();

    // Header row (Column letters)
    let mut header_cells = vec![Cell::from(" ".repeat(ROW_HEADER_WIDTH as usize))];
    for c in 0..num_cols {
        let col = start_col + c;
        let label = column_label(col);
        let style = match last_added {
            Some(Growth::Column(added)) if *added == label => added_style,
            _ => header_style,
        };
        geometry
            .columns
            .push((inner.x + ROW_HEADER_WIDTH + 1 + c as u16 * col_width, DEFAULT_COLUMN_WIDTH, col));
        header_cells.push(Cell::from(label).style(style));
    }
    rows.push(Row::new(header_cells));

    let selected = app.sheet.selected_cell();
    let editing = app.editor.cell();
    let draft = app.editor.draft();

    for r in 0..num_rows {
        let row = start_row + r;
        geometry.rows.push((inner.y + 1 + r as u16, row));

        let row_style = match last_added {
            Some(Growth::Row(added)) if *added == row => added_style,
            _ => header_style,
        };
        let mut row_cells = vec![Cell::from(format!("{:>5}", row)).style(row_style)];

        for c in 0..num_cols {
            let id = CellId::new(start_col + c, row);
            let value = match (&draft, editing) {
                (Some(draft), Some(cell)) if cell == id => draft.as_str(),
                _ => app.sheet.value(id),
            };
            let text_style = cell_text_style(app.sheet.style(id));

            // Build style: cursor > selection > default
            let style = if id == selected {
                text_style.bg(Color::Blue).fg(Color::White)
            } else if app.sheet.selection().contains(id) {
                text_style.bg(Color::DarkGray).fg(Color::White)
            } else {
                text_style
            };

            row_cells.push(Cell::from(fit(value, DEFAULT_COLUMN_WIDTH as usize)).style(style));
        }
        rows.push(Row::new(row_cells));
    }

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)];
    widths.extend((0..num_cols).map(|_| Constraint::Length(DEFAULT_COLUMN_WIDTH)));

    let table = Table::new(rows, widths).block(block).column_spacing(1);

    f.render_widget(table, area);
    app.geometry = geometry;
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    // Show status message if present, otherwise show help
    let text = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        let selection = app.sheet.selection();
        let sel_info = if selection.is_single() {
            String::new()
        } else {
            format!(" [{}]", selection.range_label())
        };

        format!(
            "{}{} | ^W:Quit | ^C/^X/^V:Copy/Cut/Paste | ^A:All | Del:Clear | F2:Edit | Alt+B/I/U/S | ^K:Search",
            app.sheet.selected_cell(),
            sel_info
        )
    };

    let p = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_search_popup(f: &mut Frame, app: &mut App) {
    let results = app.search.results();
    let selected = app.search.selected_index();

    let area = f.area();
    let popup_width = area.width.min(60);
    let popup_height = (results.len() as u16 + 9).min(area.height);
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 3;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    // Clear the area behind the popup
    f.render_widget(Clear, popup_area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title("Search (Up/Down:Navigate, Enter:Select, Esc:Close)");
    let inner = outer.inner(popup_area);
    f.render_widget(outer, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let input = app.search.query_input_mut();
    input.set_block(Block::default().borders(Borders::ALL).title("Search companies and people..."));
    input.set_cursor_line_style(Style::default());
    f.render_widget(&*input, chunks[0]);

    // Build list items, with a heading whenever the group changes
    let mut items: Vec<ListItem> = Vec::new();
    let mut current_group: Option<Group> = None;
    for (i, entry) in results.iter().enumerate() {
        if current_group != Some(entry.group) {
            if current_group.is_some() {
                items.push(ListItem::new(""));
            }
            items.push(
                ListItem::new(entry.group.heading())
                    .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)),
            );
            current_group = Some(entry.group);
        }
        let style = if i == selected {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        };
        let line = Line::from(vec![
            Span::styled(format!("  {}", entry.name), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", entry.domain), style.fg(Color::Gray)),
        ]);
        items.push(ListItem::new(line).style(style));
    }
    if items.is_empty() {
        items.push(ListItem::new("No results found.").style(Style::default().fg(Color::DarkGray)));
    }

    f.render_widget(List::new(items), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Config;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn app() -> App<'static> {
        App::new(Config {
            system_clipboard: false,
            ..Config::default()
        })
    }

    #[test]
    fn fit_truncates_with_tilde() {
        assert_eq!(fit("Sales Report Q2", 10), "Sales Rep~");
        assert_eq!(fit("short", 10), "short");
    }

    #[test]
    fn grid_shows_sample_data_and_records_geometry() {
        let mut app = app();
        let screen = render(&mut app, 100, 30);
        assert!(screen.contains("Sales Rep~"));
        assert!(screen.contains("Widget A"));
        assert!(screen.contains("fx Sales Report Q2"));
        assert_eq!(app.geometry.columns[0].2, 0);
        assert_eq!(app.geometry.rows[0].1, 1);
        let (x, _, _) = app.geometry.columns[1];
        let (y, _) = app.geometry.rows[2];
        assert_eq!(app.geometry.hit(x, y), Some(crate::app::Hit::Cell(CellId::new(1, 3))));
    }

    #[test]
    fn search_popup_lists_groups() {
        let mut app = app();
        app.search.open();
        let screen = render(&mut app, 100, 30);
        assert!(screen.contains("Companies"));
        assert!(screen.contains("People"));
        assert!(screen.contains("Acme Corporation"));
    }
}
