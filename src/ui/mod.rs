use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::{
    api::{ListMode, TorrentSummary},
    app::{App, DetailState, Dialog, Mode},
    files::{RowKind, TreeRow, format_bytes},
};

const COLOR_BG: Color = Color::Rgb(14, 16, 14);
const COLOR_PANEL: Color = Color::Rgb(20, 22, 20);
const COLOR_GREEN: Color = Color::Rgb(0, 245, 150);
const COLOR_BORDER: Color = Color::Rgb(0, 205, 110);
const COLOR_SELECTED_BG: Color = Color::Rgb(0, 60, 0);
const COLOR_CYAN: Color = Color::Rgb(0, 255, 255);
const COLOR_YELLOW: Color = Color::Rgb(255, 255, 0);
const COLOR_MUTED: Color = Color::Rgb(136, 136, 136);
const COLOR_BLACK: Color = Color::Rgb(0, 0, 0);

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let bg = Block::default().style(Style::default().bg(COLOR_BG));
    frame.render_widget(bg, area);

    let error_height = if app.last_error().is_some() { 1 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(error_height),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    draw_top_bar(frame, layout[0], app);
    draw_search_bar(frame, layout[1], app);
    if let Some(err) = app.last_error() {
        draw_error_line(frame, layout[2], err);
    }
    draw_results(frame, layout[3], app);
    draw_status_bar(frame, layout[4], app);

    match app.dialog() {
        Dialog::Detail => {
            if let Some(detail) = app.detail() {
                draw_detail_modal(frame, detail, app.last_error());
            }
        }
        Dialog::ConfirmDelete => {
            if let Some(detail) = app.detail().filter(|_| app.detail_behind_confirm()) {
                draw_detail_modal(frame, detail, None);
            }
            draw_confirm_delete(frame, app);
        }
        Dialog::Help => draw_help_modal(frame, app.help_scroll()),
        Dialog::None => {}
    }
}

fn draw_top_bar(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().style(Style::default().bg(COLOR_GREEN).fg(COLOR_BLACK));
    frame.render_widget(block, area);

    let left = Line::from(format!("BitSearch - {}", app.server_url()));
    let total = app
        .total_count()
        .map(|n| format!("{n} torrents indexed  "))
        .unwrap_or_default();
    let right = Line::from(format!("{total}[q: Quit] [?: Help]"));

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    frame.render_widget(
        Paragraph::new(left)
            .style(Style::default().fg(COLOR_BLACK))
            .alignment(Alignment::Left),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(right)
            .style(Style::default().fg(COLOR_BLACK))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

fn draw_search_bar(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.mode() == Mode::EditQuery;
    let (title, border) = if editing {
        ("Search (Enter to run, Esc to cancel)", COLOR_GREEN)
    } else {
        ("Search [/]  Browse all [a]", COLOR_BORDER)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(COLOR_BG))
        .title(Span::styled(title, Style::default().fg(border)));
    let inner = block.inner(area);

    if editing {
        let (visible, cursor_x) = visible_input(app.input(), app.input_cursor(), inner.width);
        frame.render_widget(
            Paragraph::new(visible)
                .block(block)
                .style(Style::default().fg(Color::White)),
            area,
        );
        if let Some(x) = cursor_x {
            frame.set_cursor_position((inner.x + x.saturating_sub(1), inner.y));
        }
        return;
    }

    let line = match app.list_mode() {
        ListMode::Search => Line::from(vec![
            Span::styled("Query: ", Style::default().fg(COLOR_MUTED)),
            Span::styled(
                fit_text(app.query(), inner.width.saturating_sub(7) as usize),
                Style::default().fg(Color::White),
            ),
        ]),
        ListMode::All => Line::from(Span::styled(
            "Browsing all torrents",
            Style::default().fg(COLOR_MUTED),
        )),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_error_line(frame: &mut Frame, area: Rect, message: &str) {
    let hint = "  [x] dismiss";
    let width = (area.width as usize).saturating_sub(hint.chars().count() + 7);
    let line = Line::from(vec![
        Span::styled("Error: ", Style::default().fg(Color::Red)),
        Span::styled(fit_text(message, width), Style::default().fg(Color::White)),
        Span::styled(hint, Style::default().fg(COLOR_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_results(frame: &mut Frame, area: Rect, app: &App) {
    let header_style = Style::default().fg(COLOR_BLACK).bg(COLOR_CYAN);
    let header = Row::new(vec!["NAME", "SIZE", "SEEDS", "PEERS", "HASH"])
        .style(header_style)
        .height(1);

    let rows: Vec<Row> = if app.results().is_empty() {
        let message = if app.is_loading() {
            "Loading..."
        } else {
            "No torrents on this page"
        };
        vec![Row::new(vec![Cell::from(Text::from(message))])]
    } else {
        app.results().iter().map(result_row).collect()
    };

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(11),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(Block::default().style(Style::default().fg(COLOR_GREEN).bg(COLOR_BG)))
    .highlight_symbol("")
    .row_highlight_style(Style::default().bg(COLOR_SELECTED_BG))
    .column_spacing(1);

    let mut state = TableState::default();
    if !app.results().is_empty() {
        state.select(Some(app.selected_index()));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn result_row(t: &TorrentSummary) -> Row<'static> {
    Row::new(vec![
        Cell::from(t.name.clone()).style(Style::default().fg(Color::White)),
        Cell::from(format_bytes(t.length)).style(Style::default().fg(COLOR_CYAN)),
        Cell::from(t.seeds.to_string()).style(Style::default().fg(COLOR_GREEN)),
        Cell::from(t.leechers.to_string()).style(Style::default().fg(COLOR_YELLOW)),
        Cell::from(fit_text(&t.infohash_hex, 12)).style(Style::default().fg(COLOR_MUTED)),
    ])
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let pager = if app.has_more() {
        format!("Page {}  [p] prev [n] next", app.page() + 1)
    } else {
        format!("Page {} (last)  [p] prev", app.page() + 1)
    };
    let mut spans = vec![
        Span::styled(pager, Style::default().fg(COLOR_GREEN)),
        Span::raw("  "),
        Span::styled(app.status().to_string(), Style::default().fg(Color::White)),
    ];
    if app.is_loading() {
        spans.push(Span::styled("  loading", Style::default().fg(COLOR_YELLOW)));
    }
    let left = Line::from(spans);
    let right = Line::from(Span::styled(
        app.last_updated()
            .map(|at| format!("updated {}", at.format("%H:%M:%S")))
            .unwrap_or_default(),
        Style::default().fg(COLOR_MUTED),
    ));

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(18)])
        .split(area);
    frame.render_widget(Paragraph::new(left), chunks[0]);
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), chunks[1]);
}

fn draw_detail_modal(frame: &mut Frame, detail: &DetailState, error: Option<&str>) {
    let area = centered_rect(85, 80, frame.area());
    frame.render_widget(Clear, area);
    let torrent = &detail.torrent;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_GREEN))
        .style(Style::default().bg(COLOR_PANEL))
        .title(Span::styled(
            fit_text(&torrent.name, area.width.saturating_sub(4) as usize),
            Style::default().fg(COLOR_GREEN),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let header = vec![
        Line::from(vec![
            Span::styled("Size: ", Style::default().fg(COLOR_MUTED)),
            Span::styled(format_bytes(torrent.length), Style::default().fg(COLOR_CYAN)),
            Span::styled("   Files: ", Style::default().fg(COLOR_MUTED)),
            Span::styled(torrent.files.len().to_string(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Hash: ", Style::default().fg(COLOR_MUTED)),
            Span::styled(torrent.infohash_hex.clone(), Style::default().fg(Color::White)),
        ]),
        Line::from(""),
    ];
    frame.render_widget(Paragraph::new(header), sections[0]);

    match detail.files.tree() {
        Ok(_) => draw_file_tree(frame, sections[1], &detail.files.rows(), detail.files.cursor()),
        Err(err) => frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "File list cannot be shown as a tree",
                    Style::default().fg(Color::Red),
                )),
                Line::from(Span::styled(err.to_string(), Style::default().fg(Color::White))),
            ])
            .wrap(Wrap { trim: false }),
            sections[1],
        ),
    }

    // the modal hides the main error line
    let footer = match error {
        Some(message) => Line::from(vec![
            Span::styled("Error: ", Style::default().fg(Color::Red)),
            Span::styled(
                fit_text(message, (sections[2].width as usize).saturating_sub(7)),
                Style::default().fg(Color::White),
            ),
        ]),
        None => Line::from(Span::styled(
            "[Enter] expand/collapse  [m] magnet  [t] save .torrent  [d] delete  [Esc] close",
            Style::default().fg(COLOR_MUTED),
        )),
    };
    frame.render_widget(Paragraph::new(footer), sections[2]);
}

fn draw_file_tree(frame: &mut Frame, area: Rect, rows: &[TreeRow], cursor: usize) {
    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No files", Style::default().fg(COLOR_MUTED))),
            area,
        );
        return;
    }
    let height = area.height as usize;
    let offset = scroll_offset(cursor, height, rows.len());
    let width = area.width as usize;
    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(idx, row)| {
            let style = match (&row.kind, idx == cursor) {
                (_, true) => Style::default().bg(COLOR_SELECTED_BG).fg(Color::White),
                (RowKind::Directory { .. }, false) => {
                    Style::default().fg(COLOR_GREEN).add_modifier(Modifier::BOLD)
                }
                (RowKind::File { .. }, false) => Style::default().fg(Color::White),
            };
            let indent = "  ".repeat(row.depth);
            Line::from(Span::styled(
                fit_text(&format!("{indent}{}", row.label()), width),
                style,
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// First visible row such that `cursor` stays on screen.
fn scroll_offset(cursor: usize, height: usize, len: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    cursor.saturating_sub(height - 1).min(len - height)
}

fn draw_help_modal(frame: &mut Frame, scroll: u16) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(""),
        Line::from("Results"),
        Line::from("  [/] [s]  Edit search query"),
        Line::from("  [a]      Browse all torrents"),
        Line::from("  [↑/↓]    Select torrent"),
        Line::from("  [n] [→]  Next page"),
        Line::from("  [p] [←]  Previous page"),
        Line::from("  [r]      Refresh page"),
        Line::from("  [Enter]  Show files"),
        Line::from(""),
        Line::from("Torrent"),
        Line::from("  [m]  Open magnet link"),
        Line::from("  [t]  Save .torrent file"),
        Line::from("  [d]  Delete (confirm dialog)"),
        Line::from(""),
        Line::from("File tree"),
        Line::from("  [↑/↓]          Move"),
        Line::from("  [Enter/Space]  Expand/collapse directory"),
        Line::from(""),
        Line::from("Other"),
        Line::from("  [x]  Dismiss error"),
        Line::from("  [q]  Quit"),
        Line::from(""),
        Line::from("Press ? / x / Esc to close"),
    ];
    let text = Text::from(lines.clone());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_CYAN))
        .style(Style::default().bg(COLOR_BG))
        .title(Span::styled("Help", Style::default().fg(COLOR_CYAN)));
    let inner = block.inner(area);
    let view_height = inner.height.saturating_sub(1) as usize;
    let max_scroll = lines.len().saturating_sub(view_height) as u16;
    let scroll = scroll.min(max_scroll);
    frame.render_widget(
        Paragraph::new(text).block(block).scroll((scroll, 0)),
        area,
    );
    if max_scroll > 0 {
        let indicator = format!("Scroll {}/{}", scroll, max_scroll);
        let indicator_area = Rect::new(
            inner.x,
            inner.y + inner.height.saturating_sub(1),
            inner.width,
            1,
        );
        frame.render_widget(
            Paragraph::new(indicator)
                .style(Style::default().fg(COLOR_MUTED))
                .alignment(Alignment::Right),
            indicator_area,
        );
    }
}

fn draw_confirm_delete(frame: &mut Frame, app: &App) {
    let name = app.delete_target().map(|t| t.name.as_str()).unwrap_or("-");
    let yes_style = if app.delete_choice() {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let no_style = if app.delete_choice() {
        Style::default().fg(COLOR_MUTED)
    } else {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    };
    let lines = vec![
        Line::from(Span::styled(
            "Remove this torrent from the index?",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(name, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Y]es", yes_style),
            Span::raw("   "),
            Span::styled("[N]o", no_style),
        ]),
        Line::from(Span::styled(
            "[<-] [->] Select  [Enter] Confirm  [Esc] Cancel",
            Style::default().fg(COLOR_MUTED),
        )),
    ];
    let text = Text::from(lines.clone());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(COLOR_BG))
        .title(Span::styled("Confirm", Style::default().fg(Color::Yellow)));
    let area_height = ((lines.len() + 2) as u16)
        .min(frame.area().height.saturating_sub(2))
        .max(7);
    let area = centered_rect_fixed(70, area_height, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn fit_text(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let count = s.chars().count();
    if count <= width {
        return s.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    let mut out = s.chars().take(width - 3).collect::<String>();
    out.push_str("...");
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn centered_rect_fixed(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height.saturating_sub(2)).max(5);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Window of `input` that fits `area_width` columns with the cursor in
/// view, plus the 1-based cursor column.
fn visible_input(input: &str, cursor: usize, area_width: u16) -> (String, Option<u16>) {
    let content_width = area_width as usize;
    if content_width == 0 {
        return (String::new(), None);
    }
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut start = 0;
    if cursor > content_width {
        start = cursor - content_width;
    }
    if start > len {
        start = len;
    }
    let end = (start + content_width).min(len);
    let visible: String = chars[start..end].iter().collect();
    let cursor_offset = cursor.saturating_sub(start);
    let cursor_x = (cursor_offset as u16).min(content_width as u16);
    (visible, Some(cursor_x + 1))
}
