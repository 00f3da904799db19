use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};

use super::app::{App, EntryKind, Modal};
use super::form::{Field, ServerForm};

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    draw_table(frame, app, chunks[1]);
    draw_status(frame, app, chunks[2]);
    draw_hints(frame, app, chunks[3]);

    match &app.modal {
        Some(Modal::Form(form)) => draw_form(frame, form, area),
        Some(Modal::ConfirmDelete { name, .. }) => draw_confirm(frame, name, area),
        None => {}
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " termgrid ",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
        Span::raw(app.inventory.path().display().to_string()),
        Span::raw("  "),
        Span::styled(
            format!("sort={}", app.sort.as_str()),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if app.searching || !app.search.buf.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("search: {}", app.search.buf),
            Style::default().fg(Color::Yellow),
        ));
    }
    let header =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);

    if app.searching {
        let x = area.x + " termgrid   ".len() as u16;
        // Cursor sits inside the search span; offsets are byte-based which is
        // fine for the ASCII chrome around it.
        let prefix = app
            .inventory
            .path()
            .display()
            .to_string()
            .len() as u16
            + "  sort=".len() as u16
            + app.sort.as_str().len() as u16
            + "  search: ".len() as u16;
        frame.set_cursor_position((x + prefix + app.search.cursor as u16, area.y));
    }
}

fn draw_table(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let header = Row::new(
        ["id", "name", "host", "proto", "user", "port", "os", "tags", "notes"]
            .iter()
            .map(|h| Cell::from(*h)),
    )
    .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan));

    let rows: Vec<Row> = app
        .servers
        .iter()
        .map(|s| {
            let notes = if s.notes.chars().count() > 30 {
                format!("{}...", s.notes.chars().take(30).collect::<String>())
            } else {
                s.notes.clone()
            };
            Row::new(vec![
                Cell::from(s.id.map(|i| i.to_string()).unwrap_or_default()),
                Cell::from(s.name.clone()),
                Cell::from(s.host.clone()),
                Cell::from(s.protocol.as_str().to_uppercase()),
                Cell::from(if s.username.is_empty() {
                    "-".to_string()
                } else {
                    s.username.clone()
                }),
                Cell::from(s.effective_port().to_string()),
                Cell::from(s.os.as_str().to_string()),
                Cell::from(s.tags.replace(',', " ")),
                Cell::from(notes),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(20),
        Constraint::Length(18),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(18),
        Constraint::Min(10),
    ];

    let title = format!(
        "servers ({}){}",
        app.servers.len(),
        if app.search.buf.is_empty() {
            String::new()
        } else {
            format!(" filter={}", app.search.buf)
        }
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = TableState::default();
    if !app.servers.is_empty() {
        state.select(Some(app.selected.min(app.servers.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_status(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let visible = (area.height.saturating_sub(2)) as usize;
    let lines: Vec<Line> = app
        .log
        .iter()
        .rev()
        .take(visible.max(1))
        .rev()
        .map(|e| {
            let style = match e.kind {
                EntryKind::Info => Style::default().fg(Color::Green),
                EntryKind::Error => Style::default().fg(Color::Red),
                EntryKind::Detail => Style::default().fg(Color::DarkGray),
            };
            Line::from(Span::styled(e.text.clone(), style))
        })
        .collect();
    let status =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("status"));
    frame.render_widget(status, area);
}

fn draw_hints(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let hint = match &app.modal {
        Some(Modal::Form(_)) => {
            "Tab/Up/Down: field  Left/Right: edit or cycle  Enter: save  Esc: cancel"
        }
        Some(Modal::ConfirmDelete { .. }) => "y: delete  n/Esc: keep",
        None => {
            if app.searching {
                "type to filter  Enter: done  Esc: clear"
            } else {
                "Enter: connect  a: add  e: edit  d: delete  /: search  s: sort  q: quit"
            }
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn centered_box(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width.saturating_sub(2));
    let h = h.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn draw_form(frame: &mut ratatui::Frame, form: &ServerForm, area: Rect) {
    let fields = form.fields();
    let box_area = centered_box(area, 64, fields.len() as u16 + 4);
    frame.render_widget(Clear, box_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(form.title.clone());
    frame.render_widget(block.clone(), box_area);
    let inner = block.inner(box_area);

    let label_w = 10usize;
    let mut lines = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        let active = i == form.active;
        let marker = if active { ">" } else { " " };
        let value = form.value_of(*field);
        let value = match field {
            Field::Protocol | Field::Os if active => format!("< {value} >"),
            _ => value,
        };
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{marker} {:>label_w$}: ", field.label()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(value, style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter: save   Esc: cancel",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm(frame: &mut ratatui::Frame, name: &str, area: Rect) {
    let box_area = centered_box(area, 50, 5);
    frame.render_widget(Clear, box_area);
    let block = Block::default().borders(Borders::ALL).title("Delete server");
    frame.render_widget(block.clone(), box_area);
    let inner = block.inner(box_area);
    let lines = vec![
        Line::from(format!("Delete '{name}'?")),
        Line::from(Span::styled(
            "y: delete   n/Esc: keep",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
