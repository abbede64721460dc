use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row as TableRow, Table as TableWidget, Wrap};

use crate::model::Model;
use crate::table::SelectStatus;

pub fn draw(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    if model.is_missing() {
        draw_missing(frame, area);
        return;
    }
    let [header_area, table_area, status_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    draw_header(model, frame, header_area);
    draw_table(model, frame, table_area);
    draw_status(model, frame, status_area);
    draw_cmdline(model, frame, input_area);

    if let Some(message) = model.popup() {
        draw_popup(frame, area, message);
    }
}

fn draw_header(model: &Model, frame: &mut Frame, area: Rect) {
    let total = model.table().map_or(0, |t| t.row_count());
    let mut spans = vec![
        Span::from(" xrev ").bold(),
        Span::from(format!("Hi {} ", model.user())).dim(),
        Span::from(format!("| {total} rows, {} visible ", model.visible().len())),
        Span::from(format!("| {} selected ", model.selection().len())).cyan(),
        Span::from(format!("| chat {} ", model.chat_turns())).dim(),
    ];
    if model.filter().is_active() {
        spans.push(Span::from(format!("| {} ", model.filter().describe())).yellow());
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_table(model: &Model, frame: &mut Frame, area: Rect) {
    let title = match model.filename() {
        Some(filename) => format!(" Extracted Data: {filename} "),
        None => " Extracted Data ".to_string(),
    };
    let block = Block::bordered()
        .title(Line::from(title).centered())
        .title_bottom(Line::from(" ? help  q quit ").centered().dim());

    let Some(table) = model.table() else {
        return;
    };
    let visible = model.visible();
    if visible.is_empty() {
        let placeholder = Paragraph::new("No matching attributes found.")
            .centered()
            .dim()
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let max_width = model.max_column_width();
    let mark = match model.selection().status(visible) {
        SelectStatus::All => "[x]",
        SelectStatus::Partial => "[-]",
        SelectStatus::None => "[ ]",
    };
    let mut header_cells = vec![Cell::from(mark)];
    header_cells.extend(
        table
            .columns()
            .iter()
            .map(|name| Cell::from(clip(name, max_width)).bold()),
    );

    let end = (model.offset() + model.view_height()).min(visible.len());
    let rows = visible[model.offset()..end]
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            let mark = if model.selection().contains(index) {
                "[x]"
            } else {
                "[ ]"
            };
            let mut cells = vec![Cell::from(mark)];
            if let Some(row) = table.row(index) {
                cells.extend(
                    row.iter()
                        .map(|cell| Cell::from(clip(&cell.to_string(), max_width))),
                );
            }
            let mut table_row = TableRow::new(cells);
            if model.offset() + position == model.cursor() {
                table_row = table_row.style(Style::new().add_modifier(Modifier::REVERSED));
            }
            table_row
        })
        .collect::<Vec<_>>();

    let mut widths = vec![Constraint::Length(3)];
    widths.extend(table.columns().iter().map(|_| Constraint::Fill(1)));

    let widget = TableWidget::new(rows, widths)
        .header(TableRow::new(header_cells))
        .block(block);
    frame.render_widget(widget, area);
}

fn draw_status(model: &Model, frame: &mut Frame, area: Rect) {
    let line = if model.error().is_empty() {
        Line::from(format!(" {}", model.status_message()))
    } else {
        Line::from(format!(" {}", model.error())).style(Style::new().fg(Color::Red))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_cmdline(model: &Model, frame: &mut Frame, area: Rect) {
    match model.cmdline() {
        Some((mode, input)) => {
            let label = mode.label();
            let line = Line::from(vec![
                Span::from(format!(" {label}> ")).bold(),
                Span::from(input.input.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + label.len() as u16 + 3 + input.cursor as u16;
            frame.set_cursor_position(Position::new(x.min(area.right()), area.y));
        }
        None => {
            let hint = Paragraph::new(Line::from(
                " space select  a select all  / search  p refine  e export ",
            ))
            .dim();
            frame.render_widget(hint, area);
        }
    }
}

fn draw_popup(frame: &mut Frame, area: Rect, message: &str) {
    let lines = message.lines().count() as u16;
    let popup = centered_rect(area, 64, lines + 2);
    let block = Block::bordered()
        .title(Line::from(" xrev ").centered())
        .title_bottom(Line::from(" Esc to close ").centered().dim());
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(message).wrap(Wrap { trim: false }).block(block),
        popup,
    );
}

fn draw_missing(frame: &mut Frame, area: Rect) {
    let block = Block::bordered().title(
        Line::from(" AI Extraction Automation - Extraction Result Review ").centered(),
    );
    let text = Paragraph::new(
        "No file or extraction results found.\n\
         Start xrev with a session file, see xrev --help.",
    )
    .centered()
    .style(Style::new().fg(Color::Red))
    .block(block);
    frame.render_widget(text, centered_rect(area, 56, 4));
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(max.saturating_sub(3)).collect();
        clipped.push_str("...");
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Config, Message};
    use crate::model::SessionState;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|frame| draw(model, frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn session() -> SessionState {
        SessionState {
            filename: Some("skus.xlsx".to_string()),
            columns: Some(vec!["Attribute".to_string(), "Value".to_string()]),
            rows: Some(vec![vec![
                crate::table::CellValue::Text("Engine".to_string()),
                crate::table::CellValue::Text("V8".to_string()),
            ]]),
        }
    }

    #[test]
    fn missing_state_renders_the_placeholder() {
        let model = Model::init(Config::default(), SessionState::default());
        let screen = rendered(&model);
        assert!(screen.contains("No file or extraction results found."));
    }

    #[test]
    fn table_screen_shows_filename_and_rows() {
        let model = Model::init(Config::default(), session());
        let screen = rendered(&model);
        assert!(screen.contains("Extracted Data: skus.xlsx"));
        assert!(screen.contains("Engine"));
        assert!(screen.contains("[ ]"));
    }

    #[test]
    fn empty_filter_result_shows_the_placeholder_row() {
        let mut model = Model::init(Config::default(), session());
        model.update(Message::Resize(90, 24)).unwrap();
        // Drive a search that matches nothing through the command line
        model.update(Message::Search).unwrap();
        for key in "zzz".chars() {
            model
                .update(Message::RawKey(ratatui::crossterm::event::KeyEvent::from(
                    ratatui::crossterm::event::KeyCode::Char(key),
                )))
                .unwrap();
        }
        model
            .update(Message::RawKey(ratatui::crossterm::event::KeyEvent::from(
                ratatui::crossterm::event::KeyCode::Enter,
            )))
            .unwrap();
        let screen = rendered(&model);
        assert!(screen.contains("No matching attributes found."));
    }

    #[test]
    fn clip_adds_ellipsis_only_when_needed() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("a very long column name", 10), "a very ...");
    }
}
