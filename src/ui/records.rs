use chrono::Utc;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use time_humanize::{Accuracy, HumanTime, Tense};

use super::{italic, VERTICAL_MARGIN};
use crate::app::App;
use crate::records::Record;

/// Relative age of a record, e.g. "2 hours ago". Records migrated from the
/// old single-best format carry no timestamp and show "-".
pub fn record_age(record: &Record, now_millis: i64) -> String {
    if record.timestamp <= 0 {
        return "-".to_string();
    }
    let secs = (now_millis - record.timestamp).max(0) / 1000;
    HumanTime::from_seconds(secs).to_text_en(Accuracy::Rough, Tense::Past)
}

pub(super) fn render_records(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let store = app.controller.records();
    let title = Paragraph::new(format!(
        "Best of {} plays [{}]",
        store.play_count,
        app.controller.language()
    ))
    .block(Block::default().borders(Borders::ALL).title("Records"))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    let current = app.controller.report().map(|r| r.play_index);
    let now = Utc::now().timestamp_millis();

    if store.records.is_empty() {
        Paragraph::new("No records yet.\nFinish today's three passages to set one!")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    } else {
        let header = Row::new(vec!["#", "top %", "wpm", "time", "play", "when"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let rows = store.records.iter().enumerate().map(|(i, r)| {
            let style = if Some(r.play_index) == current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from((i + 1).to_string()),
                Cell::from(format!("{:.1}", r.percentile)),
                Cell::from(format!("{:.0}", r.wpm)),
                Cell::from(format!("{:.1}s", r.duration_seconds)),
                Cell::from(r.play_index.to_string()),
                Cell::from(record_age(r, now)),
            ])
            .style(style)
        });

        Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(9),
                Constraint::Length(6),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .render(chunks[1], buf);
    }

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(notice.as_str(), italic()))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled("(x) clear / (b)ack / (r)etry / (esc)ape", italic()))
        .render(chunks[3], buf);
}
