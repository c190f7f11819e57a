use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::{bold, dim_bold, italic, HORIZONTAL_MARGIN};
use crate::app::App;
use crate::schedule::STAGES_PER_DAY;
use crate::session::Outcome;

pub(super) fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let run = app.controller.run();
    let passage = run.current_passage();
    let passage_text: String = passage.iter().collect();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_lines = if passage_text.width() <= max_chars_per_line as usize {
        1
    } else {
        (passage_text.width() as f64 / max_chars_per_line as f64).ceil() as u16 + 1
    };
    let padding = area.height.saturating_sub(prompt_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(1), // header
            Constraint::Length(1), // timer
            Constraint::Length(prompt_lines),
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let pips = (0..STAGES_PER_DAY)
        .map(|i| if i <= run.stage() { "●" } else { "○" })
        .join(" ");
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(
                "{} [{}]  ",
                app.controller.date(),
                app.controller.language()
            ),
            dim_bold(),
        ),
        Span::styled(
            format!("stage {}/{}  {pips}", run.stage() + 1, STAGES_PER_DAY),
            bold(),
        ),
    ]))
    .alignment(Alignment::Center);
    header.render(chunks[1], buf);

    if run.has_started() {
        let timer = Paragraph::new(Span::styled(
            format!("{:.1}", run.elapsed().as_secs_f64()),
            dim_bold(),
        ))
        .alignment(Alignment::Center);
        timer.render(chunks[2], buf);
    }

    let green_bold = bold().fg(Color::Green);
    let red_bold = bold().fg(Color::Red);

    let mut spans: Vec<Span> = run
        .input()
        .iter()
        .enumerate()
        .map(|(idx, input)| match input.outcome {
            Outcome::Incorrect => Span::styled(
                match input.char {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold,
            ),
            Outcome::Correct => Span::styled(passage[idx].to_string(), green_bold),
        })
        .collect();

    let cursor = run.cursor_pos();
    if let Some(expected) = passage.get(cursor) {
        spans.push(Span::styled(
            expected.to_string(),
            dim_bold().add_modifier(Modifier::UNDERLINED),
        ));
    }
    let rest_start = (cursor + 1).min(passage.len());
    spans.push(Span::styled(
        passage[rest_start..].iter().collect::<String>(),
        dim_bold(),
    ));

    let prompt = Paragraph::new(Line::from(spans))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(chunks[3], buf);

    let legend = Paragraph::new(Span::styled(
        if run.has_started() {
            "(←) restart / (esc)ape"
        } else {
            "(tab) board / (esc)ape"
        },
        italic(),
    ));
    legend.render(chunks[5], buf);
}
