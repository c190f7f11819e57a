use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Paragraph, Widget, Wrap},
};

use super::{bold, italic, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::app::App;
use crate::controller::AttemptReport;
use crate::share;

/// Where the attempt landed on the personal board.
pub fn rank_line(report: &AttemptReport) -> String {
    match report.rank {
        Some(1) => "new personal best!".to_string(),
        Some(rank) => format!("#{rank} on your board"),
        None if report.save_error.is_some() => "not saved".to_string(),
        None => "not in your top five".to_string(),
    }
}

pub(super) fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // score
            Constraint::Length(1), // rank
            Constraint::Length(1), // save warning / notice
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    match app.controller.report() {
        Some(report) => {
            let stats = Paragraph::new(Span::styled(
                format!(
                    "{:.0} wpm   top {:.1}%   {:.1}s",
                    report.score.wpm, report.score.percentile, report.elapsed_secs
                ),
                bold(),
            ))
            .alignment(Alignment::Center);
            stats.render(chunks[1], buf);

            let rank = Paragraph::new(Span::styled(
                format!("play #{}  ·  {}", report.play_index, rank_line(report)),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            rank.render(chunks[2], buf);

            if let Some(err) = &report.save_error {
                Paragraph::new(Span::styled(
                    format!("records could not be saved: {err}"),
                    bold().fg(Color::Red),
                ))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(chunks[3], buf);
            } else if let Some(notice) = &app.notice {
                Paragraph::new(Span::styled(notice.as_str(), italic()))
                    .alignment(Alignment::Center)
                    .render(chunks[3], buf);
            }
        }
        None => {
            let msg = app.notice.as_deref().unwrap_or("no result");
            Paragraph::new(Span::styled(msg, bold().fg(Color::Red)))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(chunks[1], buf);
        }
    }

    let legend = Paragraph::new(Span::styled(
        if share::can_share() {
            "(r)etry / (b)oard / (s)hare / (esc)ape"
        } else {
            "(r)etry / (b)oard / (esc)ape"
        },
        italic(),
    ));
    legend.render(chunks[5], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::skill::Score;
    use crate::ui::tests::{create_test_app, rendered};

    #[test]
    fn test_results_screen() {
        let mut app = create_test_app();
        app.controller.complete(250, 60.0).unwrap();
        app.state = AppState::Results;
        let text = rendered(&app, 80, 24);
        assert!(text.contains("50 wpm"));
        assert!(text.contains("top 25.2%"));
        assert!(text.contains("new personal best!"));
        assert!(text.contains("(r)etry / (b)oard"));
    }

    #[test]
    fn test_results_without_report_shows_notice() {
        let mut app = create_test_app();
        app.state = AppState::Results;
        assert!(rendered(&app, 80, 24).contains("no result"));
    }

    #[test]
    fn test_rank_line() {
        let mut report = AttemptReport {
            characters: 10,
            elapsed_secs: 5.0,
            score: Score {
                wpm: 24.0,
                percentile: 85.0,
            },
            rank: Some(3),
            play_index: 7,
            save_error: None,
        };
        assert_eq!(rank_line(&report), "#3 on your board");
        report.rank = None;
        assert_eq!(rank_line(&report), "not in your top five");
        report.save_error = Some("disk full".into());
        assert_eq!(rank_line(&report), "not saved");
    }
}
