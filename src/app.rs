use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, warn};

use crate::controller::Controller;
use crate::session::Progress;
use crate::share;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    Records,
}

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub controller: Controller,
    pub state: AppState,
    /// One-line status shown under the results (share outcome, failures).
    pub notice: Option<String>,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            state: AppState::Typing,
            notice: None,
        }
    }

    pub fn restart(&mut self) {
        self.controller.restart();
        self.state = AppState::Typing;
        self.notice = None;
    }

    /// Redraw on ticks only while the stopwatch runs.
    pub fn wants_tick(&self) -> bool {
        self.state == AppState::Typing
            && self.controller.run().has_started()
            && !self.controller.run().has_finished()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }
        if key.code == KeyCode::Left {
            self.restart();
            return Flow::Continue;
        }

        match self.state {
            AppState::Typing => self.on_typing_key(key.code),
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('b') => self.state = AppState::Records,
                KeyCode::Char('s') => self.share(),
                _ => {}
            },
            AppState::Records => match key.code {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('x') => self.clear_records(),
                KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Tab => {
                    self.state = if self.controller.report().is_some() {
                        AppState::Results
                    } else {
                        AppState::Typing
                    };
                }
                _ => {}
            },
        }
        Flow::Continue
    }

    fn on_typing_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Backspace => self.controller.backspace(),
            KeyCode::Tab if !self.controller.run().has_started() => self.state = AppState::Records,
            KeyCode::Char(c) => match self.controller.write(c) {
                Ok(Progress::Finished) => self.state = AppState::Results,
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "attempt could not be scored");
                    self.notice = Some(e.to_string());
                    self.state = AppState::Results;
                }
            },
            _ => {}
        }
    }

    fn share(&mut self) {
        let Some(report) = self.controller.report() else {
            return;
        };
        let shared = share::open(
            self.controller.date(),
            self.controller.language(),
            &report.score,
        );
        self.notice = Some(if shared {
            "opened in your browser".to_string()
        } else {
            "no browser available to share".to_string()
        });
    }

    fn clear_records(&mut self) {
        match self.controller.clear_records() {
            Ok(()) => self.notice = Some("records cleared".to_string()),
            Err(e) => {
                warn!(error = %e, "records not cleared");
                self.notice = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::QuotePool;
    use crate::records::RecordBook;
    use crate::skill::SkillModel;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn app() -> App {
        let pool = QuotePool::new("en", vec!["ab".into(), "cd".into(), "ef".into()]);
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        App::new(Controller::new(
            pool,
            date,
            SkillModel::default(),
            RecordBook::new(Box::new(MemoryStore::new())),
        ))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_day(app: &mut App) {
        let text = app.controller.passages().concat();
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Flow::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c), Flow::Quit);
    }

    #[test]
    fn test_finishing_moves_to_results() {
        let mut app = app();
        type_day(&mut app);
        assert_eq!(app.state, AppState::Results);
        assert!(app.controller.report().is_some());
        assert!(!app.wants_tick());
    }

    #[test]
    fn test_results_keys() {
        let mut app = app();
        type_day(&mut app);
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Records);
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Results);
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Typing);
        assert!(app.controller.report().is_none());
    }

    #[test]
    fn test_typed_r_is_text_while_typing() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.controller.run().cursor_pos(), 1);
        assert!(app.wants_tick());
    }

    #[test]
    fn test_left_restarts_mid_run() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Left));
        assert!(!app.controller.run().has_started());
    }

    #[test]
    fn test_board_from_idle_typing_and_clear() {
        let mut app = app();
        type_day(&mut app);
        app.restart();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::Records);
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.controller.records().play_count, 0);
        assert_eq!(app.notice.as_deref(), Some("records cleared"));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::Typing);
    }
}
