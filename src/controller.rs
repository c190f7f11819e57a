use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::Result;
use crate::history::{HistoryEntry, HistoryLog};
use crate::quotes::QuotePool;
use crate::records::{RecordBook, RecordStore};
use crate::schedule::{DailyScheduler, STAGES_PER_DAY};
use crate::session::{DailyRun, Progress};
use crate::skill::{Score, SkillModel};

/// Shortest elapsed time handed to the skill model; a stopwatch reading
/// below the clock's resolution would otherwise be zero.
pub const MIN_ELAPSED_SECS: f64 = 0.001;

/// Result of one completed three-stage run.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptReport {
    pub characters: usize,
    pub elapsed_secs: f64,
    pub score: Score,
    /// Personal rank (1-based) if the attempt made the board.
    pub rank: Option<usize>,
    pub play_index: u64,
    /// Set when the board could not be saved; the displayed board is the previous one.
    pub save_error: Option<String>,
}

/// Owns everything about the current daily session: language, the day's
/// passages, the typing run and the record board on display.
pub struct Controller {
    pool: QuotePool,
    date: NaiveDate,
    scheduler: DailyScheduler,
    model: SkillModel,
    book: RecordBook,
    history: Option<HistoryLog>,
    passages: [String; STAGES_PER_DAY],
    run: DailyRun,
    records: RecordStore,
    report: Option<AttemptReport>,
}

impl Controller {
    pub fn new(pool: QuotePool, date: NaiveDate, model: SkillModel, book: RecordBook) -> Self {
        let scheduler = DailyScheduler::default();
        let passages = scheduler.select_daily_passages(pool.quotes(), pool.language(), date);
        let records = book.load(pool.language());
        info!(
            language = pool.language(),
            %date,
            plays = records.play_count,
            "session started"
        );
        Self {
            run: DailyRun::new(&passages),
            pool,
            date,
            scheduler,
            model,
            book,
            history: None,
            passages,
            records,
            report: None,
        }
    }

    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_scheduler(mut self, scheduler: DailyScheduler) -> Self {
        self.scheduler = scheduler;
        self.passages =
            self.scheduler
                .select_daily_passages(self.pool.quotes(), self.pool.language(), self.date);
        self.run = DailyRun::new(&self.passages);
        self
    }

    pub fn language(&self) -> &str {
        self.pool.language()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn model(&self) -> SkillModel {
        self.model
    }

    pub fn passages(&self) -> &[String; STAGES_PER_DAY] {
        &self.passages
    }

    pub fn run(&self) -> &DailyRun {
        &self.run
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn report(&self) -> Option<&AttemptReport> {
        self.report.as_ref()
    }

    /// Same passages, fresh stopwatch.
    pub fn restart(&mut self) {
        self.run = DailyRun::new(&self.passages);
        self.report = None;
    }

    pub fn write(&mut self, c: char) -> Result<Progress> {
        let progress = self.run.write(c);
        if progress == Progress::Finished {
            let elapsed = self.run.elapsed().as_secs_f64().max(MIN_ELAPSED_SECS);
            self.complete(self.run.characters(), elapsed)?;
        }
        Ok(progress)
    }

    pub fn backspace(&mut self) {
        self.run.backspace();
    }

    /// Rank a finished attempt and record it.
    ///
    /// Invalid numbers fail before anything is written. A failed write is
    /// reported inside the returned report and leaves the board on display
    /// unchanged.
    pub fn complete(&mut self, characters: usize, elapsed_secs: f64) -> Result<&AttemptReport> {
        let score = self.model.percentile_for(characters, elapsed_secs)?;
        let language = self.pool.language().to_string();

        let (play_index, rank, save_error) = match self.book.record_attempt(
            &language,
            &self.records,
            elapsed_secs,
            score.percentile,
            score.wpm,
        ) {
            Ok(updated) => {
                let play_index = updated.play_count;
                let rank = updated.rank_of(play_index);
                self.records = updated;
                (play_index, rank, None)
            }
            Err(e) => {
                warn!(%language, error = %e, "records not saved");
                (self.records.play_count + 1, None, Some(e.to_string()))
            }
        };

        if let Some(history) = &self.history {
            let entry = HistoryEntry {
                date: self.date,
                language: language.clone(),
                characters,
                elapsed_secs,
                wpm: score.wpm,
                percentile: score.percentile,
            };
            if let Err(e) = history.append(&entry) {
                warn!(path = %history.path().display(), error = %e, "history not written");
            }
        }

        info!(%language, wpm = score.wpm, percentile = score.percentile, ?rank, "attempt complete");
        Ok(self.report.insert(AttemptReport {
            characters,
            elapsed_secs,
            score,
            rank,
            play_index,
            save_error,
        }))
    }

    pub fn clear_records(&mut self) -> Result<()> {
        self.book.clear(self.pool.language())?;
        self.records = RecordStore::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainError, Error, PersistenceError};
    use crate::store::{KeyValueStore, MemoryStore};
    use assert_matches::assert_matches;
    use serde_json::Value;
    use tempfile::tempdir;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> std::result::Result<Option<Value>, PersistenceError> {
            Ok(None)
        }
        fn set(&mut self, _key: &str, _value: &Value) -> std::result::Result<(), PersistenceError> {
            Err(std::io::Error::other("disk full").into())
        }
        fn remove(&mut self, _key: &str) -> std::result::Result<(), PersistenceError> {
            Ok(())
        }
        fn keys(&self) -> std::result::Result<Vec<String>, PersistenceError> {
            Ok(Vec::new())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn controller() -> Controller {
        let pool = QuotePool::new("en", vec!["ab".into(), "cd".into(), "ef".into(), "gh".into()]);
        Controller::new(
            pool,
            date(),
            SkillModel::default(),
            RecordBook::new(Box::new(MemoryStore::new())),
        )
    }

    #[test]
    fn test_passages_come_from_scheduler() {
        let c = controller();
        let expected = DailyScheduler::default().select_daily_passages(
            &["ab", "cd", "ef", "gh"].map(String::from),
            "en",
            date(),
        );
        assert_eq!(c.passages(), &expected);
    }

    #[test]
    fn test_custom_epoch_makes_today_day_zero() {
        let c = controller().with_scheduler(DailyScheduler::with_epoch(date()));
        let day_zero = DailyScheduler::default().select_daily_passages(
            &["ab", "cd", "ef", "gh"].map(String::from),
            "en",
            crate::schedule::epoch(),
        );
        assert_eq!(c.passages(), &day_zero);
        assert!(!c.run().has_started());
    }

    #[test]
    fn test_typing_all_passages_records_attempt() {
        let mut c = controller();
        let text: String = c.passages().concat();
        let mut last = Progress::Ignored;
        for ch in text.chars() {
            last = c.write(ch).unwrap();
        }
        assert_eq!(last, Progress::Finished);
        let report = c.report().expect("finished run has a report");
        assert_eq!(report.characters, 6);
        assert!(report.elapsed_secs >= MIN_ELAPSED_SECS);
        assert_eq!(c.records().play_count, 1);
    }

    #[test]
    fn test_complete_ranks_and_persists() {
        let mut c = controller();
        let report = c.complete(250, 60.0).unwrap().clone();
        assert_eq!(report.score.wpm, 50.0);
        assert!(report.score.percentile < 50.0);
        assert_eq!(report.rank, Some(1));
        assert_eq!(report.play_index, 1);
        assert!(report.save_error.is_none());
        assert_eq!(c.records().records.len(), 1);
    }

    #[test]
    fn test_complete_rejects_zero_elapsed_without_writing() {
        let mut c = controller();
        assert_matches!(
            c.complete(100, 0.0),
            Err(Error::Domain(DomainError::NonPositiveElapsed(_)))
        );
        assert_eq!(c.records().play_count, 0);
        assert!(c.report().is_none());
    }

    #[test]
    fn test_degenerate_model_fails_before_saving() {
        let pool = QuotePool::new("en", vec!["a".into()]);
        let mut c = Controller::new(
            pool,
            date(),
            SkillModel::new(40.0, 0.0),
            RecordBook::new(Box::new(MemoryStore::new())),
        );
        assert_matches!(
            c.complete(200, 60.0),
            Err(Error::Domain(DomainError::InvalidModel { .. }))
        );
        assert_eq!(c.records().play_count, 0);
        assert!(c.records().records.is_empty());
        assert!(c.report().is_none());
    }

    #[test]
    fn test_failed_save_keeps_displayed_board() {
        let pool = QuotePool::new("en", vec!["a".into()]);
        let mut c = Controller::new(
            pool,
            date(),
            SkillModel::default(),
            RecordBook::new(Box::new(FailingStore)),
        );
        let report = c.complete(200, 60.0).unwrap().clone();
        assert_eq!(report.score.percentile, 50.0);
        assert!(report.save_error.unwrap().contains("disk full"));
        assert_eq!(c.records(), &RecordStore::default());
    }

    #[test]
    fn test_six_attempts_keep_five() {
        let mut c = controller();
        for secs in [60.0, 30.0, 90.0, 45.0, 120.0, 20.0] {
            c.complete(250, secs).unwrap();
        }
        assert_eq!(c.records().play_count, 6);
        assert_eq!(c.records().records.len(), 5);
        assert!(c.records().records.iter().all(|r| r.duration_seconds != 120.0));
    }

    #[test]
    fn test_restart_keeps_passages() {
        let mut c = controller();
        let before = c.passages().clone();
        c.write(before[0].chars().next().unwrap()).unwrap();
        c.restart();
        assert_eq!(c.passages(), &before);
        assert!(!c.run().has_started());
    }

    #[test]
    fn test_clear_records() {
        let mut c = controller();
        c.complete(250, 60.0).unwrap();
        c.clear_records().unwrap();
        assert_eq!(c.records(), &RecordStore::default());
    }

    #[test]
    fn test_history_is_appended() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.csv"));
        let mut c = controller().with_history(log.clone());
        c.complete(250, 60.0).unwrap();
        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].language, "en");
        assert_eq!(entries[0].date, date());
    }

    #[test]
    fn test_records_loaded_at_start() {
        let mut store = MemoryStore::new();
        let mut seeded = RecordStore::default();
        seeded.record_attempt(30.0, 12.0, 60.0, 1);
        store
            .set(&crate::records::storage_key("en"), &seeded.to_value())
            .unwrap();
        let c = Controller::new(
            QuotePool::new("en", vec!["x".into()]),
            date(),
            SkillModel::default(),
            RecordBook::new(Box::new(store)),
        );
        assert_eq!(c.records(), &seeded);
    }
}
