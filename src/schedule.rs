use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::debug;

use crate::deck::{deck_seed, shuffle_indices};

/// Passages handed out per day.
pub const STAGES_PER_DAY: usize = 3;

/// Day zero of the global passage stream (year, month, day).
pub const EPOCH_YMD: (i32, u32, u32) = (2024, 1, 1);

pub fn epoch() -> NaiveDate {
    let (y, m, d) = EPOCH_YMD;
    NaiveDate::from_ymd_opt(y, m, d).expect("epoch is a valid calendar date")
}

/// Asia/Seoul. Korea has not observed DST since 1988, so a fixed offset is exact.
pub const REFERENCE_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// Shown in every stage when the pool has nothing to offer.
pub const PLACEHOLDER_PASSAGE: &str = "No quotes are available for this language today.";

/// Source of "today" for scheduling.
pub trait Calendar {
    fn today(&self) -> NaiveDate;
}

/// Today's date on the wall clock in Seoul, whatever the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeoulCalendar;

impl SeoulCalendar {
    pub fn offset() -> FixedOffset {
        FixedOffset::east_opt(REFERENCE_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
    }

    /// Seoul calendar date at `instant`; the day turns at 15:00 UTC.
    pub fn date_at(instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Self::offset()).date_naive()
    }
}

impl Calendar for SeoulCalendar {
    fn today(&self) -> NaiveDate {
        Self::date_at(Utc::now())
    }
}

/// A pinned date, for `--date` and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedCalendar(pub NaiveDate);

impl Calendar for FixedCalendar {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Whole days since `epoch`; dates before it count as day zero.
pub fn days_since(epoch: NaiveDate, today: NaiveDate) -> u64 {
    (today - epoch).num_days().max(0) as u64
}

/// Maps (day, language, stage) onto a pool by walking an endless stream of
/// reshuffled decks.
#[derive(Debug, Clone, Copy)]
pub struct DailyScheduler {
    epoch: NaiveDate,
}

impl Default for DailyScheduler {
    fn default() -> Self {
        Self { epoch: epoch() }
    }
}

impl DailyScheduler {
    pub fn with_epoch(epoch: NaiveDate) -> Self {
        Self { epoch }
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn global_start_index(&self, today: NaiveDate) -> u64 {
        days_since(self.epoch, today) * STAGES_PER_DAY as u64
    }

    /// Pool position served at `global_index` of the stream.
    pub fn pool_index(language: &str, pool_size: usize, global_index: u64) -> Option<usize> {
        if pool_size == 0 {
            return None;
        }
        let size = pool_size as u64;
        let deck_index = global_index / size;
        let local_index = (global_index % size) as usize;
        let permutation = shuffle_indices(pool_size, &deck_seed(language, deck_index));
        Some(permutation[local_index])
    }

    /// Pool indices for the day's three stages; `None` entries mean the pool is empty.
    pub fn daily_indices(
        &self,
        pool_size: usize,
        language: &str,
        today: NaiveDate,
    ) -> [Option<usize>; STAGES_PER_DAY] {
        let start = self.global_start_index(today);
        let mut out = [None; STAGES_PER_DAY];
        for (offset, slot) in out.iter_mut().enumerate() {
            *slot = Self::pool_index(language, pool_size, start + offset as u64);
        }
        out
    }

    pub fn select_daily_passages(
        &self,
        pool: &[String],
        language: &str,
        today: NaiveDate,
    ) -> [String; STAGES_PER_DAY] {
        let indices = self.daily_indices(pool.len(), language, today);
        debug!(%language, %today, ?indices, pool_size = pool.len(), "daily selection");
        indices.map(|idx| match idx {
            Some(i) => pool[i].clone(),
            None => PLACEHOLDER_PASSAGE.to_string(),
        })
    }
}
