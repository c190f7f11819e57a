use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::store::KeyValueStore;

/// Best attempts kept per language.
pub const MAX_RECORDS: usize = 5;
pub const STORAGE_KEY_PREFIX: &str = "typingStats_";

/// One kept attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub play_index: u64,
    pub percentile: f64,
    pub wpm: f64,
    pub duration_seconds: f64,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

/// Per-language leaderboard: best attempts first, at most [`MAX_RECORDS`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStore {
    pub play_count: u64,
    pub records: Vec<Record>,
}

impl RecordStore {
    /// Normalize any persisted shape into the current one.
    ///
    /// Handles the current `{playCount, records}` layout, the older
    /// `{playCount, bestPercentile, bestTime, bestWpm}` layout, partially
    /// written values and plain garbage, in which case the result is empty.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let mut records: Vec<Record> = match obj.get("records") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(pos, item)| record_from_value(item, pos as u64 + 1))
                .collect(),
            _ => legacy_best(obj).into_iter().collect(),
        };

        let play_count = obj
            .get("playCount")
            .and_then(non_negative_int)
            .unwrap_or(0)
            .max(records.len() as u64);

        sort_and_truncate(&mut records);
        Self {
            play_count,
            records,
        }
    }

    pub fn to_value(&self) -> Value {
        // plain data, cannot fail to serialize
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Count the attempt and keep it if it ranks among the best.
    pub fn record_attempt(
        &mut self,
        duration_seconds: f64,
        percentile: f64,
        wpm: f64,
        timestamp: i64,
    ) -> &Record {
        self.play_count += 1;
        let record = Record {
            play_index: self.play_count,
            percentile,
            wpm,
            duration_seconds,
            timestamp,
        };
        self.records.push(record);
        sort_and_truncate(&mut self.records);
        self.latest_or_best()
    }

    fn latest_or_best(&self) -> &Record {
        let play_count = self.play_count;
        self.records
            .iter()
            .find(|r| r.play_index == play_count)
            .or_else(|| self.records.first())
            .expect("record_attempt always leaves at least one record")
    }

    /// 1-based rank of the given play, if it is on the board.
    pub fn rank_of(&self, play_index: u64) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.play_index == play_index)
            .map(|i| i + 1)
    }

    pub fn best(&self) -> Option<&Record> {
        self.records.first()
    }
}

fn sort_and_truncate(records: &mut Vec<Record>) {
    records.sort_by(|a, b| a.percentile.total_cmp(&b.percentile));
    records.truncate(MAX_RECORDS);
}

fn finite(v: &Value) -> Option<f64> {
    v.as_f64().filter(|f| f.is_finite())
}

fn non_negative_int(v: &Value) -> Option<u64> {
    v.as_u64()
        .or_else(|| finite(v).filter(|f| *f >= 0.0).map(|f| f as u64))
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| obj.get(*n))
}

fn record_from_value(value: &Value, position: u64) -> Option<Record> {
    let obj = value.as_object()?;
    let percentile = obj.get("percentile").and_then(finite)?;
    Some(Record {
        play_index: obj
            .get("playIndex")
            .and_then(non_negative_int)
            .unwrap_or(position),
        percentile,
        wpm: obj.get("wpm").and_then(finite).unwrap_or(0.0),
        duration_seconds: field(obj, &["durationSeconds", "time", "duration"])
            .and_then(finite)
            .unwrap_or(0.0),
        timestamp: field(obj, &["timestamp", "date"])
            .and_then(|v| v.as_i64().or_else(|| finite(v).map(|f| f as i64)))
            .unwrap_or(0),
    })
}

fn legacy_best(obj: &Map<String, Value>) -> Option<Record> {
    let percentile = obj.get("bestPercentile").and_then(finite)?;
    Some(Record {
        play_index: obj.get("playCount").and_then(non_negative_int).unwrap_or(1).max(1),
        percentile,
        wpm: obj.get("bestWpm").and_then(finite).unwrap_or(0.0),
        duration_seconds: obj.get("bestTime").and_then(finite).unwrap_or(0.0),
        timestamp: 0,
    })
}

pub fn storage_key(language: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{language}")
}

/// Loads and saves per-language [`RecordStore`]s through a key-value store.
pub struct RecordBook {
    store: Box<dyn KeyValueStore>,
}

impl RecordBook {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Never fails: unreadable data means "no records yet".
    pub fn load(&self, language: &str) -> RecordStore {
        match self.store.get(&storage_key(language)) {
            Ok(Some(value)) => RecordStore::from_value(&value),
            Ok(None) => RecordStore::default(),
            Err(e) => {
                warn!(%language, error = %e, "could not read records, starting fresh");
                RecordStore::default()
            }
        }
    }

    /// Apply one attempt to `current` and persist the result.
    ///
    /// `current` is left as it was; on success the updated board is returned.
    pub fn record_attempt(
        &mut self,
        language: &str,
        current: &RecordStore,
        duration_seconds: f64,
        percentile: f64,
        wpm: f64,
    ) -> Result<RecordStore, PersistenceError> {
        let mut updated = current.clone();
        updated.record_attempt(
            duration_seconds,
            percentile,
            wpm,
            Utc::now().timestamp_millis(),
        );
        self.store.set(&storage_key(language), &updated.to_value())?;
        info!(
            %language,
            play = updated.play_count,
            percentile,
            rank = ?updated.rank_of(updated.play_count),
            "attempt recorded"
        );
        Ok(updated)
    }

    pub fn clear(&mut self, language: &str) -> Result<(), PersistenceError> {
        self.store.remove(&storage_key(language))?;
        info!(%language, "records cleared");
        Ok(())
    }

    /// Remove every language's board; returns how many were removed.
    pub fn clear_all(&mut self) -> Result<usize, PersistenceError> {
        let keys: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(STORAGE_KEY_PREFIX))
            .collect();
        for key in &keys {
            self.store.remove(key)?;
        }
        info!(count = keys.len(), "all records cleared");
        Ok(keys.len())
    }
}
