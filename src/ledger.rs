use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::AppError;

/// Reward points credited per donated item.
pub const POINTS_PER_ITEM: u32 = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DonationType {
    DropOff,
    Pickup,
}

/// One donation event. Field order matters: records are written as one JSON
/// object per line in exactly this order, and are never updated or deleted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DonationRecord {
    pub user_id: String,
    #[serde(with = "second_precision")]
    pub timestamp: DateTime<Utc>,
    pub food_items: Vec<String>,
    pub donation_type: DonationType,
    pub points_earned: u32,
}

/// Timestamps are stored at second precision as `YYYY-MM-DD HH:MM:SS`.
mod second_precision {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// Splits a free-text item list on commas, dropping empty segments.
/// Items are not deduplicated or validated against any ingredient list.
pub fn parse_items(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn score_items(items: &[String]) -> u32 {
    items.len() as u32 * POINTS_PER_ITEM
}

/// Append-only donation ledger backed by a JSON-lines file. Appends are
/// serialized through a mutex so concurrent handlers cannot interleave
/// partial lines within this process.
pub struct Ledger {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one donation and returns the stored record. Points are only
    /// credited once the write has been flushed; on I/O failure nothing is
    /// recorded and no points exist anywhere.
    pub async fn record(
        &self,
        user_id: &str,
        food_items_text: &str,
        donation_type: DonationType,
    ) -> Result<DonationRecord, AppError> {
        let items = parse_items(food_items_text);
        if items.is_empty() {
            return Err(AppError::Validation(
                "At least one food item is required".to_string(),
            ));
        }

        let record = DonationRecord {
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
            points_earned: score_items(&items),
            food_items: items,
            donation_type,
        };

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.append_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(record)
    }

    /// Reads every persisted record. Malformed lines are skipped with a
    /// warning rather than failing the whole read.
    pub async fn load_all(&self) -> Result<Vec<DonationRecord>, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DonationRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed ledger line {}: {}", idx + 1, e);
                }
            }
        }
        Ok(records)
    }

    pub async fn records_for(&self, user_id: &str) -> Result<Vec<DonationRecord>, AppError> {
        let mut records = self.load_all().await?;
        records.retain(|r| r.user_id == user_id);
        Ok(records)
    }

    /// Cumulative points for one user, recomputed from the ledger on demand.
    pub async fn total_points(&self, user_id: &str) -> Result<u64, AppError> {
        Ok(self
            .records_for(user_id)
            .await?
            .iter()
            .map(|r| u64::from(r.points_earned))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_ledger() -> Ledger {
        let path = std::env::temp_dir().join(format!("smartbite-test-{}.jsonl", Uuid::new_v4()));
        Ledger::new(path)
    }

    #[test]
    fn scoring_is_ten_points_per_item() {
        let items = parse_items("rice, beans, bread");
        assert_eq!(items, vec!["rice", "beans", "bread"]);
        assert_eq!(score_items(&items), 30);
    }

    #[test]
    fn empty_segments_do_not_score() {
        assert_eq!(parse_items("rice,, ,bread").len(), 2);
        assert!(parse_items("  ,  ").is_empty());
        assert!(parse_items("").is_empty());
    }

    #[tokio::test]
    async fn record_then_read_round_trips() {
        let ledger = temp_ledger();

        let rec = ledger
            .record("user-a", "rice, beans, bread", DonationType::DropOff)
            .await
            .expect("record");
        assert_eq!(rec.points_earned, 30);

        ledger
            .record("user-a", "milk", DonationType::Pickup)
            .await
            .expect("record");
        ledger
            .record("user-b", "apples, oranges", DonationType::DropOff)
            .await
            .expect("record");

        assert_eq!(ledger.total_points("user-a").await.unwrap(), 40);
        assert_eq!(ledger.total_points("user-b").await.unwrap(), 20);
        assert_eq!(ledger.records_for("user-a").await.unwrap().len(), 2);

        let _ = tokio::fs::remove_file(ledger.path()).await;
    }

    #[tokio::test]
    async fn record_rejects_empty_items_before_touching_the_file() {
        let ledger = temp_ledger();

        let err = ledger
            .record("user-a", "   ", DonationType::Pickup)
            .await
            .expect_err("empty items must be rejected");
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!ledger.path().exists());
    }

    #[tokio::test]
    async fn write_failure_credits_nothing() {
        // A directory path cannot be opened for append.
        let dir = std::env::temp_dir().join(format!("smartbite-test-dir-{}", Uuid::new_v4()));
        tokio::fs::create_dir(&dir).await.expect("mkdir");
        let ledger = Ledger::new(&dir);

        let result = ledger.record("user-a", "rice", DonationType::DropOff).await;
        assert!(matches!(result, Err(AppError::Io(_))));

        let _ = tokio::fs::remove_dir(&dir).await;
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let ledger = temp_ledger();
        ledger
            .record("user-a", "rice, beans", DonationType::DropOff)
            .await
            .expect("record");

        let mut raw = tokio::fs::read_to_string(ledger.path()).await.unwrap();
        raw.push_str("{not valid json\n");
        tokio::fs::write(ledger.path(), raw).await.unwrap();

        ledger
            .record("user-a", "bread", DonationType::Pickup)
            .await
            .expect("record");

        let records = ledger.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(ledger.total_points("user-a").await.unwrap(), 30);

        let _ = tokio::fs::remove_file(ledger.path()).await;
    }

    #[tokio::test]
    async fn records_serialize_fields_in_ledger_order() {
        let ledger = temp_ledger();
        ledger
            .record("user-a", "rice", DonationType::DropOff)
            .await
            .expect("record");

        let raw = tokio::fs::read_to_string(ledger.path()).await.unwrap();
        let line = raw.lines().next().unwrap();
        let user_pos = line.find("\"user_id\"").unwrap();
        let ts_pos = line.find("\"timestamp\"").unwrap();
        let items_pos = line.find("\"food_items\"").unwrap();
        let type_pos = line.find("\"donation_type\"").unwrap();
        let points_pos = line.find("\"points_earned\"").unwrap();
        assert!(user_pos < ts_pos && ts_pos < items_pos);
        assert!(items_pos < type_pos && type_pos < points_pos);
        assert!(line.contains("\"drop-off\""));

        let _ = tokio::fs::remove_file(ledger.path()).await;
    }
}
