use chrono::{Duration, Local, NaiveDateTime};
use rand::Rng;
use std::sync::{PoisonError, RwLock};

/// Timestamp layout used for the `/stats` rows (microsecond precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    pub book_count: u32,
}

/// In-memory detection history; lost when the process exits.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<Record>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: Record) {
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        guard.push(record);
    }

    pub fn record_now(&self, book_count: u32) {
        self.insert(Record {
            timestamp: Local::now().naive_local(),
            book_count,
        });
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Records of the trailing `days` days before `now`, oldest first, as the
    /// index-aligned label and count columns the stats endpoint returns.
    /// A window reaching past the earliest representable date covers every
    /// record.
    pub fn window(&self, days: u32, now: NaiveDateTime) -> (Vec<String>, Vec<u32>) {
        let since = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDateTime::MIN);
        let guard = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<&Record> = guard
            .iter()
            .filter(|record| record.timestamp >= since)
            .collect();
        rows.sort_by_key(|record| record.timestamp);
        rows.iter()
            .map(|record| {
                (
                    record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    record.book_count,
                )
            })
            .unzip()
    }

    /// Adds one record per day for the last `days` days, at noon.
    pub fn seed_history(&self, days: u32, max_books: u32, rng: &mut impl Rng) -> usize {
        let today = Local::now().date_naive();
        let mut inserted = 0;
        for offset in (1..=days).rev() {
            let Some(timestamp) = today
                .checked_sub_signed(Duration::days(i64::from(offset)))
                .and_then(|date| date.and_hms_opt(12, 0, 0))
            else {
                continue;
            };
            self.insert(Record {
                timestamp,
                book_count: rng.gen_range(0..=max_books),
            });
            inserted += 1;
        }
        inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::{rngs::StdRng, SeedableRng};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(timestamp: NaiveDateTime, book_count: u32) -> Record {
        Record {
            timestamp,
            book_count,
        }
    }

    #[test]
    fn window_filters_and_orders_records() {
        let store = RecordStore::new();
        store.insert(record(at(20, 9), 5));
        store.insert(record(at(2, 9), 1));
        store.insert(record(at(18, 9), 3));

        let (timestamps, counts) = store.window(7, at(21, 10));
        assert_eq!(counts, vec![3, 5]);
        assert_eq!(timestamps[0], "2024-01-18 09:00:00.000000");
        assert_eq!(timestamps.len(), counts.len());
    }

    #[test]
    fn empty_store_gives_empty_columns() {
        let store = RecordStore::new();
        let (timestamps, counts) = store.window(30, at(21, 10));
        assert!(timestamps.is_empty());
        assert!(counts.is_empty());
    }

    #[test]
    fn oversized_window_returns_every_record() {
        let store = RecordStore::new();
        store.insert(record(at(2, 9), 1));
        store.insert(record(at(20, 9), 5));

        let (timestamps, counts) = store.window(u32::MAX, at(21, 10));
        assert_eq!(counts, vec![1, 5]);
        assert_eq!(timestamps.len(), 2);
    }

    #[test]
    fn seeded_history_falls_inside_the_window() {
        let store = RecordStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(store.seed_history(5, 10, &mut rng), 5);
        assert_eq!(store.len(), 5);

        let (_, counts) = store.window(30, Local::now().naive_local());
        assert_eq!(counts.len(), 5);
        assert!(counts.iter().all(|&count| count <= 10));
    }
}
