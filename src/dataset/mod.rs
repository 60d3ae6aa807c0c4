//! The observation table: rows, natural key, time stamping and merge.

pub mod codec;

use std::collections::HashSet;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc};

/// The site reports in Israel local time as a fixed +02:00 offset,
/// deliberately not DST-aware.
pub fn collection_tz() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).expect("fixed +02:00 offset")
}

/// One persisted occupancy sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub lot: String,
    /// Normalized occupancy level in [0, 1].
    pub status: f64,
    /// Full capture instant; carries sub-quantum precision and is not
    /// part of the natural key.
    pub time: DateTime<FixedOffset>,
    /// Weekday index, 0 = Sunday.
    pub day: i32,
    pub hour: i32,
    /// Minute quantized down to the nearest 10.
    pub minute: i32,
    pub date: NaiveDate,
}

impl Observation {
    /// The (lot, date, day, hour, minute) tuple identifying this
    /// observation slot. At most one row per key is ever persisted.
    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            lot: self.lot.clone(),
            date: self.date,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
        }
    }
}

/// Natural key of an observation slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObservationKey {
    pub lot: String,
    pub date: NaiveDate,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
}

/// A capture instant quantized to the 10-minute sampling grid.
#[derive(Debug, Clone, Copy)]
pub struct TimeBucket {
    pub time: DateTime<FixedOffset>,
    pub date: NaiveDate,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
}

impl TimeBucket {
    /// Bucket for the current instant in the collection timezone.
    pub fn now() -> Self {
        Self::from_time(Utc::now().with_timezone(&collection_tz()))
    }

    /// Bucket for an explicit instant. Weekday is shifted from chrono's
    /// 0 = Monday to the dataset's 0 = Sunday.
    pub fn from_time(now: DateTime<FixedOffset>) -> Self {
        Self {
            time: now,
            date: now.date_naive(),
            day: ((now.weekday().num_days_from_monday() + 1) % 7) as i32,
            hour: now.hour() as i32,
            minute: (now.minute() as i32 / 10) * 10,
        }
    }

    /// Stamp one lot's normalized status into an observation row.
    pub fn observation(&self, lot: &str, status: f64) -> Observation {
        Observation {
            lot: lot.to_string(),
            status,
            time: self.time,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            date: self.date,
        }
    }
}

/// The full historical table. Rows are never mutated or deleted once
/// persisted; merging only appends rows with unseen natural keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Observation>,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append new observations after the existing history. Duplicate
    /// keys are resolved at save time, first occurrence winning, so
    /// appending after existing rows is what makes existing data win.
    pub fn append(&mut self, new_rows: Vec<Observation>) {
        self.rows.extend(new_rows);
    }

    /// Drop rows whose natural key was already seen earlier in the
    /// table. Kept rows are retained verbatim, original `time` included.
    pub fn dedup_by_key(&mut self) {
        let mut seen: HashSet<ObservationKey> = HashSet::with_capacity(self.rows.len());
        self.rows.retain(|row| seen.insert(row.key()));
    }
}
