//! Record sources and the loader that joins them into a [`RecordSet`].

use crate::error::Result;
use crate::record::{RawRecord, RecordCategory, RecordSet};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

/// Read-only source of raw records, queried one category at a time.
pub trait RecordStore {
    fn get_all(&self, category: RecordCategory) -> Result<Vec<RawRecord>>;
}

/// Records held in memory, grouped by category.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: HashMap<RecordCategory, Vec<RawRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: RecordCategory, record: RawRecord) {
        self.records.entry(category).or_default().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryRecordStore {
    fn get_all(&self, category: RecordCategory) -> Result<Vec<RawRecord>> {
        Ok(self.records.get(&category).cloned().unwrap_or_default())
    }
}

/// One CSV row: the category column plus the raw record fields.
#[derive(Debug, Deserialize)]
struct CsvRow {
    category: String,
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    day_of_month: Option<String>,
    #[serde(default)]
    kind: Option<String>,
}

/// Record store backed by a single CSV export.
///
/// Expected header: `category,id,description,amount,date,day_of_month,kind`.
/// Rows that cannot be read or that name an unknown category are logged at
/// warn level and skipped.
#[derive(Debug, Clone, Default)]
pub struct CsvRecordStore {
    inner: MemoryRecordStore,
}

impl CsvRecordStore {
    /// Reads every row from `reader` into memory.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut inner = MemoryRecordStore::new();

        for (row_idx, result) in csv_reader.deserialize::<CsvRow>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                    continue;
                }
            };

            let category = match row.category.parse::<RecordCategory>() {
                Ok(category) => category,
                Err(e) => {
                    warn!("Row {}: {}, skipping", row_num, e);
                    continue;
                }
            };

            inner.insert(
                category,
                RawRecord {
                    id: row.id,
                    description: row.description,
                    amount: row.amount,
                    date: row.date,
                    day_of_month: row.day_of_month,
                    kind: row.kind,
                },
            );
        }

        debug!("Loaded {} raw records from CSV", inner.len());
        Ok(CsvRecordStore { inner })
    }
}

impl RecordStore for CsvRecordStore {
    fn get_all(&self, category: RecordCategory) -> Result<Vec<RawRecord>> {
        self.inner.get_all(category)
    }
}

/// Fetches every category from `store` and validates each raw record.
///
/// Store failures propagate; malformed records are logged and skipped so a
/// single bad row never aborts the projection.
pub fn load_records<S: RecordStore + ?Sized>(store: &S) -> Result<RecordSet> {
    let mut set = RecordSet::new();

    for category in RecordCategory::ALL {
        let raw_records = store.get_all(category)?;
        debug!("Fetched {} {} records", raw_records.len(), category);

        for raw in raw_records {
            match raw.parse(category) {
                Ok(record) => set.push(record),
                Err(e) => warn!("Skipping {} record: {}", category, e),
            }
        }
    }

    Ok(set)
}
