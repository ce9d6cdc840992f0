//! Loading and exporting trade datasets.
//!
//! A dataset is a CSV file with at least the three required columns.
//! Any extra columns are carried through untouched so that exports keep
//! the original schema. Name cells are kept verbatim, so `"A "` and `"A"`
//! are different countries; a cell holding only whitespace is missing.

use crate::error::{Result, TradeError};
use crate::record::TradeRecord;
use csv::StringRecord;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Column holding the reporting country.
pub const REPORTER_COLUMN: &str = "ReporterName";

/// Column holding the partner country.
pub const PARTNER_COLUMN: &str = "PartnerName";

/// Column holding the trade value, in thousands of USD.
pub const VALUE_COLUMN: &str = "TradeValue in 1000 USD";

const REQUIRED_COLUMNS: [&str; 3] = [REPORTER_COLUMN, PARTNER_COLUMN, VALUE_COLUMN];

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    reporter: usize,
    partner: usize,
    value: usize,
}

impl ColumnIndex {
    /// Locates the required columns, failing with every missing name.
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|name| find(*name).is_none())
            .map(|name| name.to_string())
            .collect();

        match (find(REPORTER_COLUMN), find(PARTNER_COLUMN), find(VALUE_COLUMN)) {
            (Some(reporter), Some(partner), Some(value)) => Ok(Self {
                reporter,
                partner,
                value,
            }),
            _ => Err(TradeError::Schema { missing }),
        }
    }
}

/// A validated, in-memory trade dataset.
#[derive(Debug, Clone)]
pub struct TradeDataset {
    headers: StringRecord,
    records: Vec<TradeRecord>,
}

impl TradeDataset {
    /// Loads a dataset from a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(file)?;

        info!(
            "Loaded {} rows ({} reporters) from {}",
            dataset.len(),
            dataset.reporters().len(),
            path.display()
        );

        Ok(dataset)
    }

    /// Loads a dataset from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = ColumnIndex::locate(&headers)?;

        let mut records = Vec::new();
        for (line, row) in csv_reader.records().enumerate() {
            let row = row?;
            records.push(parse_row(row, columns, line + 2));
        }

        debug!("Parsed {} trade rows", records.len());

        Ok(Self { headers, records })
    }

    /// Builds a dataset from already-parsed records.
    ///
    /// The header is the three required columns in canonical order.
    pub fn from_records(records: Vec<TradeRecord>) -> Self {
        Self {
            headers: StringRecord::from(REQUIRED_COLUMNS.to_vec()),
            records,
        }
    }

    /// Header row of the source file.
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// All rows in source order.
    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct reporting countries, sorted ascending.
    pub fn reporters(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.reporter.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether any row was reported by the given country.
    pub fn has_reporter(&self, reporter: &str) -> bool {
        self.records.iter().any(|r| r.is_reported_by(reporter))
    }

    /// Fails with `UnknownReporter` unless the country reports rows here.
    pub fn require_reporter(&self, reporter: &str) -> Result<()> {
        if self.has_reporter(reporter) {
            Ok(())
        } else {
            Err(TradeError::UnknownReporter(reporter.to_string()))
        }
    }

    /// Writes the header and the raw rows of `records` as CSV.
    pub fn write_csv<'a, W, I>(&self, records: I, writer: W) -> Result<usize>
    where
        W: Write,
        I: IntoIterator<Item = &'a TradeRecord>,
    {
        let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        csv_writer.write_record(&self.headers)?;

        let mut written = 0;
        for record in records {
            csv_writer.write_record(record.raw())?;
            written += 1;
        }
        csv_writer.flush()?;

        Ok(written)
    }
}

/// Converts one CSV row into a record.
fn parse_row(row: StringRecord, columns: ColumnIndex, line: usize) -> TradeRecord {
    let text = |idx: usize| {
        row.get(idx)
            .filter(|cell| !cell.trim().is_empty())
            .map(str::to_string)
    };

    let reporter = text(columns.reporter);
    let partner = text(columns.partner);
    let value = text(columns.value).and_then(|cell| match cell.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            warn!("Line {}: ignoring trade value {:?}", line, cell);
            None
        }
    });

    TradeRecord {
        reporter,
        partner,
        value,
        raw: row,
    }
}
