//! A single trade-flow row.

use serde::Serialize;

/// One row of the trade dataset.
///
/// Fields are optional because source files routinely have blank cells.
/// The raw CSV row is kept alongside so the filtered subset can be written
/// back out with every original column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    /// Reporting country.
    pub reporter: Option<String>,

    /// Counterpart country.
    pub partner: Option<String>,

    /// Trade value in thousands of USD.
    pub value: Option<f64>,

    #[serde(skip)]
    pub(crate) raw: csv::StringRecord,
}

impl TradeRecord {
    /// Creates a complete record.
    ///
    /// The raw row is synthesized in required-column order.
    pub fn new(reporter: &str, partner: &str, value: f64) -> Self {
        Self::from_parts(Some(reporter), Some(partner), Some(value))
    }

    /// Creates a record from possibly-missing fields.
    pub fn from_parts(reporter: Option<&str>, partner: Option<&str>, value: Option<f64>) -> Self {
        let value_cell = value.map(|v| v.to_string()).unwrap_or_default();
        let raw = csv::StringRecord::from(vec![
            reporter.unwrap_or_default(),
            partner.unwrap_or_default(),
            value_cell.as_str(),
        ]);

        Self {
            reporter: reporter.map(str::to_string),
            partner: partner.map(str::to_string),
            value,
            raw,
        }
    }

    /// Returns the partner and value when both are present.
    pub fn partner_value(&self) -> Option<(&str, f64)> {
        Some((self.partner.as_deref()?, self.value?))
    }

    /// Whether this row was reported by the given country.
    pub fn is_reported_by(&self, reporter: &str) -> bool {
        self.reporter.as_deref() == Some(reporter)
    }

    /// The original CSV fields of this row.
    pub fn raw(&self) -> &csv::StringRecord {
        &self.raw
    }
}
