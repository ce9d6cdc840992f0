//! Partner ranking for a reporting country.
//!
//! Rows are filtered to one reporter, cleaned of incomplete and
//! unattributed entries, summed per partner and ranked by total value.

use crate::dataset::TradeDataset;
use crate::record::TradeRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Number of partners kept when no limit is given.
pub const DEFAULT_TOP_K: usize = 10;

/// Partner name used by sources for unattributed trade.
pub const UNSPECIFIED_PARTNER: &str = "Unspecified";

/// Summed trade value with one partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerTotal {
    pub partner: String,
    pub total_value: f64,
}

/// Partners of one reporter, sorted by total value, largest first.
///
/// Totals are never negative and each partner appears once. Rankings
/// built by hand or deserialized keep the order they were given in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerRanking {
    entries: Vec<PartnerTotal>,
}

impl PartnerRanking {
    /// Number of ranked partners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no partner qualified.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &PartnerTotal> {
        self.entries.iter()
    }

    /// Entries as a slice.
    pub fn entries(&self) -> &[PartnerTotal] {
        &self.entries
    }

    /// Largest total, or `None` for an empty ranking.
    ///
    /// Non-finite totals are ignored.
    pub fn max_value(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|e| e.total_value)
            .filter(|v| v.is_finite())
            .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))))
    }

    /// Whether the partner made the ranking.
    pub fn contains(&self, partner: &str) -> bool {
        self.entries.iter().any(|e| e.partner == partner)
    }

    /// Total for one partner.
    pub fn value_of(&self, partner: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.partner == partner)
            .map(|e| e.total_value)
    }

    /// Share of the maximum for `value`, in `[0, 1]`.
    ///
    /// Returns 0 when the maximum is zero or the ranking is empty.
    pub fn normalized(&self, value: f64) -> f64 {
        match self.max_value() {
            // `f64::max` maps NaN to 0.
            Some(max) if max > 0.0 => (value / max).max(0.0).min(1.0),
            _ => 0.0,
        }
    }
}

impl FromIterator<PartnerTotal> for PartnerRanking {
    /// Collects entries as given; callers are responsible for ordering.
    fn from_iter<T: IntoIterator<Item = PartnerTotal>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Returns the partner and value of a row that counts toward `reporter`.
fn qualifying<'a>(record: &'a TradeRecord, reporter: &str) -> Option<(&'a str, f64)> {
    if !record.is_reported_by(reporter) {
        return None;
    }
    let (partner, value) = record.partner_value()?;
    if partner == UNSPECIFIED_PARTNER {
        return None;
    }
    Some((partner, value))
}

/// Ranks the top `k` partners of `reporter` by summed trade value.
///
/// Ties keep the order in which partners first appear in the dataset.
/// A reporter without qualifying rows yields an empty ranking.
pub fn rank(dataset: &TradeDataset, reporter: &str, k: usize) -> PartnerRanking {
    rank_records(dataset.records(), reporter, k)
}

/// Ranks over a plain slice of records.
pub fn rank_records(records: &[TradeRecord], reporter: &str, k: usize) -> PartnerRanking {
    let mut totals: Vec<PartnerTotal> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for (partner, value) in records.iter().filter_map(|r| qualifying(r, reporter)) {
        match positions.get(partner) {
            Some(&idx) => totals[idx].total_value += value,
            None => {
                positions.insert(partner, totals.len());
                totals.push(PartnerTotal {
                    partner: partner.to_string(),
                    total_value: value,
                });
            }
        }
    }

    totals.retain(|t| {
        let finite = t.total_value.is_finite();
        if !finite {
            warn!("Dropping {}: total trade value overflows", t.partner);
        }
        finite
    });

    let partner_count = totals.len();

    // `sort_by` is stable, which gives first-seen order among equal totals.
    totals.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    totals.truncate(k);

    debug!(
        "Ranked {} of {} partners for {}",
        totals.len(),
        partner_count,
        reporter
    );

    PartnerRanking { entries: totals }
}

/// Rows of `reporter` that contributed to `ranking`, in source order.
pub fn filtered_subset<'a>(
    dataset: &'a TradeDataset,
    reporter: &str,
    ranking: &PartnerRanking,
) -> Vec<&'a TradeRecord> {
    let ranked: HashSet<&str> = ranking.iter().map(|e| e.partner.as_str()).collect();

    dataset
        .records()
        .iter()
        .filter(|r| {
            qualifying(r, reporter)
                .map(|(partner, _)| ranked.contains(partner))
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: &[(&str, &str, f64)]) -> TradeDataset {
        TradeDataset::from_records(
            rows.iter()
                .map(|(r, p, v)| TradeRecord::new(r, p, *v))
                .collect(),
        )
    }

    #[test]
    fn test_sums_and_excludes_unspecified() {
        let data = dataset(&[
            ("A", "B", 100000.0),
            ("A", "C", 50000.0),
            ("A", "B", 20000.0),
            ("A", "Unspecified", 999999.0),
        ]);

        let ranking = rank(&data, "A", DEFAULT_TOP_K);

        let expected: Vec<_> = vec![("B", 120000.0), ("C", 50000.0)];
        let actual: Vec<_> = ranking
            .iter()
            .map(|e| (e.partner.as_str(), e.total_value))
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(ranking.max_value(), Some(120000.0));
    }

    #[test]
    fn test_reporter_match_is_exact() {
        let data = dataset(&[("A", "B", 1.0), ("a", "C", 5.0), ("A ", "D", 5.0)]);

        let ranking = rank(&data, "A", DEFAULT_TOP_K);

        assert_eq!(ranking.len(), 1);
        assert!(ranking.contains("B"));
    }

    #[test]
    fn test_missing_fields_are_dropped() {
        let data = TradeDataset::from_records(vec![
            TradeRecord::from_parts(Some("A"), None, Some(10.0)),
            TradeRecord::from_parts(Some("A"), Some("B"), None),
            TradeRecord::from_parts(Some("A"), Some("C"), Some(1.0)),
        ]);

        let ranking = rank(&data, "A", DEFAULT_TOP_K);

        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking.value_of("C"), Some(1.0));
        assert_eq!(ranking.value_of("B"), None);
    }

    #[test]
    fn test_truncates_to_k_sorted_descending() {
        let rows: Vec<(String, f64)> = (0..15).map(|i| (format!("P{i}"), i as f64)).collect();
        let data = TradeDataset::from_records(
            rows.iter()
                .map(|(p, v)| TradeRecord::new("A", p, *v))
                .collect(),
        );

        let ranking = rank(&data, "A", DEFAULT_TOP_K);

        assert_eq!(ranking.len(), DEFAULT_TOP_K);
        assert_eq!(ranking.entries()[0].partner, "P14");
        assert!(ranking
            .entries()
            .windows(2)
            .all(|w| w[0].total_value >= w[1].total_value));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let data = dataset(&[("A", "X", 5.0), ("A", "Y", 7.0), ("A", "Z", 5.0), ("A", "W", 5.0)]);

        let ranking = rank(&data, "A", 3);

        let names: Vec<_> = ranking.iter().map(|e| e.partner.as_str()).collect();
        assert_eq!(names, vec!["Y", "X", "Z"]);
    }

    #[test]
    fn test_unknown_reporter_is_empty() {
        let data = dataset(&[("A", "B", 1.0)]);

        let ranking = rank(&data, "Nowhere", DEFAULT_TOP_K);

        assert!(ranking.is_empty());
        assert_eq!(ranking.max_value(), None);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let data = dataset(&[("A", "B", 3.0), ("A", "C", 3.0), ("A", "D", 9.0)]);

        assert_eq!(rank(&data, "A", 2), rank(&data, "A", 2));
    }

    #[test]
    fn test_normalized_guards_zero_max() {
        let data = dataset(&[("A", "B", 0.0), ("A", "C", 0.0)]);
        let ranking = rank(&data, "A", DEFAULT_TOP_K);

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking.normalized(0.0), 0.0);
    }

    #[test]
    fn test_max_value_of_unordered_ranking() {
        let ranking: PartnerRanking = [("B", 10.0), ("C", 20.0), ("D", 5.0)]
            .into_iter()
            .map(|(partner, value)| PartnerTotal {
                partner: partner.to_string(),
                total_value: value,
            })
            .collect();

        assert_eq!(ranking.max_value(), Some(20.0));
        assert_eq!(ranking.normalized(10.0), 0.5);
        assert_eq!(ranking.normalized(20.0), 1.0);

        let parsed: PartnerRanking = serde_json::from_str(
            r#"[{"partner":"B","totalValue":1.0},{"partner":"C","totalValue":4.0}]"#,
        )
        .unwrap();
        assert_eq!(parsed.max_value(), Some(4.0));
        assert_eq!(parsed.normalized(1.0), 0.25);
    }

    #[test]
    fn test_overflowing_total_is_dropped() {
        let data = dataset(&[("A", "B", 1e308), ("A", "B", 1e308), ("A", "C", 1.0)]);

        let ranking = rank(&data, "A", DEFAULT_TOP_K);

        assert!(!ranking.contains("B"));
        assert_eq!(ranking.max_value(), Some(1.0));
        assert_eq!(ranking.normalized(1.0), 1.0);
    }

    #[test]
    fn test_filtered_subset_matches_ranking() {
        let partners: Vec<String> = (0..12).map(|i| format!("P{i}")).collect();
        let mut rows = vec![("A", "Unspecified", 10.0), ("B", "C", 10.0)];
        for (i, p) in partners.iter().enumerate() {
            rows.push(("A", p.as_str(), i as f64));
        }
        let data = dataset(&rows);

        let ranking = rank(&data, "A", DEFAULT_TOP_K);
        let subset = filtered_subset(&data, "A", &ranking);

        assert_eq!(subset.len(), DEFAULT_TOP_K);
        assert!(subset.iter().all(|r| r.is_reported_by("A")));
        assert!(subset
            .iter()
            .all(|r| ranking.contains(r.partner.as_deref().unwrap())));
    }
}
