// Turns the enriched table into a numeric feature matrix and class targets.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::preprocess::{AgeBucket, Bucket, EnrichedTable, StanceBucket, StrikingBucket};

/// Column names of the feature matrix, in order.
pub const FEATURE_NAMES: [&str; 4] = [
    "significant_striking_accuracy",
    "takedown_accuracy",
    "stance_encoded",
    "age_encoded",
];

/// Integer codes for the labels seen in one encoding pass.
///
/// Codes follow the alphabetical order of the display labels present in the table,
/// so the same table always gets the same codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCodes<B: Bucket + Ord> {
    labels: Vec<B>,
    codes: BTreeMap<B, usize>,
}

impl<B: Bucket + Ord> CategoryCodes<B> {
    pub fn fit<I: IntoIterator<Item = B>>(values: I) -> Self {
        let mut labels: Vec<B> = values.into_iter().collect();
        labels.sort_by_key(|b| b.to_string());
        labels.dedup();
        let codes = labels.iter().enumerate().map(|(i, &b)| (b, i)).collect();
        Self { labels, codes }
    }

    pub fn code(&self, label: B) -> Option<usize> {
        self.codes.get(&label).copied()
    }

    pub fn label(&self, code: usize) -> Option<B> {
        self.labels.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Output of one encoding pass: the data plus the code tables used to build it.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    pub features: Array2<f64>,
    pub targets: Array1<usize>,
    pub stance_codes: CategoryCodes<StanceBucket>,
    pub age_codes: CategoryCodes<AgeBucket>,
    pub target_codes: CategoryCodes<StrikingBucket>,
}

pub fn encode(table: &EnrichedTable) -> Encoding {
    let rows = table.rows();
    let stance_codes = CategoryCodes::fit(rows.iter().map(|r| r.stance));
    let age_codes = CategoryCodes::fit(rows.iter().map(|r| r.age));
    let target_codes = CategoryCodes::fit(rows.iter().map(|r| r.striking));

    let n = rows.len();
    let mut features = Array2::<f64>::zeros((n, FEATURE_NAMES.len()));
    let mut targets = Array1::<usize>::zeros(n);
    for (i, r) in rows.iter().enumerate() {
        // every label was seen while fitting the code tables above
        features[(i, 0)] = r.record.significant_striking_accuracy.unwrap_or_default();
        features[(i, 1)] = r.record.takedown_accuracy.unwrap_or_default();
        features[(i, 2)] = stance_codes.codes[&r.stance] as f64;
        features[(i, 3)] = age_codes.codes[&r.age] as f64;
        targets[i] = target_codes.codes[&r.striking];
    }

    Encoding { features, targets, stance_codes, age_codes, target_codes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::FighterRecord;
    use crate::preprocess::enrich_at;

    fn table() -> EnrichedTable {
        enrich_at(
            vec![
                FighterRecord::new("A", "", "30", "50", "Southpaw", "1990-01-01"),
                FighterRecord::new("B", "", "50", "20", "Orthodox", "2001-01-01"),
                FighterRecord::new("C", "", "70", "", "Southpaw", "-"),
            ],
            2024,
        )
    }

    #[test]
    fn codes_follow_label_order() {
        let enc = encode(&table());
        assert_eq!(enc.stance_codes.len(), 2);
        assert_eq!(enc.stance_codes.code(StanceBucket::Orthodox), Some(0));
        assert_eq!(enc.stance_codes.code(StanceBucket::Southpaw), Some(1));
        assert_eq!(enc.stance_codes.code(StanceBucket::Switch), None);
        // "High ..." < "Low ..." < "Medium ..."
        assert_eq!(enc.target_codes.label(0), Some(StrikingBucket::High));
        assert_eq!(enc.targets.to_vec(), vec![1, 2, 0]);
    }

    #[test]
    fn feature_rows_hold_raw_values_and_codes() {
        let enc = encode(&table());
        assert_eq!(enc.features.dim(), (3, 4));
        assert_eq!(enc.features.row(0).to_vec(), vec![30.0, 50.0, 1.0, 0.0]);
        // missing takedown accuracy encodes as zero
        assert_eq!(enc.features[(2, 1)], 0.0);
        let young = enc.age_codes.code(AgeBucket::Young).unwrap() as f64;
        assert_eq!(enc.features[(1, 3)], young);
    }

    #[test]
    fn encoding_twice_is_identical() {
        let t = table();
        assert_eq!(encode(&t), encode(&t));
    }
}
