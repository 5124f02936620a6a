// Derives the categorical groupings for every fighter and builds the enriched table.
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local};
use tracing::debug;

use crate::io::FighterRecord;

/// Birth year assumed whenever the date of birth cannot be read.
pub const DEFAULT_BIRTH_YEAR: i32 = 2000;
/// Fighters younger than this are grouped as young.
pub const YOUNG_AGE_LIMIT: i32 = 30;

const LOW_LIMIT: f64 = 40.0;
const HIGH_LIMIT: f64 = 60.0;

/// A closed set of labels with a long display form and a short command line form.
pub trait Bucket: Copy + Eq + fmt::Display + 'static {
    const ALL: &'static [Self];

    fn short_name(&self) -> &'static str;
}

/// Accepts the display label exactly, or the short name in any case.
pub fn parse_bucket<B: Bucket>(s: &str) -> Result<B, String> {
    let s = s.trim();
    B::ALL
        .iter()
        .copied()
        .find(|b| b.to_string() == s || b.short_name().eq_ignore_ascii_case(s))
        .ok_or_else(|| {
            let names: Vec<String> = B::ALL.iter().map(|b| b.to_string()).collect();
            format!("unknown label `{}`, expected one of: {}", s, names.join(", "))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrikingBucket { Low, Medium, High }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TakedownBucket { Low, Medium, High }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StanceBucket { Orthodox, Southpaw, Switch, Other }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBucket { Young, Old }

impl Bucket for StrikingBucket {
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High];

    fn short_name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl Bucket for TakedownBucket {
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High];

    fn short_name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl Bucket for StanceBucket {
    const ALL: &'static [Self] = &[Self::Orthodox, Self::Southpaw, Self::Switch, Self::Other];

    fn short_name(&self) -> &'static str {
        match self {
            Self::Orthodox => "Orthodox",
            Self::Southpaw => "Southpaw",
            Self::Switch => "Switch",
            Self::Other => "Other",
        }
    }
}

impl Bucket for AgeBucket {
    const ALL: &'static [Self] = &[Self::Young, Self::Old];

    fn short_name(&self) -> &'static str {
        match self {
            Self::Young => "Young",
            Self::Old => "Old",
        }
    }
}

impl fmt::Display for StrikingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Striking Accuracy", self.short_name())
    }
}

impl fmt::Display for TakedownBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Takedown Accuracy", self.short_name())
    }
}

impl fmt::Display for StanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other => f.write_str("Other Stance"),
            known => f.write_str(known.short_name()),
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Fighter", self.short_name())
    }
}

impl FromStr for StrikingBucket {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_bucket(s) }
}

impl FromStr for TakedownBucket {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_bucket(s) }
}

impl FromStr for StanceBucket {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_bucket(s) }
}

impl FromStr for AgeBucket {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_bucket(s) }
}

/// 0 = low, 1 = medium, 2 = high. Both ends of 40..=60 are medium; NaN counts as low.
fn accuracy_tier(value: f64) -> u8 {
    if value.is_nan() || value < LOW_LIMIT {
        0
    } else if value <= HIGH_LIMIT {
        1
    } else {
        2
    }
}

pub fn striking_bucket(value: f64) -> StrikingBucket {
    match accuracy_tier(value) {
        0 => StrikingBucket::Low,
        1 => StrikingBucket::Medium,
        _ => StrikingBucket::High,
    }
}

pub fn takedown_bucket(value: f64) -> TakedownBucket {
    match accuracy_tier(value) {
        0 => TakedownBucket::Low,
        1 => TakedownBucket::Medium,
        _ => TakedownBucket::High,
    }
}

/// Exact, case-sensitive match against the three known stances.
pub fn stance_bucket(value: &str) -> StanceBucket {
    match value {
        "Orthodox" => StanceBucket::Orthodox,
        "Southpaw" => StanceBucket::Southpaw,
        "Switch" => StanceBucket::Switch,
        _ => StanceBucket::Other,
    }
}

/// Year before the first `-`, or [`DEFAULT_BIRTH_YEAR`] when there is none or it does not parse.
pub fn birth_year(dob: &str) -> i32 {
    dob.split_once('-')
        .and_then(|(year, _)| year.trim().parse::<i32>().ok())
        .unwrap_or(DEFAULT_BIRTH_YEAR)
}

/// Age group relative to `current_year`. Never fails.
pub fn age_bucket_at(dob: &str, current_year: i32) -> AgeBucket {
    let age = current_year - birth_year(dob);
    if age < YOUNG_AGE_LIMIT {
        AgeBucket::Young
    } else {
        AgeBucket::Old
    }
}

/// Age group relative to the current local calendar year.
pub fn age_bucket(dob: &str) -> AgeBucket {
    age_bucket_at(dob, Local::now().year())
}

/// A fighter row with its four derived labels.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedFighter {
    pub record: FighterRecord,
    pub striking: StrikingBucket,
    pub takedown: TakedownBucket,
    pub stance: StanceBucket,
    pub age: AgeBucket,
}

/// The enriched dataset. Built once and only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTable {
    rows: Vec<EnrichedFighter>,
}

impl EnrichedTable {
    pub fn rows(&self) -> &[EnrichedFighter] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Labels every record using the current calendar year for ages.
pub fn enrich(records: Vec<FighterRecord>) -> EnrichedTable {
    enrich_at(records, Local::now().year())
}

/// Labels every record; no row is ever dropped.
pub fn enrich_at(records: Vec<FighterRecord>, current_year: i32) -> EnrichedTable {
    let rows: Vec<EnrichedFighter> = records
        .into_iter()
        .map(|record| {
            EnrichedFighter {
                striking: striking_bucket(record.significant_striking_accuracy.unwrap_or_default()),
                takedown: takedown_bucket(record.takedown_accuracy.unwrap_or_default()),
                stance: stance_bucket(&record.stance),
                age: age_bucket_at(&record.date_of_birth, current_year),
                record,
            }
        })
        .collect();

    debug!("enriched {} rows", rows.len());
    EnrichedTable { rows }
}
