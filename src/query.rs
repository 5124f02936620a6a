// Filtering and name search over the enriched table, plus text rendering of the matches.
use std::fmt::Write as _;

use tracing::debug;

use crate::error::QueryError;
use crate::preprocess::{
    parse_bucket, AgeBucket, Bucket, EnrichedFighter, EnrichedTable, StanceBucket,
    StrikingBucket, TakedownBucket,
};

/// Selection value meaning "no constraint on this dimension".
pub const ALL: &str = "All";

/// Message shown when a filter or search matched nothing.
pub const NO_MATCH_MESSAGE: &str = "No fighters found!";

/// Parses a form selection: `All` means no constraint, anything else must be a label.
pub fn parse_selection<B: Bucket>(s: &str) -> Result<Option<B>, String> {
    if s.trim().eq_ignore_ascii_case(ALL) {
        Ok(None)
    } else {
        parse_bucket(s).map(Some)
    }
}

/// Up to four label constraints, combined with AND. `None` leaves a dimension open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub striking: Option<StrikingBucket>,
    pub takedown: Option<TakedownBucket>,
    pub stance: Option<StanceBucket>,
    pub age: Option<AgeBucket>,
}

impl FilterCriteria {
    pub fn with_striking(mut self, b: StrikingBucket) -> Self {
        self.striking = Some(b);
        self
    }

    pub fn with_takedown(mut self, b: TakedownBucket) -> Self {
        self.takedown = Some(b);
        self
    }

    pub fn with_stance(mut self, b: StanceBucket) -> Self {
        self.stance = Some(b);
        self
    }

    pub fn with_age(mut self, b: AgeBucket) -> Self {
        self.age = Some(b);
        self
    }

    pub fn matches(&self, row: &EnrichedFighter) -> bool {
        self.striking.map_or(true, |b| row.striking == b)
            && self.takedown.map_or(true, |b| row.takedown == b)
            && self.stance.map_or(true, |b| row.stance == b)
            && self.age.map_or(true, |b| row.age == b)
    }
}

/// Rows that satisfied a query, in table order. Empty means no match, which is not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a> {
    pub rows: Vec<&'a EnrichedFighter>,
}

impl<'a> QueryResult<'a> {
    pub fn is_no_match(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

pub fn filter<'a>(table: &'a EnrichedTable, criteria: &FilterCriteria) -> QueryResult<'a> {
    let rows: Vec<&EnrichedFighter> = table.rows().iter().filter(|r| criteria.matches(r)).collect();
    debug!("filter {:?} kept {} of {} rows", criteria, rows.len(), table.len());
    QueryResult { rows }
}

/// Case-insensitive substring match on name or nickname.
pub fn search<'a>(table: &'a EnrichedTable, query: &str) -> Result<QueryResult<'a>, QueryError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(QueryError::EmptyQuery);
    }

    let rows: Vec<&EnrichedFighter> = table
        .rows()
        .iter()
        .filter(|r| {
            r.record.name.to_lowercase().contains(&needle)
                || r.record.nickname.to_lowercase().contains(&needle)
        })
        .collect();
    debug!("search {:?} matched {} rows", needle, rows.len());
    Ok(QueryResult { rows })
}

const COLUMNS: [&str; 6] = [
    "Name",
    "Nickname",
    "Striking Accuracy",
    "Takedown Accuracy",
    "Stance",
    "Age Group",
];

/// Lays the rows out as a fixed-width table, or returns [`NO_MATCH_MESSAGE`].
pub fn render_table(result: &QueryResult<'_>) -> String {
    if result.is_no_match() {
        return NO_MATCH_MESSAGE.to_string();
    }

    let cells: Vec<[String; 6]> = result
        .rows
        .iter()
        .map(|r| {
            [
                r.record.name.clone(),
                r.record.nickname.clone(),
                r.striking.to_string(),
                r.takedown.to_string(),
                r.stance.to_string(),
                r.age.to_string(),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |fields: &[&str]| {
        let padded: Vec<String> = fields
            .iter()
            .zip(widths)
            .map(|(f, w)| format!("{:<w$}", f, w = w))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(&COLUMNS);
    for row in &cells {
        let fields: Vec<&str> = row.iter().map(String::as_str).collect();
        line(&fields);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::FighterRecord;
    use crate::preprocess::enrich_at;

    fn table() -> EnrichedTable {
        enrich_at(
            vec![
                FighterRecord::new("Jon Jones", "Bones", "58", "45", "Orthodox", "1987-07-19"),
                FighterRecord::new("Israel Adesanya", "The Last Stylebender", "49", "12", "Switch", "1989-07-22"),
                FighterRecord::new("Tom Aspinall", "", "66", "100", "Orthodox", "1993-04-11"),
                FighterRecord::new("Ilia Topuria", "El Matador", "46", "61", "Orthodox", "1997-01-21"),
            ],
            2024,
        )
    }

    #[test]
    fn open_criteria_return_everything() {
        let t = table();
        let res = filter(&t, &FilterCriteria::default());
        assert_eq!(res.len(), t.len());
        assert!(res.rows.iter().zip(t.rows()).all(|(a, b)| *a == b));
    }

    #[test]
    fn combined_filter_is_intersection() {
        let t = table();
        let by_striking = filter(&t, &FilterCriteria::default().with_striking(StrikingBucket::Medium));
        let by_stance = filter(&t, &FilterCriteria::default().with_stance(StanceBucket::Orthodox));
        let both = filter(
            &t,
            &FilterCriteria::default()
                .with_stance(StanceBucket::Orthodox)
                .with_striking(StrikingBucket::Medium),
        );

        let expected: Vec<&EnrichedFighter> = by_striking
            .rows
            .iter()
            .copied()
            .filter(|r| by_stance.rows.iter().any(|s| std::ptr::eq(*s, *r)))
            .collect();
        assert_eq!(both.rows, expected);
        let names: Vec<&str> = both.rows.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, ["Jon Jones", "Ilia Topuria"]);
    }

    #[test]
    fn search_checks_name_and_nickname() {
        let t = table();
        assert_eq!(search(&t, "  jones ").unwrap().len(), 1);
        let by_nick = search(&t, "MATADOR").unwrap();
        assert_eq!(by_nick.rows[0].record.name, "Ilia Topuria");
        assert_eq!(search(&t, "a").unwrap().len(), 3);
    }

    #[test]
    fn empty_query_is_an_error_but_no_match_is_not() {
        let t = table();
        assert_eq!(search(&t, "").unwrap_err(), QueryError::EmptyQuery);
        assert_eq!(search(&t, "   ").unwrap_err(), QueryError::EmptyQuery);
        let res = search(&t, "zz-no-such-fighter-zz").unwrap();
        assert!(res.is_no_match());
        assert_eq!(render_table(&res), NO_MATCH_MESSAGE);
    }

    #[test]
    fn selections_accept_all_sentinel() {
        assert_eq!(parse_selection::<AgeBucket>("All"), Ok(None));
        assert_eq!(parse_selection::<AgeBucket>("Old Fighter"), Ok(Some(AgeBucket::Old)));
        assert!(parse_selection::<StanceBucket>("Crouch").is_err());
    }

    #[test]
    fn rendered_table_has_header_and_labels() {
        let t = table();
        let res = search(&t, "aspinall").unwrap();
        let text = render_table(&res);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[1].contains("High Striking Accuracy"));
        assert!(lines[1].contains("High Takedown Accuracy"));
        assert!(lines[1].contains("Old Fighter"));
    }
}
