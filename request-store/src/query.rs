//! Filter and pagination parameters for record retrieval.
//!
//! Results are always ordered by timestamp, most recent first. Records sharing a timestamp
//! are returned most recently inserted first.

use crate::record::Record;
use std::str::FromStr;

/// Upper bound on the number of records returned by a single query.
pub const MAX_PAGE_SIZE: usize = 100;

/// Conjunction of an inclusive timestamp range and optional exact-match clauses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub start: i64,
    pub end: i64,
    pub domain: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub country: Option<String>,
}

impl Default for Filter {
    fn default() -> Self {
        Filter {
            start: 0,
            end: i64::MAX,
            domain: None,
            method: None,
            path: None,
            country: None,
        }
    }
}

impl Filter {
    pub fn matches(&self, record: &Record) -> bool {
        record.timestamp >= self.start
            && record.timestamp <= self.end
            && self
                .equality_clauses()
                .all(|(column, expected)| record_column(record, column) == expected)
    }

    /// Active equality clauses as `(column, value)` pairs.
    pub fn equality_clauses(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("domain", &self.domain),
            ("method", &self.method),
            ("path", &self.path),
            ("country", &self.country),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
    }
}

fn record_column<'a>(record: &'a Record, column: &str) -> &'a str {
    match column {
        "domain" => &record.domain,
        "method" => &record.method,
        "path" => &record.path,
        "country" => &record.country,
        _ => unreachable!("unknown filter column {column}"),
    }
}

/// Window over the filtered, ordered result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    count: usize,
    offset: usize,
}

impl Page {
    pub fn new(count: usize, offset: usize) -> Self {
        Page {
            count: count.min(MAX_PAGE_SIZE),
            offset,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(MAX_PAGE_SIZE, 0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub filter: Filter,
    pub page: Page,
}

impl QueryParams {
    /// Parses the query string of a retrieval request.
    ///
    /// Numeric parameters that are missing, unparsable or zero fall back to their defaults.
    /// Empty equality filters are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = QueryParams::default();
        let mut count = MAX_PAGE_SIZE;
        let mut offset = 0;

        let pairs = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).collect::<Vec<_>>())
            .unwrap_or_default();

        for (key, value) in pairs {
            let filter = &mut params.filter;
            match &*key {
                "start" => filter.start = parse_or(&value, 0),
                "end" => filter.end = parse_or(&value, i64::MAX),
                "count" => count = parse_or(&value, MAX_PAGE_SIZE),
                "offset" => offset = parse_or(&value, 0),
                "domain" => filter.domain = non_empty(value.into_owned()),
                "method" => filter.method = non_empty(value.into_owned()),
                "path" => filter.path = non_empty(value.into_owned()),
                "country" | "ipcountry" => filter.country = non_empty(value.into_owned()),
                _ => {}
            }
        }

        params.page = Page::new(count, offset);
        params
    }
}

fn parse_or<T>(raw: &str, default: T) -> T
where
    T: FromStr + Default + PartialEq,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => value,
        _ => default,
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Applies a filter and page to records held in insertion order.
pub fn apply(records: Vec<Record>, filter: &Filter, page: &Page) -> Vec<Record> {
    let mut matching: Vec<Record> = records
        .into_iter()
        .rev()
        .filter(|record| filter.matches(record))
        .collect();

    // Stable, so equal timestamps keep the newest-insertion-first order from `rev`.
    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    matching
        .into_iter()
        .skip(page.offset())
        .take(page.count())
        .collect()
}
