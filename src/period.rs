// src/period.rs
//! Calendar-day buckets and the element → period → records index.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::consts::UNKNOWN;
use crate::record::Record;

/// Grouping key derived from a timestamp. Days order chronologically and
/// `Unknown` sorts after every day, matching the `YYYY-MM-DD` / `UNKNOWN`
/// string order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Day(NaiveDate),
    Unknown,
}

impl Period {
    pub fn of(ts: Option<NaiveDateTime>) -> Self {
        ts.map_or(Period::Unknown, |t| Period::Day(t.date()))
    }

    /// `YYYY-MM-DD`, or `UNKNOWN`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// `DD/MM/YYYY`, or `UNKNOWN`.
    pub fn label(&self) -> String {
        match self {
            Period::Day(d) => d.format("%d/%m/%Y").to_string(),
            Period::Unknown => s!(UNKNOWN),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Period::Unknown => f.write_str(UNKNOWN),
        }
    }
}

/// Render a `YYYY-MM-DD` key as `DD/MM/YYYY`. Anything else comes back as is.
pub fn format_period(key: &str) -> String {
    let parts: Vec<&str> = key.split('-').collect();
    match parts.as_slice() {
        [y, m, d] if [y, m, d].iter().all(|p| !p.is_empty()) => join!(*d, "/", *m, "/", *y),
        _ => s!(key),
    }
}

/// Element → period → positions into the corpus, in corpus order.
///
/// Built in one pass and never patched; a new analysis builds a new index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorpusIndex {
    elements: BTreeMap<String, BTreeMap<Period, Vec<usize>>>,
}

/// One end of an element's history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucket<'a> {
    pub period: Period,
    pub records: &'a [usize],
}

impl CorpusIndex {
    pub fn build(corpus: &[Record]) -> Self {
        let mut elements: BTreeMap<String, BTreeMap<Period, Vec<usize>>> = BTreeMap::new();
        for (i, record) in corpus.iter().enumerate() {
            elements
                .entry(record.element_ref.clone())
                .or_default()
                .entry(record.period())
                .or_default()
                .push(i);
        }
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element references, sorted.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(|e| e.as_str())
    }

    pub fn contains(&self, element: &str) -> bool {
        self.elements.contains_key(element)
    }

    pub fn periods(&self, element: &str) -> Option<&BTreeMap<Period, Vec<usize>>> {
        self.elements.get(element)
    }

    pub fn period_count(&self, element: &str) -> usize {
        self.elements.get(element).map_or(0, |p| p.len())
    }

    /// Every record position of one element, in corpus order.
    pub fn records_of(&self, element: &str) -> Vec<usize> {
        let mut all: Vec<usize> = self
            .elements
            .get(element)
            .map(|p| p.values().flatten().copied().collect())
            .unwrap_or_default();
        all.sort_unstable();
        all
    }

    /// Oldest and newest bucket of an element; `None` below two periods.
    pub fn endpoints(&self, element: &str) -> Option<(Bucket<'_>, Bucket<'_>)> {
        let periods = self.elements.get(element)?;
        if periods.len() < 2 {
            return None;
        }
        let (old_p, old_r) = periods.first_key_value()?;
        let (new_p, new_r) = periods.last_key_value()?;
        Some((
            Bucket { period: *old_p, records: old_r },
            Bucket { period: *new_p, records: new_r },
        ))
    }
}
