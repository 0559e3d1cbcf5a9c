// src/diff.rs
//! Oldest-vs-newest comparison per element.
//!
//! Only the two endpoint periods of an element are compared; intermediate
//! periods feed the trend views, never the diff.
use chrono::NaiveDateTime;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::config::options::Selection;
use crate::period::{Bucket, CorpusIndex};
use crate::record::Record;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Degradation,
    Improvement,
    Stable,
}

impl Verdict {
    pub fn of(delta: i64) -> Self {
        match delta.signum() {
            1 => Verdict::Degradation,
            -1 => Verdict::Improvement,
            _ => Verdict::Stable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Degradation => "DÉGRADATION",
            Verdict::Improvement => "AMÉLIORATION",
            Verdict::Stable => "STABLE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffRow {
    pub element_ref: String,
    pub operator_code: String,
    pub error_family: String,
    pub error_code: String,
    pub description: String,
    pub old_count: i64,
    pub new_count: i64,
    pub delta: i64,
    pub delta_percent: String,
}

impl DiffRow {
    pub fn verdict(&self) -> Verdict {
        Verdict::of(self.delta)
    }
}

/// Diff rows plus the endpoint timestamps used for column labels: the first
/// record of each endpoint of the first element that had two periods.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub rows: Vec<DiffRow>,
    pub oldest_date: Option<NaiveDateTime>,
    pub newest_date: Option<NaiveDateTime>,
}

/// Compare every selected element's oldest and newest period, over the
/// selected families. Elements with fewer than two periods are skipped.
pub fn compute(corpus: &[Record], index: &CorpusIndex, selection: &Selection) -> Result<DiffReport> {
    selection.validate()?;
    let mut report = DiffReport::default();

    let elements: IndexSet<&str> = selection.elements.iter().map(String::as_str).collect();
    for element in elements {
        let Some((oldest, newest)) = index.endpoints(element) else {
            debug!(element = %element, periods = index.period_count(element), "not enough periods to compare");
            continue;
        };
        if report.oldest_date.is_none() {
            report.oldest_date = oldest.records.first().map(|&i| corpus[i].timestamp);
        }
        if report.newest_date.is_none() {
            report.newest_date = newest.records.first().map(|&i| corpus[i].timestamp);
        }

        let before = report.rows.len();
        report.rows.extend(element_rows(corpus, element, oldest, newest, selection));
        debug!(
            element = %element,
            oldest = %oldest.period,
            newest = %newest.period,
            rows = report.rows.len() - before,
            "element compared"
        );
    }
    debug!(rows = report.rows.len(), "diff computed");
    Ok(report)
}

struct Tally<'a> {
    first: &'a Record,
    old: i64,
    new: i64,
}

fn element_rows(
    corpus: &[Record],
    element: &str,
    oldest: Bucket<'_>,
    newest: Bucket<'_>,
    selection: &Selection,
) -> Vec<DiffRow> {
    // (family, code) in first-seen order: oldest bucket, then newest.
    let mut tallies: IndexMap<(&str, &str), Tally<'_>> = IndexMap::new();
    let sides = [(oldest.records, true), (newest.records, false)];
    for (positions, is_old) in sides {
        for &i in positions {
            let record = &corpus[i];
            if !selection.has_family(&record.error_family) {
                continue;
            }
            let tally = tallies
                .entry((record.error_family.as_str(), record.error_code.as_str()))
                .or_insert(Tally { first: record, old: 0, new: 0 });
            if is_old { tally.old += 1 } else { tally.new += 1 }
        }
    }

    tallies
        .into_values()
        .map(|t| {
            let delta = t.new - t.old;
            DiffRow {
                element_ref: s!(element),
                operator_code: t.first.operator_code.clone(),
                error_family: t.first.error_family.clone(),
                error_code: t.first.error_code.clone(),
                description: s!(t.first.description()),
                old_count: t.old,
                new_count: t.new,
                delta,
                delta_percent: delta_percent(t.old, t.new),
            }
        })
        .collect()
}

/// Relative change with one decimal, as `((delta / old) * 100)` on `f64`.
/// No baseline: `"100"` when something appeared, `"0"` otherwise.
pub fn delta_percent(old: i64, new: i64) -> String {
    if old <= 0 {
        return s!(if new > 0 { "100" } else { "0" });
    }
    let ratio = (new - old) as f64 / old as f64;
    fixed1(ratio * 100.0)
}

/// One decimal, nearest to the exact binary value; exact ties go to the
/// larger magnitude.
fn fixed1(x: f64) -> String {
    let sign = if x < 0.0 { "-" } else { "" };
    let mag = x.abs();
    // Only odd quarters (.25, .75) sit exactly on a tie.
    if (mag * 4.0).fract() == 0.0 && (mag * 2.0).fract() != 0.0 {
        let tenths = (mag * 10.0 + 0.5).floor() as u64;
        return format!("{sign}{}.{}", tenths / 10, tenths % 10);
    }
    format!("{sign}{mag:.1}")
}
