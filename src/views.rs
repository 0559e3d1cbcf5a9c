// src/views.rs
//! Read-only projections of a [`Session`] for tables, charts and exports.
//!
//! Every projection works on the current selection and fails with
//! `EmptySelection` when no element or no family is chosen.
use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::config::consts::RAW_FIELD_COUNT;
use crate::core::sanitize::{clean_cell, column_letters};
use crate::period::{format_period, Period};
use crate::record::Record;
use crate::session::Session;
use crate::Result;

/// Headers plus rows, ready to render or export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableData {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn with(headers: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ncols(&self) -> usize {
        self.headers
            .as_ref()
            .map(|h| h.len())
            .or_else(|| self.rows.first().map(|r| r.len()))
            .unwrap_or(0)
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn into_parts(self) -> (Option<Vec<String>>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }
}

/* ---------------- Raw records ---------------- */

/// The 15 captured header cells (BOM stripped), or `A`..`O` when no data
/// file has been accepted yet.
pub fn raw_headers(session: &Session) -> Vec<String> {
    match session.header() {
        Some(h) if h.len() >= RAW_FIELD_COUNT => {
            h[..RAW_FIELD_COUNT].iter().map(|c| s!(clean_cell(c))).collect()
        }
        _ => column_letters(RAW_FIELD_COUNT),
    }
}

/// Selected records: raw columns, then element, family, export date and archive.
pub fn raw_table(session: &Session) -> Result<TableData> {
    let view = session.view()?;
    let mut headers = raw_headers(session);
    headers.extend(row!["PM", "Famille", "Date Export", "Fichier ZIP"]);

    let rows = view
        .records()
        .map(|r| {
            let mut row = r.raw_fields.to_vec();
            row.push(r.element_ref.clone());
            row.push(r.error_family.clone());
            row.push(r.timestamp.format("%d/%m/%Y").to_string());
            row.push(r.source_archive.clone());
            row
        })
        .collect();
    Ok(TableData::with(Some(headers), rows))
}

/* ---------------- Comparison ---------------- */

pub fn comparison_table(session: &Session) -> Result<TableData> {
    let report = session.diff()?;
    let label = |ts: Option<chrono::NaiveDateTime>, fallback: &str| {
        ts.map_or_else(|| s!(fallback), |t| t.format("%d/%m/%Y").to_string())
    };
    let oldest = label(report.oldest_date, "ancienne date");
    let newest = label(report.newest_date, "récente date");

    let headers = vec![
        s!("DSP"),
        s!("PM"),
        s!("Famille d'erreur"),
        s!("Code d'erreur"),
        s!("Description d'erreur"),
        format!("Nb erreurs ({oldest})"),
        format!("Nb erreurs ({newest})"),
        s!("Amélioration"),
        s!("% d'évolution"),
    ];
    let rows = report
        .rows
        .iter()
        .map(|d| {
            vec![
                d.operator_code.clone(),
                d.element_ref.clone(),
                d.error_family.clone(),
                d.error_code.clone(),
                d.description.clone(),
                d.old_count.to_string(),
                d.new_count.to_string(),
                s!(d.verdict().label()),
                join!(&d.delta_percent, "%"),
            ]
        })
        .collect();
    Ok(TableData::with(Some(headers), rows))
}

/* ---------------- Chart data ---------------- */

/// One row per period (ascending), one column per selected family, plus a total.
pub fn family_period_table(session: &Session) -> Result<TableData> {
    let view = session.view()?;
    let families = &view.selection().families;

    let mut by_period: BTreeMap<Period, Vec<usize>> = BTreeMap::new();
    for r in view.records() {
        let counts = by_period.entry(r.period()).or_insert_with(|| vec![0; families.len()]);
        if let Some(ix) = families.iter().position(|f| *f == r.error_family) {
            counts[ix] += 1;
        }
    }

    let mut headers = row!["Période"];
    headers.extend(families.iter().cloned());
    headers.push(s!("Total"));

    let rows = by_period
        .into_iter()
        .map(|(period, counts)| {
            let total: usize = counts.iter().sum();
            let mut row = vec![period.key()];
            row.extend(counts.iter().map(usize::to_string));
            row.push(total.to_string());
            row
        })
        .collect();
    Ok(TableData::with(Some(headers), rows))
}

/// Total record count of each selected element, all families included.
pub fn element_counts(session: &Session) -> Result<Vec<(String, usize)>> {
    session.selection().validate()?;
    let index = session.index();
    Ok(session
        .selection()
        .elements
        .iter()
        .map(|e| {
            let n = index.periods(e).map_or(0, |p| p.values().map(Vec::len).sum());
            (e.clone(), n)
        })
        .collect())
}

/// Per-family counts over the periods of one element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FamilySeries {
    pub element_ref: String,
    pub periods: Vec<Period>,
    /// `(family, count per period)`, largest total first.
    pub families: Vec<(String, Vec<usize>)>,
}

impl FamilySeries {
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn to_table(&self) -> TableData {
        let mut headers = row!["Famille"];
        headers.extend(self.periods.iter().map(|p| format_period(&p.key())));
        let rows = self
            .families
            .iter()
            .map(|(family, counts)| {
                let mut row = vec![family.clone()];
                row.extend(counts.iter().map(usize::to_string));
                row
            })
            .collect();
        TableData::with(Some(headers), rows)
    }
}

/// Family × period counts for one element over the selected families. Only
/// families with at least one record appear, sorted by total descending.
pub fn family_series(session: &Session, element: &str) -> Result<FamilySeries> {
    session.selection().validate()?;
    session.periods_of(element)?;
    let selection = session.selection();
    let records: Vec<&Record> = session
        .index()
        .records_of(element)
        .into_iter()
        .map(|i| &session.corpus()[i])
        .filter(|r| selection.has_family(&r.error_family))
        .collect();

    let mut periods: Vec<Period> = records.iter().map(|r| r.period()).collect();
    periods.sort();
    periods.dedup();

    let mut tally: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for r in &records {
        let counts = tally.entry(r.error_family.as_str()).or_insert_with(|| vec![0; periods.len()]);
        if let Ok(ix) = periods.binary_search(&r.period()) {
            counts[ix] += 1;
        }
    }
    let mut families: Vec<(String, Vec<usize>)> =
        tally.into_iter().map(|(f, c)| (s!(f), c)).collect();
    families.sort_by_key(|(_, c)| std::cmp::Reverse(c.iter().sum::<usize>()));

    Ok(FamilySeries { element_ref: s!(element), periods, families })
}

/// Optional narrowing inside the current selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub element: Option<String>,
    pub family: Option<String>,
    pub error_code: Option<String>,
}

impl ViewFilter {
    fn keeps(&self, r: &Record) -> bool {
        self.element.as_ref().is_none_or(|e| *e == r.element_ref)
            && self.family.as_ref().is_none_or(|f| *f == r.error_family)
            && self.error_code.as_ref().is_none_or(|c| *c == r.error_code)
    }
}

/// Record count per period (ascending) over the filtered selection.
pub fn evolution_series(session: &Session, filter: &ViewFilter) -> Result<Vec<(Period, usize)>> {
    let view = session.view()?;
    let mut counts: BTreeMap<Period, usize> = BTreeMap::new();
    for r in view.records().filter(|r| filter.keeps(r)) {
        *counts.entry(r.period()).or_default() += 1;
    }
    Ok(counts.into_iter().collect())
}

/// Sorted distinct error codes of the selected elements, optionally narrowed
/// to one element and/or family. The family filter ignores the family
/// selection so a code list can be offered before families are chosen.
pub fn error_codes(session: &Session, filter: &ViewFilter) -> Vec<String> {
    let selection = session.selection();
    let mut codes: Vec<String> = session
        .corpus()
        .iter()
        .filter(|r| selection.has_element(&r.element_ref))
        .filter(|r| filter.keeps(r))
        .map(|r| r.error_code.clone())
        .filter(|c| !c.is_empty())
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

/// Chart sheet as one table: family × period, element totals, then one
/// family series block per selected element that has data.
pub fn charts_table(session: &Session) -> Result<TableData> {
    let by_period = family_period_table(session)?;
    let mut rows = vec![row!["Données pour graphiques - Évolution temporelle par famille"]];
    let (headers, body) = by_period.into_parts();
    rows.extend(headers);
    rows.extend(body);

    rows.push(row![]);
    rows.push(row!["Données pour graphiques - Erreurs par PM"]);
    rows.push(row!["PM", "Nombre d'erreurs"]);
    for (element, n) in element_counts(session)? {
        rows.push(vec![element, n.to_string()]);
    }

    for element in &session.selection().elements {
        let Ok(series) = family_series(session, element) else { continue };
        if series.is_empty() {
            continue;
        }
        rows.push(row![]);
        rows.push(vec![format!("Comparaison erreurs - PM: {element}")]);
        let (headers, body) = series.to_table().into_parts();
        rows.extend(headers);
        rows.extend(body);
    }
    Ok(TableData::with(None, rows))
}
