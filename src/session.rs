// src/session.rs
//
// Canonical analysis state.
//
// - Session: owns the taxonomy, the accumulated corpus, the captured header
//            row and the corpus index. Only `ingest`/`analyze`/`reset` mutate
//            the corpus; every view reads it through `SelectionView`.
// - SelectionView: row positions of the records matching the current
//                  element/family selection, borrowed from the session.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::archive::ArchiveSource;
use crate::config::consts::RAW_FIELD_COUNT;
use crate::config::options::Selection;
use crate::diff::{self, DiffReport};
use crate::metadata;
use crate::period::{CorpusIndex, Period};
use crate::progress::Progress;
use crate::record::{Record, RecordBuilder};
use crate::taxonomy::Taxonomy;
use crate::{GraceError, Result};

/// One archive that could not be read during `analyze`.
#[derive(Debug)]
pub struct ArchiveFailure {
    pub archive: String,
    pub error: GraceError,
}

#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub archives: usize,
    pub records: usize,
    pub elements: usize,
    pub failures: Vec<ArchiveFailure>,
}

impl AnalysisSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// An element with the number of distinct periods it was observed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementInfo {
    pub element_ref: String,
    pub periods: usize,
    pub records: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    taxonomy: Taxonomy,
    corpus: Vec<Record>,
    header: Option<Vec<String>>,
    index: CorpusIndex,
    selection: Selection,
    now: Option<NaiveDateTime>,
}

impl Session {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy, ..Self::default() }
    }

    /// Pin the last-resort record timestamp instead of reading the clock.
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy { &self.taxonomy }
    pub fn corpus(&self) -> &[Record] { &self.corpus }
    pub fn index(&self) -> &CorpusIndex { &self.index }
    pub fn selection(&self) -> &Selection { &self.selection }

    /// First 15 header cells of the first accepted data file, as read.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Append one archive's records to the corpus and refresh the index.
    /// Returns the number of records added.
    pub fn ingest(&mut self, source: &dyn ArchiveSource) -> Result<usize> {
        let added = self.ingest_one(source)?;
        self.index = CorpusIndex::build(&self.corpus);
        Ok(added)
    }

    /// Rebuild the corpus from `sources`, in order. A failing archive is
    /// reported in the summary and the batch continues.
    pub fn analyze<S: ArchiveSource>(
        &mut self,
        sources: &[S],
        mut progress: Option<&mut dyn Progress>,
    ) -> AnalysisSummary {
        self.corpus.clear();
        self.index = CorpusIndex::default();
        let mut summary = AnalysisSummary { archives: sources.len(), ..Default::default() };
        if let Some(p) = progress.as_deref_mut() {
            p.begin(sources.len());
        }

        for (i, source) in sources.iter().enumerate() {
            if let Some(p) = progress.as_deref_mut() {
                p.log(&format!("Processing {}/{}: {}", i + 1, sources.len(), source.name()));
            }
            match self.ingest_one(source) {
                Ok(n) => {
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_done(source.name(), n);
                    }
                }
                Err(error) => {
                    warn!(archive = source.name(), %error, "archive skipped");
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_failed(source.name(), &error.to_string());
                    }
                    summary.failures.push(ArchiveFailure { archive: s!(source.name()), error });
                }
            }
        }

        self.index = CorpusIndex::build(&self.corpus);
        summary.records = self.corpus.len();
        summary.elements = self.index.elements().count();
        info!(
            archives = summary.archives,
            records = summary.records,
            elements = summary.elements,
            failed = summary.failures.len(),
            "analysis complete"
        );
        if let Some(p) = progress {
            p.finish();
        }
        summary
    }

    fn ingest_one(&mut self, source: &dyn ArchiveSource) -> Result<usize> {
        let archive = source.read()?;
        let meta = metadata::extract(&archive);
        let mut builder = RecordBuilder::new(&self.taxonomy, &meta, &archive.name);
        if let Some(now) = self.now {
            builder = builder.with_now(now);
        }

        let before = self.corpus.len();
        for file in archive.data_files() {
            let Some(parsed) = builder.build_file(file) else { continue };
            if self.header.is_none() && parsed.header.len() >= RAW_FIELD_COUNT {
                self.header = Some(parsed.header[..RAW_FIELD_COUNT].to_vec());
                debug!(file = %file.name, "column header captured");
            }
            self.corpus.extend(parsed.records);
        }
        let added = self.corpus.len() - before;
        info!(archive = %archive.name, records = added, "archive ingested");
        Ok(added)
    }

    /// Drop corpus, header, index and selection. The taxonomy stays.
    pub fn reset(&mut self) {
        self.corpus.clear();
        self.header = None;
        self.index = CorpusIndex::default();
        self.selection = Selection::default();
    }

    /// Replace the current selection. Empty lists are accepted here and
    /// rejected by the operations that need a selection.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Every known element and every taxonomy family.
    pub fn select_all(&mut self) {
        self.selection = Selection::new(
            self.index.elements().map(String::from).collect(),
            self.taxonomy.family_names(),
        );
    }

    /// Elements seen in the corpus, sorted, with their period counts.
    pub fn elements(&self) -> Vec<ElementInfo> {
        self.index
            .elements()
            .map(|e| ElementInfo {
                element_ref: s!(e),
                periods: self.index.period_count(e),
                records: self.index.periods(e).map_or(0, |p| p.values().map(Vec::len).sum()),
            })
            .collect()
    }

    /// Taxonomy families, `AUTRES` last.
    pub fn families(&self) -> Vec<String> {
        self.taxonomy.family_names()
    }

    /// Oldest-vs-newest diff for the current selection.
    pub fn diff(&self) -> Result<DiffReport> {
        diff::compute(&self.corpus, &self.index, &self.selection)
    }

    /// Records matching the current selection. Fails on an empty selection.
    pub fn view(&self) -> Result<SelectionView<'_>> {
        self.selection.validate()?;
        Ok(SelectionView::new(&self.corpus, &self.selection))
    }

    /// Sorted distinct periods of one element.
    pub fn periods_of(&self, element: &str) -> Result<Vec<Period>> {
        self.index
            .periods(element)
            .map(|p| p.keys().copied().collect())
            .ok_or_else(|| GraceError::UnknownElement(s!(element)))
    }
}

/// Zero-copy filtered view: positions of kept records in the corpus.
#[derive(Clone, Debug)]
pub struct SelectionView<'a> {
    pub row_ix: Vec<usize>,
    corpus: &'a [Record],
    selection: &'a Selection,
}

impl<'a> SelectionView<'a> {
    pub fn new(corpus: &'a [Record], selection: &'a Selection) -> Self {
        let row_ix = corpus
            .iter()
            .enumerate()
            .filter(|(_, r)| selection.has_element(&r.element_ref) && selection.has_family(&r.error_family))
            .map(|(i, _)| i)
            .collect();
        Self { row_ix, corpus, selection }
    }

    pub fn len(&self) -> usize { self.row_ix.len() }
    pub fn is_empty(&self) -> bool { self.row_ix.is_empty() }
    pub fn selection(&self) -> &'a Selection { self.selection }
    pub fn corpus(&self) -> &'a [Record] { self.corpus }

    /// Kept records in corpus order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.row_ix.iter().map(|&i| &self.corpus[i])
    }
}
