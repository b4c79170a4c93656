use serde::Serialize;

use super::MatchRecord;

/// Why an extraction pass produced no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BatchDiagnostic {
    /// The competition's section header is not on the page.
    SectionNotFound,
    /// The section exists but none of its rows were open for betting.
    NoEligibleRows,
}

/// Records extracted from one page, in document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionBatch {
    /// Week identifier supplied by the caller; never read by the extractor.
    pub week: Option<u32>,
    pub records: Vec<MatchRecord>,
    pub diagnostic: Option<BatchDiagnostic>,
}

impl ExtractionBatch {
    pub(crate) fn empty(diagnostic: BatchDiagnostic) -> Self {
        Self {
            week: None,
            records: Vec::new(),
            diagnostic: Some(diagnostic),
        }
    }

    /// Tag the batch with the week it was fetched for.
    pub fn with_week(mut self, week: u32) -> Self {
        self.week = Some(week);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
