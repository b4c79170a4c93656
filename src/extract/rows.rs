use itertools::Itertools;
use scraper::{CaseSensitivity, ElementRef};
use tracing::debug;

use super::{element_label, stripped_text, CODE_CELL};
use crate::model::Competition;

const HEADER_CLASS: &str = "tablemainheader";
const DETAIL_CLASS: &str = "detail";
const FILTER_ATTR: &str = "filtervalue";

/// What a table row represents.
#[derive(Debug, Clone)]
pub enum RowKind<'a> {
    /// Opens the block of one competition.
    SectionHeader { label: String },
    /// One fixture with its primary odds.
    MatchRow {
        filter_tag: String,
        cells: Vec<ElementRef<'a>>,
    },
    /// Expanded secondary markets of the preceding match row.
    DetailRow { cells: Vec<ElementRef<'a>> },
    /// Spacers and anything else.
    Other,
}

/// Classify a `tr` element by its class markers and filter attribute.
pub fn classify(row: ElementRef) -> RowKind {
    let element = row.value();
    if element.has_class(HEADER_CLASS, CaseSensitivity::CaseSensitive) {
        return RowKind::SectionHeader {
            label: element_label(row),
        };
    }
    if element.has_class(DETAIL_CLASS, CaseSensitivity::CaseSensitive) {
        return RowKind::DetailRow { cells: cells(row) };
    }
    match element.attr(FILTER_ATTR).map(str::trim) {
        Some(filter_tag) if !filter_tag.is_empty() => RowKind::MatchRow {
            filter_tag: filter_tag.to_string(),
            cells: cells(row),
        },
        _ => RowKind::Other,
    }
}

fn cells(row: ElementRef) -> Vec<ElementRef> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == "td")
        .collect_vec()
}

/// A match row inside the target section, with its detail row if one follows.
#[derive(Debug, Clone)]
pub(crate) struct MatchRowRef<'a> {
    pub(crate) cells: Vec<ElementRef<'a>>,
    pub(crate) detail: Option<ElementRef<'a>>,
}

impl MatchRowRef<'_> {
    /// Stripped text of cell `index`, empty when the cell is missing.
    pub(crate) fn text(&self, index: usize) -> String {
        self.cells
            .get(index)
            .map(|cell| stripped_text(*cell))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    InsideTargetSection,
    Ended,
}

/// Whether a match row belongs to the data this competition extracts from.
fn is_eligible(filter_tag: &str, competition: &Competition) -> bool {
    competition
        .row_filter
        .as_deref()
        .is_none_or(|token| filter_tag.contains(token))
}

/// Whether `row` closes the target competition's section: a header of another
/// competition, or an eligible match row carrying a different league code.
pub(crate) fn section_ended(row: &RowKind, competition: &Competition) -> bool {
    match row {
        RowKind::SectionHeader { label } => !label.contains(&competition.label),
        RowKind::MatchRow { filter_tag, cells } => {
            is_eligible(filter_tag, competition)
                && cells
                    .get(CODE_CELL)
                    .map(|cell| stripped_text(*cell))
                    .is_some_and(|code| !code.is_empty() && code != competition.code)
        }
        RowKind::DetailRow { .. } | RowKind::Other => false,
    }
}

/// Collect the eligible match rows that follow `header`, up to the end of its
/// section.
pub(crate) fn walk_section<'a>(
    header: ElementRef<'a>,
    competition: &Competition,
) -> Vec<MatchRowRef<'a>> {
    let rows = header
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|row| row.value().name() == "tr")
        .collect_vec();

    let mut matches = Vec::new();
    let mut state = WalkState::InsideTargetSection;
    for (index, row) in rows.iter().enumerate() {
        let kind = classify(*row);
        if section_ended(&kind, competition) {
            state = WalkState::Ended;
            break;
        }
        if let RowKind::MatchRow { filter_tag, cells } = kind {
            if is_eligible(&filter_tag, competition) {
                matches.push(MatchRowRef {
                    cells,
                    detail: attached_detail(&rows[index + 1..]),
                });
            }
        }
    }
    debug!(?state, matches = matches.len(), "walked competition section");
    matches
}

/// The detail row belonging to the match row just before `following`, if it
/// comes before the next match row or header.
fn attached_detail<'a>(following: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
    for row in following {
        match classify(*row) {
            RowKind::DetailRow { .. } => return Some(*row),
            RowKind::MatchRow { .. } | RowKind::SectionHeader { .. } => return None,
            RowKind::Other => {}
        }
    }
    None
}
