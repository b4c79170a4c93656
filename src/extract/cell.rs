use chrono::NaiveDateTime;
use scraper::{ElementRef, Selector};

use super::{stripped_text, Selectors};
use crate::model::DATE_FORMAT;

const DATE_ATTR: &str = "date";
const TITLE_ATTR: &str = "title";
const SOURCE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a table cell holds, which decides how its value is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CellKind {
    /// An odds price, possibly wrapped in a shown/suspended marker span.
    Price,
    /// A team name rendered in desktop and mobile variants.
    TeamName,
    /// The kick-off date, reformatted to `DD.MM.YYYY`.
    Date,
    /// The kick-off time.
    Time,
    /// Plain cell text.
    Text,
}

/// One way of recovering a value from a cell. A probe yields `None` when its
/// precondition does not hold, handing over to the next probe in the chain.
#[derive(Debug, Clone, Copy)]
enum Probe<'s> {
    /// Text of the first nested element matching the selector.
    Nested(&'s Selector),
    /// Machine-readable date attribute on the first match, reformatted.
    DateAttr(&'s Selector),
    /// Non-empty attribute value on the first match.
    Attr(&'s Selector, &'static str),
    /// The cell's whole text.
    Whole,
}

impl Probe<'_> {
    fn apply(self, cell: ElementRef) -> Option<String> {
        match self {
            Probe::Nested(selector) => cell.select(selector).next().map(stripped_text),
            Probe::DateAttr(selector) => cell
                .select(selector)
                .next()
                .and_then(|e| e.value().attr(DATE_ATTR))
                .and_then(|raw| NaiveDateTime::parse_from_str(raw.trim(), SOURCE_DATE_FORMAT).ok())
                .map(|date| date.format(DATE_FORMAT).to_string()),
            Probe::Attr(selector, attr) => cell
                .select(selector)
                .next()
                .and_then(|e| e.value().attr(attr))
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            Probe::Whole => Some(stripped_text(cell)),
        }
    }
}

impl Selectors {
    fn probes(&self, kind: CellKind) -> Vec<Probe<'_>> {
        match kind {
            CellKind::Price => vec![Probe::Nested(&self.price), Probe::Whole],
            CellKind::TeamName => vec![
                Probe::Nested(&self.desktop_name),
                Probe::Nested(&self.mobile_name),
                Probe::Whole,
            ],
            CellKind::Date => vec![
                Probe::DateAttr(&self.date),
                Probe::Attr(&self.date_icon, TITLE_ATTR),
            ],
            CellKind::Time => vec![Probe::Nested(&self.time)],
            CellKind::Text => vec![Probe::Whole],
        }
    }
}

pub(crate) fn extract_scalar(selectors: &Selectors, cell: ElementRef, kind: CellKind) -> String {
    selectors
        .probes(kind)
        .into_iter()
        .find_map(|probe| probe.apply(cell))
        .unwrap_or_default()
}
