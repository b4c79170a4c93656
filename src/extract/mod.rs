//! Extraction of match records from one page of the betting-program table.
//!
//! The table mixes competition header rows (`tr.tablemainheader`), match rows
//! (carrying a `filtervalue` attribute) and expandable `tr.detail` rows. An
//! [`Extractor`] finds the header of one competition, walks the rows below it
//! until the section ends and assembles a [`MatchRecord`] per open match.
//!
//! Nothing in here fails on unexpected markup: missing cells and labels fall
//! back to empty strings or the `"0"` sentinel, and malformed rows are skipped.

mod assemble;
mod cell;
mod detail;
mod rows;

pub use cell::CellKind;
pub use detail::{extract_detail_value, normalize_sentinel};
pub use rows::{classify, RowKind};

use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::model::{BatchDiagnostic, Competition, ExtractionBatch, MatchRecord};

// Cell positions inside a match row.
pub(crate) const DATE_CELL: usize = 0;
pub(crate) const CODE_CELL: usize = 2;
pub(crate) const MARKET_OPEN_CELL: usize = 3;
pub(crate) const HOME_CELL: usize = 4;
pub(crate) const SCORE_CELL: usize = 5;
pub(crate) const AWAY_CELL: usize = 6;
pub(crate) const HALF_TIME_CELL: usize = 7;
pub(crate) const PRIMARY_CELLS: [usize; 11] = [8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18];
pub(crate) const DOUBLE_CHANCE_CELLS: [usize; 3] = [20, 21, 22];

/// Value of the market-open (MBS) cell for matches open to betting.
pub const MARKET_OPEN: &str = "1";

/// Compiled selectors shared by every extraction pass.
#[derive(Debug)]
pub(crate) struct Selectors {
    pub(crate) price: Selector,
    pub(crate) desktop_name: Selector,
    pub(crate) mobile_name: Selector,
    pub(crate) date: Selector,
    pub(crate) date_icon: Selector,
    pub(crate) time: Selector,
    pub(crate) section_header: Selector,
    pub(crate) week_option: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            price: Selector::parse("span.betwhite, span.betred")?,
            desktop_name: Selector::parse("span.hide-on-mobile")?,
            mobile_name: Selector::parse("span.hide-on-desktop")?,
            date: Selector::parse("span[date]")?,
            date_icon: Selector::parse("i.fa-angle-double-right")?,
            time: Selector::parse("span")?,
            section_header: Selector::parse("tr.tablemainheader")?,
            week_option: Selector::parse("select#iddaa_daterange option")?,
        })
    }
}

/// Turns parsed program pages into [`ExtractionBatch`]es.
///
/// Holds only compiled selectors, so one extractor can be shared across
/// threads that each work on their own document.
#[derive(Debug)]
pub struct Extractor {
    selectors: Selectors,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            selectors: Selectors::new()?,
        })
    }

    /// Extract every open match of `competition` from `document`, in
    /// document order.
    ///
    /// A page without the competition's section yields an empty batch with
    /// [`BatchDiagnostic::SectionNotFound`].
    #[instrument(skip_all, fields(competition = %competition.code))]
    pub fn run(&self, document: &Html, competition: &Competition) -> ExtractionBatch {
        let Some(header) = self.find_section(document, competition) else {
            warn!(label = %competition.label, "competition section not found on page");
            return ExtractionBatch::empty(BatchDiagnostic::SectionNotFound);
        };

        let rows = rows::walk_section(header, competition);
        let records: Vec<MatchRecord> = rows
            .iter()
            .filter(|row| row.text(MARKET_OPEN_CELL) == MARKET_OPEN)
            .filter(|row| row.text(CODE_CELL) == competition.code)
            .filter_map(|row| assemble::assemble(&self.selectors, row))
            .collect_vec();

        debug!(
            rows = rows.len(),
            records = records.len(),
            "extracted competition section"
        );

        if records.is_empty() {
            warn!(label = %competition.label, "no open matches in competition section");
            return ExtractionBatch::empty(BatchDiagnostic::NoEligibleRows);
        }

        ExtractionBatch {
            week: None,
            records,
            diagnostic: None,
        }
    }

    /// Parse `html` and run [`Extractor::run`] over it.
    pub fn run_html(&self, html: &str, competition: &Competition) -> ExtractionBatch {
        let document = Html::parse_document(html);
        self.run(&document, competition)
    }

    /// Recover one scalar from a table cell. Always returns a string,
    /// empty when nothing usable was found.
    pub fn extract_scalar(&self, cell: ElementRef, kind: CellKind) -> String {
        cell::extract_scalar(&self.selectors, cell, kind)
    }

    /// The week currently offered by the program's week selector, taken from
    /// its first option.
    pub fn current_week(&self, document: &Html) -> Option<u32> {
        document
            .select(&self.selectors.week_option)
            .next()
            .and_then(|option| option.value().attr("value"))
            .and_then(|value| value.trim().parse().ok())
    }

    fn find_section<'a>(
        &self,
        document: &'a Html,
        competition: &Competition,
    ) -> Option<ElementRef<'a>> {
        document
            .select(&self.selectors.section_header)
            .find(|header| element_label(*header).contains(&competition.label))
    }
}

/// Concatenate the trimmed text fragments of `element`, skipping empty ones.
pub(crate) fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Full text of `element` with whitespace runs collapsed.
pub(crate) fn element_label(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().join(" ")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{CompetitionPreset, SENTINEL};

    pub(crate) fn super_lig() -> Competition {
        CompetitionPreset::SuperLig.into()
    }

    /// A Süper Lig match row with all 23 cells populated.
    pub(crate) fn match_row(home: &str, away: &str, market_open: &str) -> String {
        let prices: String = (0..11)
            .map(|i| format!(r#"<td><span class="betwhite">{}.{:02}</span></td>"#, 1 + i, i))
            .collect();
        format!(
            r#"<tr filtervalue="sport=futbol">
                <td><span date="2024-08-18 21:45:00">21:45</span><i class="fa-angle-double-right" title="18.08.2024"></i></td>
                <td>x</td>
                <td>TÜR S</td>
                <td>{market_open}</td>
                <td><span class="hide-on-mobile">{home}</span><span class="hide-on-desktop">{short}</span></td>
                <td>2 - 1</td>
                <td><span class="hide-on-mobile">{away}</span></td>
                <td>1 - 0</td>
                {prices}
                <td></td>
                <td><span class="betred">1.10</span></td>
                <td><span class="betwhite">1.20</span></td>
                <td>1.30</td>
            </tr>"#,
            short = home.chars().take(3).collect::<String>(),
        )
    }

    pub(crate) fn detail_row() -> String {
        r#"<tr class="detail"><td colspan="23">
            <div class="market"><div>İlk Yarı Çifte Şans</div>
                <span>1/X</span><br>1.15 <span>1/2</span><br>1.25 <span>0/2</span><br>1.35</div>
            <div class="market"><div>İlk Yarı Sonucu</div>
                <span>1</span><br>- <span>0</span><br>- <span>2</span><br>-</div>
        </td></tr>"#
            .to_string()
    }

    pub(crate) fn page(rows: &[String]) -> String {
        format!(
            r#"<html><body><table><tbody>
                <tr class="tablemainheader"><td colspan="23">İngiltere - Premier Lig</td></tr>
                {}
            </tbody></table></body></html>"#,
            rows.join("\n")
        )
    }

    pub(crate) fn header(label: &str) -> String {
        format!(r#"<tr class="tablemainheader"><td colspan="23">{label}</td></tr>"#)
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Fenerbahçe \n\t A.Ş.  "), "Fenerbahçe A.Ş.");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_full_record() {
        let html = page(&[
            header("Türkiye - Süper Lig"),
            match_row("Galatasaray", "Fenerbahçe", "1"),
            detail_row(),
            header("Almanya - Bundesliga"),
        ]);
        let extractor = Extractor::new().unwrap();
        let batch = extractor.run_html(&html, &super_lig());

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.diagnostic, None);
        let record = &batch.records[0];
        assert_eq!(record.date, "18.08.2024");
        assert_eq!(record.time, "21:45");
        assert_eq!(record.competition_code, "TÜR S");
        assert_eq!(record.market_open_flag, "1");
        assert_eq!(record.home_team, "Galatasaray");
        assert_eq!(record.away_team, "Fenerbahçe");
        assert_eq!(record.score, "2 - 1");
        assert_eq!(record.half_time_score, "1 - 0");
        assert_eq!(record.full_time_result.home, "1.00");
        assert_eq!(record.full_time_result.draw, "2.01");
        assert_eq!(record.full_time_result.away, "3.02");
        assert_eq!(record.over_under_2_5.under, "4.03");
        assert_eq!(record.over_under_2_5.over, "5.04");
        assert_eq!(record.both_teams_score.yes, "6.05");
        assert_eq!(record.both_teams_score.no, "7.06");
        assert_eq!(record.first_half_over_under_0_5.under, "8.07");
        assert_eq!(record.first_half_over_under_0_5.over, "9.08");
        assert_eq!(record.over_under_1_5.under, "10.09");
        assert_eq!(record.over_under_1_5.over, "11.10");
        assert_eq!(record.double_chance.home_or_draw, "1.10");
        assert_eq!(record.double_chance.home_or_away, "1.20");
        assert_eq!(record.double_chance.draw_or_away, "1.30");

        let secondary = &record.secondary;
        assert_eq!(secondary.half_time_double_chance.home_or_draw, "1.15");
        assert_eq!(secondary.half_time_double_chance.home_or_away, "1.25");
        assert_eq!(secondary.half_time_double_chance.draw_or_away, "1.35");
        assert_eq!(secondary.half_time_result.home, SENTINEL);
        assert_eq!(secondary.half_time_result.draw, SENTINEL);
        assert_eq!(secondary.half_time_result.away, SENTINEL);
        assert_eq!(secondary.odd_even.odd, SENTINEL);
    }

    #[test]
    fn test_blank_code_row_is_skipped() {
        let blank = match_row("Beşiktaş", "Trabzonspor", "1")
            .replace("<td>TÜR S</td>", "<td></td>");
        let html = page(&[
            header("Türkiye - Süper Lig"),
            match_row("Galatasaray", "Fenerbahçe", "1"),
            blank,
            match_row("Samsunspor", "Kasımpaşa", "1"),
        ]);
        let batch = Extractor::new().unwrap().run_html(&html, &super_lig());

        let homes = batch.records.iter().map(|r| r.home_team.as_str()).collect_vec();
        assert_eq!(homes, ["Galatasaray", "Samsunspor"]);
    }

    #[test]
    fn test_closed_market_yields_nothing() {
        let html = page(&[
            header("Türkiye - Süper Lig"),
            match_row("Galatasaray", "Fenerbahçe", "0"),
            detail_row(),
        ]);
        let batch = Extractor::new().unwrap().run_html(&html, &super_lig());

        assert!(batch.is_empty());
        assert_eq!(batch.diagnostic, Some(BatchDiagnostic::NoEligibleRows));
    }

    #[test]
    fn test_second_match_without_detail() {
        let html = page(&[
            header("Türkiye - Süper Lig"),
            match_row("Galatasaray", "Fenerbahçe", "1"),
            detail_row(),
            match_row("Beşiktaş", "Trabzonspor", "1"),
        ]);
        let batch = Extractor::new().unwrap().run_html(&html, &super_lig());

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0].home_team, "Galatasaray");
        assert_eq!(batch.records[1].home_team, "Beşiktaş");
        assert!(batch.records[1]
            .secondary
            .values()
            .iter()
            .all(|v| *v == SENTINEL));
    }

    #[test]
    fn test_section_not_found() {
        let html = page(&[
            header("Almanya - Bundesliga"),
            match_row("Galatasaray", "Fenerbahçe", "1"),
        ]);
        let batch = Extractor::new().unwrap().run_html(&html, &super_lig());

        assert!(batch.is_empty());
        assert_eq!(batch.diagnostic, Some(BatchDiagnostic::SectionNotFound));
    }

    #[test]
    fn test_stops_at_next_section() {
        let html = page(&[
            header("Türkiye - Süper Lig"),
            match_row("Galatasaray", "Fenerbahçe", "1"),
            match_row("Beşiktaş", "Trabzonspor", "1"),
            match_row("Samsunspor", "Kasımpaşa", "1"),
            header("Almanya - Bundesliga"),
            match_row("Göztepe", "Alanyaspor", "1"),
        ]);
        let batch = Extractor::new().unwrap().run_html(&html, &super_lig());

        let homes: Vec<&str> = batch.records.iter().map(|r| r.home_team.as_str()).collect();
        assert_eq!(homes, ["Galatasaray", "Beşiktaş", "Samsunspor"]);
    }

    #[test]
    fn test_short_row_does_not_abort_section() {
        let html = page(&[
            header("Türkiye - Süper Lig"),
            r#"<tr filtervalue="sport=futbol"><td>21:00</td><td></td><td>TÜR S</td><td>1</td></tr>"#
                .to_string(),
            match_row("Beşiktaş", "Trabzonspor", "1"),
        ]);
        let batch = Extractor::new().unwrap().run_html(&html, &super_lig());

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].home_team, "Beşiktaş");
    }

    #[test]
    fn test_current_week() {
        let html = r#"<select id="iddaa_daterange">
            <option value="1832">18.08.2024 - 23.08.2024</option>
            <option value="1831">11.08.2024 - 16.08.2024</option>
        </select>"#;
        let extractor = Extractor::new().unwrap();
        assert_eq!(
            extractor.current_week(&Html::parse_document(html)),
            Some(1832)
        );
        assert_eq!(
            extractor.current_week(&Html::parse_document("<p>no weeks</p>")),
            None
        );
    }

    #[test]
    fn test_concurrent_runs() {
        let extractor = Extractor::new().unwrap();
        let competition = super_lig();
        let pages = [
            page(&[header("Türkiye - Süper Lig"), match_row("Galatasaray", "Fenerbahçe", "1")]),
            page(&[header("Türkiye - Süper Lig"), match_row("Beşiktaş", "Trabzonspor", "1")]),
        ];

        let homes: Vec<String> = std::thread::scope(|scope| {
            let handles = pages
                .iter()
                .map(|html| {
                    let extractor = &extractor;
                    let competition = &competition;
                    scope.spawn(move || extractor.run_html(html, competition))
                })
                .collect_vec();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().records[0].home_team.clone())
                .collect()
        });

        assert_eq!(homes, ["Galatasaray", "Beşiktaş"]);
    }
}
