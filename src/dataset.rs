//! Multi-week collection of match records and its CSV form.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{
    ExtractionBatch, MatchRecord, CORE_COLUMNS, DATE_FORMAT, SECONDARY_FIELDS, TIME_FORMAT,
};

/// Column holding the week a row was fetched for.
pub const WEEK_COLUMN: &str = "Hafta";

const BOM: char = '\u{feff}';
// Alternate formats found in files written by earlier tooling.
const ALT_DATE_FORMAT: &str = "%Y-%m-%d";
const ALT_TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetRow {
    pub week: u32,
    pub record: MatchRecord,
}

/// Records from several weeks, ready to be merged and written as CSV.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a batch, tagging its records with the batch week (0 if untagged).
    pub fn push_batch(&mut self, batch: ExtractionBatch) {
        let week = batch.week.unwrap_or_default();
        self.rows.extend(
            batch
                .records
                .into_iter()
                .map(|record| DatasetRow { week, record }),
        );
    }

    /// Replace every row of the batch's week with the batch's records.
    pub fn replace_week(&mut self, batch: ExtractionBatch) {
        let week = batch.week.unwrap_or_default();
        let before = self.rows.len();
        self.rows.retain(|row| row.week != week);
        debug!(week, dropped = before - self.rows.len(), "replacing week");
        self.push_batch(batch);
    }

    /// Drop rows that repeat an earlier row's kick-off time, teams and
    /// full-time prices. Returns the number of rows removed.
    pub fn dedup(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(dedup_key(&row.record)));
        before - self.rows.len()
    }

    /// Newest kick-off first; rows without a parseable date or time go last.
    pub fn sort_by_kickoff_desc(&mut self) {
        self.rows
            .sort_by_key(|row| Reverse(parse_kickoff(&row.record)));
    }

    /// Serialize as UTF-8 CSV with a byte-order mark.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(header())?;
        for row in &self.rows {
            let week = row.week.to_string();
            let record = &row.record;
            writer.write_record(
                record
                    .core_values()
                    .into_iter()
                    .chain(record.secondary.values())
                    .chain([week.as_str()]),
            )?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        let body = String::from_utf8(bytes)?;
        Ok(format!("{BOM}{body}"))
    }

    /// Read a CSV written by [`Dataset::to_csv`] or by earlier tooling with a
    /// subset of the columns.
    pub fn from_csv(content: &str) -> Result<Self> {
        let content = content.strip_prefix(BOM).unwrap_or(content);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let positions: HashMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let fields = result?;
            let column = |name: &str| {
                positions
                    .get(name)
                    .and_then(|i| fields.get(*i))
                    .map(str::to_string)
            };
            let week = column(WEEK_COLUMN)
                .and_then(|w| w.trim().parse().ok())
                .unwrap_or_default();
            let mut record = MatchRecord::from_columns(column);
            record.date = normalize_date(&record.date);
            record.time = normalize_time(&record.time);
            rows.push(DatasetRow { week, record });
        }

        debug!(rows = rows.len(), "read dataset");
        Ok(Self { rows })
    }
}

/// Column names in output order.
pub fn header() -> Vec<&'static str> {
    CORE_COLUMNS
        .into_iter()
        .chain(SECONDARY_FIELDS.iter().map(|field| field.column))
        .chain([WEEK_COLUMN])
        .collect_vec()
}

fn dedup_key(record: &MatchRecord) -> [String; 6] {
    [
        &record.time,
        &record.home_team,
        &record.away_team,
        &record.full_time_result.home,
        &record.full_time_result.draw,
        &record.full_time_result.away,
    ]
    .map(|value| value.to_string())
}

fn parse_kickoff(record: &MatchRecord) -> Option<(NaiveDate, NaiveTime)> {
    match record.kickoff() {
        (Some(date), Some(time)) => Some((date, time)),
        _ => None,
    }
}

fn normalize_date(value: &str) -> String {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, ALT_DATE_FORMAT))
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|_| value.to_string())
}

fn normalize_time(value: &str) -> String {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, ALT_TIME_FORMAT))
        .map(|time| time.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SecondaryMarkets, ThreeWay, SENTINEL};

    fn record(date: &str, time: &str, home: &str, away: &str, ms1: &str) -> MatchRecord {
        MatchRecord {
            date: date.to_string(),
            time: time.to_string(),
            competition_code: "TÜR S".to_string(),
            market_open_flag: "1".to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            full_time_result: ThreeWay {
                home: ms1.to_string(),
                draw: "3.40".to_string(),
                away: "4.10".to_string(),
            },
            ..Default::default()
        }
    }

    fn batch(week: u32, records: Vec<MatchRecord>) -> ExtractionBatch {
        ExtractionBatch {
            records,
            ..Default::default()
        }
        .with_week(week)
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut dataset = Dataset::default();
        dataset.push_batch(batch(
            1832,
            vec![
                record("18.08.2024", "21:45", "Galatasaray", "Fenerbahçe", "1.90"),
                record("17.08.2024", "19:00", "Beşiktaş", "Trabzonspor", "1.70"),
            ],
        ));
        dataset.push_batch(batch(
            1831,
            vec![
                record("18.08.2024", "21:45", "Galatasaray", "Fenerbahçe", "1.90"),
                record("18.08.2024", "21:45", "Galatasaray", "Fenerbahçe", "1.95"),
            ],
        ));

        assert_eq!(dataset.dedup(), 1);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows[0].week, 1832);
        assert_eq!(dataset.rows[2].record.full_time_result.home, "1.95");
    }

    #[test]
    fn test_replace_week() {
        let mut dataset = Dataset::default();
        dataset.push_batch(batch(1831, vec![record("11.08.2024", "20:00", "A", "B", "2.00")]));
        dataset.push_batch(batch(1832, vec![record("18.08.2024", "20:00", "C", "D", "2.00")]));

        dataset.replace_week(batch(
            1832,
            vec![
                record("18.08.2024", "20:00", "C", "D", "2.10"),
                record("19.08.2024", "20:00", "E", "F", "2.20"),
            ],
        ));

        let weeks = dataset.rows.iter().map(|r| r.week).collect_vec();
        assert_eq!(weeks, [1831, 1832, 1832]);
        assert_eq!(dataset.rows[1].record.full_time_result.home, "2.10");
    }

    #[test]
    fn test_sort_by_kickoff_desc() {
        let mut dataset = Dataset::default();
        dataset.push_batch(batch(
            1832,
            vec![
                record("17.08.2024", "19:00", "A", "B", "1"),
                record("", "", "X", "Y", "1"),
                record("18.08.2024", "16:00", "C", "D", "1"),
                record("18.08.2024", "21:45", "E", "F", "1"),
            ],
        ));
        dataset.sort_by_kickoff_desc();

        let homes = dataset
            .rows
            .iter()
            .map(|r| r.record.home_team.as_str())
            .collect_vec();
        assert_eq!(homes, ["E", "C", "A", "X"]);
    }

    #[test]
    fn test_csv_round_trip() {
        let mut first = record("18.08.2024", "21:45", "Galatasaray", "Fenerbahçe", "1.90");
        first.secondary = SecondaryMarkets::from_fn(|field| format!("{}!", field.label));
        let mut dataset = Dataset::default();
        dataset.push_batch(batch(1832, vec![first]));

        let csv = dataset.to_csv().unwrap();
        assert!(csv.starts_with('\u{feff}'));
        let first_line = csv.lines().next().unwrap().trim_start_matches('\u{feff}');
        assert!(first_line.starts_with("Tarih,Saat,Lig,MBS,Ev Sahibi"));
        assert!(first_line.ends_with("IY/MS 2/2,Hafta"));

        let parsed = Dataset::from_csv(&csv).unwrap();
        assert_eq!(parsed.rows, dataset.rows);
    }

    #[test]
    fn test_from_csv_with_legacy_columns() {
        let content = "\u{feff}Tarih,Saat,Lig,MBS,Ev Sahibi,Skor,Deplasman,MS1,MS0,MS2,Hafta\n\
                       2024-08-18,21:45:00,TÜR S,1,Galatasaray,,Fenerbahçe,1.90,3.40,4.10,1832\n";
        let dataset = Dataset::from_csv(content).unwrap();

        assert_eq!(dataset.len(), 1);
        let row = &dataset.rows[0];
        assert_eq!(row.week, 1832);
        assert_eq!(row.record.date, "18.08.2024");
        assert_eq!(row.record.time, "21:45");
        assert_eq!(row.record.over_under_2_5.over, "");
        assert_eq!(row.record.secondary.odd_even.odd, SENTINEL);
    }

    #[test]
    fn test_header_is_stable() {
        let header = header();
        assert_eq!(header.len(), CORE_COLUMNS.len() + SECONDARY_FIELDS.len() + 1);
        assert_eq!(header.iter().unique().count(), header.len());
    }
}
