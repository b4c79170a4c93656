use tracing::warn;

use super::cell::{extract_scalar, CellKind};
use super::detail::extract_detail_value;
use super::rows::MatchRowRef;
use super::{
    collapse_whitespace, Selectors, AWAY_CELL, CODE_CELL, DATE_CELL, DOUBLE_CHANCE_CELLS,
    HALF_TIME_CELL, HOME_CELL, MARKET_OPEN_CELL, PRIMARY_CELLS, SCORE_CELL,
};
use crate::model::{DoubleChance, MatchRecord, OverUnder, SecondaryMarkets, ThreeWay, YesNo};

/// Cells up to and including the last primary market.
const MIN_CELLS: usize = PRIMARY_CELLS[PRIMARY_CELLS.len() - 1] + 1;

/// Build the record for one match row, or `None` when the row is too short to
/// hold the primary markets.
pub(crate) fn assemble(selectors: &Selectors, row: &MatchRowRef) -> Option<MatchRecord> {
    if row.cells.len() < MIN_CELLS {
        warn!(cells = row.cells.len(), "skipping truncated match row");
        return None;
    }

    let value = |index: usize, kind: CellKind| {
        row.cells
            .get(index)
            .map(|cell| collapse_whitespace(&extract_scalar(selectors, *cell, kind)))
            .unwrap_or_default()
    };

    let [
        ms1, ms0, ms2, au25_under, au25_over, btts_yes, btts_no, fh05_under, fh05_over, au15_under,
        au15_over,
    ] = PRIMARY_CELLS.map(|index| value(index, CellKind::Price));
    let [dc_1x, dc_12, dc_x2] = DOUBLE_CHANCE_CELLS.map(|index| value(index, CellKind::Price));

    let secondary = match row.detail {
        Some(detail) => SecondaryMarkets::from_fn(|field| {
            collapse_whitespace(&extract_detail_value(detail, field.section, field.label))
        }),
        None => SecondaryMarkets::unoffered(),
    };

    Some(MatchRecord {
        date: value(DATE_CELL, CellKind::Date),
        time: value(DATE_CELL, CellKind::Time),
        competition_code: value(CODE_CELL, CellKind::Text),
        market_open_flag: value(MARKET_OPEN_CELL, CellKind::Text),
        home_team: value(HOME_CELL, CellKind::TeamName),
        score: value(SCORE_CELL, CellKind::Text),
        away_team: value(AWAY_CELL, CellKind::TeamName),
        half_time_score: value(HALF_TIME_CELL, CellKind::Text),
        full_time_result: ThreeWay {
            home: ms1,
            draw: ms0,
            away: ms2,
        },
        over_under_2_5: OverUnder {
            under: au25_under,
            over: au25_over,
        },
        both_teams_score: YesNo {
            yes: btts_yes,
            no: btts_no,
        },
        first_half_over_under_0_5: OverUnder {
            under: fh05_under,
            over: fh05_over,
        },
        over_under_1_5: OverUnder {
            under: au15_under,
            over: au15_over,
        },
        double_chance: DoubleChance {
            home_or_draw: dc_1x,
            home_or_away: dc_12,
            draw_or_away: dc_x2,
        },
        secondary,
    })
}
