use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Value recorded for a secondary market that is not offered for a match.
pub const SENTINEL: &str = "0";

/// Output format of [`MatchRecord::date`].
pub const DATE_FORMAT: &str = "%d.%m.%Y";
/// Output format of [`MatchRecord::time`].
pub const TIME_FORMAT: &str = "%H:%M";

/// Column names of the fixed core fields, in output order.
pub const CORE_COLUMNS: [&str; 22] = [
    "Tarih",
    "Saat",
    "Lig",
    "MBS",
    "Ev Sahibi",
    "Skor",
    "Deplasman",
    "İY",
    "MS1",
    "MS0",
    "MS2",
    "AU2.5 Alt",
    "AU2.5 Üst",
    "KG Var",
    "KG Yok",
    "IY0.5 Alt",
    "IY0.5 Üst",
    "AU1.5 Alt",
    "AU1.5 Üst",
    "Çifte Şans 1-X",
    "Çifte Şans 1-2",
    "Çifte Şans X-2",
];

/// Where a secondary market lives in a detail panel, and the column it is
/// published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketField {
    pub column: &'static str,
    /// Text of the panel section header.
    pub section: &'static str,
    /// Text of the value label inside that section.
    pub label: &'static str,
}

const fn field(column: &'static str, section: &'static str, label: &'static str) -> MarketField {
    MarketField {
        column,
        section,
        label,
    }
}

const HT_DOUBLE_CHANCE: &str = "İlk Yarı Çifte Şans";
const HT_RESULT: &str = "İlk Yarı Sonucu";
const SH_RESULT: &str = "İkinci Yarı Sonucu";
const ODD_EVEN: &str = "Tek / Çift";
const HT_FT: &str = "İlk Yarı / Maç Sonucu";

/// Secondary markets in output order.
///
/// The panel labels the half-time "X-2" chance as `0/2`.
pub const SECONDARY_FIELDS: [MarketField; 20] = [
    field("IY Çifte Şans 1-X", HT_DOUBLE_CHANCE, "1/X"),
    field("IY Çifte Şans 1-2", HT_DOUBLE_CHANCE, "1/2"),
    field("IY Çifte Şans X-2", HT_DOUBLE_CHANCE, "0/2"),
    field("IY1", HT_RESULT, "1"),
    field("IY0", HT_RESULT, "0"),
    field("IY2", HT_RESULT, "2"),
    field("2Y1", SH_RESULT, "1"),
    field("2Y0", SH_RESULT, "0"),
    field("2Y2", SH_RESULT, "2"),
    field("Tek", ODD_EVEN, "Tek"),
    field("Çift", ODD_EVEN, "Çift"),
    field("IY/MS 1/1", HT_FT, "1/1"),
    field("IY/MS 1/0", HT_FT, "1/0"),
    field("IY/MS 1/2", HT_FT, "1/2"),
    field("IY/MS 0/1", HT_FT, "0/1"),
    field("IY/MS 0/0", HT_FT, "0/0"),
    field("IY/MS 0/2", HT_FT, "0/2"),
    field("IY/MS 2/1", HT_FT, "2/1"),
    field("IY/MS 2/0", HT_FT, "2/0"),
    field("IY/MS 2/2", HT_FT, "2/2"),
];

/// Home / draw / away prices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeWay {
    pub home: String,
    pub draw: String,
    pub away: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverUnder {
    pub under: String,
    pub over: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YesNo {
    pub yes: String,
    pub no: String,
}

/// 1X / 12 / X2 prices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleChance {
    pub home_or_draw: String,
    pub home_or_away: String,
    pub draw_or_away: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddEven {
    pub odd: String,
    pub even: String,
}

/// Half-time / full-time combination prices, named `<half time>_<full time>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfTimeFullTime {
    pub home_home: String,
    pub home_draw: String,
    pub home_away: String,
    pub draw_home: String,
    pub draw_draw: String,
    pub draw_away: String,
    pub away_home: String,
    pub away_draw: String,
    pub away_away: String,
}

/// Markets recovered from a match's detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryMarkets {
    pub half_time_double_chance: DoubleChance,
    pub half_time_result: ThreeWay,
    pub second_half_result: ThreeWay,
    pub odd_even: OddEven,
    pub half_time_full_time: HalfTimeFullTime,
}

impl SecondaryMarkets {
    /// Build every market by asking `value` for each entry of
    /// [`SECONDARY_FIELDS`], in order.
    pub fn from_fn(mut value: impl FnMut(&MarketField) -> String) -> Self {
        let [
            ht_dc_1x, ht_dc_12, ht_dc_x2, ht_1, ht_0, ht_2, sh_1, sh_0, sh_2, odd, even, hh, hd, ha,
            dh, dd, da, ah, ad, aa,
        ] = SECONDARY_FIELDS.each_ref().map(&mut value);

        Self {
            half_time_double_chance: DoubleChance {
                home_or_draw: ht_dc_1x,
                home_or_away: ht_dc_12,
                draw_or_away: ht_dc_x2,
            },
            half_time_result: ThreeWay {
                home: ht_1,
                draw: ht_0,
                away: ht_2,
            },
            second_half_result: ThreeWay {
                home: sh_1,
                draw: sh_0,
                away: sh_2,
            },
            odd_even: OddEven { odd, even },
            half_time_full_time: HalfTimeFullTime {
                home_home: hh,
                home_draw: hd,
                home_away: ha,
                draw_home: dh,
                draw_draw: dd,
                draw_away: da,
                away_home: ah,
                away_draw: ad,
                away_away: aa,
            },
        }
    }

    /// Every market set to [`SENTINEL`], used when a match has no detail panel.
    pub fn unoffered() -> Self {
        Self::from_fn(|_| SENTINEL.to_string())
    }

    /// Values aligned with [`SECONDARY_FIELDS`].
    pub fn values(&self) -> [&str; 20] {
        let dc = &self.half_time_double_chance;
        let ht = &self.half_time_result;
        let sh = &self.second_half_result;
        let htft = &self.half_time_full_time;
        [
            &dc.home_or_draw,
            &dc.home_or_away,
            &dc.draw_or_away,
            &ht.home,
            &ht.draw,
            &ht.away,
            &sh.home,
            &sh.draw,
            &sh.away,
            &self.odd_even.odd,
            &self.odd_even.even,
            &htft.home_home,
            &htft.home_draw,
            &htft.home_away,
            &htft.draw_home,
            &htft.draw_draw,
            &htft.draw_away,
            &htft.away_home,
            &htft.away_draw,
            &htft.away_away,
        ]
    }
}

impl Default for SecondaryMarkets {
    fn default() -> Self {
        Self::unoffered()
    }
}

/// One match with its primary and secondary odds.
///
/// `date` is `DD.MM.YYYY` and `time` is `HH:MM`; either may be empty when the
/// page did not carry a usable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: String,
    pub time: String,
    pub competition_code: String,
    pub market_open_flag: String,
    pub home_team: String,
    pub score: String,
    pub away_team: String,
    pub half_time_score: String,
    pub full_time_result: ThreeWay,
    pub over_under_2_5: OverUnder,
    pub both_teams_score: YesNo,
    pub first_half_over_under_0_5: OverUnder,
    pub over_under_1_5: OverUnder,
    pub double_chance: DoubleChance,
    pub secondary: SecondaryMarkets,
}

impl MatchRecord {
    /// Rebuild a record from named columns. Missing core columns become
    /// empty strings, missing secondary columns become [`SENTINEL`].
    pub fn from_columns(mut column: impl FnMut(&str) -> Option<String>) -> Self {
        let [
            date, time, competition_code, market_open_flag, home_team, score, away_team,
            half_time_score, ms1, ms0, ms2, au25_under, au25_over, btts_yes, btts_no, fh05_under,
            fh05_over, au15_under, au15_over, dc_1x, dc_12, dc_x2,
        ] = CORE_COLUMNS.map(|name| column(name).unwrap_or_default());
        let secondary = SecondaryMarkets::from_fn(|field| {
            column(field.column).unwrap_or_else(|| SENTINEL.to_string())
        });

        Self {
            date,
            time,
            competition_code,
            market_open_flag,
            home_team,
            score,
            away_team,
            half_time_score,
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
        }
    }

    /// Core values aligned with [`CORE_COLUMNS`].
    pub fn core_values(&self) -> [&str; 22] {
        [
            &self.date,
            &self.time,
            &self.competition_code,
            &self.market_open_flag,
            &self.home_team,
            &self.score,
            &self.away_team,
            &self.half_time_score,
            &self.full_time_result.home,
            &self.full_time_result.draw,
            &self.full_time_result.away,
            &self.over_under_2_5.under,
            &self.over_under_2_5.over,
            &self.both_teams_score.yes,
            &self.both_teams_score.no,
            &self.first_half_over_under_0_5.under,
            &self.first_half_over_under_0_5.over,
            &self.over_under_1_5.under,
            &self.over_under_1_5.over,
            &self.double_chance.home_or_draw,
            &self.double_chance.home_or_away,
            &self.double_chance.draw_or_away,
        ]
    }

    /// Kick-off date and time, when they parse.
    pub fn kickoff(&self) -> (Option<NaiveDate>, Option<NaiveTime>) {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok();
        let time = NaiveTime::parse_from_str(&self.time, TIME_FORMAT).ok();
        (date, time)
    }
}
