use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};

/// The competition an extraction pass targets.
///
/// `label` locates the section header that opens the competition's block,
/// `code` is the per-row league code every extracted record must carry.
/// `row_filter` optionally narrows data rows to those whose `filtervalue`
/// attribute contains the token (e.g. `"futbol"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Competition {
    pub label: String,
    pub code: String,
    pub row_filter: Option<String>,
}

impl Competition {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
            row_filter: None,
        }
    }

    /// Only accept data rows whose filter attribute contains `token`.
    pub fn with_row_filter(mut self, token: impl Into<String>) -> Self {
        self.row_filter = Some(token.into());
        self
    }
}

/// Competitions with known section labels and league codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum CompetitionPreset {
    SuperLig,
    ConferenceLeague,
}

impl From<CompetitionPreset> for Competition {
    fn from(preset: CompetitionPreset) -> Self {
        match preset {
            CompetitionPreset::SuperLig => Competition::new("Türkiye - Süper Lig", "TÜR S"),
            CompetitionPreset::ConferenceLeague => {
                Competition::new("Konferans Ligi", "AVKL").with_row_filter("futbol")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_preset_names_round_trip() {
        for preset in CompetitionPreset::iter() {
            assert_eq!(
                CompetitionPreset::from_str(&preset.to_string()).unwrap(),
                preset
            );
        }
        assert_eq!(
            CompetitionPreset::from_str("conference-league").unwrap(),
            CompetitionPreset::ConferenceLeague
        );
    }

    #[test]
    fn test_conference_league_filters_football_rows() {
        let competition = Competition::from(CompetitionPreset::ConferenceLeague);
        assert_eq!(competition.code, "AVKL");
        assert_eq!(competition.row_filter.as_deref(), Some("futbol"));

        let competition = Competition::from(CompetitionPreset::SuperLig);
        assert_eq!(competition.row_filter, None);
    }
}
