use std::{fmt, str::FromStr};

use crate::{Error, MatchId, Time};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Live,
    Upcoming,
    Completed,
}

impl MatchStatus {
    pub fn token(self) -> &'static str {
        match self {
            MatchStatus::Live => "live",
            MatchStatus::Upcoming => "upcoming",
            MatchStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for MatchStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<MatchStatus, Error> {
        match s {
            "live" => Ok(MatchStatus::Live),
            "upcoming" => Ok(MatchStatus::Upcoming),
            "completed" => Ok(MatchStatus::Completed),
            _ => Err(Error::Validation(format!("unknown match status {s:?}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum MatchFormat {
    T20,
    #[serde(rename = "ODI")]
    Odi,
    Test,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct InningsScore {
    pub runs: u32,
    pub wickets: u32,
    /// Overs bowled, balls of the current over after the decimal point
    pub overs: f64,
}

impl fmt::Display for InningsScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({} ov)", self.runs, self.wickets, self.overs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct MatchScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<InningsScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2: Option<InningsScore>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub team1: String,
    pub team2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2_logo: Option<String>,
    #[serde(default)]
    pub venue: String,
    pub status: MatchStatus,
    #[serde(with = "crate::time")]
    pub date: Time,
    pub format: MatchFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<MatchScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_over: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_ball: Option<u32>,
}
