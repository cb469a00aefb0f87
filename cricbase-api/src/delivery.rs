use std::{fmt, str::FromStr};

use crate::{DeliveryId, Error, MatchId, Time};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeliveryKind {
    /// Structured ball-by-ball entry
    Delivery,
    /// Free-form text interleaved with the deliveries
    Commentary,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryItem {
    pub id: DeliveryId,
    pub match_id: MatchId,
    pub over: u32,
    pub ball: u32,
    #[serde(default)]
    pub bowler: String,
    #[serde(default)]
    pub batsman: String,
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub is_wicket: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wicket_type: Option<String>,
    #[serde(default)]
    pub is_four: bool,
    #[serde(default)]
    pub is_six: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "crate::time::option")]
    pub timestamp: Option<Time>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
}

impl DeliveryItem {
    pub fn kind(&self) -> DeliveryKind {
        match self.type_tag.as_deref() {
            Some("commentary") => DeliveryKind::Commentary,
            _ => DeliveryKind::Delivery,
        }
    }

    /// Clears the boundary flag of a wicket delivery that also carries one
    ///
    /// The backend flags dropped catches as wickets, so a dropped catch that
    /// still reaches the rope arrives as both. Returns whether anything changed.
    /// Items flagged as both a four and a six are left for `validate` to reject.
    pub fn settle_wicket_flags(&mut self) -> bool {
        if !self.is_wicket || self.is_four == self.is_six {
            return false;
        }
        self.is_four = false;
        self.is_six = false;
        true
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.is_four && self.is_six {
            return Err(Error::InvalidData(format!(
                "delivery {} is both a four and a six",
                self.id
            )));
        }
        if self.is_wicket && (self.is_four || self.is_six) {
            return Err(Error::InvalidData(format!(
                "delivery {} is both a wicket and a boundary",
                self.id
            )));
        }
        Ok(())
    }
}

/// Opaque pagination token naming the last item already seen
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    /// Second `_`-separated token of the id, or the whole id if it has no separator
    pub fn from_item_id(id: &DeliveryId) -> Cursor {
        match id.as_str().split('_').nth(1) {
            Some(token) => Cursor(String::from(token)),
            None => Cursor(id.0.clone()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-side categories of the match feed
///
/// Only `All`, `Sixes`, `Fours` and `Wickets` have a predicate; the other
/// categories are placeholders that show everything.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedFilter {
    #[default]
    All,
    Sixes,
    Fours,
    Wickets,
    Highlights,
    Overs,
    FirstInning,
    SecondInning,
}

impl FeedFilter {
    pub const ALL: [FeedFilter; 8] = [
        FeedFilter::All,
        FeedFilter::Sixes,
        FeedFilter::Fours,
        FeedFilter::Wickets,
        FeedFilter::Highlights,
        FeedFilter::Overs,
        FeedFilter::FirstInning,
        FeedFilter::SecondInning,
    ];

    pub fn token(self) -> &'static str {
        match self {
            FeedFilter::All => "all",
            FeedFilter::Sixes => "sixes",
            FeedFilter::Fours => "fours",
            FeedFilter::Wickets => "wickets",
            FeedFilter::Highlights => "highlights",
            FeedFilter::Overs => "overs",
            FeedFilter::FirstInning => "firstInning",
            FeedFilter::SecondInning => "secondInning",
        }
    }
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for FeedFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<FeedFilter, Error> {
        FeedFilter::ALL
            .into_iter()
            .find(|f| f.token() == s)
            .ok_or_else(|| Error::Validation(format!("unknown feed filter {s:?}")))
    }
}
