//! Serde helpers for backend timestamps
//!
//! The backend writes `datetime.now().isoformat()`, which has no offset. Such
//! values are read as UTC; values with an offset are converted to UTC. Output
//! is always RFC 3339.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::Time;

pub fn parse(s: &str) -> Option<Time> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

pub fn serialize<S: Serializer>(t: &Time, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Time, D::Error> {
    let s = String::deserialize(de)?;
    parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {s:?}")))
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(t: &Option<Time>, ser: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => super::serialize(t, ser),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Time>, D::Error> {
        match Option::<String>::deserialize(de)? {
            None => Ok(None),
            Some(s) => super::parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {s:?}"))),
        }
    }
}
