use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer};

use crate::{CommentId, DeliveryId, Error, Time, User, UserId};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Vote::Up => "up",
            Vote::Down => "down",
        })
    }
}

impl FromStr for Vote {
    type Err = Error;

    fn from_str(s: &str) -> Result<Vote, Error> {
        match s {
            "up" => Ok(Vote::Up),
            "down" => Ok(Vote::Down),
            _ => Err(Error::Validation(format!("unknown vote direction {s:?}"))),
        }
    }
}

/// A comment as exchanged with the backend
///
/// `replies` may already hold the nested thread, or be empty with the thread
/// encoded only through `parent_id`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<DeliveryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub user: User,
    pub content: String,
    #[serde(with = "crate::time")]
    pub created_at: Time,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub replies: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<Vote>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Comment>, D::Error> {
    Ok(Option::<Vec<Comment>>::deserialize(de)?.unwrap_or_default())
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteRequest {
    pub vote: Vote,
}
