use std::fmt;

mod comment;
pub use comment::{Comment, NewComment, Vote, VoteRequest};

mod delivery;
pub use delivery::{Cursor, DeliveryItem, DeliveryKind, FeedFilter};

mod error;
pub use error::Error;

mod game;
pub use game::{InningsScore, Match, MatchFormat, MatchScore, MatchStatus};

mod source;
pub use source::DataSource;

mod stats;
pub use stats::{PlayerStats, TeamStats};

pub mod time;

mod user;
pub use user::User;

pub type Time = chrono::DateTime<chrono::Utc>;

macro_rules! string_id {
    ( $name:ident ) => {
        #[derive(
            Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> $name {
                $name(String::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> $name {
                $name(s)
            }
        }
    };
}

string_id!(UserId);
string_id!(CommentId);
string_id!(DeliveryId);
string_id!(MatchId);

/// Rejects strings that are empty once surrounding whitespace is removed
pub fn validate_content(s: &str) -> Result<(), Error> {
    if s.trim().is_empty() {
        return Err(Error::Validation(String::from("content must not be empty")));
    }
    Ok(())
}
