use async_trait::async_trait;

use crate::api::{
    Comment, CommentId, Cursor, DataSource, DeliveryId, DeliveryItem, Error, Match, MatchId,
    MatchStatus, NewComment, PlayerStats, TeamStats, Vote,
};

/// Answers from `fallback` whenever `primary` cannot be reached
///
/// Only `Transport` errors trigger the fallback: a missing delivery or a
/// rejected reply is reported as-is.
#[derive(Clone, Debug)]
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> WithFallback<P, F> {
        WithFallback { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

macro_rules! or_fallback {
    ( $self:ident . $method:ident ( $($arg:expr),* ) ) => {
        match $self.primary.$method($($arg),*).await {
            Err(e) if e.is_transport() => {
                tracing::warn!(
                    error = %e,
                    call = stringify!($method),
                    "primary data source unreachable, answering from fallback"
                );
                $self.fallback.$method($($arg),*).await
            }
            res => res,
        }
    };
}

#[async_trait]
impl<P: DataSource, F: DataSource> DataSource for WithFallback<P, F> {
    async fn fetch_feed(&self, limit: usize) -> Result<Vec<DeliveryItem>, Error> {
        or_fallback!(self.fetch_feed(limit))
    }

    async fn fetch_delivery(&self, id: &DeliveryId) -> Result<DeliveryItem, Error> {
        or_fallback!(self.fetch_delivery(id))
    }

    async fn fetch_comments(&self, delivery: &DeliveryId) -> Result<Vec<Comment>, Error> {
        or_fallback!(self.fetch_comments(delivery))
    }

    async fn post_reply(
        &self,
        delivery: &DeliveryId,
        reply: &NewComment,
    ) -> Result<Comment, Error> {
        or_fallback!(self.post_reply(delivery, reply))
    }

    async fn post_vote(&self, comment: &CommentId, vote: Vote) -> Result<(), Error> {
        or_fallback!(self.post_vote(comment, vote))
    }

    async fn fetch_delivery_page(
        &self,
        match_id: &MatchId,
        cursor: Option<&Cursor>,
    ) -> Result<Vec<DeliveryItem>, Error> {
        or_fallback!(self.fetch_delivery_page(match_id, cursor))
    }

    async fn fetch_matches(&self, status: Option<MatchStatus>) -> Result<Vec<Match>, Error> {
        or_fallback!(self.fetch_matches(status))
    }

    async fn fetch_match(&self, id: &MatchId) -> Result<Match, Error> {
        or_fallback!(self.fetch_match(id))
    }

    async fn fetch_player_stats(&self) -> Result<Vec<PlayerStats>, Error> {
        or_fallback!(self.fetch_player_stats())
    }

    async fn fetch_team_stats(&self) -> Result<Vec<TeamStats>, Error> {
        or_fallback!(self.fetch_team_stats())
    }

    fn cursor_for(&self, id: &DeliveryId) -> Cursor {
        self.primary.cursor_for(id)
    }
}
