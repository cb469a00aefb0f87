use async_trait::async_trait;

use crate::{
    Comment, CommentId, Cursor, DeliveryId, DeliveryItem, Error, Match, MatchId, MatchStatus,
    NewComment, PlayerStats, TeamStats, Vote,
};

/// The backend, as seen by the client state managers
///
/// Implementations perform the I/O; the state managers only call into them at
/// their suspension points.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Most recent notable deliveries across all matches
    async fn fetch_feed(&self, limit: usize) -> Result<Vec<DeliveryItem>, Error>;

    async fn fetch_delivery(&self, id: &DeliveryId) -> Result<DeliveryItem, Error>;

    /// Comments of a delivery, either already nested or flat with parent ids
    async fn fetch_comments(&self, delivery: &DeliveryId) -> Result<Vec<Comment>, Error>;

    async fn post_reply(&self, delivery: &DeliveryId, reply: &NewComment)
        -> Result<Comment, Error>;

    /// Authoritative counters are only visible through a later `fetch_comments`
    async fn post_vote(&self, comment: &CommentId, vote: Vote) -> Result<(), Error>;

    /// One page of a match feed, most recent first, resuming strictly after
    /// `cursor`; an empty page means the feed is exhausted
    async fn fetch_delivery_page(
        &self,
        match_id: &MatchId,
        cursor: Option<&Cursor>,
    ) -> Result<Vec<DeliveryItem>, Error>;

    async fn fetch_matches(&self, status: Option<MatchStatus>) -> Result<Vec<Match>, Error>;

    async fn fetch_match(&self, id: &MatchId) -> Result<Match, Error>;

    async fn fetch_player_stats(&self) -> Result<Vec<PlayerStats>, Error>;

    async fn fetch_team_stats(&self) -> Result<Vec<TeamStats>, Error>;

    /// Pagination token to resume after the item with this id
    fn cursor_for(&self, id: &DeliveryId) -> Cursor {
        Cursor::from_item_id(id)
    }
}
