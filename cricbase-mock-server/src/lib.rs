use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use cricbase_api::{
    validate_content, Comment, CommentId, Cursor, DataSource, DeliveryId, DeliveryItem, Error,
    Match, MatchId, MatchStatus, NewComment, PlayerStats, TeamStats, User, UserId, Vote,
};
use parking_lot::Mutex;

mod fixtures;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Everything a `MockServer` serves, in a serializable form
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDump {
    pub viewer: User,
    pub matches: Vec<Match>,

    /// Most recent first within each match
    pub deliveries: Vec<DeliveryItem>,

    /// Flat, each with its `delivery_id` set
    pub comments: Vec<Comment>,

    pub player_stats: Vec<PlayerStats>,
    pub team_stats: Vec<TeamStats>,
}

/// How `fetch_comments` hands out threads
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommentShape {
    /// Roots only, replies nested inside, like the backend
    Nested,
    /// Every comment at the top level, linked through `parent_id`
    Flat,
}

/// In-memory stand-in for the REST backend
pub struct MockServer(Mutex<State>);

#[derive(Debug)]
struct State {
    viewer: User,
    page_size: usize,
    comment_shape: CommentShape,
    matches: Vec<Match>,
    feeds: BTreeMap<MatchId, Vec<DeliveryItem>>,
    comments: Vec<StoredComment>,
    votes: HashMap<(CommentId, UserId), Vote>,
    player_stats: Vec<PlayerStats>,
    team_stats: Vec<TeamStats>,
    failures: usize,
    requests: usize,
}

#[derive(Debug)]
struct StoredComment {
    delivery: DeliveryId,

    /// Counters exclude the votes recorded in `State::votes`
    comment: Comment,
}

impl State {
    fn begin(&mut self) -> Result<(), Error> {
        self.requests += 1;
        if self.failures > 0 {
            self.failures -= 1;
            return Err(Error::Transport(String::from(
                "503 Service Unavailable: injected failure",
            )));
        }
        Ok(())
    }

    fn delivery_mut(&mut self, id: &DeliveryId) -> Option<&mut DeliveryItem> {
        self.feeds.values_mut().flatten().find(|d| d.id == *id)
    }

    fn has_comment(&self, id: &CommentId) -> bool {
        self.comments.iter().any(|c| c.comment.id == *id)
    }

    /// Stored comment with its counters recomputed from the vote table
    fn render(&self, stored: &StoredComment) -> Comment {
        let mut c = stored.comment.clone();
        for ((comment, user), vote) in self.votes.iter() {
            if *comment != c.id {
                continue;
            }
            match vote {
                Vote::Up => c.upvotes += 1,
                Vote::Down => c.downvotes += 1,
            }
            if *user == self.viewer.id {
                c.user_vote = Some(*vote);
            }
        }
        c
    }

    fn thread(&self, delivery: &DeliveryId) -> Vec<Comment> {
        let flat = self
            .comments
            .iter()
            .filter(|c| c.delivery == *delivery)
            .map(|c| self.render(c))
            .collect::<Vec<_>>();
        match self.comment_shape {
            CommentShape::Flat => flat,
            CommentShape::Nested => nest(flat),
        }
    }

    fn fresh_comment_id(&self) -> CommentId {
        let mut n = self.comments.len() + 1;
        loop {
            let id = CommentId(n.to_string());
            if !self.has_comment(&id) {
                return id;
            }
            n += 1;
        }
    }
}

/// Nests replies under their parent, keeping insertion order among siblings
fn nest(flat: Vec<Comment>) -> Vec<Comment> {
    let mut children = HashMap::<CommentId, Vec<Comment>>::new();
    let mut roots = Vec::new();
    for c in flat {
        match c.parent_id.clone() {
            None => roots.push(c),
            Some(p) => children.entry(p).or_default().push(c),
        }
    }
    fn attach(c: &mut Comment, children: &mut HashMap<CommentId, Vec<Comment>>) {
        c.replies = children.remove(&c.id).unwrap_or_default();
        for r in c.replies.iter_mut() {
            attach(r, children);
        }
    }
    for r in roots.iter_mut() {
        attach(r, &mut children);
    }
    roots
}

impl MockServer {
    pub fn new(viewer: User) -> MockServer {
        MockServer(Mutex::new(State {
            viewer,
            page_size: DEFAULT_PAGE_SIZE,
            comment_shape: CommentShape::Nested,
            matches: Vec::new(),
            feeds: BTreeMap::new(),
            comments: Vec::new(),
            votes: HashMap::new(),
            player_stats: Vec::new(),
            team_stats: Vec::new(),
            failures: 0,
            requests: 0,
        }))
    }

    /// Serves the backend's development data
    pub fn with_fixtures() -> MockServer {
        MockServer::from_dump(fixtures::dump())
    }

    pub fn from_dump(dump: MockDump) -> MockServer {
        let res = MockServer::new(dump.viewer);
        for m in dump.matches {
            res.add_match(m);
        }
        let mut feeds = BTreeMap::<MatchId, Vec<DeliveryItem>>::new();
        for d in dump.deliveries {
            feeds.entry(d.match_id.clone()).or_default().push(d);
        }
        for (match_id, items) in feeds {
            res.push_deliveries(&match_id, items);
        }
        for c in dump.comments {
            match c.delivery_id.clone() {
                Some(delivery) => res.add_comment(&delivery, c),
                None => tracing::warn!(comment = %c.id, "skipping dumped comment without delivery"),
            }
        }
        {
            let mut state = res.0.lock();
            state.player_stats = dump.player_stats;
            state.team_stats = dump.team_stats;
        }
        res
    }

    /// Current contents, with the votes folded into the counters
    pub fn dump(&self) -> MockDump {
        let state = self.0.lock();
        MockDump {
            viewer: state.viewer.clone(),
            matches: state.matches.clone(),
            deliveries: state.feeds.values().flatten().cloned().collect(),
            comments: state
                .comments
                .iter()
                .map(|c| Comment {
                    user_vote: None,
                    ..state.render(c)
                })
                .collect(),
            player_stats: state.player_stats.clone(),
            team_stats: state.team_stats.clone(),
        }
    }

    pub fn viewer(&self) -> User {
        self.0.lock().viewer.clone()
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.0.lock().page_size = page_size;
    }

    pub fn set_comment_shape(&self, shape: CommentShape) {
        self.0.lock().comment_shape = shape;
    }

    /// Replaces any match with the same id
    pub fn add_match(&self, m: Match) {
        let mut state = self.0.lock();
        state.matches.retain(|o| o.id != m.id);
        state.matches.push(m);
    }

    /// Appends `items` to the end of the match feed, so they must all be older
    /// than what it already holds
    pub fn push_deliveries(&self, match_id: &MatchId, items: Vec<DeliveryItem>) {
        self.0
            .lock()
            .feeds
            .entry(match_id.clone())
            .or_default()
            .extend(items);
    }

    /// Stores `c` and its nested replies as they are, ids included
    pub fn add_comment(&self, delivery: &DeliveryId, c: Comment) {
        let mut state = self.0.lock();
        let mut stack = vec![(None, c)];
        while let Some((parent, mut c)) = stack.pop() {
            let replies = std::mem::take(&mut c.replies);
            if c.parent_id.is_none() {
                c.parent_id = parent;
            }
            c.delivery_id = Some(delivery.clone());
            stack.extend(replies.into_iter().rev().map(|r| (Some(c.id.clone()), r)));
            state.comments.push(StoredComment {
                delivery: delivery.clone(),
                comment: c,
            });
        }
    }

    /// Makes the next `n` requests fail with a `Transport` error
    pub fn fail_next(&self, n: usize) {
        self.0.lock().failures = n;
    }

    /// Number of `DataSource` calls received so far, failed ones included
    pub fn request_count(&self) -> usize {
        self.0.lock().requests
    }
}

#[async_trait]
impl DataSource for MockServer {
    async fn fetch_feed(&self, limit: usize) -> Result<Vec<DeliveryItem>, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        let mut items = state.feeds.values().flatten().cloned().collect::<Vec<_>>();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items.truncate(limit);
        Ok(items)
    }

    async fn fetch_delivery(&self, id: &DeliveryId) -> Result<DeliveryItem, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        state
            .delivery_mut(id)
            .map(|d| d.clone())
            .ok_or_else(|| Error::NotFound(format!("Delivery {id} not found")))
    }

    async fn fetch_comments(&self, delivery: &DeliveryId) -> Result<Vec<Comment>, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        Ok(state.thread(delivery))
    }

    async fn post_reply(
        &self,
        delivery: &DeliveryId,
        reply: &NewComment,
    ) -> Result<Comment, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        validate_content(&reply.content)?;
        if let Some(parent) = &reply.parent_id {
            let known = state
                .comments
                .iter()
                .any(|c| c.comment.id == *parent && c.delivery == *delivery);
            if !known {
                return Err(Error::NotFound(format!("Parent comment {parent} not found")));
            }
        }
        let comment = Comment {
            id: state.fresh_comment_id(),
            delivery_id: Some(delivery.clone()),
            user_id: Some(state.viewer.id.clone()),
            user: state.viewer.clone(),
            content: reply.content.clone(),
            created_at: Utc::now(),
            upvotes: 0,
            downvotes: 0,
            parent_id: reply.parent_id.clone(),
            replies: Vec::new(),
            user_vote: None,
        };
        state.comments.push(StoredComment {
            delivery: delivery.clone(),
            comment: comment.clone(),
        });
        if let Some(d) = state.delivery_mut(delivery) {
            d.comment_count += 1;
        }
        tracing::debug!(%delivery, comment = %comment.id, "stored reply");
        Ok(comment)
    }

    async fn post_vote(&self, comment: &CommentId, vote: Vote) -> Result<(), Error> {
        let mut state = self.0.lock();
        state.begin()?;
        if !state.has_comment(comment) {
            return Err(Error::NotFound(format!("Comment {comment} not found")));
        }
        let voter = state.viewer.id.clone();
        state.votes.insert((comment.clone(), voter), vote);
        Ok(())
    }

    async fn fetch_delivery_page(
        &self,
        match_id: &MatchId,
        cursor: Option<&Cursor>,
    ) -> Result<Vec<DeliveryItem>, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        let Some(feed) = state.feeds.get(match_id) else {
            return Ok(Vec::new());
        };
        let start = match cursor {
            None => 0,
            Some(cursor) => match feed
                .iter()
                .position(|d| self.cursor_for(&d.id) == *cursor)
            {
                Some(i) => i + 1,
                None => return Ok(Vec::new()),
            },
        };
        Ok(feed
            .iter()
            .skip(start)
            .take(state.page_size)
            .cloned()
            .collect())
    }

    async fn fetch_matches(&self, status: Option<MatchStatus>) -> Result<Vec<Match>, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        Ok(state
            .matches
            .iter()
            .filter(|m| status.map(|s| m.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn fetch_match(&self, id: &MatchId) -> Result<Match, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        state
            .matches
            .iter()
            .find(|m| m.id == *id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Match {id} not found")))
    }

    async fn fetch_player_stats(&self) -> Result<Vec<PlayerStats>, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        Ok(state.player_stats.clone())
    }

    async fn fetch_team_stats(&self) -> Result<Vec<TeamStats>, Error> {
        let mut state = self.0.lock();
        state.begin()?;
        Ok(state.team_stats.clone())
    }
}
