use std::collections::HashSet;

use crate::{
    api::{Cursor, DataSource, DeliveryId, DeliveryItem, Error, FeedFilter, MatchId},
    FilterExt,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadState {
    Idle,
    LoadingInitial,
    LoadingMore,
    Exhausted,
    Error,
}

/// A page fetch the feed committed to; its result goes back through
/// `DeliveryFeed::finish`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub match_id: MatchId,

    /// Last item of the previous page, kept or not; `None` for the first page
    pub after: Option<DeliveryId>,

    generation: u64,
}

impl PageRequest {
    pub fn cursor<S: DataSource + ?Sized>(&self, source: &S) -> Option<Cursor> {
        self.after.as_ref().map(|id| source.cursor_for(id))
    }

    pub async fn fetch<S: DataSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Vec<DeliveryItem>, Error> {
        let cursor = self.cursor(source);
        source
            .fetch_delivery_page(&self.match_id, cursor.as_ref())
            .await
    }
}

/// Paginated, filterable commentary feed of one match
///
/// At most one page request is outstanding at any time. Every `reset` (and
/// `close`) starts a new session, and pages requested by an earlier session
/// are discarded when they come back.
#[derive(Clone, Debug)]
pub struct DeliveryFeed {
    match_id: Option<MatchId>,
    filter: FeedFilter,
    items: Vec<DeliveryItem>,
    ids: HashSet<DeliveryId>,
    resume_after: Option<DeliveryId>,
    has_more: bool,
    state: LoadState,
    generation: u64,
    last_error: Option<Error>,
}

impl Default for DeliveryFeed {
    fn default() -> DeliveryFeed {
        DeliveryFeed::new()
    }
}

impl DeliveryFeed {
    pub fn new() -> DeliveryFeed {
        DeliveryFeed {
            match_id: None,
            filter: FeedFilter::All,
            items: Vec::new(),
            ids: HashSet::new(),
            resume_after: None,
            has_more: false,
            state: LoadState::Idle,
            generation: 0,
            last_error: None,
        }
    }

    pub fn match_id(&self) -> Option<&MatchId> {
        self.match_id.as_ref()
    }

    pub fn filter(&self) -> FeedFilter {
        self.filter
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::LoadingInitial | LoadState::LoadingMore)
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Everything accumulated so far, regardless of the filter
    pub fn items(&self) -> &[DeliveryItem] {
        &self.items
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &DeliveryItem> + '_ {
        let filter = self.filter;
        self.items.iter().filter(move |i| filter.matches(i))
    }

    /// Changes what `visible_items` shows without fetching anything
    pub fn apply_filter(&mut self, filter: FeedFilter) {
        self.filter = filter;
    }

    /// Drops everything accumulated and requests the first page of `match_id`
    pub fn reset(&mut self, match_id: MatchId, filter: FeedFilter) -> PageRequest {
        tracing::info!(%match_id, %filter, "starting match feed session");
        self.generation += 1;
        self.items.clear();
        self.ids.clear();
        self.resume_after = None;
        self.has_more = true;
        self.filter = filter;
        self.match_id = Some(match_id.clone());
        self.state = LoadState::LoadingInitial;
        self.last_error = None;
        PageRequest {
            match_id,
            after: None,
            generation: self.generation,
        }
    }

    /// Requests the page after the last item received
    ///
    /// Returns `None` while another page is in flight, once the feed is
    /// exhausted, or outside of a session. After a failure this retries: with
    /// nothing received yet, that is the first page again.
    ///
    /// Resuming goes by the last item the source sent, even if `append`
    /// dropped it, so a page of unusable items does not stall the feed.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.is_loading() || !self.has_more {
            return None;
        }
        let match_id = self.match_id.clone()?;
        let after = self.resume_after.clone();
        self.state = match after {
            None => LoadState::LoadingInitial,
            Some(_) => LoadState::LoadingMore,
        };
        Some(PageRequest {
            match_id,
            after,
            generation: self.generation,
        })
    }

    /// Feeds the outcome of `request` back, returning how many items were added
    ///
    /// Only an empty page exhausts the feed. A page ending on the item it was
    /// requested after cannot move the cursor forward: it is reported as
    /// `InvalidData` and leaves the feed in the retryable `Error` state.
    pub fn finish(
        &mut self,
        request: PageRequest,
        result: Result<Vec<DeliveryItem>, Error>,
    ) -> Result<usize, Error> {
        if request.generation != self.generation || !self.is_loading() {
            tracing::debug!(match_id = %request.match_id, "discarding page of a stale feed session");
            return Ok(0);
        }
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(match_id = %request.match_id, error = %e, "failed fetching match feed page");
                self.state = LoadState::Error;
                self.last_error = Some(e.clone());
                return Err(e);
            }
        };
        let Some(last) = page.last().map(|i| i.id.clone()) else {
            self.last_error = None;
            self.has_more = false;
            self.state = LoadState::Exhausted;
            return Ok(0);
        };
        if request.after.as_ref() == Some(&last) {
            let e = Error::InvalidData(format!("feed page did not advance past {last}"));
            tracing::warn!(match_id = %request.match_id, error = %e, "discarding stuck match feed page");
            self.state = LoadState::Error;
            self.last_error = Some(e.clone());
            return Err(e);
        }
        self.last_error = None;
        let added = self.append(page);
        self.resume_after = Some(last);
        self.state = LoadState::Idle;
        Ok(added)
    }

    /// Ends the session; pages still in flight will be discarded
    pub fn close(&mut self) {
        self.generation += 1;
        self.match_id = None;
        self.items.clear();
        self.ids.clear();
        self.resume_after = None;
        self.has_more = false;
        self.state = LoadState::Idle;
        self.last_error = None;
    }

    pub async fn refresh<S: DataSource + ?Sized>(
        &mut self,
        source: &S,
        match_id: MatchId,
        filter: FeedFilter,
    ) -> Result<usize, Error> {
        let request = self.reset(match_id, filter);
        let result = request.fetch(source).await;
        self.finish(request, result)
    }

    /// No-op returning `Ok(0)` when `load_more` has nothing to request
    pub async fn fetch_more<S: DataSource + ?Sized>(&mut self, source: &S) -> Result<usize, Error> {
        let Some(request) = self.load_more() else {
            return Ok(0);
        };
        let result = request.fetch(source).await;
        self.finish(request, result)
    }

    fn append(&mut self, page: Vec<DeliveryItem>) -> usize {
        let before = self.items.len();
        for mut item in page {
            if self.match_id.as_ref() != Some(&item.match_id) {
                tracing::warn!(delivery = %item.id, other_match = %item.match_id, "dropping delivery of another match");
                continue;
            }
            if item.settle_wicket_flags() {
                tracing::debug!(delivery = %item.id, "wicket delivery also flagged as a boundary");
            }
            if let Err(e) = item.validate() {
                tracing::warn!(error = %e, "dropping malformed delivery");
                continue;
            }
            if !self.ids.insert(item.id.clone()) {
                tracing::debug!(delivery = %item.id, "dropping duplicate delivery");
                continue;
            }
            self.items.push(item);
        }
        self.items.len() - before
    }
}
