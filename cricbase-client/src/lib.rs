mod comment;
pub use comment::{Comment, CommentTree, ThreadEntry, VoteState, MAX_REPLY_DEPTH};

mod fallback;
pub use fallback::WithFallback;

mod feed;
pub use feed::{DeliveryFeed, LoadState, PageRequest};

mod filter;
pub use filter::FilterExt;

mod poll;
pub use poll::{LivePoller, LIVE_REFRESH_INTERVAL};

mod sync;

#[cfg(test)]
mod fuzz;

pub mod api {
    pub use cricbase_api::*;
}

pub mod prelude {
    pub use crate::FilterExt;
}
