use crate::api::{DeliveryItem, FeedFilter};

pub trait FilterExt {
    fn matches(&self, item: &DeliveryItem) -> bool;
}

impl FilterExt for FeedFilter {
    fn matches(&self, item: &DeliveryItem) -> bool {
        match self {
            FeedFilter::Sixes => item.is_six,
            FeedFilter::Fours => item.is_four,
            FeedFilter::Wickets => item.is_wicket,
            // TODO: give highlights, overs and innings filters a predicate once
            // their product definition exists
            FeedFilter::All
            | FeedFilter::Highlights
            | FeedFilter::Overs
            | FeedFilter::FirstInning
            | FeedFilter::SecondInning => true,
        }
    }
}
