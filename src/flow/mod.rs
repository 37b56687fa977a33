//! Page flows: the paginated listing and the single-post page

mod detail;
mod listing;

pub use detail::{DetailFlow, DetailState};
pub use listing::{
    ListingFlow, ListingPageState, ListingPhase, ListingSession, LoadMore, LoadRequest, NextPage,
};
