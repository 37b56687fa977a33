//! Listing flow - the post list and its "load more" pagination

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::{ContentClient, Query};
use crate::content::{DisplayPostSummary, Mapper, RawPage};
use crate::error::FetchError;

/// Where a listing page view is in its pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPhase {
    #[default]
    Idle,
    Loading,
    Exhausted,
}

/// The posts shown by one listing page view
///
/// `results` only ever grows, in the order pages arrive. Once `Exhausted`
/// the state never changes again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPageState {
    pub results: Vec<DisplayPostSummary>,
    /// Locator of the next page, if the backend reported one
    pub next_page: Option<String>,
    pub phase: ListingPhase,
    /// Bumped on every accepted load so late answers can be recognized
    #[serde(default)]
    generation: u64,
}

/// A load the state has accepted and is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub locator: String,
    generation: u64,
}

/// A fetched and mapped continuation page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPage {
    pub results: Vec<DisplayPostSummary>,
    pub next_page: Option<String>,
}

/// What a "load more" request did to the page view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// Already loading, exhausted, or nothing to continue from
    Ignored,
    /// Posts appended; more pages remain
    Appended(usize),
    /// Posts appended; that was the last page
    Exhausted(usize),
    /// The fetch failed; the state is back to `Idle` for a retry
    Failed,
    /// The result arrived for a request the state no longer waits on
    Stale,
    /// The page view was discarded while the fetch was in flight
    Discarded,
}

impl ListingPageState {
    /// Seed a page view with its first page
    pub fn new(results: Vec<DisplayPostSummary>, next_page: Option<String>) -> Self {
        Self {
            results,
            next_page: next_page.filter(|l| !l.is_empty()),
            phase: ListingPhase::Idle,
            generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ListingPhase::Loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == ListingPhase::Exhausted
    }

    /// Whether a "load more" request would start a fetch
    pub fn can_load_more(&self) -> bool {
        self.phase == ListingPhase::Idle && self.next_page.is_some()
    }

    /// Accept a "load more" request.
    ///
    /// Returns `None` without touching the state when loading, exhausted or
    /// without a locator.
    pub fn begin_load(&mut self) -> Option<LoadRequest> {
        if !self.can_load_more() {
            return None;
        }
        let locator = self.next_page.clone()?;

        self.phase = ListingPhase::Loading;
        self.generation += 1;

        Some(LoadRequest {
            locator,
            generation: self.generation,
        })
    }

    /// Apply the outcome of an accepted request
    pub fn finish_load(
        &mut self,
        request: &LoadRequest,
        outcome: Result<NextPage, FetchError>,
    ) -> LoadMore {
        if self.phase != ListingPhase::Loading || request.generation != self.generation {
            return LoadMore::Stale;
        }

        match outcome {
            Ok(page) => {
                let appended = page.results.len();
                self.results.extend(page.results);

                match page.next_page.filter(|l| !l.is_empty()) {
                    Some(locator) => {
                        self.next_page = Some(locator);
                        self.phase = ListingPhase::Idle;
                        LoadMore::Appended(appended)
                    }
                    None => {
                        self.next_page = None;
                        self.phase = ListingPhase::Exhausted;
                        LoadMore::Exhausted(appended)
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load more posts from {}: {}", request.locator, e);
                self.phase = ListingPhase::Idle;
                LoadMore::Failed
            }
        }
    }
}

/// Shared handle to the state of one listing page view
///
/// Discarding the view drops its state; results arriving afterwards are thrown away.
#[derive(Debug, Clone)]
pub struct ListingSession {
    slot: Arc<Mutex<Option<ListingPageState>>>,
}

impl ListingSession {
    pub fn new(state: ListingPageState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
        }
    }

    /// Copy of the current state, `None` once discarded
    pub async fn snapshot(&self) -> Option<ListingPageState> {
        self.slot.lock().await.clone()
    }

    /// Drop the page view's state
    pub async fn discard(&self) {
        self.slot.lock().await.take();
    }

    pub async fn is_discarded(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}

/// Drives listing pagination against a content client
pub struct ListingFlow<C> {
    client: Arc<C>,
    mapper: Mapper,
    query: Query,
}

impl<C: ContentClient> ListingFlow<C> {
    /// Create a new listing flow
    pub fn new(client: Arc<C>, mapper: Mapper, query: Query) -> Self {
        Self {
            client,
            mapper,
            query,
        }
    }

    /// Fetch and map the first page into a fresh page view state
    pub async fn first_page(&self) -> Result<ListingPageState, FetchError> {
        let page = self.client.query(&self.query).await?;
        tracing::debug!(
            "First page: {} posts, more: {}",
            page.results.len(),
            page.next_page.is_some()
        );
        Ok(ListingPageState::new(
            self.mapper.summarize(&page.results),
            page.next_page,
        ))
    }

    /// Fetch the page behind a locator
    pub async fn fetch_next_page(&self, locator: &str) -> Result<RawPage, FetchError> {
        self.client.fetch_page(locator).await
    }

    /// Run one "load more" round trip for a page view.
    ///
    /// The session lock is released while the fetch is in flight, so repeated
    /// triggers see `Loading` and are ignored. Failures are logged, never returned.
    pub async fn load_more(&self, session: &ListingSession) -> LoadMore {
        let request = {
            let mut slot = session.slot.lock().await;
            match slot.as_mut() {
                Some(state) => state.begin_load(),
                None => return LoadMore::Discarded,
            }
        };

        let Some(request) = request else {
            return LoadMore::Ignored;
        };

        let outcome = self
            .fetch_next_page(&request.locator)
            .await
            .map(|page| NextPage {
                results: self.mapper.summarize(&page.results),
                next_page: page.next_page,
            });

        let mut slot = session.slot.lock().await;
        match slot.as_mut() {
            Some(state) => state.finish_load(&request, outcome),
            None => {
                tracing::debug!("Dropping page {} for a discarded view", request.locator);
                LoadMore::Discarded
            }
        }
    }
}
