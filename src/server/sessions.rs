//! Listing page views kept between "load more" requests

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::flow::{ListingPageState, ListingSession};

struct Tracked {
    session: ListingSession,
    last_seen: Instant,
}

/// Open listing page views, by id
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Tracked>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a page view seeded with a first page
    pub async fn create(&self, state: ListingPageState) -> (Uuid, ListingSession) {
        let id = Uuid::new_v4();
        let session = ListingSession::new(state);
        self.sessions.lock().await.insert(
            id,
            Tracked {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        (id, session)
    }

    /// Find a page view and mark it as active
    pub async fn get(&self, id: &Uuid) -> Option<ListingSession> {
        let mut sessions = self.sessions.lock().await;
        let tracked = sessions.get_mut(id)?;
        tracked.last_seen = Instant::now();
        Some(tracked.session.clone())
    }

    /// Discard page views idle for at least `idle`, returning how many were dropped
    pub async fn sweep(&self, idle: Duration) -> usize {
        let expired: Vec<ListingSession> = {
            let mut sessions = self.sessions.lock().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, t)| t.last_seen.elapsed() >= idle)
                .map(|(id, _)| *id)
                .collect();
            ids.iter()
                .filter_map(|id| sessions.remove(id))
                .map(|t| t.session)
                .collect()
        };

        for session in &expired {
            session.discard().await;
        }
        if !expired.is_empty() {
            tracing::debug!("Discarded {} idle listing sessions", expired.len());
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = SessionRegistry::new();
        let (id, _) = registry.create(ListingPageState::default()).await;

        assert!(registry.get(&id).await.is_some());
        assert!(registry.get(&Uuid::new_v4()).await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_discards_idle() {
        let registry = SessionRegistry::new();
        let (id, session) = registry.create(ListingPageState::default()).await;

        assert_eq!(registry.sweep(Duration::from_secs(3600)).await, 0);
        assert!(!session.is_discarded().await);

        assert_eq!(registry.sweep(Duration::ZERO).await, 1);
        assert!(session.is_discarded().await);
        assert!(registry.get(&id).await.is_none());
        assert!(registry.is_empty().await);
    }
}
