use crate::error::RegistryError;
use crate::models::RatingPoll;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory index of every open rating poll, keyed by poll message id.
///
/// Built once at startup and shared via `Arc`. The outer map lock is
/// only held for lookup and insert; each poll carries its own mutex so
/// two events for the same poll never interleave their read-modify-write
/// sequence, while events for different polls run in parallel.
pub struct PollRegistry {
    polls: Mutex<HashMap<String, Arc<Mutex<RatingPoll>>>>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self {
            polls: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new poll with an empty ledger.
    pub async fn open(&self, poll_id: String, item_name: String) -> Result<(), RegistryError> {
        let mut polls = self.polls.lock().await;
        if polls.contains_key(&poll_id) {
            return Err(RegistryError::AlreadyExists(poll_id));
        }
        polls.insert(poll_id, Arc::new(Mutex::new(RatingPoll::new(item_name))));
        Ok(())
    }

    /// Read a snapshot of a poll's current state.
    pub async fn get(&self, poll_id: &str) -> Result<RatingPoll, RegistryError> {
        let handle = self.handle(poll_id).await?;
        let poll = handle.lock().await;
        Ok(poll.clone())
    }

    /// Run `f` with exclusive access to one poll. This is the only
    /// mutation path; the poll stays locked until the returned future
    /// completes, so persistence and re-rendering done inside `f` are
    /// serialized with any other event touching the same poll.
    pub async fn with_poll<F, T>(&self, poll_id: &str, f: F) -> Result<T, RegistryError>
    where
        F: AsyncFnOnce(&mut RatingPoll) -> T,
    {
        let handle = self.handle(poll_id).await?;
        let mut poll = handle.lock().await;
        Ok(f(&mut *poll).await)
    }

    /// Bulk-populate from persisted rows. Startup only, before any
    /// live events are being served.
    pub async fn load_all(&self, rows: Vec<(String, RatingPoll)>) {
        let mut polls = self.polls.lock().await;
        for (poll_id, poll) in rows {
            polls.insert(poll_id, Arc::new(Mutex::new(poll)));
        }
    }

    pub async fn poll_count(&self) -> usize {
        self.polls.lock().await.len()
    }

    async fn handle(&self, poll_id: &str) -> Result<Arc<Mutex<RatingPoll>>, RegistryError> {
        let polls = self.polls.lock().await;
        polls
            .get(poll_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(poll_id.to_string()))
    }
}

impl Default for PollRegistry {
    fn default() -> Self {
        Self::new()
    }
}
