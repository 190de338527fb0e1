//! Single-flight coordination of upstream fetches.
//!
//! The first caller for a key becomes the leader and runs the fetch.
//! Callers arriving while it is in flight subscribe to the leader's result
//! instead of issuing their own request.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use x402_core::error::{Result, X402Error};

/// Result shared between the leader and its followers.
pub type SharedResult<T> = std::result::Result<T, Arc<X402Error>>;

type InflightSender<T> = Arc<watch::Sender<Option<SharedResult<T>>>>;

enum Role<T> {
    Leader(InflightSender<T>),
    Follower(watch::Receiver<Option<SharedResult<T>>>),
}

/// Removes the leader's entry if the leader future is dropped mid-fetch.
struct LeaderGuard<T> {
    inflight: Arc<DashMap<String, InflightSender<T>>>,
    key: String,
    tx: InflightSender<T>,
}

impl<T> Drop for LeaderGuard<T> {
    fn drop(&mut self) {
        self.inflight
            .remove_if(&self.key, |_, tx| Arc::ptr_eq(tx, &self.tx));
    }
}

/// At most one in-flight fetch per key.
pub struct SingleFlight<T> {
    inflight: Arc<DashMap<String, InflightSender<T>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            inflight: Arc::new(DashMap::new()),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a coordinator with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with a fetch in flight.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    /// Runs `fetch` for `key`, or waits for the fetch already running.
    ///
    /// If the leader is cancelled before finishing, followers fall back to
    /// running `fetch` themselves.
    pub async fn run<F, Fut>(&self, key: &str, fetch: F) -> SharedResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.register_or_join(key) {
            Role::Leader(tx) => self.lead(key, tx, fetch).await,
            Role::Follower(rx) => {
                debug!(key, "Joining in-flight fetch");
                match Self::follow(rx).await {
                    Some(result) => result,
                    None => {
                        debug!(key, "In-flight leader went away, fetching directly");
                        fetch().await.map_err(Arc::new)
                    }
                }
            }
        }
    }

    fn register_or_join(&self, key: &str) -> Role<T> {
        match self.inflight.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(e) => Role::Follower(e.get().subscribe()),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                let (tx, _rx) = watch::channel(None);
                let tx = Arc::new(tx);
                e.insert(Arc::clone(&tx));
                Role::Leader(tx)
            }
        }
    }

    async fn lead<F, Fut>(&self, key: &str, tx: InflightSender<T>, fetch: F) -> SharedResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let guard = LeaderGuard {
            inflight: Arc::clone(&self.inflight),
            key: key.to_string(),
            tx: Arc::clone(&tx),
        };

        let result = fetch().await.map_err(Arc::new);

        self.inflight.remove_if(key, |_, current| Arc::ptr_eq(current, &tx));
        tx.send_replace(Some(result.clone()));

        drop(guard);
        result
    }

    async fn follow(mut rx: watch::Receiver<Option<SharedResult<T>>>) -> Option<SharedResult<T>> {
        loop {
            if let Some(result) = rx.borrow_and_update().clone() {
                return Some(result);
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }
}
