//! Debounced lookups.
//!
//! Every request bumps a generation counter and waits out the debounce. Only
//! the latest request sends its query, and a result is published only while
//! its request is still the latest. Requests already in flight run to
//! completion; their results are dropped when stale.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::WorkspaceConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState<Q, R> {
    Idle,
    Pending { query: Q },
    Found { query: Q, result: R },
    NotFound { query: Q },
}

impl<Q, R> LookupState<Q, R> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LookupState::Pending { .. })
    }

    pub fn result(&self) -> Option<&R> {
        match self {
            LookupState::Found { result, .. } => Some(result),
            _ => None,
        }
    }
}

pub struct Lookup<Q, R, F> {
    debounce: Duration,
    fetch: Arc<F>,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<LookupState<Q, R>>>,
}

impl<Q, R, F, Fut, E> Lookup<Q, R, F>
where
    Q: Clone + Debug + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(Q) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    pub fn new(debounce: Duration, fetch: F) -> Self {
        let (state, _) = watch::channel(LookupState::Idle);
        Self {
            debounce,
            fetch: Arc::new(fetch),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    pub fn from_config(config: &WorkspaceConfig, fetch: F) -> Self {
        Self::new(config.lookup_debounce(), fetch)
    }

    /// Schedule a lookup for `query`, superseding every earlier request
    pub fn request(&self, query: Q) -> JoinHandle<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(LookupState::Pending { query: query.clone() });

        let latest = Arc::clone(&self.generation);
        let fetch = Arc::clone(&self.fetch);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                trace!(?query, "Superseded before sending");
                return;
            }

            let outcome = match fetch(query.clone()).await {
                Ok(Some(result)) => LookupState::Found { query, result },
                Ok(None) => LookupState::NotFound { query },
                Err(error) => {
                    warn!(?query, %error, "Lookup failed");
                    LookupState::NotFound { query }
                }
            };

            if latest.load(Ordering::SeqCst) != generation {
                debug!(generation, "Dropping stale lookup result");
                return;
            }
            state.send_replace(outcome);
        })
    }

    pub fn current(&self) -> LookupState<Q, R> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupState<Q, R>> {
        self.state.subscribe()
    }
}
