// ── Data-access feeds ──
//
// One state machine per resource: idle -> loading -> {success, error},
// re-entering loading on every filter change or manual refetch. State
// snapshots are published through watch channels; consumers either read
// the current snapshot or subscribe.
//
// Overlapping fetches are resolved with a per-feed sequence number:
// only the latest-dispatched request may apply its result, so rapid
// refiltering converges deterministically. Failed fetches keep the
// previous data (stale-on-error).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use pulsely_api::ApiClient;
use pulsely_api::filters::{HeartRateFilters, WorkoutFilters};
use pulsely_api::types::{
    HeartRateMeta, HeartRateSample, HeartRateSummary, Workout, WorkoutMeta,
};

use crate::error::CoreError;
use crate::session::Session;

/// A feed's published snapshot.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FeedState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

// ── Shared state machine ─────────────────────────────────────────────

struct FeedCore<T> {
    state: watch::Sender<FeedState<T>>,
    /// Monotone fetch counter; a response is applied only if it carries
    /// the latest issued value.
    seq: AtomicU64,
}

impl<T: Clone + Default> FeedCore<T> {
    fn new() -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            state,
            seq: AtomicU64::new(0),
        }
    }

    /// Enter the loading state and claim the next sequence number.
    fn begin(&self) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        seq
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == seq
    }

    fn finish_ok(&self, seq: u64, apply: impl FnOnce(&mut T)) {
        if !self.is_latest(seq) {
            debug!(seq, "discarding stale response");
            return;
        }
        self.state.send_modify(|s| {
            apply(&mut s.data);
            s.loading = false;
            s.error = None;
        });
    }

    /// Record a failure. Prior data is left untouched.
    fn finish_err(&self, seq: u64, message: String) {
        if !self.is_latest(seq) {
            debug!(seq, "discarding stale error");
            return;
        }
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(message);
        });
    }
}

// ── Heart rate ───────────────────────────────────────────────────────

/// Everything a heart-rate fetch yields: the primary and recovery
/// series plus the server-computed summary and metadata.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct HeartRateData {
    pub samples: Vec<HeartRateSample>,
    pub recovery: Vec<HeartRateSample>,
    pub summary: Option<HeartRateSummary>,
    pub meta: Option<HeartRateMeta>,
}

/// Data-access feed for `GET /heart-rate`.
#[derive(Clone)]
pub struct HeartRateFeed {
    inner: Arc<HeartRateFeedInner>,
}

struct HeartRateFeedInner {
    session: Session,
    client: ApiClient,
    filters: Mutex<HeartRateFilters>,
    core: FeedCore<HeartRateData>,
}

impl HeartRateFeed {
    pub fn new(session: Session, client: ApiClient, filters: HeartRateFilters) -> Self {
        Self {
            inner: Arc::new(HeartRateFeedInner {
                session,
                client,
                filters: Mutex::new(filters),
                core: FeedCore::new(),
            }),
        }
    }

    /// The current snapshot.
    pub fn state(&self) -> FeedState<HeartRateData> {
        self.inner.core.state.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedState<HeartRateData>> {
        self.inner.core.state.subscribe()
    }

    pub async fn filters(&self) -> HeartRateFilters {
        self.inner.filters.lock().await.clone()
    }

    /// Replace the filters; any change triggers a refetch.
    pub async fn set_filters(&self, filters: HeartRateFilters) {
        {
            let mut guard = self.inner.filters.lock().await;
            if *guard == filters {
                return;
            }
            *guard = filters;
        }
        self.refetch().await;
    }

    /// Run one fetch cycle. Silently does nothing while anonymous.
    pub async fn refetch(&self) {
        if !self.inner.session.is_authenticated() {
            debug!("skipping heart-rate fetch: not authenticated");
            return;
        }

        let seq = self.inner.core.begin();
        let filters = self.inner.filters.lock().await.clone();

        let Some(token) = self.inner.session.get_access_token().await else {
            self.inner
                .core
                .finish_err(seq, CoreError::NoAccessToken.to_string());
            return;
        };

        match self.inner.client.get_heart_rate_data(&token, &filters).await {
            Ok(resp) => self.inner.core.finish_ok(seq, move |data| {
                data.samples = resp.data;
                data.recovery = resp.recovery_data;
                data.summary = Some(resp.summary);
                data.meta = Some(resp.meta);
            }),
            Err(e) => {
                warn!(error = %e, "heart-rate fetch failed");
                self.inner.core.finish_err(seq, e.to_string());
            }
        }
    }

    /// Refetch whenever the session's authenticated flag transitions,
    /// so a feed constructed before sign-in populates itself once the
    /// session comes up.
    pub fn spawn_session_watcher(&self) -> JoinHandle<()> {
        let feed = self.clone();
        let mut authenticated = feed.inner.session.subscribe_authenticated();
        tokio::spawn(async move {
            while authenticated.changed().await.is_ok() {
                feed.refetch().await;
            }
        })
    }
}

// ── Workouts ─────────────────────────────────────────────────────────

/// Everything a workout fetch yields.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct WorkoutData {
    pub workouts: Vec<Workout>,
    pub meta: Option<WorkoutMeta>,
}

/// Data-access feed for `GET /workouts`.
#[derive(Clone)]
pub struct WorkoutFeed {
    inner: Arc<WorkoutFeedInner>,
}

struct WorkoutFeedInner {
    session: Session,
    client: ApiClient,
    filters: Mutex<WorkoutFilters>,
    core: FeedCore<WorkoutData>,
}

impl WorkoutFeed {
    pub fn new(session: Session, client: ApiClient, filters: WorkoutFilters) -> Self {
        Self {
            inner: Arc::new(WorkoutFeedInner {
                session,
                client,
                filters: Mutex::new(filters),
                core: FeedCore::new(),
            }),
        }
    }

    pub fn state(&self) -> FeedState<WorkoutData> {
        self.inner.core.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<WorkoutData>> {
        self.inner.core.state.subscribe()
    }

    pub async fn filters(&self) -> WorkoutFilters {
        self.inner.filters.lock().await.clone()
    }

    /// Replace the filters; any change triggers a refetch.
    pub async fn set_filters(&self, filters: WorkoutFilters) {
        {
            let mut guard = self.inner.filters.lock().await;
            if *guard == filters {
                return;
            }
            *guard = filters;
        }
        self.refetch().await;
    }

    /// Run one fetch cycle. Silently does nothing while anonymous.
    pub async fn refetch(&self) {
        if !self.inner.session.is_authenticated() {
            debug!("skipping workout fetch: not authenticated");
            return;
        }

        let seq = self.inner.core.begin();
        let filters = self.inner.filters.lock().await.clone();

        let Some(token) = self.inner.session.get_access_token().await else {
            self.inner
                .core
                .finish_err(seq, CoreError::NoAccessToken.to_string());
            return;
        };

        match self.inner.client.get_workouts(&token, &filters).await {
            Ok(resp) => self.inner.core.finish_ok(seq, move |data| {
                data.workouts = resp.data;
                data.meta = Some(resp.meta);
            }),
            Err(e) => {
                warn!(error = %e, "workout fetch failed");
                self.inner.core.finish_err(seq, e.to_string());
            }
        }
    }

    /// See [`HeartRateFeed::spawn_session_watcher`].
    pub fn spawn_session_watcher(&self) -> JoinHandle<()> {
        let feed = self.clone();
        let mut authenticated = feed.inner.session.subscribe_authenticated();
        tokio::spawn(async move {
            while authenticated.changed().await.is_ok() {
                feed.refetch().await;
            }
        })
    }
}
