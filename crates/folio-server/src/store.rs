//! Caller-owned achievements state: the last published sweep and the
//! in-progress flag.
//!
//! The aggregation engine is stateless; this store is where "last fetched"
//! lives. A finished sweep replaces the previous snapshot in one swap, so
//! readers see either the old mapping or the new one, never a mix.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio_core::{AchievementStats, PlatformsFile};
use folio_stats::Aggregator;
use tokio::sync::RwLock;

/// One published sweep.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub stats: AchievementStats,
    pub fetched_at: DateTime<Utc>,
}

pub struct AchievementsStore {
    aggregator: Aggregator,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    loading: AtomicBool,
}

impl AchievementsStore {
    #[must_use]
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator,
            snapshot: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Claim the in-progress flag. Returns `None` if a sweep is already running.
    #[must_use]
    pub fn try_begin(self: &Arc<Self>) -> Option<RefreshGuard> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard {
                store: Arc::clone(self),
            })
    }
}

/// Exclusive right to run one sweep. Dropping it clears the loading flag,
/// including when the sweep future is cancelled.
pub struct RefreshGuard {
    store: Arc<AchievementsStore>,
}

impl RefreshGuard {
    /// Run a sweep over `registry` and publish the result.
    pub async fn run(self, registry: &PlatformsFile) -> Arc<Snapshot> {
        let stats = self.store.aggregator.aggregate(registry.descriptors()).await;
        let snapshot = Arc::new(Snapshot {
            stats,
            fetched_at: Utc::now(),
        });
        *self.store.snapshot.write().await = Some(Arc::clone(&snapshot));
        snapshot
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.store.loading.store(false, Ordering::Release);
    }
}

/// Start a sweep in the background if none is running.
///
/// Returns `false` when another sweep already holds the loading flag.
pub fn spawn_refresh(store: &Arc<AchievementsStore>, registry: Arc<PlatformsFile>) -> bool {
    let Some(guard) = store.try_begin() else {
        return false;
    };
    tokio::spawn(async move {
        guard.run(&registry).await;
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_stats::StatsClient;

    fn manual_registry() -> PlatformsFile {
        folio_core::parse_platforms(
            r"
platforms:
  - name: HackerRank
    fallback:
      questionsSolved: 150
      rank: Gold
      contests: 1
",
        )
        .expect("valid registry")
    }

    fn store() -> Arc<AchievementsStore> {
        let client = StatsClient::new(2, 2, "folio-test/0.1").expect("client");
        Arc::new(AchievementsStore::new(Aggregator::new(client)))
    }

    #[tokio::test]
    async fn new_store_is_idle_and_empty() {
        let store = store();
        assert!(!store.is_loading());
        assert!(store.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn second_begin_is_rejected_while_first_is_held() {
        let store = store();
        let guard = store.try_begin().expect("first begin");
        assert!(store.is_loading());
        assert!(store.try_begin().is_none());
        drop(guard);
        assert!(!store.is_loading());
        assert!(store.try_begin().is_some());
    }

    #[tokio::test]
    async fn run_publishes_snapshot_and_clears_loading() {
        let store = store();
        let registry = manual_registry();

        let guard = store.try_begin().expect("begin");
        let published = guard.run(&registry).await;

        assert!(!store.is_loading());
        let snapshot = store.snapshot().await.expect("snapshot published");
        assert!(Arc::ptr_eq(&snapshot, &published));
        let hr = snapshot.stats.get("HackerRank").expect("HackerRank result");
        assert_eq!(hr.questions_solved, folio_core::StatValue::from(150));
    }

    #[tokio::test]
    async fn spawn_refresh_reports_busy() {
        let store = store();
        let registry = Arc::new(manual_registry());
        let _held = store.try_begin().expect("begin");
        assert!(!spawn_refresh(&store, registry));
    }
}
