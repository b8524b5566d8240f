mod availability;
mod conflict;
mod error;
mod lifecycle;

pub use availability::compute_end_time;
pub use error::EngineError;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use crate::catalog::{HoursCatalog, TableCatalog};
use crate::model::RestaurantId;
use crate::observability;
use crate::store::{ReservationStore, StoreError};

/// Scheduling knobs. Every reservation occupies a fixed window starting at
/// its slot; candidate slots are spaced at a fixed interval within a shift.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub reservation_minutes: u16,
    pub slot_interval_minutes: u16,
    /// Budget for a single collaborator call; elapsed budgets surface as
    /// [`EngineError::StoreUnavailable`].
    pub store_timeout: Duration,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            reservation_minutes: 90,
            slot_interval_minutes: 30,
            store_timeout: Duration::from_secs(5),
        }
    }
}

impl SchedulingConfig {
    /// Read overrides from `MAITRED_RESERVATION_MINUTES`,
    /// `MAITRED_SLOT_INTERVAL_MINUTES` and `MAITRED_STORE_TIMEOUT_MS`.
    /// Unset or unparseable variables keep the defaults; a zero interval is
    /// rejected because slot generation would never advance.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        fn env_u64(key: &str) -> Option<u64> {
            std::env::var(key).ok().and_then(|s| s.parse().ok())
        }
        let slot_interval = env_u64("MAITRED_SLOT_INTERVAL_MINUTES")
            .filter(|&v| v > 0)
            .map(|v| v as u16)
            .unwrap_or(defaults.slot_interval_minutes);
        Self {
            reservation_minutes: env_u64("MAITRED_RESERVATION_MINUTES")
                .filter(|&v| v > 0)
                .map(|v| v as u16)
                .unwrap_or(defaults.reservation_minutes),
            slot_interval_minutes: slot_interval,
            store_timeout: env_u64("MAITRED_STORE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
        }
    }
}

/// The scheduling engine. Holds references to its collaborators and no
/// other state: every availability computation re-reads current catalog
/// and store snapshots rather than caching them, trading latency for
/// freshness.
///
/// Query methods live in `availability.rs`, commit paths in
/// `lifecycle.rs`. Commits serialize per (restaurant, date) so two
/// requests racing for the last table cannot both pass the availability
/// check against one engine; exclusion across processes is the store's
/// contract.
pub struct Engine {
    pub(super) hours: Arc<dyn HoursCatalog>,
    pub(super) tables: Arc<dyn TableCatalog>,
    pub(super) store: Arc<dyn ReservationStore>,
    pub(super) config: SchedulingConfig,
    date_locks: DashMap<(RestaurantId, NaiveDate), Arc<Mutex<()>>>,
}

impl Engine {
    pub fn new(
        hours: Arc<dyn HoursCatalog>,
        tables: Arc<dyn TableCatalog>,
        store: Arc<dyn ReservationStore>,
    ) -> Self {
        Self::with_config(hours, tables, store, SchedulingConfig::default())
    }

    pub fn with_config(
        hours: Arc<dyn HoursCatalog>,
        tables: Arc<dyn TableCatalog>,
        store: Arc<dyn ReservationStore>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            hours,
            tables,
            store,
            config,
            date_locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Run one collaborator call under the configured timeout.
    pub(super) async fn store_call<T, F>(&self, op: &'static str, fut: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                metrics::counter!(observability::STORE_FAULTS_TOTAL, "op" => op).increment(1);
                warn!("{op} failed: {e}");
                Err(EngineError::StoreUnavailable(e.to_string()))
            }
            Err(_) => {
                metrics::counter!(observability::STORE_FAULTS_TOTAL, "op" => op).increment(1);
                warn!("{op} timed out");
                Err(EngineError::StoreUnavailable(format!("{op} timed out")))
            }
        }
    }

    /// Serialize commits touching one (restaurant, date) partition. The
    /// guard must be held from availability re-check through the final
    /// store write.
    pub(super) async fn lock_partition(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
    ) -> OwnedMutexGuard<()> {
        let lock = self
            .date_locks
            .entry((restaurant_id, date))
            .or_default()
            .value()
            .clone();
        lock.lock_owned().await
    }
}
