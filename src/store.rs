use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::{
    Reservation, ReservationId, ReservationPatch, ReservationStatus, RestaurantId, TableId,
};
use crate::time::TimeOfDay;

/// Collaborator/storage fault. The engine does not retry, since a repeated
/// non-idempotent insert could double-book; callers retry with backoff.
#[derive(Debug, Clone)]
pub struct StoreError(String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Insertable row: everything but the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub restaurant_id: RestaurantId,
    pub table_id: Option<TableId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub party_size: u32,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
}

impl NewReservation {
    fn into_reservation(self, id: ReservationId) -> Reservation {
        Reservation {
            id,
            restaurant_id: self.restaurant_id,
            table_id: self.table_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            party_size: self.party_size,
            date: self.date,
            time: self.time,
            end_time: self.end_time,
            status: self.status,
            special_requests: self.special_requests,
            cancel_reason: None,
        }
    }
}

/// Reservation persistence. Implementations must provide strong
/// read-after-write consistency within one (restaurant, date) partition:
/// a `reservations_for_date` snapshot reflects every prior committed
/// write for that partition.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Every non-deleted reservation for the restaurant/date, cancelled
    /// ones included; callers filter by status.
    async fn reservations_for_date(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError>;

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>, StoreError>;

    /// Assigns the id and returns the stored row.
    async fn insert(&self, row: NewReservation) -> Result<Reservation, StoreError>;

    /// Applies the patch and returns the updated row, or `None` if absent.
    async fn update(
        &self,
        id: ReservationId,
        patch: ReservationPatch,
    ) -> Result<Option<Reservation>, StoreError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: ReservationId) -> Result<bool, StoreError>;
}

type Partition = (RestaurantId, NaiveDate);

/// In-memory reservation store, partitioned by (restaurant, date) the way
/// the persisted layout keys reservations for range queries.
#[derive(Default)]
pub struct MemoryStore {
    rows: DashMap<Partition, Vec<Reservation>>,
    /// id → partition, so by-id operations skip the scan.
    index: DashMap<ReservationId, Partition>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, id: ReservationId) -> Option<Reservation> {
        let part = *self.index.get(&id)?.value();
        self.rows
            .get(&part)
            .and_then(|rows| rows.iter().find(|r| r.id == id).cloned())
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn reservations_for_date(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .rows
            .get(&(restaurant_id, date))
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>, StoreError> {
        Ok(self.find(id))
    }

    async fn insert(&self, row: NewReservation) -> Result<Reservation, StoreError> {
        let res = row.into_reservation(Ulid::new());
        let part = (res.restaurant_id, res.date);
        self.rows.entry(part).or_default().push(res.clone());
        self.index.insert(res.id, part);
        Ok(res)
    }

    async fn update(
        &self,
        id: ReservationId,
        patch: ReservationPatch,
    ) -> Result<Option<Reservation>, StoreError> {
        let Some(old_part) = self.index.get(&id).map(|e| *e.value()) else {
            return Ok(None);
        };
        let mut res = {
            let mut rows = self.rows.get_mut(&old_part).ok_or_else(|| {
                StoreError::new(format!("partition missing for indexed reservation {id}"))
            })?;
            let pos = rows
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| StoreError::new(format!("index points at missing row {id}")))?;
            // Remove now; re-inserted below under the (possibly new) partition.
            rows.remove(pos)
        };
        patch.apply(&mut res);

        let new_part = (res.restaurant_id, res.date);
        self.rows.entry(new_part).or_default().push(res.clone());
        if new_part != old_part {
            self.index.insert(id, new_part);
        }
        Ok(Some(res))
    }

    async fn delete(&self, id: ReservationId) -> Result<bool, StoreError> {
        let Some((_, part)) = self.index.remove(&id) else {
            return Ok(false);
        };
        if let Some(mut rows) = self.rows.get_mut(&part) {
            rows.retain(|r| r.id != id);
        }
        Ok(true)
    }
}
