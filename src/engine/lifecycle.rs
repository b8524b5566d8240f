use tracing::{debug, info};

use crate::limits::*;
use crate::model::{
    Reservation, ReservationId, ReservationPatch, ReservationRequest, ReservationStatus,
};
use crate::observability;
use crate::store::NewReservation;

use super::availability::compute_end_time;
use super::{Engine, EngineError};

/// Stored when a cancellation arrives without a reason.
const DEFAULT_CANCEL_REASON: &str = "cancelled by customer";

fn validate_request(req: &ReservationRequest) -> Result<(), EngineError> {
    if req.customer_name.trim().is_empty() {
        return Err(EngineError::Validation("customer_name is required"));
    }
    if req.customer_name.len() > MAX_NAME_LEN {
        return Err(EngineError::Validation("customer_name too long"));
    }
    if req.customer_phone.trim().is_empty() {
        return Err(EngineError::Validation("customer_phone is required"));
    }
    if req.customer_phone.len() > MAX_PHONE_LEN {
        return Err(EngineError::Validation("customer_phone too long"));
    }
    if let Some(email) = &req.customer_email
        && email.len() > MAX_EMAIL_LEN
    {
        return Err(EngineError::Validation("customer_email too long"));
    }
    if req.party_size == 0 {
        return Err(EngineError::Validation("party_size must be at least 1"));
    }
    if req.party_size > MAX_PARTY_SIZE {
        return Err(EngineError::Validation("party_size too large"));
    }
    if let Some(notes) = &req.special_requests
        && notes.len() > MAX_SPECIAL_REQUESTS_LEN
    {
        return Err(EngineError::Validation("special_requests too long"));
    }
    Ok(())
}

fn validate_patch(patch: &ReservationPatch) -> Result<(), EngineError> {
    if let Some(name) = &patch.customer_name {
        if name.trim().is_empty() {
            return Err(EngineError::Validation("customer_name is required"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(EngineError::Validation("customer_name too long"));
        }
    }
    if let Some(phone) = &patch.customer_phone {
        if phone.trim().is_empty() {
            return Err(EngineError::Validation("customer_phone is required"));
        }
        if phone.len() > MAX_PHONE_LEN {
            return Err(EngineError::Validation("customer_phone too long"));
        }
    }
    if let Some(email) = &patch.customer_email
        && email.len() > MAX_EMAIL_LEN
    {
        return Err(EngineError::Validation("customer_email too long"));
    }
    if let Some(party) = patch.party_size {
        if party == 0 {
            return Err(EngineError::Validation("party_size must be at least 1"));
        }
        if party > MAX_PARTY_SIZE {
            return Err(EngineError::Validation("party_size too large"));
        }
    }
    if let Some(notes) = &patch.special_requests
        && notes.len() > MAX_SPECIAL_REQUESTS_LEN
    {
        return Err(EngineError::Validation("special_requests too long"));
    }
    Ok(())
}

impl Engine {
    /// Validate and book. The requested start must be an open slot for the
    /// date and party; an explicitly requested table must be able to host
    /// the booking. Inserted with status `pending` and a derived end time.
    ///
    /// The availability re-check and the insert run under the
    /// (restaurant, date) partition lock, so concurrent requests against
    /// this engine cannot both claim the last table. A store-level
    /// constraint remains the authoritative cross-process guard.
    pub async fn create_reservation(
        &self,
        req: ReservationRequest,
    ) -> Result<Reservation, EngineError> {
        validate_request(&req)?;
        let _guard = self.lock_partition(req.restaurant_id, req.date).await;

        let slots = self
            .slots_excluding(req.restaurant_id, req.date, req.party_size, None)
            .await?;
        if !slots.contains(&req.time) {
            metrics::counter!(observability::RESERVATION_REJECTIONS_TOTAL, "reason" => "slot")
                .increment(1);
            debug!(
                "rejected booking for restaurant {} on {} at {}: slot unavailable",
                req.restaurant_id, req.date, req.time
            );
            return Err(EngineError::SlotUnavailable { time: req.time });
        }

        if let Some(table_id) = req.table_id {
            let free = self
                .available_tables_for_time(req.restaurant_id, req.date, req.time, req.party_size)
                .await?;
            if !free.iter().any(|t| t.id == table_id) {
                metrics::counter!(observability::RESERVATION_REJECTIONS_TOTAL, "reason" => "table")
                    .increment(1);
                debug!(
                    "rejected booking for restaurant {} on {} at {}: table {} unavailable",
                    req.restaurant_id, req.date, req.time, table_id
                );
                return Err(EngineError::TableUnavailable { table_id });
            }
        }

        let end_time = compute_end_time(req.time, self.config.reservation_minutes);
        let row = NewReservation {
            restaurant_id: req.restaurant_id,
            table_id: req.table_id,
            customer_name: req.customer_name,
            customer_phone: req.customer_phone,
            customer_email: req.customer_email,
            party_size: req.party_size,
            date: req.date,
            time: req.time,
            end_time,
            status: ReservationStatus::Pending,
            special_requests: req.special_requests,
        };
        let created = self.store_call("insert", self.store.insert(row)).await?;
        metrics::counter!(observability::RESERVATIONS_CREATED_TOTAL).increment(1);
        info!(
            "created reservation {} for restaurant {} on {} at {} (party of {})",
            created.id, created.restaurant_id, created.date, created.time, created.party_size
        );
        Ok(created)
    }

    /// Apply a partial update. A change to date, time or party size
    /// re-validates the merged values against current availability, with
    /// the reservation's own row excluded from the conflict set, so a
    /// booking can keep or shift within its own window. A time change
    /// recomputes the stored end time.
    pub async fn update_reservation(
        &self,
        id: ReservationId,
        mut patch: ReservationPatch,
    ) -> Result<Reservation, EngineError> {
        validate_patch(&patch)?;
        let existing = self
            .store_call("get", self.store.get(id))
            .await?
            .ok_or(EngineError::NotFound(id))?;

        let date = patch.date.unwrap_or(existing.date);
        let time = patch.time.unwrap_or(existing.time);
        let party_size = patch.party_size.unwrap_or(existing.party_size);
        let reschedules =
            patch.date.is_some() || patch.time.is_some() || patch.party_size.is_some();

        let _guard = self.lock_partition(existing.restaurant_id, date).await;
        if reschedules {
            let slots = self
                .slots_excluding(existing.restaurant_id, date, party_size, Some(id))
                .await?;
            if !slots.contains(&time) {
                metrics::counter!(observability::RESERVATION_REJECTIONS_TOTAL, "reason" => "slot")
                    .increment(1);
                debug!(
                    "rejected reschedule of {} to {} {}: slot unavailable",
                    id, date, time
                );
                return Err(EngineError::SlotUnavailable { time });
            }
        }
        if patch.time.is_some() {
            patch.end_time = Some(compute_end_time(time, self.config.reservation_minutes));
        }

        let updated = self
            .store_call("update", self.store.update(id, patch))
            .await?
            .ok_or(EngineError::NotFound(id))?;
        info!(
            "updated reservation {} (now {} at {}, party of {})",
            updated.id, updated.date, updated.time, updated.party_size
        );
        Ok(updated)
    }

    /// Mark a reservation cancelled, recording the reason (or a default
    /// marker when none is given). Re-cancelling is rejected and leaves
    /// the stored row untouched.
    pub async fn cancel_reservation(
        &self,
        id: ReservationId,
        reason: Option<&str>,
    ) -> Result<Reservation, EngineError> {
        let existing = self
            .store_call("get", self.store.get(id))
            .await?
            .ok_or(EngineError::NotFound(id))?;
        if existing.status == ReservationStatus::Cancelled {
            return Err(EngineError::AlreadyCancelled(id));
        }

        let reason = match reason.map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => DEFAULT_CANCEL_REASON.to_string(),
        };
        if reason.len() > MAX_CANCEL_REASON_LEN {
            return Err(EngineError::Validation("cancel reason too long"));
        }

        let patch = ReservationPatch {
            status: Some(ReservationStatus::Cancelled),
            cancel_reason: Some(reason),
            ..Default::default()
        };
        let cancelled = self
            .store_call("update", self.store.update(id, patch))
            .await?
            .ok_or(EngineError::NotFound(id))?;
        metrics::counter!(observability::RESERVATIONS_CANCELLED_TOTAL).increment(1);
        info!("cancelled reservation {id}");
        Ok(cancelled)
    }

    /// Hard delete. Returns `false` when the reservation does not exist.
    pub async fn delete_reservation(&self, id: ReservationId) -> Result<bool, EngineError> {
        let deleted = self.store_call("delete", self.store.delete(id)).await?;
        if deleted {
            info!("deleted reservation {id}");
        }
        Ok(deleted)
    }
}
