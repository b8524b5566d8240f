use std::collections::HashSet;
use std::time::Instant;

use chrono::{Datelike, NaiveDate};

use crate::model::{ReservationId, RestaurantId, Shift, Table, TableId};
use crate::observability;
use crate::time::{Minutes, Span, TimeOfDay};

use super::conflict::{reserved_table_ids, seats_party, table_is_free};
use super::{Engine, EngineError};

// ── Slot generation ───────────────────────────────────────────────

/// End time for a booking starting at `start`: start plus duration,
/// wrapping past midnight (a 23:30 start with 90 minutes ends at 01:00).
pub fn compute_end_time(start: TimeOfDay, duration_minutes: u16) -> TimeOfDay {
    TimeOfDay::from_minutes(start.minutes() + duration_minutes as Minutes)
}

/// The occupancy window a booking starting at `time` would claim.
pub(super) fn booking_window(time: TimeOfDay, duration_minutes: u16) -> Span {
    Span::new(time.minutes(), time.minutes() + duration_minutes as Minutes)
}

/// Candidate slot starts within one shift: open through close − duration
/// inclusive, stepping by the slot interval. A shift shorter than the
/// booking duration yields nothing.
pub(super) fn slot_starts(shift: &Shift, duration: u16, interval: u16) -> Vec<TimeOfDay> {
    debug_assert!(interval > 0, "slot interval must be positive");
    let last = shift.close.minutes() - duration as Minutes;
    let mut starts = Vec::new();
    let mut t = shift.open.minutes();
    while t <= last {
        starts.push(TimeOfDay::from_minutes(t));
        t += interval as Minutes;
    }
    starts
}

impl Engine {
    /// Bookable start times for a date and party size.
    ///
    /// Closed or unconfigured days, shiftless days, and restaurants with no
    /// tables all yield an empty list. A slot is emitted iff at least one
    /// table is in service, seats the party, and has no conflicting
    /// booking for the whole reservation window. Shifts contribute slots
    /// in shift order; overlapping shifts may repeat a start time, and the
    /// repeats are preserved.
    pub async fn available_time_slots(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        party_size: u32,
    ) -> Result<Vec<TimeOfDay>, EngineError> {
        self.slots_excluding(restaurant_id, date, party_size, None).await
    }

    pub(super) async fn slots_excluding(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        party_size: u32,
        exclude: Option<ReservationId>,
    ) -> Result<Vec<TimeOfDay>, EngineError> {
        let started = Instant::now();
        let result = self
            .compute_slots(restaurant_id, date, party_size, exclude)
            .await;
        metrics::histogram!(observability::SLOT_QUERY_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(observability::SLOT_QUERIES_TOTAL, "outcome" => outcome).increment(1);
        result
    }

    async fn compute_slots(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        party_size: u32,
        exclude: Option<ReservationId>,
    ) -> Result<Vec<TimeOfDay>, EngineError> {
        let weekday = date.weekday();
        let day = self
            .store_call("day_hours", self.hours.day_hours(restaurant_id, weekday))
            .await?;
        let Some(day) = day else {
            return Ok(Vec::new());
        };
        if !day.is_open || day.shifts.is_empty() {
            return Ok(Vec::new());
        }

        let tables = self
            .store_call("tables", self.tables.tables(restaurant_id))
            .await?;
        if tables.is_empty() {
            return Ok(Vec::new());
        }

        let reservations = self
            .store_call(
                "reservations_for_date",
                self.store.reservations_for_date(restaurant_id, date),
            )
            .await?;

        let duration = self.config.reservation_minutes;
        let interval = self.config.slot_interval_minutes;
        let mut slots = Vec::new();
        for shift in &day.shifts {
            for start in slot_starts(shift, duration, interval) {
                let window = booking_window(start, duration);
                let fits = tables.iter().any(|table| {
                    seats_party(table, party_size)
                        && table_is_free(table.id, &window, &reservations, exclude)
                });
                if fits {
                    slots.push(start);
                }
            }
        }
        Ok(slots)
    }

    /// Tables that could host a booking starting at `time`, smallest
    /// sufficient capacity first; equal capacities keep inventory order.
    pub async fn available_tables_for_time(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        time: TimeOfDay,
        party_size: u32,
    ) -> Result<Vec<Table>, EngineError> {
        let tables = self
            .store_call("tables", self.tables.tables(restaurant_id))
            .await?;
        if tables.is_empty() {
            return Ok(Vec::new());
        }
        let reserved = self.reserved_table_ids(restaurant_id, date, time).await?;

        let mut free: Vec<Table> = tables
            .into_iter()
            .filter(|t| seats_party(t, party_size) && !reserved.contains(&t.id))
            .collect();
        // Best fit: stable sort keeps input order within a capacity.
        free.sort_by_key(|t| t.capacity);
        Ok(free)
    }

    /// Table ids holding a non-cancelled booking that overlaps the
    /// reservation window starting at `time`.
    pub async fn reserved_table_ids(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        time: TimeOfDay,
    ) -> Result<HashSet<TableId>, EngineError> {
        let reservations = self
            .store_call(
                "reservations_for_date",
                self.store.reservations_for_date(restaurant_id, date),
            )
            .await?;
        let window = booking_window(time, self.config.reservation_minutes);
        Ok(reserved_table_ids(&reservations, &window, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn shift(open: &str, close: &str) -> Shift {
        Shift::new("Dinner", t(open), t(close)).unwrap()
    }

    #[test]
    fn end_time_basic() {
        assert_eq!(compute_end_time(t("19:00"), 90), t("20:30"));
    }

    #[test]
    fn end_time_wraps_past_midnight() {
        assert_eq!(compute_end_time(t("23:30"), 90), t("01:00"));
    }

    #[test]
    fn slot_grid_covers_shift() {
        let starts = slot_starts(&shift("18:00", "22:00"), 90, 30);
        let rendered: Vec<String> = starts.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["18:00", "18:30", "19:00", "19:30", "20:00", "20:30"]
        );
    }

    #[test]
    fn slot_grid_last_start_fits_duration() {
        // 21:00 close: last start must leave room for the full 90 minutes.
        let starts = slot_starts(&shift("18:00", "21:00"), 90, 30);
        assert_eq!(*starts.last().unwrap(), t("19:30"));
    }

    #[test]
    fn short_shift_yields_no_slots() {
        assert!(slot_starts(&shift("18:00", "19:00"), 90, 30).is_empty());
    }

    #[test]
    fn interval_steps_respected() {
        let starts = slot_starts(&shift("12:00", "14:00"), 60, 15);
        assert_eq!(starts.len(), 5); // 12:00 through 13:00
        assert_eq!(starts[1], t("12:15"));
    }

    #[test]
    fn exact_fit_shift_has_one_slot() {
        let starts = slot_starts(&shift("18:00", "19:30"), 90, 30);
        assert_eq!(starts, vec![t("18:00")]);
    }
}
