use std::collections::HashSet;

use crate::model::{Reservation, ReservationId, ReservationStatus, Table, TableId, TableStatus};
use crate::time::Span;

/// Occupancy view of a reservation snapshot: non-cancelled, table-assigned
/// bookings only. Pending, confirmed and completed all hold their table;
/// unassigned bookings hold none. `exclude` drops one reservation from the
/// snapshot so an update does not conflict with its own row.
pub(super) fn occupying(
    reservations: &[Reservation],
    exclude: Option<ReservationId>,
) -> impl Iterator<Item = (TableId, Span)> + '_ {
    reservations
        .iter()
        .filter(move |r| r.status != ReservationStatus::Cancelled && Some(r.id) != exclude)
        .filter_map(|r| r.table_id.map(|t| (t, r.span())))
}

/// Table ids occupied at any point of `window`. Set semantics: a table
/// appears once however many bookings touch it.
pub(super) fn reserved_table_ids(
    reservations: &[Reservation],
    window: &Span,
    exclude: Option<ReservationId>,
) -> HashSet<TableId> {
    occupying(reservations, exclude)
        .filter(|(_, span)| span.overlaps(window))
        .map(|(table_id, _)| table_id)
        .collect()
}

pub(super) fn table_is_free(
    table_id: TableId,
    window: &Span,
    reservations: &[Reservation],
    exclude: Option<ReservationId>,
) -> bool {
    !occupying(reservations, exclude).any(|(t, span)| t == table_id && span.overlaps(window))
}

/// A table can host a party iff it is in service and large enough.
pub(super) fn seats_party(table: &Table, party_size: u32) -> bool {
    table.status == TableStatus::Available && table.capacity >= party_size
}
