use crate::model::{ReservationId, TableId};
use crate::time::TimeOfDay;

#[derive(Debug)]
pub enum EngineError {
    /// Missing or malformed input, recoverable by the caller fixing it.
    Validation(&'static str),
    /// The requested start time is not an open slot for that date/party.
    SlotUnavailable { time: TimeOfDay },
    /// The explicitly requested table cannot seat this booking.
    TableUnavailable { table_id: TableId },
    NotFound(ReservationId),
    AlreadyCancelled(ReservationId),
    /// Collaborator fault or timeout; callers retry with backoff.
    StoreUnavailable(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "validation failed: {msg}"),
            EngineError::SlotUnavailable { time } => {
                write!(f, "no availability at {time}")
            }
            EngineError::TableUnavailable { table_id } => {
                write!(f, "table {table_id} not available for this booking")
            }
            EngineError::NotFound(id) => write!(f, "reservation not found: {id}"),
            EngineError::AlreadyCancelled(id) => {
                write!(f, "reservation already cancelled: {id}")
            }
            EngineError::StoreUnavailable(e) => write!(f, "store unavailable: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
