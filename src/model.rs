use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::time::{Span, TimeOfDay};

pub type RestaurantId = u64;
pub type TableId = u64;
pub type ReservationId = Ulid;

/// A physical table owned by a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub restaurant_id: RestaurantId,
    /// Seats at the table. Storage may deliver this as a number or a
    /// string; it is normalized to an integer here and nowhere else.
    #[serde(deserialize_with = "de_capacity")]
    pub capacity: u32,
    pub status: TableStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

/// A named open/close window within a single day (e.g. "Lunch").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub name: String,
    pub open: TimeOfDay,
    pub close: TimeOfDay,
}

impl Shift {
    /// Returns `None` unless `open < close`; shifts crossing midnight are
    /// not representable and must be entered as two same-day windows.
    pub fn new(name: impl Into<String>, open: TimeOfDay, close: TimeOfDay) -> Option<Self> {
        if open < close {
            Some(Self { name: name.into(), open, close })
        } else {
            None
        }
    }
}

/// Opening hours for one restaurant on one weekday. When `is_open` is
/// false the shifts are kept for display but ignored by slot generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub is_open: bool,
    pub shifts: Vec<Shift>,
}

impl DayHours {
    pub fn open(shifts: Vec<Shift>) -> Self {
        Self { is_open: true, shifts }
    }

    pub fn closed() -> Self {
        Self { is_open: false, shifts: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Legal status transitions. The engine itself only enforces the
    /// no-re-cancel guard; callers driving confirm/complete use this.
    pub fn can_transition(self, to: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

/// A stored reservation. `table_id` is `None` while the booking has not
/// yet been assigned a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub restaurant_id: RestaurantId,
    pub table_id: Option<TableId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub party_size: u32,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    /// Derived: start + configured duration, wrapped past midnight.
    pub end_time: TimeOfDay,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    pub cancel_reason: Option<String>,
}

impl Reservation {
    /// Occupancy interval as stored. A booking whose end wrapped past
    /// midnight yields `end < start` and never tests as overlapping.
    pub fn span(&self) -> Span {
        Span::new(self.time.minutes(), self.end_time.minutes())
    }
}

/// Input to [`Engine::create_reservation`](crate::Engine::create_reservation).
/// The store assigns the id; the engine derives end time and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub restaurant_id: RestaurantId,
    pub table_id: Option<TableId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub party_size: u32,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub special_requests: Option<String>,
}

/// Partial update for a reservation. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<TableId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
}

impl ReservationPatch {
    pub fn apply(&self, res: &mut Reservation) {
        if let Some(v) = self.table_id {
            res.table_id = Some(v);
        }
        if let Some(ref v) = self.customer_name {
            res.customer_name = v.clone();
        }
        if let Some(ref v) = self.customer_phone {
            res.customer_phone = v.clone();
        }
        if let Some(ref v) = self.customer_email {
            res.customer_email = Some(v.clone());
        }
        if let Some(v) = self.party_size {
            res.party_size = v;
        }
        if let Some(v) = self.date {
            res.date = v;
        }
        if let Some(v) = self.time {
            res.time = v;
        }
        if let Some(v) = self.end_time {
            res.end_time = v;
        }
        if let Some(v) = self.status {
            res.status = v;
        }
        if let Some(ref v) = self.special_requests {
            res.special_requests = Some(v.clone());
        }
        if let Some(ref v) = self.cancel_reason {
            res.cancel_reason = Some(v.clone());
        }
    }
}

/// Accept table capacity as either a JSON number or a numeric string.
fn de_capacity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("capacity is not an integer: {s:?}"))),
    }
}
