use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub type ReservationId = Ulid;
pub type TableId = Ulid;

/// Half-open interval `[start, end)` in venue-local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start < end, "Window start must be before end");
        Self { start, end }
    }

    /// The window occupied by a booking starting at `start` for one dwell.
    pub fn starting_at(start: NaiveDateTime, dwell: Duration) -> Self {
        Self::new(start, start + dwell)
    }

    /// Touching endpoints do not overlap: a booking ending exactly when
    /// another starts releases its seats in time.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Seating capacity pool. Doubles as the physical area of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Indoor,
    Outdoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatingPreference {
    NoPreference,
    IndoorOnly,
    OutdoorIfPossible,
}

impl SeatingPreference {
    /// Zone a booking is counted against for capacity checks.
    /// No-preference bookings are held against indoor so a full indoor
    /// room can never be oversold by guests who would accept either.
    pub fn admission_zone(self) -> Zone {
        match self {
            SeatingPreference::OutdoorIfPossible => Zone::Outdoor,
            SeatingPreference::IndoorOnly | SeatingPreference::NoPreference => Zone::Indoor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Seated,
    Completed,
    NoShow,
    Cancelled,
}

impl ReservationStatus {
    /// Counts against zone capacity. Only a cancellation frees the seats;
    /// a no-show still holds them for admission purposes.
    pub fn holds_capacity(self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }

    /// Occupies physical tables and shows up on the floor timeline.
    pub fn occupies_tables(self) -> bool {
        !matches!(self, ReservationStatus::Cancelled | ReservationStatus::NoShow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookingSource {
    #[default]
    Online,
    Phone,
    WalkIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    /// Short floor label, e.g. "R1-T1" or "Outside-3".
    pub label: String,
    pub capacity: u32,
    pub area: Zone,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: u32,
    pub seating_preference: SeatingPreference,
    pub notes: String,
    pub status: ReservationStatus,
    /// Assigned tables. Staff assignment keeps at most one entry, but the
    /// record admits several.
    pub tables: Vec<TableId>,
    pub source: BookingSource,
}

impl Reservation {
    pub fn start_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn window(&self, dwell: Duration) -> Window {
        Window::starting_at(self.start_at(), dwell)
    }
}

/// Weekly schedule row. At most one per weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub weekday: Weekday,
    pub is_open: bool,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    /// Last time a new reservation may start. Falls back to `close_time`.
    pub last_reservation_time: Option<NaiveTime>,
}

impl OpeningHours {
    pub fn effective_last_reservation_time(&self) -> Option<NaiveTime> {
        self.last_reservation_time.or(self.close_time)
    }
}

/// One-off calendar override (e.g. Christmas) with its own booking window.
/// When present for a date it fully supersedes the weekday row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialOpeningDay {
    pub date: NaiveDate,
    pub is_open: bool,
    /// Date on or after which this day becomes bookable at all.
    pub bookings_open_from: NaiveDate,
    pub public_message: Option<String>,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    pub last_reservation_time: Option<NaiveTime>,
}

/// One day's reservations, sorted by start time.
///
/// All overlap queries in the engine go through [`DayBook::overlapping`],
/// so the half-open predicate lives in exactly one place.
#[derive(Debug, Clone)]
pub struct DayBook {
    pub date: NaiveDate,
    pub reservations: Vec<Reservation>,
}

impl DayBook {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            reservations: Vec::new(),
        }
    }

    /// Insert maintaining sort order by start time.
    pub fn insert(&mut self, reservation: Reservation) {
        debug_assert_eq!(reservation.date, self.date, "reservation on wrong day");
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.time, |r| r.time)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
    }

    pub fn remove(&mut self, id: ReservationId) -> Option<Reservation> {
        if let Some(pos) = self.reservations.iter().position(|r| r.id == id) {
            Some(self.reservations.remove(pos))
        } else {
            None
        }
    }

    pub fn get(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: ReservationId) -> Option<&mut Reservation> {
        self.reservations.iter_mut().find(|r| r.id == id)
    }

    /// Reservations whose dwell window intersects the query window.
    /// Uses binary search to skip bookings starting at or after `query.end`;
    /// every booking occupies the same `dwell`, so sort-by-start is also
    /// sort-by-end.
    pub fn overlapping(
        &self,
        query: &Window,
        dwell: Duration,
    ) -> impl Iterator<Item = &Reservation> {
        let right_bound = self
            .reservations
            .partition_point(|r| r.start_at() < query.end);
        let query = *query;
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.window(dwell).overlaps(&query))
    }
}
