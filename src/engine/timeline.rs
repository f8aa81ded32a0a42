use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::model::{DayBook, Reservation, SeatingPreference, Table, TableId, Window, Zone};

/// Semantic load level for dashboard rendering, derived from
/// occupied seats over zone capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pressure {
    Calm,
    Busy,
    VeryBusy,
    /// Zone capacity is configured as zero; the ratio is meaningless.
    Unknown,
}

impl Pressure {
    pub fn from_load(occupied: u32, capacity: u32) -> Self {
        if capacity == 0 {
            return Pressure::Unknown;
        }
        let percent = occupied as u64 * 100 / capacity as u64;
        if percent < 50 {
            Pressure::Calm
        } else if percent < 80 {
            Pressure::Busy
        } else {
            Pressure::VeryBusy
        }
    }
}

/// One 15-minute slice of the day's occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterBucket {
    pub start: NaiveDateTime,
    pub indoor: u32,
    pub outdoor: u32,
    pub unassigned: u32,
    pub indoor_pressure: Pressure,
    pub outdoor_pressure: Pressure,
}

/// Hourly rollup of the quarter buckets: the worst moment in the hour,
/// not the hour's sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourBucket {
    pub start: NaiveDateTime,
    pub indoor: u32,
    pub outdoor: u32,
    pub unassigned: u32,
    pub indoor_pressure: Pressure,
    pub outdoor_pressure: Pressure,
    pub is_past: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTimeline {
    pub quarters: Vec<QuarterBucket>,
    pub hours: Vec<HourBucket>,
}

impl DayTimeline {
    pub fn empty() -> Self {
        Self {
            quarters: Vec::new(),
            hours: Vec::new(),
        }
    }
}

/// Area a reservation is reported under on the dashboard. An assigned
/// table's physical area wins; without one, only an explicit indoor-only
/// preference is a commitment. This is deliberately looser than the
/// admission-control zone: the dashboard must not overstate indoor load
/// just because undecided guests would be *counted* indoors for safety.
fn reporting_area(reservation: &Reservation, tables: &HashMap<TableId, Table>) -> Option<Zone> {
    if let Some(table_id) = reservation.tables.first()
        && let Some(table) = tables.get(table_id)
    {
        return Some(table.area);
    }
    match reservation.seating_preference {
        SeatingPreference::IndoorOnly => Some(Zone::Indoor),
        _ => None,
    }
}

fn floor_to_quarter(t: NaiveDateTime) -> NaiveDateTime {
    let extra = (t.minute() % 15) as i64 * 60 + t.second() as i64;
    t - Duration::seconds(extra)
}

fn floor_to_hour(t: NaiveDateTime) -> NaiveDateTime {
    let extra = t.minute() as i64 * 60 + t.second() as i64;
    t - Duration::seconds(extra)
}

/// Walk the day's occupied span in 15-minute steps and bucket the load.
/// Only reservations that occupy tables are counted (no-shows and
/// cancellations drop out). The span runs from the earliest start,
/// floored to the quarter hour, to the latest window end — which may
/// reach past midnight.
pub fn build(
    day: &DayBook,
    tables: &HashMap<TableId, Table>,
    dwell: Duration,
    indoor_capacity: u32,
    outdoor_capacity: u32,
    now: NaiveDateTime,
) -> DayTimeline {
    // The book is sorted by start time, so the first counted booking
    // opens the span; every window is the same length, so the last one
    // closes it.
    let mut counted_starts = day
        .reservations
        .iter()
        .filter(|r| r.status.occupies_tables())
        .map(|r| r.start_at());
    let Some(first_start) = counted_starts.next() else {
        return DayTimeline::empty();
    };
    let last_start = counted_starts.last().unwrap_or(first_start);
    let span_start = floor_to_quarter(first_start);
    let span_end = last_start + dwell;

    let mut quarters = Vec::new();
    let mut step_start = span_start;
    while step_start < span_end {
        let step = Window::new(step_start, step_start + Duration::minutes(15));
        let mut indoor = 0;
        let mut outdoor = 0;
        let mut unassigned = 0;
        for reservation in day
            .overlapping(&step, dwell)
            .filter(|r| r.status.occupies_tables())
        {
            match reporting_area(reservation, tables) {
                Some(Zone::Indoor) => indoor += reservation.party_size,
                Some(Zone::Outdoor) => outdoor += reservation.party_size,
                None => unassigned += reservation.party_size,
            }
        }
        quarters.push(QuarterBucket {
            start: step_start,
            indoor,
            outdoor,
            unassigned,
            indoor_pressure: Pressure::from_load(indoor, indoor_capacity),
            outdoor_pressure: Pressure::from_load(outdoor, outdoor_capacity),
        });
        step_start = step.end;
    }

    let hours = rollup_hourly(&quarters, indoor_capacity, outdoor_capacity, now);
    DayTimeline { quarters, hours }
}

/// Group quarter buckets by clock hour, taking the maximum of each
/// metric — a sum would double-count guests sitting through several
/// quarters. Hours with no load at all are omitted.
fn rollup_hourly(
    quarters: &[QuarterBucket],
    indoor_capacity: u32,
    outdoor_capacity: u32,
    now: NaiveDateTime,
) -> Vec<HourBucket> {
    let mut hours: Vec<HourBucket> = Vec::new();
    for quarter in quarters {
        let hour_start = floor_to_hour(quarter.start);
        match hours.last_mut() {
            Some(hour) if hour.start == hour_start => {
                hour.indoor = hour.indoor.max(quarter.indoor);
                hour.outdoor = hour.outdoor.max(quarter.outdoor);
                hour.unassigned = hour.unassigned.max(quarter.unassigned);
            }
            _ => hours.push(HourBucket {
                start: hour_start,
                indoor: quarter.indoor,
                outdoor: quarter.outdoor,
                unassigned: quarter.unassigned,
                indoor_pressure: quarter.indoor_pressure,
                outdoor_pressure: quarter.outdoor_pressure,
                is_past: hour_start + Duration::hours(1) <= now,
            }),
        }
    }
    hours.retain(|h| h.indoor + h.outdoor + h.unassigned > 0);
    for hour in &mut hours {
        hour.indoor_pressure = Pressure::from_load(hour.indoor, indoor_capacity);
        hour.outdoor_pressure = Pressure::from_load(hour.outdoor, outdoor_capacity);
    }
    hours
}
