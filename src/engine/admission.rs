use chrono::{NaiveDate, NaiveTime};

use crate::config::{GroupTier, PolicyConfig};
use crate::model::{BookingSource, DayBook, SeatingPreference, Window, Zone};

use super::calendar::DayStatus;
use super::EngineError;

/// A candidate reservation as it arrives from the booking flow. Date and
/// time are optional so a half-filled form can still be evaluated and
/// every problem reported at once.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub party_size: u32,
    pub seating_preference: SeatingPreference,
    pub notes: String,
    pub source: BookingSource,
}

impl Default for BookingRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            date: None,
            time: None,
            party_size: 0,
            seating_preference: SeatingPreference::NoPreference,
            notes: String::new(),
            source: BookingSource::Online,
        }
    }
}

/// Input field a rejection is attributed to, so a form can render the
/// message next to the offending control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Phone,
    Date,
    Time,
    PartySize,
    SeatingPreference,
    General,
}

/// One reason a candidate was turned away. These are expected outcomes,
/// not faults; every message is safe to show to the guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    ReservationsClosed { message: String },
    PartyTooLarge { limit: u32 },
    OutdoorPartyTooLarge { limit: u32 },
    PartySizeRequired,
    MissingEmail,
    MissingPhone,
    MissingDate,
    MissingTime,
    DateInPast,
    BookingsNotOpenYet { opens_on: NaiveDate },
    ClosedOnDate { date: NaiveDate },
    OutsideBookingHours { open: NaiveTime, last: NaiveTime },
    TooSoon { lead_minutes: u32 },
    FullyBooked,
    /// Indoor is exhausted but outdoor still has room for this window;
    /// the guest chose no preference, so a corrective action exists.
    TryOutdoor,
    VeryLargeGroupConflict,
    LargeGroupLimitReached,
    MediumGroupLimitReached,
}

impl RejectReason {
    pub fn field(&self) -> Field {
        match self {
            RejectReason::ReservationsClosed { .. } => Field::General,
            RejectReason::PartyTooLarge { .. }
            | RejectReason::OutdoorPartyTooLarge { .. }
            | RejectReason::PartySizeRequired => Field::PartySize,
            RejectReason::MissingEmail => Field::Email,
            RejectReason::MissingPhone => Field::Phone,
            RejectReason::MissingDate
            | RejectReason::DateInPast
            | RejectReason::BookingsNotOpenYet { .. }
            | RejectReason::ClosedOnDate { .. } => Field::Date,
            RejectReason::MissingTime
            | RejectReason::OutsideBookingHours { .. }
            | RejectReason::TooSoon { .. }
            | RejectReason::FullyBooked
            | RejectReason::VeryLargeGroupConflict
            | RejectReason::LargeGroupLimitReached
            | RejectReason::MediumGroupLimitReached => Field::Time,
            RejectReason::TryOutdoor => Field::SeatingPreference,
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::ReservationsClosed { message } => write!(f, "{message}"),
            RejectReason::PartyTooLarge { limit } => write!(
                f,
                "Online reservations are limited to {limit} guests. \
                 For larger groups, please contact us directly."
            ),
            RejectReason::OutdoorPartyTooLarge { limit } => write!(
                f,
                "For outdoor seating we accommodate up to {limit} guests per \
                 booking. Please choose indoor seating or contact us by phone."
            ),
            RejectReason::PartySizeRequired => {
                write!(f, "Please tell us how many guests to expect.")
            }
            RejectReason::MissingEmail => {
                write!(f, "Email is required so we can send you the confirmation.")
            }
            RejectReason::MissingPhone => write!(
                f,
                "Phone number is required so that we can contact you if necessary."
            ),
            RejectReason::MissingDate => write!(f, "Please choose a date."),
            RejectReason::MissingTime => write!(f, "Please choose a time."),
            RejectReason::DateInPast => write!(f, "You can't book for a past date."),
            RejectReason::BookingsNotOpenYet { opens_on } => write!(
                f,
                "Reservations for this date are not open yet. Online bookings \
                 will open on {}.",
                opens_on.format("%B %d %Y")
            ),
            RejectReason::ClosedOnDate { date } => write!(
                f,
                "We are closed on {}s. Please choose another date.",
                date.format("%A")
            ),
            RejectReason::OutsideBookingHours { open, last } => write!(
                f,
                "On this day we accept reservations between {} and {}.",
                open.format("%H:%M"),
                last.format("%H:%M")
            ),
            RejectReason::TooSoon { lead_minutes } => write!(
                f,
                "For same-day reservations, please choose a time at least \
                 {lead_minutes} minutes from now."
            ),
            RejectReason::FullyBooked => write!(
                f,
                "Sorry, we are fully booked at that time. Please pick another \
                 time slot."
            ),
            RejectReason::TryOutdoor => write!(
                f,
                "We are fully booked indoors at that time, but outdoor tables \
                 may be available if the weather allows. Please choose outdoor \
                 seating or contact us by phone."
            ),
            RejectReason::VeryLargeGroupConflict => write!(
                f,
                "We can only host one very large group at the same time. \
                 Please choose another time or contact us directly."
            ),
            RejectReason::LargeGroupLimitReached => write!(
                f,
                "We can only accommodate a limited number of large groups at \
                 the same time. Please choose another time or contact us by \
                 phone for large party bookings."
            ),
            RejectReason::MediumGroupLimitReached => write!(
                f,
                "We are already hosting multiple large groups at that time, so \
                 we cannot take additional medium-size bookings. Please choose \
                 another time."
            ),
        }
    }
}

/// Outcome of evaluating one candidate against the venue's rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(Vec<RejectReason>),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }
}

/// Everything one evaluation reads, captured at a single point in time.
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    pub request: &'a BookingRequest,
    /// Reservations sharing the candidate's date. `None` means an empty day.
    pub day: Option<&'a DayBook>,
    /// Effective schedule for the candidate's date.
    pub schedule: &'a DayStatus,
    pub policy: &'a PolicyConfig,
    pub today: NaiveDate,
    pub now: NaiveTime,
}

/// Run the ordered admission checks. Checks accumulate reasons rather
/// than short-circuiting, so a form can show every problem at once; the
/// booking-window gate and the capacity-exhausted outcomes are terminal.
/// Only a broken policy snapshot is an error.
pub fn evaluate(ctx: &EvaluationContext) -> Result<Decision, EngineError> {
    ctx.policy.validate()?;

    if !ctx.policy.reservations_open {
        return Ok(Decision::Reject(vec![RejectReason::ReservationsClosed {
            message: ctx.policy.closure_text().to_owned(),
        }]));
    }

    let mut reasons = Vec::new();

    check_party_size(ctx, &mut reasons);
    check_contact(ctx, &mut reasons);
    check_date(ctx, &mut reasons);

    // Until the booking window opens, no further checks are meaningful.
    if let DayStatus::NotYetBookable { opens_on } = ctx.schedule {
        reasons.push(RejectReason::BookingsNotOpenYet { opens_on: *opens_on });
        return Ok(Decision::Reject(reasons));
    }

    check_opening_hours(ctx, &mut reasons);
    check_lead_time(ctx, &mut reasons);

    let terminal = check_zone_load(ctx, &mut reasons);
    if terminal {
        return Ok(Decision::Reject(reasons));
    }

    Ok(if reasons.is_empty() {
        Decision::Accept
    } else {
        Decision::Reject(reasons)
    })
}

fn check_party_size(ctx: &EvaluationContext, reasons: &mut Vec<RejectReason>) {
    let party = ctx.request.party_size;
    if party == 0 {
        reasons.push(RejectReason::PartySizeRequired);
        return;
    }
    // Indoor is the larger cap, so it bounds every preference.
    if party > ctx.policy.max_party_size_indoor {
        reasons.push(RejectReason::PartyTooLarge {
            limit: ctx.policy.max_party_size_indoor,
        });
    }
    if ctx.request.seating_preference.admission_zone() == Zone::Outdoor
        && party > ctx.policy.max_party_size_outdoor
    {
        reasons.push(RejectReason::OutdoorPartyTooLarge {
            limit: ctx.policy.max_party_size_outdoor,
        });
    }
}

fn check_contact(ctx: &EvaluationContext, reasons: &mut Vec<RejectReason>) {
    if ctx.request.email.trim().is_empty() {
        reasons.push(RejectReason::MissingEmail);
    }
    if ctx.request.phone.trim().is_empty() {
        reasons.push(RejectReason::MissingPhone);
    }
}

fn check_date(ctx: &EvaluationContext, reasons: &mut Vec<RejectReason>) {
    match ctx.request.date {
        None => reasons.push(RejectReason::MissingDate),
        Some(date) if date < ctx.today => reasons.push(RejectReason::DateInPast),
        Some(_) => {}
    }
}

fn check_opening_hours(ctx: &EvaluationContext, reasons: &mut Vec<RejectReason>) {
    let Some(date) = ctx.request.date else {
        if ctx.request.time.is_none() {
            reasons.push(RejectReason::MissingTime);
        }
        return;
    };
    match ctx.schedule {
        DayStatus::Closed => reasons.push(RejectReason::ClosedOnDate { date }),
        DayStatus::Open {
            open,
            last_reservation,
            ..
        } => match ctx.request.time {
            None => reasons.push(RejectReason::MissingTime),
            Some(time) if time < *open || time > *last_reservation => {
                reasons.push(RejectReason::OutsideBookingHours {
                    open: *open,
                    last: *last_reservation,
                });
            }
            Some(_) => {}
        },
        DayStatus::NotYetBookable { .. } => {}
    }
}

fn check_lead_time(ctx: &EvaluationContext, reasons: &mut Vec<RejectReason>) {
    let (Some(date), Some(time)) = (ctx.request.date, ctx.request.time) else {
        return;
    };
    if date != ctx.today {
        return;
    }
    let cutoff = (ctx.today.and_time(ctx.now) + ctx.policy.min_lead()).time();
    if time <= cutoff {
        reasons.push(RejectReason::TooSoon {
            lead_minutes: ctx.policy.min_lead_minutes,
        });
    }
}

/// Concurrent load in one zone for one candidate window.
#[derive(Debug, Default)]
struct ZoneLoad {
    guests: u32,
    medium: u32,
    large: u32,
    very_large: u32,
}

fn zone_load(ctx: &EvaluationContext, zone: Zone, window: &Window) -> ZoneLoad {
    let mut load = ZoneLoad::default();
    let Some(day) = ctx.day else {
        return load;
    };
    for other in day.overlapping(window, ctx.policy.dwell()) {
        if !other.status.holds_capacity() {
            continue;
        }
        if other.seating_preference.admission_zone() != zone {
            continue;
        }
        load.guests += other.party_size;
        match ctx.policy.group_tier(other.party_size) {
            GroupTier::VeryLarge => {
                load.very_large += 1;
                load.large += 1; // also counts as large
            }
            GroupTier::Large => load.large += 1,
            GroupTier::Medium => load.medium += 1,
            GroupTier::Standard => {}
        }
    }
    load
}

/// Seat-capacity and group-tier checks for the candidate's zone.
/// Returns `true` when the decision is final: a capacity-exhausted
/// outcome leaves nothing further worth reporting.
fn check_zone_load(ctx: &EvaluationContext, reasons: &mut Vec<RejectReason>) -> bool {
    let (Some(date), Some(time)) = (ctx.request.date, ctx.request.time) else {
        return false;
    };
    let party = ctx.request.party_size;
    if party == 0 {
        return false;
    }

    let zone = ctx.request.seating_preference.admission_zone();
    let window = Window::starting_at(date.and_time(time), ctx.policy.dwell());
    let load = zone_load(ctx, zone, &window);

    if load.guests + party > ctx.policy.zone_capacity(zone) {
        if zone == Zone::Indoor
            && ctx.request.seating_preference == SeatingPreference::NoPreference
        {
            let outdoor = zone_load(ctx, Zone::Outdoor, &window);
            if outdoor.guests + party <= ctx.policy.outdoor_capacity {
                reasons.push(RejectReason::TryOutdoor);
                return true;
            }
        }
        reasons.push(RejectReason::FullyBooked);
        return true;
    }

    let tier = ctx.policy.group_tier(party);
    match zone {
        Zone::Indoor => {
            if tier == GroupTier::VeryLarge
                && load.very_large >= ctx.policy.max_very_large_groups_indoor
            {
                reasons.push(RejectReason::VeryLargeGroupConflict);
            }
            if tier.is_large() && load.large + 1 > ctx.policy.max_large_groups_indoor {
                reasons.push(RejectReason::LargeGroupLimitReached);
            }
            // At two or more concurrent large groups the kitchen can absorb
            // at most one medium group on top.
            let effective_large = load.large + u32::from(tier.is_large());
            if effective_large >= 2 {
                let effective_medium = load.medium + u32::from(tier == GroupTier::Medium);
                if effective_medium > 1 {
                    reasons.push(RejectReason::MediumGroupLimitReached);
                }
            }
        }
        Zone::Outdoor => {
            if tier.is_large() && load.large + 1 > ctx.policy.max_large_groups_outdoor {
                reasons.push(RejectReason::LargeGroupLimitReached);
            }
        }
    }

    false
}
