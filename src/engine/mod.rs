mod admission;
mod calendar;
mod conflict;
mod error;
mod store;
mod timeline;

pub use admission::{evaluate, BookingRequest, Decision, EvaluationContext, Field, RejectReason};
pub use calendar::{resolve as resolve_day, DayStatus};
pub use conflict::{blocked_tables as compute_blocked_tables, validate_assignment};
pub use error::EngineError;
pub use store::{InMemoryStore, SharedDayBook};
pub use timeline::{DayTimeline, HourBucket, Pressure, QuarterBucket};

use std::collections::HashSet;
use std::time::Instant;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::config::PolicyConfig;
use crate::model::{
    DayBook, OpeningHours, Reservation, ReservationId, ReservationStatus, SpecialOpeningDay,
    Table, TableId,
};
use crate::observability;

pub(crate) fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Facade over the in-memory store and the pure decision functions.
///
/// The decision functions themselves never lock or suspend; the facade
/// captures a consistent snapshot per call. `submit` holds a day's write
/// guard across "read existing → evaluate → insert", so two concurrent
/// submissions can never both observe the last seats as free.
pub struct Engine {
    store: InMemoryStore,
    policy: RwLock<PolicyConfig>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            policy: RwLock::new(PolicyConfig::default()),
        }
    }

    pub fn with_policy(policy: PolicyConfig) -> Result<Self, EngineError> {
        policy.validate()?;
        Ok(Self {
            store: InMemoryStore::new(),
            policy: RwLock::new(policy),
        })
    }

    // ── Configuration ────────────────────────────────────────

    pub async fn policy(&self) -> PolicyConfig {
        self.policy.read().await.clone()
    }

    /// Replace the policy snapshot. A snapshot that fails validation is
    /// refused and the previous one stays in effect.
    pub async fn update_policy(&self, policy: PolicyConfig) -> Result<(), EngineError> {
        if let Err(e) = policy.validate() {
            warn!(error = %e, "rejected policy update");
            return Err(e);
        }
        *self.policy.write().await = policy;
        info!("policy snapshot replaced");
        Ok(())
    }

    // ── Venue configuration ──────────────────────────────────

    pub fn set_opening_hours(&self, row: OpeningHours) {
        self.store.set_weekday_hours(row);
    }

    pub fn set_special_day(&self, row: SpecialOpeningDay) {
        self.store.set_special_day(row);
    }

    pub fn upsert_table(&self, table: Table) {
        self.store.upsert_table(table);
    }

    pub fn active_tables(&self) -> Vec<Table> {
        self.store.active_tables()
    }

    /// Effective schedule for a date — including the public notice of a
    /// special day, for the reservation page.
    pub fn day_status(&self, date: NaiveDate, today: NaiveDate) -> DayStatus {
        calendar::resolve(
            self.store.weekday_hours(date.weekday()).as_ref(),
            self.store.special_day(date).as_ref(),
            today,
        )
    }

    // ── Admission ────────────────────────────────────────────

    /// Decide whether a candidate may be accepted, without persisting it.
    pub async fn evaluate(&self, request: &BookingRequest) -> Result<Decision, EngineError> {
        self.evaluate_at(request, now_local()).await
    }

    pub async fn evaluate_at(
        &self,
        request: &BookingRequest,
        now: NaiveDateTime,
    ) -> Result<Decision, EngineError> {
        let policy = self.policy.read().await.clone();
        let started = Instant::now();
        let decision = match request.date.and_then(|date| self.store.day(date)) {
            Some(day) => {
                let guard = day.read().await;
                self.decide(request, Some(&guard), &policy, now)?
            }
            None => self.decide(request, None, &policy, now)?,
        };
        metrics::counter!(
            observability::EVALUATIONS_TOTAL,
            "outcome" => observability::decision_label(&decision)
        )
        .increment(1);
        metrics::histogram!(observability::EVALUATION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        debug!(
            outcome = observability::decision_label(&decision),
            "evaluated booking request"
        );
        Ok(decision)
    }

    /// Evaluate and, on acceptance, persist the reservation as `Pending` —
    /// all under the day's write guard.
    pub async fn submit(
        &self,
        request: &BookingRequest,
    ) -> Result<Result<Reservation, Vec<RejectReason>>, EngineError> {
        self.submit_at(request, now_local()).await
    }

    pub async fn submit_at(
        &self,
        request: &BookingRequest,
        now: NaiveDateTime,
    ) -> Result<Result<Reservation, Vec<RejectReason>>, EngineError> {
        let policy = self.policy.read().await.clone();

        let Some(date) = request.date else {
            metrics::counter!(observability::SUBMISSIONS_TOTAL, "outcome" => "reject")
                .increment(1);
            return match self.decide(request, None, &policy, now)? {
                Decision::Reject(reasons) => Ok(Err(reasons)),
                // A candidate without a date never passes the checks.
                Decision::Accept => Ok(Err(vec![RejectReason::MissingDate])),
            };
        };

        let day = self.store.day_or_create(date);
        let mut guard = day.write().await;
        match self.decide(request, Some(&guard), &policy, now)? {
            Decision::Reject(reasons) => {
                metrics::counter!(observability::SUBMISSIONS_TOTAL, "outcome" => "reject")
                    .increment(1);
                Ok(Err(reasons))
            }
            Decision::Accept => {
                // Acceptance implies the time survived the hours checks.
                let Some(time) = request.time else {
                    return Ok(Err(vec![RejectReason::MissingTime]));
                };
                let reservation = Reservation {
                    id: Ulid::new(),
                    name: request.name.clone(),
                    email: request.email.clone(),
                    phone: request.phone.clone(),
                    date,
                    time,
                    party_size: request.party_size,
                    seating_preference: request.seating_preference,
                    notes: request.notes.clone(),
                    status: ReservationStatus::Pending,
                    tables: Vec::new(),
                    source: request.source,
                };
                guard.insert(reservation.clone());
                self.store.map_reservation(reservation.id, date);
                metrics::counter!(observability::SUBMISSIONS_TOTAL, "outcome" => "accept")
                    .increment(1);
                info!(
                    reservation = %reservation.id,
                    %date,
                    time = %time,
                    party_size = reservation.party_size,
                    "accepted reservation"
                );
                Ok(Ok(reservation))
            }
        }
    }

    fn decide(
        &self,
        request: &BookingRequest,
        day: Option<&DayBook>,
        policy: &PolicyConfig,
        now: NaiveDateTime,
    ) -> Result<Decision, EngineError> {
        let schedule = match request.date {
            Some(date) => calendar::resolve(
                self.store.weekday_hours(date.weekday()).as_ref(),
                self.store.special_day(date).as_ref(),
                now.date(),
            ),
            None => DayStatus::Closed,
        };
        let ctx = EvaluationContext {
            request,
            day,
            schedule: &schedule,
            policy,
            today: now.date(),
            now: now.time(),
        };
        admission::evaluate(&ctx)
    }

    // ── Occupancy ────────────────────────────────────────────

    pub async fn day_timeline(&self, date: NaiveDate) -> DayTimeline {
        self.day_timeline_at(date, now_local()).await
    }

    pub async fn day_timeline_at(&self, date: NaiveDate, now: NaiveDateTime) -> DayTimeline {
        let policy = self.policy.read().await.clone();
        let Some(day) = self.store.day(date) else {
            return DayTimeline::empty();
        };
        let guard = day.read().await;
        timeline::build(
            &guard,
            &self.store.tables_snapshot(),
            policy.dwell(),
            policy.indoor_capacity,
            policy.outdoor_capacity,
            now,
        )
    }

    // ── Tables ───────────────────────────────────────────────

    pub async fn blocked_tables(
        &self,
        id: ReservationId,
    ) -> Result<HashSet<TableId>, EngineError> {
        let policy = self.policy.read().await.clone();
        let day = self.locate(id)?;
        let guard = day.read().await;
        let target = guard
            .get(id)
            .ok_or(EngineError::ReservationNotFound(id))?;
        Ok(conflict::blocked_tables(target, &guard, policy.dwell()))
    }

    /// Assign one table, or clear the assignment with `None`. Clearing
    /// always succeeds; assigning replaces the whole table set.
    pub async fn assign_table(
        &self,
        id: ReservationId,
        table: Option<TableId>,
    ) -> Result<(), EngineError> {
        let policy = self.policy.read().await.clone();
        let day = self.locate(id)?;
        let mut guard = day.write().await;

        let Some(table_id) = table else {
            let target = guard
                .get_mut(id)
                .ok_or(EngineError::ReservationNotFound(id))?;
            target.tables.clear();
            info!(reservation = %id, "cleared table assignment");
            return Ok(());
        };

        let table = self
            .store
            .get_table(&table_id)
            .ok_or(EngineError::TableNotFound(table_id))?;
        if !table.is_active {
            return Err(EngineError::TableInactive(table_id));
        }

        let target = guard
            .get(id)
            .ok_or(EngineError::ReservationNotFound(id))?;
        let blocked = conflict::blocked_tables(target, &guard, policy.dwell());
        if let Err(e) = conflict::validate_assignment(target, table_id, &blocked) {
            metrics::counter!(observability::TABLE_CONFLICTS_TOTAL).increment(1);
            return Err(e);
        }

        let target = guard
            .get_mut(id)
            .ok_or(EngineError::ReservationNotFound(id))?;
        target.tables = vec![table_id];
        info!(reservation = %id, table = %table.label, "assigned table");
        Ok(())
    }

    // ── Reservation records ──────────────────────────────────

    pub async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, EngineError> {
        let day = self.locate(id)?;
        let guard = day.read().await;
        guard
            .get(id)
            .cloned()
            .ok_or(EngineError::ReservationNotFound(id))
    }

    /// The day's reservations sorted by start time, for staff listings.
    pub async fn reservations_for_date(&self, date: NaiveDate) -> Vec<Reservation> {
        let Some(day) = self.store.day(date) else {
            return Vec::new();
        };
        let guard = day.read().await;
        guard.reservations.clone()
    }

    /// Staff status transition. The engine itself never moves a booking
    /// through its lifecycle; it only records the change.
    pub async fn set_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<(), EngineError> {
        let day = self.locate(id)?;
        let mut guard = day.write().await;
        let target = guard
            .get_mut(id)
            .ok_or(EngineError::ReservationNotFound(id))?;
        target.status = status;
        info!(reservation = %id, ?status, "updated reservation status");
        Ok(())
    }

    fn locate(&self, id: ReservationId) -> Result<SharedDayBook, EngineError> {
        let date = self
            .store
            .day_for_reservation(&id)
            .ok_or(EngineError::ReservationNotFound(id))?;
        self.store
            .day(date)
            .ok_or(EngineError::ReservationNotFound(id))
    }
}
