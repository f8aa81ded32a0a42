use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::model::{
    DayBook, OpeningHours, ReservationId, SpecialOpeningDay, Table, TableId,
};

pub type SharedDayBook = Arc<RwLock<DayBook>>;

/// In-memory record store. Days are the locking unit: one shared
/// `DayBook` per date, so an admission check and the insert that follows
/// it can run under a single write guard. Tables and calendar rows are
/// plain keyed maps — the map key enforces the one-row-per-weekday and
/// one-row-per-date invariants.
pub struct InMemoryStore {
    days: DashMap<NaiveDate, SharedDayBook>,
    /// Reverse lookup: reservation id → date.
    reservation_to_day: DashMap<ReservationId, NaiveDate>,
    tables: DashMap<TableId, Table>,
    weekday_hours: DashMap<Weekday, OpeningHours>,
    special_days: DashMap<NaiveDate, SpecialOpeningDay>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            days: DashMap::new(),
            reservation_to_day: DashMap::new(),
            tables: DashMap::new(),
            weekday_hours: DashMap::new(),
            special_days: DashMap::new(),
        }
    }

    // ── Days ─────────────────────────────────────────────────

    pub fn day(&self, date: NaiveDate) -> Option<SharedDayBook> {
        self.days.get(&date).map(|e| e.value().clone())
    }

    pub fn day_or_create(&self, date: NaiveDate) -> SharedDayBook {
        self.days
            .entry(date)
            .or_insert_with(|| Arc::new(RwLock::new(DayBook::new(date))))
            .value()
            .clone()
    }

    // ── Reservation index ────────────────────────────────────

    pub fn day_for_reservation(&self, id: &ReservationId) -> Option<NaiveDate> {
        self.reservation_to_day.get(id).map(|e| *e.value())
    }

    pub fn map_reservation(&self, id: ReservationId, date: NaiveDate) {
        self.reservation_to_day.insert(id, date);
    }

    // ── Tables ───────────────────────────────────────────────

    pub fn upsert_table(&self, table: Table) {
        self.tables.insert(table.id, table);
    }

    pub fn get_table(&self, id: &TableId) -> Option<Table> {
        self.tables.get(id).map(|e| e.value().clone())
    }

    pub fn active_tables(&self) -> Vec<Table> {
        let mut tables: Vec<Table> = self
            .tables
            .iter()
            .filter(|e| e.value().is_active)
            .map(|e| e.value().clone())
            .collect();
        tables.sort_by(|a, b| a.label.cmp(&b.label));
        tables
    }

    pub fn tables_snapshot(&self) -> HashMap<TableId, Table> {
        self.tables
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect()
    }

    // ── Calendar ─────────────────────────────────────────────

    pub fn set_weekday_hours(&self, row: OpeningHours) {
        self.weekday_hours.insert(row.weekday, row);
    }

    pub fn weekday_hours(&self, weekday: Weekday) -> Option<OpeningHours> {
        self.weekday_hours.get(&weekday).map(|e| e.value().clone())
    }

    pub fn set_special_day(&self, row: SpecialOpeningDay) {
        self.special_days.insert(row.date, row);
    }

    pub fn special_day(&self, date: NaiveDate) -> Option<SpecialOpeningDay> {
        self.special_days.get(&date).map(|e| e.value().clone())
    }
}
