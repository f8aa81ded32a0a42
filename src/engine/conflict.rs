use std::collections::HashSet;

use chrono::Duration;

use crate::model::{DayBook, Reservation, TableId};

use super::EngineError;

/// Tables a reservation may not take: every table attached to another
/// same-day reservation whose dwell window overlaps. Cancelled and
/// no-show bookings release their tables; the target's own tables are
/// never a self-conflict.
pub fn blocked_tables(
    target: &Reservation,
    day: &DayBook,
    dwell: Duration,
) -> HashSet<TableId> {
    let window = target.window(dwell);
    let mut blocked = HashSet::new();
    for other in day.overlapping(&window, dwell) {
        if other.id == target.id {
            continue;
        }
        if !other.status.occupies_tables() {
            continue;
        }
        blocked.extend(other.tables.iter().copied());
    }
    for own in &target.tables {
        blocked.remove(own);
    }
    blocked
}

/// A blocked table may still be "assigned" when it is already the
/// target's — re-picking the current table is a no-op, not a conflict.
pub fn validate_assignment(
    target: &Reservation,
    table_id: TableId,
    blocked: &HashSet<TableId>,
) -> Result<(), EngineError> {
    if blocked.contains(&table_id) && !target.tables.contains(&table_id) {
        return Err(EngineError::TableInUse(table_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BookingSource, ReservationStatus, SeatingPreference,
    };
    use chrono::{NaiveDate, NaiveTime};
    use ulid::Ulid;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        format!("{s}:00").parse().unwrap()
    }

    fn reservation(time: &str, tables: Vec<TableId>) -> Reservation {
        Reservation {
            id: Ulid::new(),
            name: "Mara".into(),
            email: "mara@example.com".into(),
            phone: "555-0104".into(),
            date: d("2030-06-15"),
            time: t(time),
            party_size: 4,
            seating_preference: SeatingPreference::NoPreference,
            notes: String::new(),
            status: ReservationStatus::Confirmed,
            tables,
            source: BookingSource::Online,
        }
    }

    fn day_with(reservations: Vec<Reservation>) -> DayBook {
        let mut book = DayBook::new(d("2030-06-15"));
        for r in reservations {
            book.insert(r);
        }
        book
    }

    fn dwell() -> Duration {
        Duration::minutes(90)
    }

    #[test]
    fn overlapping_reservations_block_their_tables() {
        let t1 = Ulid::new();
        let t2 = Ulid::new();
        let t3 = Ulid::new();
        let target = reservation("19:00", vec![]);
        let day = day_with(vec![
            target.clone(),
            reservation("18:00", vec![t1]),      // ends 19:30, overlaps
            reservation("19:30", vec![t2]),      // overlaps
            reservation("17:00", vec![t3]),      // ends 18:30, clear
        ]);
        let blocked = blocked_tables(&target, &day, dwell());
        assert!(blocked.contains(&t1));
        assert!(blocked.contains(&t2));
        assert!(!blocked.contains(&t3));
    }

    #[test]
    fn own_tables_are_not_a_self_conflict() {
        let shared = Ulid::new();
        let mut target = reservation("19:00", vec![shared]);
        target.status = ReservationStatus::Seated;
        let day = day_with(vec![target.clone()]);
        let blocked = blocked_tables(&target, &day, dwell());
        assert!(blocked.is_empty());
    }

    #[test]
    fn cancelled_and_no_show_release_their_tables() {
        let t1 = Ulid::new();
        let t2 = Ulid::new();
        let mut cancelled = reservation("19:00", vec![t1]);
        cancelled.status = ReservationStatus::Cancelled;
        let mut no_show = reservation("19:00", vec![t2]);
        no_show.status = ReservationStatus::NoShow;
        let target = reservation("19:00", vec![]);
        let day = day_with(vec![target.clone(), cancelled, no_show]);
        assert!(blocked_tables(&target, &day, dwell()).is_empty());
    }

    #[test]
    fn adjacent_windows_do_not_block() {
        let t1 = Ulid::new();
        let target = reservation("19:30", vec![]);
        // Ends exactly 19:30.
        let day = day_with(vec![target.clone(), reservation("18:00", vec![t1])]);
        assert!(blocked_tables(&target, &day, dwell()).is_empty());
    }

    #[test]
    fn assignment_of_blocked_table_is_a_conflict() {
        let taken = Ulid::new();
        let target = reservation("19:00", vec![]);
        let blocked = HashSet::from([taken]);
        assert!(matches!(
            validate_assignment(&target, taken, &blocked),
            Err(EngineError::TableInUse(id)) if id == taken
        ));
    }

    #[test]
    fn reassigning_own_table_is_idempotent() {
        let own = Ulid::new();
        let target = reservation("19:00", vec![own]);
        // Even if the set says blocked (another record shares the table),
        // re-picking the current table goes through.
        let blocked = HashSet::from([own]);
        assert!(validate_assignment(&target, own, &blocked).is_ok());
    }

    #[test]
    fn free_table_passes() {
        let free = Ulid::new();
        let target = reservation("19:00", vec![]);
        assert!(validate_assignment(&target, free, &HashSet::new()).is_ok());
    }
}
