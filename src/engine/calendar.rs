use chrono::{NaiveDate, NaiveTime};

use crate::model::{OpeningHours, SpecialOpeningDay};

/// The bookable state of one calendar date after applying the weekday
/// row and any special-day override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayStatus {
    Closed,
    /// A special day whose online booking window has not opened yet.
    NotYetBookable { opens_on: NaiveDate },
    Open {
        open: NaiveTime,
        /// Last time a new reservation may start, inclusive.
        last_reservation: NaiveTime,
        message: Option<String>,
    },
}

/// Resolve the effective schedule for `date`. A special day fully
/// supersedes the weekday rule; its custom times are optional and fall
/// back to the weekday row's times when absent. An open day with no
/// resolvable hours is treated as closed.
pub fn resolve(
    weekday_rule: Option<&OpeningHours>,
    special: Option<&SpecialOpeningDay>,
    today: NaiveDate,
) -> DayStatus {
    if let Some(special) = special {
        if today < special.bookings_open_from {
            return DayStatus::NotYetBookable {
                opens_on: special.bookings_open_from,
            };
        }
        if !special.is_open {
            return DayStatus::Closed;
        }
        let weekday_open = weekday_rule.filter(|r| r.is_open);
        let open = special
            .open_time
            .or_else(|| weekday_open.and_then(|r| r.open_time));
        let last = special
            .last_reservation_time
            .or(special.close_time)
            .or_else(|| weekday_open.and_then(|r| r.effective_last_reservation_time()));
        return match (open, last) {
            (Some(open), Some(last_reservation)) => DayStatus::Open {
                open,
                last_reservation,
                message: special.public_message.clone(),
            },
            _ => DayStatus::Closed,
        };
    }

    match weekday_rule {
        Some(rule) if rule.is_open => {
            match (rule.open_time, rule.effective_last_reservation_time()) {
                (Some(open), Some(last_reservation)) => DayStatus::Open {
                    open,
                    last_reservation,
                    message: None,
                },
                _ => DayStatus::Closed,
            }
        }
        _ => DayStatus::Closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        format!("{s}:00").parse().unwrap()
    }

    fn weekday_row() -> OpeningHours {
        OpeningHours {
            weekday: Weekday::Wed,
            is_open: true,
            open_time: Some(t("12:00")),
            close_time: Some(t("22:00")),
            last_reservation_time: Some(t("21:00")),
        }
    }

    fn christmas() -> SpecialOpeningDay {
        SpecialOpeningDay {
            date: d("2030-12-25"),
            is_open: true,
            bookings_open_from: d("2030-12-01"),
            public_message: Some("Set menu only.".into()),
            open_time: Some(t("13:00")),
            close_time: Some(t("20:00")),
            last_reservation_time: None,
        }
    }

    #[test]
    fn plain_weekday_resolves_to_its_hours() {
        let row = weekday_row();
        let status = resolve(Some(&row), None, d("2030-06-01"));
        assert_eq!(
            status,
            DayStatus::Open {
                open: t("12:00"),
                last_reservation: t("21:00"),
                message: None,
            }
        );
    }

    #[test]
    fn missing_or_closed_weekday_row_means_closed() {
        assert_eq!(resolve(None, None, d("2030-06-01")), DayStatus::Closed);
        let row = OpeningHours {
            is_open: false,
            ..weekday_row()
        };
        assert_eq!(resolve(Some(&row), None, d("2030-06-01")), DayStatus::Closed);
    }

    #[test]
    fn open_row_without_times_means_closed() {
        let row = OpeningHours {
            open_time: None,
            close_time: None,
            last_reservation_time: None,
            ..weekday_row()
        };
        assert_eq!(resolve(Some(&row), None, d("2030-06-01")), DayStatus::Closed);
    }

    #[test]
    fn special_day_window_not_open_yet() {
        let row = weekday_row();
        let special = christmas();
        let status = resolve(Some(&row), Some(&special), d("2030-11-20"));
        assert_eq!(
            status,
            DayStatus::NotYetBookable {
                opens_on: d("2030-12-01")
            }
        );
        // On the open date itself the window is open.
        assert!(matches!(
            resolve(Some(&row), Some(&special), d("2030-12-01")),
            DayStatus::Open { .. }
        ));
    }

    #[test]
    fn special_day_custom_hours_override_weekday() {
        let row = weekday_row();
        let special = christmas();
        let status = resolve(Some(&row), Some(&special), d("2030-12-10"));
        // Custom open, last-reservation falls back to the special close.
        assert_eq!(
            status,
            DayStatus::Open {
                open: t("13:00"),
                last_reservation: t("20:00"),
                message: Some("Set menu only.".into()),
            }
        );
    }

    #[test]
    fn special_day_without_custom_hours_uses_weekday_times() {
        let row = weekday_row();
        let special = SpecialOpeningDay {
            open_time: None,
            close_time: None,
            public_message: None,
            ..christmas()
        };
        let status = resolve(Some(&row), Some(&special), d("2030-12-10"));
        assert_eq!(
            status,
            DayStatus::Open {
                open: t("12:00"),
                last_reservation: t("21:00"),
                message: None,
            }
        );
    }

    #[test]
    fn special_day_closed_beats_open_weekday() {
        let row = weekday_row();
        let special = SpecialOpeningDay {
            is_open: false,
            ..christmas()
        };
        assert_eq!(
            resolve(Some(&row), Some(&special), d("2030-12-10")),
            DayStatus::Closed
        );
    }
}
