use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Heure locale de l'événement correspondant à un instant absolu.
pub fn localize(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Convertit une heure locale de `from` vers l'heure locale de `to`.
/// Une heure inexistante (passage à l'heure d'été) est laissée telle quelle.
pub(super) fn shift_zone(local: NaiveDateTime, from: Tz, to: Tz) -> NaiveDateTime {
    match from.from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&to).naive_local(),
        None => local,
    }
}

pub(super) fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

pub(super) fn days_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}
