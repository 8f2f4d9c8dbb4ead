use super::{util, Exclusions, OccurrenceResolver, Status};
use crate::telltime::time_format;
use chrono::{NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

// Deux occurrences d'un événement sur plusieurs jours qui commencent le même
// jour ne sont pas distinguées : seule la première est examinée.
pub(super) fn status(resolver: &OccurrenceResolver<'_>, now: NaiveDateTime) -> Option<Status> {
    let span = i64::from(resolver.times.num_days.max(1)) - 1;
    let from = util::add_days(now.date(), -span).and_time(NaiveTime::MIN);
    let Some(found) = resolver.next_occurrence(from) else {
        return Some(Status::Finished);
    };
    if found.start < now && now < found.end {
        return Some(Status::Started);
    }
    // la dernière occurrence vient de se terminer
    if found.end < now && resolver.next_occurrence(now).is_none() {
        return Some(Status::Finished);
    }
    None
}

pub(super) fn when(resolver: &OccurrenceResolver<'_>, now: NaiveDateTime, viewer: Tz) -> String {
    let times = resolver.times;
    let anchor = resolver
        .next_date(now, Exclusions::default())
        .or_else(|| resolver.previous_date(now, Exclusions::default()));
    let Some(date) = anchor else {
        let when = resolver.rule.describe(0, times.num_days);
        let at = time_format(times.time_from, times.time_to, "at ", "to ");
        return format!("{when} {at}").trim().to_string();
    };

    let start = util::shift_zone(times.start_on(date), resolver.tz, viewer);
    let end = util::shift_zone(times.end_for(date), resolver.tz, viewer);
    let offset = (start.date() - date).num_days() as i32;
    let time_from = times.time_from.map(|_| start.time());
    let time_to = times.time_to.map(|_| end.time());

    let out = if start.date() == end.date() {
        format!(
            "{} {}",
            resolver.rule.describe(offset, 1),
            time_format(time_from, time_to, "at ", "to ")
        )
    } else {
        let local_days = (end.date() - start.date()).num_days() + 1;
        format!(
            "{} {}",
            resolver.rule.describe(offset, local_days as u32),
            time_format(time_from, time_to, "starting at ", "finishing at ")
        )
    };
    out.trim().to_string()
}
