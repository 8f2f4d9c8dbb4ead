use super::{util, EventsOnDay, Occurrence, OccurrenceResolver, ResolveError, SourceKind};
use crate::overlay::{Classification, ExceptionRecord, RecordKind};
use chrono::{NaiveDate, NaiveDateTime};

pub(super) fn occurrences_in_range(
    resolver: &OccurrenceResolver<'_>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Occurrence>, ResolveError> {
    if to < from {
        return Err(ResolveError::InvalidRange { from, to });
    }
    let times = resolver.times;
    let overlay = resolver.overlay;
    // une occurrence sur plusieurs jours peut avoir commencé avant `from`
    let lead = i64::from(times.num_days.max(1)) - 1;
    let mut out = Vec::new();

    for date in resolver.rule.between(util::add_days(from, -lead), to) {
        let (source, title, details, record) = match overlay.classify(date, resolver.holidays) {
            Classification::None => (SourceKind::Base, resolver.title.clone(), String::new(), None),
            Classification::Annotated(info) => {
                let title = if info.title.is_empty() {
                    resolver.title.clone()
                } else {
                    info.title.clone()
                };
                (SourceKind::Base, title, info.details.clone(), Some(RecordKind::ExtraInfo))
            }
            Classification::Cancelled(cancelled) => (
                SourceKind::Suppressed,
                cancelled.title().to_string(),
                cancelled.details().to_string(),
                Some(cancelled.kind()),
            ),
            Classification::Postponed(postponement) => (
                SourceKind::Suppressed,
                postponement.cancellation_title.clone(),
                postponement.cancellation_details.clone(),
                Some(RecordKind::Postponement),
            ),
        };
        out.push(Occurrence {
            date,
            start: times.start_on(date),
            end: times.end_for(date),
            num_days: times.num_days.max(1),
            title,
            details,
            source,
            record,
            continuing: date < from,
        });
    }

    for postponement in overlay.postponements() {
        if postponement.to_date > to || postponement.end().date() < from {
            continue;
        }
        let title = if postponement.title.is_empty() {
            resolver.title.clone()
        } else {
            postponement.title.clone()
        };
        out.push(Occurrence {
            date: postponement.to_date,
            start: postponement.start(),
            end: postponement.end(),
            num_days: postponement.num_days.max(1),
            title,
            details: postponement.details.clone(),
            source: SourceKind::Postponed,
            record: Some(RecordKind::Postponement),
            continuing: postponement.to_date < from,
        });
    }

    out.sort_by_key(|occ| occ.start);
    tracing::trace!(%from, %to, found = out.len(), "occurrences resolved");
    Ok(out)
}

/// Regroupe les occurrences affichables par jour de calendrier.
pub(super) fn by_day(
    resolver: &OccurrenceResolver<'_>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<EventsOnDay>, ResolveError> {
    let occurrences = occurrences_in_range(resolver, from, to)?;
    let mut days: Vec<EventsOnDay> = util::days_between(from, to)
        .map(|date| EventsOnDay {
            date,
            holiday: resolver.holidays.map(|h| h.get(date)).unwrap_or_default(),
            days_events: Vec::new(),
            continuing_events: Vec::new(),
        })
        .collect();

    for occurrence in occurrences.into_iter().filter(Occurrence::is_displayed) {
        let first = occurrence.date;
        for date in util::days_between(first, occurrence.last_day()) {
            if date < from {
                continue;
            }
            let Ok(index) = usize::try_from((date - from).num_days()) else {
                continue;
            };
            let Some(day) = days.get_mut(index) else {
                break;
            };
            if date == first {
                day.days_events.push(occurrence.clone());
            } else {
                day.continuing_events.push(occurrence.clone());
            }
        }
    }
    Ok(days)
}

pub(super) fn future_exceptions(
    resolver: &OccurrenceResolver<'_>,
    now: NaiveDateTime,
) -> Vec<ExceptionRecord> {
    let overlay = resolver.overlay;
    let today = now.date();
    let mut dated: Vec<(NaiveDate, ExceptionRecord)> = Vec::new();

    dated.extend(
        overlay
            .extra_info()
            .filter(|info| info.date >= today)
            .map(|info| (info.date, info.clone().into())),
    );
    dated.extend(
        overlay
            .cancellations()
            .filter(|c| c.date >= today)
            .map(|c| (c.date, c.clone().into())),
    );
    dated.extend(
        overlay
            .postponements()
            .filter(|p| p.from_date >= today || p.end() >= now)
            .map(|p| (p.from_date.min(p.to_date), p.clone().into())),
    );
    dated.extend(
        overlay
            .shutdowns()
            .filter(|s| s.to_date.map_or(true, |to| to >= today))
            .map(|s| (s.from_date.max(today), s.clone().into())),
    );
    dated.sort_by_key(|(date, _)| *date);

    let mut out: Vec<ExceptionRecord> = dated.into_iter().map(|(_, record)| record).collect();
    if let Some(closure) = overlay.holiday_closure() {
        out.push(closure.clone().into());
    }
    out
}
