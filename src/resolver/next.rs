use super::{Exclusions, FoundOccurrence, OccurrenceResolver};
use crate::overlay::{Cancelled, Classification};
use crate::rule::Direction;
use chrono::{NaiveDate, NaiveDateTime};

enum Verdict {
    Keep,
    Skip,
    /// Fermeture jusqu'à nouvel ordre : plus rien après.
    Stop,
}

fn verdict(resolver: &OccurrenceResolver<'_>, date: NaiveDate, exclude: Exclusions) -> Verdict {
    if exclude.cancellations {
        match resolver.overlay.classify(date, resolver.holidays) {
            Classification::Cancelled(Cancelled::Extended(shutdown)) if shutdown.is_open_ended() => {
                return Verdict::Stop;
            }
            Classification::Cancelled(_) | Classification::Postponed(_) => return Verdict::Skip,
            Classification::Annotated(_) | Classification::None => {}
        }
    }
    if exclude.extra_info
        && resolver
            .overlay
            .extra_info_on(date)
            .is_some_and(|info| !info.title.is_empty())
    {
        return Verdict::Skip;
    }
    Verdict::Keep
}

/// Première occurrence non écartée à partir de `from`. Une occurrence du
/// jour n'est retenue que si elle n'a pas encore commencé.
pub(super) fn after(
    resolver: &OccurrenceResolver<'_>,
    from: NaiveDateTime,
    exclude: Exclusions,
) -> Option<NaiveDate> {
    let mut from_date = from.date();
    if resolver.times.time_from.is_some_and(|t| t < from.time()) {
        from_date = from_date.succ_opt()?;
    }
    let max = resolver.options.max_iterations;
    let occurrences = resolver
        .rule
        .iterate(Direction::Forward, from_date, true)
        .stop_after_year(resolver.options.far_year);
    let mut examined = 0usize;
    for date in occurrences.take(max) {
        examined += 1;
        match verdict(resolver, date, exclude) {
            Verdict::Keep => return Some(date),
            Verdict::Skip => continue,
            Verdict::Stop => return None,
        }
    }
    if examined == max {
        tracing::warn!(%from_date, max, "no live occurrence within the safety bound");
    }
    None
}

pub(super) fn before(
    resolver: &OccurrenceResolver<'_>,
    from: NaiveDateTime,
    exclude: Exclusions,
) -> Option<NaiveDate> {
    let mut from_date = from.date();
    if resolver.times.time_from.is_some_and(|t| t > from.time()) {
        from_date = from_date.pred_opt()?;
    }
    resolver
        .rule
        .iterate(Direction::Backward, from_date, true)
        .find(|date| matches!(verdict(resolver, *date, exclude), Verdict::Keep))
}

fn base<'a>(resolver: &OccurrenceResolver<'a>, date: NaiveDate) -> FoundOccurrence<'a> {
    FoundOccurrence {
        date,
        start: resolver.times.start_on(date),
        end: resolver.times.end_for(date),
        postponement: None,
    }
}

/// Cherche l'occurrence ordinaire suivante, puis vérifie qu'aucun report
/// n'arrive avant elle : un report peut avancer une occurrence plus tardive.
pub(super) fn next_occurrence<'a>(
    resolver: &OccurrenceResolver<'a>,
    from: NaiveDateTime,
) -> Option<FoundOccurrence<'a>> {
    let overlay = resolver.overlay;
    match after(resolver, from, Exclusions::default()) {
        Some(date) => {
            let found = base(resolver, date);
            overlay
                .postponements_to(from.date(), date)
                .into_iter()
                .find(|p| p.start() < found.start && p.end() >= from)
                .map(|p| FoundOccurrence {
                    date: p.to_date,
                    start: p.start(),
                    end: p.end(),
                    postponement: Some(p),
                })
                .or(Some(found))
        }
        None => overlay
            .postponements_to(from.date(), NaiveDate::MAX)
            .into_iter()
            .find(|p| p.end() >= from)
            .map(|p| FoundOccurrence {
                date: p.to_date,
                start: p.start(),
                end: p.end(),
                postponement: Some(p),
            }),
    }
}

/// Symétrique de [`next_occurrence`] : le dernier report commencé après
/// l'occurrence ordinaire précédente l'emporte.
pub(super) fn previous_occurrence<'a>(
    resolver: &OccurrenceResolver<'a>,
    from: NaiveDateTime,
) -> Option<FoundOccurrence<'a>> {
    let overlay = resolver.overlay;
    let found = before(resolver, from, Exclusions::default()).map(|date| base(resolver, date));
    let lower = found.map_or(NaiveDate::MIN, |f| f.date);
    overlay
        .postponements_to(lower, from.date())
        .into_iter()
        .rev()
        .find(|p| p.start() <= from && found.map_or(true, |f| p.start() > f.start))
        .map(|p| FoundOccurrence {
            date: p.to_date,
            start: p.start(),
            end: p.end(),
            postponement: Some(p),
        })
        .or(found)
}
