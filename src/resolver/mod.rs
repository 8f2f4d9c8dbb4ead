//! Résolution des occurrences : règle + surcouche d'exceptions.
//!
//! Toutes les requêtes se font en heure locale de l'événement
//! (voir [`localize`] pour partir d'un instant UTC).

mod next;
mod range;
mod status;
mod types;
mod util;

pub use types::{
    EventsOnDay, Exclusions, FoundOccurrence, Occurrence, ResolveError, ResolverOptions,
    SourceKind, Status,
};
pub use util::localize;

use crate::holidays::HolidayLookup;
use crate::overlay::{ExceptionOverlay, ExceptionRecord};
use crate::rule::RecurrenceRule;
use crate::telltime::EventTimes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Résolveur sans état : chaque requête est une fonction pure de la règle,
/// de la surcouche et des paramètres.
#[derive(Clone)]
pub struct OccurrenceResolver<'a> {
    rule: &'a RecurrenceRule,
    overlay: &'a ExceptionOverlay,
    times: EventTimes,
    holidays: Option<&'a dyn HolidayLookup>,
    options: ResolverOptions,
    tz: Tz,
    title: String,
}

impl fmt::Debug for OccurrenceResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccurrenceResolver")
            .field("rule", &self.rule.to_string())
            .field("times", &self.times)
            .field("holidays", &self.holidays.is_some())
            .field("options", &self.options)
            .field("tz", &self.tz)
            .finish()
    }
}

impl<'a> OccurrenceResolver<'a> {
    pub fn new(rule: &'a RecurrenceRule, overlay: &'a ExceptionOverlay, times: EventTimes) -> Self {
        Self {
            rule,
            overlay,
            times,
            holidays: None,
            options: ResolverOptions::default(),
            tz: Tz::UTC,
            title: String::new(),
        }
    }

    pub fn holidays(mut self, holidays: &'a dyn HolidayLookup) -> Self {
        self.holidays = Some(holidays);
        self
    }

    pub fn options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Fuseau de l'événement, utilisé par les requêtes sur instants absolus.
    pub fn timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Titre affiché pour les occurrences ordinaires.
    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    pub fn rule(&self) -> &RecurrenceRule {
        self.rule
    }

    pub fn overlay(&self) -> &ExceptionOverlay {
        self.overlay
    }

    pub fn times(&self) -> EventTimes {
        self.times
    }

    /// Une occurrence commence-t-elle ce jour-là ? Les reports n'en créent pas.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.rule.contains(date) && !self.overlay.classify(date, self.holidays).removes_occurrence()
    }

    pub fn next_date(&self, from: NaiveDateTime, exclude: Exclusions) -> Option<NaiveDate> {
        next::after(self, from, exclude)
    }

    pub fn previous_date(&self, from: NaiveDateTime, exclude: Exclusions) -> Option<NaiveDate> {
        next::before(self, from, exclude)
    }

    /// Prochaine occurrence, reports compris.
    pub fn next_occurrence(&self, from: NaiveDateTime) -> Option<FoundOccurrence<'a>> {
        next::next_occurrence(self, from)
    }

    /// Occurrence précédente, reports compris.
    pub fn previous_occurrence(&self, from: NaiveDateTime) -> Option<FoundOccurrence<'a>> {
        next::previous_occurrence(self, from)
    }

    /// Première occurrence de la règle, annulée ou non.
    pub fn first_occurrence(&self) -> Option<NaiveDate> {
        let start = self.rule.dtstart().and_time(chrono::NaiveTime::MIN);
        next::after(self, start, Exclusions::NONE)
    }

    pub fn status(&self, now: NaiveDateTime) -> Option<Status> {
        status::status(self, now)
    }

    pub fn status_text(&self, now: NaiveDateTime) -> &'static str {
        match self.status(now) {
            Some(Status::Finished) => "These events have finished.",
            Some(Status::Started) => "This event has started.",
            None => "",
        }
    }

    /// Description de la récurrence, dans le fuseau de l'événement.
    pub fn when(&self, now: NaiveDateTime) -> String {
        status::when(self, now, self.tz)
    }

    /// Description de la récurrence vue depuis le fuseau `viewer`.
    pub fn when_viewed_in(&self, now: DateTime<Utc>, viewer: Tz) -> String {
        status::when(self, localize(now, self.tz), viewer)
    }

    pub fn occurrences_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Occurrence>, ResolveError> {
        range::occurrences_in_range(self, from, to)
    }

    pub fn by_day(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<EventsOnDay>, ResolveError> {
        range::by_day(self, from, to)
    }

    /// Exceptions qui concernent encore l'avenir.
    pub fn future_exceptions(&self, now: NaiveDateTime) -> Vec<ExceptionRecord> {
        range::future_exceptions(self, now)
    }
}
