use super::{Direction, Frequency, RecurrenceRule, RuleError, LAST_YEAR};
use crate::weekday::Weekday;
use chrono::{DateTime, Datelike, Month, NaiveDate, NaiveTime};
use rrule::{RRule, RRuleSet, RRuleSetIter, Tz};
use std::iter::FusedIterator;

/// Filtres effectifs : ceux de la règle complétés par les valeurs implicites
/// tirées de DTSTART (RFC 5545).
#[derive(Debug, Clone)]
pub(crate) struct Filters {
    pub(crate) by_weekday: Vec<Weekday>,
    pub(crate) by_month_day: Vec<i8>,
    pub(crate) by_month: Vec<u8>,
}

impl RecurrenceRule {
    pub(crate) fn filters(&self) -> Filters {
        let mut filters = Filters {
            by_weekday: self.by_weekday.clone(),
            by_month_day: self.by_month_day.clone(),
            by_month: self.by_month.clone(),
        };
        let no_day_filter = filters.by_weekday.is_empty() && filters.by_month_day.is_empty();
        let day = self.dtstart.day() as i8;
        match self.freq {
            Frequency::Daily => {}
            Frequency::Weekly => {
                if filters.by_weekday.is_empty() {
                    filters.by_weekday.push(Weekday::every(self.dtstart.weekday()));
                }
            }
            Frequency::Monthly => {
                if no_day_filter {
                    filters.by_month_day.push(day);
                }
            }
            Frequency::Yearly => {
                if no_day_filter {
                    if filters.by_month.is_empty() {
                        filters.by_month.push(self.dtstart.month() as u8);
                    }
                    filters.by_month_day.push(day);
                }
            }
        }
        filters
    }

    /// Ensemble `rrule` équivalent, chaque occurrence à minuit UTC.
    ///
    /// `None` quand UNTIL précède DTSTART : la règle n'a aucune occurrence.
    pub(super) fn to_rrule_set(&self) -> Result<Option<RRuleSet>, RuleError> {
        if self.until.is_some_and(|until| until < self.dtstart) {
            return Ok(None);
        }
        let interval = u16::try_from(self.interval)
            .map_err(|_| RuleError::Invalid("INTERVAL must be at most 65535"))?;
        let mut rrule = RRule::new(self.freq.into())
            .interval(interval)
            .week_start(self.week_start);
        if let Some(count) = self.count {
            rrule = rrule.count(count);
        }
        if let Some(until) = self.until {
            rrule = rrule.until(midnight_utc(until));
        }
        if !self.by_weekday.is_empty() {
            rrule = rrule.by_weekday(self.by_weekday.iter().map(|w| (*w).into()).collect());
        }
        if !self.by_month.is_empty() {
            let months = self
                .by_month
                .iter()
                .map(|m| Month::try_from(*m))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| RuleError::Invalid("BYMONTH values must be within 1..=12"))?;
            rrule = rrule.by_month(&months);
        }
        if !self.by_month_day.is_empty() {
            rrule = rrule.by_month_day(self.by_month_day.clone());
        }
        let set = rrule
            .build(midnight_utc(self.dtstart))
            .map_err(|e| RuleError::Rejected(e.to_string()))?;
        Ok(Some(set.limit()))
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Tz> {
    date.and_time(NaiveTime::MIN).and_utc().with_timezone(&Tz::UTC)
}

/// Itérateur paresseux sur les occurrences d'une règle.
///
/// Vers l'avant, le moteur `rrule` repart toujours de DTSTART (COUNT et
/// l'alignement des périodes en dépendent) ; vers l'arrière, les dates
/// jusqu'à `from` sont matérialisées puis parcourues à rebours.
#[derive(Debug, Clone)]
pub struct Occurrences {
    inner: Inner,
    last_year: i32,
}

#[derive(Debug, Clone)]
enum Inner {
    Forward {
        dates: Option<RRuleSetIter>,
        from: NaiveDate,
        inclusive: bool,
    },
    Backward(std::vec::IntoIter<NaiveDate>),
}

impl Occurrences {
    pub(super) fn new(
        rule: &RecurrenceRule,
        direction: Direction,
        from: NaiveDate,
        inclusive: bool,
    ) -> Self {
        let set = match rule.to_rrule_set() {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(rule = %rule, error = %e, "rule cannot be expanded");
                None
            }
        };
        let dates = set.as_ref().map(|set| set.into_iter());
        let inner = match direction {
            Direction::Forward => Inner::Forward {
                dates,
                from,
                inclusive,
            },
            Direction::Backward => {
                let mut all: Vec<NaiveDate> = dates
                    .into_iter()
                    .flatten()
                    .map(|dt| dt.date_naive())
                    .take_while(|date| *date <= from && date.year() <= LAST_YEAR)
                    .filter(|date| inclusive || *date < from)
                    .collect();
                all.reverse();
                Inner::Backward(all.into_iter())
            }
        };
        Self {
            inner,
            last_year: LAST_YEAR,
        }
    }

    /// Arrête l'itération vers l'avant après l'année donnée.
    pub fn stop_after_year(mut self, year: i32) -> Self {
        self.last_year = year.min(LAST_YEAR);
        self
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        match &mut self.inner {
            Inner::Backward(dates) => dates.next(),
            Inner::Forward {
                dates,
                from,
                inclusive,
            } => loop {
                let Some(date) = dates.as_mut()?.next().map(|dt| dt.date_naive()) else {
                    *dates = None;
                    return None;
                };
                if date.year() > self.last_year {
                    *dates = None;
                    return None;
                }
                if date > *from || (*inclusive && date == *from) {
                    return Some(date);
                }
            },
        }
    }
}

impl FusedIterator for Occurrences {}
