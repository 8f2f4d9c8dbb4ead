//! Règle de récurrence inspirée des RRULE de la RFC 5545.
//!
//! - Fréquences journalière à annuelle, intervalle, borne COUNT ou UNTIL.
//! - Filtres BYDAY (simples ou ordinaux), BYMONTHDAY (négatifs = depuis la fin)
//!   et BYMONTH ; WKST pour l'alignement des semaines.
//! - Itération paresseuse et redémarrable dans les deux sens, déléguée au
//!   moteur du crate `rrule`.

mod describe;
mod iter;
mod text;
mod types;

pub use iter::Occurrences;
pub use types::{Direction, Frequency, RuleError};

use crate::weekday::Weekday;
use chrono::{Datelike, NaiveDate};

/// Année au-delà de laquelle l'itération s'arrête d'elle-même.
pub const LAST_YEAR: i32 = 9999;

/// Règle immuable ; l'égalité est structurelle (UNTIL comparé à la date).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct RecurrenceRule {
    dtstart: NaiveDate,
    freq: Frequency,
    interval: u32,
    count: Option<u32>,
    until: Option<NaiveDate>,
    by_weekday: Vec<Weekday>,
    by_month_day: Vec<i8>,
    by_month: Vec<u8>,
    week_start: chrono::Weekday,
}

impl RecurrenceRule {
    pub fn builder(dtstart: NaiveDate, freq: Frequency) -> RuleBuilder {
        RuleBuilder {
            rule: Self {
                dtstart,
                freq,
                interval: 1,
                count: None,
                until: None,
                by_weekday: Vec::new(),
                by_month_day: Vec::new(),
                by_month: Vec::new(),
                week_start: chrono::Weekday::Mon,
            },
        }
    }

    pub fn dtstart(&self) -> NaiveDate {
        self.dtstart
    }
    pub fn freq(&self) -> Frequency {
        self.freq
    }
    pub fn interval(&self) -> u32 {
        self.interval
    }
    pub fn count(&self) -> Option<u32> {
        self.count
    }
    pub fn until(&self) -> Option<NaiveDate> {
        self.until
    }
    pub fn by_weekday(&self) -> &[Weekday] {
        &self.by_weekday
    }
    pub fn by_month_day(&self) -> &[i8] {
        &self.by_month_day
    }
    pub fn by_month(&self) -> &[u8] {
        &self.by_month
    }
    pub fn week_start(&self) -> chrono::Weekday {
        self.week_start
    }

    pub fn is_bounded(&self) -> bool {
        self.count.is_some() || self.until.is_some()
    }

    /// Séquence paresseuse des occurrences à partir de `from`.
    /// Chaque appel repart de zéro.
    pub fn iterate(&self, direction: Direction, from: NaiveDate, inclusive: bool) -> Occurrences {
        Occurrences::new(self, direction, from, inclusive)
    }

    /// Toutes les occurrences, dans l'ordre, depuis DTSTART.
    pub fn iter(&self) -> Occurrences {
        self.iterate(Direction::Forward, self.dtstart, true)
    }

    pub fn after(&self, date: NaiveDate, inclusive: bool) -> Option<NaiveDate> {
        self.iterate(Direction::Forward, date, inclusive).next()
    }

    pub fn before(&self, date: NaiveDate, inclusive: bool) -> Option<NaiveDate> {
        self.iterate(Direction::Backward, date, inclusive).next()
    }

    /// Occurrences dans `[from, to]` (bornes incluses).
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        self.iterate(Direction::Forward, from, true)
            .take_while(move |date| *date <= to)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if date < self.dtstart || self.until.is_some_and(|until| date > until) {
            return false;
        }
        self.after(date, true) == Some(date)
    }

    /// Nombre réel d'occurrences ; uniquement pour une règle bornée.
    pub fn occurrence_count(&self) -> Result<usize, RuleError> {
        if !self.is_bounded() {
            return Err(RuleError::Unbounded);
        }
        Ok(self.iter().count())
    }
}

/// Construction validée d'une [`RecurrenceRule`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    rule: RecurrenceRule,
}

impl RuleBuilder {
    pub fn interval(mut self, interval: u32) -> Self {
        self.rule.interval = interval;
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.rule.count = Some(count);
        self
    }

    pub fn until(mut self, until: NaiveDate) -> Self {
        self.rule.until = Some(until);
        self
    }

    pub fn by_weekday<I: IntoIterator<Item = Weekday>>(mut self, days: I) -> Self {
        self.rule.by_weekday = days.into_iter().collect();
        self
    }

    pub fn by_month_day<I: IntoIterator<Item = i8>>(mut self, days: I) -> Self {
        self.rule.by_month_day = days.into_iter().collect();
        self
    }

    pub fn by_month<I: IntoIterator<Item = u8>>(mut self, months: I) -> Self {
        self.rule.by_month = months.into_iter().collect();
        self
    }

    pub fn week_start(mut self, day: chrono::Weekday) -> Self {
        self.rule.week_start = day;
        self
    }

    pub fn build(self) -> Result<RecurrenceRule, RuleError> {
        let mut rule = self.rule;
        if rule.interval == 0 {
            return Err(RuleError::Invalid("INTERVAL must be positive"));
        }
        if rule.count.is_some() && rule.until.is_some() {
            return Err(RuleError::Invalid("COUNT and UNTIL are mutually exclusive"));
        }
        if rule.count == Some(0) {
            return Err(RuleError::Invalid("COUNT must be positive"));
        }
        if rule.by_month.iter().any(|m| !(1..=12).contains(m)) {
            return Err(RuleError::Invalid("BYMONTH values must be within 1..=12"));
        }
        if rule
            .by_month_day
            .iter()
            .any(|d| *d == 0 || !(-31..=31).contains(d))
        {
            return Err(RuleError::Invalid("BYMONTHDAY values must be within -31..=31, not 0"));
        }
        if rule.by_weekday.iter().any(|w| !(-53..=53).contains(&w.ordinal())) {
            return Err(RuleError::Invalid("BYDAY ordinals must be within -53..=53"));
        }
        let ordinals = rule.by_weekday.iter().any(|w| !w.is_every());
        if ordinals && matches!(rule.freq, Frequency::Daily | Frequency::Weekly) {
            return Err(RuleError::Invalid(
                "ordinal BYDAY values need a MONTHLY or YEARLY frequency",
            ));
        }
        if rule.dtstart.year() > LAST_YEAR {
            return Err(RuleError::Invalid("DTSTART is too far in the future"));
        }
        rule.by_month.sort_unstable();
        rule.by_month.dedup();
        rule.by_month_day.sort_unstable();
        rule.by_month_day.dedup();
        // limites propres au moteur, ex. ordinal BYDAY mensuel dans -4..=5
        rule.to_rrule_set()?;
        Ok(rule)
    }
}
