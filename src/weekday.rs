use crate::rule::RuleError;
use crate::telltime::to_ordinal;
use std::fmt;
use std::str::FromStr;

const NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const PLURAL_NAMES: [&str; 7] = [
    "Mondays",
    "Tuesdays",
    "Wednesdays",
    "Thursdays",
    "Fridays",
    "Saturdays",
    "Sundays",
];

const CODES: [&str; 7] = ["MO", "TU", "WE", "TH", "FR", "SA", "SU"];

/// Jour de la semaine, éventuellement qualifié par un ordinal
/// (`+3TU` = 3e mardi, `-1FR` = dernier vendredi). Un ordinal nul signifie
/// « chaque » occurrence de ce jour dans la période.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weekday {
    day: chrono::Weekday,
    ordinal: i8,
}

pub const MO: Weekday = Weekday::every(chrono::Weekday::Mon);
pub const TU: Weekday = Weekday::every(chrono::Weekday::Tue);
pub const WE: Weekday = Weekday::every(chrono::Weekday::Wed);
pub const TH: Weekday = Weekday::every(chrono::Weekday::Thu);
pub const FR: Weekday = Weekday::every(chrono::Weekday::Fri);
pub const SA: Weekday = Weekday::every(chrono::Weekday::Sat);
pub const SU: Weekday = Weekday::every(chrono::Weekday::Sun);

pub const WEEKDAYS: [Weekday; 5] = [MO, TU, WE, TH, FR];
pub const EVERYDAY: [Weekday; 7] = [MO, TU, WE, TH, FR, SA, SU];

impl Weekday {
    pub const fn every(day: chrono::Weekday) -> Self {
        Self { day, ordinal: 0 }
    }

    /// Même jour, qualifié par `n` (négatif = compté depuis la fin).
    pub const fn nth(self, n: i8) -> Self {
        Self {
            day: self.day,
            ordinal: n,
        }
    }

    pub fn day(&self) -> chrono::Weekday {
        self.day
    }

    pub fn ordinal(&self) -> i8 {
        self.ordinal
    }

    pub fn is_every(&self) -> bool {
        self.ordinal == 0
    }

    fn index(&self) -> usize {
        self.day.num_days_from_monday() as usize
    }

    /// "Monday", "third Friday", ou avec `offset != 0` le jour réellement
    /// affiché : "Thursday before the second Friday".
    pub fn describe(&self, offset: i32) -> String {
        self.describe_with(offset, &NAMES)
    }

    /// Variante au pluriel pour les règles hebdomadaires ("Mondays").
    pub fn describe_plural(&self, offset: i32) -> String {
        self.describe_with(offset, &PLURAL_NAMES)
    }

    fn describe_with(&self, offset: i32, names: &[&str; 7]) -> String {
        let weekday = names[self.index()];
        if offset == 0 {
            return if self.is_every() {
                weekday.to_string()
            } else {
                format!("{} {}", to_ordinal(i32::from(self.ordinal)), NAMES[self.index()])
            };
        }
        let shifted = (self.index() as i32 + offset).rem_euclid(7) as usize;
        let local = names[shifted];
        if self.is_every() {
            return local.to_string();
        }
        let ordinal = to_ordinal(i32::from(self.ordinal));
        let when = NAMES[self.index()];
        if offset < 0 {
            format!("{local} before the {ordinal} {when}")
        } else {
            format!("{local} after the {ordinal} {when}")
        }
    }

    /// Forme courte RRULE : "MO", "+2FR", "-1SU".
    pub fn short_form(&self) -> String {
        let code = CODES[self.index()];
        if self.is_every() {
            code.to_string()
        } else {
            format!("{:+}{code}", self.ordinal)
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::every(day)
    }
}

impl From<Weekday> for rrule::NWeekday {
    fn from(weekday: Weekday) -> Self {
        let n = (!weekday.is_every()).then_some(i16::from(weekday.ordinal));
        Self::new(n, weekday.day)
    }
}

impl TryFrom<rrule::NWeekday> for Weekday {
    type Error = RuleError;

    fn try_from(value: rrule::NWeekday) -> Result<Self, Self::Error> {
        match value {
            rrule::NWeekday::Every(day) => Ok(Self::every(day)),
            rrule::NWeekday::Nth(n, day) => i8::try_from(n)
                .ok()
                .filter(|n| *n != 0 && (-53..=53).contains(n))
                .map(|n| Self::every(day).nth(n))
                .ok_or_else(|| RuleError::Syntax(format!("weekday ordinal out of range: {n}"))),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(0))
    }
}

impl FromStr for Weekday {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() < 2 || !s.is_char_boundary(s.len() - 2) {
            return Err(RuleError::Syntax(format!("invalid weekday: {s}")));
        }
        let (num, code) = s.split_at(s.len() - 2);
        let index = CODES
            .iter()
            .position(|c| c.eq_ignore_ascii_case(code))
            .ok_or_else(|| RuleError::Syntax(format!("invalid weekday: {s}")))?;
        let day = EVERYDAY[index].day;
        if num.is_empty() {
            return Ok(Self::every(day));
        }
        let n: i8 = num
            .parse()
            .map_err(|_| RuleError::Syntax(format!("invalid weekday ordinal: {s}")))?;
        if n == 0 || !(-53..=53).contains(&n) {
            return Err(RuleError::Syntax(format!("weekday ordinal out of range: {s}")));
        }
        Ok(Self::every(day).nth(n))
    }
}
