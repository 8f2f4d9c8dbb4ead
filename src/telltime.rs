//! Formatage des dates, heures et ordinaux pour les descriptions lisibles.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Horaires d'un événement : début, fin et durée en jours.
/// Une heure absente vaut début ou fin de journée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventTimes {
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_from: Option<NaiveTime>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_to: Option<NaiveTime>,
    #[cfg_attr(feature = "serde", serde(default = "one_day"))]
    pub num_days: u32,
}

#[cfg(feature = "serde")]
fn one_day() -> u32 {
    1
}

impl Default for EventTimes {
    fn default() -> Self {
        Self {
            time_from: None,
            time_to: None,
            num_days: 1,
        }
    }
}

impl EventTimes {
    pub fn new(time_from: Option<NaiveTime>, time_to: Option<NaiveTime>, num_days: u32) -> Self {
        Self {
            time_from,
            time_to,
            num_days: num_days.max(1),
        }
    }

    /// Dernier jour d'une occurrence commençant le `date`.
    pub fn last_day(&self, date: NaiveDate) -> NaiveDate {
        let extra = i64::from(self.num_days.max(1) - 1);
        date.checked_add_signed(Duration::days(extra)).unwrap_or(date)
    }

    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(time_from_or_min(self.time_from))
    }

    pub fn end_for(&self, date: NaiveDate) -> NaiveDateTime {
        self.last_day(date).and_time(time_to_or_max(self.time_to))
    }
}

/// Heure de début par défaut (événement « toute la journée »).
pub fn time_from_or_min(time: Option<NaiveTime>) -> NaiveTime {
    time.unwrap_or(NaiveTime::MIN)
}

/// Heure de fin par défaut : dernière nanoseconde de la journée.
pub fn time_to_or_max(time: Option<NaiveTime>) -> NaiveTime {
    time.unwrap_or_else(end_of_day)
}

pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

/// "first" .. "fifth", "last", "penultimate", puis "6th", "21st"...
pub fn to_ordinal(n: i32) -> String {
    match n {
        -1 => "last".to_string(),
        -2 => "penultimate".to_string(),
        1 => "first".to_string(),
        2 => "second".to_string(),
        3 => "third".to_string(),
        4 => "fourth".to_string(),
        5 => "fifth".to_string(),
        _ => format!("{n}{}", ordinal_suffix(n.unsigned_abs())),
    }
}

/// "the first", ou "The first" en début de phrase.
pub fn to_the_ordinal(n: i32, title_case: bool) -> String {
    let article = if title_case { "The" } else { "the" };
    format!("{article} {}", to_ordinal(n))
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Joint une liste à la manière humaine : "A", "A and B", "A, B and C".
pub fn hr_join<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Décalage en jours exprimé en toutes lettres, vide si `offset == 0`.
pub fn days_offset_str(offset: i32) -> String {
    match offset {
        0 => String::new(),
        -1 => "The day before".to_string(),
        -2 => "Two days before".to_string(),
        1 => "The day after".to_string(),
        2 => "Two days after".to_string(),
        n if n < 0 => format!("{} days before", n.unsigned_abs()),
        n => format!("{n} days after"),
    }
}

/// ex. "14 April 2017"
pub fn date_format_dmy(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// ex. "Friday 14th of April", l'année n'apparaît que si elle diffère de `today`.
pub fn date_format(date: NaiveDate, today: NaiveDate) -> String {
    let mut out = format!(
        "{} {}{} of {}",
        date.format("%A"),
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%B")
    );
    if date.year() != today.year() {
        out.push_str(&format!(" {}", date.year()));
    }
    out
}

/// ex. "at 6:30pm to 8pm"
pub fn time_format(
    time_from: Option<NaiveTime>,
    time_to: Option<NaiveTime>,
    prefix: &str,
    infix: &str,
) -> String {
    let mut out = String::new();
    if let Some(from) = time_from {
        out.push_str(prefix);
        out.push_str(&clock(from));
        out.push(' ');
    }
    if let Some(to) = time_to {
        out.push_str(infix);
        out.push_str(&clock(to));
    }
    out.trim_end().to_string()
}

fn clock(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    let suffix = if pm { "pm" } else { "am" };
    if time.minute() == 0 {
        format!("{hour}{suffix}")
    } else {
        format!("{hour}:{:02}{suffix}", time.minute())
    }
}
