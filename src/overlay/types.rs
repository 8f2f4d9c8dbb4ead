use crate::holidays::HolidayLookup;
use crate::telltime::{date_format, hr_join, EventTimes};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RecordKind {
    Cancellation,
    ExtendedCancellation,
    HolidayClosure,
    Postponement,
    ExtraInfo,
}

impl RecordKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancellation => "cancellation",
            Self::ExtendedCancellation => "extended_cancellation",
            Self::HolidayClosure => "holiday_closure",
            Self::Postponement => "postponement",
            Self::ExtraInfo => "extra_info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cancellation" => Self::Cancellation,
            "extended_cancellation" | "shutdown" => Self::ExtendedCancellation,
            "holiday_closure" => Self::HolidayClosure,
            "postponement" => Self::Postponement,
            "extra_info" => Self::ExtraInfo,
            _ => return None,
        })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annulation d'une seule occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cancellation {
    pub date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub details: String,
}

impl Cancellation {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            title: String::new(),
            details: String::new(),
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }
}

/// Fermeture sur une plage de dates ; sans `to_date`, jusqu'à nouvel ordre.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedCancellation {
    pub from_date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub to_date: Option<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub details: String,
}

impl ExtendedCancellation {
    pub fn new(from_date: NaiveDate, to_date: Option<NaiveDate>) -> Self {
        Self {
            from_date,
            to_date,
            title: String::new(),
            details: String::new(),
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.to_date.is_none()
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.from_date && self.to_date.map_or(true, |to| date <= to)
    }

    /// "to Friday 20th of March" ou "until further notice".
    pub fn until_when(&self, today: NaiveDate) -> String {
        match self.to_date {
            Some(to) => format!("to {}", date_format(to, today)),
            None => "until further notice".to_string(),
        }
    }

    pub fn when(&self, today: NaiveDate) -> String {
        format!(
            "Cancelled from {} {}",
            date_format(self.from_date, today),
            self.until_when(today)
        )
    }
}

/// Fermeture pour les jours fériés (tous, ou une sélection par nom).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HolidayClosure {
    #[cfg_attr(feature = "serde", serde(default))]
    pub all_holidays: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub holiday_names: BTreeSet<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub details: String,
}

impl HolidayClosure {
    pub fn all() -> Self {
        Self {
            all_holidays: true,
            ..Self::default()
        }
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            holiday_names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Fermé ce jour-là ? Sans source de jours fériés, la fermeture est sans effet.
    pub fn closes(&self, date: NaiveDate, holidays: Option<&dyn HolidayLookup>) -> bool {
        let Some(holidays) = holidays else {
            tracing::debug!(%date, "holiday closure ignored: no holiday lookup");
            return false;
        };
        if !self.all_holidays && self.holiday_names.is_empty() {
            return false;
        }
        let found = holidays.get(date);
        if found.is_empty() {
            return false;
        }
        self.all_holidays
            || found
                .split(", ")
                .any(|name| self.holiday_names.contains(name.trim()))
    }

    pub fn when(&self) -> String {
        if self.all_holidays {
            "Closed for holidays".to_string()
        } else {
            let names: Vec<&str> = self.holiday_names.iter().map(String::as_str).collect();
            format!("Closed for {}", hr_join(&names))
        }
    }
}

/// Report d'une occurrence vers une autre date, avec ses propres horaires.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Postponement {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_from: Option<NaiveTime>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_to: Option<NaiveTime>,
    #[cfg_attr(feature = "serde", serde(default = "one_day"))]
    pub num_days: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub details: String,
    /// Affiché à la place de l'occurrence libérée.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cancellation_title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cancellation_details: String,
}

#[cfg(feature = "serde")]
fn one_day() -> u32 {
    1
}

/// Nature d'un report vis-à-vis de l'occurrence d'origine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reschedule {
    Postponed,
    Rescheduled,
}

impl fmt::Display for Reschedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postponed => "Postponed",
            Self::Rescheduled => "Rescheduled",
        })
    }
}

impl Postponement {
    pub fn new(from_date: NaiveDate, to_date: NaiveDate, times: EventTimes) -> Self {
        Self {
            from_date,
            to_date,
            time_from: times.time_from,
            time_to: times.time_to,
            num_days: times.num_days.max(1),
            title: String::new(),
            details: String::new(),
            cancellation_title: String::new(),
            cancellation_details: String::new(),
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    pub fn times(&self) -> EventTimes {
        EventTimes::new(self.time_from, self.time_to, self.num_days)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.times().start_on(self.to_date)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.times().end_for(self.to_date)
    }

    /// Reporté plus tard, reprogrammé (plus tôt ou fin modifiée), ou rien.
    pub fn what(&self, original: &EventTimes) -> Option<Reschedule> {
        let original_from = original.start_on(self.from_date);
        let changed_from = self.start();
        let original_to = original.end_for(self.from_date);
        let changed_to = self.times().end_for(self.from_date);
        if original_from < changed_from {
            Some(Reschedule::Postponed)
        } else if original_from > changed_from || original_to != changed_to {
            Some(Reschedule::Rescheduled)
        } else {
            None
        }
    }
}

/// Informations complémentaires, sans effet sur l'occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtraInfo {
    pub date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub details: String,
}

impl ExtraInfo {
    pub fn new<T: Into<String>, D: Into<String>>(date: NaiveDate, title: T, details: D) -> Self {
        Self {
            date,
            title: title.into(),
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum ExceptionRecord {
    Cancellation(Cancellation),
    ExtendedCancellation(ExtendedCancellation),
    HolidayClosure(HolidayClosure),
    Postponement(Postponement),
    ExtraInfo(ExtraInfo),
}

impl ExceptionRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Cancellation(_) => RecordKind::Cancellation,
            Self::ExtendedCancellation(_) => RecordKind::ExtendedCancellation,
            Self::HolidayClosure(_) => RecordKind::HolidayClosure,
            Self::Postponement(_) => RecordKind::Postponement,
            Self::ExtraInfo(_) => RecordKind::ExtraInfo,
        }
    }

    /// Date surchargée ; aucune pour une fermeture pour congés.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Cancellation(c) => Some(c.date),
            Self::ExtendedCancellation(s) => Some(s.from_date),
            Self::HolidayClosure(_) => None,
            Self::Postponement(p) => Some(p.from_date),
            Self::ExtraInfo(i) => Some(i.date),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Cancellation(c) => &c.title,
            Self::ExtendedCancellation(s) => &s.title,
            Self::HolidayClosure(h) => &h.title,
            Self::Postponement(p) => &p.title,
            Self::ExtraInfo(i) => &i.title,
        }
    }
}

impl From<Cancellation> for ExceptionRecord {
    fn from(value: Cancellation) -> Self {
        Self::Cancellation(value)
    }
}

impl From<ExtendedCancellation> for ExceptionRecord {
    fn from(value: ExtendedCancellation) -> Self {
        Self::ExtendedCancellation(value)
    }
}

impl From<HolidayClosure> for ExceptionRecord {
    fn from(value: HolidayClosure) -> Self {
        Self::HolidayClosure(value)
    }
}

impl From<Postponement> for ExceptionRecord {
    fn from(value: Postponement) -> Self {
        Self::Postponement(value)
    }
}

impl From<ExtraInfo> for ExceptionRecord {
    fn from(value: ExtraInfo) -> Self {
        Self::ExtraInfo(value)
    }
}

/// Ce qui supprime une occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancelled<'a> {
    Cancellation(&'a Cancellation),
    Extended(&'a ExtendedCancellation),
    Holiday(&'a HolidayClosure),
}

impl<'a> Cancelled<'a> {
    pub fn title(&self) -> &'a str {
        match self {
            Self::Cancellation(c) => &c.title,
            Self::Extended(s) => &s.title,
            Self::Holiday(h) => &h.title,
        }
    }

    pub fn details(&self) -> &'a str {
        match self {
            Self::Cancellation(c) => &c.details,
            Self::Extended(s) => &s.details,
            Self::Holiday(h) => &h.details,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Cancellation(_) => RecordKind::Cancellation,
            Self::Extended(_) => RecordKind::ExtendedCancellation,
            Self::Holiday(_) => RecordKind::HolidayClosure,
        }
    }
}

/// Résultat du classement d'une date candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    None,
    Cancelled(Cancelled<'a>),
    Postponed(&'a Postponement),
    Annotated(&'a ExtraInfo),
}

impl Classification<'_> {
    /// L'occurrence d'origine n'a pas lieu ce jour-là (annulée ou déplacée).
    pub fn removes_occurrence(&self) -> bool {
        matches!(self, Self::Cancelled(_) | Self::Postponed(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("a {kind} already overrides {date}")]
    Duplicate { kind: RecordKind, date: NaiveDate },
    #[error("a holiday closure is already set")]
    DuplicateClosure,
    #[error("invalid exception range: {0}")]
    InvalidRange(&'static str),
    #[error("{0} is not an occurrence of this event")]
    NotAnOccurrence(NaiveDate),
}
