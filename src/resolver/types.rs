use crate::overlay::{Postponement, RecordKind};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use thiserror::Error;

/// Bornes de sécurité du résolveur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Nombre maximal d'occurrences examinées lors d'une recherche vers l'avant.
    pub max_iterations: usize,
    /// Année au-delà de laquelle on ne cherche plus.
    pub far_year: i32,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            far_year: crate::rule::LAST_YEAR,
        }
    }
}

/// Quelles exceptions écartent une occurrence lors d'un parcours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusions {
    pub cancellations: bool,
    /// Écarte aussi les dates portant une information complémentaire titrée.
    pub extra_info: bool,
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            cancellations: true,
            extra_info: false,
        }
    }
}

impl Exclusions {
    pub const NONE: Self = Self {
        cancellations: false,
        extra_info: false,
    };
}

/// Occurrence trouvée par une recherche ponctuelle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundOccurrence<'a> {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Renseigné quand l'occurrence vient d'un report.
    pub postponement: Option<&'a Postponement>,
}

impl FoundOccurrence<'_> {
    pub fn is_postponed(&self) -> bool {
        self.postponement.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Started,
    Finished,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Started => "started",
            Self::Finished => "finished",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SourceKind {
    Base,
    Postponed,
    /// Occurrence supprimée ; affichée seulement si l'exception a un titre.
    Suppressed,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Postponed => "postponed",
            Self::Suppressed => "suppressed",
        }
    }
}

/// Occurrence résolue pour l'affichage d'un calendrier.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occurrence {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub num_days: u32,
    pub title: String,
    pub details: String,
    pub source: SourceKind,
    /// Exception ayant fourni le contenu affiché.
    pub record: Option<RecordKind>,
    /// Commencée avant le début de la plage demandée.
    pub continuing: bool,
}

impl Occurrence {
    pub fn is_displayed(&self) -> bool {
        self.source != SourceKind::Suppressed || !self.title.is_empty()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }
}

/// Événements d'un jour de calendrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsOnDay {
    pub date: NaiveDate,
    /// Noms des fêtes du jour, vide s'il n'y en a pas.
    pub holiday: String,
    pub days_events: Vec<Occurrence>,
    pub continuing_events: Vec<Occurrence>,
}

impl EventsOnDay {
    pub fn all_events(&self) -> impl Iterator<Item = &Occurrence> + '_ {
        self.days_events.iter().chain(self.continuing_events.iter())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid range: {to} is before {from}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
}
