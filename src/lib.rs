#![forbid(unsafe_code)]
//! Recurrent : bibliothèque d'événements récurrents locale (sans BD).
//!
//! - Règles de récurrence façon RRULE (RFC 5545), forme textuelle stable.
//! - Exceptions : annulations, fermetures étendues, jours fériés, reports.
//! - Prochaine/précédente occurrence, statut, occurrences par plage et par jour.
//! - Dates naïves en heure locale de l'événement ; fuseaux via chrono-tz.

pub mod holidays;
#[cfg(feature = "serde")]
pub mod io;
pub mod overlay;
pub mod resolver;
pub mod rule;
#[cfg(feature = "serde")]
pub mod storage;
pub mod telltime;
pub mod weekday;

pub use holidays::{HolidayLookup, Holidays};
pub use overlay::{
    Cancellation, Classification, ExceptionOverlay, ExceptionRecord, ExtendedCancellation,
    ExtraInfo, HolidayClosure, OverlayError, Postponement, RecordKind,
};
pub use resolver::{
    EventsOnDay, Exclusions, FoundOccurrence, Occurrence, OccurrenceResolver, ResolveError,
    ResolverOptions, SourceKind, Status,
};
pub use rule::{Direction, Frequency, RecurrenceRule, RuleError};
#[cfg(feature = "serde")]
pub use storage::{EventFile, JsonStorage, Storage};
pub use telltime::EventTimes;
pub use weekday::Weekday;
