//! Surcouche d'exceptions posée sur une règle de récurrence.
//!
//! Priorité quand plusieurs enregistrements visent la même date :
//! annulation ou report explicite, puis fermeture étendue, puis fermeture
//! pour congés ; une information complémentaire n'annule jamais.

mod types;

pub use types::{
    Cancellation, Cancelled, Classification, ExceptionRecord, ExtendedCancellation, ExtraInfo,
    HolidayClosure, OverlayError, Postponement, RecordKind, Reschedule,
};

use crate::holidays::HolidayLookup;
use crate::rule::RecurrenceRule;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionOverlay {
    cancellations: BTreeMap<NaiveDate, Cancellation>,
    postponements: BTreeMap<NaiveDate, Postponement>,
    shutdowns: Vec<ExtendedCancellation>,
    closure: Option<HolidayClosure>,
    extra_info: BTreeMap<NaiveDate, ExtraInfo>,
}

impl ExceptionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruit une surcouche à partir d'une liste d'enregistrements.
    pub fn from_records<I>(records: I) -> Result<Self, OverlayError>
    where
        I: IntoIterator<Item = ExceptionRecord>,
    {
        let mut overlay = Self::new();
        for record in records {
            overlay.add(record)?;
        }
        Ok(overlay)
    }

    pub fn is_empty(&self) -> bool {
        self.cancellations.is_empty()
            && self.postponements.is_empty()
            && self.shutdowns.is_empty()
            && self.closure.is_none()
            && self.extra_info.is_empty()
    }

    pub fn add(&mut self, record: ExceptionRecord) -> Result<(), OverlayError> {
        let kind = record.kind();
        match record {
            ExceptionRecord::Cancellation(cancellation) => {
                let date = cancellation.date;
                self.check_free(date)?;
                self.cancellations.insert(date, cancellation);
            }
            ExceptionRecord::Postponement(postponement) => {
                let date = postponement.from_date;
                self.check_free(date)?;
                if postponement.num_days == 0 {
                    return Err(OverlayError::InvalidRange("postponement must last at least one day"));
                }
                if postponement.end() < postponement.start() {
                    return Err(OverlayError::InvalidRange("postponement ends before it starts"));
                }
                self.postponements.insert(date, postponement);
            }
            ExceptionRecord::ExtendedCancellation(shutdown) => {
                if shutdown.to_date.is_some_and(|to| to < shutdown.from_date) {
                    return Err(OverlayError::InvalidRange(
                        "extended cancellation ends before it starts",
                    ));
                }
                if self.shutdowns.iter().any(|s| s.from_date == shutdown.from_date) {
                    return Err(OverlayError::Duplicate {
                        kind,
                        date: shutdown.from_date,
                    });
                }
                let pos = self
                    .shutdowns
                    .partition_point(|s| s.from_date < shutdown.from_date);
                self.shutdowns.insert(pos, shutdown);
            }
            ExceptionRecord::HolidayClosure(closure) => {
                if self.closure.is_some() {
                    return Err(OverlayError::DuplicateClosure);
                }
                self.closure = Some(closure);
            }
            ExceptionRecord::ExtraInfo(info) => {
                if self.extra_info.contains_key(&info.date) {
                    return Err(OverlayError::Duplicate {
                        kind,
                        date: info.date,
                    });
                }
                self.extra_info.insert(info.date, info);
            }
        }
        tracing::debug!(%kind, "exception record added");
        Ok(())
    }

    /// Comme [`add`](Self::add), en vérifiant d'abord que la date surchargée
    /// est bien une occurrence de `rule`.
    pub fn add_for(
        &mut self,
        rule: &RecurrenceRule,
        record: ExceptionRecord,
    ) -> Result<(), OverlayError> {
        match &record {
            ExceptionRecord::Cancellation(Cancellation { date, .. })
            | ExceptionRecord::ExtraInfo(ExtraInfo { date, .. })
            | ExceptionRecord::Postponement(Postponement {
                from_date: date, ..
            }) => {
                if !rule.contains(*date) {
                    return Err(OverlayError::NotAnOccurrence(*date));
                }
            }
            ExceptionRecord::ExtendedCancellation(_) | ExceptionRecord::HolidayClosure(_) => {}
        }
        self.add(record)
    }

    // une date porte au plus une annulation ou un report
    fn check_free(&self, date: NaiveDate) -> Result<(), OverlayError> {
        if self.cancellations.contains_key(&date) {
            return Err(OverlayError::Duplicate {
                kind: RecordKind::Cancellation,
                date,
            });
        }
        if self.postponements.contains_key(&date) {
            return Err(OverlayError::Duplicate {
                kind: RecordKind::Postponement,
                date,
            });
        }
        Ok(())
    }

    /// Retire l'enregistrement de même nature et de même date ; le renvoie s'il existait.
    pub fn remove(&mut self, kind: RecordKind, date: Option<NaiveDate>) -> Option<ExceptionRecord> {
        let removed = match (kind, date) {
            (RecordKind::HolidayClosure, _) => self.closure.take().map(Into::into),
            (RecordKind::Cancellation, Some(date)) => {
                self.cancellations.remove(&date).map(Into::into)
            }
            (RecordKind::Postponement, Some(date)) => {
                self.postponements.remove(&date).map(Into::into)
            }
            (RecordKind::ExtraInfo, Some(date)) => self.extra_info.remove(&date).map(Into::into),
            (RecordKind::ExtendedCancellation, Some(date)) => self
                .shutdowns
                .iter()
                .position(|s| s.from_date == date)
                .map(|pos| self.shutdowns.remove(pos).into()),
            (_, None) => None,
        };
        if removed.is_some() {
            tracing::debug!(%kind, ?date, "exception record removed");
        }
        removed
    }

    /// Tous les enregistrements, par nature puis par date.
    pub fn records(&self) -> Vec<ExceptionRecord> {
        let mut out: Vec<ExceptionRecord> = Vec::new();
        out.extend(self.cancellations.values().cloned().map(Into::into));
        out.extend(self.shutdowns.iter().cloned().map(Into::into));
        out.extend(self.closure.iter().cloned().map(Into::into));
        out.extend(self.postponements.values().cloned().map(Into::into));
        out.extend(self.extra_info.values().cloned().map(Into::into));
        out
    }

    pub fn classify(&self, date: NaiveDate, holidays: Option<&dyn HolidayLookup>) -> Classification<'_> {
        if let Some(cancellation) = self.cancellations.get(&date) {
            return Classification::Cancelled(Cancelled::Cancellation(cancellation));
        }
        if let Some(postponement) = self.postponements.get(&date) {
            return Classification::Postponed(postponement);
        }
        if let Some(shutdown) = self.shutdown_on(date) {
            return Classification::Cancelled(Cancelled::Extended(shutdown));
        }
        if let Some(closure) = &self.closure {
            if closure.closes(date, holidays) {
                return Classification::Cancelled(Cancelled::Holiday(closure));
            }
        }
        match self.extra_info.get(&date) {
            Some(info) => Classification::Annotated(info),
            None => Classification::None,
        }
    }

    /// Dates d'arrivée des reports.
    pub fn postponement_target_dates(&self) -> BTreeSet<NaiveDate> {
        self.postponements.values().map(|p| p.to_date).collect()
    }

    /// Reports dont la date d'arrivée est dans `[from, to]`, triés par début.
    pub fn postponements_to(&self, from: NaiveDate, to: NaiveDate) -> Vec<&Postponement> {
        let mut found: Vec<&Postponement> = self
            .postponements
            .values()
            .filter(|p| p.to_date >= from && p.to_date <= to)
            .collect();
        found.sort_by_key(|p| p.start());
        found
    }

    pub fn holiday_closure(&self) -> Option<&HolidayClosure> {
        self.closure.as_ref()
    }

    /// Fermeture étendue couvrant `date`, s'il y en a une.
    pub fn shutdown_on(&self, date: NaiveDate) -> Option<&ExtendedCancellation> {
        self.shutdowns
            .iter()
            .take_while(|s| s.from_date <= date)
            .find(|s| s.covers(date))
    }

    pub fn cancellations(&self) -> impl Iterator<Item = &Cancellation> + '_ {
        self.cancellations.values()
    }

    pub fn postponements(&self) -> impl Iterator<Item = &Postponement> + '_ {
        self.postponements.values()
    }

    pub fn shutdowns(&self) -> impl Iterator<Item = &ExtendedCancellation> + '_ {
        self.shutdowns.iter()
    }

    pub fn extra_info(&self) -> impl Iterator<Item = &ExtraInfo> + '_ {
        self.extra_info.values()
    }

    pub fn extra_info_on(&self, date: NaiveDate) -> Option<&ExtraInfo> {
        self.extra_info.get(&date)
    }
}
