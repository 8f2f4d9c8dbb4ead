//! Jours fériés : interface de consultation et implémentation en mémoire.

use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

/// Source de jours fériés consultée par les fermetures pour congés.
pub trait HolidayLookup {
    /// Noms des fêtes du jour joints par ", " (chaîne vide si aucune).
    fn get(&self, date: NaiveDate) -> String;

    /// Tous les noms connus, pour un choix dans une interface.
    fn names(&self) -> Vec<String>;
}

impl HolidayLookup for BTreeMap<NaiveDate, String> {
    fn get(&self, date: NaiveDate) -> String {
        BTreeMap::get(self, &date).cloned().unwrap_or_default()
    }

    fn names(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for name in self.values().flat_map(|v| split_names(v)) {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
        out
    }
}

fn split_names(value: &str) -> impl Iterator<Item = &str> {
    value.split(", ").map(str::trim).filter(|n| !n.is_empty())
}

/// Table de jours fériés avec sources additionnelles empilées.
#[derive(Default)]
pub struct Holidays {
    simple: BTreeMap<NaiveDate, String>,
    sources: Vec<Box<dyn HolidayLookup>>,
}

impl fmt::Debug for Holidays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Holidays")
            .field("simple", &self.simple)
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl Holidays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une fête à une date ; les noms d'une même date sont fusionnés.
    pub fn add<S: Into<String>>(&mut self, date: NaiveDate, name: S) {
        let name = name.into();
        match self.simple.get_mut(&date) {
            Some(old) if !old.is_empty() => {
                if !old.contains(name.as_str()) && !name.contains(old.as_str()) {
                    *old = format!("{old}, {name}");
                }
            }
            _ => {
                self.simple.insert(date, name);
            }
        }
    }

    /// Enregistre une source supplémentaire, consultée après la table.
    pub fn register<L: HolidayLookup + 'static>(&mut self, source: L) {
        self.sources.push(Box::new(source));
    }

    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.sources.is_empty()
    }

    /// Noms ordonnés par jour de l'année de leur prochaine occurrence
    /// après `today` (ou de la dernière, si toutes sont passées).
    pub fn names_as_of(&self, today: NaiveDate) -> Vec<String> {
        let mut nearest: BTreeMap<&str, NaiveDate> = BTreeMap::new();
        for (date, value) in &self.simple {
            for name in split_names(value) {
                nearest
                    .entry(name)
                    .and_modify(|best| {
                        let best_is_future = *best >= today;
                        let date_is_future = *date >= today;
                        if (date_is_future && (!best_is_future || *date < *best))
                            || (!date_is_future && !best_is_future && *date > *best)
                        {
                            *best = *date;
                        }
                    })
                    .or_insert(*date);
            }
        }
        let mut ordered: Vec<(u32, u32, &str)> = nearest
            .into_iter()
            .map(|(name, date)| (date.month(), date.day(), name))
            .collect();
        ordered.sort();

        let mut out: Vec<String> = ordered.into_iter().map(|(_, _, n)| n.to_string()).collect();
        for name in self.sources.iter().flat_map(|s| s.names()) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

impl HolidayLookup for Holidays {
    fn get(&self, date: NaiveDate) -> String {
        let mut names: Vec<String> = Vec::new();
        let simple = self.simple.get(&date).cloned().unwrap_or_default();
        let others = self.sources.iter().map(|s| s.get(date));
        for value in std::iter::once(simple).chain(others) {
            for name in split_names(&value) {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names.join(", ")
    }

    fn names(&self) -> Vec<String> {
        self.names_as_of(Local::now().date_naive())
    }
}
