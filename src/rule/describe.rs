use super::iter::Filters;
use super::{Frequency, RecurrenceRule};
use crate::telltime::{date_format_dmy, days_offset_str, hr_join, to_the_ordinal};
use chrono::Duration;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Nom du mois `m`, avec bouclage (0 = décembre, 13 = janvier).
fn month_name(m: i32) -> &'static str {
    MONTH_NAMES[(m - 1).rem_euclid(12) as usize]
}

fn months_of(months: &[u8], shift: i32) -> String {
    let names: Vec<&str> = months
        .iter()
        .map(|m| month_name(i32::from(*m) + shift))
        .collect();
    format!(" of {}", hr_join(&names))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl RecurrenceRule {
    /// Description en langage naturel.
    ///
    /// `day_offset` décale la description vers le jour réellement affiché
    /// quand celui-ci diffère du jour calculé par la règle ; `num_days`
    /// ajoute " for N days" pour un événement sur plusieurs jours.
    pub fn describe(&self, day_offset: i32, num_days: u32) -> String {
        let filters = self.filters();
        let mut out = match self.freq {
            Frequency::Daily => self.daily_when(),
            Frequency::Weekly => self.weekly_when(&filters, day_offset),
            Frequency::Monthly => {
                let when = self.monthly_yearly_when(&filters, day_offset, " of the month".into());
                if self.interval >= 2 {
                    format!("{when}, every {} months", self.interval)
                } else {
                    when
                }
            }
            Frequency::Yearly => {
                let of = if filters.by_month.is_empty() {
                    " of the year".to_string()
                } else {
                    months_of(&filters.by_month, 0)
                };
                let when = self.monthly_yearly_when(&filters, day_offset, of);
                if self.interval >= 2 {
                    format!("{when}, every {} years", self.interval)
                } else {
                    when
                }
            }
        };
        if num_days >= 2 {
            out.push_str(&format!(" for {num_days} days"));
        }
        if let Some(until) = self.until {
            let shifted = until
                .checked_add_signed(Duration::days(i64::from(day_offset)))
                .unwrap_or(until);
            out.push_str(&format!(" (until {})", date_format_dmy(shifted)));
        }
        out
    }

    fn daily_when(&self) -> String {
        if self.interval > 1 {
            format!("Every {} days", self.interval)
        } else {
            "Daily".to_string()
        }
    }

    fn weekly_when(&self, filters: &Filters, offset: i32) -> String {
        let days: Vec<String> = filters
            .by_weekday
            .iter()
            .map(|d| d.describe_plural(offset))
            .collect();
        let days = hr_join(&days);
        if self.interval >= 2 {
            format!("Every {} weeks on {days}", self.interval)
        } else {
            days
        }
    }

    fn monthly_yearly_when(&self, filters: &Filters, offset: i32, of: String) -> String {
        if !filters.by_weekday.is_empty() {
            by_weekday_when(filters, offset, &of)
        } else if filters.by_month_day.len() == 1 {
            self.by_month_day_when(filters, offset, of)
        } else {
            let days: Vec<String> = filters
                .by_month_day
                .iter()
                .map(|d| to_the_ordinal(i32::from(*d), false))
                .collect();
            let the_ordinal = hr_join(&days);
            if offset != 0 {
                format!("{} {the_ordinal} day{of}", days_offset_str(offset))
            } else {
                format!("{} day{of}", capitalize(&the_ordinal))
            }
        }
    }

    fn by_month_day_when(&self, filters: &Filters, offset: i32, mut of: String) -> String {
        let mut day = i32::from(filters.by_month_day[0]);
        let mut days_offset = String::new();
        if day == 1 && offset < 0 {
            // le premier du mois recule dans le mois précédent
            day = offset;
            if self.freq != Frequency::Monthly && !filters.by_month.is_empty() {
                of = months_of(&filters.by_month, -1);
            }
        } else if day == -1 && offset > 0 {
            // le dernier du mois avance dans le mois suivant
            day = offset;
            if self.freq != Frequency::Monthly && !filters.by_month.is_empty() {
                of = months_of(&filters.by_month, 1);
            }
        } else if 0 < day + offset && day + offset <= 28 {
            day += offset;
        } else {
            days_offset = days_offset_str(offset);
        }

        let the_ordinal = to_the_ordinal(day, false);
        if days_offset.is_empty() {
            format!("{} day{of}", capitalize(&the_ordinal))
        } else {
            format!("{days_offset} {the_ordinal} day{of}")
        }
    }
}

fn by_weekday_when(filters: &Filters, offset: i32, of: &str) -> String {
    let days = &filters.by_weekday;
    if days.len() == 7 && days.iter().all(|d| d.is_every()) {
        return "Everyday".to_string();
    }
    let names: Vec<String> = days.iter().map(|d| d.describe(offset)).collect();
    let when = hr_join(&names);
    if days[0].is_every() {
        format!("Every {when}")
    } else {
        format!("The {when}{of}")
    }
}
