use super::{RecurrenceRule, RuleError};
use crate::weekday::Weekday;
use chrono::NaiveDate;
use rrule::{ParseError, RRule, RRuleError, Unvalidated};
use std::fmt;
use std::str::FromStr;

/// Forme canonique : `DTSTART:20090101\nRRULE:FREQ=WEEKLY;WKST=SU;COUNT=9;BYDAY=MO,TU`.
impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DTSTART:{}\nRRULE:", self.dtstart.format("%Y%m%d"))?;
        let mut parts = vec![format!("FREQ={}", self.freq.as_str())];
        if self.interval != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }
        parts.push(format!("WKST={}", Weekday::every(self.week_start).short_form()));
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(until) = self.until {
            parts.push(format!("UNTIL={}", until.format("%Y%m%d")));
        }
        if !self.by_weekday.is_empty() {
            let days: Vec<String> = self.by_weekday.iter().map(Weekday::short_form).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }
        if !self.by_month.is_empty() {
            parts.push(format!("BYMONTH={}", join_numbers(&self.by_month)));
        }
        if !self.by_month_day.is_empty() {
            parts.push(format!("BYMONTHDAY={}", join_numbers(&self.by_month_day)));
        }
        f.write_str(&parts.join(";"))
    }
}

fn join_numbers<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl FromStr for RecurrenceRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut dtstart = None;
        let mut rrule = None;
        for line in s.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (name, value) = match line.split_once(':') {
                Some((name, value)) => (name, value),
                None if line.to_ascii_uppercase().starts_with("FREQ=") => ("RRULE", line),
                None => return Err(RuleError::Syntax(format!("unexpected line: {line}"))),
            };
            // paramètres éventuels : DTSTART;VALUE=DATE:20090101
            let name = name.split(';').next().unwrap_or(name).to_ascii_uppercase();
            match name.as_str() {
                "DTSTART" => {
                    if dtstart.is_some() {
                        return Err(RuleError::Syntax("multiple DTSTART lines".to_string()));
                    }
                    dtstart = Some(parse_date(value)?);
                }
                "RRULE" => {
                    if rrule.is_some() {
                        return Err(RuleError::MultipleRules);
                    }
                    rrule = Some(value);
                }
                "RDATE" | "EXRULE" | "EXDATE" => {
                    return Err(RuleError::Syntax(
                        "only simple RRULE recurrences are supported".to_string(),
                    ));
                }
                _ => return Err(RuleError::Syntax(format!("unexpected line: {line}"))),
            }
        }
        let dtstart = dtstart.ok_or_else(|| RuleError::Syntax("missing DTSTART".to_string()))?;
        let rrule = rrule.ok_or_else(|| RuleError::Syntax("missing RRULE".to_string()))?;
        parse_rrule(dtstart, rrule)
    }
}

/// La ligne RRULE passe par l'analyseur du crate `rrule` ; seules les clés
/// que [`RecurrenceRule`] sait représenter sont retenues.
fn parse_rrule(dtstart: NaiveDate, value: &str) -> Result<RecurrenceRule, RuleError> {
    let parsed = format!("RRULE:{value}")
        .parse::<RRule<Unvalidated>>()
        .map_err(|e| match e {
            RRuleError::ParserError(ParseError::UnrecognizedParameter(key)) => {
                RuleError::UnsupportedKey(key.to_ascii_uppercase())
            }
            other => RuleError::Syntax(other.to_string()),
        })?;

    let unsupported = [
        ("BYSETPOS", parsed.get_by_set_pos().is_empty()),
        ("BYYEARDAY", parsed.get_by_year_day().is_empty()),
        ("BYWEEKNO", parsed.get_by_week_no().is_empty()),
        ("BYHOUR", parsed.get_by_hour().is_empty()),
        ("BYMINUTE", parsed.get_by_minute().is_empty()),
        ("BYSECOND", parsed.get_by_second().is_empty()),
    ];
    if let Some((key, _)) = unsupported.iter().find(|(_, empty)| !empty) {
        return Err(RuleError::UnsupportedKey((*key).to_string()));
    }

    let by_weekday = parsed
        .get_by_weekday()
        .iter()
        .map(|day| Weekday::try_from(*day))
        .collect::<Result<Vec<_>, _>>()?;
    let mut builder = RecurrenceRule::builder(dtstart, parsed.get_freq().try_into()?)
        .interval(u32::from(parsed.get_interval()))
        .week_start(parsed.get_week_start())
        .by_weekday(by_weekday)
        .by_month(parsed.get_by_month().iter().copied())
        .by_month_day(parsed.get_by_month_day().iter().copied());
    if let Some(count) = parsed.get_count() {
        builder = builder.count(count);
    }
    if let Some(until) = parsed.get_until() {
        builder = builder.until(until.date_naive());
    }
    builder.build()
}

/// Accepte `20090101` ou `20090101T093000[Z]` ; seule la date est retenue.
fn parse_date(raw: &str) -> Result<NaiveDate, RuleError> {
    let raw = raw.trim();
    if !raw.is_char_boundary(raw.len().min(8)) {
        return Err(RuleError::Syntax(format!("invalid date: {raw}")));
    }
    let (date, rest) = raw.split_at(raw.len().min(8));
    if !(rest.is_empty() || rest.starts_with('T')) {
        return Err(RuleError::Syntax(format!("invalid date: {raw}")));
    }
    NaiveDate::parse_from_str(date, "%Y%m%d")
        .map_err(|_| RuleError::Syntax(format!("invalid date: {raw}")))
}

impl TryFrom<String> for RecurrenceRule {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecurrenceRule> for String {
    fn from(rule: RecurrenceRule) -> Self {
        rule.to_string()
    }
}
