use crate::holidays::Holidays;
use crate::overlay::{
    Cancellation, ExceptionRecord, ExtendedCancellation, ExtraInfo, HolidayClosure, Postponement,
    RecordKind,
};
use crate::resolver::Occurrence;
use crate::telltime::EventTimes;
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;

/// Import de jours fériés : header `date,name` (date ISO 8601).
pub fn import_holidays_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Holidays> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut holidays = Holidays::new();
    for rec in rdr.records() {
        let rec = rec?;
        let date = parse_date(rec.get(0).context("missing date")?)?;
        let name = rec.get(1).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid holiday row for {date} (empty name)");
        }
        holidays.add(date, name);
    }
    Ok(holidays)
}

/// Import d'exceptions : header
/// `kind,date,to_date,title,details[,time_from][,time_to][,num_days][,holidays]`.
///
/// `holidays` ne sert qu'aux fermetures pour congés : `*` pour toutes,
/// sinon des noms séparés par `;`.
pub fn import_exceptions_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ExceptionRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let record = parse_exception(&rec).with_context(|| format!("exception row {}", line + 1))?;
        out.push(record);
    }
    Ok(out)
}

fn field<'r>(rec: &'r StringRecord, index: usize) -> &'r str {
    rec.get(index).map(str::trim).unwrap_or("")
}

fn parse_exception(rec: &StringRecord) -> anyhow::Result<ExceptionRecord> {
    let raw_kind = field(rec, 0);
    let kind = RecordKind::parse(raw_kind).with_context(|| format!("unknown kind {raw_kind}"))?;
    let title = field(rec, 3).to_string();
    let details = field(rec, 4).to_string();
    let record = match kind {
        RecordKind::Cancellation => ExceptionRecord::Cancellation(Cancellation {
            date: parse_date(field(rec, 1))?,
            title,
            details,
        }),
        RecordKind::ExtendedCancellation => {
            let to_date = match field(rec, 2) {
                "" => None,
                raw => Some(parse_date(raw)?),
            };
            ExceptionRecord::ExtendedCancellation(ExtendedCancellation {
                from_date: parse_date(field(rec, 1))?,
                to_date,
                title,
                details,
            })
        }
        RecordKind::Postponement => {
            let times = EventTimes::new(
                parse_time(field(rec, 5))?,
                parse_time(field(rec, 6))?,
                parse_num_days(field(rec, 7))?,
            );
            let mut postponement =
                Postponement::new(parse_date(field(rec, 1))?, parse_date(field(rec, 2))?, times);
            postponement.title = title;
            postponement.details = details;
            ExceptionRecord::Postponement(postponement)
        }
        RecordKind::ExtraInfo => ExceptionRecord::ExtraInfo(ExtraInfo {
            date: parse_date(field(rec, 1))?,
            title,
            details,
        }),
        RecordKind::HolidayClosure => {
            let mut closure = match field(rec, 8) {
                "" | "*" => HolidayClosure::all(),
                names => HolidayClosure::only(names.split(';').map(str::trim).filter(|n| !n.is_empty())),
            };
            closure.title = title;
            closure.details = details;
            ExceptionRecord::HolidayClosure(closure)
        }
    };
    Ok(record)
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_time(raw: &str) -> anyhow::Result<Option<NaiveTime>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let time = NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("invalid time: {raw}"))?;
    Ok(Some(time))
}

fn parse_num_days(raw: &str) -> anyhow::Result<u32> {
    if raw.is_empty() {
        return Ok(1);
    }
    let n: u32 = raw.parse().with_context(|| format!("invalid num_days: {raw}"))?;
    if n == 0 {
        bail!("num_days must be at least 1");
    }
    Ok(n)
}

/// Export CSV des occurrences : header `date,start,end,source,title,details,continuing`.
pub fn export_occurrences_csv<P: AsRef<Path>>(path: P, occurrences: &[Occurrence]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "start", "end", "source", "title", "details", "continuing"])?;
    for occ in occurrences {
        let date = occ.date.to_string();
        let start = occ.start.format("%Y-%m-%dT%H:%M").to_string();
        let end = occ.end.format("%Y-%m-%dT%H:%M").to_string();
        w.write_record([
            date.as_str(),
            start.as_str(),
            end.as_str(),
            occ.source.as_str(),
            occ.title.as_str(),
            occ.details.as_str(),
            if occ.continuing { "true" } else { "false" },
        ])?;
    }
    w.flush()?;
    Ok(())
}
