#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use recurrent::io::{export_occurrences_csv, import_exceptions_csv, import_holidays_csv};
use recurrent::overlay::{Cancellation, ExceptionRecord, OverlayError, Postponement};
use recurrent::storage::{EventFile, JsonStorage, Storage};
use recurrent::{EventTimes, HolidayLookup, OccurrenceResolver, RecurrenceRule};
use std::fs;
use tempfile::tempdir;

fn choir() -> EventFile {
    let rule: RecurrenceRule = "DTSTART:20200107\nRRULE:FREQ=WEEKLY;BYDAY=TU".parse().unwrap();
    let times = EventTimes::new(Some(t(19, 0)), Some(t(21, 0)), 1);
    EventFile::new("Choir", rule, times)
}

#[test]
fn event_file_survives_a_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("event.json");
    let storage = JsonStorage::open(&path).unwrap();

    let mut event = choir();
    event.timezone = "Pacific/Auckland".to_string();
    event
        .add_record(Cancellation::new(d(2020, 1, 14)).with_title("No choir").into())
        .unwrap();
    event
        .add_record(Postponement::new(d(2020, 1, 21), d(2020, 1, 23), event.times).into())
        .unwrap();
    storage.save(&event).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"kind\": \"cancellation\""));
    assert!(text.contains("RRULE:FREQ=WEEKLY"));

    let loaded = storage.load().unwrap();
    assert_eq!(loaded, event);
    assert_eq!(loaded.tz().unwrap(), chrono_tz::Pacific::Auckland);
    assert_eq!(loaded.overlay().unwrap().records().len(), 2);
}

#[test]
fn add_record_rejects_dates_outside_the_rule() {
    let mut event = choir();
    let err = event
        .add_record(Cancellation::new(d(2020, 1, 15)).into())
        .unwrap_err();
    assert_eq!(err, OverlayError::NotAnOccurrence(d(2020, 1, 15)));
    assert!(event.records.is_empty());
}

#[test]
fn unknown_timezone_is_an_error() {
    let mut event = choir();
    event.timezone = "Mars/Olympus".to_string();
    assert!(event.tz().is_err());
}

#[test]
fn holidays_and_exceptions_from_csv() {
    let dir = tempdir().unwrap();
    let holidays_path = dir.path().join("holidays.csv");
    fs::write(
        &holidays_path,
        "date,name\n2020-12-25,Christmas Day\n2021-01-01,New Year's Day\n",
    )
    .unwrap();
    let holidays = import_holidays_csv(&holidays_path).unwrap();
    assert_eq!(holidays.get(d(2020, 12, 25)), "Christmas Day");

    let exceptions_path = dir.path().join("exceptions.csv");
    fs::write(
        &exceptions_path,
        "kind,date,to_date,title,details,time_from,time_to,num_days,holidays\n\
         cancellation,2020-01-14,,No choir,,,,,\n\
         shutdown,2020-03-20,,Lockdown,,,,,\n\
         postponement,2020-01-21,2020-01-23,,,19:30,21:00,,\n\
         holiday_closure,,,,,,,,Christmas Day;New Year's Day\n",
    )
    .unwrap();
    let records = import_exceptions_csv(&exceptions_path).unwrap();
    assert_eq!(records.len(), 4);
    match &records[2] {
        ExceptionRecord::Postponement(p) => {
            assert_eq!(p.time_from, Some(t(19, 30)));
            assert_eq!(p.num_days, 1);
        }
        other => panic!("unexpected record {other:?}"),
    }
    match &records[3] {
        ExceptionRecord::HolidayClosure(c) => {
            assert!(!c.all_holidays);
            assert!(c.holiday_names.contains("New Year's Day"));
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn bad_exception_rows_are_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exceptions.csv");
    fs::write(&path, "kind,date,to_date,title,details\nholiday,2020-01-14,,,\n").unwrap();
    let err = import_exceptions_csv(&path).unwrap_err();
    assert!(format!("{err:#}").contains("unknown kind holiday"));
}

#[test]
fn occurrences_export_to_csv() {
    let dir = tempdir().unwrap();
    let event = choir();
    let overlay = event.overlay().unwrap();
    let resolver = OccurrenceResolver::new(&event.rule, &overlay, event.times).title("Choir");
    let occurrences = resolver
        .occurrences_in_range(d(2020, 1, 1), d(2020, 1, 15))
        .unwrap();

    let path = dir.path().join("out.csv");
    export_occurrences_csv(&path, &occurrences).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,start,end,source,title,details,continuing");
    assert_eq!(lines[1], "2020-01-07,2020-01-07T19:00,2020-01-07T21:00,base,Choir,,false");
    assert_eq!(lines.len(), 3);
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}
