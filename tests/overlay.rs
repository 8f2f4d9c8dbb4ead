#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use recurrent::overlay::{
    Cancellation, Cancelled, Classification, ExceptionOverlay, ExceptionRecord,
    ExtendedCancellation, ExtraInfo, HolidayClosure, OverlayError, Postponement, RecordKind,
    Reschedule,
};
use recurrent::rule::{Frequency, RecurrenceRule};
use recurrent::{EventTimes, HolidayLookup, Holidays};

#[test]
fn cancellation_and_postponement_are_exclusive() {
    let mut overlay = ExceptionOverlay::new();
    overlay
        .add(Cancellation::new(d(2020, 1, 14)).into())
        .unwrap();

    let err = overlay
        .add(Postponement::new(d(2020, 1, 14), d(2020, 1, 17), EventTimes::default()).into())
        .unwrap_err();
    assert_eq!(
        err,
        OverlayError::Duplicate {
            kind: RecordKind::Cancellation,
            date: d(2020, 1, 14)
        }
    );

    overlay
        .add(Postponement::new(d(2020, 1, 21), d(2020, 1, 24), EventTimes::default()).into())
        .unwrap();
    let err = overlay
        .add(Postponement::new(d(2020, 1, 21), d(2020, 1, 23), EventTimes::default()).into())
        .unwrap_err();
    assert!(matches!(err, OverlayError::Duplicate { kind: RecordKind::Postponement, .. }));
}

#[test]
fn only_one_holiday_closure() {
    let mut overlay = ExceptionOverlay::new();
    overlay.add(HolidayClosure::all().into()).unwrap();
    assert_eq!(
        overlay.add(HolidayClosure::only(["Christmas Day"]).into()),
        Err(OverlayError::DuplicateClosure)
    );
}

#[test]
fn invalid_ranges_are_rejected() {
    let mut overlay = ExceptionOverlay::new();
    let backwards = ExtendedCancellation::new(d(2020, 3, 20), Some(d(2020, 3, 1)));
    assert!(matches!(
        overlay.add(backwards.into()),
        Err(OverlayError::InvalidRange(_))
    ));

    let times = EventTimes::new(Some(t(20, 0)), Some(t(18, 0)), 1);
    let inverted = Postponement::new(d(2020, 1, 14), d(2020, 1, 15), times);
    assert!(matches!(
        overlay.add(inverted.into()),
        Err(OverlayError::InvalidRange(_))
    ));
}

#[test]
fn add_for_checks_the_rule() {
    let rule = tuesdays();
    let mut overlay = ExceptionOverlay::new();
    assert_eq!(
        overlay.add_for(&rule, Cancellation::new(d(2020, 1, 15)).into()),
        Err(OverlayError::NotAnOccurrence(d(2020, 1, 15)))
    );
    overlay
        .add_for(&rule, Cancellation::new(d(2020, 1, 14)).into())
        .unwrap();
    overlay
        .add_for(&rule, ExtendedCancellation::new(d(2020, 1, 15), None).into())
        .unwrap();
}

#[test]
fn classification_priority() {
    let mut holidays = Holidays::new();
    holidays.add(d(2020, 12, 25), "Christmas Day");
    let lookup: &dyn HolidayLookup = &holidays;

    let mut overlay = ExceptionOverlay::new();
    overlay
        .add(Cancellation::new(d(2020, 12, 22)).with_title("Off").into())
        .unwrap();
    overlay
        .add(ExtendedCancellation::new(d(2020, 12, 20), Some(d(2020, 12, 23))).into())
        .unwrap();
    overlay.add(HolidayClosure::all().into()).unwrap();
    overlay
        .add(ExtraInfo::new(d(2020, 12, 23), "Party", "").into())
        .unwrap();
    overlay
        .add(ExtraInfo::new(d(2020, 12, 25), "Carols", "").into())
        .unwrap();
    overlay
        .add(ExtraInfo::new(d(2020, 12, 29), "Bring food", "").into())
        .unwrap();

    assert!(matches!(
        overlay.classify(d(2020, 12, 22), Some(lookup)),
        Classification::Cancelled(Cancelled::Cancellation(c)) if c.title == "Off"
    ));
    assert!(matches!(
        overlay.classify(d(2020, 12, 23), Some(lookup)),
        Classification::Cancelled(Cancelled::Extended(_))
    ));
    assert!(matches!(
        overlay.classify(d(2020, 12, 25), Some(lookup)),
        Classification::Cancelled(Cancelled::Holiday(_))
    ));
    assert!(matches!(
        overlay.classify(d(2020, 12, 29), Some(lookup)),
        Classification::Annotated(info) if info.title == "Bring food"
    ));
    assert_eq!(overlay.classify(d(2020, 12, 30), Some(lookup)), Classification::None);
}

#[test]
fn holiday_closure_without_lookup_has_no_effect() {
    let mut overlay = ExceptionOverlay::new();
    overlay.add(HolidayClosure::all().into()).unwrap();
    assert_eq!(overlay.classify(d(2021, 1, 1), None), Classification::None);
}

#[test]
fn selected_holidays_only() {
    let mut holidays = Holidays::new();
    holidays.add(d(2021, 1, 1), "New Year's Day");
    holidays.add(d(2021, 12, 25), "Christmas Day");
    let lookup: &dyn HolidayLookup = &holidays;
    let closure = HolidayClosure::only(["Christmas Day"]);
    assert!(closure.closes(d(2021, 12, 25), Some(lookup)));
    assert!(!closure.closes(d(2021, 1, 1), Some(lookup)));
    assert_eq!(closure.when(), "Closed for Christmas Day");
}

#[test]
fn records_remove_and_rebuild() {
    let mut overlay = ExceptionOverlay::new();
    overlay
        .add(Cancellation::new(d(2020, 1, 14)).into())
        .unwrap();
    overlay
        .add(Postponement::new(d(2020, 1, 21), d(2020, 1, 17), EventTimes::default()).into())
        .unwrap();
    overlay
        .add(ExtendedCancellation::new(d(2020, 3, 20), None).into())
        .unwrap();

    let rebuilt = ExceptionOverlay::from_records(overlay.records()).unwrap();
    assert_eq!(rebuilt, overlay);
    assert_eq!(
        overlay.postponement_target_dates().into_iter().collect::<Vec<_>>(),
        vec![d(2020, 1, 17)]
    );

    let removed = overlay.remove(RecordKind::Cancellation, Some(d(2020, 1, 14)));
    assert!(matches!(removed, Some(ExceptionRecord::Cancellation(_))));
    assert_eq!(overlay.classify(d(2020, 1, 14), None), Classification::None);
    assert!(overlay
        .remove(RecordKind::ExtendedCancellation, Some(d(2020, 3, 20)))
        .is_some());
    assert!(overlay.shutdown_on(d(2020, 6, 1)).is_none());
    assert_eq!(overlay.records().len(), 1);
}

#[test]
fn postponement_what() {
    let original = EventTimes::new(Some(t(19, 0)), Some(t(21, 0)), 1);
    let later = Postponement::new(d(2020, 1, 21), d(2020, 1, 24), original);
    assert_eq!(later.what(&original), Some(Reschedule::Postponed));

    let earlier = Postponement::new(d(2020, 1, 21), d(2020, 1, 17), original);
    assert_eq!(earlier.what(&original), Some(Reschedule::Rescheduled));

    let longer = Postponement::new(
        d(2020, 1, 21),
        d(2020, 1, 21),
        EventTimes::new(Some(t(19, 0)), Some(t(22, 0)), 1),
    );
    assert_eq!(longer.what(&original), Some(Reschedule::Rescheduled));

    let same = Postponement::new(d(2020, 1, 21), d(2020, 1, 21), original);
    assert_eq!(same.what(&original), None);
}

#[test]
fn shutdown_phrasing() {
    let today = d(2020, 3, 1);
    let open = ExtendedCancellation::new(d(2020, 3, 20), None);
    assert_eq!(
        open.when(today),
        "Cancelled from Friday 20th of March until further notice"
    );
    let bounded = ExtendedCancellation::new(d(2020, 3, 20), Some(d(2021, 1, 4)));
    assert_eq!(bounded.until_when(today), "to Monday 4th of January 2021");
}

fn tuesdays() -> RecurrenceRule {
    RecurrenceRule::builder(d(2020, 1, 7), Frequency::Weekly)
        .build()
        .unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}
