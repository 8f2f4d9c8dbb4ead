#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use recurrent::rule::{Frequency, RecurrenceRule};
use recurrent::weekday::{Weekday, EVERYDAY, FR, MO, WE};
use recurrent::{EventTimes, ExceptionOverlay, OccurrenceResolver};

#[test]
fn first_monday_of_the_month() {
    let rule = RecurrenceRule::builder(d(2009, 1, 1), Frequency::Monthly)
        .by_weekday([MO.nth(1)])
        .build()
        .unwrap();
    insta::assert_snapshot!(rule.describe(0, 1), @"The first Monday of the month");

    let every_other = RecurrenceRule::builder(d(2009, 1, 1), Frequency::Monthly)
        .interval(2)
        .by_weekday([MO.nth(1)])
        .build()
        .unwrap();
    insta::assert_snapshot!(every_other.describe(0, 1), @"The first Monday of the month, every 2 months");
}

#[test]
fn weekly_phrases() {
    let tuesdays = RecurrenceRule::builder(d(2020, 1, 7), Frequency::Weekly)
        .build()
        .unwrap();
    insta::assert_snapshot!(tuesdays.describe(0, 1), @"Tuesdays");

    let fortnightly = RecurrenceRule::builder(d(2020, 1, 6), Frequency::Weekly)
        .interval(2)
        .by_weekday([MO, WE])
        .build()
        .unwrap();
    insta::assert_snapshot!(fortnightly.describe(0, 1), @"Every 2 weeks on Mondays and Wednesdays");
    insta::assert_snapshot!(fortnightly.describe(-1, 1), @"Every 2 weeks on Sundays and Tuesdays");
}

#[test]
fn daily_phrases() {
    let daily = RecurrenceRule::builder(d(2020, 1, 1), Frequency::Daily)
        .build()
        .unwrap();
    insta::assert_snapshot!(daily.describe(0, 1), @"Daily");

    let third = RecurrenceRule::builder(d(2020, 1, 1), Frequency::Daily)
        .interval(3)
        .build()
        .unwrap();
    insta::assert_snapshot!(third.describe(0, 1), @"Every 3 days");
}

#[test]
fn last_day_with_until() {
    let rule = RecurrenceRule::builder(d(2020, 1, 1), Frequency::Monthly)
        .by_month_day([-1])
        .until(d(2020, 4, 30))
        .build()
        .unwrap();
    insta::assert_snapshot!(rule.describe(0, 1), @"The last day of the month (until 30 April 2020)");
    insta::assert_snapshot!(rule.describe(1, 1), @"The first day of the month (until 1 May 2020)");
}

#[test]
fn monthly_by_weekday_variants() {
    let everyday = RecurrenceRule::builder(d(2020, 1, 1), Frequency::Monthly)
        .by_weekday(EVERYDAY)
        .build()
        .unwrap();
    insta::assert_snapshot!(everyday.describe(0, 1), @"Everyday");

    let mondays = RecurrenceRule::builder(d(2020, 1, 1), Frequency::Monthly)
        .by_weekday([MO])
        .build()
        .unwrap();
    insta::assert_snapshot!(mondays.describe(0, 1), @"Every Monday");

    let shifted = RecurrenceRule::builder(d(2020, 1, 1), Frequency::Monthly)
        .by_weekday([FR.nth(2)])
        .build()
        .unwrap();
    insta::assert_snapshot!(shifted.describe(-1, 1), @"The Thursday before the second Friday of the month");
    insta::assert_snapshot!(shifted.describe(2, 1), @"The Sunday after the second Friday of the month");
}

#[test]
fn month_day_offsets() {
    let fifteenth = RecurrenceRule::builder(d(2020, 1, 15), Frequency::Monthly)
        .build()
        .unwrap();
    insta::assert_snapshot!(fifteenth.describe(0, 1), @"The 15th day of the month");
    insta::assert_snapshot!(fifteenth.describe(1, 1), @"The 16th day of the month");
    insta::assert_snapshot!(fifteenth.describe(20, 1), @"20 days after the 15th day of the month");

    let several = RecurrenceRule::builder(d(2020, 1, 1), Frequency::Monthly)
        .by_month_day([1, 15])
        .build()
        .unwrap();
    insta::assert_snapshot!(several.describe(0, 1), @"The first and the 15th day of the month");
    insta::assert_snapshot!(several.describe(-2, 1), @"Two days before the first and the 15th day of the month");
}

#[test]
fn yearly_month_names_shift_with_offset() {
    let new_year = RecurrenceRule::builder(d(2020, 1, 1), Frequency::Yearly)
        .by_month([1])
        .by_month_day([1])
        .build()
        .unwrap();
    insta::assert_snapshot!(new_year.describe(0, 1), @"The first day of January");
    insta::assert_snapshot!(new_year.describe(-1, 1), @"The last day of December");

    let christmas = RecurrenceRule::builder(d(2019, 12, 25), Frequency::Yearly)
        .interval(2)
        .build()
        .unwrap();
    insta::assert_snapshot!(christmas.describe(0, 3), @"The 25th day of December, every 2 years for 3 days");
}

#[test]
fn weekday_tokens() {
    assert_eq!(MO.describe(0), "Monday");
    assert_eq!(FR.nth(3).describe(0), "third Friday");
    assert_eq!(FR.nth(-1).describe(0), "last Friday");
    assert_eq!(FR.nth(2).describe(-1), "Thursday before the second Friday");
    assert_eq!(FR.nth(2).short_form(), "+2FR");
    assert_eq!("-1SU".parse::<Weekday>().unwrap().short_form(), "-1SU");
    assert!("0MO".parse::<Weekday>().is_err());
    assert!("XX".parse::<Weekday>().is_err());
}

#[test]
fn event_when_includes_times() {
    let rule = RecurrenceRule::builder(d(2020, 1, 7), Frequency::Weekly)
        .build()
        .unwrap();
    let overlay = ExceptionOverlay::new();
    let evening = EventTimes::new(Some(t(18, 30)), Some(t(20, 0)), 1);
    let resolver = OccurrenceResolver::new(&rule, &overlay, evening);
    insta::assert_snapshot!(resolver.when(at(2020, 1, 8, 9)), @"Tuesdays at 6:30pm to 8pm");

    let weekend = EventTimes::new(Some(t(19, 0)), Some(t(10, 0)), 2);
    let resolver = OccurrenceResolver::new(&rule, &overlay, weekend);
    insta::assert_snapshot!(
        resolver.when(at(2020, 1, 8, 9)),
        @"Tuesdays for 2 days starting at 7pm finishing at 10am"
    );
}

#[test]
fn event_when_shifts_to_the_viewer_timezone() {
    let rule = RecurrenceRule::builder(d(2020, 1, 7), Frequency::Weekly)
        .build()
        .unwrap();
    let overlay = ExceptionOverlay::new();
    let morning = EventTimes::new(Some(t(10, 0)), Some(t(11, 0)), 1);
    let resolver = OccurrenceResolver::new(&rule, &overlay, morning)
        .timezone(chrono_tz::Pacific::Auckland);
    let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    insta::assert_snapshot!(
        resolver.when_viewed_in(now, chrono_tz::UTC),
        @"Mondays at 9pm to 10pm"
    );
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn at(y: i32, m: u32, day: u32, h: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(h, 0, 0).unwrap()
}
