use chrono::{NaiveDate, NaiveDateTime};
use studyflow_core::model::alert::{Alert, Repeat};
use studyflow_core::schedule::{base_dates, ScheduleError};

fn at(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").unwrap()
}

fn dates(raw: &[&str]) -> Vec<NaiveDateTime> {
    raw.iter().map(|value| at(value)).collect()
}

#[test]
fn biweekly_absolute_repeat_stops_after_until_day() {
    let mut alert = Alert::absolute("2025-01-01T09:00").repeating(Repeat::Weekly, 2);
    alert.until = Some("2025-01-20".to_string());

    assert_eq!(
        base_dates(&alert).unwrap(),
        dates(&["2025-01-01T09:00", "2025-01-15T09:00"])
    );
}

#[test]
fn relative_daily_repeat_produces_repeat_count_plus_one_entries() {
    let mut alert = Alert::relative("2025-07-25", 1, "10:30").repeating(Repeat::Daily, 1);
    alert.repeat_count = Some(3);

    assert_eq!(
        base_dates(&alert).unwrap(),
        dates(&[
            "2025-07-26T10:30",
            "2025-07-27T10:30",
            "2025-07-28T10:30",
            "2025-07-29T10:30",
        ])
    );
}

#[test]
fn relative_repeat_without_count_is_a_single_entry() {
    let alert = Alert::relative("2025-07-25", 0, "08:00").repeating(Repeat::Monthly, 1);
    assert_eq!(base_dates(&alert).unwrap(), dates(&["2025-07-25T08:00"]));
}

#[test]
fn relative_repeat_count_holds_for_every_unit() {
    for repeat in [Repeat::Daily, Repeat::Weekly, Repeat::Monthly, Repeat::Yearly] {
        let mut alert = Alert::relative("2024-01-31", 3, "07:45").repeating(repeat, 2);
        alert.repeat_count = Some(5);
        assert_eq!(base_dates(&alert).unwrap().len(), 6, "{}", repeat.as_str());
    }
}

#[test]
fn until_day_is_inclusive_regardless_of_time() {
    let mut alert = Alert::absolute("2025-03-01T23:30").repeating(Repeat::Daily, 1);
    alert.until = Some("2025-03-03".to_string());

    let result = base_dates(&alert).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result.last(), Some(&at("2025-03-03T23:30")));
}

#[test]
fn open_ended_absolute_repeat_is_capped_at_thirty() {
    let alert = Alert::absolute("2025-01-01T09:00").repeating(Repeat::Daily, 1);

    let result = base_dates(&alert).unwrap();
    assert_eq!(result.len(), 30);
    assert_eq!(result[29], at("2025-01-30T09:00"));
}

#[test]
fn until_bounded_repeat_is_not_limited_by_the_open_ended_cap() {
    let mut alert = Alert::absolute("2025-01-01T09:00").repeating(Repeat::Daily, 1);
    alert.until = Some("2025-03-01".to_string());

    assert_eq!(base_dates(&alert).unwrap().len(), 60);
}

#[test]
fn monthly_steps_clamp_to_month_end_without_drifting() {
    let mut alert = Alert::absolute("2025-01-31T09:00").repeating(Repeat::Monthly, 1);
    alert.until = Some("2025-05-31".to_string());

    assert_eq!(
        base_dates(&alert).unwrap(),
        dates(&[
            "2025-01-31T09:00",
            "2025-02-28T09:00",
            "2025-03-31T09:00",
            "2025-04-30T09:00",
            "2025-05-31T09:00",
        ])
    );
}

#[test]
fn never_ignores_interval_until_and_repeat_count() {
    let mut alert = Alert::absolute("2025-03-01T00:00");
    alert.interval = 0;
    alert.until = Some("not a date".to_string());
    alert.repeat_count = Some(9);

    assert_eq!(base_dates(&alert).unwrap(), dates(&["2025-03-01T00:00"]));
}

#[test]
fn blank_start_is_a_missing_field() {
    let alert = Alert::absolute("");
    assert_eq!(
        base_dates(&alert).unwrap_err(),
        ScheduleError::MissingField("startDateTime")
    );
}

#[test]
fn relative_mode_requires_all_offset_fields() {
    let mut alert = Alert::relative("2025-07-25", 1, "10:30");
    alert.offset_days = None;
    assert_eq!(
        base_dates(&alert).unwrap_err(),
        ScheduleError::MissingField("offsetDays")
    );

    let mut alert = Alert::relative("2025-07-25", 1, "");
    alert.offset_time = Some(String::new());
    assert_eq!(
        base_dates(&alert).unwrap_err(),
        ScheduleError::MissingField("offsetTime")
    );

    let alert = Alert::relative("07/25/2025", 1, "10:30");
    assert!(matches!(
        base_dates(&alert).unwrap_err(),
        ScheduleError::Unparseable { field: "expectedEnrollmentDate", .. }
    ));
}

#[test]
fn relative_offset_crosses_month_boundary() {
    let alert = Alert::relative("2025-01-30", 3, "06:05");
    assert_eq!(
        base_dates(&alert).unwrap(),
        vec![NaiveDate::from_ymd_opt(2025, 2, 2)
            .unwrap()
            .and_hms_opt(6, 5, 0)
            .unwrap()]
    );
}
