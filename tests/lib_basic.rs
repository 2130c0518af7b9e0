#![forbid(unsafe_code)]
use oncall::{
    calendar::{school_year, week_bounds, CalendarError},
    model::{compute_available_period, Half, OnCallAssignment, Period, Teacher, TeacherId, UnfilledAbsence},
    scheduler::{
        available_teachers, partition_by_available_period, schedule_oncalls, OnCallSchedule,
        SchedError, ScheduleError,
    },
    storage::{AbsenceRepository, JsonStore, TeacherRepository},
};
use std::collections::VecDeque;
use tempfile::tempdir;

fn slots(labels: [&str; 4]) -> [Option<String>; 4] {
    labels.map(|label| {
        if label.is_empty() {
            None
        } else {
            Some(label.to_owned())
        }
    })
}

#[test]
fn school_year_buckets_on_august_20() {
    assert_eq!(school_year("20250516").unwrap(), "2024/2025");
    assert_eq!(school_year("20250819").unwrap(), "2024/2025");
    assert_eq!(school_year("20250820").unwrap(), "2025/2026");
    assert_eq!(school_year("19871201").unwrap(), "1987/1988");
}

#[test]
fn school_year_rejects_malformed_dates() {
    for bad in ["202505005", "2025051", "2025O516", "20251301", "20250230", ""] {
        assert!(
            matches!(school_year(bad), Err(CalendarError::InvalidDateFormat(_))),
            "expected rejection of {bad:?}"
        );
    }
}

#[test]
fn week_bounds_is_stable_across_a_sunday_to_saturday_span() {
    // 2025-05-25 is a Sunday.
    let expected = ("20250525".to_owned(), "20250531".to_owned());
    for day in [
        "20250525", "20250526", "20250527", "20250528", "20250529", "20250530", "20250531",
    ] {
        assert_eq!(week_bounds(day).unwrap(), expected, "span member {day}");
    }
    assert_eq!(
        week_bounds("20250601").unwrap(),
        ("20250601".to_owned(), "20250607".to_owned())
    );
}

#[test]
fn one_free_period_is_the_available_period() {
    assert_eq!(
        compute_available_period(&slots(["", "A", "B", "C"])),
        Some(Period::First)
    );
    assert_eq!(
        compute_available_period(&slots(["A", "", "B", "C"])),
        Some(Period::Second)
    );
    assert_eq!(
        compute_available_period(&slots(["A", "B", "", "C"])),
        Some(Period::Third)
    );
    assert_eq!(
        compute_available_period(&slots(["A", "B", "C", ""])),
        Some(Period::Fourth)
    );
}

#[test]
fn fully_scheduled_teacher_has_no_available_period() {
    assert_eq!(compute_available_period(&slots(["A", "B", "C", "D"])), None);
}

#[test]
fn empty_timetable_has_no_available_period() {
    assert_eq!(compute_available_period(&slots(["", "", "", ""])), None);
}

#[test]
fn part_time_preference_lands_on_the_opposite_side_of_the_day() {
    // first taught period 1: prefer 2, then 3, then 4
    assert_eq!(
        compute_available_period(&slots(["A", "", "", "D"])),
        Some(Period::Second)
    );
    assert_eq!(
        compute_available_period(&slots(["A", "B", "", ""])),
        Some(Period::Third)
    );
    // first taught period 2: prefer 1
    assert_eq!(
        compute_available_period(&slots(["", "B", "", ""])),
        Some(Period::First)
    );
    // first taught period 3: prefer 4, falling back to 2
    assert_eq!(
        compute_available_period(&slots(["", "", "C", ""])),
        Some(Period::Fourth)
    );
    assert_eq!(
        compute_available_period(&slots(["", "", "C", "D"])),
        Some(Period::Second)
    );
    // first taught period 4: prefer 3
    assert_eq!(
        compute_available_period(&slots(["", "", "", "D"])),
        Some(Period::Third)
    );
}

#[test]
fn blank_labels_normalize_to_free_periods() {
    let teacher = Teacher::new("x", slots(["   ", "B", "C", "D"]));
    assert_eq!(teacher.periods[0], None);
    assert_eq!(teacher.available, Some(Period::First));
}

#[test]
fn deactivate_clears_timetable_and_availability() {
    let mut teacher = Teacher::new("x", slots(["A", "B", "C", ""]));
    assert_eq!(teacher.available, Some(Period::Fourth));
    teacher.deactivate();
    assert!(!teacher.active);
    assert_eq!(teacher.periods, [None, None, None, None]);
    assert_eq!(teacher.available, None);
}

#[test]
fn set_periods_recomputes_availability() {
    let mut teacher = Teacher::new("x", slots(["A", "B", "C", ""]));
    teacher.set_periods(slots(["", "B", "C", "D"]));
    assert_eq!(teacher.available, Some(Period::First));
}

fn fixture_roster() -> Vec<Teacher> {
    let rows: [(&str, [&str; 4]); 9] = [
        (
            "teacher1",
            ["MFM2PE-02 (S-202)", "PPL1OE-04 (GYM)", "", "PPL1/2/3/4OE-02 (GYM)"],
        ),
        (
            "teacher2",
            ["", "TMJ2OE-02 (T-101)", "TMJ3/4CE-02 (T-101)", "TIJ1OE-02 (T-101)"],
        ),
        (
            "teacher3",
            ["MCV/MDM4UQ-01 (S-204)", "MTH1WE-02 (S-204)", "MPM2DE-02 (S-204)", ""],
        ),
        (
            "teacher4",
            ["Literacy", "", "CHA3UE-01 (G-202)", "CHC2DE-02 (G-202)"],
        ),
        (
            "teacher5",
            ["ST/GP/ID/RCR-05 (I-102)", "ST/GP/ID/RCR-06 (I-102)", "PAF1/2/3/4OE-02 (GYM)", ""],
        ),
        (
            "teacher6",
            ["", "NBE3CE-02 (G-206)", "ST/GP/ID/RCR-07 (I-102)", "ST/GP/ID/RCR-08 (I-102)"],
        ),
        (
            "teacher7",
            ["SPH3U/4CE-01 (S-203)", "", "SCH3/4UE-02 (S-203)", "SPH3/4UE-01 (S-203)"],
        ),
        (
            "teacher8",
            ["KPPDNE-02 (B-108)", "", "KPHDNE-02 (B-108)", "KGLDNE-02 (B-108)"],
        ),
        (
            "teacher9",
            ["PPL2OE-02 (GYM)", "PAF2/3/4OE-03 (GYM)", "", "SNC2DE-02 (S-208)"],
        ),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (name, labels))| {
            let mut teacher = Teacher::new(*name, slots(*labels));
            teacher.id = Some(TeacherId::new(i as i64 + 1));
            teacher
        })
        .collect()
}

fn pool_ids(pool: &VecDeque<TeacherId>) -> Vec<i64> {
    pool.iter().map(|id| id.get()).collect()
}

#[test]
fn partition_groups_by_available_period_in_roster_order() {
    let roster = fixture_roster();
    let refs: Vec<&Teacher> = roster.iter().collect();
    let pools = partition_by_available_period(&refs);
    assert_eq!(pool_ids(&pools[0]), vec![2, 6]);
    assert_eq!(pool_ids(&pools[1]), vec![4, 7, 8]);
    assert_eq!(pool_ids(&pools[2]), vec![1, 9]);
    assert_eq!(pool_ids(&pools[3]), vec![3, 5]);
}

#[test]
fn an_absent_teacher_is_excluded_from_every_pool() {
    let roster = fixture_roster();
    let absent = vec![UnfilledAbsence::new(
        "20250526",
        TeacherId::new(2),
        [false, false, true, false],
    )];
    let free = available_teachers(&roster, &absent);
    assert_eq!(free.len(), 8);
    assert!(free.iter().all(|t| t.id != Some(TeacherId::new(2))));

    // a row with no flagged period does not exclude
    let quiet = vec![UnfilledAbsence::new("20250526", TeacherId::new(2), [false; 4])];
    assert_eq!(available_teachers(&roster, &quiet).len(), 9);
}

#[test]
fn inactive_teachers_never_enter_the_pool() {
    let mut roster = fixture_roster();
    roster[0].deactivate();
    assert_eq!(available_teachers(&roster, &[]).len(), 8);
}

fn sample_oncall() -> OnCallAssignment {
    OnCallAssignment {
        absent_teacher: TeacherId::new(1),
        substitute: TeacherId::new(5),
        date: "20250526".to_owned(),
        school_year: "2024/2025".to_owned(),
        period: Period::First,
        half: Half::First,
    }
}

#[test]
fn schedule_rejects_a_double_booked_slot() {
    let mut schedule = OnCallSchedule::new("20250526");
    schedule.add(sample_oncall()).unwrap();

    // a different absentee cannot claim the same substitute slot
    let mut other_absentee = sample_oncall();
    other_absentee.absent_teacher = TeacherId::new(2);
    assert_eq!(
        schedule.add(other_absentee),
        Err(ScheduleError::DuplicateSlot)
    );
    assert_eq!(schedule.len(), 1);

    // the other half of the period is a distinct slot
    let mut second_half = sample_oncall();
    second_half.half = Half::Second;
    assert!(schedule.add(second_half).is_ok());
    assert_eq!(schedule.len(), 2);
}

#[test]
fn schedule_remove_roundtrip() {
    let mut schedule = OnCallSchedule::new("20250526");
    schedule.add(sample_oncall()).unwrap();
    assert_eq!(schedule.remove(&sample_oncall()), Ok(()));
    assert_eq!(
        schedule.remove(&sample_oncall()),
        Err(ScheduleError::UnknownSlot)
    );
    assert!(schedule.is_empty());
}

#[test]
fn to_rows_projects_display_strings() {
    let mut schedule = OnCallSchedule::new("20250526");
    schedule.add(sample_oncall()).unwrap();
    assert_eq!(
        schedule.to_rows(),
        vec![["1", "5", "2024/2025", "20250526", "period1", "1st"].map(String::from)]
    );
}

#[test]
fn end_to_end_allocation_for_two_absences() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("oncall.json")).unwrap();
    for (name, labels) in [
        ("absent-p1", ["ENG2D-01", "ENG3U-01", "ENG4U-02", ""]),
        ("absent-p2", ["SCH3U-01", "SCH4U-01", "SNC2D-03", ""]),
        ("cover-a", ["", "MPM1D-01", "MPM2D-01", "MCR3U-01"]),
        ("cover-b", ["", "GLC2O-02", "CGC1D-01", "CHV2O-01"]),
        ("cover-c", ["AMU2O-01", "", "AMU3M-01", "AVI1O-01"]),
        ("cover-d", ["TEJ2O-01", "", "TEJ3M-01", "TAS1O-01"]),
    ] {
        store
            .insert_teacher(&Teacher::new(name, slots(labels)))
            .unwrap();
    }
    let date = "20250526";
    let rows = vec![
        UnfilledAbsence::new(date, TeacherId::new(1), [true, false, false, false]),
        UnfilledAbsence::new(date, TeacherId::new(2), [false, true, false, false]),
    ];
    store.save_absences(date, &rows).unwrap();

    let schedule = schedule_oncalls(&store, date).unwrap();
    assert_eq!(schedule.len(), 4);
    assert!(schedule.unfilled().is_empty());

    let picks: Vec<(i64, i64, Period, Half)> = schedule
        .assignments()
        .iter()
        .map(|a| (a.absent_teacher.get(), a.substitute.get(), a.period, a.half))
        .collect();
    assert_eq!(
        picks,
        vec![
            (1, 3, Period::First, Half::First),
            (1, 4, Period::First, Half::Second),
            (2, 5, Period::Second, Half::First),
            (2, 6, Period::Second, Half::Second),
        ]
    );
    for a in schedule.assignments() {
        assert_eq!(a.school_year, "2024/2025");
        assert_eq!(a.date, date);
    }
}

#[test]
fn untaught_periods_are_ignored_and_exhausted_pools_stay_silent() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("oncall.json")).unwrap();
    // absent teacher is free in period 2, teaches period 1
    store
        .insert_teacher(&Teacher::new("part-timer", slots(["HIS2D-01", "", "HIS3U-01", "HIS4U-01"])))
        .unwrap();
    // a single period-1 substitute
    store
        .insert_teacher(&Teacher::new("cover", slots(["", "FRE1D-01", "FRE2D-01", "FRE3U-01"])))
        .unwrap();
    let date = "20250526";
    // period 2 is flagged but not taught; it must produce neither an
    // assignment nor a recorded gap
    let rows = vec![UnfilledAbsence::new(
        date,
        TeacherId::new(1),
        [true, true, false, false],
    )];
    store.save_absences(date, &rows).unwrap();

    let schedule = schedule_oncalls(&store, date).unwrap();
    assert_eq!(schedule.len(), 1);
    let only = &schedule.assignments()[0];
    assert_eq!(only.substitute, TeacherId::new(2));
    assert_eq!((only.period, only.half), (Period::First, Half::First));

    // the pool ran dry for the second half of period 1
    assert_eq!(schedule.unfilled().len(), 1);
    let gap = &schedule.unfilled()[0];
    assert_eq!(
        (gap.absent_teacher, gap.period, gap.half),
        (TeacherId::new(1), Period::First, Half::Second)
    );
}

#[test]
fn unknown_absent_teacher_aborts_the_run() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("oncall.json")).unwrap();
    let date = "20250526";
    let rows = vec![UnfilledAbsence::new(
        date,
        TeacherId::new(99),
        [true, false, false, false],
    )];
    store.save_absences(date, &rows).unwrap();

    let err = schedule_oncalls(&store, date).unwrap_err();
    assert!(matches!(err, SchedError::UnknownTeacher(id) if id.get() == 99));
}

#[test]
fn malformed_date_aborts_before_touching_storage() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("oncall.json")).unwrap();
    let err = schedule_oncalls(&store, "2025-05-26").unwrap_err();
    assert!(matches!(err, SchedError::InvalidDate(_)));
}
