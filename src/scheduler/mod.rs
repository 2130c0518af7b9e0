mod pools;
mod schedule;
mod types;

pub use pools::{available_teachers, partition_by_available_period};
pub use schedule::{OnCallSchedule, UnfilledSlot};
pub use types::{SchedError, ScheduleError};

use crate::calendar;
use crate::model::{Half, OnCallAssignment, Period, TeacherId};
use crate::storage::{AbsenceRepository, TeacherRepository};
use std::collections::VecDeque;

/// Matches one date's unfilled absences against the availability pools and
/// returns the resulting schedule.
///
/// Absence rows are processed in storage order, periods 1 to 4, halves
/// "1st" then "2nd", so a run is reproducible given identical inputs. A
/// period is only actionable when the absence flags it and the absent
/// teacher actually teaches it. A half with no free substitute left is
/// recorded as an unfilled slot and produces no assignment.
///
/// The engine holds no state between runs; each call works on a fresh
/// snapshot loaded from the repositories. Concurrent runs for the same date
/// are not isolated beyond last-writer-wins at the persistence boundary, so
/// callers must serialize per date.
pub fn schedule_oncalls<S>(store: &S, date: &str) -> Result<OnCallSchedule, SchedError>
where
    S: TeacherRepository + AbsenceRepository,
{
    let school_year = calendar::school_year(date)?;
    let roster = store.load_teachers()?;
    let absences = store.load_unfilled_absences(date)?;

    let free = available_teachers(&roster, &absences);
    let mut pools = partition_by_available_period(&free);

    let mut schedule = OnCallSchedule::new(date);
    for row in &absences {
        let absent = roster
            .iter()
            .find(|t| t.id == Some(row.teacher))
            .ok_or(SchedError::UnknownTeacher(row.teacher))?;
        for period in Period::ALL {
            if row.flagged(period) && absent.teaches(period) {
                for half in Half::ALL {
                    apply_oncall(
                        &mut pools,
                        &mut schedule,
                        row.teacher,
                        period,
                        half,
                        date,
                        &school_year,
                    );
                }
            }
        }
    }
    Ok(schedule)
}

/// Books the front of the period pool for one half, or records the gap when
/// the pool is exhausted.
fn apply_oncall(
    pools: &mut [VecDeque<TeacherId>; 4],
    schedule: &mut OnCallSchedule,
    absent_teacher: TeacherId,
    period: Period,
    half: Half,
    date: &str,
    school_year: &str,
) {
    let Some(substitute) = pools[period.index()].pop_front() else {
        schedule.record_unfilled(absent_teacher, period, half);
        return;
    };
    // Each substitute sits in exactly one pool and is popped at most once,
    // so the slot key cannot collide.
    let _ = schedule.add(OnCallAssignment {
        absent_teacher,
        substitute,
        date: date.to_owned(),
        school_year: school_year.to_owned(),
        period,
        half,
    });
}
