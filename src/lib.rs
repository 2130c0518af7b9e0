#![forbid(unsafe_code)]
//! OnCall — substitute-coverage planning for a school, file-backed (no DB).
//!
//! - Derives each teacher's single free period from their timetable.
//! - Partitions free teachers into four FIFO period pools.
//! - Matches unfilled absences to substitutes period-by-period, two
//!   supervision halves per covered period.
//! - School-year (Aug 20 boundary) and Sunday..Saturday week arithmetic.
//! - Storage as JSON files, timetable import/export as CSV.

pub mod calendar;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use calendar::{school_year, week_bounds, CalendarError};
pub use io::{export_schedule_csv, import_timetable_csv, sync_roster, RosterSyncReport, TimetableRow};
pub use model::{
    compute_available_period, name_index, Half, OnCallAssignment, Period, Teacher, TeacherId,
    UnfilledAbsence,
};
pub use scheduler::{
    available_teachers, partition_by_available_period, schedule_oncalls, OnCallSchedule,
    SchedError, ScheduleError, UnfilledSlot,
};
pub use storage::{AbsenceRepository, JsonStore, ScheduleRepository, TeacherRepository};
