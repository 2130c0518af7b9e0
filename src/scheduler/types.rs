use crate::calendar::CalendarError;
use crate::model::TeacherId;
use thiserror::Error;

/// Fatal errors for one allocation run.
#[derive(Error, Debug)]
pub enum SchedError {
    #[error(transparent)]
    InvalidDate(#[from] CalendarError),
    #[error("absence row references unknown teacher id {0}")]
    UnknownTeacher(TeacherId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Non-fatal outcomes of mutating an `OnCallSchedule`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("substitute is already booked for this date, period and half")]
    DuplicateSlot,
    #[error("assignment is not present in the schedule")]
    UnknownSlot,
}
