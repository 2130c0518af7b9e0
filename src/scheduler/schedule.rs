use super::types::ScheduleError;
use crate::model::{Half, OnCallAssignment, Period, TeacherId};

/// A coverage gap: an absence half no substitute could be found for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfilledSlot {
    pub absent_teacher: TeacherId,
    pub period: Period,
    pub half: Half,
}

/// The on-call assignments produced by one allocation run, for a single
/// date. Purely in-memory until the caller explicitly persists it.
#[derive(Debug, Clone)]
pub struct OnCallSchedule {
    date: String,
    assignments: Vec<OnCallAssignment>,
    unfilled: Vec<UnfilledSlot>,
}

impl OnCallSchedule {
    pub fn new<D: Into<String>>(date: D) -> Self {
        Self {
            date: date.into(),
            assignments: Vec::new(),
            unfilled: Vec::new(),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Adds an assignment. A second booking of the same substitute slot
    /// (the equality key of `OnCallAssignment`) is rejected and leaves the
    /// schedule untouched.
    pub fn add(&mut self, oncall: OnCallAssignment) -> Result<(), ScheduleError> {
        if self.assignments.contains(&oncall) {
            return Err(ScheduleError::DuplicateSlot);
        }
        self.assignments.push(oncall);
        Ok(())
    }

    pub fn remove(&mut self, oncall: &OnCallAssignment) -> Result<(), ScheduleError> {
        match self.assignments.iter().position(|a| a == oncall) {
            Some(pos) => {
                self.assignments.remove(pos);
                Ok(())
            }
            None => Err(ScheduleError::UnknownSlot),
        }
    }

    pub fn assignments(&self) -> &[OnCallAssignment] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Coverage gaps recorded during allocation, in attempt order.
    pub fn unfilled(&self) -> &[UnfilledSlot] {
        &self.unfilled
    }

    pub(super) fn record_unfilled(&mut self, absent_teacher: TeacherId, period: Period, half: Half) {
        self.unfilled.push(UnfilledSlot {
            absent_teacher,
            period,
            half,
        });
    }

    /// Display projection: one `[absent, substitute, school_year, date,
    /// period, half]` row of strings per assignment.
    pub fn to_rows(&self) -> Vec<[String; 6]> {
        let mut ids = itoa::Buffer::new();
        self.assignments
            .iter()
            .map(|a| {
                [
                    ids.format(a.absent_teacher.get()).to_owned(),
                    ids.format(a.substitute.get()).to_owned(),
                    a.school_year.clone(),
                    a.date.clone(),
                    a.period.as_str().to_owned(),
                    a.half.as_str().to_owned(),
                ]
            })
            .collect()
    }
}
