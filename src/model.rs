use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Strong identifier for a Teacher row, assigned by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeacherId(i64);

impl TeacherId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four class periods of a school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "period1")]
    First,
    #[serde(rename = "period2")]
    Second,
    #[serde(rename = "period3")]
    Third,
    #[serde(rename = "period4")]
    Fourth,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::First, Period::Second, Period::Third, Period::Fourth];

    /// 0-based slot in a `[_; 4]` timetable.
    pub fn index(self) -> usize {
        match self {
            Period::First => 0,
            Period::Second => 1,
            Period::Third => 2,
            Period::Fourth => 3,
        }
    }

    pub fn from_index(idx: usize) -> Option<Period> {
        Period::ALL.get(idx).copied()
    }

    /// 1-based period number as printed on the timetable.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_number(n: u8) -> Option<Period> {
        n.checked_sub(1).and_then(|i| Period::from_index(i as usize))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::First => "period1",
            Period::Second => "period2",
            Period::Third => "period3",
            Period::Fourth => "period4",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two supervision shifts generated per covered period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
}

impl Half {
    pub const ALL: [Half; 2] = [Half::First, Half::Second];

    pub fn as_str(self) -> &'static str {
        match self {
            Half::First => "1st",
            Half::Second => "2nd",
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A teacher and their weekly timetable. Period labels are opaque to the
/// engine; only presence (teaching) or absence (free) matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// `None` until the row has been persisted.
    pub id: Option<TeacherId>,
    pub name: String,
    pub periods: [Option<String>; 4],
    /// The single period usable for on-call coverage. Derived from `periods`
    /// and kept in sync by `set_periods`/`deactivate`.
    pub available: Option<Period>,
    pub active: bool,
}

impl Teacher {
    pub fn new<N: Into<String>>(name: N, periods: [Option<String>; 4]) -> Self {
        let periods = normalize_periods(periods);
        let available = compute_available_period(&periods);
        Self {
            id: None,
            name: name.into(),
            periods,
            available,
            active: true,
        }
    }

    /// Replaces the timetable and recomputes the available period.
    pub fn set_periods(&mut self, periods: [Option<String>; 4]) {
        self.periods = normalize_periods(periods);
        self.available = compute_available_period(&self.periods);
    }

    pub fn teaches(&self, period: Period) -> bool {
        self.periods[period.index()].is_some()
    }

    /// Clears the timetable and availability and takes the teacher out of
    /// every absence/availability query. Rows are never physically deleted.
    pub fn deactivate(&mut self) {
        self.periods = [None, None, None, None];
        self.available = None;
        self.active = false;
    }
}

fn normalize_periods(periods: [Option<String>; 4]) -> [Option<String>; 4] {
    periods.map(|label| {
        label.and_then(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        })
    })
}

/// Derives the single coverable free period from a timetable.
///
/// A full-time teacher (exactly one free period) is available in that
/// period. A part-time teacher (two or more free periods) is placed on the
/// opposite side of the day from their first taught period, using a fixed
/// preference table. A fully scheduled timetable, or one with no taught
/// period at all, yields `None`.
pub fn compute_available_period(periods: &[Option<String>; 4]) -> Option<Period> {
    let free_count = periods.iter().filter(|p| p.is_none()).count();
    match free_count {
        0 => None,
        1 => periods
            .iter()
            .position(Option::is_none)
            .and_then(Period::from_index),
        _ => {
            let first_taught = periods.iter().position(Option::is_some)?;
            // Preference order per first taught period; the period-4 row has
            // only two fallbacks.
            let preferred: &[usize] = match first_taught {
                0 => &[1, 2, 3],
                1 => &[0, 2, 3],
                2 => &[3, 1, 0],
                _ => &[2, 0],
            };
            preferred
                .iter()
                .copied()
                .find(|&idx| periods[idx].is_none())
                .and_then(Period::from_index)
        }
    }
}

/// A teacher's reported absence for specific periods on one date, not yet
/// matched to a substitute. One row per (date, teacher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfilledAbsence {
    /// Compact `YYYYMMDD` date.
    pub date: String,
    pub teacher: TeacherId,
    pub periods: [bool; 4],
}

impl UnfilledAbsence {
    pub fn new<D: Into<String>>(date: D, teacher: TeacherId, periods: [bool; 4]) -> Self {
        Self {
            date: date.into(),
            teacher,
            periods,
        }
    }

    pub fn flagged(&self, period: Period) -> bool {
        self.periods[period.index()]
    }

    /// True when at least one period of the day needs coverage.
    pub fn needs_cover(&self) -> bool {
        self.periods.iter().any(|&flag| flag)
    }
}

/// One substitute booking: a teacher covering half of one period of an
/// absent colleague's day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnCallAssignment {
    pub absent_teacher: TeacherId,
    pub substitute: TeacherId,
    /// Compact `YYYYMMDD` date.
    pub date: String,
    /// `"YYYY/YYYY"` school-year tag, derived from `date`.
    pub school_year: String,
    pub period: Period,
    pub half: Half,
}

/// Equality is the booking-slot key (substitute, date, period, half): two
/// absent teachers cannot both claim the same substitute slot. The absent
/// teacher and the derived school year do not participate.
impl PartialEq for OnCallAssignment {
    fn eq(&self, other: &Self) -> bool {
        self.substitute == other.substitute
            && self.date == other.date
            && self.period == other.period
            && self.half == other.half
    }
}

impl Eq for OnCallAssignment {}

/// Lookup table from teacher id to display name, for row projections.
pub fn name_index(roster: &[Teacher]) -> HashMap<TeacherId, &str> {
    roster
        .iter()
        .filter_map(|t| t.id.map(|id| (id, t.name.as_str())))
        .collect()
}
