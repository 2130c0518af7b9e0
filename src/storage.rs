use crate::model::{name_index, OnCallAssignment, Teacher, TeacherId, UnfilledAbsence};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Teacher roster persistence contract.
pub trait TeacherRepository {
    /// Returns every teacher row, active and inactive.
    fn load_teachers(&self) -> anyhow::Result<Vec<Teacher>>;
    /// Persists a new teacher and returns the assigned id. An active
    /// teacher with the same name is rejected.
    fn insert_teacher(&self, teacher: &Teacher) -> anyhow::Result<TeacherId>;
    fn update_teacher(&self, teacher: &Teacher) -> anyhow::Result<()>;
    fn deactivate_teacher(&self, id: TeacherId) -> anyhow::Result<()>;
}

/// Unfilled-absence persistence contract. Rows are keyed by date;
/// re-saving a date fully replaces its prior set.
pub trait AbsenceRepository {
    /// Returns the absence rows for exactly one date, empty if none.
    fn load_unfilled_absences(&self, date: &str) -> anyhow::Result<Vec<UnfilledAbsence>>;
    /// Replaces all absence rows for `date`, all-or-nothing.
    fn save_absences(&self, date: &str, rows: &[UnfilledAbsence]) -> anyhow::Result<()>;
}

/// On-call schedule persistence contract.
pub trait ScheduleRepository {
    fn load_schedule(&self, date: &str) -> anyhow::Result<Vec<OnCallAssignment>>;
    /// Replaces all on-call rows for the assignments' date, all-or-nothing.
    /// The date is taken from the first row; an empty batch is rejected.
    fn save_schedule(&self, assignments: &[OnCallAssignment]) -> anyhow::Result<()>;
    /// `(teacher name, assignment count)` pairs for one school year,
    /// name-sorted. Fairness reporting only; the allocator never reads it.
    fn oncall_totals(&self, school_year: &str) -> anyhow::Result<Vec<(String, u32)>>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    teachers: Vec<Teacher>,
    #[serde(default)]
    absences: Vec<UnfilledAbsence>,
    #[serde(default)]
    oncalls: Vec<OnCallAssignment>,
}

/// Single-file JSON store backing all three repositories. Every write goes
/// through a temp file and an atomic rename; a missing file reads as an
/// empty store.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    fn read(&self) -> anyhow::Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn write(&self, file: &StoreFile) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(file)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

impl TeacherRepository for JsonStore {
    fn load_teachers(&self) -> anyhow::Result<Vec<Teacher>> {
        Ok(self.read()?.teachers)
    }

    fn insert_teacher(&self, teacher: &Teacher) -> anyhow::Result<TeacherId> {
        let mut file = self.read()?;
        if file
            .teachers
            .iter()
            .any(|t| t.active && t.name == teacher.name)
        {
            bail!("active teacher named {:?} already exists", teacher.name);
        }
        let next = file
            .teachers
            .iter()
            .filter_map(|t| t.id)
            .map(TeacherId::get)
            .max()
            .unwrap_or(0)
            + 1;
        let id = TeacherId::new(next);
        let mut row = teacher.clone();
        row.id = Some(id);
        file.teachers.push(row);
        self.write(&file)?;
        Ok(id)
    }

    fn update_teacher(&self, teacher: &Teacher) -> anyhow::Result<()> {
        let Some(id) = teacher.id else {
            bail!("cannot update a teacher that has no id");
        };
        let mut file = self.read()?;
        let Some(slot) = file.teachers.iter_mut().find(|t| t.id == Some(id)) else {
            bail!("no teacher row with id {id}");
        };
        *slot = teacher.clone();
        self.write(&file)
    }

    fn deactivate_teacher(&self, id: TeacherId) -> anyhow::Result<()> {
        let mut file = self.read()?;
        let Some(slot) = file.teachers.iter_mut().find(|t| t.id == Some(id)) else {
            bail!("no teacher row with id {id}");
        };
        slot.deactivate();
        self.write(&file)
    }
}

impl AbsenceRepository for JsonStore {
    fn load_unfilled_absences(&self, date: &str) -> anyhow::Result<Vec<UnfilledAbsence>> {
        Ok(self
            .read()?
            .absences
            .into_iter()
            .filter(|row| row.date == date)
            .collect())
    }

    fn save_absences(&self, date: &str, rows: &[UnfilledAbsence]) -> anyhow::Result<()> {
        if let Some(stray) = rows.iter().find(|row| row.date != date) {
            bail!(
                "absence row for {} mixed into a save for {date}",
                stray.date
            );
        }
        let mut file = self.read()?;
        file.absences.retain(|row| row.date != date);
        file.absences.extend(rows.iter().cloned());
        self.write(&file)
    }
}

impl ScheduleRepository for JsonStore {
    fn load_schedule(&self, date: &str) -> anyhow::Result<Vec<OnCallAssignment>> {
        Ok(self
            .read()?
            .oncalls
            .into_iter()
            .filter(|a| a.date == date)
            .collect())
    }

    fn save_schedule(&self, assignments: &[OnCallAssignment]) -> anyhow::Result<()> {
        let Some(first) = assignments.first() else {
            bail!("refusing to save an empty on-call schedule");
        };
        let date = first.date.clone();
        if let Some(stray) = assignments.iter().find(|a| a.date != date) {
            bail!(
                "assignment for {} mixed into a save for {date}",
                stray.date
            );
        }
        let mut file = self.read()?;
        file.oncalls.retain(|a| a.date != date);
        file.oncalls.extend(assignments.iter().cloned());
        self.write(&file)
    }

    fn oncall_totals(&self, school_year: &str) -> anyhow::Result<Vec<(String, u32)>> {
        let file = self.read()?;
        let names = name_index(&file.teachers);
        let mut counts: HashMap<TeacherId, u32> = HashMap::new();
        for oncall in file.oncalls.iter().filter(|a| a.school_year == school_year) {
            *counts.entry(oncall.substitute).or_insert(0) += 1;
        }
        let mut ids = itoa::Buffer::new();
        let mut totals: Vec<(String, u32)> = counts
            .into_iter()
            .map(|(id, count)| {
                let name = names
                    .get(&id)
                    .map(|n| (*n).to_owned())
                    .unwrap_or_else(|| ids.format(id.get()).to_owned());
                (name, count)
            })
            .collect();
        totals.sort();
        Ok(totals)
    }
}
