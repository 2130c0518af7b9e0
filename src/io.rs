use crate::model::{name_index, Teacher, TeacherId};
use crate::scheduler::OnCallSchedule;
use crate::storage::TeacherRepository;
use anyhow::Context;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// One imported timetable line: a teacher name and four period labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableRow {
    pub name: String,
    pub periods: [Option<String>; 4],
}

/// Imports a timetable CSV with header
/// `name,period1,period2,lunch,period3,period4`. The lunch column (index 3)
/// is always skipped, as are rows with a blank name; empty period cells
/// mean the teacher is free that period.
pub fn import_timetable_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TimetableRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name column")?.trim();
        if name.is_empty() {
            continue;
        }
        let mut periods: [Option<String>; 4] = [None, None, None, None];
        for (slot, col) in [(0usize, 1usize), (1, 2), (2, 4), (3, 5)] {
            periods[slot] = rec
                .get(col)
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_owned);
        }
        out.push(TimetableRow {
            name: name.to_owned(),
            periods,
        });
    }
    Ok(out)
}

/// Outcome of reconciling the roster against an imported timetable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterSyncReport {
    pub added: usize,
    pub updated: usize,
    pub deactivated: usize,
}

/// Reconciles the persisted roster with an imported timetable. Teachers
/// present in the import get their periods (and derived availability)
/// refreshed, or are inserted when new; active teachers missing from the
/// import are deactivated.
pub fn sync_roster<R>(repo: &R, rows: &[TimetableRow]) -> anyhow::Result<RosterSyncReport>
where
    R: TeacherRepository + ?Sized,
{
    let roster = repo.load_teachers()?;
    let mut report = RosterSyncReport::default();
    let mut seen: HashSet<&str> = HashSet::new();
    for row in rows {
        seen.insert(row.name.as_str());
        match roster.iter().find(|t| t.name == row.name) {
            Some(existing) => {
                let mut teacher = existing.clone();
                teacher.set_periods(row.periods.clone());
                // A returning teacher comes back active.
                teacher.active = true;
                repo.update_teacher(&teacher)?;
                report.updated += 1;
            }
            None => {
                repo.insert_teacher(&Teacher::new(row.name.clone(), row.periods.clone()))?;
                report.added += 1;
            }
        }
    }
    for teacher in roster.iter().filter(|t| t.active) {
        if let Some(id) = teacher.id {
            if !seen.contains(teacher.name.as_str()) {
                repo.deactivate_teacher(id)?;
                report.deactivated += 1;
            }
        }
    }
    Ok(report)
}

/// Exports a schedule as CSV with header
/// `absent,substitute,school_year,date,period,half`; teacher ids are
/// resolved to names where the roster knows them.
pub fn export_schedule_csv<P: AsRef<Path>>(
    path: P,
    schedule: &OnCallSchedule,
    roster: &[Teacher],
) -> anyhow::Result<()> {
    let names = name_index(roster);
    let mut ids = itoa::Buffer::new();
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "absent",
        "substitute",
        "school_year",
        "date",
        "period",
        "half",
    ])?;
    for a in schedule.assignments() {
        let absent = display_name(&names, &mut ids, a.absent_teacher);
        let substitute = display_name(&names, &mut ids, a.substitute);
        w.write_record([
            absent.as_str(),
            substitute.as_str(),
            a.school_year.as_str(),
            a.date.as_str(),
            a.period.as_str(),
            a.half.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn display_name(
    names: &HashMap<TeacherId, &str>,
    ids: &mut itoa::Buffer,
    id: TeacherId,
) -> String {
    names
        .get(&id)
        .map(|name| (*name).to_owned())
        .unwrap_or_else(|| ids.format(id.get()).to_owned())
}
