#![forbid(unsafe_code)]
use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use oncall::{
    calendar,
    io::{export_schedule_csv, import_timetable_csv, sync_roster},
    model::{name_index, Period, TeacherId, UnfilledAbsence},
    scheduler::schedule_oncalls,
    storage::{AbsenceRepository, JsonStore, ScheduleRepository, TeacherRepository},
};
use std::collections::HashMap;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Minimal on-call coverage CLI (no database)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Enable logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// JSON store file
    #[arg(long, global = true, default_value = "oncall.json")]
    store: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a timetable CSV and reconcile the roster with it
    Import {
        #[arg(long)]
        csv: String,
    },

    /// List the teacher roster with each derived free period
    Teachers,

    /// Record a teacher's absence for a date (replaces their previous row)
    MarkAbsent {
        /// YYYYMMDD, defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        name: String,
        /// Comma-separated period numbers, or "all"
        #[arg(long)]
        periods: String,
    },

    /// List the unfilled absences recorded for a date
    Absences {
        /// YYYYMMDD, defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Allocate substitutes for a date's absences and persist the schedule
    Schedule {
        /// YYYYMMDD, defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Export the schedule as CSV (optional)
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Per-teacher on-call totals for a school year
    Totals {
        /// "YYYY/YYYY", defaults to the school year containing today
        #[arg(long)]
        year: Option<String>,
    },

    /// Show the Sunday..Saturday week containing a date
    Week {
        /// YYYYMMDD, defaults to today
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let store = JsonStore::open(&cli.store)?;

    let code = match cli.cmd {
        Commands::Import { csv } => {
            let rows = import_timetable_csv(csv)?;
            let report = sync_roster(&store, &rows)?;
            println!(
                "roster synced: {} added, {} updated, {} deactivated",
                report.added, report.updated, report.deactivated
            );
            0
        }
        Commands::Teachers => {
            for teacher in store.load_teachers()? {
                let id = teacher
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_owned());
                let free = teacher
                    .available
                    .map(|p| p.as_str())
                    .unwrap_or("none");
                let state = if teacher.active { "" } else { " (inactive)" };
                println!("{} | {} | free: {}{}", id, teacher.name, free, state);
            }
            0
        }
        Commands::MarkAbsent {
            date,
            name,
            periods,
        } => {
            let date = date.unwrap_or_else(today);
            calendar::school_year(&date)?;
            let flags = parse_period_flags(&periods)?;
            let roster = store.load_teachers()?;
            let teacher = roster
                .iter()
                .filter(|t| t.active)
                .find(|t| t.name == name)
                .ok_or_else(|| anyhow!("unknown active teacher: {name}"))?;
            let id = teacher
                .id
                .ok_or_else(|| anyhow!("teacher {name} has no persisted id"))?;
            let mut rows = store.load_unfilled_absences(&date)?;
            rows.retain(|row| row.teacher != id);
            rows.push(UnfilledAbsence::new(date.clone(), id, flags));
            store.save_absences(&date, &rows)?;
            println!("recorded absence for {name} on {date}");
            0
        }
        Commands::Absences { date } => {
            let date = date.unwrap_or_else(today);
            let roster = store.load_teachers()?;
            let names = name_index(&roster);
            for row in store.load_unfilled_absences(&date)? {
                let flagged: Vec<&str> = Period::ALL
                    .iter()
                    .filter(|p| row.flagged(**p))
                    .map(|p| p.as_str())
                    .collect();
                println!(
                    "{} | {} | {}",
                    date,
                    resolve(&names, row.teacher),
                    flagged.join(", ")
                );
            }
            0
        }
        Commands::Schedule { date, out_csv } => {
            let date = date.unwrap_or_else(today);
            let schedule = schedule_oncalls(&store, &date)?;
            let roster = store.load_teachers()?;
            let names = name_index(&roster);
            for a in schedule.assignments() {
                println!(
                    "{} {} | {} covers {}",
                    a.period,
                    a.half,
                    resolve(&names, a.substitute),
                    resolve(&names, a.absent_teacher)
                );
            }
            if schedule.is_empty() {
                println!("no cover needed for {date}");
            } else {
                store.save_schedule(schedule.assignments())?;
                if let Some(path) = out_csv {
                    export_schedule_csv(path, &schedule, &roster)?;
                }
            }
            if schedule.unfilled().is_empty() {
                0
            } else {
                for gap in schedule.unfilled() {
                    eprintln!(
                        "unfilled: {} {} for {}",
                        gap.period,
                        gap.half,
                        resolve(&names, gap.absent_teacher)
                    );
                }
                // Code 2 = completed with coverage gaps
                2
            }
        }
        Commands::Totals { year } => {
            let year = match year {
                Some(year) => year,
                None => calendar::school_year(&today())?,
            };
            for (name, count) in store.oncall_totals(&year)? {
                println!("{name}: {count}");
            }
            0
        }
        Commands::Week { date } => {
            let date = date.unwrap_or_else(today);
            let (start, end) = calendar::week_bounds(&date)?;
            println!("{start}..{end}");
            0
        }
    };

    std::process::exit(code);
}

fn today() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

fn resolve(names: &HashMap<TeacherId, &str>, id: TeacherId) -> String {
    names
        .get(&id)
        .map(|name| (*name).to_owned())
        .unwrap_or_else(|| id.to_string())
}

fn parse_period_flags(raw: &str) -> Result<[bool; 4]> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok([true; 4]);
    }
    let mut flags = [false; 4];
    for chunk in raw.split(',') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        let n: u8 = chunk
            .parse()
            .map_err(|_| anyhow!("invalid period number: {chunk}"))?;
        match Period::from_number(n) {
            Some(period) => flags[period.index()] = true,
            None => bail!("period number out of range 1..=4: {n}"),
        }
    }
    if flags.iter().all(|&f| !f) {
        bail!("no periods given; use e.g. --periods 1,3 or --periods all");
    }
    Ok(flags)
}
