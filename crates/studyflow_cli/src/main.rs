//! Command-line entry point over `studyflow_core`.
//!
//! # Responsibility
//! - Inspect, schedule and preview study documents from disk.
//! - Save documents into and list versions from a study database.
//! - Keep all invariants in core; this binary only maps flags and prints.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use studyflow_core::calendar::CalendarDay;
use studyflow_core::db::open_db;
use studyflow_core::service::designer_service::{
    import_study_json, preview_month, schedule_store, schedule_summaries,
};
use studyflow_core::{
    core_version, init_logging, DesignerService, EngineConfig, GraphStore, GridOptions,
    SqliteStudyRepository,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Study designer toolkit: check, schedule and preview study documents.
#[derive(Parser)]
#[command(name = "studyflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Absolute directory for rolling log files (logging is off when omitted)
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Engine configuration JSON (recurrence caps, title lengths)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a study document and verify its structure
    Check {
        /// Path to the study JSON file
        file: PathBuf,
    },

    /// List every notification occurrence of a study
    Schedule {
        /// Path to the study JSON file
        file: PathBuf,

        /// Print occurrences as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render one month of the notification calendar
    Calendar {
        /// Path to the study JSON file
        file: PathBuf,

        /// Month to render (YYYY-MM)
        #[arg(short, long)]
        month: String,

        /// Date highlighted as today (YYYY-MM-DD, defaults to local today)
        #[arg(long)]
        today: Option<String>,

        /// Date highlighted as selected (YYYY-MM-DD)
        #[arg(long)]
        select: Option<String>,
    },

    /// Save a study document as a new version
    Save {
        /// Path to the study JSON file
        file: PathBuf,

        /// Path to the study database
        #[arg(long)]
        db: PathBuf,
    },

    /// List saved versions of a study, newest first
    Versions {
        /// Study id
        study_id: String,

        /// Path to the study database
        #[arg(long)]
        db: PathBuf,

        /// Maximum number of versions to show (1-100)
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or(config.log_level.as_str());
        init_logging(level, log_dir)?;
    }

    match cli.command {
        Commands::Check { file } => check(&file, &config),
        Commands::Schedule { file, json } => schedule(&file, json, &config),
        Commands::Calendar {
            file,
            month,
            today,
            select,
        } => calendar(&file, &month, today.as_deref(), select.as_deref(), &config),
        Commands::Save { file, db } => save(&file, &db, config),
        Commands::Versions {
            study_id,
            db,
            limit,
        } => versions(&study_id, &db, limit, config),
        Commands::Version => {
            println!("studyflow {}", core_version());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn load_store(file: &Path, config: &EngineConfig) -> CliResult<GraphStore> {
    let text = std::fs::read_to_string(file)?;
    let store = import_study_json(&text, config)?;
    info!("event=cli_load module=cli status=ok nodes={}", store.len());
    Ok(store)
}

fn check(file: &Path, config: &EngineConfig) -> CliResult<()> {
    let store = load_store(file, config)?;
    let study = store.materialize()?;
    println!(
        "ok study_id={} modules={} nodes={}",
        study.properties.study_id,
        study.modules.len(),
        store.len()
    );
    for (id, name) in store.module_ids() {
        println!("  module {id} \"{name}\"");
    }

    let report = schedule_store(&store, config);
    for failure in &report.failures {
        println!(
            "  warning: module {} cannot be scheduled: {}",
            failure.module_id, failure.error
        );
    }
    Ok(())
}

fn schedule(file: &Path, json: bool, config: &EngineConfig) -> CliResult<()> {
    let store = load_store(file, config)?;
    let report = schedule_store(&store, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report.occurrences)?);
    } else {
        for (module_id, summary) in schedule_summaries(&store, config) {
            match summary {
                Ok(summary) => println!("{module_id}: {}", summary.description),
                Err(err) => println!("{module_id}: cannot be scheduled: {err}"),
            }
        }
        for occurrence in &report.occurrences {
            println!(
                "{}  {:>8}  {}  {}{}",
                occurrence.datetime(),
                occurrence.time(),
                occurrence.module(),
                occurrence.name(),
                occurrence
                    .random_offset()
                    .map(|offset| format!(" ({offset})"))
                    .unwrap_or_default()
            );
        }
    }

    if !report.is_clean() {
        eprintln!("{} module(s) could not be scheduled", report.failures.len());
    }
    Ok(())
}

fn calendar(
    file: &Path,
    month: &str,
    today: Option<&str>,
    select: Option<&str>,
    config: &EngineConfig,
) -> CliResult<()> {
    let store = load_store(file, config)?;
    let reference = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .map_err(|_| format!("month must be YYYY-MM, got `{month}`"))?;
    let options = GridOptions {
        today: Some(match today {
            Some(raw) => parse_day(raw)?,
            None => Local::now().date_naive(),
        }),
        selected: select.map(parse_day).transpose()?,
    };

    let preview = preview_month(&store, reference, options, config)?;
    println!("{}", reference.format("%B %Y"));
    println!(" Mon    Tue    Wed    Thu    Fri    Sat    Sun");
    for week in preview.grid.weeks() {
        println!("{}", week.iter().map(render_cell).collect::<String>());
    }
    for day in preview.grid.days().iter().filter(|day| day.is_current_month) {
        for event in &day.events {
            println!("{} {:>8} {}", day.date, event.time(), event.name());
        }
    }
    for failure in &preview.failures {
        eprintln!(
            "module {} cannot be scheduled: {}",
            failure.module_id, failure.error
        );
    }
    Ok(())
}

fn render_cell(day: &CalendarDay) -> String {
    let marker = match (day.is_today, day.is_selected) {
        (_, true) => '>',
        (true, false) => '*',
        _ if !day.is_current_month => '.',
        _ => ' ',
    };
    let count = if day.events.is_empty() {
        String::new()
    } else {
        format!("({})", day.events.len())
    };
    format!("{marker}{:>2}{count:<4}", day.date.format("%-d"))
}

fn parse_day(raw: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("date must be YYYY-MM-DD, got `{raw}`").into())
}

fn save(file: &Path, db: &Path, config: EngineConfig) -> CliResult<()> {
    let conn = open_db(db)?;
    let service = DesignerService::with_config(SqliteStudyRepository::try_new(&conn)?, config);
    let store = service.import_json(&std::fs::read_to_string(file)?)?;
    let version = service.save(&store)?;
    println!(
        "saved study_id={} version={} created_at={}",
        version.study_id, version.version_uuid, version.created_at
    );
    Ok(())
}

fn versions(study_id: &str, db: &Path, limit: u32, config: EngineConfig) -> CliResult<()> {
    let conn = open_db(db)?;
    let service = DesignerService::with_config(SqliteStudyRepository::try_new(&conn)?, config);
    let versions = service.versions(study_id, limit)?;
    if versions.is_empty() {
        println!("no versions for study_id={study_id}");
    }
    for version in versions {
        println!(
            "{}  {}  {}  modules={}",
            version.version_uuid,
            version.created_at,
            version.study_name,
            version.study.modules.len()
        );
    }
    Ok(())
}
