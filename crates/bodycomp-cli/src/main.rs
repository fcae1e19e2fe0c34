//! bodycomp - Tanita export importer
//!
//! Scans a scale export folder, shows what was found, and after
//! confirmation merges it into a SQLite patient store.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bodycomp_core::{Database, ImportConfig, ImportRun, Importer, Reconciler};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Most rows a `patients --search` prints.
const SEARCH_LIMIT: usize = 50;

/// Command-line arguments for bodycomp
#[derive(Parser, Debug)]
#[command(name = "bodycomp")]
#[command(about = "Import Tanita body-composition exports into a patient store")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an export folder and print what would be imported
    Scan {
        /// Folder containing GRAPHV1 (or TANITA/GRAPHV1)
        root: PathBuf,

        /// Print the full run as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan an export folder and merge it into the patient store
    Import {
        /// Folder containing GRAPHV1 (or TANITA/GRAPHV1)
        root: PathBuf,

        /// SQLite database path
        #[arg(long, env = "BODYCOMP_DB")]
        db: PathBuf,

        /// JSON import configuration
        #[arg(long, env = "BODYCOMP_CONFIG")]
        config: Option<PathBuf>,

        /// Commit without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List patients in the store
    Patients {
        /// SQLite database path
        #[arg(long, env = "BODYCOMP_DB")]
        db: PathBuf,

        /// Only patients whose name starts with this text
        #[arg(long)]
        search: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bodycomp_core=info,bodycomp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let stdout = io::stdout();
    run(args.command, &mut stdout.lock())
}

fn run<W: Write>(command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::Scan { root, json } => {
            let import_run = scan(&root)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&import_run)?)?;
            } else {
                print_preview(out, &import_run)?;
            }
        }
        Command::Import {
            root,
            db,
            config,
            yes,
        } => import(out, &root, &db, config.as_deref(), yes)?,
        Command::Patients { db, search } => list_patients(out, &db, search.as_deref())?,
    }
    Ok(())
}

fn scan(root: &Path) -> Result<ImportRun> {
    info!("Scanning export at {}", root.display());
    Importer::new()
        .scan(root)
        .with_context(|| format!("Failed to scan {}", root.display()))
}

fn print_preview<W: Write>(out: &mut W, import_run: &ImportRun) -> Result<()> {
    writeln!(out, "Export: {}", import_run.export_root.display())?;
    for line in import_run.summary_lines() {
        writeln!(out, "  {}", line)?;
    }
    writeln!(
        out,
        "{} profile(s) with measurements, {} measurement(s) total",
        import_run.profiles_found(),
        import_run.total_measurements()
    )?;
    Ok(())
}

fn import<W: Write>(
    out: &mut W,
    root: &Path,
    db_path: &Path,
    config_path: Option<&Path>,
    yes: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ImportConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ImportConfig::default(),
    };

    let import_run = scan(root)?;
    print_preview(out, &import_run)?;

    if import_run.is_empty() {
        writeln!(out, "Nothing to import.")?;
        return Ok(());
    }

    if !yes && !confirm(out, "Import these profiles and measurements?")? {
        writeln!(out, "Import cancelled.")?;
        return Ok(());
    }

    let db = Database::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database path: {}", db_path.display());

    let summary = Reconciler::new(&db, config).commit(&import_run.results);

    writeln!(
        out,
        "Import finished: {} patient(s) processed ({} created, {} updated), \
         {} measurement(s) imported",
        summary.patients_touched(),
        summary.patients_created,
        summary.patients_updated,
        summary.measurements_inserted
    )?;
    if summary.measurements_duplicate > 0 {
        writeln!(
            out,
            "  {} duplicate measurement(s) skipped",
            summary.measurements_duplicate
        )?;
    }

    if summary.has_failures() {
        for failure in &summary.failures {
            writeln!(
                out,
                "  slot {} ({:?}): {}",
                failure.slot, failure.stage, failure.message
            )?;
        }
        warn!(failures = summary.failures.len(), "Import finished with failures");
        bail!("{} record(s) could not be imported", summary.failures.len());
    }

    Ok(())
}

fn confirm<W: Write>(out: &mut W, question: &str) -> Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn list_patients<W: Write>(out: &mut W, db_path: &Path, search: Option<&str>) -> Result<()> {
    let db = Database::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let patients = match search {
        Some(query) => db.search_patients(query, SEARCH_LIMIT)?,
        None => db.list_patients()?,
    };

    for patient in &patients {
        writeln!(
            out,
            "{}  {:<24} born {:<10} {:>6} cm  {:<6} slot {}",
            patient.local_id,
            patient.name,
            patient.birth_date.as_deref().unwrap_or("-"),
            patient
                .height_cm
                .map(|h| format!("{:.1}", h))
                .unwrap_or_else(|| "-".into()),
            patient.gender.map(|g| g.label()).unwrap_or("-"),
            patient
                .tanita_slot
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into()),
        )?;
    }
    writeln!(
        out,
        "{} patient(s), {} measurement(s) in store",
        patients.len(),
        db.count_measurements()?
    )?;
    Ok(())
}
