use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use configuration::{ExportFormat, ImportSettings, Settings, init_logging, load_config};
use database::{DbRepository, connect, run_migrations};
use importer::ImportError;
use std::io::{self, Write};
use std::path::PathBuf;

mod console;
mod render;

/// The main entry point for the enrollment manager.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the settings have defaults.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    // Keep the guard alive so buffered log lines are flushed on exit.
    let _guard = init_logging(&settings.logging).context("Failed to initialize logging")?;

    let pool = connect(&settings.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let repo = DbRepository::new(pool);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => run_menu(repo, &settings).await,
        Commands::Import { path } => {
            handle_import(repo, &settings.import, &path, &mut io::stdout()).await
        }
        Commands::Stats => handle_stats(repo).await,
        Commands::Student { id } => handle_student(repo, &id).await,
        Commands::List => handle_list(repo).await,
        Commands::Export { format, output } => {
            let path = output.unwrap_or_else(|| settings.export.path_for(format));
            handle_export(repo, format, path).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Imports, queries and exports university course enrollments.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Runs the interactive menu when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu.
    Menu,
    /// Import an enrollment file into the database.
    Import {
        /// The file to import. Bare names are looked up in the data directory.
        path: String,
    },
    /// Print general statistics and the top-5 rankings.
    Stats,
    /// Show a student and the courses they are enrolled in.
    Student {
        /// The student's id (cédula).
        id: String,
    },
    /// List every stored enrollment.
    List,
    /// Export every stored enrollment.
    Export {
        #[arg(value_enum)]
        format: ExportFormat,

        /// Where to write the file. Defaults to the configured export path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run_menu(repo: DbRepository, settings: &Settings) -> anyhow::Result<()> {
    tracing::info!("Starting interactive menu.");
    let stdin = io::stdin();
    let mut console = console::Console::new(
        repo,
        settings.import.clone(),
        settings.export.clone(),
        stdin.lock(),
        io::stdout(),
    );
    console.run().await?;
    Ok(())
}

async fn handle_import<W: Write>(
    repo: DbRepository,
    settings: &ImportSettings,
    input: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let path = settings.resolve(input);
    let outcome = match importer::FileImporter::new(repo).import_file(&path).await {
        Ok(outcome) => outcome,
        Err(ImportError::NoValidData { rejected }) => {
            for line in &rejected {
                writeln!(out, "Warning: {line}")?;
            }
            bail!("no valid lines found in {}", path.display());
        }
        Err(e) => return Err(e.into()),
    };
    let report = &outcome.report;

    for rejected in &report.rejected {
        writeln!(out, "Warning: {rejected}")?;
    }
    writeln!(
        out,
        "Imported {}: {} of {} line(s) accepted, {} rejected, {} blank.",
        path.display(),
        report.accepted,
        report.lines_read,
        report.rejected.len(),
        report.blank_lines.len()
    )?;
    writeln!(
        out,
        "New records: {} student(s), {} course(s), {} enrollment(s).",
        report.students_created, report.courses_created, report.enrollments_created
    )?;
    Ok(())
}

async fn handle_stats(repo: DbRepository) -> anyhow::Result<()> {
    let stats = analytics::AnalyticsEngine::new(repo)
        .general_statistics()
        .await?;
    print!("{}", render::statistics(&stats));
    Ok(())
}

async fn handle_student(repo: DbRepository, id: &str) -> anyhow::Result<()> {
    match queries::QueryService::new(repo).find_student(id.trim()).await? {
        Some(details) => print!("{}", render::student_details(&details)),
        None => println!("No student found with id: {id}"),
    }
    Ok(())
}

async fn handle_list(repo: DbRepository) -> anyhow::Result<()> {
    let records = queries::QueryService::new(repo).all_records().await?;
    if records.is_empty() {
        println!("There are no records in the database.");
        return Ok(());
    }
    println!("{}", render::records_table(&records));
    println!("Total: {} record(s)", records.len());
    Ok(())
}

async fn handle_export(
    repo: DbRepository,
    format: ExportFormat,
    path: PathBuf,
) -> anyhow::Result<()> {
    let records = queries::QueryService::new(repo).all_records().await?;
    let written = exporter::export_to_file(&records, format, &path)
        .with_context(|| format!("Failed to export {format} to {}", path.display()))?;
    println!("Exported {written} record(s) to {}", path.display());
    Ok(())
}
