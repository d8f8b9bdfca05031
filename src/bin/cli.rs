use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use escola::modules::dashboard::service::DashboardService;
use escola::modules::reports::service::ReportService;
use escola_config::{ReportConfig, ServerConfig};
use escola_db::{EntityStore, PgEntityStore, init_db_pool};
use escola_models::{FilterCriteria, ReportFormat, ReportKind};

#[derive(Parser)]
#[command(name = "escola-cli")]
#[command(about = "Escola CLI - Export reports and dashboard statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report file
    Report {
        /// students, classes, courses, instructors or attendance
        #[arg(value_parser = parse_kind)]
        kind: ReportKind,

        /// pdf or xlsx
        #[arg(short = 'f', long, default_value = "pdf", value_parser = parse_format)]
        format: ReportFormat,

        /// Inclusive lower date bound (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Inclusive upper date bound (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        #[arg(long)]
        course_id: Option<i64>,

        /// Required for the attendance report
        #[arg(long)]
        class_id: Option<i64>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        instructor_id: Option<i64>,

        /// Output path (defaults to the generated file name in the current directory)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Print the dashboard snapshot as JSON
    Dashboard,
}

fn parse_kind(value: &str) -> Result<ReportKind, String> {
    value.parse()
}

fn parse_format(value: &str) -> Result<ReportFormat, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let server_config = ServerConfig::from_env();
    let pool = init_db_pool(server_config.database_max_connections)
        .await
        .context("failed to connect to database")?;
    let store = Arc::new(PgEntityStore::new(pool));
    let report_config = ReportConfig::from_env();

    match cli.command {
        Commands::Report {
            kind,
            format,
            start_date,
            end_date,
            course_id,
            class_id,
            status,
            instructor_id,
            output,
        } => {
            let criteria = FilterCriteria {
                start_date,
                end_date,
                course_id,
                class_id,
                status,
                instructor_id,
            };
            handle_report(store.as_ref(), &report_config, kind, format, &criteria, output).await
        }
        Commands::Dashboard => handle_dashboard(store.as_ref(), &report_config).await,
    }
}

async fn handle_report(
    store: &dyn EntityStore,
    config: &ReportConfig,
    kind: ReportKind,
    format: ReportFormat,
    criteria: &FilterCriteria,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let artifact = ReportService::generate(store, config, kind, format, criteria, now)
        .await
        .map_err(|e| anyhow!("❌ Error generating report: {}", e))?;

    let path = output.unwrap_or_else(|| PathBuf::from(artifact.file_name(now.date_naive())));
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("✅ Report written to {}", path.display());
    println!("   Size: {} bytes", artifact.bytes.len());
    Ok(())
}

async fn handle_dashboard(store: &dyn EntityStore, config: &ReportConfig) -> anyhow::Result<()> {
    let snapshot = DashboardService::snapshot(store, config, Utc::now())
        .await
        .map_err(|e| anyhow!("❌ Error computing dashboard: {}", e))?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
