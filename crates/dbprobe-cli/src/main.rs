mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use dbprobe_core::settings::DEFAULT_CONFIG_FILE;
use dbprobe_core::{
    EnvReport, Error as CoreError, Overrides, Settings, load_dotenv, load_file_config,
    process_env, redact_connection_string, render_backup_report, render_connection_report,
    render_env_report, render_gantt_report, render_metrics_report, render_write_probe_report,
};
use dbprobe_inspect::connection::FAILURE_HINTS;
use dbprobe_inspect::{
    ConnectionDiagnostics, GanttTableSetup, MetricsBackup, RecentMetrics, WriteProbe,
    run_inspection,
};
use logging::{LogFormat, LoggingError, init_logging};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
}

#[derive(Parser, Debug)]
#[command(name = "dbprobe", version, about = "Diagnostics for the metrics Postgres database")]
struct Cli {
    /// Config file (defaults to ./dbprobe.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Database connection string; overrides NEON_DATABASE_URL and DATABASE_URL.
    #[arg(long, global = true, value_name = "CONNECTION_STRING")]
    database_url: Option<String>,
    /// Seconds to wait for a connection.
    #[arg(long, global = true, value_name = "SECS")]
    connect_timeout_secs: Option<u64>,
    /// Console log encoding.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
    /// Also append JSON log lines to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the latest discord_metrics rows and the table's columns.
    Metrics(MetricsArgs),
    /// Create hourly_gantt_data with its indexes and comments.
    CreateGanttTable,
    /// Check connectivity and list public tables.
    Connection,
    /// Verify write permission using a scratch table.
    WriteProbe,
    /// Dump discord_metrics to a timestamped JSON file.
    Backup(BackupArgs),
    /// Show which relevant environment variables are set.
    Env,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    /// Maximum number of rows to show.
    #[arg(long)]
    limit: Option<i64>,
}

#[derive(Args, Debug)]
struct BackupArgs {
    /// Directory for the backup file.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Metrics(_) => "metrics",
            Command::CreateGanttTable => "create-gantt-table",
            Command::Connection => "connection",
            Command::WriteProbe => "write-probe",
            Command::Backup(_) => "backup",
            Command::Env => "env",
        }
    }

    /// Commands that change or export data fail the process; read-only
    /// inspections log the error and exit normally.
    fn exits_nonzero_on_failure(&self) -> bool {
        matches!(
            self,
            Command::CreateGanttTable | Command::WriteProbe | Command::Backup(_)
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv_path = load_dotenv();

    if let Err(err) = init_logging(cli.log_format, cli.log_file.as_deref()) {
        eprintln!("{}", CliError::from(err));
        return ExitCode::FAILURE;
    }

    tracing::info!(event = "command_started", command = cli.command.name());

    match run(&cli, dotenv_path).await {
        Ok(()) => {
            tracing::info!(event = "command_finished", command = cli.command.name(), status = "success");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_failure(&cli.command, &err);
            if cli.command.exits_nonzero_on_failure() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

async fn run(cli: &Cli, dotenv_path: Option<PathBuf>) -> Result<(), CliError> {
    match &cli.command {
        Command::Metrics(args) => {
            let settings = resolve_settings(cli, args.limit)?;
            let inspection = RecentMetrics {
                limit: settings.metrics_limit,
                today: Utc::now().date_naive(),
            };
            let report = run_inspection(&settings, &inspection).await?;
            println!("{}", render_metrics_report(&report));
        }
        Command::CreateGanttTable => {
            let settings = resolve_settings(cli, None)?;
            let report = run_inspection(&settings, &GanttTableSetup).await?;
            println!("{}", render_gantt_report(&report));
        }
        Command::Connection => {
            let settings = resolve_settings(cli, None)?;
            let target = redact_connection_string(&settings.database_url).display_target();
            println!("connecting to {target}");
            let report = run_inspection(&settings, &ConnectionDiagnostics { target }).await?;
            println!("{}", render_connection_report(&report));
        }
        Command::WriteProbe => {
            let settings = resolve_settings(cli, None)?;
            let report = run_inspection(&settings, &WriteProbe::new()).await?;
            println!("{}", render_write_probe_report(&report));
        }
        Command::Backup(args) => {
            let settings = resolve_settings(cli, None)?;
            let inspection = MetricsBackup {
                out_dir: args.out_dir.clone(),
                taken_at: Utc::now(),
            };
            let report = run_inspection(&settings, &inspection).await?;
            println!("{}", render_backup_report(&report));
        }
        Command::Env => {
            let report = EnvReport::from_lookup(process_env, dotenv_path);
            println!("{}", render_env_report(&report));
        }
    }
    Ok(())
}

fn resolve_settings(cli: &Cli, metrics_limit: Option<i64>) -> Result<Settings, CliError> {
    let file = load_file_config(cli.config.as_deref())?;
    if file.is_some() {
        let path = cli
            .config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        tracing::debug!(event = "config_loaded", path = %path.display());
    }

    let overrides = Overrides {
        database_url: cli.database_url.clone(),
        connect_timeout_secs: cli.connect_timeout_secs,
        metrics_limit,
    };
    Ok(Settings::resolve(file.as_ref(), process_env, &overrides)?)
}

fn report_failure(command: &Command, err: &CliError) {
    match command {
        Command::Connection => {
            tracing::error!(event = "connection_failed", error = %err);
            for hint in failure_hints(err) {
                tracing::warn!(event = "possible_cause", hint = *hint);
            }
        }
        Command::Metrics(_) => {
            tracing::error!(event = "command_failed", command = command.name(), error = %err, detail = ?err);
        }
        _ => {
            tracing::error!(event = "command_failed", command = command.name(), error = %err);
        }
    }
    if let CliError::Core(core) = err {
        if let Some(code) = core.sql_state() {
            tracing::error!(event = "sql_state", code = code);
        }
    }
}

/// Likely causes worth listing after a failed connection check. A missing
/// URL already says what is wrong.
fn failure_hints(err: &CliError) -> &'static [&'static str] {
    match err {
        CliError::Core(CoreError::MissingDatabaseUrl) => &[],
        _ => FAILURE_HINTS,
    }
}
