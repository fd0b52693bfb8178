//! Core contracts and helpers for dbprobe.
//!
//! This crate holds the error type, settings resolution, connection-string
//! redaction, the row models returned by inspections, and the plain-text
//! renderers used by the CLI. Nothing here talks to the database.

pub mod error;
pub mod model;
pub mod redaction;
pub mod report;
pub mod settings;

pub use error::{Error, Result};
pub use model::{BackupDocument, ColumnInfo, MetricRecord, ServerInfo, TableInfo};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use report::{
    BackupReport, ConnectionReport, EnvEntry, EnvReport, EnvStatus, GanttSetupReport,
    MetricsReport, ProbeStep, WriteProbeReport, render_backup_report, render_connection_report,
    render_env_report, render_gantt_report, render_metrics_report, render_write_probe_report,
};
pub use settings::{
    DATABASE_URL_VARS, FileConfig, Overrides, Settings, clean_database_url, detect_engine,
    load_dotenv, load_file_config, process_env,
};

/// Table read by the metrics, connection and backup commands.
pub const METRICS_TABLE: &str = "discord_metrics";

/// Table created by the gantt setup command.
pub const GANTT_TABLE: &str = "hourly_gantt_data";
