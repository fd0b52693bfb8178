//! Plain-text rendering for command results.
//!
//! Each command produces a report struct; the renderers here turn them into
//! the console text the CLI prints. Rendering is deterministic so it can be
//! checked without a database.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::model::{ColumnInfo, MetricRecord, ServerInfo, TableInfo};
use crate::redaction::redact_connection_string;
use crate::settings::{clean_database_url, detect_engine};
use crate::{GANTT_TABLE, METRICS_TABLE};

/// Variables listed by the environment check.
pub const CHECKED_ENV_VARS: &[&str] = &["NEON_DATABASE_URL", "DATABASE_URL", "DISCORD_BOT_TOKEN"];

/// Result of the metrics command.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    /// Most recent rows, newest first.
    pub records: Vec<MetricRecord>,
    pub today: NaiveDate,
    pub columns: Vec<ColumnInfo>,
}

impl MetricsReport {
    pub fn has_today(&self) -> bool {
        self.records.iter().any(|record| record.date == self.today)
    }
}

/// Result of the connection diagnostics command.
#[derive(Debug, Clone)]
pub struct ConnectionReport {
    /// Redacted `host[:port]/database`.
    pub target: String,
    pub ping: i32,
    pub server: ServerInfo,
    pub tables: Vec<TableInfo>,
    pub metrics_columns: Vec<ColumnInfo>,
    /// Row count of `discord_metrics`; `None` when the table is absent.
    pub metrics_row_count: Option<i64>,
}

/// Result of the gantt table setup command.
#[derive(Debug, Clone)]
pub struct GanttSetupReport {
    pub server: ServerInfo,
    pub existing_tables: Vec<TableInfo>,
    pub already_existed: bool,
    pub indexes: Vec<String>,
    pub comments_applied: usize,
    pub columns: Vec<ColumnInfo>,
}

/// One completed step of the write probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeStep {
    pub action: String,
    pub detail: String,
}

/// Result of the write-permission probe.
#[derive(Debug, Clone)]
pub struct WriteProbeReport {
    pub table: String,
    pub steps: Vec<ProbeStep>,
}

/// Result of the backup command.
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// File written, or `None` when the table was empty.
    pub path: Option<PathBuf>,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvStatus {
    Unset,
    Set,
    /// A database URL; only the redacted host part is kept.
    DatabaseUrl { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub name: String,
    pub status: EnvStatus,
}

/// Result of the environment check.
#[derive(Debug, Clone)]
pub struct EnvReport {
    pub entries: Vec<EnvEntry>,
    /// `.env` file that was loaded, if any.
    pub dotenv_path: Option<PathBuf>,
}

impl EnvReport {
    /// Inspect [`CHECKED_ENV_VARS`] through `lookup`. Values never leave this
    /// function except as a redacted database target.
    pub fn from_lookup<F>(lookup: F, dotenv_path: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let entries = CHECKED_ENV_VARS
            .iter()
            .map(|&name| {
                let status = match lookup(name).filter(|value| !value.trim().is_empty()) {
                    None => EnvStatus::Unset,
                    Some(value) => {
                        let url = clean_database_url(&value);
                        if detect_engine(&url).is_ok() {
                            EnvStatus::DatabaseUrl {
                                target: redact_connection_string(&url).display_target(),
                            }
                        } else {
                            EnvStatus::Set
                        }
                    }
                };
                EnvEntry {
                    name: name.to_string(),
                    status,
                }
            })
            .collect();

        Self {
            entries,
            dotenv_path,
        }
    }
}

pub fn render_metrics_report(report: &MetricsReport) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "{METRICS_TABLE}: {} record(s)",
        report.records.len()
    ));

    if report.records.is_empty() {
        lines.push(format!("no rows found in {METRICS_TABLE}"));
    } else {
        lines.push("latest rows:".to_string());
        for record in &report.records {
            lines.push(format!(
                "  {}: members {}, messages {}",
                record.date,
                display_count(record.member_count),
                display_count(record.daily_messages)
            ));
            let created = record
                .created_at
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!("    id: {}, created_at: {created}", record.id));
        }
        let presence = if report.has_today() { "present" } else { "missing" };
        lines.push(format!("row for today ({}): {presence}", report.today));
    }

    lines.push(String::new());
    lines.push(format!("columns of {METRICS_TABLE}:"));
    push_columns_detailed(&mut lines, &report.columns);

    lines.join("\n")
}

pub fn render_connection_report(report: &ConnectionReport) -> String {
    let mut lines = Vec::new();

    lines.push(format!("target: {}", report.target));
    lines.push(format!("connection ok (select 1 returned {})", report.ping));
    lines.push(format!("server: {}", server_label(&report.server)));
    lines.push(format!("current database: {}", report.server.database));

    lines.push(String::new());
    lines.push("public tables:".to_string());
    push_tables(&mut lines, &report.tables);

    lines.push(String::new());
    if report.metrics_columns.is_empty() {
        lines.push(format!("{METRICS_TABLE} table not found"));
    } else {
        lines.push(format!("{METRICS_TABLE} structure:"));
        for column in &report.metrics_columns {
            let nullability = if column.is_nullable { "NULL" } else { "NOT NULL" };
            lines.push(format!(
                "  {}: {} ({nullability})",
                column.column_name, column.data_type
            ));
        }
        if let Some(count) = report.metrics_row_count {
            lines.push(format!("{METRICS_TABLE} rows: {count}"));
        }
    }

    lines.push(String::new());
    lines.push("database check finished".to_string());
    lines.join("\n")
}

pub fn render_gantt_report(report: &GanttSetupReport) -> String {
    let mut lines = Vec::new();

    lines.push(format!("server: {}", server_label(&report.server)));
    lines.push(format!("existing public tables: {}", report.existing_tables.len()));
    push_tables(&mut lines, &report.existing_tables);

    lines.push(String::new());
    if report.already_existed {
        lines.push(format!("{GANTT_TABLE} already existed; left unchanged"));
    } else {
        lines.push(format!("{GANTT_TABLE} created"));
    }
    for index in &report.indexes {
        lines.push(format!("index ensured: {index}"));
    }
    lines.push(format!("comments applied: {}", report.comments_applied));

    lines.push(String::new());
    lines.push(format!("{GANTT_TABLE} structure:"));
    for column in &report.columns {
        lines.push(format!("  {}: {}", column.column_name, column.data_type));
    }

    lines.push(String::new());
    lines.push(format!("{GANTT_TABLE} is ready"));
    lines.join("\n")
}

pub fn render_write_probe_report(report: &WriteProbeReport) -> String {
    let mut lines = vec![format!("write probe on scratch table {}", report.table)];
    for step in &report.steps {
        lines.push(format!("  {}: {}", step.action, step.detail));
    }
    lines.push("write permission confirmed".to_string());
    lines.join("\n")
}

pub fn render_backup_report(report: &BackupReport) -> String {
    match &report.path {
        Some(path) => format!(
            "backed up {} row(s) of {METRICS_TABLE} to {}",
            report.record_count,
            path.display()
        ),
        None => format!("{METRICS_TABLE} has no rows; nothing to back up"),
    }
}

pub fn render_env_report(report: &EnvReport) -> String {
    let mut lines = Vec::new();
    match &report.dotenv_path {
        Some(path) => lines.push(format!("loaded env file: {}", path.display())),
        None => lines.push("no .env file loaded".to_string()),
    }
    for entry in &report.entries {
        let status = match &entry.status {
            EnvStatus::Unset => "not set".to_string(),
            EnvStatus::Set => "set".to_string(),
            EnvStatus::DatabaseUrl { target } => format!("set ({target})"),
        };
        lines.push(format!("  {}: {status}", entry.name));
    }
    lines.join("\n")
}

fn server_label(server: &ServerInfo) -> String {
    match server.server_release() {
        Some(release) => format!("{} {release}", server.short_version()),
        None => server.short_version().to_string(),
    }
}

fn push_tables(lines: &mut Vec<String>, tables: &[TableInfo]) {
    if tables.is_empty() {
        lines.push("  (no tables)".to_string());
        return;
    }
    for table in tables {
        lines.push(format!("  - {} ({})", table.table_name, table.table_type));
    }
}

fn push_columns_detailed(lines: &mut Vec<String>, columns: &[ColumnInfo]) {
    if columns.is_empty() {
        lines.push("  (no columns found)".to_string());
        return;
    }
    for column in columns {
        let default = column.column_default.as_deref().unwrap_or("none");
        let nullable = if column.is_nullable { "YES" } else { "NO" };
        lines.push(format!(
            "  - {}: {} (nullable: {nullable}, default: {default})",
            column.column_name, column.data_type
        ));
    }
}

fn display_count(value: Option<i64>) -> String {
    value.map(|count| count.to_string()).unwrap_or_else(|| "-".to_string())
}
