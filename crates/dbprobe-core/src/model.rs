use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One row of `discord_metrics` as shown by the metrics command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    pub id: String,
    pub date: NaiveDate,
    pub member_count: Option<i64>,
    pub daily_messages: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Column metadata from `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
}

/// Table entry from `information_schema.tables`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub table_name: String,
    pub table_type: String,
}

/// Server identity: `version()` and `current_database()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: String,
    pub database: String,
}

impl ServerInfo {
    /// First word of `version()`, e.g. `PostgreSQL`.
    pub fn short_version(&self) -> &str {
        self.version.split_whitespace().next().unwrap_or("")
    }

    /// Release number following the product name, e.g. `16.4`.
    pub fn server_release(&self) -> Option<&str> {
        self.version
            .split_whitespace()
            .nth(1)
            .map(|release| release.trim_end_matches(','))
    }
}

/// JSON document written by the backup command.
#[derive(Debug, Clone, Serialize)]
pub struct BackupDocument {
    pub backup_timestamp: DateTime<Utc>,
    pub table_name: String,
    pub record_count: usize,
    pub data: Vec<serde_json::Value>,
}

impl BackupDocument {
    pub fn new(table_name: &str, taken_at: DateTime<Utc>, data: Vec<serde_json::Value>) -> Self {
        Self {
            backup_timestamp: taken_at,
            table_name: table_name.to_string(),
            record_count: data.len(),
            data,
        }
    }

    /// `<table>_backup_YYYYMMDD_HHMMSS.json`
    pub fn file_name(&self) -> String {
        format!(
            "{}_backup_{}.json",
            self.table_name,
            self.backup_timestamp.format("%Y%m%d_%H%M%S")
        )
    }
}
