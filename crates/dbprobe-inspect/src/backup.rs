use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgConnection;

use dbprobe_core::{BackupDocument, BackupReport, Error, METRICS_TABLE, Result};

use crate::inspection::Inspection;
use crate::postgres::queries;

/// Dumps every `discord_metrics` row to a timestamped JSON file.
#[derive(Debug, Clone)]
pub struct MetricsBackup {
    pub out_dir: PathBuf,
    pub taken_at: DateTime<Utc>,
}

#[async_trait]
impl Inspection for MetricsBackup {
    type Report = BackupReport;

    fn name(&self) -> &'static str {
        "backup"
    }

    async fn run(&self, conn: &mut PgConnection) -> Result<BackupReport> {
        if !queries::table_exists(conn, METRICS_TABLE).await? {
            return Err(Error::MissingTable(METRICS_TABLE.to_string()));
        }

        let rows = queries::dump_metrics_as_json(conn).await?;
        tracing::info!(event = "rows_fetched", table = METRICS_TABLE, rows = rows.len());

        if rows.is_empty() {
            return Ok(BackupReport {
                path: None,
                record_count: 0,
            });
        }

        let document = BackupDocument::new(METRICS_TABLE, self.taken_at, rows);
        let path = self.out_dir.join(document.file_name());
        write_json(&path, &document)?;
        tracing::info!(event = "backup_written", path = %path.display(), rows = document.record_count);

        Ok(BackupReport {
            path: Some(path),
            record_count: document.record_count,
        })
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(Error::from)
}
