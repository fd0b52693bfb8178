use async_trait::async_trait;
use sqlx::PgConnection;

use dbprobe_core::{ConnectionReport, METRICS_TABLE, Result, ServerInfo};

use crate::inspection::Inspection;
use crate::postgres::{mapper, queries};

/// Likely causes printed when the connection check fails.
pub const FAILURE_HINTS: &[&str] = &[
    "the database url is wrong (check NEON_DATABASE_URL)",
    "the database server is down",
    "the network is unreachable",
    "the TLS settings do not match the server (sslmode)",
];

/// Server identity, public tables and the `discord_metrics` layout.
#[derive(Debug, Clone)]
pub struct ConnectionDiagnostics {
    /// Redacted target, echoed back in the report.
    pub target: String,
}

#[async_trait]
impl Inspection for ConnectionDiagnostics {
    type Report = ConnectionReport;

    fn name(&self) -> &'static str {
        "connection"
    }

    async fn run(&self, conn: &mut PgConnection) -> Result<ConnectionReport> {
        let ping = queries::ping(conn).await?;
        let server = ServerInfo {
            version: queries::fetch_version(conn).await?,
            database: queries::fetch_database_name(conn).await?,
        };
        tracing::info!(event = "server_identified", version = server.short_version(), database = %server.database);

        let tables = mapper::map_tables(queries::list_public_tables(conn).await?);
        let metrics_columns = mapper::map_columns(queries::list_columns(conn, METRICS_TABLE).await?);

        let metrics_row_count = if metrics_columns.is_empty() {
            tracing::warn!(event = "table_missing", table = METRICS_TABLE);
            None
        } else {
            Some(queries::count_metrics(conn).await?)
        };

        Ok(ConnectionReport {
            target: self.target.clone(),
            ping,
            server,
            tables,
            metrics_columns,
            metrics_row_count,
        })
    }
}
