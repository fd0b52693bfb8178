use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgConnection;

use dbprobe_core::{METRICS_TABLE, MetricsReport, Result};

use crate::inspection::Inspection;
use crate::postgres::{mapper, queries};

/// Latest `discord_metrics` rows plus the table's column layout.
#[derive(Debug, Clone)]
pub struct RecentMetrics {
    pub limit: i64,
    /// Date checked for a same-day row.
    pub today: NaiveDate,
}

#[async_trait]
impl Inspection for RecentMetrics {
    type Report = MetricsReport;

    fn name(&self) -> &'static str {
        "metrics"
    }

    async fn run(&self, conn: &mut PgConnection) -> Result<MetricsReport> {
        let records = mapper::map_metrics(queries::list_recent_metrics(conn, self.limit).await?);
        tracing::info!(event = "metrics_fetched", rows = records.len(), limit = self.limit);

        let columns = mapper::map_columns(queries::list_columns(conn, METRICS_TABLE).await?);

        Ok(MetricsReport {
            records,
            today: self.today,
            columns,
        })
    }
}
