use async_trait::async_trait;
use sqlx::PgConnection;

use dbprobe_core::{GANTT_TABLE, GanttSetupReport, Result, ServerInfo};

use crate::inspection::Inspection;
use crate::postgres::{mapper, queries};

pub const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS hourly_gantt_data (
    id SERIAL PRIMARY KEY,
    date DATE NOT NULL,
    hour INTEGER NOT NULL CHECK (hour >= 0 AND hour <= 23),
    data JSONB NOT NULL,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
    updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
    UNIQUE (date, hour)
)
"#;

/// `(index name, statement)` pairs.
pub const INDEX_STATEMENTS: &[(&str, &str)] = &[
    (
        "idx_hourly_gantt_date_hour",
        "CREATE INDEX IF NOT EXISTS idx_hourly_gantt_date_hour ON hourly_gantt_data(date, hour)",
    ),
    (
        "idx_hourly_gantt_created_at",
        "CREATE INDEX IF NOT EXISTS idx_hourly_gantt_created_at ON hourly_gantt_data(created_at)",
    ),
];

pub const COMMENT_STATEMENTS: &[&str] = &[
    "COMMENT ON TABLE hourly_gantt_data IS 'Hourly online-user gantt chart data'",
    "COMMENT ON COLUMN hourly_gantt_data.date IS 'Collection date'",
    "COMMENT ON COLUMN hourly_gantt_data.hour IS 'Hour of day (0-23)'",
    "COMMENT ON COLUMN hourly_gantt_data.data IS 'Gantt chart JSON data'",
    "COMMENT ON COLUMN hourly_gantt_data.created_at IS 'Created at'",
    "COMMENT ON COLUMN hourly_gantt_data.updated_at IS 'Updated at'",
];

/// Creates `hourly_gantt_data`, its indexes and comments. Safe to re-run.
#[derive(Debug, Clone, Default)]
pub struct GanttTableSetup;

#[async_trait]
impl Inspection for GanttTableSetup {
    type Report = GanttSetupReport;

    fn name(&self) -> &'static str {
        "create_gantt_table"
    }

    async fn run(&self, conn: &mut PgConnection) -> Result<GanttSetupReport> {
        let server = ServerInfo {
            version: queries::fetch_version(conn).await?,
            database: queries::fetch_database_name(conn).await?,
        };
        let existing_tables = mapper::map_tables(queries::list_public_tables(conn).await?);
        let already_existed = queries::table_exists(conn, GANTT_TABLE).await?;

        queries::execute(conn, CREATE_TABLE_SQL).await?;
        tracing::info!(event = "table_ensured", table = GANTT_TABLE, already_existed);

        let mut indexes = Vec::with_capacity(INDEX_STATEMENTS.len());
        for (name, statement) in INDEX_STATEMENTS {
            queries::execute(conn, statement).await?;
            tracing::info!(event = "index_ensured", index = *name);
            indexes.push(name.to_string());
        }

        for statement in COMMENT_STATEMENTS {
            queries::execute(conn, statement).await?;
        }
        tracing::info!(event = "comments_applied", count = COMMENT_STATEMENTS.len());

        let columns = mapper::map_columns(queries::list_columns(conn, GANTT_TABLE).await?);

        Ok(GanttSetupReport {
            server,
            existing_tables,
            already_existed,
            indexes,
            comments_applied: COMMENT_STATEMENTS.len(),
            columns,
        })
    }
}
