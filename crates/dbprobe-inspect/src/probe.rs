use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use dbprobe_core::{Error, ProbeStep, Result, WriteProbeReport};

use crate::inspection::Inspection;
use crate::postgres::{db_error, queries};

/// Exercises create, insert, select, delete and drop on a scratch table.
#[derive(Debug, Clone)]
pub struct WriteProbe {
    table: String,
}

impl WriteProbe {
    pub fn new() -> Self {
        Self {
            table: format!("dbprobe_probe_{}", Uuid::new_v4().simple()),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn exercise(&self, conn: &mut PgConnection, steps: &mut Vec<ProbeStep>) -> Result<()> {
        queries::execute(
            conn,
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id SERIAL PRIMARY KEY,
                    test_data TEXT,
                    created_at TIMESTAMP DEFAULT NOW()
                )",
                self.table
            ),
        )
        .await?;
        steps.push(step("create table", "ok"));

        let payload = format!("dbprobe write probe {}", Utc::now().to_rfc3339());
        let id = sqlx::query_scalar::<_, i32>(&format!(
            "INSERT INTO {} (test_data) VALUES ($1) RETURNING id",
            self.table
        ))
        .bind(payload.as_str())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error)?;
        steps.push(step("insert", &format!("id {id}")));

        let read_back = sqlx::query_scalar::<_, Option<String>>(&format!(
            "SELECT test_data FROM {} WHERE id = $1",
            self.table
        ))
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error)?;
        if read_back.as_deref() != Some(payload.as_str()) {
            return Err(Error::db(format!(
                "read back {read_back:?}, expected {payload:?}"
            )));
        }
        steps.push(step("select", &payload));

        let deleted = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_error)?
            .rows_affected();
        steps.push(step("delete", &format!("{deleted} row(s)")));

        Ok(())
    }
}

impl Default for WriteProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Inspection for WriteProbe {
    type Report = WriteProbeReport;

    fn name(&self) -> &'static str {
        "write_probe"
    }

    async fn run(&self, conn: &mut PgConnection) -> Result<WriteProbeReport> {
        let mut steps = Vec::new();
        let outcome = self.exercise(conn, &mut steps).await;

        // The scratch table goes away even when a step above failed.
        let dropped = queries::execute(conn, &format!("DROP TABLE IF EXISTS {}", self.table)).await;
        if let Err(err) = &dropped {
            tracing::warn!(event = "probe_cleanup_failed", table = %self.table, error = %err);
        }

        outcome?;
        dropped?;
        steps.push(step("drop table", "ok"));

        Ok(WriteProbeReport {
            table: self.table.clone(),
            steps,
        })
    }
}

fn step(action: &str, detail: &str) -> ProbeStep {
    ProbeStep {
        action: action.to_string(),
        detail: detail.to_string(),
    }
}
