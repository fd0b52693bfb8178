use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgConnection;

use dbprobe_core::Result;

use super::db_error;

#[derive(Debug, sqlx::FromRow)]
pub struct RawMetricRow {
    pub id: String,
    pub date: NaiveDate,
    pub member_count: Option<i64>,
    pub daily_messages: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

pub async fn list_recent_metrics(conn: &mut PgConnection, limit: i64) -> Result<Vec<RawMetricRow>> {
    sqlx::query_as::<_, RawMetricRow>(
        r#"
        select
          id::text as id,
          date::date as date,
          member_count::bigint as member_count,
          daily_messages::bigint as daily_messages,
          created_at::timestamptz as created_at
        from discord_metrics
        order by created_at desc
        limit $1
        "#,
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: String,
    pub column_default: Option<String>,
}

pub async fn list_columns(conn: &mut PgConnection, table: &str) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          column_name::text as column_name,
          data_type::text as data_type,
          is_nullable::text as is_nullable,
          column_default::text as column_default
        from information_schema.columns
        where table_name = $1
        order by ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawTable {
    pub table_name: String,
    pub table_type: String,
}

pub async fn list_public_tables(conn: &mut PgConnection) -> Result<Vec<RawTable>> {
    sqlx::query_as::<_, RawTable>(
        r#"
        select
          table_name::text as table_name,
          table_type::text as table_type
        from information_schema.tables
        where table_schema = 'public'
        order by table_name
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)
}

pub async fn table_exists(conn: &mut PgConnection, table: &str) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        select exists (
          select from information_schema.tables
          where table_schema = 'public'
            and table_name = $1
        )
        "#,
    )
    .bind(table)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)
}

pub async fn ping(conn: &mut PgConnection) -> Result<i32> {
    sqlx::query_scalar::<_, i32>("select 1")
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error)
}

pub async fn fetch_version(conn: &mut PgConnection) -> Result<String> {
    sqlx::query_scalar::<_, String>("select version()")
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error)
}

pub async fn fetch_database_name(conn: &mut PgConnection) -> Result<String> {
    sqlx::query_scalar::<_, String>("select current_database()::text")
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error)
}

pub async fn count_metrics(conn: &mut PgConnection) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("select count(*) from discord_metrics")
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error)
}

pub async fn dump_metrics_as_json(conn: &mut PgConnection) -> Result<Vec<serde_json::Value>> {
    sqlx::query_scalar::<_, serde_json::Value>(
        r#"
        select row_to_json(t)::jsonb
        from discord_metrics t
        order by t.date desc
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)
}

/// Run a single statement that returns no rows.
pub async fn execute(conn: &mut PgConnection, statement: &str) -> Result<u64> {
    sqlx::query(statement)
        .execute(&mut *conn)
        .await
        .map(|done| done.rows_affected())
        .map_err(db_error)
}
