use dbprobe_core::{ColumnInfo, MetricRecord, TableInfo};

use super::queries::{RawColumn, RawMetricRow, RawTable};

pub fn map_metrics(rows: Vec<RawMetricRow>) -> Vec<MetricRecord> {
    rows.into_iter()
        .map(|row| MetricRecord {
            id: row.id,
            date: row.date,
            member_count: row.member_count,
            daily_messages: row.daily_messages,
            created_at: row.created_at,
        })
        .collect()
}

/// `information_schema` reports nullability as `YES`/`NO`.
pub fn map_columns(rows: Vec<RawColumn>) -> Vec<ColumnInfo> {
    rows.into_iter()
        .map(|row| ColumnInfo {
            is_nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
            column_name: row.column_name,
            data_type: row.data_type,
            column_default: row.column_default,
        })
        .collect()
}

pub fn map_tables(rows: Vec<RawTable>) -> Vec<TableInfo> {
    rows.into_iter()
        .map(|row| TableInfo {
            table_name: row.table_name,
            table_type: row.table_type,
        })
        .collect()
}
