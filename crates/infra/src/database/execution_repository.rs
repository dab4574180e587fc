//! SQLite-backed execution log.

use std::sync::Arc;

use async_trait::async_trait;
use orbu_core::ExecutionLog;
use orbu_domain::{
    EndpointCleanup, EndpointId, ExecutionRecord, ExecutionStats, Result, RetentionCutoff,
};
use rusqlite::{params, Row};
use tokio::task;
use tracing::debug;

use super::columns::{optional_json_at, timestamp_at, to_i64, to_millis, unsigned_at, uuid_at};
use super::manager::{map_sql_error, DbManager, SqliteConnection};
use crate::errors::map_join_error;

const RECORD_INSERT_SQL: &str = "INSERT INTO execution_logs (
        id, endpoint_id, executed_at, duration_ms, status_code, error_message,
        request_payload, response_payload, request_method, request_path,
        caller_ip, caller_agent)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

const RECENT_SQL: &str = "SELECT id, endpoint_id, executed_at, duration_ms, status_code,
        error_message, request_payload, response_payload, request_method, request_path,
        caller_ip, caller_agent
    FROM execution_logs WHERE endpoint_id = ?1
    ORDER BY executed_at DESC, id DESC LIMIT ?2";

const STATS_SQL: &str = "SELECT COUNT(*), COALESCE(SUM(duration_ms), 0),
        COALESCE(MIN(duration_ms), 0), COALESCE(MAX(duration_ms), 0),
        COALESCE(SUM(CASE WHEN status_code = 200 THEN 1 ELSE 0 END), 0)
    FROM execution_logs WHERE endpoint_id = ?1";

const PURGE_SQL: &str = "DELETE FROM execution_logs WHERE endpoint_id = ?1 AND executed_at < ?2";

/// Execution records stored in SQLite.
pub struct SqliteExecutionLog {
    db: Arc<DbManager>,
}

impl SqliteExecutionLog {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn insert_record(conn: &SqliteConnection, record: &ExecutionRecord) -> Result<()> {
        conn.execute(
            RECORD_INSERT_SQL,
            params![
                record.id.to_string(),
                record.endpoint_id.to_string(),
                to_millis(record.executed_at),
                to_i64(record.duration_ms),
                record.status_code,
                record.error_message,
                record.request_payload.as_ref().map(ToString::to_string),
                record.response_payload.as_ref().map(ToString::to_string),
                record.request_method,
                record.request_path,
                record.caller_ip,
                record.caller_agent,
            ],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    fn purge(conn: &mut SqliteConnection, cutoffs: &[RetentionCutoff]) -> Result<Vec<EndpointCleanup>> {
        let tx = conn.transaction().map_err(map_sql_error)?;
        let mut results = Vec::with_capacity(cutoffs.len());
        {
            let mut stmt = tx.prepare(PURGE_SQL).map_err(map_sql_error)?;
            for cutoff in cutoffs {
                let deleted_count = stmt
                    .execute(params![cutoff.endpoint_id.to_string(), to_millis(cutoff.cutoff)])
                    .map_err(map_sql_error)?;
                results.push(EndpointCleanup { endpoint_id: cutoff.endpoint_id, deleted_count });
            }
        }
        tx.commit().map_err(map_sql_error)?;
        Ok(results)
    }
}

fn map_record_row(row: &Row<'_>) -> rusqlite::Result<ExecutionRecord> {
    Ok(ExecutionRecord {
        id: uuid_at(row, 0)?,
        endpoint_id: uuid_at(row, 1)?,
        executed_at: timestamp_at(row, 2)?,
        duration_ms: unsigned_at(row, 3)?,
        status_code: row.get(4)?,
        error_message: row.get(5)?,
        request_payload: optional_json_at(row, 6)?,
        response_payload: optional_json_at(row, 7)?,
        request_method: row.get(8)?,
        request_path: row.get(9)?,
        caller_ip: row.get(10)?,
        caller_agent: row.get(11)?,
    })
}

fn map_stats_row(row: &Row<'_>) -> rusqlite::Result<ExecutionStats> {
    let total = unsigned_at(row, 0)?;
    if total == 0 {
        return Ok(ExecutionStats::default());
    }

    let sum = unsigned_at(row, 1)?;
    let successful = unsigned_at(row, 4)?;
    Ok(ExecutionStats {
        total_executions: total,
        avg_duration_ms: sum / total,
        min_duration_ms: unsigned_at(row, 2)?,
        max_duration_ms: unsigned_at(row, 3)?,
        successful,
        failed: total - successful,
        success_rate: successful as f64 / total as f64 * 100.0,
    })
}

#[async_trait]
impl ExecutionLog for SqliteExecutionLog {
    async fn append(&self, record: &ExecutionRecord) -> Result<()> {
        let db = Arc::clone(&self.db);
        let record = record.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            Self::insert_record(&conn, &record)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn purge_expired(&self, cutoffs: &[RetentionCutoff]) -> Result<Vec<EndpointCleanup>> {
        if cutoffs.is_empty() {
            return Ok(Vec::new());
        }

        let db = Arc::clone(&self.db);
        let cutoffs = cutoffs.to_vec();

        let results = task::spawn_blocking(move || -> Result<Vec<EndpointCleanup>> {
            let mut conn = db.get_connection()?;
            Self::purge(&mut conn, &cutoffs)
        })
        .await
        .map_err(map_join_error)??;

        debug!(
            endpoints = results.len(),
            deleted = results.iter().map(|r| r.deleted_count).sum::<usize>(),
            "Purged expired execution records"
        );
        Ok(results)
    }

    async fn recent(&self, endpoint_id: EndpointId, limit: usize) -> Result<Vec<ExecutionRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let db = Arc::clone(&self.db);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        task::spawn_blocking(move || -> Result<Vec<ExecutionRecord>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(RECENT_SQL).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![endpoint_id.to_string(), limit], map_record_row)
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn stats(&self, endpoint_id: EndpointId) -> Result<ExecutionStats> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<ExecutionStats> {
            let conn = db.get_connection()?;
            conn.query_row(STATS_SQL, params![endpoint_id.to_string()], map_stats_row)
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}
