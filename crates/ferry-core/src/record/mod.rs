//! 传输记录
//!
//! 追加式 SQLite 表，持久化每次传输的归一化结果。核心从不更新或
//! 删除已有记录。记录失败只作提示，绝不回滚或否定一次已成功的传输；
//! 调用方收到 `RecorderFailed` 后记一条警告即可。

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use log::debug;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use crate::error::TransferError;
use crate::transfer::TransferOutcome;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS transfers (
    id INTEGER NOT NULL PRIMARY KEY,
    protocol TEXT NOT NULL,
    source TEXT NOT NULL,
    destination TEXT NOT NULL,
    succeeded INTEGER NOT NULL,
    error_detail TEXT,
    completed_at TEXT NOT NULL
)";

const INSERT_RECORD: &str = "INSERT INTO transfers \
    (protocol, source, destination, succeeded, error_detail, completed_at) \
    VALUES (?, ?, ?, ?, ?, ?)";

const SELECT_RECENT: &str = "SELECT id, protocol, source, destination, succeeded, \
    error_detail, completed_at FROM transfers ORDER BY id DESC LIMIT ?";

/// 一条已持久化的传输记录
#[derive(Debug, Clone)]
pub struct TransferRecord {
    pub id: i64,
    pub protocol: String,
    pub source: String,
    pub destination: String,
    pub succeeded: bool,
    pub error_detail: Option<String>,
    pub completed_at: String,
}

/// 记录查询的行类型
type RecordRow = (i64, String, String, String, bool, Option<String>, String);

impl From<RecordRow> for TransferRecord {
    fn from(row: RecordRow) -> Self {
        Self {
            id: row.0,
            protocol: row.1,
            source: row.2,
            destination: row.3,
            succeeded: row.4,
            error_detail: row.5,
            completed_at: row.6,
        }
    }
}

/// 追加式传输日志
#[derive(Clone)]
pub struct TransferLog {
    pool: SqlitePool,
}

impl TransferLog {
    /// 打开（必要时创建）数据库并确保表存在
    ///
    /// 打开失败属于启动期致命错误，由调用方决定终止；传输路径上的
    /// 错误则都走 `TransferError::RecorderFailed`。
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating transfer log directory {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("opening transfer log {}", path.display()))?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .context("creating transfers table")?;

        debug!("transfer log ready at {}", path.display());
        Ok(Self { pool })
    }

    /// 追加一条结果记录
    pub async fn record(&self, outcome: &TransferOutcome) -> Result<(), TransferError> {
        sqlx::query(INSERT_RECORD)
            .bind(&outcome.protocol)
            .bind(&outcome.source)
            .bind(&outcome.destination)
            .bind(outcome.succeeded)
            .bind(&outcome.error_detail)
            .bind(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// 最近的若干条记录，新的在前
    pub async fn recent(&self, limit: u32) -> Result<Vec<TransferRecord>, TransferError> {
        let rows: Vec<RecordRow> = sqlx::query_as(SELECT_RECENT)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TransferRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_outcome(succeeded: bool) -> TransferOutcome {
        TransferOutcome {
            succeeded,
            protocol: "local".to_string(),
            source: "/tmp/a.txt".to_string(),
            destination: "/tmp/b.txt".to_string(),
            error_detail: if succeeded {
                None
            } else {
                Some("CopyFailed: copy to /tmp/b.txt failed: disk full".to_string())
            },
        }
    }

    #[tokio::test]
    async fn test_record_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let log = TransferLog::open(&dir.path().join("transfers.db"))
            .await
            .unwrap();

        log.record(&sample_outcome(true)).await.unwrap();
        log.record(&sample_outcome(false)).await.unwrap();

        let records = log.recent(10).await.unwrap();
        assert_eq!(records.len(), 2);

        // 新的在前
        assert!(!records[0].succeeded);
        assert!(
            records[0]
                .error_detail
                .as_deref()
                .unwrap()
                .starts_with("CopyFailed:")
        );
        assert!(records[1].succeeded);
        assert_eq!(records[1].error_detail, None);
        assert_eq!(records[1].protocol, "local");
    }

    #[tokio::test]
    async fn test_recent_honours_limit() {
        let dir = tempfile::tempdir().unwrap();
        let log = TransferLog::open(&dir.path().join("transfers.db"))
            .await
            .unwrap();

        for _ in 0..5 {
            log.record(&sample_outcome(true)).await.unwrap();
        }

        assert_eq!(log.recent(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("transfers.db");

        let log = TransferLog::open(&path).await.unwrap();
        log.record(&sample_outcome(true)).await.unwrap();

        assert!(path.exists());
    }
}
