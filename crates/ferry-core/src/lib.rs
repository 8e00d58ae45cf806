//! Ferry Core Library
//!
//! 多后端文件传输核心：调用方只说"用协议 X 把这个文件移过去"，不必
//! 关心各协议的连接生命周期和凭据处理；每次传输的结果都被归一化并
//! 持久化。
//!
//! # 模块
//!
//! - **config**: 类型化 TOML 配置，每个后端只持有自己的分片
//! - **error**: 统一错误分类，每个变体标注失败阶段
//! - **transfer**: 调度器与四个协议后端（对象存储 / 网络共享 / SFTP / 本地拷贝）
//! - **record**: 追加式 SQLite 传输日志
//! - **logging**: 跨 UI 的日志级别与条目定义
//!
//! # 使用示例
//!
//! ```ignore
//! use ferry_core::{Dispatcher, FerryConfig, Protocol, TransferLog, TransferRequest};
//!
//! let config = FerryConfig::load(None)?;
//! let log = TransferLog::open(&config.recorder.database).await?;
//!
//! let dispatcher = Dispatcher::new(config);
//! let request = TransferRequest::new(Protocol::LocalCopy, "/tmp/a.txt", "/tmp/b.txt")?;
//! let outcome = dispatcher.dispatch(&request).await;
//!
//! // 记录失败只作提示，不影响传输结果
//! if let Err(e) = log.record(&outcome).await {
//!     log::warn!("failed to record transfer: {}", e);
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod transfer;

// Config re-exports
pub use config::{
    FerryConfig, NetworkShareConfig, ObjectStoreConfig, RecorderConfig, SftpConfig,
};

// Error re-exports
pub use error::TransferError;

// Logging re-exports
pub use logging::{LogEntry, LogLevel};

// Record re-exports
pub use record::{TransferLog, TransferRecord};

// Transfer re-exports
pub use transfer::{
    Dispatcher, LocalCopyBackend, NetworkShareBackend, ObjectStoreBackend, Protocol, SftpBackend,
    TransferOutcome, TransferRequest,
};
