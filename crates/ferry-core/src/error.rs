//! 传输错误类型
//!
//! 所有后端的错误统一归入 `TransferError`。每个变体都标注失败所处的
//! 阶段（配置解析、主机密钥、连接、文件打开、拷贝），调度器据此生成
//! 自描述的失败结果，无需再查看后端内部状态。

use thiserror::Error;

/// 传输核心的统一错误类型
#[derive(Debug, Error)]
pub enum TransferError {
    /// 未知的协议名称，任何后端都不会被调用
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// 请求字段为空，任何后端都不会被调用
    #[error("request field must not be empty: {0}")]
    InvalidRequest(&'static str),

    /// 后端必需的配置项缺失，未发起任何网络调用
    #[error("missing required {backend} configuration: {key}")]
    MissingCredentials {
        backend: &'static str,
        key: &'static str,
    },

    /// 网络共享挂载点未配置
    #[error("network share mount point not configured")]
    MissingMountPoint,

    /// 固定信任的主机公钥文件不可读或不可解析
    #[error("host key file {path} unusable: {reason}")]
    HostKeyUnavailable { path: String, reason: String },

    /// 建立连接失败（TCP、SSH 握手、认证或 SFTP 子系统）
    #[error("connection to {endpoint} failed during {phase}: {reason}")]
    ConnectionFailed {
        endpoint: String,
        phase: &'static str,
        reason: String,
    },

    /// 源文件缺失或不可读
    #[error("source file {path} unavailable: {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// 目标文件不可创建或不可写（含父目录不存在的情况）
    #[error("destination {path} unwritable: {reason}")]
    DestinationUnwritable { path: String, reason: String },

    /// 数据流拷贝中途失败
    #[error("copy to {destination} failed: {reason}")]
    CopyFailed {
        destination: String,
        reason: String,
    },

    /// 传输记录写入失败；仅提示，绝不否定一次已完成的传输
    #[error("transfer log operation failed: {0}")]
    RecorderFailed(#[from] sqlx::Error),
}

impl TransferError {
    /// 稳定的错误种类标记
    ///
    /// 嵌在 `TransferOutcome::error_detail` 的开头，调用方和测试据此
    /// 判断失败类别，而不必解析完整的错误文本。
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::UnsupportedProtocol(_) => "UnsupportedProtocol",
            TransferError::InvalidRequest(_) => "InvalidRequest",
            TransferError::MissingCredentials { .. } => "MissingCredentials",
            TransferError::MissingMountPoint => "MissingMountPoint",
            TransferError::HostKeyUnavailable { .. } => "HostKeyUnavailable",
            TransferError::ConnectionFailed { .. } => "ConnectionFailed",
            TransferError::SourceUnavailable { .. } => "SourceUnavailable",
            TransferError::DestinationUnwritable { .. } => "DestinationUnwritable",
            TransferError::CopyFailed { .. } => "CopyFailed",
            TransferError::RecorderFailed(_) => "RecorderFailed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_markers_are_stable() {
        let err = TransferError::MissingCredentials {
            backend: "sftp",
            key: "username",
        };
        assert_eq!(err.kind(), "MissingCredentials");
        assert_eq!(
            TransferError::UnsupportedProtocol("ftp".into()).kind(),
            "UnsupportedProtocol"
        );
        assert_eq!(TransferError::MissingMountPoint.kind(), "MissingMountPoint");
    }

    #[test]
    fn test_display_names_the_failing_phase() {
        let err = TransferError::ConnectionFailed {
            endpoint: "sftp.example.com:22".into(),
            phase: "authentication",
            reason: "password rejected".into(),
        };
        let text = err.to_string();
        assert!(text.contains("sftp.example.com:22"));
        assert!(text.contains("authentication"));
    }

    #[test]
    fn test_missing_credentials_names_the_key() {
        let err = TransferError::MissingCredentials {
            backend: "object store",
            key: "secret_key",
        };
        assert!(err.to_string().contains("secret_key"));
    }
}
