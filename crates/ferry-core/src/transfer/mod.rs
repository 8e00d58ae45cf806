//! 文件传输模块
//!
//! 包含:
//! - 协议枚举与请求/结果类型
//! - 调度器（按协议选择后端，并把后端错误归一化为统一结果）
//! - 各协议后端客户端
//!
//! 每次请求恰好调用一个后端；无论成功还是配置/协议错误，都恰好产出
//! 一个 `TransferOutcome`。

pub mod local_copy;
pub mod network_share;
pub mod object_store;
pub mod sftp;

pub use local_copy::LocalCopyBackend;
pub use network_share::NetworkShareBackend;
pub use object_store::ObjectStoreBackend;
pub use sftp::SftpBackend;

use std::fmt;
use std::str::FromStr;

use log::{info, warn};

use crate::config::FerryConfig;
use crate::error::TransferError;

/// 支持的传输协议
///
/// 封闭枚举：新增后端是一次编译期检查的改动，而不是运行时字符串比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    ObjectStore,
    NetworkShare,
    Sftp,
    LocalCopy,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::ObjectStore,
        Protocol::NetworkShare,
        Protocol::Sftp,
        Protocol::LocalCopy,
    ];

    /// 协议的稳定名称（配置、命令行和记录中使用）
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::ObjectStore => "object-store",
            Protocol::NetworkShare => "network-share",
            Protocol::Sftp => "sftp",
            Protocol::LocalCopy => "local",
        }
    }

    /// 从名称解析；未知名称是 `UnsupportedProtocol` 唯一的产生点
    pub fn parse(s: &str) -> Result<Self, TransferError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "object-store" => Ok(Protocol::ObjectStore),
            "network-share" => Ok(Protocol::NetworkShare),
            "sftp" => Ok(Protocol::Sftp),
            "local" => Ok(Protocol::LocalCopy),
            _ => Err(TransferError::UnsupportedProtocol(s.to_string())),
        }
    }
}

impl FromStr for Protocol {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::parse(s)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 一次传输请求
///
/// 构造时校验，构造后不可变。
#[derive(Debug, Clone)]
pub struct TransferRequest {
    protocol: Protocol,
    source: String,
    destination: String,
}

impl TransferRequest {
    /// 构造请求；源或目标为空直接拒绝，不接触任何后端
    pub fn new(
        protocol: Protocol,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Self, TransferError> {
        let source = source.into();
        let destination = destination.into();
        if source.is_empty() {
            return Err(TransferError::InvalidRequest("source"));
        }
        if destination.is_empty() {
            return Err(TransferError::InvalidRequest("destination"));
        }
        Ok(Self {
            protocol,
            source,
            destination,
        })
    }

    /// 从字符串形式的协议名构造请求
    pub fn parse(
        protocol: &str,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Self, TransferError> {
        Self::new(Protocol::parse(protocol)?, source, destination)
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

/// 一次传输的归一化结果
///
/// 每个请求恰好产出一次，产出后不再变更。`protocol` 保存请求时的
/// 名称（而非枚举），这样未知协议的请求同样能产出结果并被记录。
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub succeeded: bool,
    pub protocol: String,
    pub source: String,
    pub destination: String,
    /// 失败详情，固定以错误种类标记开头（如 `MissingCredentials: …`）
    pub error_detail: Option<String>,
}

impl TransferOutcome {
    fn success(request: &TransferRequest) -> Self {
        Self {
            succeeded: true,
            protocol: request.protocol.name().to_string(),
            source: request.source.clone(),
            destination: request.destination.clone(),
            error_detail: None,
        }
    }

    fn failure(request: &TransferRequest, error: &TransferError) -> Self {
        Self {
            succeeded: false,
            protocol: request.protocol.name().to_string(),
            source: request.source.clone(),
            destination: request.destination.clone(),
            error_detail: Some(error_text(error)),
        }
    }

    /// 尚未构造出合法请求就被拒绝的情况（未知协议、空字段）
    pub fn rejected(
        protocol: &str,
        source: &str,
        destination: &str,
        error: &TransferError,
    ) -> Self {
        Self {
            succeeded: false,
            protocol: protocol.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            error_detail: Some(error_text(error)),
        }
    }
}

fn error_text(error: &TransferError) -> String {
    format!("{}: {}", error.kind(), error)
}

/// 传输调度器
///
/// 持有启动时装载的只读配置，把各自的分片交给后端构造函数。
/// `dispatch` 返回的 future 就是调用方要等待的传输任务；核心不做
/// 并发保护，调用方必须在观察到结果之前不发起第二次传输。
pub struct Dispatcher {
    config: FerryConfig,
}

impl Dispatcher {
    pub fn new(config: FerryConfig) -> Self {
        Self { config }
    }

    /// 调度一次传输
    ///
    /// 后端抛出的任何错误都被归一化进结果里；传输失败不会让进程
    /// 终止，只有启动阶段的配置/数据库错误才是致命的。
    pub async fn dispatch(&self, request: &TransferRequest) -> TransferOutcome {
        info!(
            "dispatching {} -> {} via {}",
            request.source, request.destination, request.protocol
        );

        match self.run_backend(request).await {
            Ok(()) => TransferOutcome::success(request),
            Err(error) => {
                warn!("transfer via {} failed: {}", request.protocol, error);
                TransferOutcome::failure(request, &error)
            }
        }
    }

    /// 字符串边界：协议名来自命令行或交互输入时使用
    ///
    /// 未知协议或空字段同样产出失败结果，且不会构造任何后端。
    pub async fn dispatch_name(
        &self,
        protocol: &str,
        source: &str,
        destination: &str,
    ) -> TransferOutcome {
        match TransferRequest::parse(protocol, source, destination) {
            Ok(request) => self.dispatch(&request).await,
            Err(error) => {
                warn!("request rejected: {}", error);
                TransferOutcome::rejected(protocol, source, destination, &error)
            }
        }
    }

    async fn run_backend(&self, request: &TransferRequest) -> Result<(), TransferError> {
        let source = request.source();
        let destination = request.destination();

        match request.protocol() {
            Protocol::ObjectStore => {
                ObjectStoreBackend::new(&self.config.object_store)?
                    .upload(source, destination)
                    .await
            }
            Protocol::NetworkShare => {
                NetworkShareBackend::new(&self.config.network_share)?
                    .upload(source, destination)
                    .await
            }
            Protocol::Sftp => {
                SftpBackend::new(&self.config.sftp)?
                    .upload(source, destination)
                    .await
            }
            Protocol::LocalCopy => LocalCopyBackend::new().upload(source, destination).await,
        }
    }
}
