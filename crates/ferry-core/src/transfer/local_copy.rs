//! 本地拷贝后端
//!
//! 打开源文件、创建目标文件并以有界缓冲流式拷贝，源文件大小不影响
//! 峰值内存。不自动创建目标父目录；两个句柄在任何退出路径上都关闭。

use log::info;
use tokio::fs::File;
use tokio::io::{self, AsyncWriteExt};

use crate::error::TransferError;

/// 本地文件系统拷贝客户端
///
/// 也是网络共享后端的委托目标。
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCopyBackend;

impl LocalCopyBackend {
    pub fn new() -> Self {
        Self
    }

    /// 把 source 的内容完整拷贝到 destination（覆盖写）
    pub async fn upload(&self, source: &str, destination: &str) -> Result<(), TransferError> {
        let mut src = File::open(source)
            .await
            .map_err(|e| TransferError::SourceUnavailable {
                path: source.to_string(),
                reason: e.to_string(),
            })?;

        let mut dst = File::create(destination).await.map_err(|e| {
            TransferError::DestinationUnwritable {
                path: destination.to_string(),
                reason: e.to_string(),
            }
        })?;

        let copy_result = io::copy(&mut src, &mut dst).await;
        // 无论拷贝结果如何，先冲刷并关闭目标，再关闭源
        let flush_result = dst.flush().await;
        drop(dst);
        drop(src);

        let bytes = copy_result.map_err(|e| TransferError::CopyFailed {
            destination: destination.to_string(),
            reason: e.to_string(),
        })?;
        flush_result.map_err(|e| TransferError::CopyFailed {
            destination: destination.to_string(),
            reason: e.to_string(),
        })?;

        info!("copied {} bytes to {}", bytes, destination);
        Ok(())
    }
}
