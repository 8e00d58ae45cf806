//! 网络共享后端
//!
//! 共享假定已挂载进本地文件系统命名空间，因此这里只是把挂载点和
//! 相对目标路径拼接，然后委托本地拷贝后端，并非独立的协议实现。

use std::path::{Path, PathBuf};

use log::info;

use crate::config::NetworkShareConfig;
use crate::error::TransferError;
use crate::transfer::LocalCopyBackend;

/// 网络共享（已挂载）拷贝客户端
#[derive(Debug)]
pub struct NetworkShareBackend {
    mount_point: String,
}

impl NetworkShareBackend {
    /// 挂载点未配置时直接拒绝
    pub fn new(config: &NetworkShareConfig) -> Result<Self, TransferError> {
        if config.mount_point.is_empty() {
            return Err(TransferError::MissingMountPoint);
        }
        Ok(Self {
            mount_point: config.mount_point.clone(),
        })
    }

    /// 相对目标在挂载点下的完整路径
    ///
    /// 目标开头的 `/` 会被剥掉，拼接结果始终落在挂载点之下。
    pub fn resolved_destination(&self, destination: &str) -> PathBuf {
        Path::new(&self.mount_point).join(destination.trim_start_matches('/'))
    }

    pub async fn upload(&self, source: &str, destination: &str) -> Result<(), TransferError> {
        let dest_path = self.resolved_destination(destination);
        info!("transferring via network share to {}", dest_path.display());

        LocalCopyBackend::new()
            .upload(source, &dest_path.to_string_lossy())
            .await
    }
}
