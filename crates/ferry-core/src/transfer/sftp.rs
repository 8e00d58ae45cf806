//! SFTP 后端
//!
//! 固定主机公钥信任模型：只接受本地预置的那一把公钥，其余一律在
//! 握手阶段失败（fail-closed），不降级为警告，也没有首次信任。
//!
//! 资源获取顺序：SSH 连接 → SFTP 会话 → 源文件 → 远端文件；任何
//! 退出路径（包括拷贝中途出错）都按逆序释放全部四项。

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use russh::client::{self, AuthResult};
use russh::keys::PublicKey;
use russh_sftp::client::SftpSession;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::SftpConfig;
use crate::error::TransferError;

/// 连接建立超时
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// 会话静默超时，防止对端挂起导致调用方无限等待
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300);

/// russh 客户端处理器：只信任预置的那把主机公钥
///
/// 返回 `false` 时 russh 会让整个握手失败，远端不会收到任何文件。
struct PinnedHostKey {
    pinned: PublicKey,
}

impl client::Handler for PinnedHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        // 只比较密钥数据，忽略公钥文件里的注释
        Ok(server_public_key.key_data() == self.pinned.key_data())
    }
}

/// SFTP 上传客户端
#[derive(Debug)]
pub struct SftpBackend {
    config: SftpConfig,
}

impl SftpBackend {
    /// 校验必需配置；任一为空则不开任何套接字直接报错
    pub fn new(config: &SftpConfig) -> Result<Self, TransferError> {
        let required = [
            ("host", &config.host),
            ("username", &config.username),
            ("password", &config.password),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(TransferError::MissingCredentials {
                    backend: "sftp",
                    key,
                });
            }
        }
        Ok(Self {
            config: config.clone(),
        })
    }

    pub async fn upload(&self, source: &str, destination: &str) -> Result<(), TransferError> {
        // 先装载信任材料，不可用就不必建连
        let pinned = load_host_key(&self.config.host_key_path)?;

        let endpoint = format!("{}:{}", self.config.host, self.config.port);
        info!("transferring via sftp to {}", endpoint);

        let client_config = Arc::new(client::Config {
            inactivity_timeout: Some(INACTIVITY_TIMEOUT),
            ..Default::default()
        });

        // 建连 + 主机密钥校验；密钥不匹配时握手直接失败
        let mut session = tokio::time::timeout(
            CONNECT_TIMEOUT,
            client::connect(
                client_config,
                (self.config.host.as_str(), self.config.port),
                PinnedHostKey { pinned },
            ),
        )
        .await
        .map_err(|_| connection_failed(&endpoint, "connect", "timed out"))?
        .map_err(|e| connection_failed(&endpoint, "connect", &e.to_string()))?;

        let auth = session
            .authenticate_password(&self.config.username, &self.config.password)
            .await
            .map_err(|e| connection_failed(&endpoint, "authentication", &e.to_string()))?;
        match auth {
            AuthResult::Success => {}
            AuthResult::Failure { .. } => {
                return Err(connection_failed(
                    &endpoint,
                    "authentication",
                    "password rejected",
                ));
            }
        }

        let sftp = match open_sftp(&session, &endpoint).await {
            Ok(sftp) => sftp,
            Err(e) => {
                // 连接已建立，子系统失败也要断开
                disconnect(&session).await;
                return Err(e);
            }
        };

        let result = copy_to_remote(&sftp, source, destination).await;

        // 逆序释放：SFTP 会话，然后 SSH 连接
        if let Err(e) = sftp.close().await {
            warn!("sftp session close failed: {}", e);
        }
        disconnect(&session).await;

        result?;

        info!("file transferred via sftp");
        Ok(())
    }
}

async fn disconnect(session: &client::Handle<PinnedHostKey>) {
    if let Err(e) = session
        .disconnect(russh::Disconnect::ByApplication, "", "en")
        .await
    {
        debug!("ssh disconnect: {}", e);
    }
}

async fn open_sftp(
    session: &client::Handle<PinnedHostKey>,
    endpoint: &str,
) -> Result<SftpSession, TransferError> {
    let channel = session
        .channel_open_session()
        .await
        .map_err(|e| connection_failed(endpoint, "sftp session", &e.to_string()))?;
    channel
        .request_subsystem(true, "sftp")
        .await
        .map_err(|e| connection_failed(endpoint, "sftp session", &e.to_string()))?;
    SftpSession::new(channel.into_stream())
        .await
        .map_err(|e| connection_failed(endpoint, "sftp session", &e.to_string()))
}

/// 打开源文件、创建远端文件（覆盖写）并有界缓冲拷贝
///
/// 两个文件句柄在任何退出路径上都关闭：远端先、本地后。
async fn copy_to_remote(
    sftp: &SftpSession,
    source: &str,
    destination: &str,
) -> Result<(), TransferError> {
    let mut src = File::open(source)
        .await
        .map_err(|e| TransferError::SourceUnavailable {
            path: source.to_string(),
            reason: e.to_string(),
        })?;

    let mut dst = sftp.create(destination).await.map_err(|e| {
        TransferError::DestinationUnwritable {
            path: destination.to_string(),
            reason: e.to_string(),
        }
    })?;

    let copy_result = tokio::io::copy(&mut src, &mut dst).await;
    let close_result = dst.shutdown().await;
    drop(src);

    copy_result.map_err(|e| TransferError::CopyFailed {
        destination: destination.to_string(),
        reason: e.to_string(),
    })?;
    close_result.map_err(|e| TransferError::CopyFailed {
        destination: destination.to_string(),
        reason: format!("closing remote file: {}", e),
    })?;

    Ok(())
}

/// 从本地文件装载固定信任的主机公钥（OpenSSH 单行格式）
fn load_host_key(path: &Path) -> Result<PublicKey, TransferError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| TransferError::HostKeyUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    PublicKey::from_openssh(contents.trim()).map_err(|e| TransferError::HostKeyUnavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn connection_failed(endpoint: &str, phase: &'static str, reason: &str) -> TransferError {
    TransferError::ConnectionFailed {
        endpoint: endpoint.to_string(),
        phase,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST_KEY: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIDve9e+N5bGVyZLA1NQ9fppTINxq6LnxH/uGJviLGyqe files.internal";
    const OTHER_KEY: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIFaG6YbYF3XfBZtTculLLEoXK7DyyqeR7TaN9NzXlO1r other.internal";

    fn full_config() -> SftpConfig {
        SftpConfig {
            host: "files.internal".to_string(),
            port: 22,
            username: "ferry".to_string(),
            password: "secret".to_string(),
            host_key_path: "allowed_host_key.pub".into(),
        }
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for field in ["host", "username", "password"] {
            let mut config = full_config();
            match field {
                "host" => config.host.clear(),
                "username" => config.username.clear(),
                _ => config.password.clear(),
            }

            let err = SftpBackend::new(&config).unwrap_err();
            assert_eq!(err.kind(), "MissingCredentials");
            assert!(err.to_string().contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_missing_host_key_file_fails_closed() {
        let err = load_host_key(Path::new("/nonexistent/allowed_host_key.pub")).unwrap_err();
        assert_eq!(err.kind(), "HostKeyUnavailable");
    }

    #[test]
    fn test_garbage_host_key_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowed_host_key.pub");
        std::fs::write(&path, "not a public key").unwrap();

        let err = load_host_key(&path).unwrap_err();
        assert_eq!(err.kind(), "HostKeyUnavailable");
    }

    #[test]
    fn test_pinned_key_accepts_only_the_provisioned_key() {
        let pinned = PublicKey::from_openssh(HOST_KEY).unwrap();
        let same_key_different_comment =
            PublicKey::from_openssh(&HOST_KEY.replace("files.internal", "renamed")).unwrap();
        let other = PublicKey::from_openssh(OTHER_KEY).unwrap();

        // 注释不参与比较，密钥数据必须一致
        assert_eq!(pinned.key_data(), same_key_different_comment.key_data());
        assert_ne!(pinned.key_data(), other.key_data());
    }

    #[test]
    fn test_host_key_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowed_host_key.pub");
        std::fs::write(&path, format!("{}\n", HOST_KEY)).unwrap();

        let loaded = load_host_key(&path).unwrap();
        assert_eq!(
            loaded.key_data(),
            PublicKey::from_openssh(HOST_KEY).unwrap().key_data()
        );
    }
}
