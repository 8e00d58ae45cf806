//! 应用配置
//!
//! 进程启动时装载一次的只读配置。每个后端只持有与自己相关的分片，
//! 后端逻辑里没有任何全局查找。必填项是否为空的校验推迟到实际用到
//! 该协议的调度时刻，而不是启动时。

use anyhow::Context;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 对象存储后端配置（S3 协议，含兼容端点）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    /// 访问密钥 ID
    pub access_key: String,
    /// 访问密钥
    pub secret_key: String,
    /// 存储桶名称
    pub bucket: String,
    /// 区域
    pub region: String,
    /// 兼容 S3 协议的自建存储端点（可选）
    pub endpoint: String,
}

/// 网络共享后端配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkShareConfig {
    /// 共享在本地文件系统中的挂载点
    pub mount_point: String,
}

/// SFTP 后端配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SftpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// 固定信任的主机公钥文件（OpenSSH 单行格式）
    pub host_key_path: PathBuf,
}

impl Default for SftpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: String::new(),
            host_key_path: PathBuf::from("allowed_host_key.pub"),
        }
    }
}

/// 传输记录配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// SQLite 数据库文件路径
    pub database: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
        }
    }
}

/// 全部后端的配置集合
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FerryConfig {
    pub object_store: ObjectStoreConfig,
    pub network_share: NetworkShareConfig,
    pub sftp: SftpConfig,
    pub recorder: RecorderConfig,
}

impl FerryConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ferry")
            .join("config.toml")
    }

    /// 装载配置
    ///
    /// 显式指定的路径必须存在且可解析；默认路径不存在时回退到
    /// 全空的默认配置（具体协议的缺项在调度时才会报错）。
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::read_file(p),
            None => {
                let p = Self::default_path();
                if p.exists() {
                    Self::read_file(&p)
                } else {
                    debug!("no config file at {:?}, using defaults", p);
                    Ok(Self::default())
                }
            }
        }
    }

    fn read_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        debug!("loaded config from {:?}", path);
        Ok(config)
    }
}

/// 默认数据库路径（数据目录下的 ferry/transfers.db）
fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ferry")
        .join("transfers.db")
}
