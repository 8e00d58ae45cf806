//! 对象存储后端
//!
//! 用静态凭据构造 S3 客户端并执行单次整对象上传。凭据校验、源文件
//! 打开、上传三个阶段的错误分别标注。客户端带保守的内置超时，因为
//! 调用方没有取消手段。

use std::time::Duration;

use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use log::info;

use crate::config::ObjectStoreConfig;
use crate::error::TransferError;

/// 连接建立超时
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// 单次上传的总超时
const OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// 对象存储上传客户端
///
/// 每次调度都新建客户端，不做连接复用。
#[derive(Debug)]
pub struct ObjectStoreBackend {
    config: ObjectStoreConfig,
}

impl ObjectStoreBackend {
    /// 校验必需配置；任一为空则不触网直接报错
    pub fn new(config: &ObjectStoreConfig) -> Result<Self, TransferError> {
        let required = [
            ("access_key", &config.access_key),
            ("secret_key", &config.secret_key),
            ("bucket", &config.bucket),
            ("region", &config.region),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(TransferError::MissingCredentials {
                    backend: "object store",
                    key,
                });
            }
        }
        Ok(Self {
            config: config.clone(),
        })
    }

    /// 上传；对象键取完整目标路径（去掉开头的 `/`），重复执行覆盖
    pub async fn upload(&self, source: &str, destination: &str) -> Result<(), TransferError> {
        info!("transferring via object store");

        let client = self.build_client();
        let key = destination.trim_start_matches('/');

        // 流式读源文件，不做整文件缓冲
        let body =
            ByteStream::from_path(source)
                .await
                .map_err(|e| TransferError::SourceUnavailable {
                    path: source.to_string(),
                    reason: e.to_string(),
                })?;

        client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| TransferError::CopyFailed {
                destination: format!("{}/{}", self.config.bucket, key),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        info!(
            "object {} uploaded to bucket {}",
            key, self.config.bucket
        );
        Ok(())
    }

    fn build_client(&self) -> aws_sdk_s3::Client {
        let credentials = Credentials::new(
            &self.config.access_key,
            &self.config.secret_key,
            None,
            None,
            "ferry-config",
        );
        let timeouts = TimeoutConfig::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .operation_timeout(OPERATION_TIMEOUT)
            .build();

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(credentials)
            .timeout_config(timeouts);

        // 兼容 S3 协议的自建存储走 path-style 寻址
        if !self.config.endpoint.is_empty() {
            builder = builder
                .endpoint_url(&self.config.endpoint)
                .force_path_style(true);
        }

        aws_sdk_s3::Client::from_conf(builder.build())
    }
}
