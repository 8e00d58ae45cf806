//! 集成测试 - 调度与后端契约
//!
//! 覆盖端到端场景：本地拷贝的字节一致性、网络共享的挂载点委托、
//! 配置缺失时不触网的提前失败，以及传输记录的读写。

use ferry_core::{Dispatcher, FerryConfig, Protocol, TransferLog, TransferRequest};

/// 场景 1：本地拷贝成功，目标内容与源完全一致
#[tokio::test]
async fn test_local_copy_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.txt");
    let dst = dir.path().join("b.txt");
    std::fs::write(&src, "hello").unwrap();

    let dispatcher = Dispatcher::new(FerryConfig::default());
    let request = TransferRequest::new(
        Protocol::LocalCopy,
        src.to_str().unwrap(),
        dst.to_str().unwrap(),
    )
    .unwrap();
    let outcome = dispatcher.dispatch(&request).await;

    assert!(outcome.succeeded, "outcome: {:?}", outcome.error_detail);
    assert_eq!(outcome.protocol, "local");
    assert_eq!(outcome.error_detail, None);
    assert_eq!(std::fs::read_to_string(&dst).unwrap(), "hello");
}

/// 场景 2：网络共享把相对目标解析到挂载点之下
#[tokio::test]
async fn test_network_share_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mount = dir.path().join("share");
    std::fs::create_dir_all(mount.join("sub")).unwrap();
    let src = dir.path().join("a.txt");
    std::fs::write(&src, "hello").unwrap();

    let mut config = FerryConfig::default();
    config.network_share.mount_point = mount.to_string_lossy().to_string();

    let dispatcher = Dispatcher::new(config);
    let request =
        TransferRequest::new(Protocol::NetworkShare, src.to_str().unwrap(), "sub/b.txt").unwrap();
    let outcome = dispatcher.dispatch(&request).await;

    assert!(outcome.succeeded, "outcome: {:?}", outcome.error_detail);
    assert_eq!(
        std::fs::read_to_string(mount.join("sub/b.txt")).unwrap(),
        "hello"
    );
}

/// 场景 3：SFTP 缺少用户名时在建连之前失败
#[tokio::test]
async fn test_sftp_missing_username_fails_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.txt");
    std::fs::write(&src, "hello").unwrap();

    let mut config = FerryConfig::default();
    config.sftp.host = "files.internal".to_string();
    config.sftp.password = "secret".to_string();
    // username 保持为空

    let dispatcher = Dispatcher::new(config);
    let request =
        TransferRequest::new(Protocol::Sftp, src.to_str().unwrap(), "/upload/a.txt").unwrap();
    let outcome = dispatcher.dispatch(&request).await;

    assert!(!outcome.succeeded);
    let detail = outcome.error_detail.as_deref().unwrap();
    assert!(detail.starts_with("MissingCredentials:"), "{}", detail);
    assert!(detail.contains("username"));
    // 校验发生在任何连接尝试之前
    assert!(!detail.contains("ConnectionFailed"));
}

/// 对象存储缺少任何必填配置都不触网
#[tokio::test]
async fn test_object_store_missing_credentials_fails_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.txt");
    std::fs::write(&src, "hello").unwrap();

    let mut config = FerryConfig::default();
    config.object_store.access_key = "AKIA_TEST".to_string();
    config.object_store.bucket = "backups".to_string();
    config.object_store.region = "eu-central-1".to_string();
    // secret_key 保持为空

    let dispatcher = Dispatcher::new(config);
    let request = TransferRequest::new(
        Protocol::ObjectStore,
        src.to_str().unwrap(),
        "backups/a.txt",
    )
    .unwrap();
    let outcome = dispatcher.dispatch(&request).await;

    assert!(!outcome.succeeded);
    let detail = outcome.error_detail.as_deref().unwrap();
    assert!(detail.starts_with("MissingCredentials:"), "{}", detail);
    assert!(detail.contains("secret_key"));
}

/// 未知协议：产出失败结果，且没有任何后端被调用
#[tokio::test]
async fn test_unsupported_protocol_produces_outcome_without_backend() {
    let dispatcher = Dispatcher::new(FerryConfig::default());
    // 源路径故意不存在：任何后端被调用都会把错误变成 SourceUnavailable
    let outcome = dispatcher
        .dispatch_name("ftp", "/nonexistent/a.txt", "b.txt")
        .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.protocol, "ftp");
    let detail = outcome.error_detail.as_deref().unwrap();
    assert!(detail.starts_with("UnsupportedProtocol:"), "{}", detail);
    assert!(!detail.contains("SourceUnavailable"));
}

/// 目标父目录不存在：核心不自动创建，报 DestinationUnwritable
#[tokio::test]
async fn test_missing_destination_parent_is_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.txt");
    std::fs::write(&src, "hello").unwrap();
    let dst = dir.path().join("missing").join("b.txt");

    let dispatcher = Dispatcher::new(FerryConfig::default());
    let outcome = dispatcher
        .dispatch_name("local", src.to_str().unwrap(), dst.to_str().unwrap())
        .await;

    assert!(!outcome.succeeded);
    assert!(
        outcome
            .error_detail
            .as_deref()
            .unwrap()
            .starts_with("DestinationUnwritable:")
    );
    assert!(!dst.parent().unwrap().exists());
    // 源必须原样保留
    assert_eq!(std::fs::read_to_string(&src).unwrap(), "hello");
}

/// 每次调度的结果都可以被记录并按倒序读回
#[tokio::test]
async fn test_outcomes_are_recorded_and_listed() {
    let dir = tempfile::tempdir().unwrap();
    let log = TransferLog::open(&dir.path().join("transfers.db"))
        .await
        .unwrap();

    let src = dir.path().join("a.txt");
    std::fs::write(&src, "hello").unwrap();
    let dst = dir.path().join("b.txt");

    let dispatcher = Dispatcher::new(FerryConfig::default());

    let ok = dispatcher
        .dispatch_name("local", src.to_str().unwrap(), dst.to_str().unwrap())
        .await;
    log.record(&ok).await.unwrap();

    let failed = dispatcher
        .dispatch_name("carrier-pigeon", src.to_str().unwrap(), "b.txt")
        .await;
    log.record(&failed).await.unwrap();

    let records = log.recent(10).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].protocol, "carrier-pigeon");
    assert!(!records[0].succeeded);
    assert!(records[1].succeeded);
    assert_eq!(records[1].protocol, "local");
}
