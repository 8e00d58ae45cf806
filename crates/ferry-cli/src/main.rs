//! Ferry CLI
//!
//! 命令行前端：装载配置、打开传输日志、调度一次传输并输出结果。
//! 每次进程运行至多一次传输在途。

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ferry_core::{Dispatcher, FerryConfig, Protocol, TransferLog};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ferry", version, about = "多后端文件传输工具")]
struct Cli {
    /// 配置文件路径（默认: ~/.config/ferry/config.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 传输一个文件
    Send {
        /// 传输协议 (object-store, network-share, sftp, local)
        #[arg(short, long)]
        protocol: String,
        /// 源文件路径
        source: String,
        /// 目标路径
        destination: String,
    },
    /// 查看最近的传输记录
    History {
        /// 显示条数
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
    /// 列出支持的协议
    Protocols,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 桥接 log crate（ferry-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,ferry_core=info")),
        )
        .try_init();

    let cli = Cli::parse();
    let config = FerryConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Send {
            protocol,
            source,
            destination,
        } => {
            // 数据库打不开是启动期致命错误；传输期的记录失败只警告
            let log = TransferLog::open(&config.recorder.database).await?;

            let dispatcher = Dispatcher::new(config);
            let outcome = dispatcher
                .dispatch_name(&protocol, &source, &destination)
                .await;

            if let Err(e) = log.record(&outcome).await {
                tracing::warn!("failed to record transfer: {}", e);
            }

            if outcome.succeeded {
                println!(
                    "✅ {} -> {} ({})",
                    outcome.source, outcome.destination, outcome.protocol
                );
            } else {
                eprintln!(
                    "❌ 传输失败: {}",
                    outcome.error_detail.as_deref().unwrap_or("unknown error")
                );
                std::process::exit(1);
            }
        }
        Commands::History { limit } => {
            let log = TransferLog::open(&config.recorder.database).await?;
            let records = log.recent(limit).await?;

            if records.is_empty() {
                println!("暂无传输记录");
            }
            for record in records {
                let mark = if record.succeeded { "✅" } else { "❌" };
                println!(
                    "{} [{}] {} {} -> {} ({})",
                    mark,
                    record.id,
                    record.completed_at,
                    record.source,
                    record.destination,
                    record.protocol
                );
                if let Some(detail) = record.error_detail {
                    println!("      {}", detail);
                }
            }
        }
        Commands::Protocols => {
            for protocol in Protocol::ALL {
                println!("{}", protocol.name());
            }
        }
    }

    Ok(())
}
