//! Application state
//!
//! 状态机：选协议 → 输入源 → 输入目标 → 传输中 → 结果。传输在
//! 后台任务上执行，结果通过事件通道送回；在结果被观察到之前，
//! 界面不会发起第二次传输。

use ferry_core::{
    Dispatcher, FerryConfig, LogEntry, LogLevel, Protocol, TransferLog, TransferOutcome,
};
use tokio::sync::mpsc;

/// 来自后台任务与日志层的事件
#[derive(Debug)]
pub enum AppEvent {
    TransferFinished(TransferOutcome),
    Log(LogEntry),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    SelectingProtocol,
    EnteringSource,
    EnteringDestination,
    Transferring,
    Done,
}

pub struct App {
    pub mode: AppMode,
    pub cursor: usize,
    pub source_input: String,
    pub destination_input: String,
    pub outcome: Option<TransferOutcome>,
    pub logs: Vec<LogEntry>,
    pub min_log_level: LogLevel,
    pub event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
    config: FerryConfig,
    transfer_log: TransferLog,
}

impl App {
    pub fn new(config: FerryConfig, transfer_log: TransferLog) -> Self {
        let (event_tx, event_rx) = mpsc::channel(64);
        Self {
            mode: AppMode::SelectingProtocol,
            cursor: 0,
            source_input: String::new(),
            destination_input: String::new(),
            outcome: None,
            logs: vec![LogEntry::new(
                LogLevel::Info,
                "↑/↓ 选择协议, Enter 确认, q 退出",
            )],
            min_log_level: LogLevel::Info,
            event_tx,
            event_rx,
            config,
            transfer_log,
        }
    }

    pub fn selected_protocol(&self) -> Protocol {
        Protocol::ALL[self.cursor]
    }

    pub fn next_protocol(&mut self) {
        if self.cursor < Protocol::ALL.len() - 1 {
            self.cursor += 1;
        }
    }

    pub fn previous_protocol(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn add_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogEntry::new(level, message));
    }

    /// 当前过滤级别下可见的日志
    pub fn visible_logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs
            .iter()
            .filter(|entry| entry.level <= self.min_log_level)
    }

    /// 在 Info 和 Debug 之间切换日志面板级别
    pub fn toggle_log_level(&mut self) {
        self.min_log_level = match self.min_log_level {
            LogLevel::Debug => LogLevel::Info,
            _ => LogLevel::Debug,
        };
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    /// 启动传输任务；结果通过事件通道送回
    pub fn start_transfer(&mut self) {
        if self.mode == AppMode::Transferring {
            // 在途结果未被观察到之前绝不发起第二次传输
            return;
        }

        let protocol = self.selected_protocol();
        let source = self.source_input.clone();
        let destination = self.destination_input.clone();
        let config = self.config.clone();
        let transfer_log = self.transfer_log.clone();
        let tx = self.event_tx.clone();

        self.mode = AppMode::Transferring;
        self.add_log(
            LogLevel::Info,
            format!("开始传输: {} -> {} ({})", source, destination, protocol),
        );

        tokio::spawn(async move {
            let dispatcher = Dispatcher::new(config);
            let outcome = dispatcher
                .dispatch_name(protocol.name(), &source, &destination)
                .await;

            // 记录失败只警告，不影响传输结果
            if let Err(e) = transfer_log.record(&outcome).await {
                tracing::warn!("failed to record transfer: {}", e);
            }

            let _ = tx.send(AppEvent::TransferFinished(outcome)).await;
        });
    }

    /// 处理后台事件
    pub fn tick(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::TransferFinished(outcome) => {
                    if outcome.succeeded {
                        self.add_log(LogLevel::Info, "传输完成");
                    } else {
                        let detail = outcome
                            .error_detail
                            .clone()
                            .unwrap_or_else(|| "unknown error".to_string());
                        self.add_log(LogLevel::Error, detail);
                    }
                    self.outcome = Some(outcome);
                    self.mode = AppMode::Done;
                }
                AppEvent::Log(entry) => {
                    self.logs.push(entry);
                }
            }
        }
    }
}
