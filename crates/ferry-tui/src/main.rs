//! Ferry TUI - 交互式终端界面
//!
//! 按"选协议 → 输入源 → 输入目标 → 等待结果"的流程执行一次传输。
//! 传输在后台任务上运行，但在结果返回之前界面不接受任何会触发第二
//! 次传输的输入。
//!
//! # 日志
//!
//! 日志默认显示在界面底部的日志面板中。
//! 如需输出到 stderr 进行调试，设置 RUST_LOG 环境变量：
//!
//! ```bash
//! RUST_LOG=debug cargo run -p ferry-tui 2>> /tmp/ferry.log
//! ```

mod app;
mod tui_log;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ferry_core::{FerryConfig, TransferLog};
use ratatui::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, AppMode};
use tui_log::TuiLogLayer;

#[tokio::main]
async fn main() -> Result<()> {
    // 配置与传输日志属于启动期，失败直接终止，不进入界面
    let config = FerryConfig::load(None)?;
    let transfer_log = TransferLog::open(&config.recorder.database).await?;

    let mut app = App::new(config, transfer_log);

    // 可选命令行参数：预填源文件路径
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        app.source_input = args[1].clone();
    }

    // 初始化日志系统，发送到 TUI 日志面板
    init_logging(app.event_tx.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// 初始化日志系统
///
/// - 总是将日志发送到 TUI 日志面板
/// - 如果设置了 RUST_LOG，同时输出到 stderr（用于调试）
fn init_logging(log_tx: tokio::sync::mpsc::Sender<app::AppEvent>) {
    // 桥接 log crate（ferry-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    let tui_layer = TuiLogLayer::new(log_tx);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // 默认只显示 info 及以上级别
        EnvFilter::new("info,ferry_core=debug")
    });

    if std::env::var("RUST_LOG").is_ok() {
        use tracing_subscriber::fmt;

        let stderr_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .with(stderr_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .try_init();
    }
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        // 使用 poll 避免无限阻塞
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.mode {
                AppMode::SelectingProtocol => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Up | KeyCode::Char('k') => app.previous_protocol(),
                    KeyCode::Down | KeyCode::Char('j') => app.next_protocol(),
                    KeyCode::Enter => app.mode = AppMode::EnteringSource,
                    KeyCode::Char('d') => app.toggle_log_level(),
                    KeyCode::Char('c') => app.clear_logs(),
                    _ => {}
                },
                AppMode::EnteringSource => match key.code {
                    KeyCode::Esc => {
                        app.mode = AppMode::SelectingProtocol;
                    }
                    KeyCode::Enter => {
                        if !app.source_input.is_empty() {
                            app.mode = AppMode::EnteringDestination;
                        }
                    }
                    KeyCode::Char(c) => app.source_input.push(c),
                    KeyCode::Backspace => {
                        app.source_input.pop();
                    }
                    _ => {}
                },
                AppMode::EnteringDestination => match key.code {
                    KeyCode::Esc => {
                        app.mode = AppMode::EnteringSource;
                    }
                    KeyCode::Enter => {
                        if !app.destination_input.is_empty() {
                            app.start_transfer();
                        }
                    }
                    KeyCode::Char(c) => app.destination_input.push(c),
                    KeyCode::Backspace => {
                        app.destination_input.pop();
                    }
                    _ => {}
                },
                AppMode::Transferring => {
                    // 结果返回之前忽略所有输入，绝不触发第二次传输
                }
                AppMode::Done => return Ok(()),
            }
        }

        // Update app state (handle async events)
        app.tick();
    }
}
