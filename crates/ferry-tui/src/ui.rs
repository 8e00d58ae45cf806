//! UI rendering module

use ferry_core::Protocol;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, AppMode};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Main content
            Constraint::Length(8), // Log panel
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, chunks[0]);
    draw_main(frame, app, chunks[1]);
    draw_log_panel(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("多后端文件传输")
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title(" Ferry TUI "));

    frame.render_widget(title, area);
}

fn draw_main(frame: &mut Frame, app: &App, area: Rect) {
    match app.mode {
        AppMode::SelectingProtocol => draw_protocol_list(frame, app, area),
        AppMode::EnteringSource => {
            draw_input(frame, " 源文件路径 ", &app.source_input, area);
        }
        AppMode::EnteringDestination => {
            draw_input(frame, " 目标路径 ", &app.destination_input, area);
        }
        AppMode::Transferring => {
            let waiting = Paragraph::new("正在传输...\n请稍候，结果返回前不接受新的输入。")
                .block(Block::default().borders(Borders::ALL).title(" 🔄 传输中 "))
                .wrap(Wrap { trim: true });
            frame.render_widget(waiting, area);
        }
        AppMode::Done => draw_result(frame, app, area),
    }
}

fn draw_protocol_list(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let items: Vec<ListItem> = Protocol::ALL
        .iter()
        .enumerate()
        .map(|(i, protocol)| {
            let marker = if i == app.cursor { ">" } else { " " };
            let content = format!("{} {}", marker, protocol.name());
            let style = if i == app.cursor {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            ListItem::new(content).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" 选择协议 "))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(list, chunks[0]);

    let help = Paragraph::new("↑/↓ 选择协议\nEnter 确认\n\n按 'q' 退出")
        .block(Block::default().borders(Borders::ALL).title(" 帮助 "))
        .wrap(Wrap { trim: true });

    frame.render_widget(help, chunks[1]);
}

fn draw_input(frame: &mut Frame, title: &str, value: &str, area: Rect) {
    let text = format!("{}█", value);
    let input = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: false });

    frame.render_widget(input, area);
}

fn draw_result(frame: &mut Frame, app: &App, area: Rect) {
    let (title, text) = match &app.outcome {
        Some(outcome) if outcome.succeeded => (
            " ✅ 传输完成 ",
            format!(
                "{} -> {} ({})\n\n按任意键退出",
                outcome.source, outcome.destination, outcome.protocol
            ),
        ),
        Some(outcome) => (
            " ❌ 传输失败 ",
            format!(
                "{}\n\n按任意键退出",
                outcome.error_detail.as_deref().unwrap_or("unknown error")
            ),
        ),
        None => (" 结果 ", "按任意键退出".to_string()),
    };

    let result = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });

    frame.render_widget(result, area);
}

fn draw_log_panel(frame: &mut Frame, app: &App, area: Rect) {
    let capacity = area.height.saturating_sub(2) as usize;
    let entries: Vec<&ferry_core::LogEntry> = app.visible_logs().collect();
    let items: Vec<ListItem> = entries
        .iter()
        .rev()
        .take(capacity)
        .rev()
        .map(|entry| ListItem::new(format!("{} {}", entry.level.icon(), entry.message)))
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" 📋 日志 "));

    frame.render_widget(list, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_text = match app.mode {
        AppMode::SelectingProtocol => " 选择协议 ",
        AppMode::EnteringSource => " 输入源路径 ",
        AppMode::EnteringDestination => " 输入目标路径 ",
        AppMode::Transferring => " 🔄 传输中 ",
        AppMode::Done => " 完成 ",
    };

    let hints = match app.mode {
        AppMode::SelectingProtocol => "[↑/↓]选择 [Enter]确认 [q]退出",
        AppMode::EnteringSource | AppMode::EnteringDestination => "[Enter]确认 [Esc]返回",
        AppMode::Transferring => "等待结果...",
        AppMode::Done => "按任意键退出",
    };

    let status = Paragraph::new(format!("{}│ 协议: {} │ {}", mode_text, app.selected_protocol(), hints))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(status, area);
}
