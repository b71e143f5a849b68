//! UI Rendering
//!
//! Main UI layout and rendering logic for the TUI.

use crate::session::{BannerLevel, SessionState};
use crate::tui::app::{App, View};
use crate::tui::markdown;
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use crate::types::Role;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const TITLE: &str = "파일 내용 질문하기 - Claude Sonnet 3.5";
const SUBTITLE: &str = "파일을 업로드하고 질문을 입력해주세요.";
const INDENT: &str = "  ";

/// Render the main UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let banners = app.controller.banners();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),                        // Header
            Constraint::Length(banners.len() as u16 + 2), // Banners
            Constraint::Min(6),                           // Messages
            Constraint::Length(3),                        // Input
            Constraint::Length(1),                        // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    widgets::render_banners(frame, chunks[1], &banners);
    render_messages(frame, chunks[2], app);
    render_input(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);

    if app.view == View::Help {
        render_help(frame);
    }
}

/// Render the header with the key status indicator
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    // the key itself is never drawn
    let key_status = match app.controller.session().api_key() {
        Some(_) => vec![
            Span::styled(Icons::DOT, Style::default().fg(Theme::SUCCESS)),
            Span::styled(" API 키 입력됨", Theme::text_dim()),
        ],
        None => vec![Span::styled(Icons::DOT, Style::default().fg(Theme::ERROR))],
    };

    let mut title_line = vec![Span::styled(TITLE, Theme::title()), Span::raw("  ")];
    title_line.extend(key_status);

    let header = Paragraph::new(vec![
        Line::from(title_line),
        Line::from(Span::styled(SUBTITLE, Theme::text_secondary())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(header, area);
}

/// Render the conversation, followed by the answer still streaming in
fn render_messages(frame: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.controller.session().document() {
        Some(doc) => format!(" {} ", doc.name()),
        None => " 대화 ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if app.view == View::Chat {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = (inner.width as usize).saturating_sub(INDENT.len());
    let mut lines: Vec<Line> = Vec::new();

    for turn in app.controller.session().conversation().turns() {
        push_message(&mut lines, turn.role, &turn.content, width);
    }

    if let Some(partial) = &app.streaming {
        push_message(&mut lines, Role::Assistant, partial, width);
        // cursor rides on the last line of the partial answer, ahead of the spacer
        let cursor = Span::styled(Icons::CURSOR, Theme::active());
        let spacer = lines.len() - 1;
        if partial.is_empty() {
            lines.insert(spacer, Line::from(vec![Span::raw(INDENT), cursor]));
        } else {
            lines[spacer - 1].spans.push(cursor);
        }
    }

    let content_height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.update_scroll_bounds(content_height, inner.height);

    let paragraph = Paragraph::new(lines).scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, inner);
}

fn push_message(lines: &mut Vec<Line<'static>>, role: Role, content: &str, width: usize) {
    let (label, style) = match role {
        Role::User => ("user", Theme::user_message()),
        Role::Assistant => ("assistant", Theme::assistant_message()),
    };
    lines.push(Line::from(vec![
        Span::styled(Icons::BAR, style),
        Span::styled(format!(" {}", label), style),
    ]));

    for mut line in markdown::render_markdown(content, width) {
        line.spans.insert(0, Span::raw(INDENT));
        lines.push(line);
    }

    lines.push(Line::from(""));
}

/// Render the input area
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.view == View::Chat && !app.is_streaming();

    let block = Block::default()
        .title(app.input_mode().title())
        .borders(Borders::ALL)
        .border_style(if is_focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = if app.is_streaming() {
        Span::styled("응답 생성 중...", Theme::active())
    } else {
        match app.controller.state() {
            SessionState::NeedsApiKey => Span::styled("API 키 필요", Theme::error()),
            SessionState::NeedsDocument => Span::styled("파일 필요", Theme::active()),
            SessionState::Ready => Span::styled("준비됨", Theme::banner(BannerLevel::Success)),
        }
    };

    let shortcuts = vec![
        Span::styled(" [Enter]", Theme::shortcut_key()),
        Span::styled(" 전송 ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+O]", Theme::shortcut_key()),
        Span::styled(" 파일 ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+K]", Theme::shortcut_key()),
        Span::styled(" API 키 ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+Q]", Theme::shortcut_key()),
        Span::styled(" 종료 ", Theme::shortcut_desc()),
        Span::styled("[F1]", Theme::shortcut_key()),
        Span::styled(" 도움말", Theme::shortcut_desc()),
    ];

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let entries = [
        ("Enter        ", "입력 전송 (API 키, 파일 경로, 질문)"),
        ("Ctrl+O       ", "다른 파일 업로드"),
        ("Ctrl+K       ", "API 키 변경"),
        ("Ctrl+Q       ", "종료"),
        ("Ctrl+C       ", "강제 종료"),
        ("↑/↓          ", "대화 스크롤"),
        ("PageUp/Down  ", "페이지 스크롤"),
        ("Esc          ", "닫기 / 취소"),
        ("F1 / Ctrl+H  ", "도움말"),
    ];

    let mut help_lines = vec![
        Line::from(Span::styled("단축키", Theme::heading())),
        Line::from(""),
    ];
    help_lines.extend(entries.iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(*key, Theme::shortcut_key()),
            Span::styled(*desc, Theme::text()),
        ])
    }));
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "아무 키나 누르면 닫힙니다",
        Theme::text_dim(),
    )));

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" 도움말 ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
