//! Terminal User Interface Module
//!
//! The interactive surface of filechat. Built with Ratatui.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │     파일 내용 질문하기 - Claude Sonnet 3.5  ● API 키 입력됨      │
//! │             파일을 업로드하고 질문을 입력해주세요.              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ ● 📁 아래 입력창에 파일 경로를 입력하여 파일을 업로드하세요.    │
//! │ ● 'data.csv' 파일이 성공적으로 업로드되었습니다! ✅             │
//! ├─ data.csv ──────────────────────────────────────────────────────┤
//! │ ┃ user                                                          │
//! │   합계는?                                                       │
//! │ ┃ assistant                                                     │
//! │   ...▌                                                          │
//! ├─ 질문 ──────────────────────────────────────────────────────────┤
//! │ 파일 내용에 대해 질문하세요                                     │
//! └─────────────────────────────────────────────────────────────────┘
//!  준비됨 │ [Enter] 전송 [Ctrl+O] 파일 [Ctrl+K] API 키 [Ctrl+Q] 종료
//! ```

pub mod app;
pub mod event;
pub mod markdown;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, InputMode, View};
pub use event::{AppAction, EventHandler};

use crate::config::Config;
use crate::llm::{LLMProviderConfig, LLM};
use crate::session::SessionController;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: Config) -> anyhow::Result<()> {
    let llm = LLM::new(LLMProviderConfig {
        name: config.llm.provider.clone(),
        api_base: config.llm.api_base.clone(),
    })?;
    info!(provider = llm.provider_name(), model = %config.llm.model, "Starting TUI mode");

    let controller = SessionController::new(llm, config.session.clone());
    let mut app = App::new(controller);

    let mut terminal = init_terminal()?;
    let mut events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> anyhow::Result<()> {
    loop {
        // fragments from the streaming task land before each redraw
        app.poll_events();
        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next().await {
            Some(action) => app.handle_action(action),
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    info!(session_id = %app.controller.session().id(), "TUI exited normally");
    Ok(())
}
