//! Application State
//!
//! Holds the session controller plus everything the screen needs: the input
//! line, scroll position and the answer currently streaming in.

use crate::session::{PendingQuestion, SessionController, SessionState};
use crate::tui::event::AppAction;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;
use tui_textarea::TextArea;

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Chat,
    Help,
}

/// What the input line currently collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    ApiKey,
    FilePath,
    Question,
}

impl InputMode {
    pub fn title(&self) -> &'static str {
        match self {
            InputMode::ApiKey => " Anthropic API 키 ",
            InputMode::FilePath => " 파일 경로 (csv, txt, pdf) ",
            InputMode::Question => " 질문 ",
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            InputMode::ApiKey => "Anthropic API 키:",
            InputMode::FilePath => "CSV, TXT, 또는 PDF 파일 선택",
            InputMode::Question => "파일 내용에 대해 질문하세요",
        }
    }
}

/// Events from the streaming task
#[derive(Debug)]
pub enum AppEvent {
    ResponseChunk(String),
    ResponseComplete,
    Error(String),
}

/// Main application state
pub struct App {
    pub controller: SessionController,

    pub view: View,
    pub should_quit: bool,

    pub input: TextArea<'static>,
    input_mode: InputMode,
    requested_mode: Option<InputMode>,

    /// Partial answer while the model is streaming
    pub streaming: Option<String>,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    follow_bottom: bool,

    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(controller: SessionController) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let mode = Self::mode_for_state(controller.state());

        Self {
            controller,
            view: View::Chat,
            should_quit: false,
            input: Self::new_input(mode),
            input_mode: mode,
            requested_mode: None,
            streaming: None,
            scroll_offset: 0,
            max_scroll: 0,
            follow_bottom: true,
            event_rx: rx,
            event_tx: tx,
        }
    }

    fn mode_for_state(state: SessionState) -> InputMode {
        match state {
            SessionState::NeedsApiKey => InputMode::ApiKey,
            SessionState::NeedsDocument => InputMode::FilePath,
            SessionState::Ready => InputMode::Question,
        }
    }

    fn new_input(mode: InputMode) -> TextArea<'static> {
        let mut input = TextArea::default();
        input.set_cursor_line_style(ratatui::style::Style::default());
        input.set_placeholder_text(mode.placeholder());
        if mode == InputMode::ApiKey {
            input.set_mask_char('•');
        }
        input
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.is_some()
    }

    /// Re-derive the input mode after the session changed; a new mode gets a
    /// fresh input line.
    fn sync_input_mode(&mut self) {
        let state = self.controller.state();
        if state == SessionState::NeedsApiKey {
            self.requested_mode = None;
        }
        let mode = self
            .requested_mode
            .unwrap_or_else(|| Self::mode_for_state(state));
        if mode != self.input_mode {
            self.input_mode = mode;
            self.input = Self::new_input(mode);
        }
    }

    /// Take the input line as typed and reset it.
    fn take_input(&mut self) -> String {
        let content = self.input.lines().join("\n");
        self.input = Self::new_input(self.input_mode);
        content
    }

    /// Drain events from the streaming task
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ResponseChunk(chunk) => {
                if let Some(partial) = self.streaming.as_mut() {
                    partial.push_str(&chunk);
                }
            }
            AppEvent::ResponseComplete => {
                if let Some(answer) = self.streaming.take() {
                    self.controller.complete_answer(answer);
                }
                self.scroll_to_bottom();
            }
            AppEvent::Error(error) => {
                self.streaming = None;
                self.controller.fail_answer(&error);
            }
        }
        self.sync_input_mode();
    }

    /// Handle a user action
    pub fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit => {
                // an answer in flight holds the screen; Ctrl+C still exits
                if !self.is_streaming() {
                    self.should_quit = true;
                }
            }
            AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => {
                if self.view == View::Chat {
                    self.submit();
                }
            }
            AppAction::PickFile => {
                if !self.is_streaming() && self.controller.state() != SessionState::NeedsApiKey {
                    self.requested_mode = Some(InputMode::FilePath);
                }
            }
            AppAction::ChangeApiKey => {
                if !self.is_streaming() {
                    self.requested_mode = Some(InputMode::ApiKey);
                }
            }
            AppAction::ToggleHelp => {
                self.view = if self.view == View::Help {
                    View::Chat
                } else {
                    View::Help
                };
            }
            AppAction::Escape => {
                if self.view != View::Chat {
                    self.view = View::Chat;
                } else {
                    self.requested_mode = None;
                }
            }
            AppAction::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                self.follow_bottom = false;
            }
            AppAction::ScrollDown => {
                self.scroll_offset = (self.scroll_offset + 1).min(self.max_scroll);
                self.follow_bottom = self.scroll_offset == self.max_scroll;
            }
            AppAction::ScrollPageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                self.follow_bottom = false;
            }
            AppAction::ScrollPageDown => {
                self.scroll_offset = (self.scroll_offset + 10).min(self.max_scroll);
                self.follow_bottom = self.scroll_offset == self.max_scroll;
            }
            AppAction::Input(key) => {
                if self.view == View::Help {
                    self.view = View::Chat;
                } else {
                    self.input.input(key);
                }
            }
            AppAction::Tick => {}
        }
        self.sync_input_mode();
    }

    fn submit(&mut self) {
        match self.input_mode {
            InputMode::ApiKey => {
                let key = self.take_input();
                if self.controller.submit_api_key(&key) {
                    self.requested_mode = None;
                }
            }
            InputMode::FilePath => {
                let raw = self.take_input();
                let path = raw.trim();
                if path.is_empty() {
                    return;
                }
                // outcome is reported through the banners
                let _ = self.controller.upload_path(&expand_home(path));
                self.requested_mode = None;
            }
            InputMode::Question => {
                if self.is_streaming() {
                    return;
                }
                let question = self.take_input();
                if question.trim().is_empty() {
                    return;
                }
                match self.controller.prepare_question(&question) {
                    Ok(pending) => self.start_stream(pending),
                    Err(blocked) => debug!(%blocked, "Question not sent"),
                }
            }
        }
    }

    /// Stream the answer on a background task; fragments come back as events.
    fn start_stream(&mut self, pending: PendingQuestion) {
        self.streaming = Some(String::new());
        self.scroll_to_bottom();

        let llm = self.controller.llm();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let mut stream = match llm.stream_chat(&pending.api_key, &pending.request).await {
                Ok(stream) => stream,
                Err(e) => {
                    tx.send(AppEvent::Error(e.to_string())).await.ok();
                    return;
                }
            };

            while let Some(fragment) = stream.next().await {
                match fragment {
                    Ok(text) => {
                        if tx.send(AppEvent::ResponseChunk(text)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tx.send(AppEvent::Error(e.to_string())).await.ok();
                        return;
                    }
                }
            }

            tx.send(AppEvent::ResponseComplete).await.ok();
        });
    }

    fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.scroll_offset = self.max_scroll;
    }

    /// Update max scroll based on content
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.follow_bottom || self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}

fn expand_home(raw: &str) -> PathBuf {
    let raw = raw.trim_matches(|c| c == '"' || c == '\'');
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::llm::{LLMAdapter, TextStream, LLM};
    use crate::types::{ApiKey, AppResult, LLMRequest, Role};
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::Arc;

    struct EchoAdapter;

    #[async_trait]
    impl LLMAdapter for EchoAdapter {
        async fn stream_chat(&self, _api_key: &ApiKey, request: &LLMRequest) -> AppResult<TextStream> {
            let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            let fragments: Vec<AppResult<String>> = vec![Ok("echo: ".to_string()), Ok(last)];
            Ok(Box::pin(futures::stream::iter(fragments)))
        }
    }

    fn app() -> App {
        let config = SessionConfig {
            upload_ttl_secs: 600,
            clear_history_on_expiry: false,
        };
        App::new(SessionController::new(
            LLM::from_adapter("echo", Arc::new(EchoAdapter)),
            config,
        ))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_action(AppAction::Input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
    }

    #[test]
    fn test_starts_in_api_key_mode() {
        let app = app();
        assert_eq!(app.input_mode(), InputMode::ApiKey);
        assert_eq!(app.controller.state(), SessionState::NeedsApiKey);
    }

    #[test]
    fn test_pick_file_blocked_without_key() {
        let mut app = app();
        app.handle_action(AppAction::PickFile);
        assert_eq!(app.input_mode(), InputMode::ApiKey);
    }

    #[tokio::test]
    async fn test_key_upload_and_question_flow() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let mut app = app();
        type_text(&mut app, "sk-ant-test");
        app.handle_action(AppAction::Submit);
        assert_eq!(app.input_mode(), InputMode::FilePath);

        type_text(&mut app, path.to_str().unwrap());
        app.handle_action(AppAction::Submit);
        assert_eq!(app.controller.state(), SessionState::Ready);
        assert_eq!(app.input_mode(), InputMode::Question);

        type_text(&mut app, " 합계는? ");
        app.handle_action(AppAction::Submit);
        assert!(app.is_streaming());

        // a second submit while streaming is ignored
        type_text(&mut app, "again");
        app.handle_action(AppAction::Submit);

        for _ in 0..100 {
            tokio::task::yield_now().await;
            app.poll_events();
            if !app.is_streaming() {
                break;
            }
        }
        assert!(!app.is_streaming());

        let turns = app.controller.session().conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, " 합계는? ");
        assert_eq!(turns[1].content, "echo:  합계는? ");
    }

    #[test]
    fn test_quit_waits_for_stream_but_force_quit_does_not() {
        let mut busy = app();
        busy.streaming = Some("partial".to_string());
        busy.handle_action(AppAction::Quit);
        assert!(!busy.should_quit);
        busy.handle_action(AppAction::ForceQuit);
        assert!(busy.should_quit);

        let mut idle = app();
        idle.handle_action(AppAction::Quit);
        assert!(idle.should_quit);
    }

    #[test]
    fn test_stream_error_becomes_banner() {
        let mut app = app();
        app.streaming = Some("partial".to_string());
        app.handle_event(AppEvent::Error("boom".to_string()));
        assert!(!app.is_streaming());
        assert!(app.controller.session().conversation().is_empty());
    }

    #[test]
    fn test_scroll_follows_bottom_until_user_scrolls() {
        let mut app = app();
        app.update_scroll_bounds(50, 10);
        assert_eq!(app.scroll_offset, 40);

        app.handle_action(AppAction::ScrollUp);
        app.update_scroll_bounds(60, 10);
        assert_eq!(app.scroll_offset, 39);

        app.handle_action(AppAction::ScrollPageDown);
        app.handle_action(AppAction::ScrollPageDown);
        assert_eq!(app.scroll_offset, 50);
        app.update_scroll_bounds(70, 10);
        assert_eq!(app.scroll_offset, 60);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("'/tmp/a.csv'"), PathBuf::from("/tmp/a.csv"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/a.txt"), home.join("a.txt"));
        }
    }
}
