//! Event Handling
//!
//! Maps terminal key presses and a periodic tick onto [`AppAction`]s.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the application
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Quit the application
    Quit,
    /// Quit even while an answer is streaming
    ForceQuit,
    /// Submit the input line (Enter)
    Submit,
    /// Switch the input line to a file path (Ctrl+O)
    PickFile,
    /// Switch the input line to the API key (Ctrl+K)
    ChangeApiKey,
    /// Toggle help view
    ToggleHelp,
    /// Close the help view or cancel a pending switch
    Escape,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    /// Keystroke for the input line
    Input(KeyEvent),
    /// Timer tick; drives redraws while an answer streams in
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Wait for the next action
    pub async fn next(&mut self) -> Option<AppAction> {
        self.rx.recv().await
    }
}

fn map_event(event: Event) -> Option<AppAction> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key_event(key),
        _ => None,
    }
}

/// Map a key event to an app action
pub fn map_key_event(key: KeyEvent) -> Option<AppAction> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),
        (KeyModifiers::CONTROL, KeyCode::Char('o')) => Some(AppAction::PickFile),
        (KeyModifiers::CONTROL, KeyCode::Char('k')) => Some(AppAction::ChangeApiKey),
        (KeyModifiers::CONTROL, KeyCode::Char('h')) => Some(AppAction::ToggleHelp),

        (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
            KeyCode::Esc => Some(AppAction::Escape),
            KeyCode::Enter => Some(AppAction::Submit),
            KeyCode::F(1) => Some(AppAction::ToggleHelp),

            KeyCode::Up => Some(AppAction::ScrollUp),
            KeyCode::Down => Some(AppAction::ScrollDown),
            KeyCode::PageUp => Some(AppAction::ScrollPageUp),
            KeyCode::PageDown => Some(AppAction::ScrollPageDown),

            // Everything else, Backspace included, edits the input line
            _ => Some(AppAction::Input(key)),
        },

        _ => Some(AppAction::Input(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_control_shortcuts() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(AppAction::ForceQuit)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('o'), KeyModifiers::CONTROL)),
            Some(AppAction::PickFile)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('k'), KeyModifiers::CONTROL)),
            Some(AppAction::ChangeApiKey)
        );
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            map_key_event(key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(AppAction::Submit)
        );
        assert_eq!(
            map_key_event(key(KeyCode::PageUp, KeyModifiers::NONE)),
            Some(AppAction::ScrollPageUp)
        );
        let typed = key(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert_eq!(map_key_event(typed), Some(AppAction::Input(typed)));
        let backspace = key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(map_key_event(backspace), Some(AppAction::Input(backspace)));
    }

    #[test]
    fn test_release_events_ignored() {
        let mut release = key(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_event(Event::Key(release)), None);
        assert_eq!(map_event(Event::Resize(80, 24)), None);
    }
}
