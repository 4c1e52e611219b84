use super::types::PageCommand;
use crate::error::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Map a key press to a capture page command
pub fn command_for_key(key: &KeyEvent) -> Option<PageCommand> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PageCommand::Exit)
        }
        KeyCode::Char(' ') | KeyCode::Enter => Some(PageCommand::Capture),
        KeyCode::Char('c') | KeyCode::Esc => Some(PageCommand::Cancel),
        KeyCode::Char('q') => Some(PageCommand::Exit),
        _ => None,
    }
}

/// Terminal key handler driving the capture page
pub struct KeyboardInputHandler {
    commands: mpsc::Sender<PageCommand>,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    pub fn new(commands: mpsc::Sender<PageCommand>) -> Self {
        Self {
            commands,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start listening for keyboard input
    pub async fn start(&self) -> Result<()> {
        info!("Keyboard input active: SPACE to capture, c/Esc to cancel, q to quit");

        let commands = self.commands.clone();
        let cancellation_token = self.cancellation_token.clone();

        task::spawn_blocking(move || {
            // Raw mode delivers single key presses without echo
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            while !cancellation_token.is_cancelled() {
                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }

                        match command_for_key(&key_event) {
                            Some(command) => {
                                debug!("Key {:?} -> {:?}", key_event.code, command);
                                if let Err(e) = commands.try_send(command) {
                                    warn!("Dropped {:?}: {}", command, e);
                                }
                                if command == PageCommand::Exit {
                                    break;
                                }
                            }
                            None => debug!("Key pressed: {:?}", key_event.code),
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            } else {
                debug!("Raw mode disabled");
            }
        });

        Ok(())
    }

    /// Stop the keyboard input handler
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        // Give the task a moment to clean up and disable raw mode
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = disable_raw_mode();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            command_for_key(&key(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(PageCommand::Capture)
        );
        assert_eq!(
            command_for_key(&key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(PageCommand::Cancel)
        );
        assert_eq!(
            command_for_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(PageCommand::Exit)
        );
        assert_eq!(
            command_for_key(&key(KeyCode::Char('x'), KeyModifiers::NONE)),
            None
        );
    }

    #[tokio::test]
    async fn test_keyboard_handler_stop() {
        let (sender, _receiver) = mpsc::channel(4);
        let handler = KeyboardInputHandler::new(sender);

        assert!(!handler.cancellation_token.is_cancelled());
        handler.stop().await.unwrap();
        assert!(handler.cancellation_token.is_cancelled());
    }
}
