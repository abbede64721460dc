use std::time::Duration;
use tracing::trace;

use crate::domain::{Config, Message, XrevError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(config: &Config) -> Self {
        Self {
            event_poll_time: config.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, XrevError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // While the command line is active every key belongs to it
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(self.handle_key(key));
                }
                Event::Resize(width, height) => return Ok(Some(Message::Resize(width, height))),
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Char(' ') => Some(Message::ToggleSelect),
            KeyCode::Char('a') => Some(Message::ToggleSelectAll),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Char('f') => Some(Message::FilterAttribute),
            KeyCode::Char('v') => Some(Message::FilterValue),
            KeyCode::Char('x') => Some(Message::ClearFilter),
            KeyCode::Char('p') => Some(Message::RefinePrompt),
            KeyCode::Char('R') => Some(Message::Reprocess),
            KeyCode::Char('e') => Some(Message::Export),
            KeyCode::Char('y') => Some(Message::CopyRow),
            KeyCode::Char('Y') => Some(Message::CopyTable),
            KeyCode::Char('?') => Some(Message::Help),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
