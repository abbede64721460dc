use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single line editor backing the command line at the bottom of the screen.
/// Fed raw key events while a command mode is active; reports a finished or
/// canceled result the model then dispatches on.
#[derive(Default)]
pub struct Inputter {
    buffer: String,
    cursor: usize, // cursor position in chars, 0..=char_count
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub cursor: usize,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.finished = true,
            (KeyCode::Esc, KeyModifiers::NONE) => {
                self.buffer.clear();
                self.cursor = 0;
                self.canceled = true;
                self.finished = true;
            }
            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let index = self.byte_index();
                    self.buffer.remove(index);
                }
            }
            (KeyCode::Delete, _) => {
                if self.cursor < self.char_count() {
                    let index = self.byte_index();
                    self.buffer.remove(index);
                }
            }
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor = (self.cursor + 1).min(self.char_count()),
            (KeyCode::Home, _) => self.cursor = 0,
            (KeyCode::End, _) => self.cursor = self.char_count(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.buffer.clear();
                self.cursor = 0;
            }
            (KeyCode::Char(chr), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                let index = self.byte_index();
                self.buffer.insert(index, chr);
                self.cursor += 1;
            }
            (code, modifiers) => trace!("Ignoring input key {code:?} {modifiers:?}"),
        }
        self.snapshot()
    }

    /// Seeds the buffer, cursor at the end. Used to re-edit the last prompt.
    pub fn prefill(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.char_count();
    }

    pub fn snapshot(&self) -> InputResult {
        InputResult {
            input: self.buffer.clone(),
            finished: self.finished,
            canceled: self.canceled,
            cursor: self.cursor,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.finished = false;
        self.canceled = false;
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map(|(index, _)| index)
            .unwrap_or(self.buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::from(code))
    }

    #[test]
    fn typing_then_enter_finishes() {
        let mut inputter = Inputter::default();
        for chr in "v8".chars() {
            press(&mut inputter, KeyCode::Char(chr));
        }
        let result = press(&mut inputter, KeyCode::Enter);
        assert_eq!(result.input, "v8");
        assert!(result.finished);
        assert!(!result.canceled);
    }

    #[test]
    fn escape_cancels_and_clears() {
        let mut inputter = Inputter::default();
        press(&mut inputter, KeyCode::Char('x'));
        let result = press(&mut inputter, KeyCode::Esc);
        assert!(result.canceled);
        assert!(result.finished);
        assert_eq!(result.input, "");
    }

    #[test]
    fn backspace_removes_before_the_cursor() {
        let mut inputter = Inputter::default();
        for chr in "abc".chars() {
            press(&mut inputter, KeyCode::Char(chr));
        }
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "ac");
        assert_eq!(result.cursor, 1);
    }

    #[test]
    fn insert_respects_multibyte_boundaries() {
        let mut inputter = Inputter::default();
        inputter.prefill("aß");
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Char('x'));
        assert_eq!(result.input, "axß");
    }

    #[test]
    fn prefill_puts_cursor_at_the_end() {
        let mut inputter = Inputter::default();
        inputter.prefill("old prompt");
        let result = inputter.snapshot();
        assert_eq!(result.cursor, 10);
        assert_eq!(result.input, "old prompt");
    }

    #[test]
    fn ctrl_u_clears_the_line_without_finishing() {
        let mut inputter = Inputter::default();
        inputter.prefill("something");
        let result = inputter.read(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(result.input, "");
        assert!(!result.finished);
    }
}
