use crate::error::{GameError, Result};

pub const DEFAULT_TEXT: &str = "
You can play on your own texts - just pass the path as a command line
argument";

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// The text a player has to type. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetText {
    chars: Vec<char>,
}

impl TargetText {
    pub fn new(text: &str) -> Result<Self> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Err(GameError::invalid_input("the text to type is empty"));
        }
        Ok(Self { chars })
    }

    /// Prepares raw file contents for play: every line is trimmed, blank lines
    /// are dropped and the rest is joined into one running line.
    pub fn from_source(raw: &str) -> Result<Self> {
        let joined = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>()
            .join(" ");
        let cleaned: String = joined
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        Self::new(&cleaned)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

/// Target text plus the player's progress through it.
#[derive(Clone, Debug)]
pub struct TextBuffer {
    text: TargetText,
    cursor: usize,
    pending_mistakes: u32,
    total_mistakes: u32,
}

impl TextBuffer {
    pub fn new(text: TargetText) -> Self {
        Self {
            text,
            cursor: 0,
            pending_mistakes: 0,
            total_mistakes: 0,
        }
    }

    pub fn text(&self) -> &TargetText {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.text.len()
    }

    /// The character the player has to type next, `None` once complete.
    pub fn expected(&self) -> Option<char> {
        self.text.get(self.cursor)
    }

    pub fn pending_mistakes(&self) -> u32 {
        self.pending_mistakes
    }

    pub fn total_mistakes(&self) -> u32 {
        self.total_mistakes
    }

    pub fn classify(&self, c: char) -> Result<Outcome> {
        let expected = self.expected().ok_or(self.out_of_range())?;
        if c == expected {
            Ok(Outcome::Correct)
        } else {
            Ok(Outcome::Incorrect)
        }
    }

    pub fn advance(&mut self) -> Result<()> {
        if self.is_complete() {
            return Err(self.out_of_range());
        }
        self.cursor += 1;
        self.pending_mistakes = 0;
        Ok(())
    }

    pub fn record_mistake(&mut self) {
        self.pending_mistakes += 1;
        self.total_mistakes += 1;
    }

    fn out_of_range(&self) -> GameError {
        GameError::OutOfRange {
            cursor: self.cursor,
            len: self.text.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::new(TargetText::new(text).unwrap())
    }

    #[test]
    fn test_target_text_rejects_empty() {
        assert_matches!(TargetText::new(""), Err(GameError::InvalidInput { .. }));
    }

    #[test]
    fn test_from_source_joins_lines() {
        let text = TargetText::from_source("  hello \n\n  lava\tworld\n").unwrap();
        let s: String = text.chars().iter().collect();
        assert_eq!(s, "hello lava world");
    }

    #[test]
    fn test_from_source_blank_file_is_invalid() {
        assert_matches!(
            TargetText::from_source("\n   \n\t\n"),
            Err(GameError::InvalidInput { .. })
        );
    }

    #[test]
    fn test_default_text_prepares_cleanly() {
        let text = TargetText::from_source(DEFAULT_TEXT).unwrap();
        assert_eq!(text.get(0), Some('Y'));
        assert_eq!(text.get(text.len() - 1), Some('t'));
    }

    #[test]
    fn test_classify_against_cursor() {
        let buf = buffer("cat");
        assert_eq!(buf.classify('c').unwrap(), Outcome::Correct);
        assert_eq!(buf.classify('x').unwrap(), Outcome::Incorrect);
    }

    #[test]
    fn test_advance_clears_pending_mistakes() {
        let mut buf = buffer("cat");
        buf.record_mistake();
        buf.record_mistake();
        assert_eq!(buf.pending_mistakes(), 2);

        buf.advance().unwrap();
        assert_eq!(buf.cursor(), 1);
        assert_eq!(buf.pending_mistakes(), 0);
        assert_eq!(buf.total_mistakes(), 2);
    }

    #[test]
    fn test_mistake_does_not_move_cursor() {
        let mut buf = buffer("cat");
        buf.record_mistake();
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.expected(), Some('c'));
    }

    #[test]
    fn test_out_of_range_after_completion() {
        let mut buf = buffer("a");
        buf.advance().unwrap();
        assert!(buf.is_complete());
        assert_eq!(buf.expected(), None);
        assert_matches!(
            buf.advance(),
            Err(GameError::OutOfRange { cursor: 1, len: 1 })
        );
        assert_matches!(buf.classify('a'), Err(GameError::OutOfRange { .. }));
    }

    #[test]
    fn test_multibyte_text_is_indexed_by_char() {
        let mut buf = buffer("héllo");
        buf.advance().unwrap();
        assert_eq!(buf.classify('é').unwrap(), Outcome::Correct);
        assert_eq!(buf.len(), 5);
    }
}
