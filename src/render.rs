use std::time::Duration;

use unicode_width::UnicodeWidthChar;

use crate::{game::GameState, lava::LavaTracker, text::TextBuffer};

pub const WRONG_KEY_MESSAGE: &str = "WRONG KEY";

const CHARS_PER_WORD: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Typed,
    Untyped,
    Cursor,
    IncorrectPending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub state: CellState,
}

impl Cell {
    /// Terminal columns the cell occupies. Zero-width characters still get a
    /// column so the player can see what to type.
    pub fn width(&self) -> u16 {
        glyph_width(self.ch)
    }
}

fn glyph_width(ch: char) -> u16 {
    ch.width().unwrap_or(0).max(1) as u16
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LavaMarker {
    /// Lava front in text index space.
    pub index: i64,
    /// Screen column where the front's cell starts, if it is on screen.
    pub column: Option<u16>,
    /// How many cells the player is ahead of the lava.
    pub lead: i64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Status {
    pub elapsed: Duration,
    pub mistakes: u32,
    pub cursor: usize,
    pub len: usize,
    pub lead: i64,
    pub wpm: f64,
    pub accuracy: f64,
}

/// One terminal snapshot of the game.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub phase: GameState,
    pub cells: Vec<Cell>,
    pub window_start: usize,
    pub player_column: u16,
    pub lava: LavaMarker,
    pub lava_phase: u64,
    pub status: Status,
    pub message: &'static str,
}

impl Frame {
    pub fn with_phase(mut self, phase: GameState) -> Self {
        self.phase = phase;
        self
    }

    pub fn title(&self) -> &'static str {
        match self.phase {
            GameState::Running => "RUN FROM THE LAVA!",
            GameState::Won => "YOU WIN!",
            GameState::Lost => "OUCH, YOU HAVE FALLEN INTO THE LAVA!",
            GameState::Quit => "BYE!",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self.phase {
            GameState::Running => "Type the text to run forward",
            GameState::Won => "You have successfully escaped from lava. Press q to quit",
            GameState::Lost => "Press q to quit",
            GameState::Quit => "",
        }
    }

    pub fn visible_text(&self) -> String {
        self.cells.iter().map(|cell| cell.ch).collect()
    }
}

/// Projects game state into frames for a track of fixed width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSurface {
    width: u16,
}

impl RenderSurface {
    pub fn new(width: u16) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn with_width(self, width: u16) -> Self {
        Self::new(width)
    }

    pub fn render(&self, text: &TextBuffer, lava: &LavaTracker, elapsed: Duration) -> Frame {
        let cursor = text.cursor();
        let len = text.len();
        let chars = text.text().chars();

        // the page holding the cursor; the last page stays up once typed out
        let anchor = cursor.min(len.saturating_sub(1));
        let (window_start, window_end) = self.page_around(chars, anchor);

        let cells: Vec<Cell> = chars[window_start..window_end]
            .iter()
            .enumerate()
            .map(|(offset, &ch)| {
                let idx = window_start + offset;
                let state = if idx < cursor {
                    CellState::Typed
                } else if idx > cursor {
                    CellState::Untyped
                } else if text.pending_mistakes() > 0 {
                    CellState::IncorrectPending
                } else {
                    CellState::Cursor
                };
                Cell { ch, state }
            })
            .collect();

        let player_column = column_of(&cells, cursor - window_start).min(self.width - 1);

        let lava_index = lava.index();
        let lava_column = lava_index
            .checked_sub(window_start as i64)
            .filter(|offset| (0..cells.len() as i64).contains(offset))
            .map(|offset| column_of(&cells, offset as usize));
        let lead = cursor as i64 - lava_index;

        let phase = if text.is_complete() {
            GameState::Won
        } else if lava.has_caught(cursor) {
            GameState::Lost
        } else {
            GameState::Running
        };

        let message = if text.pending_mistakes() > 0 && phase == GameState::Running {
            WRONG_KEY_MESSAGE
        } else {
            ""
        };

        Frame {
            phase,
            cells,
            window_start,
            player_column,
            lava: LavaMarker {
                index: lava_index,
                column: lava_column,
                lead,
            },
            lava_phase: lava.ticks(),
            status: Status {
                elapsed,
                mistakes: text.total_mistakes(),
                cursor,
                len,
                lead,
                wpm: words_per_minute(cursor, elapsed),
                accuracy: accuracy(cursor, text.total_mistakes()),
            },
            message,
        }
    }

    /// Splits the text into pages that each fit the track width and returns
    /// the index range of the page containing `anchor`.
    fn page_around(&self, chars: &[char], anchor: usize) -> (usize, usize) {
        let width = usize::from(self.width);
        let mut start = 0;
        let mut used = 0;
        for (idx, &ch) in chars.iter().enumerate() {
            let w = usize::from(glyph_width(ch));
            // a page always holds at least one character
            if used > 0 && used + w > width {
                if idx > anchor {
                    return (start, idx);
                }
                start = idx;
                used = 0;
            }
            used += w;
        }
        (start, chars.len())
    }
}

/// Screen column where the cell at `offset` starts.
fn column_of(cells: &[Cell], offset: usize) -> u16 {
    cells
        .iter()
        .take(offset)
        .map(Cell::width)
        .fold(0u16, u16::saturating_add)
}

fn words_per_minute(typed: usize, elapsed: Duration) -> f64 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    ((typed as f64 / CHARS_PER_WORD) / minutes).round()
}

fn accuracy(correct: usize, mistakes: u32) -> f64 {
    let attempts = correct as f64 + f64::from(mistakes);
    if attempts == 0.0 {
        return 100.0;
    }
    ((correct as f64 / attempts) * 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TargetText;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::new(TargetText::new(text).unwrap())
    }

    #[test]
    fn test_cells_are_tagged_by_progress() {
        let mut text = buffer("cat");
        text.advance().unwrap();
        let lava = LavaTracker::new(4.0, 7);

        let frame = RenderSurface::new(40).render(&text, &lava, Duration::ZERO);

        let states: Vec<CellState> = frame.cells.iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![CellState::Typed, CellState::Cursor, CellState::Untyped]
        );
        assert_eq!(frame.visible_text(), "cat");
        assert_eq!(frame.player_column, 1);
        assert_eq!(frame.phase, GameState::Running);
        assert_eq!(frame.message, "");
    }

    #[test]
    fn test_pending_mistake_marks_cursor_cell() {
        let mut text = buffer("cat");
        text.record_mistake();
        let lava = LavaTracker::new(4.0, 7);

        let frame = RenderSurface::new(40).render(&text, &lava, Duration::ZERO);

        assert_eq!(frame.cells[0].state, CellState::IncorrectPending);
        assert_eq!(frame.message, WRONG_KEY_MESSAGE);
        assert_eq!(frame.status.mistakes, 1);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut text = buffer("hello lava");
        text.advance().unwrap();
        text.record_mistake();
        let mut lava = LavaTracker::new(4.0, 2);
        lava.tick(Duration::from_millis(250));
        let surface = RenderSurface::new(6);
        let elapsed = Duration::from_millis(1500);

        assert_eq!(
            surface.render(&text, &lava, elapsed),
            surface.render(&text, &lava, elapsed)
        );
    }

    #[test]
    fn test_window_pages_with_cursor() {
        let mut text = buffer("abcdefghij");
        let lava = LavaTracker::new(4.0, 7);
        let surface = RenderSurface::new(4);

        assert_eq!(surface.render(&text, &lava, Duration::ZERO).visible_text(), "abcd");

        for _ in 0..5 {
            text.advance().unwrap();
        }
        let frame = surface.render(&text, &lava, Duration::ZERO);
        assert_eq!(frame.window_start, 4);
        assert_eq!(frame.visible_text(), "efgh");
        assert_eq!(frame.player_column, 1);

        for _ in 0..5 {
            text.advance().unwrap();
        }
        let frame = surface.render(&text, &lava, Duration::ZERO);
        assert_eq!(frame.window_start, 8);
        assert_eq!(frame.visible_text(), "ij");
        assert_eq!(frame.phase, GameState::Won);
    }

    #[test]
    fn test_lava_marker_maps_into_cursor_space() {
        let mut text = buffer("abcdefgh");
        for _ in 0..4 {
            text.advance().unwrap();
        }
        let mut lava = LavaTracker::new(4.0, 1);
        for _ in 0..3 {
            lava.tick(Duration::from_millis(250));
        }

        let frame = RenderSurface::new(40).render(&text, &lava, Duration::ZERO);

        assert_eq!(frame.lava.index, 2);
        assert_eq!(frame.lava.column, Some(2));
        assert_eq!(frame.lava.lead, 2);
        assert_eq!(frame.lava_phase, 3);
    }

    #[test]
    fn test_lava_behind_window_has_no_column() {
        let text = buffer("abc");
        let lava = LavaTracker::new(4.0, 7);

        let frame = RenderSurface::new(40).render(&text, &lava, Duration::ZERO);

        assert_eq!(frame.lava.index, -7);
        assert_eq!(frame.lava.column, None);
        assert_eq!(frame.status.lead, 7);
    }

    #[test]
    fn test_caught_player_renders_lost() {
        let text = buffer("abc");
        let mut lava = LavaTracker::new(4.0, 0);
        lava.tick(Duration::from_millis(250));

        let frame = RenderSurface::new(40).render(&text, &lava, Duration::ZERO);

        assert_eq!(frame.phase, GameState::Lost);
        assert_eq!(frame.title(), "OUCH, YOU HAVE FALLEN INTO THE LAVA!");
    }

    #[test]
    fn test_quit_phase_override() {
        let text = buffer("abc");
        let lava = LavaTracker::new(4.0, 7);

        let frame = RenderSurface::new(40)
            .render(&text, &lava, Duration::ZERO)
            .with_phase(GameState::Quit);

        assert_eq!(frame.phase, GameState::Quit);
        assert_eq!(frame.prompt(), "");
    }

    #[test]
    fn test_results_stats() {
        assert_eq!(words_per_minute(50, Duration::from_secs(60)), 10.0);
        assert_eq!(words_per_minute(10, Duration::ZERO), 0.0);
        assert_eq!(accuracy(3, 1), 75.0);
        assert_eq!(accuracy(0, 0), 100.0);
    }

    #[test]
    fn test_pages_by_display_width() {
        let mut text = buffer("ab漢字cd漢e");
        let lava = LavaTracker::new(4.0, 7);
        let surface = RenderSurface::new(5);

        let frame = surface.render(&text, &lava, Duration::ZERO);
        assert_eq!(frame.visible_text(), "ab漢");

        for _ in 0..5 {
            text.advance().unwrap();
        }
        let frame = surface.render(&text, &lava, Duration::ZERO);
        assert_eq!(frame.window_start, 3);
        assert_eq!(frame.visible_text(), "字cd");
        // 字 spans columns 0-1, so d starts at column 3
        assert_eq!(frame.player_column, 3);

        let columns: u16 = frame.cells.iter().map(Cell::width).sum();
        assert!(columns <= surface.width());
    }

    #[test]
    fn test_lava_column_counts_wide_cells() {
        let mut text = buffer("漢字ab");
        for _ in 0..3 {
            text.advance().unwrap();
        }
        let mut lava = LavaTracker::new(4.0, 0);
        for _ in 0..2 {
            lava.tick(Duration::from_millis(250));
        }

        let frame = RenderSurface::new(40).render(&text, &lava, Duration::ZERO);

        assert_eq!(frame.lava.index, 2);
        assert_eq!(frame.lava.column, Some(4));
        assert_eq!(frame.player_column, 5);
    }

    #[test]
    fn test_glyph_wider_than_track_still_shown() {
        let frame =
            RenderSurface::new(1).render(&buffer("漢a"), &LavaTracker::new(1.0, 3), Duration::ZERO);
        assert_eq!(frame.visible_text(), "漢");
        assert_eq!(frame.player_column, 0);
    }

    #[test]
    fn test_zero_width_is_clamped() {
        let surface = RenderSurface::new(0);
        assert_eq!(surface.width(), 1);
        let frame = surface.render(&buffer("ab"), &LavaTracker::new(1.0, 3), Duration::ZERO);
        assert_eq!(frame.visible_text(), "a");
    }
}
