use std::io::{self, Stdout};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Terminal,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    error::Result,
    game::GameState,
    render::{Cell, CellState, Frame, Status},
};

const HORIZONTAL_MARGIN: u16 = 2;

const PLAYER_GLYPH: &str = "$";
const FLOOR_GLYPH: &str = "=";
const LAVA_GLYPHS: &[char] = &['~', '#', '@', '_', '+', '-', ':', '?', '*'];

pub const INTRO_TITLE: &str = "WELCOME TO 'CURSED TYPIST' - STUPID TYPING GAME!";
pub const INTRO_PROMPT: &str = "Press any key to start playing";

/// Where finished frames go. Implementations must present a frame whole.
pub trait Screen {
    /// Number of terminal columns the text track has right now.
    fn track_width(&mut self) -> Result<u16>;
    fn draw(&mut self, frame: &Frame) -> Result<()>;
}

/// Track width left over for text once the border and margins are drawn.
pub fn track_width_for(area_width: u16) -> u16 {
    area_width.saturating_sub(2 + HORIZONTAL_MARGIN * 2)
}

/// A ratatui terminal. When acquired on the real tty it owns raw mode and the
/// alternate screen until dropped.
pub struct TerminalScreen<B: Backend> {
    terminal: Terminal<B>,
    owns_tty: bool,
}

impl TerminalScreen<CrosstermBackend<Stdout>> {
    pub fn acquire() -> Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, Hide) {
            restore_terminal();
            return Err(err.into());
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => {
                tracing::debug!("terminal acquired");
                Ok(Self {
                    terminal,
                    owns_tty: true,
                })
            }
            Err(err) => {
                restore_terminal();
                Err(err.into())
            }
        }
    }
}

impl<B: Backend> TerminalScreen<B> {
    pub fn with_backend(backend: B) -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            owns_tty: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn draw_intro(&mut self) -> Result<()> {
        self.terminal
            .draw(|f| f.render_widget(IntroScreen, f.area()))?;
        Ok(())
    }
}

impl<B: Backend> Screen for TerminalScreen<B> {
    fn track_width(&mut self) -> Result<u16> {
        Ok(track_width_for(self.terminal.size()?.width))
    }

    fn draw(&mut self, frame: &Frame) -> Result<()> {
        // ratatui diffs against the previous buffer and flushes once
        self.terminal.draw(|f| f.render_widget(frame, f.area()))?;
        Ok(())
    }
}

impl<B: Backend> Drop for TerminalScreen<B> {
    fn drop(&mut self) {
        if self.owns_tty {
            restore_terminal();
            tracing::debug!("terminal released");
        }
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

fn lava_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
}

fn floor_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn text_style() -> Style {
    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
}

fn player_style() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD)
}

fn rows(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // prompt
            Constraint::Length(1),
            Constraint::Length(1), // player
            Constraint::Length(1), // text
            Constraint::Length(1), // floor
            Constraint::Length(1), // lava
            Constraint::Length(1),
            Constraint::Length(1), // status
            Constraint::Length(1), // message
            Constraint::Min(0),
        ])
        .split(area)
        .to_vec()
}

impl Widget for &Frame {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = rows(inner);
        let width = chunks[4].width as usize;
        let lost = self.phase == GameState::Lost;

        Paragraph::new(self.title()).render(chunks[0], buf);
        Paragraph::new(self.prompt()).render(chunks[1], buf);

        let player_column = usize::from(self.player_column);
        if !lost && player_column < width {
            Paragraph::new(Line::from(vec![
                Span::raw(" ".repeat(player_column)),
                Span::styled(PLAYER_GLYPH, player_style()),
            ]))
            .render(chunks[3], buf);
        }

        Paragraph::new(text_line(self)).render(chunks[4], buf);
        Paragraph::new(floor_line(self, width)).render(chunks[5], buf);
        Paragraph::new(lava_line(self, width)).render(chunks[6], buf);

        Paragraph::new(Span::styled(
            status_text(&self.status, self.phase),
            Style::default().add_modifier(Modifier::DIM),
        ))
        .render(chunks[8], buf);

        if !self.message.is_empty() {
            Paragraph::new(Span::styled(self.message, lava_style()))
                .alignment(Alignment::Center)
                .render(chunks[9], buf);
        }
    }
}

fn text_line(frame: &Frame) -> Line<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let spans = frame
        .cells
        .iter()
        .map(|cell| match cell.state {
            CellState::Typed => Span::styled(
                glyph(cell),
                Style::default().fg(Color::Green).add_modifier(Modifier::DIM),
            ),
            CellState::Untyped => Span::styled(glyph(cell), text_style()),
            CellState::Cursor => {
                Span::styled(glyph(cell), text_style().add_modifier(Modifier::UNDERLINED))
            }
            CellState::IncorrectPending => Span::styled(
                match cell.ch {
                    ' ' => "·".to_owned(),
                    _ => glyph(cell),
                },
                bold.fg(Color::Red).add_modifier(Modifier::UNDERLINED),
            ),
        })
        .collect::<Vec<Span>>();
    Line::from(spans)
}

/// Zero-width characters would vanish into their neighbour, so they get a
/// visible stand-in of the one column the track reserves for them.
fn glyph(cell: &Cell) -> String {
    if cell.ch.width() == Some(0) {
        "◌".to_owned()
    } else {
        cell.ch.to_string()
    }
}

fn floor_line(frame: &Frame, width: usize) -> Line<'static> {
    // columns at or behind the lava front have crumbled
    let crumbled = match frame.lava.column {
        Some(col) => {
            let lava_cell = frame.lava.index - frame.window_start as i64;
            let cell_width = frame
                .cells
                .get(lava_cell as usize)
                .map_or(1, Cell::width);
            usize::from(col) + usize::from(cell_width)
        }
        None if frame.lava.index < frame.window_start as i64 => 0,
        None => width,
    }
    .min(width);

    let mut spans = vec![Span::raw(" ".repeat(crumbled))];
    if crumbled < width {
        let edge = if crumbled > 0 {
            floor_style().add_modifier(Modifier::REVERSED)
        } else {
            floor_style()
        };
        spans.push(Span::styled(FLOOR_GLYPH, edge));
        spans.push(Span::styled(
            FLOOR_GLYPH.repeat(width - crumbled - 1),
            floor_style(),
        ));
    }
    Line::from(spans)
}

fn lava_line(frame: &Frame, width: usize) -> Line<'static> {
    // same phase, same glyphs: frames stay reproducible
    let mut rng = StdRng::seed_from_u64(frame.lava_phase);
    let mut glyphs: Vec<char> = (0..width)
        .map(|_| *LAVA_GLYPHS.choose(&mut rng).unwrap_or(&'~'))
        .collect();

    if frame.phase == GameState::Lost {
        if let Some(slot) = glyphs.get_mut(usize::from(frame.player_column)) {
            *slot = '$';
        }
    }

    Line::from(Span::styled(glyphs.into_iter().collect::<String>(), lava_style()))
}

pub fn status_text(status: &Status, phase: GameState) -> String {
    let mut line = format!(
        "time {:.1}s | mistakes {} | {}/{} | lead {}",
        status.elapsed.as_secs_f64(),
        status.mistakes,
        status.cursor,
        status.len,
        status.lead,
    );
    if phase == GameState::Won {
        line.push_str(&format!(
            " | {} wpm | {}% acc",
            status.wpm, status.accuracy
        ));
    }
    line
}

/// Shown before the lava starts moving.
pub struct IntroScreen;

impl Widget for IntroScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = rows(inner);
        let title_width = INTRO_TITLE.width() as u16;
        let title = if title_width <= chunks[0].width {
            Span::styled(INTRO_TITLE, Style::default().add_modifier(Modifier::BOLD))
        } else {
            Span::raw("CURSED TYPIST")
        };
        Paragraph::new(title).render(chunks[0], buf);
        Paragraph::new(Span::styled(
            INTRO_PROMPT,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[1], buf);
    }
}
