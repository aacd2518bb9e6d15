use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::{
    config::GameConfig,
    error::Result,
    input::{self, ControlSignal, KeystrokeOutcome},
    lava::LavaTracker,
    render::{Frame, RenderSurface},
    runtime::{EventSource, GameEvent, Runner, Ticker},
    text::TextBuffer,
    ui::Screen,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum GameState {
    Running,
    Won,
    Lost,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Won { elapsed: Duration, mistakes: u32 },
    Lost,
    Quit,
}

impl GameResult {
    pub fn state(&self) -> GameState {
        match self {
            GameResult::Won { .. } => GameState::Won,
            GameResult::Lost => GameState::Lost,
            GameResult::Quit => GameState::Quit,
        }
    }
}

/// Owns the session state and advances it one event at a time.
pub struct GameLoop<D: Screen> {
    text: TextBuffer,
    lava: LavaTracker,
    surface: RenderSurface,
    screen: D,
    state: GameState,
    started_at: Option<Instant>,
    final_elapsed: Option<Duration>,
    tick_interval: Duration,
    wrong_key_penalty: u16,
}

impl<D: Screen> GameLoop<D> {
    pub fn new(text: TextBuffer, config: &GameConfig, screen: D) -> Self {
        Self {
            text,
            lava: LavaTracker::new(config.lava_speed, config.head_start),
            surface: RenderSurface::new(0),
            screen,
            state: GameState::Running,
            started_at: None,
            final_elapsed: None,
            tick_interval: config.tick_interval(),
            wrong_key_penalty: config.wrong_key_penalty,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    pub fn lava(&self) -> &LavaTracker {
        &self.lava
    }

    pub fn screen(&self) -> &D {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut D {
        &mut self.screen
    }

    pub fn into_screen(self) -> D {
        self.screen
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.final_elapsed
            .or_else(|| self.started_at.map(|at| at.elapsed()))
            .unwrap_or_default()
    }

    /// Drives the loop until the session ends. The runner's tick clock is
    /// restarted so time spent before the session does not count.
    pub fn run<E: EventSource, T: Ticker>(
        &mut self,
        runner: &mut Runner<E, T>,
    ) -> Result<GameResult> {
        info!(
            len = self.text.len(),
            tick_ms = self.tick_interval.as_millis() as u64,
            speed = self.lava.speed(),
            "session started"
        );
        runner.restart();
        self.repaint()?;

        loop {
            if let Some(result) = self.handle(runner.step())? {
                info!(
                    ?result,
                    elapsed_ms = self.elapsed().as_millis() as u64,
                    "session ended"
                );
                return Ok(result);
            }
        }
    }

    /// One cycle: apply the event, check for an ending, repaint.
    pub fn handle(&mut self, event: GameEvent) -> Result<Option<GameResult>> {
        if self.state != GameState::Running {
            return Ok(None);
        }

        match event {
            GameEvent::Tick => {
                self.lava.tick(self.tick_interval);
                trace!(position = self.lava.position(), "tick");
            }
            GameEvent::Key(_) | GameEvent::Resize => {
                match input::classify_event(&event, self.text.expected()) {
                    KeystrokeOutcome::Match => {
                        self.start_clock();
                        self.text.advance()?;
                        trace!(cursor = self.text.cursor(), "match");
                    }
                    KeystrokeOutcome::Mismatch(c) => {
                        self.start_clock();
                        self.text.record_mistake();
                        if self.wrong_key_penalty > 0 {
                            self.lava.surge(self.wrong_key_penalty);
                        }
                        trace!(got = %c, expected = ?self.text.expected(), "mismatch");
                    }
                    KeystrokeOutcome::Control(
                        ControlSignal::Quit | ControlSignal::Interrupt,
                    ) => {
                        self.transition(GameState::Quit);
                        self.repaint()?;
                        return Ok(Some(GameResult::Quit));
                    }
                    // the repaint below picks up the new track width
                    KeystrokeOutcome::Control(ControlSignal::Resize) => {
                        debug!("terminal resized");
                    }
                    KeystrokeOutcome::Ignored => {
                        trace!(?event, "ignored event");
                    }
                }
            }
        }

        let result = self.evaluate();
        self.repaint()?;
        Ok(result)
    }

    /// Builds the frame for the current state without drawing it.
    pub fn frame(&self) -> Frame {
        self.surface
            .render(&self.text, &self.lava, self.elapsed())
            .with_phase(self.state)
    }

    fn start_clock(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
            debug!("clock started");
        }
    }

    fn evaluate(&mut self) -> Option<GameResult> {
        if self.text.is_complete() {
            let elapsed = self.elapsed();
            self.final_elapsed = Some(elapsed);
            self.transition(GameState::Won);
            Some(GameResult::Won {
                elapsed,
                mistakes: self.text.total_mistakes(),
            })
        } else if self.lava.has_caught(self.text.cursor()) {
            self.final_elapsed = Some(self.elapsed());
            self.transition(GameState::Lost);
            Some(GameResult::Lost)
        } else {
            None
        }
    }

    fn transition(&mut self, next: GameState) {
        debug!(
            from = %self.state,
            to = %next,
            cursor = self.text.cursor(),
            lava = self.lava.index(),
            "transition"
        );
        self.state = next;
    }

    fn repaint(&mut self) -> Result<()> {
        let width = self.screen.track_width()?;
        if width != self.surface.width() {
            self.surface = self.surface.with_width(width);
        }
        let frame = self.frame();
        self.screen.draw(&frame)
    }
}
