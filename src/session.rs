use crate::{
    config::GameConfig,
    error::Result,
    game::{GameLoop, GameResult},
    runtime::{EventSource, Runner, Ticker},
    text::{TargetText, TextBuffer},
    ui::Screen,
};

/// What a finished session hands back: the result and the screen, which stays
/// acquired until the caller drops it.
pub struct Finished<D: Screen> {
    pub result: GameResult,
    pub screen: D,
}

/// One game from text validation to the final frame.
pub struct Session<D: Screen> {
    game: GameLoop<D>,
}

impl<D: Screen> std::fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl<D: Screen> Session<D> {
    /// Validates the text first; the screen is only acquired once the text
    /// is known to be playable.
    pub fn start<F>(raw_text: &str, config: &GameConfig, acquire: F) -> Result<Self>
    where
        F: FnOnce() -> Result<D>,
    {
        let text = TargetText::from_source(raw_text)?;
        let screen = acquire()?;
        Ok(Self {
            game: GameLoop::new(TextBuffer::new(text), config, screen),
        })
    }

    pub fn game(&self) -> &GameLoop<D> {
        &self.game
    }

    pub fn screen_mut(&mut self) -> &mut D {
        self.game.screen_mut()
    }

    /// Runs the loop to completion. On error the screen is dropped, and with
    /// it released, before the error reaches the caller.
    pub fn play<E: EventSource, T: Ticker>(
        mut self,
        runner: &mut Runner<E, T>,
    ) -> Result<Finished<D>> {
        let result = self.game.run(runner)?;
        Ok(Finished {
            result,
            screen: self.game.into_screen(),
        })
    }
}
