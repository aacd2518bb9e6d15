// Library surface for the binary, headless/integration tests and reuse.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod lava;
pub mod logging;
pub mod render;
pub mod runtime;
pub mod session;
pub mod text;
pub mod ui;

pub use error::{GameError, Result};
pub use game::{GameLoop, GameResult, GameState};
