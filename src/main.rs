use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent},
    tty::IsTty,
};
use lavatype::{
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, GameConfig},
    input,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    session::{Finished, Session},
    text::DEFAULT_TEXT,
    ui::TerminalScreen,
    GameError, GameResult,
};
use std::{
    fs,
    io::stdin,
    path::{Path, PathBuf},
    process::ExitCode,
};

/// run from the lava: type the text before the floor crumbles under you
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing game for the terminal. Every correct key moves you one step forward, while the floor behind you keeps crumbling into the lava. Type the whole text before the lava catches up."
)]
pub struct Cli {
    /// path to a text file to play instead of the built-in text
    #[clap(short = 't', long = "text")]
    path: Option<PathBuf>,

    /// lava speed in character cells per second
    #[clap(short = 's', long)]
    speed: Option<f64>,

    /// lava clock period in milliseconds
    #[clap(long)]
    tick_ms: Option<u64>,

    /// cells between the lava and the first character when the game starts
    #[clap(long)]
    head_start: Option<u16>,

    /// cells the lava jumps forward on every wrong key (0 disables)
    #[clap(long)]
    wrong_key_penalty: Option<u16>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// CLI flags win over the stored config
    fn merge_config(&self, base: GameConfig) -> GameConfig {
        GameConfig {
            tick_interval_ms: self.tick_ms.unwrap_or(base.tick_interval_ms),
            lava_speed: self.speed.unwrap_or(base.lava_speed),
            head_start: self.head_start.unwrap_or(base.head_start),
            wrong_key_penalty: self.wrong_key_penalty.unwrap_or(base.wrong_key_penalty),
        }
        .validated()
    }
}

fn load_text(path: Option<&Path>) -> Result<String, GameError> {
    match path {
        None => Ok(DEFAULT_TEXT.to_string()),
        Some(path) => fs::read_to_string(path).map_err(|err| {
            GameError::invalid_input(format!("cannot open file {}: {}", path.display(), err))
        }),
    }
}

const FATAL_EXIT: u8 = 2;

fn exit_status(result: GameResult) -> u8 {
    match result {
        GameResult::Won { .. } | GameResult::Quit => 0,
        GameResult::Lost => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = AppDirs::log_dir().and_then(|dir| logging::init(&dir));

    match run(&cli, &FileConfigStore::new()) {
        Ok(result) => ExitCode::from(exit_status(result)),
        Err(err) => {
            tracing::error!(%err, "session aborted");
            eprintln!("lavatype: {err}");
            ExitCode::from(FATAL_EXIT)
        }
    }
}

fn run(cli: &Cli, store: &FileConfigStore) -> Result<GameResult, GameError> {
    let config = cli.merge_config(store.load());
    if cli.save_config {
        store.save(&config).map_err(|source| GameError::ConfigSave {
            path: store.path().to_path_buf(),
            source,
        })?;
        tracing::info!(path = %store.path().display(), "config saved");
    }

    let raw = load_text(cli.path.as_deref())?;
    play(&raw, &config)
}

fn play(raw: &str, config: &GameConfig) -> Result<GameResult, GameError> {
    let mut session = Session::start(raw, config, TerminalScreen::acquire)?;
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_interval()),
    );

    session.screen_mut().draw_intro()?;
    match runner.event_source().wait_key() {
        Some(key) if input::control_signal(&key).is_none() => {}
        _ => return Ok(GameResult::Quit),
    }

    let Finished { result, screen } = session.play(&mut runner)?;
    if result != GameResult::Quit {
        // keep the final frame up until the player dismisses it
        while let Some(key) = runner.event_source().wait_key() {
            if is_dismiss_key(&key) {
                break;
            }
        }
    }
    drop(screen);

    Ok(result)
}

fn is_dismiss_key(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || input::control_signal(key).is_some()
}
