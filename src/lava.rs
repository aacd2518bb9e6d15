use std::time::Duration;

/// The lava chasing the player. Moves on the clock, never on input.
#[derive(Clone, Debug, PartialEq)]
pub struct LavaTracker {
    position: f64,
    speed: f64,
    head_start: f64,
    ticks: u64,
}

impl LavaTracker {
    /// `speed` is in character cells per second, `head_start` is how many cells
    /// behind the first character the lava starts.
    pub fn new(speed: f64, head_start: u16) -> Self {
        Self {
            position: 0.0,
            speed,
            head_start: f64::from(head_start),
            ticks: 0,
        }
    }

    pub fn tick(&mut self, delta: Duration) {
        self.position += self.speed * delta.as_secs_f64();
        self.ticks += 1;
    }

    pub fn surge(&mut self, cells: u16) {
        self.position += f64::from(cells);
    }

    /// Distance travelled since the start of the session.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Lava front in the same index space as the text cursor. Negative while
    /// the lava is still behind the first character.
    pub fn index(&self) -> i64 {
        // small epsilon so 0.25 * 4 ticks lands on 1.0 and not 0.999..
        (self.position - self.head_start + 1e-9).floor() as i64
    }

    pub fn has_caught(&self, cursor: usize) -> bool {
        self.index() >= cursor as i64
    }
}
