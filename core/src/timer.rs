use serde::{Deserialize, Serialize};

/// Highest elapsed time the counter reaches, in seconds.
pub const MAX_ELAPSED_SECS: u16 = 999;

/// A periodic one-second task, implemented by whatever event loop hosts the game.
///
/// After `start` the host delivers a tick roughly every second until `stop` is called. `stop` must cancel the
/// underlying task, not just mute it.
pub trait Ticker {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Ticker without a scheduler behind it, the host calls `Session::on_tick` itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualTicker {
    running: bool,
    starts: u32,
    stops: u32,
}

impl ManualTicker {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn stops(&self) -> u32 {
        self.stops
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self) {
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
        self.stops += 1;
    }
}

/// Elapsed seconds of a game together with the ticker feeding it.
#[derive(Clone, Debug, PartialEq)]
pub struct GameClock<T> {
    ticker: T,
    secs: u16,
    running: bool,
}

impl<T: Ticker> GameClock<T> {
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            secs: 0,
            running: false,
        }
    }

    pub fn elapsed_secs(&self) -> u16 {
        self.secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("clock started at {}s", self.secs);
            self.running = true;
            self.ticker.start();
        }
    }

    /// Cancels the ticker and freezes the counter.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("clock stopped at {}s", self.secs);
            self.running = false;
            self.ticker.stop();
        }
    }

    pub fn reset(&mut self) {
        self.stop();
        self.secs = 0;
    }

    /// Advances one second while running, ticks delivered after `stop` are ignored.
    pub fn tick(&mut self) -> u16 {
        if self.running {
            self.secs = self.secs.saturating_add(1).min(MAX_ELAPSED_SECS);
        }
        self.secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_while_running() {
        let mut clock = GameClock::new(ManualTicker::default());

        assert_eq!(clock.tick(), 0);
        clock.start();
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 2);
        clock.stop();
        assert_eq!(clock.tick(), 2);
        assert!(!clock.ticker().is_running());
    }

    #[test]
    fn caps_at_999() {
        let mut clock = GameClock::new(ManualTicker::default());

        clock.start();
        for _ in 0..1200 {
            clock.tick();
        }

        assert_eq!(clock.elapsed_secs(), MAX_ELAPSED_SECS);
    }

    #[test]
    fn start_and_stop_reach_ticker_once() {
        let mut clock = GameClock::new(ManualTicker::default());

        clock.start();
        clock.start();
        clock.stop();
        clock.stop();
        clock.reset();

        assert_eq!(clock.ticker().starts(), 1);
        assert_eq!(clock.ticker().stops(), 1);
        assert_eq!(clock.elapsed_secs(), 0);
    }
}
