use gloo::timers::callback::Interval;
use sweeper_core::Ticker;
use yew::Callback;

const TICK_MILLIS: u32 = 1000;

/// Emits `on_tick` once per second through a browser interval while started.
pub(crate) struct IntervalTicker {
    on_tick: Callback<()>,
    interval: Option<Interval>,
}

impl IntervalTicker {
    pub(crate) fn new(on_tick: Callback<()>) -> Self {
        Self {
            on_tick,
            interval: None,
        }
    }
}

impl Ticker for IntervalTicker {
    fn start(&mut self) {
        let on_tick = self.on_tick.clone();
        let previous = self
            .interval
            .replace(Interval::new(TICK_MILLIS, move || on_tick.emit(())));
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    fn stop(&mut self) {
        if let Some(interval) = self.interval.take() {
            interval.cancel();
        }
    }
}
