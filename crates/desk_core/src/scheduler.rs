use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Fixed-interval source of dispatch ticks.
#[async_trait]
pub trait TickSource: Send {
    /// Resolves when the next tick is due.
    async fn next_tick(&mut self);
}

/// Tick source backed by a tokio interval. A late tick pushes the schedule
/// back instead of bursting to catch up.
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_on_a_fixed_period() {
        let mut ticks = IntervalTicks::new(Duration::from_millis(200));
        let start = Instant::now();

        // The first tick is immediate.
        ticks.next_tick().await;
        ticks.next_tick().await;
        ticks.next_tick().await;

        assert_eq!(start.elapsed(), Duration::from_millis(400));
        assert_eq!(ticks.period(), Duration::from_millis(200));
    }
}
