// Pre-session countdown: pure tick bookkeeping plus a cancellable tokio ticker

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default countdown length in ticks (one tick per second)
pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;

/// What a single tick did to the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still counting; ticks left before the gate opens
    Remaining(u32),
    /// This tick was the last one
    Finished,
    /// Countdown was already over, tick ignored
    Expired,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    total: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    pub fn tick(&mut self) -> CountdownStep {
        if self.remaining == 0 {
            return CountdownStep::Expired;
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            CountdownStep::Finished
        } else {
            CountdownStep::Remaining(self.remaining)
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

// ==============================================================================
// Countdown Timer
// ==============================================================================

/// Background task delivering `ticks` events, one per `period`, into an event channel.
///
/// Holds only a weak sender so a running countdown never keeps the event loop alive.
/// Aborted on `cancel()` or drop.
pub struct CountdownTimer {
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    pub fn spawn<E, F>(ticks: u32, period: Duration, tx: &mpsc::Sender<E>, make_event: F) -> Self
    where
        E: Send + 'static,
        F: Fn() -> E + Send + 'static,
    {
        let weak_tx = tx.downgrade();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for _ in 0..ticks {
                interval.tick().await;

                let Some(tx) = weak_tx.upgrade() else {
                    break;
                };
                if tx.send(make_event()).await.is_err() {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finishes_exactly_on_last_tick() {
        let mut countdown = Countdown::new(5);
        let steps: Vec<CountdownStep> = (0..7).map(|_| countdown.tick()).collect();

        assert_eq!(
            steps,
            vec![
                CountdownStep::Remaining(4),
                CountdownStep::Remaining(3),
                CountdownStep::Remaining(2),
                CountdownStep::Remaining(1),
                CountdownStep::Finished,
                CountdownStep::Expired,
                CountdownStep::Expired,
            ]
        );
        assert!(countdown.is_finished());
        assert_eq!(countdown.total(), 5);
    }

    #[test]
    fn test_single_tick_countdown() {
        let mut countdown = Countdown::new(1);
        assert_eq!(countdown.remaining(), 1);
        assert_eq!(countdown.tick(), CountdownStep::Finished);
    }

    #[test]
    fn test_zero_countdown_is_already_over() {
        let mut countdown = Countdown::new(0);
        assert!(countdown.is_finished());
        assert_eq!(countdown.tick(), CountdownStep::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_delivers_one_event_per_period() {
        let (tx, mut rx) = mpsc::channel::<u32>(16);
        let _timer = CountdownTimer::spawn(3, Duration::from_secs(1), &tx, || 7);

        let start = Instant::now();
        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(7));
        }
        assert_eq!(start.elapsed(), Duration::from_secs(3));

        // No fourth tick
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_stays_silent() {
        let (tx, mut rx) = mpsc::channel::<u32>(16);
        let timer = CountdownTimer::spawn(5, Duration::from_secs(1), &tx, || 1);

        assert_eq!(rx.recv().await, Some(1));
        timer.cancel();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }
}
