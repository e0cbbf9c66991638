//! Displayed price ramp.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::prelude::*;

pub const DEFAULT_TICK: StdDuration = StdDuration::from_millis(20);

/// The ramp reaches the target in at most this many ticks.
const N_STEPS: f64 = 50.0;

/// Discrete stepper from zero towards the target, yielding the displayed value per tick.
///
/// The last yielded value is always exactly the target.
#[derive(Debug, Clone)]
pub struct Ramp {
    target: f64,
    step: f64,
    current: f64,
    is_finished: bool,
}

impl Ramp {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            step: (target / N_STEPS).ceil(),
            current: 0.0,
            is_finished: false,
        }
    }
}

impl Iterator for Ramp {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished {
            return None;
        }
        self.current += self.step;
        if self.current >= self.target || self.current.is_nan() {
            self.is_finished = true;
            Some(self.target)
        } else {
            Some(self.current)
        }
    }
}

/// Runs a [`Ramp`] on a timer. Dropping the animator cancels it.
pub struct Animator {
    receiver: watch::Receiver<f64>,
    task: JoinHandle<()>,
}

impl Animator {
    pub fn start(target: f64, tick: StdDuration) -> Self {
        let (sender, receiver) = watch::channel(0.0);
        let task = tokio::spawn(async move {
            let mut interval = interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            for value in Ramp::new(target) {
                interval.tick().await;
                if sender.send(value).is_err() {
                    break;
                }
            }
            trace!(target_price = target, "animation finished");
        });
        Self { receiver, task }
    }

    pub fn displayed(&self) -> f64 {
        *self.receiver.borrow()
    }

    /// Receives every displayed value, the channel closes once the ramp is over.
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.receiver.clone()
    }

    /// Stops the ramp at the currently displayed value.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.task.abort();
    }
}
