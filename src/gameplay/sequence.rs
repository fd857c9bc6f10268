//! Timed step queue: the cooperative "wait, then do" sequences of an actor.
//!
//! Each actor owns a [`Sequences`] component. Steps are scheduled with a
//! delay, advanced with the frame delta, and handed back once due. Pending
//! work is cancelled explicitly, usually from a state's exit hook.

use std::time::Duration;

use bevy::prelude::*;

#[derive(Debug, Clone)]
struct Pending<T> {
    timer: Timer,
    step: T,
}

/// Per-actor queue of delayed steps.
#[derive(Component, Debug, Clone)]
pub struct Sequences<T: Send + Sync + 'static> {
    pending: Vec<Pending<T>>,
}

impl<T: Send + Sync + 'static> Default for Sequences<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T: Send + Sync + 'static> Sequences<T> {
    /// Run `step` once `delay_secs` have elapsed.
    pub fn schedule(&mut self, delay_secs: f32, step: T) {
        self.pending.push(Pending {
            timer: Timer::from_seconds(delay_secs.max(0.0), TimerMode::Once),
            step,
        });
    }

    /// Drop every pending step matching `predicate`.
    pub fn cancel(&mut self, mut predicate: impl FnMut(&T) -> bool) {
        self.pending.retain(|p| !predicate(&p.step));
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_pending(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        self.pending.iter().any(|p| predicate(&p.step))
    }

    #[cfg(test)]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance every timer by `delta` and return the steps that came due,
    /// in the order they were scheduled.
    pub fn advance(&mut self, delta: Duration) -> Vec<T> {
        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for mut pending in self.pending.drain(..) {
            pending.timer.tick(delta);
            if pending.timer.just_finished() {
                due.push(pending.step);
            } else {
                waiting.push(pending);
            }
        }
        self.pending = waiting;
        due
    }
}
