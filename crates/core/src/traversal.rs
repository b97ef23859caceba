//! Step-by-step walk of a planned route.
//! This module exists so avatar movement is an explicit suspend/resume state machine.
//! It does not sleep or own timing; the caller waits [`Pace::delay_for`] between steps.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::route::Route;
use crate::types::*;

/// Shared flag that stops a traversal at the next step boundary. Clones share
/// the same flag, so it can be raised from a signal handler.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Walking,
    Arrived,
    Cancelled,
}

#[derive(Debug)]
pub struct Traversal {
    route: Route,
    cursor: usize,
    active_floor: usize,
    phase: Phase,
    cancel: CancelToken,
}

impl Traversal {
    /// Begins a walk and emits the step for the first position. `active_floor`
    /// is the floor currently shown, if any.
    pub fn start(
        positions: Vec<Position>,
        active_floor: Option<usize>,
    ) -> Result<(Self, Step), NavError> {
        let route = Route::new(positions)?;
        let first = route.first();
        let floor_switch = (active_floor != Some(first.floor))
            .then_some(FloorSwitch { from: active_floor, to: first.floor });
        let phase = if route.len() == 1 { Phase::Arrived } else { Phase::Walking };
        let traversal =
            Self { route, cursor: 0, active_floor: first.floor, phase, cancel: CancelToken::new() };
        let step = traversal.current_step(floor_switch);
        Ok((traversal, step))
    }

    pub fn advance(&mut self) -> StepResult {
        match self.phase {
            Phase::Arrived => return StepResult::Halted(HaltReason::Arrived),
            Phase::Cancelled => return StepResult::Halted(HaltReason::Cancelled),
            Phase::Walking => {}
        }
        if self.cancel.is_raised() {
            self.phase = Phase::Cancelled;
            log::info!("traversal cancelled at step {} of {}", self.cursor, self.route.len());
            return StepResult::Halted(HaltReason::Cancelled);
        }

        self.cursor += 1;
        let position = self.route.positions()[self.cursor];
        let floor_switch = (position.floor != self.active_floor)
            .then_some(FloorSwitch { from: Some(self.active_floor), to: position.floor });
        self.active_floor = position.floor;
        if self.cursor + 1 == self.route.len() {
            self.phase = Phase::Arrived;
        }
        StepResult::Stepped(self.current_step(floor_switch))
    }

    /// Raises the cancel flag and halts the walk before its next move.
    /// Returns false if the walk had already arrived or been cancelled.
    pub fn cancel(&mut self) -> bool {
        self.cancel.raise();
        if self.phase != Phase::Walking {
            return false;
        }
        self.phase = Phase::Cancelled;
        true
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn position(&self) -> Position {
        self.route.positions()[self.cursor]
    }

    /// Positions still ahead of the avatar; empty as soon as the cancel flag
    /// is up, even before the next `advance`.
    pub fn remaining(&self) -> &[Position] {
        match self.phase {
            Phase::Cancelled => &[],
            Phase::Walking if self.cancel.is_raised() => &[],
            Phase::Walking | Phase::Arrived => &self.route.positions()[self.cursor + 1..],
        }
    }

    pub fn is_walking(&self) -> bool {
        self.phase == Phase::Walking && !self.cancel.is_raised()
    }

    fn current_step(&self, floor_switch: Option<FloorSwitch>) -> Step {
        Step {
            position: self.position(),
            floor_switch,
            remaining: self.remaining().to_vec(),
            arrived: self.phase == Phase::Arrived,
        }
    }
}

/// Maps a speed setting to the wait between steps. Faster settings shorten
/// the wait, never below `min_delay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pace {
    pub base_delay: Duration,
    pub per_speed: Duration,
    pub min_delay: Duration,
}

impl Default for Pace {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(700),
            per_speed: Duration::from_millis(100),
            min_delay: Duration::from_millis(120),
        }
    }
}

impl Pace {
    pub fn delay_for(&self, speed: u32) -> Duration {
        self.base_delay.saturating_sub(self.per_speed.saturating_mul(speed)).max(self.min_delay)
    }
}
