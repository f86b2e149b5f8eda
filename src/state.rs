//! Race state (the DP key) and the per-state decision the solver stores.

use crate::compound::{Compound, CompoundSet};
use std::fmt;

/// Immutable snapshot of a car's tyre situation. Transitions return a new
/// state; nothing mutates a state in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RaceState {
    pub compound: Compound,
    pub tyre_age: u32,
    pub laps_remaining: u32,
    pub usage: CompoundSet,
}

impl RaceState {
    pub fn new(compound: Compound, tyre_age: u32, laps_remaining: u32, usage: CompoundSet) -> Self {
        Self {
            compound,
            tyre_age,
            laps_remaining,
            usage,
        }
    }

    /// Race start on a fresh set of `compound`.
    pub fn start(compound: Compound, laps: u32) -> Self {
        Self::new(compound, 0, laps, CompoundSet::single(compound))
    }

    pub fn is_finished(&self) -> bool {
        self.laps_remaining == 0
    }

    /// Run one more lap on the current tyres.
    pub fn stay_out(self) -> Self {
        Self {
            tyre_age: self.tyre_age + 1,
            laps_remaining: self.laps_remaining.saturating_sub(1),
            ..self
        }
    }

    /// Pit for a fresh set of `dest` and run the out-lap on it.
    pub fn pit(self, dest: Compound) -> Self {
        Self {
            compound: dest,
            tyre_age: 1,
            laps_remaining: self.laps_remaining.saturating_sub(1),
            usage: self.usage.with(dest),
        }
    }

    pub fn apply(self, action: Action) -> Self {
        match action {
            Action::StayOut => self.stay_out(),
            Action::Pit(dest) => self.pit(dest),
        }
    }
}

impl fmt::Display for RaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} age {} ({} to go, used {})",
            self.compound, self.tyre_age, self.laps_remaining, self.usage
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    StayOut,
    Pit(Compound),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::StayOut => f.write_str("stay out"),
            Action::Pit(dest) => write!(f, "pit for {dest}"),
        }
    }
}

/// Best time from a state to the flag and the action that achieves it.
/// `total_time` is `f64::INFINITY` when no completion satisfies the
/// two-compound rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub total_time: f64,
    pub action: Action,
}

impl Decision {
    pub fn infeasible() -> Self {
        Self {
            total_time: f64::INFINITY,
            action: Action::StayOut,
        }
    }

    pub fn pit_target(&self) -> Option<Compound> {
        match self.action {
            Action::StayOut => None,
            Action::Pit(dest) => Some(dest),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.total_time.is_finite()
    }
}
