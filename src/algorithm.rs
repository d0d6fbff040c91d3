//! The annealing loop.
//!
//! A schedule is a list of `(parameter, one_mc_step)` entries. Each entry applies its
//! updater `one_mc_step` times at a fixed parameter before moving on.

use crate::system::{ParameterOf, System};
use crate::updater::Updater;
use crate::utility::schedule::ScheduleEntry;
use rand::Rng;
use tracing::{debug, trace};

/// Drives an updater over a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Algorithm;

impl Algorithm {
    /// Run `schedule`, calling `callback` with the system and parameter after every update.
    pub fn run<S, U, R, C>(
        updater: &mut U,
        system: &mut S,
        rng: &mut R,
        schedule: &[ScheduleEntry<ParameterOf<S>>],
        mut callback: C,
    ) where
        S: System,
        U: Updater<S>,
        R: Rng + ?Sized,
        C: FnMut(&S, &ParameterOf<S>),
    {
        let total = schedule.iter().map(|e| e.one_mc_step).sum::<usize>();
        debug!(
            entries = schedule.len(),
            updates = total,
            spins = system.num_spins(),
            "annealing started"
        );
        for (k, entry) in schedule.iter().enumerate() {
            trace!(entry = k, parameter = ?entry.updater_parameter, steps = entry.one_mc_step);
            for _ in 0..entry.one_mc_step {
                updater.update(system, rng, &entry.updater_parameter);
                callback(system, &entry.updater_parameter);
            }
        }
        debug!(updates = total, "annealing finished");
    }

    /// Run `schedule` without observing intermediate states.
    pub fn run_silent<S, U, R>(
        updater: &mut U,
        system: &mut S,
        rng: &mut R,
        schedule: &[ScheduleEntry<ParameterOf<S>>],
    ) where
        S: System,
        U: Updater<S>,
        R: Rng + ?Sized,
    {
        Self::run(updater, system, rng, schedule, |_, _| {})
    }

    /// Run `schedule` and fold `state_fold` over every `sampling_freq`-th state (every
    /// state by default). Returns the accumulator and the number of samples taken.
    pub fn run_measure<S, U, R, T, F>(
        updater: &mut U,
        system: &mut S,
        rng: &mut R,
        schedule: &[ScheduleEntry<ParameterOf<S>>],
        init_t: T,
        mut state_fold: F,
        sampling_freq: Option<usize>,
    ) -> (T, usize)
    where
        S: System,
        U: Updater<S>,
        R: Rng + ?Sized,
        F: FnMut(T, &S, &ParameterOf<S>) -> T,
    {
        let sampling_freq = sampling_freq.unwrap_or(1).max(1);
        let mut acc = init_t;
        let mut steps = 0;
        let mut measured = 0;
        debug!(
            entries = schedule.len(),
            spins = system.num_spins(),
            sampling_freq,
            "measured annealing started"
        );
        for (k, entry) in schedule.iter().enumerate() {
            trace!(entry = k, parameter = ?entry.updater_parameter, steps = entry.one_mc_step);
            for _ in 0..entry.one_mc_step {
                updater.update(system, rng, &entry.updater_parameter);
                steps += 1;
                // Sample every `sampling_freq`, ignoring the initial state.
                if steps % sampling_freq == 0 {
                    acc = state_fold(acc, system, &entry.updater_parameter);
                    measured += 1;
                }
            }
        }
        debug!(
            updates = steps,
            samples = measured,
            "measured annealing finished"
        );
        (acc, measured)
    }
}
