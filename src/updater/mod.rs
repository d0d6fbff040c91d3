//! Monte Carlo moves.
//!
//! An updater advances a system by one step at a given control parameter. Updaters are
//! resolved statically for each (updater, system) pair.

use crate::system::{ParameterOf, System};
use crate::utility::fmath;
use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Cluster moves in continuous imaginary time.
pub mod continuous_time_swendsen_wang;
/// Checkerboard sweeps on a device.
pub mod gpu;
/// Multi variable moves for binary polynomial problems.
pub mod k_local;
/// Metropolis single flips.
pub mod single_spin_flip;
/// Cluster moves for classical pairwise systems.
pub mod swendsen_wang;

pub use continuous_time_swendsen_wang::ContinuousTimeSwendsenWang;
pub use gpu::Gpu;
pub use k_local::KLocal;
pub use single_spin_flip::SingleSpinFlip;
pub use swendsen_wang::SwendsenWang;

/// A Monte Carlo move for systems of type `S`.
pub trait Updater<S: System> {
    /// Advance `system` by one step at `parameter`.
    fn update<R: Rng + ?Sized>(&mut self, system: &mut S, rng: &mut R, parameter: &ParameterOf<S>);
}

/// Order in which single site moves visit the sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum UpdateMethod {
    /// Increasing index.
    Sequential,
    /// A fresh random permutation every sweep.
    Random,
}

impl Default for UpdateMethod {
    fn default() -> Self {
        UpdateMethod::Sequential
    }
}

impl UpdateMethod {
    /// Fill `order` with the visiting order of `n` sites.
    pub(crate) fn visit_order<R: Rng + ?Sized>(
        self,
        n: usize,
        order: &mut Vec<usize>,
        rng: &mut R,
    ) {
        order.clear();
        order.extend(0..n);
        if self == UpdateMethod::Random {
            order.shuffle(rng);
        }
    }
}

/// Accept a move changing the energy by `de` at inverse temperature `beta`.
///
/// Downhill moves are always taken. Degenerate exponents saturate instead of failing:
/// an infinite gain accepts, an infinite cost rejects and `NaN` rejects.
#[inline]
pub fn metropolis_accept<R: Rng + ?Sized>(rng: &mut R, beta: f64, de: f64) -> bool {
    if de <= 0.0 {
        return true;
    }
    accept_action(rng, beta * de)
}

/// Accept with probability `min(1, e^{-ds})`.
#[inline]
pub(crate) fn accept_action<R: Rng + ?Sized>(rng: &mut R, ds: f64) -> bool {
    if ds <= 0.0 {
        true
    } else if ds.is_nan() {
        false
    } else {
        rng.gen::<f64>() < fmath::exp(-ds)
    }
}
