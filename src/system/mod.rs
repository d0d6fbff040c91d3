//! System states: a spin configuration bound to a graph, plus caches derived from it.
//!
//! Every system exposes its kind, which fixes the control parameter its updaters
//! receive from the schedule.

use crate::utility::schedule::{ClassicalUpdaterParameter, TransverseFieldUpdaterParameter};
use std::fmt::Debug;

/// Single flip moves on a shared pairwise graph.
pub mod classical_ising;
/// Higher order interactions with cached term products.
pub mod classical_ising_polynomial;
/// Chimera lattices stored on a device.
pub mod chimera_gpu;
/// Transverse field ising model in continuous imaginary time.
pub mod continuous_time_ising;
/// Transverse field ising model with discrete trotter slices.
pub mod transverse_ising;

pub use chimera_gpu::{ChimeraClassicalGpu, ChimeraTransverseGpu};
pub use classical_ising::ClassicalIsing;
pub use classical_ising_polynomial::{ClassicalIsingPolynomial, TermCache};
pub use continuous_time_ising::{ContinuousTimeIsing, CutPoint};
pub use transverse_ising::TransverseIsing;

/// The family a system belongs to.
pub trait SystemKind {
    /// Control parameter for one updater call.
    type Parameter: Copy + Debug;
}

/// Systems driven by temperature alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classical {}

impl SystemKind for Classical {
    type Parameter = ClassicalUpdaterParameter;
}

/// Systems driven by temperature and a transverse field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransverseField {}

impl SystemKind for TransverseField {
    type Parameter = TransverseFieldUpdaterParameter;
}

/// A mutable Monte Carlo state.
pub trait System {
    /// Family of the system.
    type Kind: SystemKind;

    /// Number of logical sites, excluding any auxiliary spins.
    fn num_spins(&self) -> usize;
}

/// Control parameter type of a system.
pub type ParameterOf<S> = <<S as System>::Kind as SystemKind>::Parameter;
