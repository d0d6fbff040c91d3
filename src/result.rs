//! Reading answers out of a finished run.

use crate::graph::{FloatType, Pairwise, Spins, TrotterSpins};
use crate::system::{
    ChimeraClassicalGpu, ChimeraTransverseGpu, ClassicalIsing, ClassicalIsingPolynomial,
    ContinuousTimeIsing, TransverseIsing,
};

/// A classical configuration representing the current state of a system.
pub trait Solution {
    /// The configuration. Quantum systems report their best classical slice.
    fn get_solution(&self) -> Spins;
}

impl<G: Pairwise> Solution for ClassicalIsing<'_, G> {
    fn get_solution(&self) -> Spins {
        self.spins().to_vec()
    }
}

/// Values in the vartype of the polynomial, so `{0, 1}` for binary problems.
impl<F: FloatType> Solution for ClassicalIsingPolynomial<'_, F> {
    fn get_solution(&self) -> Spins {
        self.values().to_vec()
    }
}

impl<G: Pairwise> Solution for TransverseIsing<'_, G> {
    fn get_solution(&self) -> Spins {
        self.lowest_energy_slice()
    }
}

/// The `tau = 0` slice with the auxiliary spin divided out.
impl<F: FloatType> Solution for ContinuousTimeIsing<F> {
    fn get_solution(&self) -> Spins {
        self.spins_at(0.0)
    }
}

impl<F: FloatType, const R: usize, const C: usize> Solution for ChimeraClassicalGpu<'_, F, R, C> {
    fn get_solution(&self) -> Spins {
        self.spins()
    }
}

impl<F: FloatType, const R: usize, const C: usize, const T: usize> Solution
    for ChimeraTransverseGpu<'_, F, R, C, T>
{
    fn get_solution(&self) -> Spins {
        let slices = self.trotter_spins();
        let energies = self.classical_energies();
        lowest(slices, &energies)
    }
}

fn lowest(slices: TrotterSpins, energies: &[f64]) -> Spins {
    let best = energies
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(t, _)| t);
    slices.into_iter().nth(best).unwrap_or_default()
}
