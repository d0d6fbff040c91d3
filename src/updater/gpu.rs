use crate::graph::FloatType;
use crate::system::{ChimeraClassicalGpu, ChimeraTransverseGpu};
use crate::updater::Updater;
use crate::utility::schedule::{ClassicalUpdaterParameter, TransverseFieldUpdaterParameter};
use rand::Rng;

/// Checkerboard Metropolis sweeps on device resident chimera lattices.
///
/// Random numbers are drawn on the device from the stream seeded when the system was
/// built, so the host engine is not consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gpu;

impl<F: FloatType, const R: usize, const C: usize> Updater<ChimeraClassicalGpu<'_, F, R, C>>
    for Gpu
{
    fn update<G: Rng + ?Sized>(
        &mut self,
        system: &mut ChimeraClassicalGpu<'_, F, R, C>,
        _rng: &mut G,
        parameter: &ClassicalUpdaterParameter,
    ) {
        system.sweep(parameter.beta);
    }
}

impl<F: FloatType, const R: usize, const C: usize, const T: usize>
    Updater<ChimeraTransverseGpu<'_, F, R, C, T>> for Gpu
{
    fn update<G: Rng + ?Sized>(
        &mut self,
        system: &mut ChimeraTransverseGpu<'_, F, R, C, T>,
        _rng: &mut G,
        parameter: &TransverseFieldUpdaterParameter,
    ) {
        system.sweep(parameter.beta, parameter.s);
    }
}
