use crate::error::{check_size, Error, Result};
use crate::graph::{FloatType, Index, Pairwise, Spin, Spins, TrotterSpins, Vartype};
use crate::system::{System, TransverseField};
use rand::Rng;

/// Transverse field ising model mapped onto `M` coupled classical replicas.
///
/// The coupling between neighboring slices depends on `beta`, `s` and `M`. It is
/// recomputed from those arguments on every call and never stored.
#[derive(Debug, Clone)]
pub struct TransverseIsing<'g, G: Pairwise> {
    graph: &'g G,
    trotter_spins: TrotterSpins,
    gamma: f64,
}

impl<'g, G: Pairwise> TransverseIsing<'g, G> {
    /// Bind explicit slices to `graph`. Needs at least two slices.
    pub fn new(graph: &'g G, trotter_spins: TrotterSpins, gamma: f64) -> Result<Self> {
        if trotter_spins.len() < 2 {
            return Err(Error::InvalidParameter(format!(
                "need at least 2 trotter slices, got {}",
                trotter_spins.len()
            )));
        }
        check_gamma(gamma)?;
        trotter_spins.iter().try_for_each(|slice| {
            check_size(graph.size(), slice.len())?;
            Vartype::Spin.check(slice)
        })?;
        Ok(Self {
            graph,
            trotter_spins,
            gamma,
        })
    }

    /// Replicate a classical configuration into `num_trotter_slices` slices.
    pub fn from_classical(
        graph: &'g G,
        spins: &[Spin],
        gamma: f64,
        num_trotter_slices: usize,
    ) -> Result<Self> {
        Self::new(graph, vec![spins.to_vec(); num_trotter_slices], gamma)
    }

    /// Independent random slices.
    pub fn random<R: Rng + ?Sized>(
        graph: &'g G,
        gamma: f64,
        num_trotter_slices: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let slices = (0..num_trotter_slices)
            .map(|_| graph.gen_spin(rng))
            .collect();
        Self::new(graph, slices, gamma)
    }

    /// The graph.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// Strength of the transverse field.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Change the transverse field.
    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        check_gamma(gamma)?;
        self.gamma = gamma;
        Ok(())
    }

    /// Number of slices `M`.
    pub fn num_trotter_slices(&self) -> usize {
        self.trotter_spins.len()
    }

    /// All slices.
    pub fn trotter_spins(&self) -> &TrotterSpins {
        &self.trotter_spins
    }

    /// One slice.
    pub fn slice(&self, t: usize) -> &[Spin] {
        &self.trotter_spins[t]
    }

    /// `-1/2 ln tanh(beta Gamma (1 - s) / M)`.
    ///
    /// Infinite when the field vanishes, which pins all slices together.
    pub fn trotter_coupling(&self, beta: f64, s: f64) -> f64 {
        -0.5 * self.log_tanh(beta, s)
    }

    /// `ln tanh(beta Gamma (1 - s) / M)`, the slice term shared by energies and updates.
    #[inline]
    pub(crate) fn log_tanh(&self, beta: f64, s: f64) -> f64 {
        let m = self.trotter_spins.len() as f64;
        (beta * self.gamma * (1.0 - s) / m).tanh().ln()
    }

    /// Classical energy of every slice.
    pub fn classical_energies(&self) -> Vec<f64> {
        self.trotter_spins
            .iter()
            .map(|slice| self.graph.calc_energy(slice).as_f64())
            .collect()
    }

    /// Effective energy `(s/M) sum_t E(t) - (J_tau/beta) sum_t sum_i s_i^t s_i^{t+1}`.
    pub fn energy(&self, beta: f64, s: f64) -> f64 {
        let m = self.trotter_spins.len();
        let classical = self.classical_energies().into_iter().sum::<f64>() * s / m as f64;
        let aligned = (0..m)
            .map(|t| {
                let up = &self.trotter_spins[(t + 1) % m];
                self.trotter_spins[t]
                    .iter()
                    .zip(up.iter())
                    .map(|(a, b)| a * b)
                    .sum::<i32>()
            })
            .sum::<i32>();
        if aligned == 0 {
            return classical;
        }
        classical - self.trotter_coupling(beta, s) / beta * f64::from(aligned)
    }

    /// Classical energy change of flipping site `i` in slice `t`.
    #[inline]
    pub fn de_classical(&self, t: usize, i: Index) -> f64 {
        let slice = &self.trotter_spins[t];
        -2.0 * f64::from(slice[i]) * self.graph.local_field(i, slice).as_f64()
    }

    /// Sum of the spins at site `i` in the slices before and after `t`.
    #[inline]
    pub fn trotter_neighbors_sum(&self, t: usize, i: Index) -> i32 {
        let m = self.trotter_spins.len();
        self.trotter_spins[(t + 1) % m][i] + self.trotter_spins[(t + m - 1) % m][i]
    }

    /// Flip site `i` in slice `t`.
    #[inline]
    pub fn flip(&mut self, t: usize, i: Index) {
        self.trotter_spins[t][i] = -self.trotter_spins[t][i];
    }

    /// The slice with the lowest classical energy.
    pub fn lowest_energy_slice(&self) -> Spins {
        let energies = self.classical_energies();
        let best = energies
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |(bt, be), (t, e)| {
                if *e < be {
                    (t, *e)
                } else {
                    (bt, be)
                }
            })
            .0;
        self.trotter_spins[best].clone()
    }
}

fn check_gamma(gamma: f64) -> Result<()> {
    if gamma.is_finite() && gamma >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "transverse field must be finite and non-negative, got {}",
            gamma
        )))
    }
}

impl<G: Pairwise> System for TransverseIsing<'_, G> {
    type Kind = TransverseField;

    fn num_spins(&self) -> usize {
        self.graph.size()
    }
}

#[cfg(test)]
mod transverse_ising_tests {
    use super::*;
    use crate::graph::{Graph, Square};
    use crate::utility::random::Xorshift;

    #[test]
    fn coupling_tracks_parameters() {
        let g = Square::<f64>::new(2, 2, -1.0).unwrap();
        let sys = TransverseIsing::from_classical(&g, &[1, 1, 1, 1], 1.0, 4).unwrap();
        let a = sys.trotter_coupling(1.0, 0.5);
        let b = sys.trotter_coupling(2.0, 0.5);
        let c = sys.trotter_coupling(1.0, 0.9);
        assert!((a - (-0.5 * (0.125f64).tanh().ln())).abs() < 1e-12);
        assert!(a > b);
        assert!(c > a);
        assert_eq!(sys.trotter_coupling(1.0, 1.0), f64::INFINITY);
    }

    #[test]
    fn slice_count_and_sizes() {
        let g = Square::<f64>::new(2, 2, -1.0).unwrap();
        let rejected = [
            TransverseIsing::from_classical(&g, &[1, 1, 1, 1], 1.0, 1),
            TransverseIsing::from_classical(&g, &[1, 1, 1], 1.0, 4),
            TransverseIsing::from_classical(&g, &[1, 1, 1, 1], -1.0, 4),
        ];
        assert!(rejected.iter().all(|r| r.is_err()));
        let mut rng = Xorshift::new(9);
        let sys = TransverseIsing::random(&g, 0.5, 6, &mut rng).unwrap();
        assert_eq!(sys.num_trotter_slices(), 6);
        assert_eq!(sys.classical_energies().len(), 6);
    }

    #[test]
    fn energy_of_aligned_slices() {
        let g = Square::<f64>::new(2, 2, -1.0).unwrap();
        let sys = TransverseIsing::from_classical(&g, &[1, 1, 1, 1], 1.0, 4).unwrap();
        let (beta, s) = (2.0, 0.3);
        let e_cl = g.energy(&[1, 1, 1, 1]).unwrap();
        let expected = s * e_cl - sys.trotter_coupling(beta, s) / beta * 16.0;
        assert!((sys.energy(beta, s) - expected).abs() < 1e-9);
        assert_eq!(sys.lowest_energy_slice(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn classical_delta_matches() {
        let g = Square::<f64>::new(3, 2, 0.7).unwrap();
        let mut rng = Xorshift::new(4);
        let mut sys = TransverseIsing::random(&g, 1.0, 2, &mut rng).unwrap();
        for _ in 0..20 {
            let (t, i) = (rng.gen_range(0..2), rng.gen_range(0..6));
            let before = sys.classical_energies()[t];
            let de = sys.de_classical(t, i);
            sys.flip(t, i);
            assert!((sys.classical_energies()[t] - before - de).abs() < 1e-9);
        }
    }
}
