use crate::error::{check_size, Error, Result};
use crate::graph::{FloatType, Graph, Index, Pairwise, Sparse, Spin, Spins, Vartype};
use crate::system::{System, TransverseField};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A spin change along imaginary time: from `time` onwards the site holds `spin`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CutPoint {
    /// Position in `[0, 1)`.
    pub time: f64,
    /// Spin held until the next cut.
    pub spin: Spin,
}

impl CutPoint {
    /// Cut at `time` with value `spin`.
    pub fn new(time: f64, spin: Spin) -> Self {
        Self { time, spin }
    }
}

/// Transverse field ising model in the continuous imaginary time limit.
///
/// Each site carries a sorted list of cut points over the periodic interval `[0, 1)`.
/// Longitudinal fields are folded into couplings with one auxiliary spin, stored as the
/// last site, which has no transverse field and therefore never gains cuts.
#[derive(Debug, Clone)]
pub struct ContinuousTimeIsing<F: FloatType = f64> {
    interactions: Sparse<F>,
    cuts: Vec<Vec<CutPoint>>,
    gamma: f64,
}

impl<F: FloatType> ContinuousTimeIsing<F> {
    /// Start from a classical configuration, constant in imaginary time.
    pub fn new<G>(graph: &G, spins: &[Spin], gamma: f64) -> Result<Self>
    where
        G: Pairwise<Float = F>,
    {
        check_size(graph.size(), spins.len())?;
        Vartype::Spin.check(spins)?;
        if !gamma.is_finite() || gamma < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "transverse field must be finite and non-negative, got {}",
                gamma
            )));
        }
        let n = graph.size();
        let mut interactions = Sparse::new(n + 1);
        for ((i, j), jij) in graph.edges() {
            interactions.set(i, j, jij)?;
        }
        for i in 0..n {
            let h = graph.field(i);
            if !h.is_zero() {
                interactions.set(i, n, h)?;
            }
        }
        let cuts = spins
            .iter()
            .chain(std::iter::once(&1))
            .map(|s| vec![CutPoint::new(0.0, *s)])
            .collect();
        Ok(Self {
            interactions,
            cuts,
            gamma,
        })
    }

    /// Strength of the transverse field.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Index of the auxiliary spin.
    pub fn aux_index(&self) -> Index {
        self.cuts.len() - 1
    }

    /// Couplings including those to the auxiliary spin.
    pub fn interactions(&self) -> &Sparse<F> {
        &self.interactions
    }

    /// Cut points of site `i`; `i` may be the auxiliary index.
    pub fn cut_points(&self, i: Index) -> &[CutPoint] {
        &self.cuts[i]
    }

    pub(crate) fn cuts_mut(&mut self) -> &mut Vec<Vec<CutPoint>> {
        &mut self.cuts
    }

    /// Spin of site `i` at time `t`, before the auxiliary correction.
    pub fn raw_spin_at(&self, i: Index, t: f64) -> Spin {
        spin_at(&self.cuts[i], t)
    }

    /// Configuration at time `t` with the auxiliary spin divided out.
    pub fn spins_at(&self, t: f64) -> Spins {
        let aux = self.raw_spin_at(self.aux_index(), t);
        (0..self.aux_index())
            .map(|i| self.raw_spin_at(i, t) * aux)
            .collect()
    }

    /// Classical energy of the configuration at time `t`.
    pub fn classical_energy_at(&self, t: f64) -> f64 {
        let raw = (0..self.cuts.len())
            .map(|i| self.raw_spin_at(i, t))
            .collect::<Vec<_>>();
        self.interactions.calc_energy(&raw).as_f64()
    }

    /// Total number of cuts over all sites.
    pub fn num_cuts(&self) -> usize {
        self.cuts.iter().map(Vec::len).sum()
    }

    /// Check the cut point invariants: every site has at least one cut, times are strictly
    /// increasing inside `[0, 1)`, cyclically adjacent cuts hold opposite spins and the
    /// auxiliary spin is constant.
    pub fn verify(&self) -> Result<()> {
        let bad = |i: usize, msg: &str| -> Result<()> {
            Err(Error::InvalidParameter(format!("site {}: {}", i, msg)))
        };
        for (i, cuts) in self.cuts.iter().enumerate() {
            if cuts.is_empty() {
                return bad(i, "no cut points");
            }
            if cuts.iter().any(|c| !(0.0..1.0).contains(&c.time)) {
                return bad(i, "cut time outside [0, 1)");
            }
            if cuts.iter().any(|c| c.spin != 1 && c.spin != -1) {
                return bad(i, "cut spin is not +-1");
            }
            if cuts.windows(2).any(|w| w[0].time >= w[1].time) {
                return bad(i, "cut times not strictly increasing");
            }
            let n = cuts.len();
            if n > 1 && (0..n).any(|k| cuts[k].spin == cuts[(k + 1) % n].spin) {
                return bad(i, "adjacent cuts hold the same spin");
            }
        }
        if self.cuts[self.aux_index()].len() != 1 {
            return bad(self.aux_index(), "auxiliary spin changes in time");
        }
        Ok(())
    }
}

/// Spin held at `t` by a sorted cut list, wrapping around before the first cut.
pub(crate) fn spin_at(cuts: &[CutPoint], t: f64) -> Spin {
    let k = cuts.partition_point(|c| c.time <= t);
    if k == 0 {
        cuts[cuts.len() - 1].spin
    } else {
        cuts[k - 1].spin
    }
}

impl<F: FloatType> System for ContinuousTimeIsing<F> {
    type Kind = TransverseField;

    fn num_spins(&self) -> usize {
        self.aux_index()
    }
}
