use crate::error::{check_size, Result};
use crate::graph::{FloatType, Index, Pairwise, Spin, Spins, Vartype};
use crate::system::{Classical, System};
use rand::Rng;

/// Classical spins on a borrowed pairwise graph.
///
/// Keeps the energy change of flipping every site so that single flip updates cost
/// `O(degree)`.
#[derive(Debug, Clone)]
pub struct ClassicalIsing<'g, G: Pairwise> {
    graph: &'g G,
    spins: Spins,
    de: Vec<f64>,
}

impl<'g, G: Pairwise> ClassicalIsing<'g, G> {
    /// Bind `spins` to `graph`.
    pub fn new(graph: &'g G, spins: Spins) -> Result<Self> {
        check_size(graph.size(), spins.len())?;
        Vartype::Spin.check(&spins)?;
        let mut s = Self {
            graph,
            spins,
            de: vec![],
        };
        s.reset_de();
        Ok(s)
    }

    /// Bind a random configuration to `graph`.
    pub fn random<R: Rng + ?Sized>(graph: &'g G, rng: &mut R) -> Self {
        let spins = graph.gen_spin(rng);
        let mut s = Self {
            graph,
            spins,
            de: vec![],
        };
        s.reset_de();
        s
    }

    /// The graph.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// Current configuration.
    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    /// Replace the configuration.
    pub fn set_spins(&mut self, spins: Spins) -> Result<()> {
        check_size(self.graph.size(), spins.len())?;
        Vartype::Spin.check(&spins)?;
        self.spins = spins;
        self.reset_de();
        Ok(())
    }

    /// Energy of the current configuration.
    pub fn energy(&self) -> f64 {
        self.graph.calc_energy(&self.spins).as_f64()
    }

    /// Energy change if site `i` flipped.
    #[inline]
    pub fn de(&self, i: Index) -> f64 {
        self.de[i]
    }

    /// Flip site `i` and update the cached energy changes of it and its neighbors.
    pub fn flip(&mut self, i: Index) {
        let si = -self.spins[i];
        self.spins[i] = si;
        self.de[i] = -self.de[i];
        let graph = self.graph;
        for (j, jij) in graph.neighbors(i) {
            self.de[j] -= 4.0 * jij.as_f64() * f64::from(si * self.spins[j]);
        }
    }

    /// Recompute every cached energy change from scratch.
    pub fn reset_de(&mut self) {
        let graph = self.graph;
        let spins = &self.spins;
        self.de = (0..graph.size())
            .map(|i| {
                -2.0 * f64::from(spins[i]) * graph.local_field(i, spins).as_f64()
            })
            .collect();
    }
}

impl<G: Pairwise> System for ClassicalIsing<'_, G> {
    type Kind = Classical;

    fn num_spins(&self) -> usize {
        self.graph.size()
    }
}

#[cfg(test)]
mod classical_ising_tests {
    use super::*;
    use crate::graph::{Dense, Sparse};
    use crate::utility::random::Xorshift;

    #[test]
    fn cache_matches_recount() {
        let mut rng = Xorshift::new(1234);
        let mut g = Sparse::<f64>::new(10);
        for i in 0..10 {
            g.set(i, (i + 1) % 10, rng.gen_range(-1.0..1.0)).unwrap();
            g.set(i, (i + 3) % 10, rng.gen_range(-1.0..1.0)).unwrap();
            g.set(i, i, rng.gen_range(-0.5..0.5)).unwrap();
        }
        let mut sys = ClassicalIsing::random(&g, &mut rng);
        for _ in 0..200 {
            let i = rng.gen_range(0..10);
            let before = sys.energy();
            let de = sys.de(i);
            sys.flip(i);
            assert!((sys.energy() - before - de).abs() < 1e-9);
        }
        let cached = (0..10).map(|i| sys.de(i)).collect::<Vec<_>>();
        sys.reset_de();
        for (i, c) in cached.iter().enumerate() {
            assert!((sys.de(i) - c).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_bad_spins() {
        let g = Dense::<f64>::new(3);
        assert!(ClassicalIsing::new(&g, vec![1, 1]).is_err());
        assert!(ClassicalIsing::new(&g, vec![1, 0, 1]).is_err());
        let mut sys = ClassicalIsing::new(&g, vec![1, -1, 1]).unwrap();
        assert!(sys.set_spins(vec![1; 4]).is_err());
        assert_eq!(sys.spins(), &[1, -1, 1]);
    }
}
