use crate::graph::{FloatType, Pairwise};
use crate::system::ClassicalIsing;
use crate::updater::Updater;
use crate::utility::fmath;
use crate::utility::schedule::ClassicalUpdaterParameter;
use crate::utility::union_find::UnionFind;
use rand::Rng;

/// Fortuin-Kasteleyn cluster moves.
///
/// Satisfied bonds (`J s_i s_j < 0`) are activated with probability `1 - e^{-2 beta |J|}`.
/// Longitudinal fields act as bonds to a fixed ghost spin, so clusters attached to the
/// ghost never flip; every other cluster flips with probability one half.
#[derive(Debug, Clone)]
pub struct SwendsenWang {
    union_find: UnionFind,
    flip_root: Vec<bool>,
}

impl Default for SwendsenWang {
    fn default() -> Self {
        Self::new()
    }
}

impl SwendsenWang {
    /// Make an updater; buffers grow on first use.
    pub fn new() -> Self {
        Self {
            union_find: UnionFind::new(0),
            flip_root: vec![],
        }
    }
}

#[inline]
fn activate<R: Rng + ?Sized>(rng: &mut R, beta: f64, strength: f64) -> bool {
    let p = 1.0 - fmath::exp(-2.0 * beta * strength.abs());
    rng.gen::<f64>() < p
}

impl<G: Pairwise> Updater<ClassicalIsing<'_, G>> for SwendsenWang {
    fn update<R: Rng + ?Sized>(
        &mut self,
        system: &mut ClassicalIsing<'_, G>,
        rng: &mut R,
        parameter: &ClassicalUpdaterParameter,
    ) {
        let beta = parameter.beta;
        let graph = system.graph();
        let n = graph.size();
        let ghost = n;
        let uf = &mut self.union_find;
        uf.reset_with_len(n + 1);
        {
            let spins = system.spins();
            for i in 0..n {
                let si = f64::from(spins[i]);
                for (j, jij) in graph.neighbors(i).filter(|(j, _)| *j > i) {
                    let jij = jij.as_f64();
                    if jij * si * f64::from(spins[j]) < 0.0 && activate(rng, beta, jij) {
                        uf.unite_sets(i, j);
                    }
                }
                let h = graph.field(i).as_f64();
                if h * si < 0.0 && activate(rng, beta, h) {
                    uf.unite_sets(i, ghost);
                }
            }
        }
        let ghost_root = uf.find_set(ghost);
        self.flip_root.clear();
        self.flip_root.resize(n + 1, false);
        for a in 0..n {
            let root = uf.find_set(a);
            if root == a && root != ghost_root {
                self.flip_root[root] = rng.gen::<bool>();
            }
        }
        for i in 0..n {
            if self.flip_root[uf.find_set(i)] {
                system.flip(i);
            }
        }
    }
}

#[cfg(test)]
mod swendsen_wang_tests {
    use super::*;
    use crate::graph::{Dense, Square};
    use crate::utility::random::Xorshift;

    #[test]
    fn strong_field_pins_the_lattice() {
        let mut g = Square::<f64>::new(4, 4, -1.0).unwrap();
        for r in 0..4 {
            for c in 0..4 {
                g.set_h(r, c, -0.5).unwrap();
            }
        }
        let mut rng = Xorshift::new(1234);
        let mut sys = ClassicalIsing::new(&g, vec![1; 16]).unwrap();
        let mut updater = SwendsenWang::new();
        for _ in 0..50 {
            updater.update(&mut sys, &mut rng, &ClassicalUpdaterParameter::new(10.0));
        }
        assert_eq!(sys.spins(), &[1; 16]);
    }

    #[test]
    fn cache_survives_cluster_flips() {
        let mut rng = Xorshift::new(77);
        let mut g = Dense::<f64>::new(6);
        for i in 0..6 {
            for j in i..6 {
                g.set(i, j, rng.gen_range(-1.0..1.0)).unwrap();
            }
        }
        let mut sys = ClassicalIsing::random(&g, &mut rng);
        let mut updater = SwendsenWang::default();
        for _ in 0..100 {
            updater.update(&mut sys, &mut rng, &ClassicalUpdaterParameter::new(1.5));
            let cached = (0..6).map(|i| sys.de(i)).collect::<Vec<_>>();
            let mut fresh = sys.clone();
            fresh.reset_de();
            for (i, c) in cached.iter().enumerate() {
                assert!((fresh.de(i) - c).abs() < 1e-9);
            }
        }
    }
}
