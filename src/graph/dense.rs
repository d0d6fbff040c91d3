use crate::error::{Error, Result};
use crate::graph::{spin_as, FloatType, Graph, Index, Pairwise, Spin};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A fully connected pairwise graph. The diagonal of the matrix holds the local fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Dense<F: FloatType = f64> {
    num_spins: usize,
    interactions: Vec<F>,
}

impl<F: FloatType> Dense<F> {
    /// Make a graph with all couplings and fields set to zero.
    pub fn new(num_spins: usize) -> Self {
        Self {
            num_spins,
            interactions: vec![F::zero(); num_spins * num_spins],
        }
    }

    /// Make a graph from a list of couplings `[((i, j), J), ...]` and longitudinal fields.
    /// Entries with `i == j` add to the field of `i`.
    pub fn from_edges(edges: &[((Index, Index), F)], biases: &[F]) -> Result<Self> {
        let mut g = Self::new(biases.len());
        biases
            .iter()
            .enumerate()
            .try_for_each(|(i, h)| g.set(i, i, *h))?;
        edges.iter().try_for_each(|((i, j), v)| {
            let old = g.get(*i, *j)?;
            g.set(*i, *j, old + *v)
        })?;
        Ok(g)
    }

    fn check_index(&self, i: Index) -> Result<()> {
        if i < self.num_spins {
            Ok(())
        } else {
            Err(Error::out_of_bounds("dense site", i, self.num_spins))
        }
    }

    /// Get `J_ij`, or `h_i` when `i == j`.
    pub fn get(&self, i: Index, j: Index) -> Result<F> {
        self.check_index(i)?;
        self.check_index(j)?;
        Ok(self.interactions[i * self.num_spins + j])
    }

    /// Set `J_ij` and `J_ji` together, or `h_i` when `i == j`.
    pub fn set(&mut self, i: Index, j: Index, value: F) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        self.interactions[i * self.num_spins + j] = value;
        self.interactions[j * self.num_spins + i] = value;
        Ok(())
    }

    /// Row `i` of the interaction matrix.
    pub fn row(&self, i: Index) -> &[F] {
        &self.interactions[i * self.num_spins..(i + 1) * self.num_spins]
    }
}

impl<F: FloatType> Graph for Dense<F> {
    type Float = F;

    fn size(&self) -> usize {
        self.num_spins
    }

    fn calc_energy(&self, spins: &[Spin]) -> F {
        (0..self.num_spins).fold(F::zero(), |acc, i| {
            let row = self.row(i);
            let si = spin_as::<F>(spins[i]);
            let upper = ((i + 1)..self.num_spins)
                .fold(F::zero(), |acc, j| acc + row[j] * spin_as::<F>(spins[j]));
            acc + si * (upper + row[i])
        })
    }
}

impl<F: FloatType> Pairwise for Dense<F> {
    type Neighbors<'a> = DenseNeighbors<'a, F>;

    fn field(&self, i: Index) -> F {
        self.interactions[i * self.num_spins + i]
    }

    fn interaction(&self, i: Index, j: Index) -> F {
        self.interactions[i * self.num_spins + j]
    }

    fn neighbors(&self, i: Index) -> Self::Neighbors<'_> {
        DenseNeighbors {
            row: self.row(i),
            site: i,
            next: 0,
        }
    }

    fn local_field(&self, i: Index, spins: &[Spin]) -> F {
        self.row(i)
            .iter()
            .zip(spins.iter())
            .enumerate()
            .fold(F::zero(), |acc, (j, (v, s))| {
                if j == i {
                    acc + *v
                } else {
                    acc + *v * spin_as::<F>(*s)
                }
            })
    }
}

/// Non-zero off-diagonal entries of one row of a [`Dense`] graph.
#[derive(Debug, Clone)]
pub struct DenseNeighbors<'a, F> {
    row: &'a [F],
    site: Index,
    next: Index,
}

impl<'a, F: FloatType> Iterator for DenseNeighbors<'a, F> {
    type Item = (Index, F);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.row.len() {
            let j = self.next;
            self.next += 1;
            if j != self.site && !self.row[j].is_zero() {
                return Some((j, self.row[j]));
            }
        }
        None
    }
}

#[cfg(test)]
mod dense_tests {
    use super::*;

    #[test]
    fn symmetric_write() {
        let mut g = Dense::<f64>::new(3);
        g.set(0, 2, 1.5).unwrap();
        assert_eq!(g.get(2, 0), Ok(1.5));
        assert_eq!(g.interaction(0, 2), 1.5);
        assert!(g.set(3, 0, 1.0).is_err());
        assert!(g.get(0, 7).is_err());
    }

    #[test]
    fn energy_by_hand() {
        let g = Dense::<f64>::from_edges(
            &[((0, 1), -1.0), ((1, 2), 2.0)],
            &[0.5, 0.0, -0.25],
        )
        .unwrap();
        // -1*1*1 + 2*1*(-1) + 0.5*1 - 0.25*(-1)
        assert_eq!(g.energy(&[1, 1, -1]), Ok(-1.0 - 2.0 + 0.5 + 0.25));
        assert_eq!(g.local_field(1, &[1, 1, -1]), -1.0 - 2.0);
        assert_eq!(g.neighbors(0).collect::<Vec<_>>(), vec![(1, -1.0)]);
    }
}
