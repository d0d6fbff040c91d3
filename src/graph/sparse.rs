use crate::error::{Error, Result};
use crate::graph::{pairwise_energy, Dense, FloatType, Graph, Index, Pairwise, Spin};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::iter::Cloned;
use std::slice::Iter;

/// A pairwise graph stored as sorted adjacency lists.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Sparse<F: FloatType = f64> {
    num_spins: usize,
    max_degree: Option<usize>,
    // Sorted by neighbor index.
    binding_mat: Vec<Vec<(Index, F)>>,
    biases: Vec<F>,
}

impl<F: FloatType> Sparse<F> {
    /// Make an empty graph over `num_spins` sites.
    pub fn new(num_spins: usize) -> Self {
        Self {
            num_spins,
            max_degree: None,
            binding_mat: vec![vec![]; num_spins],
            biases: vec![F::zero(); num_spins],
        }
    }

    /// Make an empty graph which refuses to give any site more than `max_degree` neighbors.
    pub fn with_max_degree(num_spins: usize, max_degree: usize) -> Self {
        Self {
            max_degree: Some(max_degree),
            ..Self::new(num_spins)
        }
    }

    /// Make a new graph from a list of edges `[((vara, varb), j), ...]` and longitudinal
    /// fields. Repeated edges accumulate.
    pub fn from_edges(edges: &[((Index, Index), F)], biases: &[F]) -> Result<Self> {
        let mut g = Self::new(biases.len());
        g.biases.copy_from_slice(biases);
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
            Err(Error::out_of_bounds("sparse site", i, self.num_spins))
        }
    }

    /// Get `J_ij`, or `h_i` when `i == j`.
    pub fn get(&self, i: Index, j: Index) -> Result<F> {
        self.check_index(i)?;
        self.check_index(j)?;
        Ok(self.interaction(i, j))
    }

    /// Set `J_ij` and `J_ji` together, or `h_i` when `i == j`. Setting a coupling to zero
    /// removes the edge.
    pub fn set(&mut self, i: Index, j: Index, value: F) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        if i == j {
            self.biases[i] = value;
            return Ok(());
        }
        if value.is_zero() {
            self.remove_half(i, j);
            self.remove_half(j, i);
            return Ok(());
        }
        // Check both ends before writing either so a failure leaves the graph untouched.
        let missing_i = self.binding_mat[i]
            .binary_search_by_key(&j, |(k, _)| *k)
            .is_err();
        let missing_j = self.binding_mat[j]
            .binary_search_by_key(&i, |(k, _)| *k)
            .is_err();
        if let Some(max_degree) = self.max_degree {
            if missing_i && self.binding_mat[i].len() >= max_degree {
                return Err(Error::DegreeExceeded {
                    index: i,
                    max_degree,
                });
            }
            if missing_j && self.binding_mat[j].len() >= max_degree {
                return Err(Error::DegreeExceeded {
                    index: j,
                    max_degree,
                });
            }
        }
        self.insert_half(i, j, value);
        self.insert_half(j, i, value);
        Ok(())
    }

    fn insert_half(&mut self, i: Index, j: Index, value: F) {
        let row = &mut self.binding_mat[i];
        match row.binary_search_by_key(&j, |(k, _)| *k) {
            Ok(pos) => row[pos].1 = value,
            Err(pos) => row.insert(pos, (j, value)),
        }
    }

    fn remove_half(&mut self, i: Index, j: Index) {
        let row = &mut self.binding_mat[i];
        if let Ok(pos) = row.binary_search_by_key(&j, |(k, _)| *k) {
            row.remove(pos);
        }
    }

    /// Sites coupled to `i`, sorted.
    pub fn adj_nodes(&self, i: Index) -> impl Iterator<Item = Index> + '_ {
        self.binding_mat[i].iter().map(|(j, _)| *j)
    }

    /// Couplings of `i` as a sorted slice of `(j, J_ij)`.
    pub fn binding_slice(&self, i: Index) -> &[(Index, F)] {
        &self.binding_mat[i]
    }

    /// Number of distinct couplings.
    pub fn num_edges(&self) -> usize {
        self.binding_mat.iter().map(|v| v.len()).sum::<usize>() / 2
    }

    /// Declared maximum degree, if any.
    pub fn max_degree(&self) -> Option<usize> {
        self.max_degree
    }
}

impl<F: FloatType> Graph for Sparse<F> {
    type Float = F;

    fn size(&self) -> usize {
        self.num_spins
    }

    fn calc_energy(&self, spins: &[Spin]) -> F {
        pairwise_energy(self, spins)
    }
}

impl<F: FloatType> Pairwise for Sparse<F> {
    type Neighbors<'a> = Cloned<Iter<'a, (Index, F)>>;

    fn field(&self, i: Index) -> F {
        self.biases[i]
    }

    fn interaction(&self, i: Index, j: Index) -> F {
        if i == j {
            return self.biases[i];
        }
        match self.binding_mat[i].binary_search_by_key(&j, |(k, _)| *k) {
            Ok(pos) => self.binding_mat[i][pos].1,
            Err(_) => F::zero(),
        }
    }

    fn neighbors(&self, i: Index) -> Self::Neighbors<'_> {
        self.binding_mat[i].iter().cloned()
    }
}

impl<F: FloatType> From<&Dense<F>> for Sparse<F> {
    fn from(dense: &Dense<F>) -> Self {
        let n = dense.size();
        let binding_mat = (0..n).map(|i| dense.neighbors(i).collect()).collect();
        let biases = (0..n).map(|i| dense.field(i)).collect();
        Self {
            num_spins: n,
            max_degree: None,
            binding_mat,
            biases,
        }
    }
}
