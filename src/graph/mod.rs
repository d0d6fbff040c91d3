//! Interaction graphs.
//!
//! Every graph fixes its number of sites at construction. Pairwise graphs use the
//! energy convention `E(s) = sum_{i<j} J_ij s_i s_j + sum_i h_i s_i`, polynomial
//! graphs `E(x) = sum_k J_k prod_{v in k} x_v`.

use crate::error::{check_size, Error, Result};
use num_traits::{Float, Zero};
use rand::Rng;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::AddAssign;

/// Lattice of 8-site chimera unit cells.
pub mod chimera;
/// Fully connected pairwise graph.
pub mod dense;
/// Higher order interactions.
pub mod polynomial;
/// Pairwise graph stored as adjacency lists.
pub mod sparse;
/// Periodic square lattice.
pub mod square;

pub use chimera::{Chimera, ChimeraDir, CHIMERA_UNITSIZE};
pub use dense::Dense;
pub use polynomial::Polynomial;
pub use sparse::Sparse;
pub use square::{Square, SquareDir};

/// A single ising spin, `-1` or `+1`.
pub type Spin = i32;
/// A single binary variable, `0` or `1`.
pub type Binary = i32;
/// Spin configuration, one value per site.
pub type Spins = Vec<Spin>;
/// Binary configuration, one value per site.
pub type Binaries = Vec<Binary>;
/// One spin configuration per imaginary time slice.
pub type TrotterSpins = Vec<Spins>;
/// Site index.
pub type Index = usize;

/// Variable encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Vartype {
    /// Values in `{-1, +1}`.
    Spin,
    /// Values in `{0, 1}`.
    Binary,
}

impl Vartype {
    /// Check a single value against the encoding.
    pub fn is_valid(self, value: i32) -> bool {
        match self {
            Vartype::Spin => value == 1 || value == -1,
            Vartype::Binary => value == 0 || value == 1,
        }
    }

    /// The value which makes a binary product vanish, expressed in this encoding.
    pub fn vanishing_value(self) -> i32 {
        match self {
            Vartype::Spin => -1,
            Vartype::Binary => 0,
        }
    }

    /// The other value of a two-valued variable.
    pub fn flipped(self, value: i32) -> i32 {
        match self {
            Vartype::Spin => -value,
            Vartype::Binary => 1 - value,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Vartype::Spin => "spin",
            Vartype::Binary => "binary",
        }
    }

    /// Validate a whole configuration.
    pub fn check(self, values: &[i32]) -> Result<()> {
        match values.iter().position(|v| !self.is_valid(*v)) {
            None => Ok(()),
            Some(index) => Err(Error::InvalidSpin {
                index,
                value: values[index],
                vartype: self.name(),
            }),
        }
    }
}

/// Coefficient precision used by graphs.
pub trait FloatType: Float + Default + Debug + Sum + AddAssign + Send + Sync + 'static {
    /// Convert from the `f64` used in acceptance arithmetic.
    fn cast_from(v: f64) -> Self;
    /// Widen to `f64`.
    fn as_f64(self) -> f64;
}

impl FloatType for f32 {
    #[inline]
    fn cast_from(v: f64) -> Self {
        v as f32
    }
    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl FloatType for f64 {
    #[inline]
    fn cast_from(v: f64) -> Self {
        v
    }
    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

/// Common behavior of all interaction graphs.
pub trait Graph {
    /// Coefficient precision.
    type Float: FloatType;

    /// Number of sites.
    fn size(&self) -> usize;

    /// Encoding expected by `energy`.
    fn vartype(&self) -> Vartype {
        Vartype::Spin
    }

    /// Energy of a configuration, the caller guarantees `values.len() == self.size()`.
    fn calc_energy(&self, values: &[i32]) -> Self::Float;

    /// Energy of a configuration, checking its length and encoding.
    fn energy(&self, values: &[i32]) -> Result<Self::Float> {
        check_size(self.size(), values.len())?;
        self.vartype().check(values)?;
        Ok(self.calc_energy(values))
    }

    /// Random spin configuration.
    fn gen_spin<R: Rng + ?Sized>(&self, rng: &mut R) -> Spins {
        (0..self.size())
            .map(|_| if rng.gen::<bool>() { 1 } else { -1 })
            .collect()
    }

    /// Random binary configuration.
    fn gen_binary<R: Rng + ?Sized>(&self, rng: &mut R) -> Binaries {
        (0..self.size())
            .map(|_| i32::from(rng.gen::<bool>()))
            .collect()
    }
}

/// Graphs with only one and two body terms.
pub trait Pairwise: Graph {
    /// Iterator over the neighbors of a site.
    type Neighbors<'a>: Iterator<Item = (Index, Self::Float)>
    where
        Self: 'a;

    /// Local field `h_i`.
    fn field(&self, i: Index) -> Self::Float;

    /// Coupling `J_ij`, zero when the sites are not connected.
    fn interaction(&self, i: Index, j: Index) -> Self::Float;

    /// Non-zero couplings of `i` as `(j, J_ij)` with `j != i`.
    fn neighbors(&self, i: Index) -> Self::Neighbors<'_>;

    /// `h_i + sum_j J_ij s_j`.
    fn local_field(&self, i: Index, spins: &[Spin]) -> Self::Float {
        self.neighbors(i).fold(self.field(i), |acc, (j, jij)| {
            acc + jij * spin_as::<Self::Float>(spins[j])
        })
    }

    /// Every coupling exactly once as `((i, j), J_ij)` with `i < j`.
    fn edges(&self) -> Vec<((Index, Index), Self::Float)> {
        (0..self.size())
            .flat_map(move |i| {
                self.neighbors(i)
                    .filter(move |(j, _)| *j > i)
                    .map(move |(j, jij)| ((i, j), jij))
            })
            .collect()
    }
}

#[inline]
pub(crate) fn spin_as<F: FloatType>(s: Spin) -> F {
    if s > 0 {
        F::one()
    } else {
        -F::one()
    }
}

/// Energy of a pairwise graph, shared by the sparse based graphs.
pub(crate) fn pairwise_energy<G: Pairwise + ?Sized>(graph: &G, spins: &[Spin]) -> G::Float {
    (0..graph.size()).fold(G::Float::zero(), |acc, i| {
        let si = spin_as::<G::Float>(spins[i]);
        // Only count each bond once.
        let bonds = graph
            .neighbors(i)
            .filter(|(j, _)| *j > i)
            .fold(G::Float::zero(), |acc, (j, jij)| {
                acc + jij * spin_as::<G::Float>(spins[j])
            });
        acc + si * (bonds + graph.field(i))
    })
}
