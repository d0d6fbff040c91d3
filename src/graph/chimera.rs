use crate::error::{Error, Result};
use crate::graph::square::{check_coordinate, wrap};
use crate::graph::{FloatType, Graph, Index, Pairwise, Sparse, Spin};
use itertools::iproduct;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Number of sites in a chimera unit cell.
pub const CHIMERA_UNITSIZE: usize = 8;

/// Direction of a bond on the chimera lattice.
///
/// Sites `0..4` of a unit cell bond along rows, sites `4..8` along columns. The
/// `In*` directions stay inside the cell and join site `k` with site `k + 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ChimeraDir {
    /// Towards row `r + 1`, sites `0..4` only.
    PlusR,
    /// Towards row `r - 1`, sites `0..4` only.
    MinusR,
    /// Towards column `c + 1`, sites `4..8` only.
    PlusC,
    /// Towards column `c - 1`, sites `4..8` only.
    MinusC,
    /// To site 0 (from the right half) or site 4 (from the left half).
    In0or4,
    /// To site 1 or site 5.
    In1or5,
    /// To site 2 or site 6.
    In2or6,
    /// To site 3 or site 7.
    In3or7,
}

impl ChimeraDir {
    /// The four intra-cell directions.
    pub const INNER: [ChimeraDir; 4] = [
        ChimeraDir::In0or4,
        ChimeraDir::In1or5,
        ChimeraDir::In2or6,
        ChimeraDir::In3or7,
    ];
}

/// A periodic `rows x cols` lattice of 8-site chimera unit cells.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Chimera<F: FloatType = f64> {
    num_row: usize,
    num_column: usize,
    sparse: Sparse<F>,
}

impl<F: FloatType> Chimera<F> {
    /// Make a lattice with every chimera coupling set to `init_val` and zero fields.
    pub fn new(num_row: usize, num_column: usize, init_val: F) -> Result<Self> {
        if num_row == 0 || num_column == 0 {
            return Err(Error::InvalidLattice(format!(
                "chimera lattice must be at least 1x1, got {}x{}",
                num_row, num_column
            )));
        }
        let mut ch = Self {
            num_row,
            num_column,
            sparse: Sparse::new(num_row * num_column * CHIMERA_UNITSIZE),
        };
        for (r, c) in iproduct!(0..num_row as isize, 0..num_column as isize) {
            for (i, dir) in iproduct!(0..4, ChimeraDir::INNER) {
                ch.set_j(r, c, i, dir, init_val)?;
            }
            for i in 0..4 {
                ch.set_j(r, c, i, ChimeraDir::PlusR, init_val)?;
                ch.set_j(r, c, i + 4, ChimeraDir::PlusC, init_val)?;
            }
        }
        Ok(ch)
    }

    /// Number of unit cell rows.
    pub fn num_row(&self) -> usize {
        self.num_row
    }

    /// Number of unit cell columns.
    pub fn num_column(&self) -> usize {
        self.num_column
    }

    /// Reduce a row coordinate in `[-1, num_row]` into `[0, num_row)`.
    pub fn mod_r(&self, a: isize) -> usize {
        wrap(a, self.num_row)
    }

    /// Reduce a column coordinate in `[-1, num_column]` into `[0, num_column)`.
    pub fn mod_c(&self, a: isize) -> usize {
        wrap(a, self.num_column)
    }

    /// Site index of `(r, c, i)`.
    pub fn to_ind(&self, r: isize, c: isize, i: usize) -> Result<Index> {
        check_coordinate("chimera row", r, self.num_row)?;
        check_coordinate("chimera column", c, self.num_column)?;
        if i >= CHIMERA_UNITSIZE {
            return Err(Error::out_of_bounds(
                "chimera cell site",
                i,
                CHIMERA_UNITSIZE,
            ));
        }
        Ok(self.num_column * CHIMERA_UNITSIZE * self.mod_r(r)
            + CHIMERA_UNITSIZE * self.mod_c(c)
            + i)
    }

    /// Coordinates `(r, c, i)` of a site index.
    pub fn to_rci(&self, ind: Index) -> Result<(usize, usize, usize)> {
        if ind >= self.size() {
            return Err(Error::out_of_bounds("chimera site", ind, self.size()));
        }
        let i = ind % CHIMERA_UNITSIZE;
        let cell = ind / CHIMERA_UNITSIZE;
        Ok((cell / self.num_column, cell % self.num_column, i))
    }

    /// The site reached from `(r, c, i)` along `dir`.
    pub fn neighbor(&self, r: isize, c: isize, i: usize, dir: ChimeraDir) -> Result<Index> {
        let from = self.to_ind(r, c, i)?;
        let (r, c) = (self.mod_r(r) as isize, self.mod_c(c) as isize);
        let left = i < CHIMERA_UNITSIZE / 2;
        let inner = |k: usize| if left { k + 4 } else { k };
        let to = match (dir, left) {
            (ChimeraDir::PlusR, true) => self.to_ind(r + 1, c, i),
            (ChimeraDir::MinusR, true) => self.to_ind(r - 1, c, i),
            (ChimeraDir::PlusC, false) => self.to_ind(r, c + 1, i),
            (ChimeraDir::MinusC, false) => self.to_ind(r, c - 1, i),
            (ChimeraDir::In0or4, _) => self.to_ind(r, c, inner(0)),
            (ChimeraDir::In1or5, _) => self.to_ind(r, c, inner(1)),
            (ChimeraDir::In2or6, _) => self.to_ind(r, c, inner(2)),
            (ChimeraDir::In3or7, _) => self.to_ind(r, c, inner(3)),
            _ => Err(Error::OutOfBounds {
                what: "chimera direction for cell site",
                index: from as isize,
                bound: self.size(),
            }),
        }?;
        Ok(to)
    }

    /// Coupling from `(r, c, i)` along `dir`.
    pub fn j(&self, r: isize, c: isize, i: usize, dir: ChimeraDir) -> Result<F> {
        let from = self.to_ind(r, c, i)?;
        let to = self.neighbor(r, c, i, dir)?;
        if from == to {
            return Ok(F::zero());
        }
        self.sparse.get(from, to)
    }

    /// Set the coupling from `(r, c, i)` along `dir`. Bonds which wrap onto the same
    /// site are ignored.
    pub fn set_j(&mut self, r: isize, c: isize, i: usize, dir: ChimeraDir, value: F) -> Result<()> {
        let from = self.to_ind(r, c, i)?;
        let to = self.neighbor(r, c, i, dir)?;
        if from == to {
            return Ok(());
        }
        self.sparse.set(from, to, value)
    }

    /// Local field at `(r, c, i)`.
    pub fn h(&self, r: isize, c: isize, i: usize) -> Result<F> {
        let ind = self.to_ind(r, c, i)?;
        Ok(self.sparse.field(ind))
    }

    /// Set the local field at `(r, c, i)`.
    pub fn set_h(&mut self, r: isize, c: isize, i: usize, value: F) -> Result<()> {
        let ind = self.to_ind(r, c, i)?;
        self.sparse.set(ind, ind, value)
    }

    /// The underlying sparse graph.
    pub fn as_sparse(&self) -> &Sparse<F> {
        &self.sparse
    }
}

impl<F: FloatType> Graph for Chimera<F> {
    type Float = F;

    fn size(&self) -> usize {
        self.sparse.size()
    }

    fn calc_energy(&self, spins: &[Spin]) -> F {
        self.sparse.calc_energy(spins)
    }
}

impl<F: FloatType> Pairwise for Chimera<F> {
    type Neighbors<'a> = <Sparse<F> as Pairwise>::Neighbors<'a>;

    fn field(&self, i: Index) -> F {
        self.sparse.field(i)
    }

    fn interaction(&self, i: Index, j: Index) -> F {
        self.sparse.interaction(i, j)
    }

    fn neighbors(&self, i: Index) -> Self::Neighbors<'_> {
        self.sparse.neighbors(i)
    }
}

#[cfg(test)]
mod chimera_tests {
    use super::*;

    #[test]
    fn coordinates_are_bijective() {
        let ch = Chimera::<f64>::new(2, 3, 1.0).unwrap();
        assert_eq!(ch.size(), 48);
        for ind in 0..ch.size() {
            let (r, c, i) = ch.to_rci(ind).unwrap();
            assert_eq!(ch.to_ind(r as isize, c as isize, i), Ok(ind));
        }
        assert!(ch.to_ind(0, 0, 8).is_err());
        assert!(ch.to_ind(3, 0, 0).is_err());
        assert!(ch.to_rci(48).is_err());
    }

    #[test]
    fn unit_cell_topology() {
        let ch = Chimera::<f64>::new(1, 1, -1.0).unwrap();
        // A lone cell only keeps its K4,4 couplings.
        assert_eq!(ch.as_sparse().num_edges(), 16);
        for i in 0..8 {
            assert_eq!(ch.neighbors(i).count(), 4);
        }
        assert_eq!(ch.j(0, 0, 1, ChimeraDir::In2or6), Ok(-1.0));
        assert_eq!(ch.j(0, 0, 6, ChimeraDir::In1or5), Ok(-1.0));
        assert!(ch.j(0, 0, 1, ChimeraDir::PlusC).is_err());
        assert!(ch.j(0, 0, 5, ChimeraDir::MinusR).is_err());
    }

    #[test]
    fn inter_cell_couplings() {
        let mut ch = Chimera::<f64>::new(2, 2, -1.0).unwrap();
        for i in 0..ch.size() {
            // K4,4 plus one neighbor in each wrapped direction, which coincide on a 2x2 lattice.
            assert_eq!(ch.neighbors(i).count(), 5);
        }
        ch.set_j(1, 1, 5, ChimeraDir::PlusC, 3.0).unwrap();
        assert_eq!(ch.j(1, 0, 5, ChimeraDir::MinusC), Ok(3.0));
        assert_eq!(
            ch.neighbor(0, 1, 2, ChimeraDir::MinusR),
            ch.to_ind(1, 1, 2)
        );
    }
}
