use crate::error::{Error, Result};
use crate::graph::{FloatType, Graph, Index, Pairwise, Sparse, Spin};
use itertools::iproduct;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Direction of a bond on the square lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum SquareDir {
    /// Towards row `r - 1`.
    MinusR,
    /// Towards row `r + 1`.
    PlusR,
    /// Towards column `c - 1`.
    MinusC,
    /// Towards column `c + 1`.
    PlusC,
}

impl SquareDir {
    /// All four directions.
    pub const ALL: [SquareDir; 4] = [
        SquareDir::MinusR,
        SquareDir::PlusR,
        SquareDir::MinusC,
        SquareDir::PlusC,
    ];

    fn offset(self) -> (isize, isize) {
        match self {
            SquareDir::MinusR => (-1, 0),
            SquareDir::PlusR => (1, 0),
            SquareDir::MinusC => (0, -1),
            SquareDir::PlusC => (0, 1),
        }
    }
}

/// A periodic `rows x cols` square lattice with nearest neighbor couplings.
///
/// Sites are numbered row major. Coordinates one step outside the lattice wrap around.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Square<F: FloatType = f64> {
    num_row: usize,
    num_column: usize,
    sparse: Sparse<F>,
}

impl<F: FloatType> Square<F> {
    /// Make a lattice with every nearest neighbor coupling set to `init_val` and zero fields.
    pub fn new(num_row: usize, num_column: usize, init_val: F) -> Result<Self> {
        if num_row == 0 || num_column == 0 {
            return Err(Error::InvalidLattice(format!(
                "square lattice must be at least 1x1, got {}x{}",
                num_row, num_column
            )));
        }
        let mut sq = Self {
            num_row,
            num_column,
            sparse: Sparse::new(num_row * num_column),
        };
        for (r, c) in iproduct!(0..num_row as isize, 0..num_column as isize) {
            for dir in [SquareDir::PlusR, SquareDir::PlusC] {
                sq.set_j(r, c, dir, init_val)?;
            }
        }
        Ok(sq)
    }

    /// Number of rows.
    pub fn num_row(&self) -> usize {
        self.num_row
    }

    /// Number of columns.
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

    /// Site index of `(r, c)`.
    pub fn to_ind(&self, r: isize, c: isize) -> Result<Index> {
        check_coordinate("square row", r, self.num_row)?;
        check_coordinate("square column", c, self.num_column)?;
        Ok(self.num_column * self.mod_r(r) + self.mod_c(c))
    }

    /// Coordinates `(r, c)` of a site index.
    pub fn to_rc(&self, ind: Index) -> Result<(usize, usize)> {
        if ind >= self.size() {
            return Err(Error::out_of_bounds("square site", ind, self.size()));
        }
        Ok((ind / self.num_column, ind % self.num_column))
    }

    fn bond(&self, r: isize, c: isize, dir: SquareDir) -> Result<(Index, Index)> {
        let (dr, dc) = dir.offset();
        let from = self.to_ind(r, c)?;
        let (r, c) = (self.mod_r(r) as isize, self.mod_c(c) as isize);
        let to = self.to_ind(r + dr, c + dc)?;
        Ok((from, to))
    }

    /// Coupling from `(r, c)` in direction `dir`.
    pub fn j(&self, r: isize, c: isize, dir: SquareDir) -> Result<F> {
        let (from, to) = self.bond(r, c, dir)?;
        if from == to {
            return Ok(F::zero());
        }
        self.sparse.get(from, to)
    }

    /// Set the coupling from `(r, c)` in direction `dir`. Bonds which wrap onto the
    /// same site are ignored.
    pub fn set_j(&mut self, r: isize, c: isize, dir: SquareDir, value: F) -> Result<()> {
        let (from, to) = self.bond(r, c, dir)?;
        if from == to {
            return Ok(());
        }
        self.sparse.set(from, to, value)
    }

    /// Local field at `(r, c)`.
    pub fn h(&self, r: isize, c: isize) -> Result<F> {
        let i = self.to_ind(r, c)?;
        Ok(self.sparse.field(i))
    }

    /// Set the local field at `(r, c)`.
    pub fn set_h(&mut self, r: isize, c: isize, value: F) -> Result<()> {
        let i = self.to_ind(r, c)?;
        self.sparse.set(i, i, value)
    }

    /// The underlying sparse graph.
    pub fn as_sparse(&self) -> &Sparse<F> {
        &self.sparse
    }
}

pub(crate) fn wrap(a: isize, n: usize) -> usize {
    (a + n as isize).rem_euclid(n as isize) as usize
}

pub(crate) fn check_coordinate(what: &'static str, a: isize, n: usize) -> Result<()> {
    if a < -1 || a > n as isize {
        Err(Error::OutOfBounds {
            what,
            index: a,
            bound: n,
        })
    } else {
        Ok(())
    }
}

impl<F: FloatType> Graph for Square<F> {
    type Float = F;

    fn size(&self) -> usize {
        self.sparse.size()
    }

    fn calc_energy(&self, spins: &[Spin]) -> F {
        self.sparse.calc_energy(spins)
    }
}

impl<F: FloatType> Pairwise for Square<F> {
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
mod square_tests {
    use super::*;

    #[test]
    fn coordinates_are_bijective() {
        let sq = Square::<f64>::new(3, 4, 1.0).unwrap();
        for ind in 0..sq.size() {
            let (r, c) = sq.to_rc(ind).unwrap();
            assert_eq!(sq.to_ind(r as isize, c as isize), Ok(ind));
        }
        assert_eq!(sq.to_ind(-1, 0), sq.to_ind(2, 0));
        assert_eq!(sq.to_ind(0, 4), sq.to_ind(0, 0));
        assert!(sq.to_ind(-2, 0).is_err());
        assert!(sq.to_ind(0, 5).is_err());
        assert!(sq.to_rc(12).is_err());
    }

    #[test]
    fn four_neighbors() {
        let mut sq = Square::<f64>::new(4, 4, -1.0).unwrap();
        for i in 0..sq.size() {
            assert_eq!(sq.neighbors(i).count(), 4);
        }
        sq.set_j(0, 0, SquareDir::MinusR, 2.0).unwrap();
        assert_eq!(sq.j(3, 0, SquareDir::PlusR), Ok(2.0));
        sq.set_h(1, 1, 0.5).unwrap();
        assert_eq!(sq.field(sq.to_ind(1, 1).unwrap()), 0.5);
        // All aligned: 32 bonds at -1 except one at +2, plus the field.
        let e = sq.energy(&vec![1; 16]).unwrap();
        assert_eq!(e, -31.0 + 2.0 + 0.5);
    }
}
