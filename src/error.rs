use thiserror::Error;

/// Errors produced while building graphs, systems, schedules or device resources.
///
/// Numeric degeneracies inside acceptance probabilities are not errors: they
/// saturate to a fixed accept/reject outcome in the updaters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A spin buffer, trotter slice or coefficient list has the wrong length.
    #[error("size mismatch: expected {expected}, found {found}")]
    SizeMismatch {
        /// Length required by the graph or system.
        expected: usize,
        /// Length supplied by the caller.
        found: usize,
    },
    /// A site index or lattice coordinate lies outside the declared bounds.
    #[error("index {index} out of bounds for {bound} ({what})")]
    OutOfBounds {
        /// What was being indexed.
        what: &'static str,
        /// Offending value.
        index: isize,
        /// Exclusive upper bound.
        bound: usize,
    },
    /// A variable value is not valid for its encoding.
    #[error("value {value} at site {index} is not a valid {vartype}")]
    InvalidSpin {
        /// Site holding the value.
        index: usize,
        /// Offending value.
        value: i32,
        /// Expected encoding.
        vartype: &'static str,
    },
    /// Two polynomial terms canonicalize to the same key.
    #[error("duplicate polynomial term {0:?}")]
    DuplicateTerm(Vec<usize>),
    /// A sparse graph node would exceed its declared maximum degree.
    #[error("site {index} exceeds maximum degree {max_degree}")]
    DegreeExceeded {
        /// Site whose adjacency is full.
        index: usize,
        /// Declared maximum degree.
        max_degree: usize,
    },
    /// A schedule cannot be generated from the given arguments.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    /// Lattice dimensions are incompatible with the requested layout.
    #[error("invalid lattice: {0}")]
    InvalidLattice(String),
    /// A model parameter is outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Device resources could not be acquired.
    #[error("resource error: {0}")]
    Resource(String),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn out_of_bounds(what: &'static str, index: usize, bound: usize) -> Self {
        Error::OutOfBounds {
            what,
            index: index as isize,
            bound,
        }
    }

    /// True for construction and argument errors, false for resource failures.
    pub fn is_argument_error(&self) -> bool {
        !matches!(self, Error::Resource(_))
    }
}

/// Check that `found` equals `expected`.
pub(crate) fn check_size(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::SizeMismatch { expected, found })
    }
}
