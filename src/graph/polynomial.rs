use crate::error::{Error, Result};
use crate::graph::{FloatType, Graph, Index, Vartype};
use crate::utility::vec_help::canonicalize_key;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Sorted site indices of one polynomial term.
pub type PolyKey = SmallVec<[Index; 4]>;

/// A graph of arbitrary order interactions `E(x) = sum_k J_k prod_{v in k} x_v`.
///
/// Keys are canonicalized on insertion: sorted, with `x*x = x` for binary variables
/// and `s*s = 1` for spins. Two terms with the same canonical key are rejected.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Polynomial<F: FloatType = f64> {
    num_spins: usize,
    vartype: Vartype,
    keys: Vec<PolyKey>,
    values: Vec<F>,
    // For each site, the terms which contain it.
    adj: Vec<Vec<usize>>,
}

impl<F: FloatType> Polynomial<F> {
    /// Make an empty polynomial over `num_spins` variables.
    pub fn new(num_spins: usize, vartype: Vartype) -> Self {
        Self {
            num_spins,
            vartype,
            keys: vec![],
            values: vec![],
            adj: vec![vec![]; num_spins],
        }
    }

    /// Make a polynomial from `(key, coefficient)` pairs.
    pub fn from_terms<I, K>(num_spins: usize, vartype: Vartype, terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, F)>,
        K: AsRef<[Index]>,
    {
        let mut poly = Self::new(num_spins, vartype);
        let mut seen = HashSet::new();
        for (key, value) in terms {
            let key = poly.canonical(key.as_ref())?;
            if !seen.insert(key.clone()) {
                return Err(Error::DuplicateTerm(key.to_vec()));
            }
            poly.push_term(key, value);
        }
        Ok(poly)
    }

    fn canonical(&self, key: &[Index]) -> Result<PolyKey> {
        if let Some(bad) = key.iter().find(|i| **i >= self.num_spins) {
            return Err(Error::out_of_bounds(
                "polynomial variable",
                *bad,
                self.num_spins,
            ));
        }
        let mut key = PolyKey::from_slice(key);
        canonicalize_key(&mut key, self.vartype);
        Ok(key)
    }

    fn push_term(&mut self, key: PolyKey, value: F) {
        let k = self.keys.len();
        key.iter().for_each(|i| self.adj[*i].push(k));
        self.keys.push(key);
        self.values.push(value);
    }

    /// Add a single term. This scans the existing terms for duplicates.
    pub fn add_term(&mut self, key: &[Index], value: F) -> Result<usize> {
        let key = self.canonical(key)?;
        if self.keys.iter().any(|k| *k == key) {
            return Err(Error::DuplicateTerm(key.to_vec()));
        }
        self.push_term(key, value);
        Ok(self.keys.len() - 1)
    }

    /// Number of terms.
    pub fn num_terms(&self) -> usize {
        self.keys.len()
    }

    /// Canonical key of term `k`.
    pub fn key(&self, k: usize) -> &[Index] {
        &self.keys[k]
    }

    /// Coefficient of term `k`.
    pub fn value(&self, k: usize) -> F {
        self.values[k]
    }

    /// Iterate over `(key, coefficient)`.
    pub fn terms(&self) -> impl Iterator<Item = (&[Index], F)> + '_ {
        self.keys
            .iter()
            .map(|k| k.as_slice())
            .zip(self.values.iter().cloned())
    }

    /// Indices of the terms containing site `i`.
    pub fn adj_terms(&self, i: Index) -> &[usize] {
        &self.adj[i]
    }

    /// Highest order among the terms.
    pub fn max_order(&self) -> usize {
        self.keys.iter().map(|k| k.len()).max().unwrap_or(0)
    }
}

impl<F: FloatType> Graph for Polynomial<F> {
    type Float = F;

    fn size(&self) -> usize {
        self.num_spins
    }

    fn vartype(&self) -> Vartype {
        self.vartype
    }

    fn calc_energy(&self, values: &[i32]) -> F {
        self.terms().fold(F::zero(), |acc, (key, j)| {
            let prod = key.iter().map(|i| values[*i]).product::<i32>();
            match prod {
                0 => acc,
                1 => acc + j,
                _ => acc - j,
            }
        })
    }
}
