use crate::error::{check_size, Result};
use crate::graph::{FloatType, Graph, Index, Polynomial, Vartype};
use crate::system::{Classical, System};
use rand::Rng;

/// Per term bookkeeping of a polynomial configuration.
///
/// `signs[k]` is the product of the term's variables written as spins (`2x - 1` for
/// binaries) and `zero_counts[k]` counts the variables at the vanishing value, `-1` for
/// spins or `0` for binaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermCache {
    /// Spin product per term.
    pub signs: Vec<i8>,
    /// Vanishing variables per term.
    pub zero_counts: Vec<u32>,
}

impl TermCache {
    /// Count from scratch.
    pub fn from_values<F: FloatType>(poly: &Polynomial<F>, values: &[i32]) -> Self {
        let vanishing = poly.vartype().vanishing_value();
        let (signs, zero_counts) = (0..poly.num_terms())
            .map(|k| {
                let zeros = poly
                    .key(k)
                    .iter()
                    .filter(|v| values[**v] == vanishing)
                    .count() as u32;
                (if zeros % 2 == 0 { 1 } else { -1 }, zeros)
            })
            .unzip();
        Self { signs, zero_counts }
    }

    /// Cache after flipping one variable which appears in `touching_terms`.
    /// `becomes_vanishing` says whether its new value is the vanishing one.
    pub fn flip(mut self, touching_terms: &[usize], becomes_vanishing: bool) -> Self {
        for k in touching_terms {
            self.signs[*k] = -self.signs[*k];
            if becomes_vanishing {
                self.zero_counts[*k] += 1;
            } else {
                self.zero_counts[*k] -= 1;
            }
        }
        self
    }
}

/// Spins or binaries on a borrowed polynomial graph.
#[derive(Debug, Clone)]
pub struct ClassicalIsingPolynomial<'g, F: FloatType> {
    poly: &'g Polynomial<F>,
    values: Vec<i32>,
    cache: TermCache,
}

impl<'g, F: FloatType> ClassicalIsingPolynomial<'g, F> {
    /// Bind `values`, encoded per the graph's vartype.
    pub fn new(poly: &'g Polynomial<F>, values: Vec<i32>) -> Result<Self> {
        check_size(poly.size(), values.len())?;
        poly.vartype().check(&values)?;
        let cache = TermCache::from_values(poly, &values);
        Ok(Self {
            poly,
            values,
            cache,
        })
    }

    /// Bind a random configuration.
    pub fn random<R: Rng + ?Sized>(poly: &'g Polynomial<F>, rng: &mut R) -> Self {
        let values = match poly.vartype() {
            Vartype::Spin => poly.gen_spin(rng),
            Vartype::Binary => poly.gen_binary(rng),
        };
        let cache = TermCache::from_values(poly, &values);
        Self {
            poly,
            values,
            cache,
        }
    }

    /// The graph.
    pub fn graph(&self) -> &'g Polynomial<F> {
        self.poly
    }

    /// Variable encoding.
    pub fn vartype(&self) -> Vartype {
        self.poly.vartype()
    }

    /// Current configuration.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// The term cache.
    pub fn cache(&self) -> &TermCache {
        &self.cache
    }

    /// Energy of the current configuration.
    pub fn energy(&self) -> f64 {
        self.poly.calc_energy(&self.values).as_f64()
    }

    /// Energy change of flipping spin `i`.
    pub fn de_for_spin(&self, i: Index) -> f64 {
        self.poly
            .adj_terms(i)
            .iter()
            .map(|k| {
                -2.0 * self.poly.value(*k).as_f64() * f64::from(self.cache.signs[*k])
            })
            .sum()
    }

    /// Energy change of flipping binary `i`.
    pub fn de_for_binary(&self, i: Index) -> f64 {
        let terms = self.poly.adj_terms(i);
        if self.values[i] == 1 {
            -terms
                .iter()
                .filter(|k| self.cache.zero_counts[**k] == 0)
                .map(|k| self.poly.value(*k).as_f64())
                .sum::<f64>()
        } else {
            terms
                .iter()
                .filter(|k| self.cache.zero_counts[**k] == 1)
                .map(|k| self.poly.value(*k).as_f64())
                .sum::<f64>()
        }
    }

    /// Energy change of flipping variable `i`.
    #[inline]
    pub fn de(&self, i: Index) -> f64 {
        match self.poly.vartype() {
            Vartype::Spin => self.de_for_spin(i),
            Vartype::Binary => self.de_for_binary(i),
        }
    }

    /// Flip variable `i`.
    pub fn flip(&mut self, i: Index) {
        let vartype = self.poly.vartype();
        let new = vartype.flipped(self.values[i]);
        self.values[i] = new;
        let cache = std::mem::take(&mut self.cache);
        self.cache = cache.flip(self.poly.adj_terms(i), new == vartype.vanishing_value());
    }

    /// Recount the cache from the configuration.
    pub fn reset_cache(&mut self) {
        self.cache = TermCache::from_values(self.poly, &self.values);
    }

    /// Upper bound on `|dE|` of any single flip.
    pub fn max_de(&self) -> f64 {
        let factor = self.flip_factor();
        (0..self.poly.size())
            .map(|i| {
                self.poly
                    .adj_terms(i)
                    .iter()
                    .map(|k| factor * self.poly.value(*k).as_f64().abs())
                    .sum::<f64>()
            })
            .fold(0.0, f64::max)
    }

    /// Smallest non-zero `|dE|` a single term can contribute.
    pub fn min_de(&self) -> f64 {
        let factor = self.flip_factor();
        let min = self
            .poly
            .terms()
            .filter(|(key, j)| !key.is_empty() && !j.is_zero())
            .map(|(_, j)| factor * j.as_f64().abs())
            .fold(f64::INFINITY, f64::min);
        if min.is_finite() {
            min
        } else {
            0.0
        }
    }

    fn flip_factor(&self) -> f64 {
        match self.poly.vartype() {
            Vartype::Spin => 2.0,
            Vartype::Binary => 1.0,
        }
    }
}

impl<F: FloatType> System for ClassicalIsingPolynomial<'_, F> {
    type Kind = Classical;

    fn num_spins(&self) -> usize {
        self.poly.size()
    }
}
