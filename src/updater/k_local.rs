use crate::error::{Error, Result};
use crate::graph::{FloatType, Vartype};
use crate::system::ClassicalIsingPolynomial;
use crate::updater::{metropolis_accept, Updater};
use crate::utility::schedule::ClassicalUpdaterParameter;
use rand::Rng;
use std::cmp::Ordering;

/// Single flips plus whole term moves for binary polynomial problems.
///
/// A variable at `0` whose flip costs nothing is often trapped behind a term that only
/// pays off once all of its variables are `1`. On the first call and every
/// `rate_call_k_local`-th call after it, such a variable instead tries to raise all
/// variables of one of its negative terms at once, most negative first, accepting on the
/// total energy change. The first accepted term ends the attempt; if every term is
/// rejected the variable gets one ordinary single flip proposal. Spin problems only get
/// single flips.
#[derive(Debug, Clone)]
pub struct KLocal {
    rate_call_k_local: usize,
    count_call_updater: usize,
    terms: Vec<usize>,
    raised: Vec<usize>,
}

impl KLocal {
    /// Attempt term moves on every `rate_call_k_local`-th call.
    pub fn new(rate_call_k_local: usize) -> Result<Self> {
        if rate_call_k_local == 0 {
            return Err(Error::InvalidParameter(
                "rate_call_k_local must be positive".to_string(),
            ));
        }
        Ok(Self {
            rate_call_k_local,
            count_call_updater: 0,
            terms: vec![],
            raised: vec![],
        })
    }

    /// Calls between term moves.
    pub fn rate_call_k_local(&self) -> usize {
        self.rate_call_k_local
    }

    /// Calls so far.
    pub fn count_call_updater(&self) -> usize {
        self.count_call_updater
    }

    /// Try the negative terms touching `i`. Returns true once one is accepted, otherwise
    /// the configuration is left as it was.
    fn try_terms<F: FloatType, R: Rng + ?Sized>(
        &mut self,
        system: &mut ClassicalIsingPolynomial<'_, F>,
        rng: &mut R,
        beta: f64,
        i: usize,
    ) -> bool {
        let poly = system.graph();
        self.terms.clear();
        self.terms.extend(
            poly.adj_terms(i)
                .iter()
                .cloned()
                .filter(|k| poly.value(*k) < F::zero()),
        );
        self.terms.sort_by(|a, b| {
            poly.value(*a)
                .partial_cmp(&poly.value(*b))
                .unwrap_or(Ordering::Equal)
        });
        for k in self.terms.iter().cloned() {
            self.raised.clear();
            let mut de = 0.0;
            for v in poly.key(k).iter().cloned() {
                if system.values()[v] == 0 {
                    de += system.de_for_binary(v);
                    system.flip(v);
                    self.raised.push(v);
                }
            }
            if metropolis_accept(rng, beta, de) {
                return true;
            }
            for v in self.raised.iter().rev() {
                system.flip(*v);
            }
        }
        false
    }
}

impl<F: FloatType> Updater<ClassicalIsingPolynomial<'_, F>> for KLocal {
    fn update<R: Rng + ?Sized>(
        &mut self,
        system: &mut ClassicalIsingPolynomial<'_, F>,
        rng: &mut R,
        parameter: &ClassicalUpdaterParameter,
    ) {
        let beta = parameter.beta;
        let binary = system.vartype() == Vartype::Binary;
        let term_moves = binary && self.count_call_updater % self.rate_call_k_local == 0;
        self.count_call_updater += 1;
        let poly = system.graph();
        for i in 0..system.values().len() {
            if poly.adj_terms(i).is_empty() {
                continue;
            }
            let de = system.de(i);
            if term_moves
                && de == 0.0
                && system.values()[i] == 0
                && self.try_terms(system, rng, beta, i)
            {
                continue;
            }
            if metropolis_accept(rng, beta, de) {
                system.flip(i);
            }
        }
    }
}
