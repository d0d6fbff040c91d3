use crate::graph::{FloatType, Pairwise};
use crate::system::{ClassicalIsing, ClassicalIsingPolynomial, TransverseIsing};
use crate::updater::{accept_action, metropolis_accept, UpdateMethod, Updater};
use crate::utility::schedule::{ClassicalUpdaterParameter, TransverseFieldUpdaterParameter};
use rand::Rng;

/// One Metropolis proposal per site per call.
#[derive(Debug, Clone, Default)]
pub struct SingleSpinFlip {
    method: UpdateMethod,
    order: Vec<usize>,
}

impl SingleSpinFlip {
    /// Visit sites in the order given by `method`.
    pub fn new(method: UpdateMethod) -> Self {
        Self {
            method,
            order: vec![],
        }
    }

    /// Visiting order.
    pub fn method(&self) -> UpdateMethod {
        self.method
    }
}

impl<G: Pairwise> Updater<ClassicalIsing<'_, G>> for SingleSpinFlip {
    fn update<R: Rng + ?Sized>(
        &mut self,
        system: &mut ClassicalIsing<'_, G>,
        rng: &mut R,
        parameter: &ClassicalUpdaterParameter,
    ) {
        let n = system.graph().size();
        self.method.visit_order(n, &mut self.order, rng);
        for i in self.order.iter().cloned() {
            if metropolis_accept(rng, parameter.beta, system.de(i)) {
                system.flip(i);
            }
        }
    }
}

impl<F: FloatType> Updater<ClassicalIsingPolynomial<'_, F>> for SingleSpinFlip {
    fn update<R: Rng + ?Sized>(
        &mut self,
        system: &mut ClassicalIsingPolynomial<'_, F>,
        rng: &mut R,
        parameter: &ClassicalUpdaterParameter,
    ) {
        let n = system.values().len();
        self.method.visit_order(n, &mut self.order, rng);
        for i in self.order.iter().cloned() {
            if metropolis_accept(rng, parameter.beta, system.de(i)) {
                system.flip(i);
            }
        }
    }
}

impl<G: Pairwise> Updater<TransverseIsing<'_, G>> for SingleSpinFlip {
    /// Proposals act on one site of one slice. The action change is
    /// `(beta s / M) dE - s_i^t (s_i^{t+1} + s_i^{t-1}) ln tanh(beta Gamma (1 - s) / M)`.
    fn update<R: Rng + ?Sized>(
        &mut self,
        system: &mut TransverseIsing<'_, G>,
        rng: &mut R,
        parameter: &TransverseFieldUpdaterParameter,
    ) {
        let TransverseFieldUpdaterParameter { beta, s } = *parameter;
        let n = system.graph().size();
        let m = system.num_trotter_slices();
        let classical_weight = beta * s / m as f64;
        let log_tanh = system.log_tanh(beta, s);
        self.method.visit_order(n * m, &mut self.order, rng);
        for site in self.order.iter().cloned() {
            let (t, i) = (site / n, site % n);
            let de = system.de_classical(t, i);
            let neighbors = system.trotter_neighbors_sum(t, i);
            // Avoid 0 * inf when the field vanishes.
            let trotter = if neighbors == 0 {
                0.0
            } else {
                -f64::from(system.slice(t)[i] * neighbors) * log_tanh
            };
            if accept_action(rng, classical_weight * de + trotter) {
                system.flip(t, i);
            }
        }
    }
}
