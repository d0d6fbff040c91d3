extern crate ising_anneal;
extern crate rand;
extern crate rand_chacha;

use ising_anneal::graph::*;
use ising_anneal::system::{ClassicalIsing, ClassicalIsingPolynomial};
use ising_anneal::updater::*;
use ising_anneal::utility::random::Xorshift;
use ising_anneal::utility::schedule::ClassicalUpdaterParameter;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

fn random_sparse<R: Rng>(n: usize, rng: &mut R) -> Sparse<f64> {
    let mut edges = vec![];
    for i in 0..n {
        for j in i + 1..n {
            if rng.gen_bool(0.4) {
                edges.push(((i, j), rng.gen_range(-1.0..1.0)));
            }
        }
    }
    let fields = (0..n).map(|_| rng.gen_range(-0.5..0.5)).collect::<Vec<_>>();
    Sparse::from_edges(&edges, &fields).unwrap()
}

fn random_polynomial<R: Rng>(n: usize, vartype: Vartype, rng: &mut R) -> Polynomial<f64> {
    let mut terms = BTreeMap::new();
    for _ in 0..20 {
        let order = rng.gen_range(1..=4);
        let mut key = rand::seq::index::sample(rng, n, order).into_vec();
        key.sort_unstable();
        terms.insert(key, rng.gen_range(-1.0..1.0));
    }
    Polynomial::from_terms(n, vartype, terms).unwrap()
}

#[test]
fn single_flip_deltas_match_recount() {
    for seed in 0..3 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let g = random_sparse(12, &mut rng);
        let mut engine = Xorshift::new(seed);
        let mut sys = ClassicalIsing::random(&g, &mut engine);
        let mut updater = SingleSpinFlip::new(UpdateMethod::Random);
        for _ in 0..50 {
            updater.update(&mut sys, &mut engine, &ClassicalUpdaterParameter::new(0.7));
        }
        let spins = sys.spins().to_vec();
        let e = g.energy(&spins).unwrap();
        assert!((sys.energy() - e).abs() < 1e-9);
        for i in 0..spins.len() {
            let mut flipped = spins.clone();
            flipped[i] = -flipped[i];
            let de = g.energy(&flipped).unwrap() - e;
            assert!(
                (sys.de(i) - de).abs() < 1e-9,
                "site {}: {} vs {}",
                i,
                sys.de(i),
                de
            );
        }
    }
}

fn boltzmann(g: &Dense<f64>, beta: f64) -> Vec<(Spins, f64)> {
    let states = vec![vec![1, 1], vec![1, -1], vec![-1, 1], vec![-1, -1]];
    let weights = states
        .iter()
        .map(|s| (-beta * g.calc_energy(s)).exp())
        .collect::<Vec<_>>();
    let z = weights.iter().sum::<f64>();
    states
        .into_iter()
        .zip(weights.into_iter().map(|w| w / z))
        .collect()
}

fn check_frequencies<U>(mut updater: U, seed: u64)
where
    U: for<'a> Updater<ClassicalIsing<'a, Dense<f64>>>,
{
    let g = Dense::from_edges(&[((0, 1), 0.5)], &[0.3, -0.2]).unwrap();
    let beta = 1.0;
    let mut rng = Xorshift::new(seed);
    let mut sys = ClassicalIsing::new(&g, vec![1, 1]).unwrap();
    let samples = 200_000;
    let mut counts = BTreeMap::new();
    for _ in 0..samples {
        updater.update(&mut sys, &mut rng, &ClassicalUpdaterParameter::new(beta));
        *counts.entry(sys.spins().to_vec()).or_insert(0usize) += 1;
    }
    for (state, p) in boltzmann(&g, beta) {
        let freq = counts.get(&state).cloned().unwrap_or(0) as f64 / samples as f64;
        assert!((freq - p).abs() < 0.01, "{:?}: {} vs {}", state, freq, p);
    }
}

#[test]
fn single_flip_samples_boltzmann() {
    check_frequencies(SingleSpinFlip::default(), 1);
    check_frequencies(SingleSpinFlip::new(UpdateMethod::Random), 2);
}

#[test]
fn swendsen_wang_samples_boltzmann() {
    check_frequencies(SwendsenWang::new(), 3);
}

#[test]
fn polynomial_cache_survives_long_runs() {
    for (seed, vartype) in [(0, Vartype::Spin), (1, Vartype::Binary)] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let poly = random_polynomial(8, vartype, &mut rng);
        let mut engine = Xorshift::new(seed);
        let mut sys = ClassicalIsingPolynomial::random(&poly, &mut engine);
        let mut updater = SingleSpinFlip::new(UpdateMethod::Random);
        let mut k_local = KLocal::new(3).unwrap();
        for step in 0..150 {
            let param = ClassicalUpdaterParameter::new(1.0);
            if step % 2 == 0 {
                updater.update(&mut sys, &mut engine, &param);
            } else {
                k_local.update(&mut sys, &mut engine, &param);
            }
        }
        let cache = sys.cache().clone();
        let mut fresh = sys.clone();
        fresh.reset_cache();
        assert_eq!(&cache, fresh.cache());

        let e = poly.energy(sys.values()).unwrap();
        assert!((sys.energy() - e).abs() < 1e-9);
        for i in 0..8 {
            let mut flipped = sys.clone();
            flipped.flip(i);
            assert!((flipped.energy() - e - sys.de(i)).abs() < 1e-9);
        }
    }
}
