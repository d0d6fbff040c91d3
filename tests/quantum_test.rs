extern crate ising_anneal;
extern crate rand;

use ising_anneal::algorithm::Algorithm;
use ising_anneal::graph::*;
use ising_anneal::result::Solution;
use ising_anneal::system::{ContinuousTimeIsing, TransverseIsing};
use ising_anneal::updater::*;
use ising_anneal::utility::random::Xorshift;
use ising_anneal::utility::schedule::*;
use rand::prelude::*;

fn frustrated_square() -> Square<f64> {
    let mut g = Square::<f64>::new(4, 4, -1.0).unwrap();
    g.set_j(0, 0, SquareDir::PlusC, 1.0).unwrap();
    g.set_j(2, 1, SquareDir::PlusR, 0.5).unwrap();
    g.set_h(1, 1, 0.3).unwrap();
    g.set_h(3, 2, -0.7).unwrap();
    g
}

#[test]
fn continuous_time_cuts_stay_valid() {
    let g = frustrated_square();
    let mut rng = Xorshift::new(42);
    let spins = g.gen_spin(&mut rng);
    let mut sys = ContinuousTimeIsing::new(&g, &spins, 1.0).unwrap();
    let schedule = make_transverse_field_schedule_list(2.0, 0.01, 1.0, 5, 20).unwrap();
    let mut times = Xorshift::new(7);
    let mut calls = 0;
    Algorithm::run(
        &mut ContinuousTimeSwendsenWang::new(),
        &mut sys,
        &mut rng,
        &schedule,
        |s: &ContinuousTimeIsing, _| {
            calls += 1;
            assert!(s.verify().is_ok(), "{:?}", s.verify());
            let t = times.gen::<f64>();
            let at_t = s.spins_at(t);
            assert_eq!(at_t.len(), 16);
            assert!(at_t.iter().all(|s| *s == 1 || *s == -1));
        },
    );
    assert_eq!(calls, 100);
    assert_eq!(sys.get_solution().len(), 16);
}

#[test]
fn continuous_time_without_field_keeps_one_cut() {
    let g = frustrated_square();
    let mut rng = Xorshift::new(3);
    let spins = g.gen_spin(&mut rng);
    let mut sys = ContinuousTimeIsing::new(&g, &spins, 0.0).unwrap();
    let mut updater = ContinuousTimeSwendsenWang::new();
    for _ in 0..50 {
        updater.update(
            &mut sys,
            &mut rng,
            &TransverseFieldUpdaterParameter::new(1.0, 0.5),
        );
        assert_eq!(sys.num_cuts(), 17);
        assert!(sys.verify().is_ok());
    }
}

/// Average of `observe` over random imaginary times, after a burn in.
fn continuous_time_average<F>(
    sys: &mut ContinuousTimeIsing,
    parameter: &TransverseFieldUpdaterParameter,
    seed: u64,
    mut observe: F,
) -> f64
where
    F: FnMut(&ContinuousTimeIsing, f64) -> f64,
{
    let (burn_in, steps, per_step) = (1000, 20000, 8);
    let mut rng = Xorshift::new(seed);
    let mut updater = ContinuousTimeSwendsenWang::new();
    for _ in 0..burn_in {
        updater.update(sys, &mut rng, parameter);
    }
    let mut total = 0.0;
    for _ in 0..steps {
        updater.update(sys, &mut rng, parameter);
        for _ in 0..per_step {
            let t = rng.gen::<f64>();
            total += observe(sys, t);
        }
    }
    total / (steps * per_step) as f64
}

#[test]
fn continuous_time_single_spin_magnetization() {
    // H = s h sz - (1 - s) Gamma sx at beta = 2, s = 0.5, Gamma = 1.
    let (beta, s, gamma, h) = (2.0f64, 0.5, 1.0, 0.6);
    let g = Dense::<f64>::from_edges(&[], &[h]).unwrap();
    let mut sys = ContinuousTimeIsing::new(&g, &[1], gamma).unwrap();
    let parameter = TransverseFieldUpdaterParameter::new(beta, s);
    let magnetization = |sys: &ContinuousTimeIsing, t: f64| f64::from(sys.spins_at(t)[0]);
    let mean = continuous_time_average(&mut sys, &parameter, 5, magnetization);
    assert!(sys.verify().is_ok());

    let (hz, hx) = (s * h, (1.0 - s) * gamma);
    let e = (hz * hz + hx * hx).sqrt();
    let exact = -(hz / e) * (beta * e).tanh();
    assert!((mean - exact).abs() < 0.03, "{} vs {}", mean, exact);
}

#[test]
fn continuous_time_pair_energy() {
    // H = s J sz sz - (1 - s) Gamma (sx + sx); the even sector mixes
    // |uu> + |dd> with |ud> + |du> through 2 (1 - s) Gamma.
    let (beta, s, gamma, j) = (2.0f64, 0.5, 1.0, -1.0);
    let g = Dense::<f64>::from_edges(&[((0, 1), j)], &[0.0, 0.0]).unwrap();
    let mut sys = ContinuousTimeIsing::new(&g, &[1, -1], gamma).unwrap();
    let parameter = TransverseFieldUpdaterParameter::new(beta, s);
    let energy = |sys: &ContinuousTimeIsing, t: f64| sys.classical_energy_at(t);
    let mean = continuous_time_average(&mut sys, &parameter, 9, energy);
    assert!(sys.verify().is_ok());

    let a = s * j;
    let r = (a * a + 4.0 * (1.0 - s) * (1.0 - s) * gamma * gamma).sqrt();
    let zz = -((a / r) * (beta * r).sinh() + (beta * a).sinh())
        / ((beta * r).cosh() + (beta * a).cosh());
    let exact = j * zz;
    assert!((mean - exact).abs() < 0.03, "{} vs {}", mean, exact);
}

#[test]
fn solution_is_the_best_slice() {
    let g = frustrated_square();
    let mut rng = Xorshift::new(11);
    let mut sys = TransverseIsing::random(&g, 1.0, 8, &mut rng).unwrap();
    let schedule = make_transverse_field_schedule_list(5.0, 0.05, 1.0, 10, 20).unwrap();
    let mut updater = SingleSpinFlip::default();
    Algorithm::run_silent(&mut updater, &mut sys, &mut rng, &schedule);
    let solution = sys.get_solution();
    let best = sys
        .classical_energies()
        .into_iter()
        .fold(f64::INFINITY, f64::min);
    assert_eq!(g.energy(&solution).unwrap(), best);
}

#[test]
fn trotter_coupling_follows_parameters() {
    let g = frustrated_square();
    let mut sys = TransverseIsing::from_classical(&g, &[1; 16], 1.0, 4).unwrap();
    let before = sys.trotter_coupling(2.0, 0.5);
    let expected = -0.5 * (2.0f64 * 1.0 * 0.5 / 4.0).tanh().ln();
    assert!((before - expected).abs() < 1e-12);
    sys.set_gamma(2.0).unwrap();
    assert!(sys.trotter_coupling(2.0, 0.5) < before);
    assert!(sys.set_gamma(-1.0).is_err());
}
