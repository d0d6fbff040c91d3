extern crate ising_anneal;
extern crate rand;

use ising_anneal::gpu::Device;
use ising_anneal::graph::*;
use ising_anneal::system::{
    ChimeraClassicalGpu, ChimeraTransverseGpu, ClassicalIsing, TransverseIsing,
};
use ising_anneal::updater::*;
use ising_anneal::utility::random::Xorshift;
use ising_anneal::utility::schedule::*;
use ising_anneal::Error;
use rand::prelude::*;

fn cell() -> Chimera<f64> {
    let mut g = Chimera::<f64>::new(1, 1, -1.0).unwrap();
    g.set_j(0, 0, 0, ChimeraDir::In1or5, 0.5).unwrap();
    g.set_j(0, 0, 2, ChimeraDir::In3or7, 0.8).unwrap();
    for i in 0..8 {
        g.set_h(0, 0, i, 0.1 * i as f64 - 0.35).unwrap();
    }
    g
}

fn exact_mean_energy(g: &Chimera<f64>, beta: f64) -> f64 {
    let (mut z, mut e) = (0.0, 0.0);
    for bits in 0..(1u32 << 8) {
        let spins = (0..8)
            .map(|i| if bits >> i & 1 == 1 { 1 } else { -1 })
            .collect::<Vec<_>>();
        let energy = g.calc_energy(&spins);
        let w = (-beta * energy).exp();
        z += w;
        e += w * energy;
    }
    e / z
}

#[test]
fn device_sweeps_sample_boltzmann() {
    let g = cell();
    let beta = 0.3;
    let exact = exact_mean_energy(&g, beta);
    let dev = Device::with_threads(0, 2).unwrap();
    let param = ClassicalUpdaterParameter::new(beta);

    let (mut gpu_sum, mut cpu_sum, mut n) = (0.0, 0.0, 0);
    for seed in 0..4u64 {
        let mut rng = Xorshift::new(seed);
        let start = g.gen_spin(&mut rng);
        let mut gpu = ChimeraClassicalGpu::<f64, 1, 1>::new(&dev, &g, &start, seed).unwrap();
        let mut cpu = ClassicalIsing::new(&g, start).unwrap();
        let mut single = SingleSpinFlip::default();
        for step in 0..5000 {
            Gpu.update(&mut gpu, &mut rng, &param);
            single.update(&mut cpu, &mut rng, &param);
            if step >= 100 {
                gpu_sum += gpu.energy();
                cpu_sum += cpu.energy();
                n += 1;
            }
        }
    }
    let (gpu_mean, cpu_mean) = (gpu_sum / n as f64, cpu_sum / n as f64);
    assert!((gpu_mean - exact).abs() < 0.15, "{} vs {}", gpu_mean, exact);
    assert!((cpu_mean - exact).abs() < 0.15, "{} vs {}", cpu_mean, exact);
}

#[test]
fn device_trotter_sweeps_match_sequential() {
    let g = cell();
    let dev = Device::with_threads(0, 2).unwrap();
    let param = TransverseFieldUpdaterParameter::new(1.0, 0.5);
    let mean_slice_energy =
        |energies: Vec<f64>| energies.iter().sum::<f64>() / energies.len() as f64;

    let (mut gpu_sum, mut cpu_sum, mut n) = (0.0, 0.0, 0);
    for seed in 0..3u64 {
        let mut rng = Xorshift::new(100 + seed);
        let start = (0..4)
            .map(|_| g.gen_spin(&mut rng))
            .collect::<TrotterSpins>();
        let mut gpu = ChimeraTransverseGpu::<f64, 1, 1, 2>::new(&dev, &g, &start, 1.0, seed)
            .unwrap();
        let mut cpu = TransverseIsing::new(&g, start, 1.0).unwrap();
        let mut single = SingleSpinFlip::default();
        for step in 0..8000 {
            Gpu.update(&mut gpu, &mut rng, &param);
            single.update(&mut cpu, &mut rng, &param);
            if step >= 200 {
                gpu_sum += mean_slice_energy(gpu.classical_energies());
                cpu_sum += mean_slice_energy(cpu.classical_energies());
                n += 1;
            }
        }
    }
    let (gpu_mean, cpu_mean) = (gpu_sum / n as f64, cpu_sum / n as f64);
    assert!(
        (gpu_mean - cpu_mean).abs() < 0.4,
        "{} vs {}",
        gpu_mean,
        cpu_mean
    );
}

#[test]
fn allocation_failure_releases_everything() {
    let g = Chimera::<f64>::new(2, 2, -1.0).unwrap();
    let dev = Device::with_threads(0, 1).unwrap().with_memory_limit(64);
    let spins = vec![1; g.size()];
    let res = ChimeraClassicalGpu::<f64, 1, 1>::new(&dev, &g, &spins, 0);
    assert!(matches!(res, Err(Error::Resource(_))));
    assert_eq!(dev.memory_used(), 0);

    let trotter = vec![spins; 2];
    let res = ChimeraTransverseGpu::<f64, 1, 1, 1>::new(&dev, &g, &trotter, 1.0, 0);
    assert!(matches!(res, Err(Error::Resource(_))));
    assert_eq!(dev.memory_used(), 0);
}

#[test]
fn buffers_are_returned_on_drop() {
    let g = Chimera::<f64>::new(2, 2, -1.0).unwrap();
    let dev = Device::with_threads(0, 1).unwrap();
    let spins = vec![-1; g.size()];
    {
        let sys = ChimeraClassicalGpu::<f64, 2, 2>::new(&dev, &g, &spins, 0).unwrap();
        assert!(dev.memory_used() > 0);
        assert_eq!(sys.spins(), spins);
    }
    assert_eq!(dev.memory_used(), 0);
    assert!(dev.transfer_stats().peak_memory > 0);
}

#[test]
fn layouts_must_tile_the_lattice() {
    let odd = Chimera::<f64>::new(3, 2, -1.0).unwrap();
    let dev = Device::with_threads(0, 1).unwrap();
    let spins = vec![1; odd.size()];
    let res = ChimeraClassicalGpu::<f64, 1, 1>::new(&dev, &odd, &spins, 0);
    assert!(matches!(res, Err(Error::InvalidLattice(_))));

    let g = Chimera::<f64>::new(2, 2, -1.0).unwrap();
    let spins = vec![1; g.size()];
    let res = ChimeraClassicalGpu::<f64, 4, 1>::new(&dev, &g, &spins, 0);
    assert!(matches!(res, Err(Error::InvalidLattice(_))));
    assert_eq!(dev.memory_used(), 0);
}
