#![feature(test)]

extern crate ising_anneal;
extern crate test;

use ising_anneal::graph::{Chimera, Square, SquareDir};

fn frustrated_square(l: usize) -> Square<f64> {
    let mut g = Square::<f64>::new(l, l, -1.0).unwrap();
    for r in 0..l as isize {
        for c in (0..l as isize).step_by(2) {
            g.set_j(r, c, SquareDir::PlusR, 1.0).unwrap();
        }
    }
    g
}

fn chimera(l: usize) -> Chimera<f64> {
    Chimera::<f64>::new(l, l, -1.0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ising_anneal::algorithm::Algorithm;
    use ising_anneal::gpu::Device;
    use ising_anneal::graph::Graph;
    use ising_anneal::system::*;
    use ising_anneal::updater::*;
    use ising_anneal::utility::random::Xorshift;
    use ising_anneal::utility::schedule::*;
    use test::Bencher;

    #[bench]
    fn single_flip_square(b: &mut Bencher) {
        let g = frustrated_square(16);
        let mut rng = Xorshift::new(1234);
        let mut sys = ClassicalIsing::random(&g, &mut rng);
        let schedule = make_classical_schedule_list(0.1, 10.0, 10, 10).unwrap();
        let mut updater = SingleSpinFlip::default();
        b.iter(|| {
            Algorithm::run_silent(&mut updater, &mut sys, &mut rng, &schedule);
        })
    }

    #[bench]
    fn swendsen_wang_square(b: &mut Bencher) {
        let g = frustrated_square(16);
        let mut rng = Xorshift::new(1234);
        let mut sys = ClassicalIsing::random(&g, &mut rng);
        let schedule = make_classical_schedule_list(0.1, 10.0, 10, 10).unwrap();
        let mut updater = SwendsenWang::new();
        b.iter(|| {
            Algorithm::run_silent(&mut updater, &mut sys, &mut rng, &schedule);
        })
    }

    #[bench]
    fn trotter_square(b: &mut Bencher) {
        let g = frustrated_square(8);
        let mut rng = Xorshift::new(1234);
        let mut sys = TransverseIsing::random(&g, 1.0, 16, &mut rng).unwrap();
        let schedule = make_transverse_field_schedule_list(5.0, 0.01, 1.0, 10, 10).unwrap();
        let mut updater = SingleSpinFlip::default();
        b.iter(|| {
            Algorithm::run_silent(&mut updater, &mut sys, &mut rng, &schedule);
        })
    }

    #[bench]
    fn continuous_time_square(b: &mut Bencher) {
        let g = frustrated_square(8);
        let mut rng = Xorshift::new(1234);
        let spins = g.gen_spin(&mut rng);
        let mut sys = ContinuousTimeIsing::new(&g, &spins, 1.0).unwrap();
        let schedule = make_transverse_field_schedule_list(5.0, 0.01, 1.0, 10, 10).unwrap();
        let mut updater = ContinuousTimeSwendsenWang::new();
        b.iter(|| {
            Algorithm::run_silent(&mut updater, &mut sys, &mut rng, &schedule);
        })
    }

    #[bench]
    fn device_chimera(b: &mut Bencher) {
        let g = chimera(8);
        let dev = Device::new(0).unwrap();
        let mut rng = Xorshift::new(1234);
        let spins = g.gen_spin(&mut rng);
        let trotter = vec![spins; 16];
        let mut sys = ChimeraTransverseGpu::<f64, 2, 2, 4>::new(&dev, &g, &trotter, 1.0, 1234)
            .unwrap();
        let schedule = make_transverse_field_schedule_list(5.0, 0.01, 1.0, 10, 10).unwrap();
        b.iter(|| {
            Algorithm::run_silent(&mut Gpu, &mut sys, &mut rng, &schedule);
        })
    }
}
