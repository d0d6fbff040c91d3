#![deny(
    missing_docs,
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

//! `ising_anneal` is a library for classical and quantum annealing of ising models
//! using monte carlo methods.
//!
//! Problems are described by a graph (dense, sparse, polynomial, square or chimera
//! lattices). A system binds a configuration to a graph, an updater moves it, and an
//! annealing schedule tells the updater which temperature or transverse field to use.
//!
//! - classical systems take single spin flips, swendsen-wang or k-local moves.
//! - transverse field systems use discrete trotter slices or continuous imaginary time.
//! - chimera lattices can be swept in parallel on a `gpu::Device`.
//!
//! Graph and schedule serialization using serde is behind the `serialize` feature.
//!
//! # Classical Annealing Example
//! ```
//! use ising_anneal::algorithm::Algorithm;
//! use ising_anneal::graph::Sparse;
//! use ising_anneal::result::Solution;
//! use ising_anneal::system::ClassicalIsing;
//! use ising_anneal::updater::SingleSpinFlip;
//! use ising_anneal::utility::random::Xorshift;
//! use ising_anneal::utility::schedule::make_classical_schedule_list;
//!
//! // H = J_ij s_i s_j + h_i s_i
//! let edges = vec![
//!   ((0, 1), -1.0), // ((i, j), J)
//!   ((1, 2), -1.0),
//!   ((2, 3), -1.0),
//!   ((3, 0), -1.0)
//! ];
//! let fields = vec![0.5; 4];
//! let graph = Sparse::from_edges(&edges, &fields).unwrap();
//!
//! let mut rng = Xorshift::new(1234);
//! let mut system = ClassicalIsing::random(&graph, &mut rng);
//! let schedule = make_classical_schedule_list(0.1, 10.0, 10, 20).unwrap();
//!
//! Algorithm::run_silent(&mut SingleSpinFlip::default(), &mut system, &mut rng, &schedule);
//! assert_eq!(system.get_solution(), vec![-1, -1, -1, -1]);
//! ```

/// Running updaters over annealing schedules.
pub mod algorithm;
/// Error types.
pub mod error;
/// Data-parallel execution of lattice sweeps.
pub mod gpu;
/// Problem graphs.
pub mod graph;
/// Solutions of finished runs.
pub mod result;
/// System states.
pub mod system;
/// Monte Carlo updaters.
pub mod updater;
/// Schedules, random numbers and other helpers.
pub mod utility;

pub use error::{Error, Result};
