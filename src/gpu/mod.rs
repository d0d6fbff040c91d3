//! Data parallel execution of lattice updates.
//!
//! A [`Device`] owns a worker pool and a memory budget. Lattice state lives in
//! [`DeviceBuffer`]s and is updated by checkerboard kernels: one launch per colour,
//! every block of the lattice proposing flips concurrently from the same committed spins.

/// Device handles.
pub mod device;
/// Checkerboard metropolis kernels for chimera lattices.
pub mod kernels;
/// Device buffers and memory accounting.
pub mod memory;

pub use device::Device;
pub use kernels::{chimera_couplings, BlockShape, ChimeraLayout, NUM_COUPLINGS};
pub use memory::{DeviceBuffer, TransferStats};
