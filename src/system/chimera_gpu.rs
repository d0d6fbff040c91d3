use crate::error::{check_size, Error, Result};
use crate::gpu::kernels::{fill_uniform, launch_metropolis, SweepParams};
use crate::gpu::{chimera_couplings, BlockShape, ChimeraLayout, Device, DeviceBuffer};
use crate::graph::{Chimera, FloatType, Graph, Pairwise, Spin, Spins, TrotterSpins, Vartype};
use crate::system::{Classical, System, TransverseField};
use crate::utility::random::Xorshift;
use tracing::debug;

/// Couplings and fields of a chimera graph, resident on a device.
#[derive(Debug)]
struct DeviceGraph<F> {
    couplings: DeviceBuffer<F>,
    fields: DeviceBuffer<F>,
}

impl<F: FloatType> DeviceGraph<F> {
    fn upload(device: &Device, graph: &Chimera<F>) -> Result<Self> {
        let couplings = device.alloc_from_host(&chimera_couplings(graph)?)?;
        let fields = (0..graph.size()).map(|i| graph.field(i)).collect::<Vec<_>>();
        let fields = device.alloc_from_host(&fields)?;
        Ok(Self { couplings, fields })
    }
}

/// Classical spins of a chimera graph updated on a device.
///
/// The lattice is split into blocks of `ROWS_PER_BLOCK x COLS_PER_BLOCK` unit cells, one
/// kernel invocation each.
#[derive(Debug)]
pub struct ChimeraClassicalGpu<
    'g,
    F: FloatType,
    const ROWS_PER_BLOCK: usize,
    const COLS_PER_BLOCK: usize,
> {
    graph: &'g Chimera<F>,
    device: Device,
    layout: ChimeraLayout,
    lattice: DeviceGraph<F>,
    spins: DeviceBuffer<i32>,
    randoms: DeviceBuffer<f64>,
    rng: Xorshift,
}

impl<'g, F: FloatType, const ROWS_PER_BLOCK: usize, const COLS_PER_BLOCK: usize>
    ChimeraClassicalGpu<'g, F, ROWS_PER_BLOCK, COLS_PER_BLOCK>
{
    /// Copy `graph` and `spins` onto `device`. Device random numbers are seeded with `seed`.
    ///
    /// Either every buffer is allocated or none is.
    pub fn new(device: &Device, graph: &'g Chimera<F>, spins: &[Spin], seed: u64) -> Result<Self> {
        check_size(graph.size(), spins.len())?;
        Vartype::Spin.check(spins)?;
        let layout = ChimeraLayout::new(
            1,
            graph.num_row(),
            graph.num_column(),
            BlockShape {
                trotters: 1,
                rows: ROWS_PER_BLOCK,
                cols: COLS_PER_BLOCK,
            },
        )?;
        let lattice = DeviceGraph::upload(device, graph)?;
        let spins = device.alloc_from_host(spins)?;
        let randoms = device.alloc(layout.len())?;
        debug!(
            device_num = device.device_num(),
            sites = layout.len(),
            "classical chimera lattice on device"
        );
        Ok(Self {
            graph,
            device: device.clone(),
            layout,
            lattice,
            spins,
            randoms,
            rng: Xorshift::new(seed),
        })
    }

    /// The graph.
    pub fn graph(&self) -> &'g Chimera<F> {
        self.graph
    }

    /// Device holding the lattice.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Lattice layout.
    pub fn layout(&self) -> &ChimeraLayout {
        &self.layout
    }

    /// Download the configuration.
    pub fn spins(&self) -> Spins {
        self.spins.download()
    }

    /// Upload a new configuration.
    pub fn set_spins(&mut self, spins: &[Spin]) -> Result<()> {
        Vartype::Spin.check(spins)?;
        self.spins.copy_from_host(spins)
    }

    /// Energy of the configuration, downloading it first.
    pub fn energy(&self) -> f64 {
        self.graph.calc_energy(&self.spins()).as_f64()
    }

    /// One sweep at `beta`: refill the random buffer, then one launch per colour.
    pub(crate) fn sweep(&mut self, beta: f64) {
        let params = SweepParams {
            classical_weight: beta,
            log_tanh: 0.0,
        };
        fill_uniform(&self.device, &mut self.randoms, &mut self.rng);
        for color in 0..2 {
            launch_metropolis(
                &self.device,
                &self.layout,
                color,
                &mut self.spins,
                &self.lattice.couplings,
                &self.lattice.fields,
                &self.randoms,
                params,
            );
        }
    }
}

impl<F: FloatType, const R: usize, const C: usize> System for ChimeraClassicalGpu<'_, F, R, C> {
    type Kind = Classical;

    fn num_spins(&self) -> usize {
        self.layout.slice_len()
    }
}

/// Trotterized transverse field model of a chimera graph updated on a device.
///
/// Blocks span `TROTTERS_PER_BLOCK` slices of `ROWS_PER_BLOCK x COLS_PER_BLOCK` unit cells.
/// The number of slices must be even.
#[derive(Debug)]
pub struct ChimeraTransverseGpu<
    'g,
    F: FloatType,
    const ROWS_PER_BLOCK: usize,
    const COLS_PER_BLOCK: usize,
    const TROTTERS_PER_BLOCK: usize,
> {
    graph: &'g Chimera<F>,
    device: Device,
    layout: ChimeraLayout,
    lattice: DeviceGraph<F>,
    spins: DeviceBuffer<i32>,
    randoms: DeviceBuffer<f64>,
    rng: Xorshift,
    gamma: f64,
}

impl<
        'g,
        F: FloatType,
        const ROWS_PER_BLOCK: usize,
        const COLS_PER_BLOCK: usize,
        const TROTTERS_PER_BLOCK: usize,
    > ChimeraTransverseGpu<'g, F, ROWS_PER_BLOCK, COLS_PER_BLOCK, TROTTERS_PER_BLOCK>
{
    /// Copy `graph` and the slices onto `device`. Device random numbers are seeded with `seed`.
    ///
    /// Either every buffer is allocated or none is.
    pub fn new(
        device: &Device,
        graph: &'g Chimera<F>,
        trotter_spins: &TrotterSpins,
        gamma: f64,
        seed: u64,
    ) -> Result<Self> {
        if trotter_spins.len() < 2 {
            return Err(Error::InvalidParameter(format!(
                "need at least 2 trotter slices, got {}",
                trotter_spins.len()
            )));
        }
        if !gamma.is_finite() || gamma < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "transverse field must be finite and non-negative, got {}",
                gamma
            )));
        }
        let layout = ChimeraLayout::new(
            trotter_spins.len(),
            graph.num_row(),
            graph.num_column(),
            BlockShape {
                trotters: TROTTERS_PER_BLOCK,
                rows: ROWS_PER_BLOCK,
                cols: COLS_PER_BLOCK,
            },
        )?;
        let mut flat = Vec::with_capacity(layout.len());
        for slice in trotter_spins {
            check_size(graph.size(), slice.len())?;
            Vartype::Spin.check(slice)?;
            flat.extend_from_slice(slice);
        }
        let lattice = DeviceGraph::upload(device, graph)?;
        let spins = device.alloc_from_host(&flat)?;
        let randoms = device.alloc(layout.len())?;
        debug!(
            device_num = device.device_num(),
            sites = layout.len(),
            trotters = layout.trotters(),
            "transverse chimera lattice on device"
        );
        Ok(Self {
            graph,
            device: device.clone(),
            layout,
            lattice,
            spins,
            randoms,
            rng: Xorshift::new(seed),
            gamma,
        })
    }

    /// The graph.
    pub fn graph(&self) -> &'g Chimera<F> {
        self.graph
    }

    /// Device holding the lattice.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Lattice layout.
    pub fn layout(&self) -> &ChimeraLayout {
        &self.layout
    }

    /// Strength of the transverse field.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Number of slices `M`.
    pub fn num_trotter_slices(&self) -> usize {
        self.layout.trotters()
    }

    /// Download all slices.
    pub fn trotter_spins(&self) -> TrotterSpins {
        self.spins
            .download()
            .chunks(self.layout.slice_len())
            .map(<[Spin]>::to_vec)
            .collect()
    }

    /// Classical energy of every slice, downloading the state first.
    pub fn classical_energies(&self) -> Vec<f64> {
        self.trotter_spins()
            .iter()
            .map(|slice| self.graph.calc_energy(slice).as_f64())
            .collect()
    }

    /// `-1/2 ln tanh(beta Gamma (1 - s) / M)`.
    pub fn trotter_coupling(&self, beta: f64, s: f64) -> f64 {
        -0.5 * self.log_tanh(beta, s)
    }

    fn log_tanh(&self, beta: f64, s: f64) -> f64 {
        let m = self.layout.trotters() as f64;
        (beta * self.gamma * (1.0 - s) / m).tanh().ln()
    }

    /// One sweep at `(beta, s)`: refill the random buffer, then one launch per colour.
    pub(crate) fn sweep(&mut self, beta: f64, s: f64) {
        let params = SweepParams {
            classical_weight: beta * s / self.layout.trotters() as f64,
            log_tanh: self.log_tanh(beta, s),
        };
        fill_uniform(&self.device, &mut self.randoms, &mut self.rng);
        for color in 0..2 {
            launch_metropolis(
                &self.device,
                &self.layout,
                color,
                &mut self.spins,
                &self.lattice.couplings,
                &self.lattice.fields,
                &self.randoms,
                params,
            );
        }
    }
}

impl<F: FloatType, const R: usize, const C: usize, const T: usize> System
    for ChimeraTransverseGpu<'_, F, R, C, T>
{
    type Kind = TransverseField;

    fn num_spins(&self) -> usize {
        self.layout.slice_len()
    }
}
