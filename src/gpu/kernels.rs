use crate::error::{Error, Result};
use crate::gpu::device::Device;
use crate::gpu::memory::DeviceBuffer;
use crate::graph::{Chimera, ChimeraDir, FloatType, CHIMERA_UNITSIZE};
use crate::utility::fmath;
use crate::utility::random::Xorshift;
use itertools::iproduct;
use rayon::prelude::*;

/// Couplings stored per site: outer minus, outer plus, then the four sites of the other half.
pub const NUM_COUPLINGS: usize = 6;

/// Extent of one block, in unit cells and trotter slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockShape {
    /// Trotter slices per block.
    pub trotters: usize,
    /// Unit cell rows per block.
    pub rows: usize,
    /// Unit cell columns per block.
    pub cols: usize,
}

/// Shape of a (possibly trotterized) chimera lattice stored on a device.
///
/// Site `(t, r, c, i)` lives at `((t * rows + r) * cols + c) * 8 + i` and is coloured
/// `(t + r + c + i / 4) % 2`. No two sites of one colour are coupled as long as every
/// wrapped extent is even, or one where the wrapped bond is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChimeraLayout {
    trotters: usize,
    rows: usize,
    cols: usize,
    block: BlockShape,
}

fn check_extent(what: &str, extent: usize, per_block: usize) -> Result<()> {
    if extent == 0 || per_block == 0 {
        return Err(Error::InvalidLattice(format!(
            "{} extent {} and block size {} must be positive",
            what, extent, per_block
        )));
    }
    if extent % per_block != 0 {
        return Err(Error::InvalidLattice(format!(
            "{} extent {} is not divisible by block size {}",
            what, extent, per_block
        )));
    }
    if extent != 1 && extent % 2 != 0 {
        return Err(Error::InvalidLattice(format!(
            "{} extent {} must be even for the checkerboard",
            what, extent
        )));
    }
    Ok(())
}

impl ChimeraLayout {
    /// Check the lattice against the block shape and the checkerboard.
    pub fn new(trotters: usize, rows: usize, cols: usize, block: BlockShape) -> Result<Self> {
        check_extent("trotter", trotters, block.trotters)?;
        check_extent("row", rows, block.rows)?;
        check_extent("column", cols, block.cols)?;
        Ok(Self {
            trotters,
            rows,
            cols,
            block,
        })
    }

    /// Trotter slices.
    pub fn trotters(&self) -> usize {
        self.trotters
    }

    /// Sites in one slice.
    pub fn slice_len(&self) -> usize {
        self.rows * self.cols * CHIMERA_UNITSIZE
    }

    /// Sites over all slices.
    pub fn len(&self) -> usize {
        self.trotters * self.slice_len()
    }

    /// True if the lattice has no sites, which `new` never allows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of `(t, r, c, i)`.
    #[inline]
    pub fn index(&self, t: usize, r: usize, c: usize, i: usize) -> usize {
        ((t * self.rows + r) * self.cols + c) * CHIMERA_UNITSIZE + i
    }

    /// Checkerboard colour of `(t, r, c, i)`.
    #[inline]
    pub fn color(t: usize, r: usize, c: usize, i: usize) -> usize {
        (t + r + c + i / 4) % 2
    }

    fn blocks(&self) -> Vec<(usize, usize, usize)> {
        iproduct!(
            0..self.trotters / self.block.trotters,
            0..self.rows / self.block.rows,
            0..self.cols / self.block.cols
        )
        .collect()
    }
}

/// Per site couplings in kernel order, dropping wrapped bonds that would be counted twice.
pub fn chimera_couplings<F: FloatType>(graph: &Chimera<F>) -> Result<Vec<F>> {
    let (rows, cols) = (graph.num_row(), graph.num_column());
    let mut out = Vec::with_capacity(rows * cols * CHIMERA_UNITSIZE * NUM_COUPLINGS);
    for (r, c, i) in iproduct!(0..rows, 0..cols, 0..CHIMERA_UNITSIZE) {
        let (r, c) = (r as isize, c as isize);
        let (extent, minus, plus) = if i < 4 {
            (rows, ChimeraDir::MinusR, ChimeraDir::PlusR)
        } else {
            (cols, ChimeraDir::MinusC, ChimeraDir::PlusC)
        };
        // One neighbor along a wrapped extent of 2 sits on both sides.
        let j_minus = if extent > 2 {
            graph.j(r, c, i, minus)?
        } else {
            F::zero()
        };
        let j_plus = if extent > 1 {
            graph.j(r, c, i, plus)?
        } else {
            F::zero()
        };
        out.push(j_minus);
        out.push(j_plus);
        for dir in ChimeraDir::INNER {
            out.push(graph.j(r, c, i, dir)?);
        }
    }
    Ok(out)
}

/// Control values of one sweep, already reduced to what a kernel needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SweepParams {
    /// Factor on the classical energy change.
    pub(crate) classical_weight: f64,
    /// `ln tanh(beta Gamma (1 - s) / M)`, unused for classical lattices.
    pub(crate) log_tanh: f64,
}

/// Device side state of one lattice.
pub(crate) struct LatticeBuffers<'a, F> {
    pub(crate) spins: &'a DeviceBuffer<i32>,
    pub(crate) couplings: &'a DeviceBuffer<F>,
    pub(crate) fields: &'a DeviceBuffer<F>,
    pub(crate) randoms: &'a DeviceBuffer<f64>,
}

impl<'a, F: FloatType> LatticeBuffers<'a, F> {
    #[inline]
    fn local_field(&self, layout: &ChimeraLayout, t: usize, r: usize, c: usize, i: usize) -> f64 {
        let spins = self.spins.as_slice();
        let site = layout.index(t, r, c, i);
        let slice_site = site - t * layout.slice_len();
        let js = &self.couplings.as_slice()[slice_site * NUM_COUPLINGS..][..NUM_COUPLINGS];
        let (minus, plus) = if i < 4 {
            let (up, down) = ((r + layout.rows - 1) % layout.rows, (r + 1) % layout.rows);
            (layout.index(t, up, c, i), layout.index(t, down, c, i))
        } else {
            let (left, right) = ((c + layout.cols - 1) % layout.cols, (c + 1) % layout.cols);
            (layout.index(t, r, left, i), layout.index(t, r, right, i))
        };
        let other_half = if i < 4 { 4 } else { 0 };
        let mut lf = self.fields.as_slice()[slice_site].as_f64()
            + js[0].as_f64() * f64::from(spins[minus])
            + js[1].as_f64() * f64::from(spins[plus]);
        for k in 0..4 {
            lf += js[2 + k].as_f64() * f64::from(spins[layout.index(t, r, c, other_half + k)]);
        }
        lf
    }

    #[inline]
    fn trotter_sum(&self, layout: &ChimeraLayout, t: usize, r: usize, c: usize, i: usize) -> i32 {
        let m = layout.trotters;
        if m == 1 {
            return 0;
        }
        let spins = self.spins.as_slice();
        spins[layout.index((t + 1) % m, r, c, i)] + spins[layout.index((t + m - 1) % m, r, c, i)]
    }
}

/// Metropolis proposals of one block for one colour. Returns the sites to flip.
fn metropolis_kernel<F: FloatType>(
    layout: &ChimeraLayout,
    (bt, br, bc): (usize, usize, usize),
    color: usize,
    buffers: &LatticeBuffers<'_, F>,
    params: SweepParams,
) -> Vec<usize> {
    let shape = layout.block;
    let spins = buffers.spins.as_slice();
    let mut sites = Vec::with_capacity(shape.trotters * shape.rows * shape.cols * 4);
    let mut weights = Vec::with_capacity(sites.capacity());
    for (t, r, c, i) in iproduct!(
        bt * shape.trotters..(bt + 1) * shape.trotters,
        br * shape.rows..(br + 1) * shape.rows,
        bc * shape.cols..(bc + 1) * shape.cols,
        0..CHIMERA_UNITSIZE
    ) {
        if ChimeraLayout::color(t, r, c, i) != color {
            continue;
        }
        let site = layout.index(t, r, c, i);
        let s = f64::from(spins[site]);
        let de = -2.0 * s * buffers.local_field(layout, t, r, c, i);
        let neighbors = buffers.trotter_sum(layout, t, r, c, i);
        let trotter = if neighbors == 0 {
            0.0
        } else {
            -s * f64::from(neighbors) * params.log_tanh
        };
        sites.push(site);
        weights.push(-(params.classical_weight * de + trotter));
    }
    fmath::exp_bulk(&mut weights);
    let randoms = buffers.randoms.as_slice();
    sites
        .into_iter()
        .zip(weights)
        .filter(|(site, w)| randoms[*site] < *w)
        .map(|(site, _)| site)
        .collect()
}

/// One checkerboard launch: every block proposes in parallel from the current spins,
/// then the accepted flips are committed.
pub(crate) fn launch_metropolis<F: FloatType>(
    device: &Device,
    layout: &ChimeraLayout,
    color: usize,
    spins: &mut DeviceBuffer<i32>,
    couplings: &DeviceBuffer<F>,
    fields: &DeviceBuffer<F>,
    randoms: &DeviceBuffer<f64>,
    params: SweepParams,
) {
    let blocks = layout.blocks();
    let flips: Vec<usize> = {
        let buffers = LatticeBuffers {
            spins: &*spins,
            couplings,
            fields,
            randoms,
        };
        device.install(|| {
            blocks
                .par_iter()
                .flat_map_iter(|b| metropolis_kernel(layout, *b, color, &buffers, params))
                .collect()
        })
    };
    let spins = spins.as_mut_slice();
    for site in flips {
        spins[site] = -spins[site];
    }
}

/// Uniforms drawn from one split stream. Fixed so results do not depend on the worker count.
const RANDOM_CHUNK: usize = 1024;

/// Refill `randoms` with uniforms from `rng` on the device.
pub(crate) fn fill_uniform(device: &Device, randoms: &mut DeviceBuffer<f64>, rng: &mut Xorshift) {
    let num_chunks = (randoms.len() + RANDOM_CHUNK - 1) / RANDOM_CHUNK;
    let mut streams = (0..num_chunks).map(|_| rng.split()).collect::<Vec<_>>();
    let buf = randoms.as_mut_slice();
    device.install(|| {
        buf.par_chunks_mut(RANDOM_CHUNK)
            .zip(streams.par_iter_mut())
            .for_each(|(part, stream)| {
                part.iter_mut().for_each(|u| *u = stream.uniform())
            });
    });
}
