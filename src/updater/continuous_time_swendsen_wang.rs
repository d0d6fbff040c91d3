use crate::graph::{FloatType, Pairwise, Spin};
use crate::system::continuous_time_ising::spin_at;
use crate::system::{ContinuousTimeIsing, CutPoint};
use crate::updater::Updater;
use crate::utility::fmath;
use crate::utility::schedule::TransverseFieldUpdaterParameter;
use crate::utility::union_find::UnionFind;
use rand::Rng;

/// Uniforms converted to interarrival times per bulk log call.
const POISSON_BATCH: usize = 32;

/// A piece of `[0, 1)` on which a site holds one segment: `(start, end, segment, spin)`.
type Interval = (f64, f64, usize, Spin);

/// Cluster moves on continuous imaginary time world lines.
///
/// Each call drops new cuts as a Poisson process with rate `beta Gamma (1 - s)` per site,
/// joins satisfied overlapping segments of coupled sites with probability
/// `1 - e^{-2 beta s |J| overlap}`, flips every cluster with probability one half and
/// finally removes cuts that no longer separate different spins.
#[derive(Debug, Clone, Default)]
pub struct ContinuousTimeSwendsenWang {
    union_find: UnionFind,
    times: Vec<f64>,
    logs: Vec<f64>,
    offsets: Vec<usize>,
    flip_root: Vec<bool>,
    left: Vec<Interval>,
    right: Vec<Interval>,
}

impl ContinuousTimeSwendsenWang {
    /// Make an updater; buffers grow on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted arrival times in `[0, 1)` of a Poisson process with the given rate.
    fn poisson_times<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f64) {
        self.times.clear();
        if !(rate > 0.0 && rate.is_finite()) {
            return;
        }
        let mut t = 0.0;
        loop {
            self.logs.clear();
            // 1 - u lies in (0, 1], so the log is finite.
            self.logs
                .extend((0..POISSON_BATCH).map(|_| 1.0 - rng.gen::<f64>()));
            fmath::log_bulk(&mut self.logs);
            for l in self.logs.iter() {
                t -= l / rate;
                if t >= 1.0 {
                    return;
                }
                if self.times.last().map_or(true, |last| *last < t) {
                    self.times.push(t);
                }
            }
        }
    }
}

/// Insert cuts at `times`, each holding the spin the world line already has there.
///
/// A lone cut bounds no segment and is replaced by the new cuts.
fn insert_cuts(cuts: &mut Vec<CutPoint>, times: &[f64]) {
    if times.is_empty() {
        return;
    }
    if cuts.len() == 1 {
        let spin = cuts[0].spin;
        cuts.clear();
        cuts.extend(times.iter().map(|t| CutPoint::new(*t, spin)));
        return;
    }
    let old = std::mem::take(cuts);
    cuts.reserve(old.len() + times.len());
    let mut k = 0;
    for t in times.iter().cloned() {
        while k < old.len() && old[k].time <= t {
            cuts.push(old[k]);
            k += 1;
        }
        if cuts.last().map_or(false, |c| c.time == t) {
            continue;
        }
        cuts.push(CutPoint::new(t, spin_at(&old, t)));
    }
    cuts.extend_from_slice(&old[k..]);
}

/// Constant pieces of a world line in time order. The last segment wraps onto `[0, c_0)`.
fn intervals(cuts: &[CutPoint], out: &mut Vec<Interval>) {
    out.clear();
    let n = cuts.len();
    if n == 1 {
        out.push((0.0, 1.0, 0, cuts[0].spin));
        return;
    }
    if cuts[0].time > 0.0 {
        out.push((0.0, cuts[0].time, n - 1, cuts[n - 1].spin));
    }
    for k in 0..n {
        let end = if k + 1 < n { cuts[k + 1].time } else { 1.0 };
        out.push((cuts[k].time, end, k, cuts[k].spin));
    }
}

/// Drop cuts holding the same spin as their cyclic predecessor, keeping at least one.
fn remove_redundant(cuts: &mut Vec<CutPoint>) {
    let n = cuts.len();
    if n < 2 {
        return;
    }
    let keep = (0..n)
        .map(|k| cuts[k].spin != cuts[(k + n - 1) % n].spin)
        .collect::<Vec<_>>();
    if keep.iter().all(|k| !k) {
        cuts.truncate(1);
        return;
    }
    let mut k = 0;
    cuts.retain(|_| {
        k += 1;
        keep[k - 1]
    });
}

impl<F: FloatType> Updater<ContinuousTimeIsing<F>> for ContinuousTimeSwendsenWang {
    fn update<R: Rng + ?Sized>(
        &mut self,
        system: &mut ContinuousTimeIsing<F>,
        rng: &mut R,
        parameter: &TransverseFieldUpdaterParameter,
    ) {
        let TransverseFieldUpdaterParameter { beta, s } = *parameter;
        let rate = beta * system.gamma() * (1.0 - s);
        let aux = system.aux_index();

        for i in 0..aux {
            self.poisson_times(rng, rate);
            insert_cuts(&mut system.cuts_mut()[i], &self.times);
        }

        self.offsets.clear();
        let mut total = 0;
        for i in 0..=aux {
            self.offsets.push(total);
            total += system.cut_points(i).len();
        }
        let uf = &mut self.union_find;
        uf.reset_with_len(total);

        let weight = 2.0 * beta * s;
        for i in 0..=aux {
            intervals(system.cut_points(i), &mut self.left);
            for (j, jij) in system.interactions().neighbors(i).filter(|(j, _)| *j > i) {
                let jij = jij.as_f64();
                intervals(system.cut_points(j), &mut self.right);
                let (mut a, mut b) = (0, 0);
                while a < self.left.len() && b < self.right.len() {
                    let (sa, ea, seg_a, spin_a) = self.left[a];
                    let (sb, eb, seg_b, spin_b) = self.right[b];
                    let overlap = ea.min(eb) - sa.max(sb);
                    if overlap > 0.0 && jij * f64::from(spin_a * spin_b) < 0.0 {
                        let p = 1.0 - fmath::exp(-weight * jij.abs() * overlap);
                        if rng.gen::<f64>() < p {
                            uf.unite_sets(self.offsets[i] + seg_a, self.offsets[j] + seg_b);
                        }
                    }
                    if ea <= eb {
                        a += 1;
                    } else {
                        b += 1;
                    }
                }
            }
        }

        self.flip_root.clear();
        self.flip_root.resize(total, false);
        for seg in 0..total {
            if uf.find_set(seg) == seg {
                self.flip_root[seg] = rng.gen::<bool>();
            }
        }
        let offsets = &self.offsets;
        let flip_root = &self.flip_root;
        for (i, cuts) in system.cuts_mut().iter_mut().enumerate() {
            for (k, cut) in cuts.iter_mut().enumerate() {
                if flip_root[uf.find_set(offsets[i] + k)] {
                    cut.spin = -cut.spin;
                }
            }
            remove_redundant(cuts);
        }
    }
}
