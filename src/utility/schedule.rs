use crate::error::{Error, Result};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Control parameter of a classical updater.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ClassicalUpdaterParameter {
    /// Inverse temperature.
    pub beta: f64,
}

impl ClassicalUpdaterParameter {
    /// Parameter at inverse temperature `beta`.
    pub fn new(beta: f64) -> Self {
        Self { beta }
    }
}

/// Control parameter of a transverse field updater.
///
/// The hamiltonian is `s * H_classical + (1 - s) * Gamma * H_transverse`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TransverseFieldUpdaterParameter {
    /// Inverse temperature.
    pub beta: f64,
    /// Annealing coefficient in `[0, 1]`.
    pub s: f64,
}

impl TransverseFieldUpdaterParameter {
    /// Parameter at inverse temperature `beta` and annealing coefficient `s`.
    pub fn new(beta: f64, s: f64) -> Self {
        Self { beta, s }
    }
}

/// One step of a schedule: run the updater `one_mc_step` times with `updater_parameter`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ScheduleEntry<P> {
    /// Number of updater calls at this parameter.
    pub one_mc_step: usize,
    /// Control parameter.
    pub updater_parameter: P,
}

/// An ordered list of schedule entries.
pub type Schedule<P> = Vec<ScheduleEntry<P>>;

fn check_endpoint(name: &str, v: f64) -> Result<()> {
    if v == 0.0 || !v.is_finite() {
        Err(Error::InvalidSchedule(format!(
            "{} must be finite and non-zero, got {}",
            name, v
        )))
    } else {
        Ok(())
    }
}

/// `steps` values starting at `start`, each the previous times `(end/start)^(1/steps)`.
///
/// The last value is `end / ratio`, so appending `end` gives `steps + 1` points evenly
/// spaced in log space.
pub fn make_geometric_progression(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(Error::InvalidSchedule(
            "geometric progression needs at least one step".to_string(),
        ));
    }
    check_endpoint("start", start)?;
    check_endpoint("end", end)?;
    if start.signum() != end.signum() {
        return Err(Error::InvalidSchedule(format!(
            "start {} and end {} have different signs",
            start, end
        )));
    }
    let ratio = (end / start).powf(1.0 / steps as f64);
    Ok((0..steps).map(|k| start * ratio.powi(k as i32)).collect())
}

/// Geometric inverse temperature schedule from `beta_min` towards `beta_max`.
pub fn make_classical_schedule_list(
    beta_min: f64,
    beta_max: f64,
    one_mc_step: usize,
    num_call_updater: usize,
) -> Result<Schedule<ClassicalUpdaterParameter>> {
    let betas = make_geometric_progression(beta_min, beta_max, num_call_updater)?;
    Ok(betas
        .into_iter()
        .map(|beta| ScheduleEntry {
            one_mc_step,
            updater_parameter: ClassicalUpdaterParameter { beta },
        })
        .collect())
}

/// Fixed `beta`, with `s` growing geometrically from `s_min` towards `s_max`.
pub fn make_transverse_field_schedule_list(
    beta: f64,
    s_min: f64,
    s_max: f64,
    one_mc_step: usize,
    num_call_updater: usize,
) -> Result<Schedule<TransverseFieldUpdaterParameter>> {
    if !(0.0..=1.0).contains(&s_min) || !(0.0..=1.0).contains(&s_max) {
        return Err(Error::InvalidSchedule(format!(
            "s must lie in [0, 1], got {} to {}",
            s_min, s_max
        )));
    }
    let ss = make_geometric_progression(s_min, s_max, num_call_updater)?;
    Ok(ss
        .into_iter()
        .map(|s| ScheduleEntry {
            one_mc_step,
            updater_parameter: TransverseFieldUpdaterParameter { beta, s },
        })
        .collect())
}

/// Schedule from explicit `(parameter, one_mc_step)` points, in order.
pub fn make_schedule_list<P, I>(points: I) -> Schedule<P>
where
    I: IntoIterator<Item = (P, usize)>,
{
    points
        .into_iter()
        .map(|(updater_parameter, one_mc_step)| ScheduleEntry {
            one_mc_step,
            updater_parameter,
        })
        .collect()
}

/// Inverse temperature range suited to a problem whose single flip energy changes
/// lie between `min_de` and `max_de` in magnitude.
///
/// At `beta_min` the largest uphill move is accepted half the time, at `beta_max`
/// the smallest one is accepted once in a hundred tries.
pub fn beta_range(max_de: f64, min_de: f64) -> Result<(f64, f64)> {
    check_endpoint("max_de", max_de)?;
    check_endpoint("min_de", min_de)?;
    let beta_min = 2f64.ln() / max_de.abs();
    let beta_max = 100f64.ln() / min_de.abs();
    Ok((beta_min, beta_max))
}
