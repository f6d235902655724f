//! AC small-signal frequency sweep.

use std::f64::consts::PI;

use num_complex::Complex;
use saffron_core::NodeId;
use saffron_devices::{BiasState, Circuit, Device};

use crate::assemble::assemble;
use crate::error::{Error, Result};
use crate::linear;
use crate::newton::{solve_operating_point, ConvergenceOptions};

/// AC sweep parameters.
#[derive(Debug, Clone)]
pub struct AcParams {
    /// Start frequency (Hz), > 0.
    pub fstart: f64,
    /// Stop frequency (Hz), > fstart.
    pub fstop: f64,
    /// Density of the logarithmic grid.
    pub points_per_decade: usize,
    /// Output node whose phasor is recorded.
    pub output: NodeId,
    /// Optional reference source name. When set, the recorded response is
    /// the transfer function `v(out) / phasor(reference)`; otherwise the
    /// absolute output phasor.
    pub reference: Option<String>,
}

/// A single solved sweep point.
#[derive(Debug, Clone, Copy)]
pub struct AcPoint {
    /// Frequency (Hz).
    pub frequency: f64,
    /// Output phasor (absolute, or relative to the reference source).
    pub response: Complex<f64>,
}

impl AcPoint {
    /// Amplitude in decibel volts, `20·log10 |v|`.
    pub fn amplitude_db(&self) -> f64 {
        20.0 * self.response.norm().log10()
    }

    /// Phase in degrees, wrapped to (−180°, +180°].
    pub fn phase_deg(&self) -> f64 {
        let mut deg = self.response.arg().to_degrees();
        if deg <= -180.0 {
            deg += 360.0;
        }
        deg
    }
}

/// Result of an AC sweep, in ascending frequency order.
#[derive(Debug, Clone)]
pub struct AcResult {
    /// All solved sweep points.
    pub points: Vec<AcPoint>,
}

impl AcResult {
    /// All frequency values.
    pub fn frequencies(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.frequency).collect()
    }

    /// `(frequency, amplitude_dB, phase_deg)` records, one per point.
    pub fn records(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.points
            .iter()
            .map(|p| (p.frequency, p.amplitude_db(), p.phase_deg()))
    }

    /// The point closest to a frequency on the logarithmic axis.
    pub fn nearest(&self, frequency: f64) -> Option<&AcPoint> {
        self.points.iter().min_by(|a, b| {
            let da = (a.frequency / frequency).ln().abs();
            let db = (b.frequency / frequency).ln().abs();
            da.total_cmp(&db)
        })
    }
}

/// Generate the logarithmic frequency grid.
///
/// `num_points = ceil(log10(fstop/fstart)·ppd) + 1` with
/// `f_k = fstart·10^(k/ppd)`; the final point is clamped to exactly `fstop`
/// and the grid is strictly increasing.
pub fn generate_frequencies(fstart: f64, fstop: f64, points_per_decade: usize) -> Vec<f64> {
    let decades = (fstop / fstart).log10();
    let num_points = (decades * points_per_decade as f64).ceil() as usize + 1;

    let mut freqs: Vec<f64> = (0..num_points)
        .map(|k| fstart * 10f64.powf(k as f64 / points_per_decade as f64))
        .collect();

    let last = freqs.len() - 1;
    freqs[last] = fstop;
    // Rounding can push the penultimate point onto fstop; drop it to keep
    // the grid strictly increasing.
    if last >= 1 && freqs[last - 1] >= fstop {
        freqs.remove(last - 1);
    }
    freqs
}

fn reference_phasor(circuit: &Circuit, name: &str) -> Result<Complex<f64>> {
    match circuit.find_device(name) {
        Some(Device::AcVoltageSource(v)) if v.amplitude != 0.0 => Ok(v.excitation()),
        Some(Device::AcCurrentSource(i)) if i.amplitude != 0.0 => Ok(i.excitation()),
        Some(_) => Err(Error::InvalidSweep(format!(
            "reference source `{}` must be an AC source with non-zero amplitude",
            name
        ))),
        None => Err(Error::InvalidSweep(format!(
            "reference source `{}` not found",
            name
        ))),
    }
}

/// Check the sweep parameters and return the output node's matrix index.
fn validate_params(circuit: &Circuit, params: &AcParams) -> Result<usize> {
    if !(params.fstart > 0.0 && params.fstart.is_finite()) {
        return Err(Error::InvalidSweep("fstart must be positive".into()));
    }
    if !(params.fstop > params.fstart && params.fstop.is_finite()) {
        return Err(Error::InvalidSweep("fstop must exceed fstart".into()));
    }
    if params.points_per_decade == 0 {
        return Err(Error::InvalidSweep(
            "points per decade must be at least 1".into(),
        ));
    }
    match params.output.index() {
        Some(i) if i < circuit.num_nodes() => Ok(i),
        _ => Err(Error::InvalidSweep(format!(
            "output node {} is not a non-ground circuit node",
            params.output
        ))),
    }
}

/// Run an AC small-signal sweep.
///
/// When the circuit contains nonlinear devices the DC operating point is
/// solved first and its bias state linearizes them for every sweep point;
/// linear circuits are swept directly. The sweep either completes fully or
/// fails on the first singular system, reporting the offending frequency.
pub fn solve_ac(circuit: &Circuit, params: &AcParams) -> Result<AcResult> {
    circuit.validate()?;
    let out = validate_params(circuit, params)?;

    let reference = match &params.reference {
        Some(name) => Some(reference_phasor(circuit, name)?),
        None => None,
    };

    let bias = if circuit.has_nonlinear() {
        solve_operating_point(circuit, &ConvergenceOptions::default())?.bias
    } else {
        BiasState::new(circuit)?
    };

    let mut points = Vec::new();
    for frequency in generate_frequencies(params.fstart, params.fstop, params.points_per_decade) {
        let omega = 2.0 * PI * frequency;
        let sys = assemble(circuit, &bias, omega);
        let solution = linear::solve(&sys).ok_or(Error::Singular { frequency })?;

        let vout = solution[out];
        let response = match reference {
            Some(r) => vout / r,
            None => vout,
        };
        points.push(AcPoint {
            frequency,
            response,
        });
    }

    Ok(AcResult { points })
}
