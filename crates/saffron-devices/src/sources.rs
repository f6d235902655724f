//! Independent source models: DC and AC voltage and current sources.
//!
//! Source values depend on the analysis frequency: a DC source contributes
//! its value at ω = 0 and nothing at ω > 0 (its small-signal value is zero),
//! while an AC source contributes its phasor at ω > 0 and nothing at DC.

use num_complex::Complex;
use saffron_core::NodeId;

/// An independent DC voltage source.
#[derive(Debug, Clone)]
pub struct DcVoltageSource {
    /// Device name (e.g., "V1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// DC voltage in volts.
    pub voltage: f64,
}

impl DcVoltageSource {
    /// Create a new DC voltage source.
    pub fn new(name: impl Into<String>, node_pos: NodeId, node_neg: NodeId, voltage: f64) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            voltage,
        }
    }

    /// Source phasor at the given angular frequency.
    pub fn phasor(&self, omega: f64) -> Complex<f64> {
        if omega == 0.0 {
            Complex::new(self.voltage, 0.0)
        } else {
            Complex::new(0.0, 0.0)
        }
    }
}

/// An independent AC voltage source.
#[derive(Debug, Clone)]
pub struct AcVoltageSource {
    /// Device name (e.g., "V1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Amplitude in volts.
    pub amplitude: f64,
    /// Phase in radians.
    pub phase: f64,
}

impl AcVoltageSource {
    /// Create a new AC voltage source.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        amplitude: f64,
        phase: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            amplitude,
            phase,
        }
    }

    /// The source's small-signal phasor, `amplitude·e^{j·phase}`.
    pub fn excitation(&self) -> Complex<f64> {
        Complex::from_polar(self.amplitude, self.phase)
    }

    /// Source phasor at the given angular frequency (zero at DC).
    pub fn phasor(&self, omega: f64) -> Complex<f64> {
        if omega > 0.0 {
            self.excitation()
        } else {
            Complex::new(0.0, 0.0)
        }
    }
}

/// An independent DC current source.
///
/// The positive current is drawn from `node_in` and injected at `node_out`.
#[derive(Debug, Clone)]
pub struct DcCurrentSource {
    /// Device name (e.g., "I1").
    pub name: String,
    /// Node the current is drawn from.
    pub node_in: NodeId,
    /// Node the current is injected into.
    pub node_out: NodeId,
    /// DC current in amperes.
    pub current: f64,
}

impl DcCurrentSource {
    /// Create a new DC current source.
    pub fn new(name: impl Into<String>, node_in: NodeId, node_out: NodeId, current: f64) -> Self {
        Self {
            name: name.into(),
            node_in,
            node_out,
            current,
        }
    }

    /// Source phasor at the given angular frequency.
    pub fn phasor(&self, omega: f64) -> Complex<f64> {
        if omega == 0.0 {
            Complex::new(self.current, 0.0)
        } else {
            Complex::new(0.0, 0.0)
        }
    }
}

/// An independent AC current source.
///
/// The phasor current is drawn from `node_in` and injected at `node_out`.
#[derive(Debug, Clone)]
pub struct AcCurrentSource {
    /// Device name (e.g., "I1").
    pub name: String,
    /// Node the current is drawn from.
    pub node_in: NodeId,
    /// Node the current is injected into.
    pub node_out: NodeId,
    /// Amplitude in amperes.
    pub amplitude: f64,
    /// Phase in radians.
    pub phase: f64,
}

impl AcCurrentSource {
    /// Create a new AC current source.
    pub fn new(
        name: impl Into<String>,
        node_in: NodeId,
        node_out: NodeId,
        amplitude: f64,
        phase: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_in,
            node_out,
            amplitude,
            phase,
        }
    }

    /// The source's small-signal phasor, `amplitude·e^{j·phase}`.
    pub fn excitation(&self) -> Complex<f64> {
        Complex::from_polar(self.amplitude, self.phase)
    }

    /// Source phasor at the given angular frequency (zero at DC).
    pub fn phasor(&self, omega: f64) -> Complex<f64> {
        if omega > 0.0 {
            self.excitation()
        } else {
            Complex::new(0.0, 0.0)
        }
    }
}
