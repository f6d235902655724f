//! Passive device models: Resistor, Capacitor, Inductor.

use num_complex::Complex;
use saffron_core::NodeId;

/// A resistor element.
#[derive(Debug, Clone)]
pub struct Resistor {
    /// Device name (e.g., "R1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Resistance value in ohms.
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        resistance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            resistance,
        }
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }
}

/// A capacitor element.
#[derive(Debug, Clone)]
pub struct Capacitor {
    /// Device name (e.g., "C1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Capacitance value in farads.
    pub capacitance: f64,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        capacitance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            capacitance,
        }
    }

    /// Admittance jωC at the given angular frequency (zero at DC: open).
    pub fn admittance(&self, omega: f64) -> Complex<f64> {
        Complex::new(0.0, omega * self.capacitance)
    }
}

/// An inductor element.
///
/// At ω > 0 the inductor is a two-terminal admittance 1/(jωL). At DC, and
/// for the degenerate L = 0 value, it is treated as a 0 V voltage-source
/// constraint rather than a huge admittance, which would otherwise
/// ill-condition the matrix.
#[derive(Debug, Clone)]
pub struct Inductor {
    /// Device name (e.g., "L1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Inductance value in henries.
    pub inductance: f64,
}

impl Inductor {
    /// Create a new inductor.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        inductance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            inductance,
        }
    }

    /// Whether this inductor acts as a short at the given frequency.
    pub fn is_short(&self, omega: f64) -> bool {
        omega == 0.0 || self.inductance == 0.0
    }

    /// Admittance 1/(jωL) = −j/(ωL). Only meaningful when `!is_short(omega)`.
    pub fn admittance(&self, omega: f64) -> Complex<f64> {
        Complex::new(0.0, -1.0 / (omega * self.inductance))
    }
}
