//! The circuit container: an ordered device list plus the model library.

use saffron_core::error::{Error, Result};
use saffron_core::ModelLibrary;

use crate::device::Device;

/// A complete circuit ready for analysis.
///
/// Devices keep their netlist order; stamping is additive so the order does
/// not affect the solution, but it decides the voltage-source row tie-break
/// and keeps error messages stable.
#[derive(Debug)]
pub struct Circuit {
    devices: Vec<Device>,
    num_nodes: usize,
    models: ModelLibrary,
}

impl Circuit {
    /// Build a circuit, deriving the node count from the highest node id
    /// referenced by any device.
    pub fn new(devices: Vec<Device>, models: ModelLibrary) -> Self {
        let num_nodes = devices
            .iter()
            .flat_map(|d| d.nodes())
            .map(|n| n.as_u32())
            .max()
            .unwrap_or(0) as usize;
        Self {
            devices,
            num_nodes,
            models,
        }
    }

    /// Build a circuit with an explicit node count, as handed over by a
    /// netlist parser.
    pub fn with_num_nodes(devices: Vec<Device>, num_nodes: usize, models: ModelLibrary) -> Self {
        Self {
            devices,
            num_nodes,
            models,
        }
    }

    /// The devices in netlist order.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Number of non-ground nodes (the highest node id).
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// The model library.
    pub fn models(&self) -> &ModelLibrary {
        &self.models
    }

    /// Whether any device requires a Newton-Raphson operating point.
    pub fn has_nonlinear(&self) -> bool {
        self.devices.iter().any(|d| d.is_nonlinear())
    }

    /// Find a device by name (case-insensitive).
    pub fn find_device(&self, name: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// Validate the circuit before analysis.
    ///
    /// Checks node ranges, parameter sanity (positive finite resistance,
    /// non-negative finite reactances, finite source values) and that every
    /// model reference resolves to a card of the right kind.
    pub fn validate(&self) -> Result<()> {
        for device in &self.devices {
            for node in device.nodes() {
                if node.as_u32() as usize > self.num_nodes {
                    return Err(Error::NodeOutOfRange {
                        device: device.name().to_string(),
                        node: node.as_u32(),
                        num_nodes: self.num_nodes,
                    });
                }
            }

            match device {
                Device::Resistor(r) => {
                    if !(r.resistance.is_finite() && r.resistance > 0.0) {
                        return Err(invalid(&r.name, "resistance must be finite and positive"));
                    }
                }
                Device::Capacitor(c) => {
                    if !(c.capacitance.is_finite() && c.capacitance >= 0.0) {
                        return Err(invalid(
                            &c.name,
                            "capacitance must be finite and non-negative",
                        ));
                    }
                }
                Device::Inductor(l) => {
                    if !(l.inductance.is_finite() && l.inductance >= 0.0) {
                        return Err(invalid(
                            &l.name,
                            "inductance must be finite and non-negative",
                        ));
                    }
                }
                Device::DcVoltageSource(v) => {
                    if !v.voltage.is_finite() {
                        return Err(invalid(&v.name, "voltage must be finite"));
                    }
                }
                Device::AcVoltageSource(v) => {
                    if !(v.amplitude.is_finite() && v.phase.is_finite()) {
                        return Err(invalid(&v.name, "amplitude and phase must be finite"));
                    }
                }
                Device::DcCurrentSource(i) => {
                    if !i.current.is_finite() {
                        return Err(invalid(&i.name, "current must be finite"));
                    }
                }
                Device::AcCurrentSource(i) => {
                    if !(i.amplitude.is_finite() && i.phase.is_finite()) {
                        return Err(invalid(&i.name, "amplitude and phase must be finite"));
                    }
                }
                Device::Vccs(g) => {
                    if !g.gm.is_finite() {
                        return Err(invalid(&g.name, "transconductance must be finite"));
                    }
                }
                Device::Diode(d) => {
                    self.models.diode(&d.name, &d.model)?;
                }
                Device::Bjt(q) => {
                    self.models.bjt(&q.name, &q.model)?;
                }
                Device::Mosfet(m) => {
                    self.models.mosfet(&m.name, &m.model)?;
                }
            }
        }
        Ok(())
    }
}

fn invalid(device: &str, reason: &str) -> Error {
    Error::InvalidDevice {
        device: device.to_string(),
        reason: reason.to_string(),
    }
}
