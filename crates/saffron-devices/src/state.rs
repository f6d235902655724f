//! Companion-model bias state, kept parallel to the device list.
//!
//! The circuit itself is immutable during solving. All nonlinear state
//! (junction voltages and the companion conductances/currents derived from
//! them) lives in a [`BiasState`] vector keyed by device index, so the AC
//! sweep can read a converged operating point without touching the circuit.

use nalgebra::DVector;

use crate::circuit::Circuit;
use crate::device::Device;
use crate::diode::{limit_junction_step, thermal_voltage};
use crate::error::{Error, Result};

/// Companion state of a diode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiodeState {
    /// Junction voltage, anode − cathode (V).
    pub vd: f64,
    /// Companion conductance (S).
    pub gd: f64,
    /// Junction current at `vd` (A).
    pub id: f64,
}

/// Companion state of a BJT.
#[derive(Debug, Clone, Copy, Default)]
pub struct BjtState {
    /// Base-emitter voltage (V).
    pub vbe: f64,
    /// Base-collector voltage (V).
    pub vbc: f64,
    /// Collector current (A).
    pub ic: f64,
    /// Base current (A).
    pub ib: f64,
    /// Emitter current (A).
    pub ie: f64,
    /// Jacobian of (Ic, Ib, Ie) with respect to (Vc, Vb, Ve).
    pub g: [[f64; 3]; 3],
}

/// Companion state of a MOSFET.
#[derive(Debug, Clone, Copy, Default)]
pub struct MosfetState {
    /// Gate-source voltage (V).
    pub vgs: f64,
    /// Drain-source voltage (V).
    pub vds: f64,
    /// Drain current (A).
    pub id: f64,
    /// Transconductance (S).
    pub gm: f64,
    /// Output conductance (S).
    pub gds: f64,
}

/// Per-device companion state.
#[derive(Debug, Clone, Copy)]
pub enum DeviceState {
    /// Linear devices carry no state.
    Linear,
    Diode(DiodeState),
    Bjt(BjtState),
    Mosfet(MosfetState),
}

impl DeviceState {
    /// Terminal currents used by the Newton convergence check. Unused slots
    /// are zero.
    pub fn currents(&self) -> [f64; 3] {
        match self {
            DeviceState::Linear => [0.0; 3],
            DeviceState::Diode(d) => [d.id, 0.0, 0.0],
            DeviceState::Bjt(q) => [q.ic, q.ib, q.ie],
            DeviceState::Mosfet(m) => [m.id, 0.0, 0.0],
        }
    }
}

/// Bias state for a whole circuit: one [`DeviceState`] per device, in
/// device order.
#[derive(Debug, Clone)]
pub struct BiasState {
    states: Vec<DeviceState>,
}

fn voltage_at(solution: &DVector<f64>, node: saffron_core::NodeId) -> f64 {
    node.index().map(|i| solution[i]).unwrap_or(0.0)
}

impl BiasState {
    /// Zero-bias state for a circuit, with companions evaluated at 0 V.
    ///
    /// Fails if a nonlinear device references a missing or mismatched model
    /// card.
    pub fn new(circuit: &Circuit) -> Result<Self> {
        let mut bias = Self {
            states: vec![DeviceState::Linear; circuit.devices().len()],
        };
        let zeros = DVector::zeros(circuit.num_nodes());
        bias.update_from_solution(circuit, &zeros)?;
        Ok(bias)
    }

    /// The state of the device at `index`.
    pub fn state(&self, index: usize) -> &DeviceState {
        &self.states[index]
    }

    /// All device states, in device order.
    pub fn states(&self) -> &[DeviceState] {
        &self.states
    }

    /// Read new terminal voltages from a solved node-voltage vector, apply
    /// junction step limiting, and recompute every companion model.
    pub fn update_from_solution(
        &mut self,
        circuit: &Circuit,
        solution: &DVector<f64>,
    ) -> Result<()> {
        let vt = thermal_voltage(300.15);
        let models = circuit.models();

        for (index, device) in circuit.devices().iter().enumerate() {
            match device {
                Device::Diode(d) => {
                    let old = match self.states[index] {
                        DeviceState::Diode(s) => s.vd,
                        _ => 0.0,
                    };
                    let proposed = voltage_at(solution, d.anode) - voltage_at(solution, d.cathode);
                    let vd = limit_junction_step(old, proposed, vt);

                    let model = models.diode(&d.name, &d.model)?;
                    let (id, gd) = d.evaluate(model, vd);
                    if !id.is_finite() || !gd.is_finite() {
                        return Err(Error::NumericOverflow {
                            device: d.name.clone(),
                        });
                    }
                    self.states[index] = DeviceState::Diode(DiodeState { vd, gd, id });
                }
                Device::Bjt(q) => {
                    let (old_vbe, old_vbc) = match self.states[index] {
                        DeviceState::Bjt(s) => (s.vbe, s.vbc),
                        _ => (0.0, 0.0),
                    };
                    let vc = voltage_at(solution, q.collector);
                    let vb = voltage_at(solution, q.base);
                    let ve = voltage_at(solution, q.emitter);
                    let vbe = limit_junction_step(old_vbe, vb - ve, vt);
                    let vbc = limit_junction_step(old_vbc, vb - vc, vt);

                    let model = models.bjt(&q.name, &q.model)?;
                    let eval = q.evaluate(model, vbe, vbc);
                    if !eval.ic.is_finite() || !eval.ib.is_finite() || !eval.ie.is_finite() {
                        return Err(Error::NumericOverflow {
                            device: q.name.clone(),
                        });
                    }
                    self.states[index] = DeviceState::Bjt(BjtState {
                        vbe,
                        vbc,
                        ic: eval.ic,
                        ib: eval.ib,
                        ie: eval.ie,
                        g: eval.g,
                    });
                }
                Device::Mosfet(m) => {
                    let vd = voltage_at(solution, m.drain);
                    let vg = voltage_at(solution, m.gate);
                    let vs = voltage_at(solution, m.source);
                    let vgs = vg - vs;
                    let vds = vd - vs;

                    let model = models.mosfet(&m.name, &m.model)?;
                    let eval = m.evaluate(model, vgs, vds);
                    if !eval.id.is_finite() {
                        return Err(Error::NumericOverflow {
                            device: m.name.clone(),
                        });
                    }
                    self.states[index] = DeviceState::Mosfet(MosfetState {
                        vgs,
                        vds,
                        id: eval.id,
                        gm: eval.gm,
                        gds: eval.gds,
                    });
                }
                _ => {
                    self.states[index] = DeviceState::Linear;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diode::Diode;
    use crate::passive::Resistor;
    use saffron_core::model::{DiodeModel, ModelCard};
    use saffron_core::{ModelLibrary, NodeId};

    fn diode_circuit() -> Circuit {
        let mut models = ModelLibrary::new();
        models.insert("DX", ModelCard::Diode(DiodeModel { is: 1e-14 }));
        Circuit::new(
            vec![
                Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::new(2), 1e3)),
                Device::Diode(Diode::new("D1", NodeId::new(2), NodeId::GROUND, "DX")),
            ],
            models,
        )
    }

    #[test]
    fn test_zero_bias_state() {
        let circuit = diode_circuit();
        let bias = BiasState::new(&circuit).unwrap();

        assert!(matches!(bias.state(0), DeviceState::Linear));
        match bias.state(1) {
            DeviceState::Diode(d) => {
                assert_eq!(d.vd, 0.0);
                assert_eq!(d.id, 0.0);
                assert!(d.gd > 0.0);
            }
            other => panic!("expected diode state, got {:?}", other),
        }
    }

    #[test]
    fn test_update_applies_limiting() {
        let circuit = diode_circuit();
        let mut bias = BiasState::new(&circuit).unwrap();

        // A wildly optimistic solution; the junction step must be compressed.
        let solution = DVector::from_vec(vec![10.0, 8.0]);
        bias.update_from_solution(&circuit, &solution).unwrap();

        match bias.state(1) {
            DeviceState::Diode(d) => {
                assert!(d.vd < 1.0, "junction step should be limited: {}", d.vd);
                assert!(d.vd > 0.0);
            }
            other => panic!("expected diode state, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_model_surfaces() {
        let circuit = Circuit::new(
            vec![Device::Diode(Diode::new(
                "D1",
                NodeId::new(1),
                NodeId::GROUND,
                "MISSING",
            ))],
            ModelLibrary::new(),
        );
        let err = BiasState::new(&circuit).unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }
}
