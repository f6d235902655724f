//! The stamp engine: building G(ω)·v = i(ω) from a circuit.

use saffron_core::NodalSystem;
use saffron_devices::{BiasState, Circuit};

/// Assemble the nodal system for `circuit` at angular frequency `omega`.
///
/// Single pass over the devices: additive stamps (admittances, controlled
/// and independent current sources, nonlinear companions from `bias`) are
/// applied first while voltage-source constraints are collected, then the
/// constraints replace their rows in netlist order. When two sources
/// constrain the same node the later one wins and a warning is logged.
///
/// Does not solve; see [`crate::linear`] and the analysis drivers.
pub fn assemble(circuit: &Circuit, bias: &BiasState, omega: f64) -> NodalSystem {
    let mut sys = NodalSystem::new(circuit.num_nodes());
    let mut constraints = Vec::new();

    for (index, device) in circuit.devices().iter().enumerate() {
        match device.source_constraint(omega) {
            Some(constraint) => constraints.push((device.name(), constraint)),
            None => device.stamp(&mut sys, omega, bias.state(index)),
        }
    }

    let mut claimed: Vec<Option<&str>> = vec![None; circuit.num_nodes()];
    for (name, constraint) in constraints {
        let (row, pos, neg) = match (constraint.node_pos.index(), constraint.node_neg.index()) {
            (Some(p), Some(n)) => (p, Some(p), Some(n)),
            (Some(p), None) => (p, Some(p), None),
            (None, Some(n)) => (n, None, Some(n)),
            (None, None) => continue,
        };

        if let Some(previous) = claimed[row] {
            log::warn!(
                "voltage sources {} and {} both constrain node {}; {} wins",
                previous,
                name,
                row + 1,
                name
            );
        }
        claimed[row] = Some(name);

        sys.replace_voltage_row(row, pos, neg, constraint.value);
    }

    sys
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;
    use saffron_core::{ModelLibrary, NodeId};
    use saffron_devices::{
        AcVoltageSource, Capacitor, DcVoltageSource, Device, Inductor, Resistor,
    };
    use std::f64::consts::PI;

    fn linear_circuit(devices: Vec<Device>) -> (Circuit, BiasState) {
        let circuit = Circuit::new(devices, ModelLibrary::new());
        let bias = BiasState::new(&circuit).unwrap();
        (circuit, bias)
    }

    #[test]
    fn test_symmetric_with_admittance_diagonal() {
        // Two-terminal admittances only: G(ω) must be symmetric and each
        // diagonal entry the sum of admittances incident at that node.
        let (circuit, bias) = linear_circuit(vec![
            Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::new(2), 1e3)),
            Device::Capacitor(Capacitor::new("C1", NodeId::new(2), NodeId::new(3), 100e-9)),
            Device::Resistor(Resistor::new("R2", NodeId::new(2), NodeId::GROUND, 2.2e3)),
            Device::Inductor(Inductor::new("L1", NodeId::new(3), NodeId::GROUND, 1e-3)),
        ]);

        let omega = 2.0 * PI * 10e3;
        let sys = assemble(&circuit, &bias, omega);
        let g = sys.matrix();

        for r in 0..3 {
            for c in 0..3 {
                let d = g[(r, c)] - g[(c, r)];
                assert!(d.norm() < 1e-15, "G not symmetric at ({}, {})", r, c);
            }
        }

        let yr1 = Complex::new(1e-3, 0.0);
        let yc1 = Complex::new(0.0, omega * 100e-9);
        let yr2 = Complex::new(1.0 / 2.2e3, 0.0);
        let yl1 = Complex::new(0.0, -1.0 / (omega * 1e-3));
        assert!((g[(0, 0)] - yr1).norm() < 1e-15);
        assert!((g[(1, 1)] - (yr1 + yc1 + yr2)).norm() < 1e-15);
        assert!((g[(2, 2)] - (yc1 + yl1)).norm() < 1e-15);
    }

    #[test]
    fn test_voltage_row_applied_after_additive_stamps() {
        let (circuit, bias) = linear_circuit(vec![
            Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::new(2), 1e3)),
            Device::DcVoltageSource(DcVoltageSource::new(
                "V1",
                NodeId::new(1),
                NodeId::GROUND,
                10.0,
            )),
        ]);

        let sys = assemble(&circuit, &bias, 0.0);

        // Row 0 is the source constraint, not the resistor KCL row.
        assert_eq!(sys.matrix()[(0, 0)], Complex::new(1.0, 0.0));
        assert_eq!(sys.matrix()[(0, 1)], Complex::new(0.0, 0.0));
        assert_eq!(sys.rhs()[0], Complex::new(10.0, 0.0));
        // Node 2 keeps its KCL row.
        assert_eq!(sys.matrix()[(1, 0)], Complex::new(-1e-3, 0.0));
    }

    #[test]
    fn test_later_source_wins_row_conflict() {
        let (circuit, bias) = linear_circuit(vec![
            Device::DcVoltageSource(DcVoltageSource::new(
                "V1",
                NodeId::new(1),
                NodeId::GROUND,
                1.0,
            )),
            Device::DcVoltageSource(DcVoltageSource::new(
                "V2",
                NodeId::new(1),
                NodeId::GROUND,
                2.0,
            )),
            Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::GROUND, 1e3)),
        ]);

        let sys = assemble(&circuit, &bias, 0.0);
        assert_eq!(sys.rhs()[0], Complex::new(2.0, 0.0));
    }

    #[test]
    fn test_grounded_positive_terminal_convention() {
        // V1 with n+ grounded: row of n− carries −1 and the phasor.
        let (circuit, bias) = linear_circuit(vec![
            Device::AcVoltageSource(AcVoltageSource::new(
                "V1",
                NodeId::GROUND,
                NodeId::new(1),
                1.0,
                0.0,
            )),
            Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::GROUND, 1e3)),
        ]);

        let sys = assemble(&circuit, &bias, 2.0 * PI * 50.0);
        assert_eq!(sys.matrix()[(0, 0)], Complex::new(-1.0, 0.0));
        assert_eq!(sys.rhs()[0], Complex::new(1.0, 0.0));
    }

    #[test]
    fn test_inductor_short_at_dc_replaces_row() {
        let (circuit, bias) = linear_circuit(vec![
            Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::new(2), 1e3)),
            Device::Inductor(Inductor::new("L1", NodeId::new(2), NodeId::GROUND, 1e-3)),
        ]);

        let sys = assemble(&circuit, &bias, 0.0);
        // Row 1 is the 0 V constraint V(2) = 0.
        assert_eq!(sys.matrix()[(1, 1)], Complex::new(1.0, 0.0));
        assert_eq!(sys.rhs()[1], Complex::new(0.0, 0.0));
    }
}
