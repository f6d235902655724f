//! Newton-Raphson DC operating point.

use nalgebra::DVector;
use saffron_core::NodeId;
use saffron_devices::{BiasState, Circuit, DeviceState};

use crate::assemble::assemble;
use crate::error::{Error, Result};
use crate::linear;

/// Convergence criteria for the Newton-Raphson iteration.
#[derive(Debug, Clone)]
pub struct ConvergenceOptions {
    /// Absolute node-voltage tolerance (V).
    pub v_tol: f64,
    /// Relative device-current tolerance.
    pub i_tol: f64,
    /// Absolute device-current floor (A).
    pub i_abs: f64,
    /// Maximum iterations before giving up.
    pub max_iterations: usize,
}

impl Default for ConvergenceOptions {
    fn default() -> Self {
        Self {
            v_tol: 1e-6,
            i_tol: 1e-3,
            i_abs: 1e-12,
            max_iterations: 100,
        }
    }
}

/// A converged DC operating point.
#[derive(Debug, Clone)]
pub struct OperatingPoint {
    /// Node voltages, indexed by node number − 1; ground is implicitly 0 V.
    pub node_voltages: DVector<f64>,
    /// Companion-model bias used for all subsequent AC stamps.
    pub bias: BiasState,
    /// Newton iterations taken.
    pub iterations: usize,
}

impl OperatingPoint {
    /// Voltage at a node.
    pub fn voltage(&self, node: NodeId) -> f64 {
        match node.index() {
            Some(i) if i < self.node_voltages.len() => self.node_voltages[i],
            _ => 0.0,
        }
    }
}

/// Solve the DC operating point of a circuit.
///
/// Each iteration re-stamps the circuit at ω = 0 with every nonlinear device
/// replaced by its Norton companion, solves the linear system, then updates
/// the bias state from the new node voltages (junction steps limited to keep
/// `exp` in range). Convergence requires both `max|Δv| < v_tol` and, for
/// every nonlinear device current, `|ΔI| < i_tol·max(|I|, i_abs)`.
pub fn solve_operating_point(
    circuit: &Circuit,
    options: &ConvergenceOptions,
) -> Result<OperatingPoint> {
    circuit.validate()?;

    let num_nodes = circuit.num_nodes();
    let mut bias = BiasState::new(circuit)?;
    let mut previous = DVector::zeros(num_nodes);
    let mut residual = f64::INFINITY;

    for iteration in 1..=options.max_iterations {
        let sys = assemble(circuit, &bias, 0.0);
        let solution = linear::solve(&sys).ok_or(Error::Singular { frequency: 0.0 })?;
        let voltages = DVector::from_iterator(num_nodes, solution.iter().map(|v| v.re));

        residual = voltages
            .iter()
            .zip(previous.iter())
            .map(|(new, old): (&f64, &f64)| (new - old).abs())
            .fold(0.0, f64::max);

        let before = bias.states().to_vec();
        bias.update_from_solution(circuit, &voltages)?;
        let currents_settled = currents_converged(&before, bias.states(), options);

        log::debug!(
            "newton iteration {}: residual {:.3e} V, currents settled: {}",
            iteration,
            residual,
            currents_settled
        );

        if iteration > 1 && residual < options.v_tol && currents_settled {
            return Ok(OperatingPoint {
                node_voltages: voltages,
                bias,
                iterations: iteration,
            });
        }

        previous = voltages;
    }

    Err(Error::NonConvergent {
        iterations: options.max_iterations,
        residual,
    })
}

fn currents_converged(
    before: &[DeviceState],
    after: &[DeviceState],
    options: &ConvergenceOptions,
) -> bool {
    before.iter().zip(after.iter()).all(|(b, a)| {
        b.currents()
            .iter()
            .zip(a.currents().iter())
            .all(|(ib, ia)| (ia - ib).abs() < options.i_tol * ia.abs().max(options.i_abs))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use saffron_core::model::{DiodeModel, ModelCard};
    use saffron_core::ModelLibrary;
    use saffron_devices::{DcVoltageSource, Device, Diode, Resistor};

    fn divider() -> Circuit {
        // V1 = 10V, R1 = R2 = 1k: V(1) = 10, V(2) = 5
        Circuit::new(
            vec![
                Device::DcVoltageSource(DcVoltageSource::new(
                    "V1",
                    NodeId::new(1),
                    NodeId::GROUND,
                    10.0,
                )),
                Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::new(2), 1e3)),
                Device::Resistor(Resistor::new("R2", NodeId::new(2), NodeId::GROUND, 1e3)),
            ],
            ModelLibrary::new(),
        )
    }

    fn diode_circuit(vsrc: f64) -> Circuit {
        let mut models = ModelLibrary::new();
        models.insert("DX", ModelCard::Diode(DiodeModel { is: 1e-14 }));
        Circuit::new(
            vec![
                Device::DcVoltageSource(DcVoltageSource::new(
                    "V1",
                    NodeId::new(1),
                    NodeId::GROUND,
                    vsrc,
                )),
                Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::new(2), 1e3)),
                Device::Diode(Diode::new("D1", NodeId::new(2), NodeId::GROUND, "DX")),
            ],
            models,
        )
    }

    #[test]
    fn test_resistive_divider() {
        let op = solve_operating_point(&divider(), &ConvergenceOptions::default()).unwrap();

        assert!((op.voltage(NodeId::new(1)) - 10.0).abs() < 1e-12);
        assert!((op.voltage(NodeId::new(2)) - 5.0).abs() < 1e-12);
        assert_eq!(op.voltage(NodeId::GROUND), 0.0);
        assert!(op.iterations <= 3, "linear circuit: {} iterations", op.iterations);
    }

    #[test]
    fn test_diode_forward_drop() {
        let op = solve_operating_point(&diode_circuit(5.0), &ConvergenceOptions::default()).unwrap();

        let vd = op.voltage(NodeId::new(2));
        assert!(vd > 0.5 && vd < 0.8, "diode drop: {} V", vd);

        // Device current and resistor current must agree at the solution.
        match op.bias.state(2) {
            DeviceState::Diode(d) => {
                let ir = (5.0 - vd) / 1e3;
                assert!(
                    (d.id - ir).abs() < 1e-3 * ir,
                    "KCL at the diode node: Id = {}, IR = {}",
                    d.id,
                    ir
                );
            }
            other => panic!("expected diode state, got {:?}", other),
        }
    }

    #[test]
    fn test_reverse_biased_diode() {
        let op =
            solve_operating_point(&diode_circuit(-5.0), &ConvergenceOptions::default()).unwrap();
        let vd = op.voltage(NodeId::new(2));
        // All of the source appears across the reverse-biased junction.
        assert!((vd + 5.0).abs() < 1e-3, "V(2) = {}", vd);
    }

    #[test]
    fn test_iteration_starved_newton_fails() {
        let options = ConvergenceOptions {
            max_iterations: 2,
            ..Default::default()
        };
        let err = solve_operating_point(&diode_circuit(5.0), &options).unwrap_err();
        match err {
            Error::NonConvergent {
                iterations,
                residual,
            } => {
                assert_eq!(iterations, 2);
                assert!(residual > 0.0);
            }
            other => panic!("expected NonConvergent, got {:?}", other),
        }
    }

    #[test]
    fn test_floating_node_is_singular() {
        // Node 2 is only reachable through the current source: zero row.
        let circuit = Circuit::new(
            vec![
                Device::DcVoltageSource(DcVoltageSource::new(
                    "V1",
                    NodeId::new(1),
                    NodeId::GROUND,
                    1.0,
                )),
                Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::GROUND, 1e3)),
                Device::DcCurrentSource(saffron_devices::DcCurrentSource::new(
                    "I1",
                    NodeId::GROUND,
                    NodeId::new(2),
                    1e-3,
                )),
            ],
            ModelLibrary::new(),
        );

        let err = solve_operating_point(&circuit, &ConvergenceOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Singular { .. }));
    }
}
