//! Diode device model using the Shockley equation.

use num_complex::Complex;
use saffron_core::model::DiodeModel;
use saffron_core::{NodalSystem, NodeId};

use crate::state::DiodeState;
use crate::GMIN;

/// Thermal voltage kT/q at a given temperature in kelvin.
pub fn thermal_voltage(temp_k: f64) -> f64 {
    const K_BOLTZMANN: f64 = 1.380649e-23;
    const Q_ELECTRON: f64 = 1.602176634e-19;
    K_BOLTZMANN * temp_k / Q_ELECTRON
}

/// Limit a junction-voltage step to keep `exp` well-behaved.
///
/// Steps up to 10·Vt are accepted as-is; larger steps are compressed to
/// `Vt · ln(1 + |ΔV|/Vt)` in the step direction (the classical pn-junction
/// limiting used by SPICE).
pub fn limit_junction_step(old: f64, proposed: f64, vt: f64) -> f64 {
    let dv = proposed - old;
    if dv.abs() <= 10.0 * vt {
        proposed
    } else {
        old + dv.signum() * vt * (1.0 + dv.abs() / vt).ln()
    }
}

/// A diode element.
#[derive(Debug, Clone)]
pub struct Diode {
    /// Device name (e.g., "D1").
    pub name: String,
    /// Anode node.
    pub anode: NodeId,
    /// Cathode node.
    pub cathode: NodeId,
    /// Model card name.
    pub model: String,
}

impl Diode {
    /// Create a new diode referencing a model card.
    pub fn new(
        name: impl Into<String>,
        anode: NodeId,
        cathode: NodeId,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            anode,
            cathode,
            model: model.into(),
        }
    }

    /// Evaluate diode current and conductance at a given junction voltage.
    ///
    /// Returns `(id, gd)` where:
    /// - `id = Is · (exp(Vd/Vt) − 1)`
    /// - `gd = dId/dVd = Is/Vt · exp(Vd/Vt)`, floored at GMIN
    pub fn evaluate(&self, model: &DiodeModel, vd: f64) -> (f64, f64) {
        let vt = thermal_voltage(300.15);
        let exp_term = (vd / vt).exp();
        let id = model.is * (exp_term - 1.0);
        let gd = (model.is * exp_term / vt).max(GMIN);
        (id, gd)
    }

    /// Stamp the companion model at the stored bias.
    ///
    /// The conductance is stamped at every frequency; the Norton equivalent
    /// current `Ieq = Id − Gd·Vd` belongs to the large-signal linearization
    /// and is stamped only into the DC (ω = 0) system.
    pub(crate) fn stamp(&self, sys: &mut NodalSystem, omega: f64, state: &DiodeState) {
        let a = self.anode.index();
        let c = self.cathode.index();

        sys.stamp_conductance(a, c, state.gd);

        if omega == 0.0 {
            let ieq = state.id - state.gd * state.vd;
            sys.stamp_current_source(a, c, Complex::new(ieq, 0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DiodeModel {
        DiodeModel { is: 1e-14 }
    }

    #[test]
    fn test_thermal_voltage() {
        // At room temperature, Vt ≈ 25.85 mV
        let vt = thermal_voltage(300.15);
        assert!((vt - 0.02585).abs() < 1e-4, "Vt = {}", vt);
    }

    #[test]
    fn test_forward_bias() {
        let d = Diode::new("D1", NodeId::new(1), NodeId::GROUND, "DX");
        let (id, gd) = d.evaluate(&model(), 0.7);

        assert!(id > 1e-4, "forward current should be significant: {}", id);
        assert!(gd > 0.0, "forward conductance should be positive: {}", gd);
        // gd = Is/Vt * exp(Vd/Vt) ≈ (id + Is)/Vt
        let vt = thermal_voltage(300.15);
        assert!((gd - (id + 1e-14) / vt).abs() / gd < 1e-9);
    }

    #[test]
    fn test_reverse_bias() {
        let d = Diode::new("D1", NodeId::new(1), NodeId::GROUND, "DX");
        let (id, gd) = d.evaluate(&model(), -1.0);

        assert!(id < 0.0, "reverse current should be negative: {}", id);
        assert!(id.abs() < 2e-14, "reverse current should be ≈ -Is: {}", id);
        assert_eq!(gd, GMIN, "reverse conductance floors at GMIN");
    }

    #[test]
    fn test_zero_bias() {
        let d = Diode::new("D1", NodeId::new(1), NodeId::GROUND, "DX");
        let (id, _gd) = d.evaluate(&model(), 0.0);
        assert_eq!(id, 0.0);
    }

    #[test]
    fn test_limit_junction_step() {
        let vt = thermal_voltage(300.15);

        // Small steps pass through untouched
        assert_eq!(limit_junction_step(0.5, 0.55, vt), 0.55);

        // Large positive step is compressed
        let limited = limit_junction_step(0.0, 5.0, vt);
        assert!(limited < 0.3, "step should be compressed: {}", limited);
        assert!(limited > 0.0);

        // Limiting is symmetric
        let down = limit_junction_step(0.0, -5.0, vt);
        assert!((down + limited).abs() < 1e-12);
    }

    #[test]
    fn test_companion_stamp_at_dc() {
        let d = Diode::new("D1", NodeId::new(1), NodeId::GROUND, "DX");
        let (id, gd) = d.evaluate(&model(), 0.65);
        let state = DiodeState {
            vd: 0.65,
            gd,
            id,
        };

        let mut sys = NodalSystem::new(1);
        d.stamp(&mut sys, 0.0, &state);

        assert!((sys.matrix()[(0, 0)].re - gd).abs() < 1e-12);
        // Ieq drawn from the anode
        let ieq = id - gd * 0.65;
        assert!((sys.rhs()[0].re + ieq).abs() < 1e-12);
    }

    #[test]
    fn test_companion_stamp_at_ac_has_no_ieq() {
        let d = Diode::new("D1", NodeId::new(1), NodeId::GROUND, "DX");
        let state = DiodeState {
            vd: 0.65,
            gd: 0.01,
            id: 1e-3,
        };

        let mut sys = NodalSystem::new(1);
        d.stamp(&mut sys, 2.0 * std::f64::consts::PI * 1e3, &state);

        assert!((sys.matrix()[(0, 0)].re - 0.01).abs() < 1e-15);
        assert_eq!(sys.rhs()[0].re, 0.0);
    }
}
