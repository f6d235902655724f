//! BJT device model: simplified Gummel-Poon companion.
//!
//! Terminal currents follow the transport formulation
//!
//! ```text
//! If = Is (exp(Vbe/Vt) − 1)         Ir = Is (exp(Vbc/Vt) − 1)
//! Ic = (If − Ir − Ir/βr) · (1 − Vbc/Vaf)
//! Ib = If/βf + Ir/βr
//! Ie = −(Ic₀ + Ib) · (1 − Vbe/Var)      (Ic₀ the un-scaled collector term)
//! ```
//!
//! and the companion model is the full 3×3 Jacobian of (Ic, Ib, Ie) with
//! respect to (Vc, Vb, Ve) plus a Norton equivalent current per terminal.
//! Each Jacobian row sums to zero, so the equivalent currents can be formed
//! from the junction voltages alone.

use num_complex::Complex;
use saffron_core::model::BjtModel;
use saffron_core::{NodalSystem, NodeId};

use crate::diode::thermal_voltage;
use crate::state::BjtState;
use crate::GMIN;

/// BJT polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BjtPolarity {
    Npn,
    Pnp,
}

/// Evaluated terminal currents and their Jacobian.
#[derive(Debug, Clone, Copy)]
pub struct BjtEval {
    /// Collector current (A), into the collector terminal.
    pub ic: f64,
    /// Base current (A).
    pub ib: f64,
    /// Emitter current (A).
    pub ie: f64,
    /// Jacobian of (Ic, Ib, Ie) with respect to (Vc, Vb, Ve), row-major.
    pub g: [[f64; 3]; 3],
}

/// A bipolar junction transistor element.
#[derive(Debug, Clone)]
pub struct Bjt {
    /// Device name (e.g., "Q1").
    pub name: String,
    /// Collector node.
    pub collector: NodeId,
    /// Base node.
    pub base: NodeId,
    /// Emitter node.
    pub emitter: NodeId,
    /// NPN or PNP.
    pub polarity: BjtPolarity,
    /// Model card name.
    pub model: String,
}

impl Bjt {
    /// Create a new NPN transistor referencing a model card.
    pub fn npn(
        name: impl Into<String>,
        collector: NodeId,
        base: NodeId,
        emitter: NodeId,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            collector,
            base,
            emitter,
            polarity: BjtPolarity::Npn,
            model: model.into(),
        }
    }

    /// Create a new PNP transistor referencing a model card.
    pub fn pnp(
        name: impl Into<String>,
        collector: NodeId,
        base: NodeId,
        emitter: NodeId,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            collector,
            base,
            emitter,
            polarity: BjtPolarity::Pnp,
            model: model.into(),
        }
    }

    /// Evaluate terminal currents and the companion Jacobian at a junction
    /// bias. `vbe` and `vbc` are the external junction voltages; a PNP is
    /// evaluated at flipped voltages with negated terminal currents (the
    /// Jacobian is unchanged by the mirror).
    pub fn evaluate(&self, model: &BjtModel, vbe: f64, vbc: f64) -> BjtEval {
        let (vbe_i, vbc_i, sign) = match self.polarity {
            BjtPolarity::Npn => (vbe, vbc, 1.0),
            BjtPolarity::Pnp => (-vbe, -vbc, -1.0),
        };

        let vt = thermal_voltage(300.15);
        let exp_be = (vbe_i / vt).exp();
        let exp_bc = (vbc_i / vt).exp();

        let if_current = model.is * (exp_be - 1.0);
        let ir_current = model.is * (exp_bc - 1.0);
        let gif = model.is * exp_be / vt;
        let gir = model.is * exp_bc / vt;

        // Reverse transport factor 1 + 1/βr appears in the collector term.
        let a = 1.0 + 1.0 / model.br;

        let ic0 = if_current - a * ir_current;
        let ib0 = if_current / model.bf + ir_current / model.br;
        let ie0 = -(ic0 + ib0);

        // Early factors; an infinite Early voltage disables the effect.
        let inv_vaf = if model.vaf.is_finite() { 1.0 / model.vaf } else { 0.0 };
        let inv_var = if model.var.is_finite() { 1.0 / model.var } else { 0.0 };
        let kc = 1.0 - vbc_i * inv_vaf;
        let ke = 1.0 - vbe_i * inv_var;

        // Partials of the un-scaled currents with respect to (Vc, Vb, Ve),
        // using Vbe = Vb − Ve and Vbc = Vb − Vc.
        let dic0 = [a * gir, gif - a * gir, -gif];
        let dib0 = [
            -gir / model.br,
            gif / model.bf + gir / model.br,
            -gif / model.bf,
        ];
        let die0 = [
            -(dic0[0] + dib0[0]),
            -(dic0[1] + dib0[1]),
            -(dic0[2] + dib0[2]),
        ];
        let dkc = [inv_vaf, -inv_vaf, 0.0];
        let dke = [0.0, -inv_var, inv_var];

        let mut g = [[0.0; 3]; 3];
        for y in 0..3 {
            g[0][y] = dic0[y] * kc + ic0 * dkc[y];
            g[1][y] = dib0[y];
            g[2][y] = die0[y] * ke + ie0 * dke[y];
        }

        BjtEval {
            ic: sign * ic0 * kc,
            ib: sign * ib0,
            ie: sign * ie0 * ke,
            g,
        }
    }

    /// Stamp the companion model at the stored bias.
    ///
    /// The nine Jacobian conductances are stamped at every frequency; the
    /// three Norton equivalent currents only into the DC system. GMIN shunts
    /// across B-E and C-E keep the matrix non-singular at zero bias.
    pub(crate) fn stamp(&self, sys: &mut NodalSystem, omega: f64, state: &BjtState) {
        let terminals = [
            self.collector.index(),
            self.base.index(),
            self.emitter.index(),
        ];

        for (x, row) in terminals.iter().enumerate() {
            let Some(r) = *row else { continue };
            for (y, col) in terminals.iter().enumerate() {
                if let Some(c) = *col {
                    sys.add(r, c, Complex::new(state.g[x][y], 0.0));
                }
            }
        }

        sys.stamp_conductance(terminals[1], terminals[2], GMIN);
        sys.stamp_conductance(terminals[0], terminals[2], GMIN);

        if omega == 0.0 {
            // Rows sum to zero, so Σ g[x][y]·V_y reduces to junction terms.
            let vce = state.vbe - state.vbc;
            let currents = [state.ic, state.ib, state.ie];
            for (x, row) in terminals.iter().enumerate() {
                let Some(r) = *row else { continue };
                let ieq = currents[x] - state.g[x][0] * vce - state.g[x][1] * state.vbe;
                sys.add_rhs(r, Complex::new(-ieq, 0.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> BjtModel {
        BjtModel::default()
    }

    fn npn() -> Bjt {
        Bjt::npn("Q1", NodeId::new(1), NodeId::new(2), NodeId::GROUND, "QX")
    }

    #[test]
    fn test_cutoff() {
        let q = npn();
        // Both junctions reverse biased
        let eval = q.evaluate(&model(), -0.5, -5.5);

        assert!(eval.ic.abs() < 1e-12, "Ic ≈ 0 in cutoff: {}", eval.ic);
        assert!(eval.ib.abs() < 1e-12, "Ib ≈ 0 in cutoff: {}", eval.ib);
    }

    #[test]
    fn test_forward_active_beta() {
        let q = npn();
        // Vbe = 0.7, Vce = 5 → Vbc = -4.3
        let eval = q.evaluate(&model(), 0.7, -4.3);

        assert!(eval.ic > 0.0);
        assert!(eval.ib > 0.0);
        assert!(eval.ie < 0.0, "emitter current flows out: {}", eval.ie);

        let beta = eval.ic / eval.ib;
        assert!((beta - 100.0).abs() < 1.0, "β ≈ 100: {}", beta);

        // KCL across the device
        assert!((eval.ic + eval.ib + eval.ie).abs() < 1e-12 * eval.ic.abs());

        // gm = ∂Ic/∂Vbe = g[0][1] (with Vbc fixed this is the Vb entry)
        let vt = thermal_voltage(300.15);
        let gm = eval.g[0][1];
        assert!(
            (gm - eval.ic / vt).abs() / gm < 0.01,
            "gm = {} (expected ≈ Ic/Vt = {})",
            gm,
            eval.ic / vt
        );
    }

    #[test]
    fn test_jacobian_rows_sum_to_zero() {
        let mut m = model();
        m.vaf = 75.0;
        m.var = 40.0;
        let q = npn();
        let eval = q.evaluate(&m, 0.68, 0.2);

        for row in eval.g {
            let sum: f64 = row.iter().sum();
            let scale: f64 = row.iter().map(|v| v.abs()).sum();
            assert!(sum.abs() <= 1e-12 * scale.max(1.0), "row sum {}", sum);
        }
    }

    #[test]
    fn test_jacobian_matches_finite_difference() {
        let mut m = model();
        m.vaf = 75.0;
        let q = npn();

        let vbe = 0.68;
        let vbc = -2.0;
        let eval = q.evaluate(&m, vbe, vbc);

        let h = 1e-7;
        // Perturb Vb: both junction voltages move together.
        let up = q.evaluate(&m, vbe + h, vbc + h);
        let fd_ic = (up.ic - eval.ic) / h;
        assert!(
            (fd_ic - eval.g[0][1]).abs() / fd_ic.abs().max(1e-12) < 1e-4,
            "dIc/dVb: fd {} vs analytic {}",
            fd_ic,
            eval.g[0][1]
        );

        // Perturb Vc: only Vbc moves, and in the negative direction.
        let up_c = q.evaluate(&m, vbe, vbc - h);
        let fd_ic_c = (up_c.ic - eval.ic) / h;
        assert!(
            (fd_ic_c - eval.g[0][0]).abs() / fd_ic_c.abs().max(1e-9) < 1e-3,
            "dIc/dVc: fd {} vs analytic {}",
            fd_ic_c,
            eval.g[0][0]
        );
    }

    #[test]
    fn test_pnp_mirror() {
        let q = Bjt::pnp("Q2", NodeId::new(1), NodeId::new(2), NodeId::new(3), "QX");
        let eval = q.evaluate(&model(), -0.7, 4.3);

        assert!(eval.ic < 0.0, "PNP Ic flows out of the collector");
        assert!(eval.ib < 0.0, "PNP Ib flows out of the base");

        // Mirror of the NPN at flipped bias
        let n = npn().evaluate(&model(), 0.7, -4.3);
        assert!((eval.ic + n.ic).abs() < 1e-15 + 1e-12 * n.ic.abs());
        assert!((eval.g[0][1] - n.g[0][1]).abs() < 1e-12 * n.g[0][1].abs());
    }

    #[test]
    fn test_early_effect_raises_output_conductance() {
        let mut m = model();
        m.vaf = 100.0;
        let q = npn();

        // Forward active; output conductance is ∂Ic/∂Vc = g[0][0]
        let eval = q.evaluate(&m, 0.7, -4.3);
        let go = eval.g[0][0];
        let expected = eval.ic / (100.0 + 4.3 + 0.7); // Ic/Vaf to first order
        assert!(go > 0.0);
        assert!(
            (go - eval.ic / 100.0).abs() / go < 0.1,
            "go = {} (expected ≈ Ic/Vaf = {}, crude {})",
            go,
            eval.ic / 100.0,
            expected
        );
    }

    #[test]
    fn test_stamp_shape() {
        let q = npn();
        let eval = q.evaluate(&model(), 0.65, -4.35);
        let state = BjtState {
            vbe: 0.65,
            vbc: -4.35,
            ic: eval.ic,
            ib: eval.ib,
            ie: eval.ie,
            g: eval.g,
        };

        let mut sys = NodalSystem::new(2);
        q.stamp(&mut sys, 0.0, &state);

        // Collector row picks up the gm entry at the base column
        assert!(sys.matrix()[(0, 1)].re > 0.0, "G[c,b] should carry gm");
        // Base row carries gpi on the diagonal
        assert!(sys.matrix()[(1, 1)].re > 0.0, "G[b,b] should carry gpi");
    }
}
