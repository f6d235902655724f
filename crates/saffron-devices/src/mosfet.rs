//! MOSFET level-1 (square-law) device model.

use num_complex::Complex;
use saffron_core::model::MosfetModel;
use saffron_core::{NodalSystem, NodeId};

use crate::state::MosfetState;
use crate::GMIN;

/// MOSFET polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosfetPolarity {
    Nmos,
    Pmos,
}

/// Operating region of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosfetRegion {
    Cutoff,
    Triode,
    Saturation,
}

/// Evaluated drain current and small-signal parameters.
#[derive(Debug, Clone, Copy)]
pub struct MosfetEval {
    /// Drain current (A), into the drain terminal.
    pub id: f64,
    /// Transconductance ∂Id/∂Vgs (S).
    pub gm: f64,
    /// Output conductance ∂Id/∂Vds (S).
    pub gds: f64,
    /// Channel operating region.
    pub region: MosfetRegion,
}

/// A MOSFET element.
#[derive(Debug, Clone)]
pub struct Mosfet {
    /// Device name (e.g., "M1").
    pub name: String,
    /// Drain node.
    pub drain: NodeId,
    /// Gate node.
    pub gate: NodeId,
    /// Source node.
    pub source: NodeId,
    /// NMOS or PMOS.
    pub polarity: MosfetPolarity,
    /// Model card name.
    pub model: String,
}

impl Mosfet {
    /// Create a new NMOS transistor referencing a model card.
    pub fn nmos(
        name: impl Into<String>,
        drain: NodeId,
        gate: NodeId,
        source: NodeId,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            drain,
            gate,
            source,
            polarity: MosfetPolarity::Nmos,
            model: model.into(),
        }
    }

    /// Create a new PMOS transistor referencing a model card.
    pub fn pmos(
        name: impl Into<String>,
        drain: NodeId,
        gate: NodeId,
        source: NodeId,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            drain,
            gate,
            source,
            polarity: MosfetPolarity::Pmos,
            model: model.into(),
        }
    }

    /// Evaluate the drain current and its partial derivatives.
    ///
    /// For NMOS (PMOS is the sign mirror):
    /// - Cutoff:     `Vgs ≤ Vto` → `Id = 0`
    /// - Triode:     `Vds < Vgs − Vto` →
    ///   `Id = k·((Vgs−Vto)·Vds − Vds²/2)·(1 + λVds)`
    /// - Saturation: `Vds ≥ Vgs − Vto` →
    ///   `Id = k/2·(Vgs−Vto)²·(1 + λVds)`
    ///
    /// The gate draws no current; the source current is `−Id`.
    pub fn evaluate(&self, model: &MosfetModel, vgs: f64, vds: f64) -> MosfetEval {
        let (vgs_i, vds_i, sign) = match self.polarity {
            MosfetPolarity::Nmos => (vgs, vds, 1.0),
            MosfetPolarity::Pmos => (-vgs, -vds, -1.0),
        };

        let vth = model.vto.abs();
        let k = model.k;
        let lambda = model.lambda;
        let vov = vgs_i - vth;

        let (id, gm, gds, region) = if vov <= 0.0 {
            (0.0, 0.0, 0.0, MosfetRegion::Cutoff)
        } else if vds_i < vov {
            let cl = 1.0 + lambda * vds_i;
            let shape = vov * vds_i - 0.5 * vds_i * vds_i;
            let id = k * shape * cl;
            let gm = k * vds_i * cl;
            let gds = k * (vov - vds_i) * cl + k * shape * lambda;
            (id, gm, gds, MosfetRegion::Triode)
        } else {
            let cl = 1.0 + lambda * vds_i;
            let id = 0.5 * k * vov * vov * cl;
            let gm = k * vov * cl;
            let gds = 0.5 * k * vov * vov * lambda;
            (id, gm, gds, MosfetRegion::Saturation)
        };

        MosfetEval {
            id: sign * id,
            gm,
            gds: gds.max(GMIN),
            region,
        }
    }

    /// Stamp the companion model at the stored bias.
    ///
    /// Small-signal part: `gds` between drain and source, plus the `gm·Vgs`
    /// transconductance from drain to source. The Norton equivalent
    /// `Ieq = Id − gm·Vgs − gds·Vds` is stamped only into the DC system.
    pub(crate) fn stamp(&self, sys: &mut NodalSystem, omega: f64, state: &MosfetState) {
        let d = self.drain.index();
        let g = self.gate.index();
        let s = self.source.index();

        sys.stamp_conductance(d, s, state.gds);
        sys.stamp_transconductance(d, s, g, s, state.gm);

        if omega == 0.0 {
            let ieq = state.id - state.gm * state.vgs - state.gds * state.vds;
            sys.stamp_current_source(d, s, Complex::new(ieq, 0.0));
        }
    }
}
