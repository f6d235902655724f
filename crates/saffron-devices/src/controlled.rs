//! Controlled source models.

use saffron_core::{NodalSystem, NodeId};

/// A voltage-controlled current source.
///
/// Current `gm · (V(ctrl_pos) − V(ctrl_neg))` flows from `out_pos` to
/// `out_neg` through the source.
#[derive(Debug, Clone)]
pub struct Vccs {
    /// Device name (e.g., "G1").
    pub name: String,
    /// Output positive node (current leaves the circuit here).
    pub out_pos: NodeId,
    /// Output negative node.
    pub out_neg: NodeId,
    /// Controlling positive node.
    pub ctrl_pos: NodeId,
    /// Controlling negative node.
    pub ctrl_neg: NodeId,
    /// Transconductance in siemens.
    pub gm: f64,
}

impl Vccs {
    /// Create a new VCCS.
    pub fn new(
        name: impl Into<String>,
        out_pos: NodeId,
        out_neg: NodeId,
        ctrl_pos: NodeId,
        ctrl_neg: NodeId,
        gm: f64,
    ) -> Self {
        Self {
            name: name.into(),
            out_pos,
            out_neg,
            ctrl_pos,
            ctrl_neg,
            gm,
        }
    }

    pub(crate) fn stamp(&self, sys: &mut NodalSystem) {
        sys.stamp_transconductance(
            self.out_pos.index(),
            self.out_neg.index(),
            self.ctrl_pos.index(),
            self.ctrl_neg.index(),
            self.gm,
        );
    }
}
