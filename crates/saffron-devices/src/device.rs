//! The device sum type and its stamping contract.

use num_complex::Complex;
use saffron_core::{NodalSystem, NodeId};

use crate::bjt::Bjt;
use crate::controlled::Vccs;
use crate::diode::Diode;
use crate::mosfet::Mosfet;
use crate::passive::{Capacitor, Inductor, Resistor};
use crate::sources::{AcCurrentSource, AcVoltageSource, DcCurrentSource, DcVoltageSource};
use crate::state::DeviceState;

/// An ideal voltage constraint `V(n+) − V(n−) = value`, applied to the
/// nodal system by row replacement after all additive stamps.
#[derive(Debug, Clone, Copy)]
pub struct VoltageConstraint {
    /// Positive terminal.
    pub node_pos: NodeId,
    /// Negative terminal.
    pub node_neg: NodeId,
    /// Constraint phasor at the analysis frequency.
    pub value: Complex<f64>,
}

/// A circuit device.
///
/// Every component kind the simulator understands is a variant here; the
/// stamp engine matches exhaustively, so adding a variant is a compile-time
/// checklist of every place that must learn about it.
#[derive(Debug, Clone)]
pub enum Device {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
    DcVoltageSource(DcVoltageSource),
    AcVoltageSource(AcVoltageSource),
    DcCurrentSource(DcCurrentSource),
    AcCurrentSource(AcCurrentSource),
    Vccs(Vccs),
    Diode(Diode),
    Bjt(Bjt),
    Mosfet(Mosfet),
}

impl Device {
    /// Device name as written in the netlist.
    pub fn name(&self) -> &str {
        match self {
            Device::Resistor(d) => &d.name,
            Device::Capacitor(d) => &d.name,
            Device::Inductor(d) => &d.name,
            Device::DcVoltageSource(d) => &d.name,
            Device::AcVoltageSource(d) => &d.name,
            Device::DcCurrentSource(d) => &d.name,
            Device::AcCurrentSource(d) => &d.name,
            Device::Vccs(d) => &d.name,
            Device::Diode(d) => &d.name,
            Device::Bjt(d) => &d.name,
            Device::Mosfet(d) => &d.name,
        }
    }

    /// Ordered terminal list. The order is fixed per variant: two-terminal
    /// devices list (pos, neg) or (in, out); the VCCS lists output then
    /// control pair; transistors list (C, B, E) and (D, G, S).
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Device::Resistor(d) => vec![d.node_pos, d.node_neg],
            Device::Capacitor(d) => vec![d.node_pos, d.node_neg],
            Device::Inductor(d) => vec![d.node_pos, d.node_neg],
            Device::DcVoltageSource(d) => vec![d.node_pos, d.node_neg],
            Device::AcVoltageSource(d) => vec![d.node_pos, d.node_neg],
            Device::DcCurrentSource(d) => vec![d.node_in, d.node_out],
            Device::AcCurrentSource(d) => vec![d.node_in, d.node_out],
            Device::Vccs(d) => vec![d.out_pos, d.out_neg, d.ctrl_pos, d.ctrl_neg],
            Device::Diode(d) => vec![d.anode, d.cathode],
            Device::Bjt(d) => vec![d.collector, d.base, d.emitter],
            Device::Mosfet(d) => vec![d.drain, d.gate, d.source],
        }
    }

    /// Whether this device requires the Newton-Raphson operating point.
    pub fn is_nonlinear(&self) -> bool {
        matches!(self, Device::Diode(_) | Device::Bjt(_) | Device::Mosfet(_))
    }

    /// The voltage-source constraint this device imposes at `omega`, if any.
    ///
    /// Voltage sources always constrain (their phasor is zero on the other
    /// side of DC); inductors only when they act as shorts (ω = 0 or L = 0).
    /// Short-circuited sources (`n+ == n−`) impose `0 = 0` and are dropped.
    pub fn source_constraint(&self, omega: f64) -> Option<VoltageConstraint> {
        let (node_pos, node_neg, value) = match self {
            Device::DcVoltageSource(d) => (d.node_pos, d.node_neg, d.phasor(omega)),
            Device::AcVoltageSource(d) => (d.node_pos, d.node_neg, d.phasor(omega)),
            Device::Inductor(d) if d.is_short(omega) => {
                (d.node_pos, d.node_neg, Complex::new(0.0, 0.0))
            }
            _ => return None,
        };
        if node_pos == node_neg {
            return None;
        }
        Some(VoltageConstraint {
            node_pos,
            node_neg,
            value,
        })
    }

    /// Additive stamp of this device into the nodal system at `omega`.
    ///
    /// Devices that act through a [`VoltageConstraint`] contribute nothing
    /// here. Nonlinear devices stamp the companion model held in `state`;
    /// the Norton equivalent currents are included only at DC (ω = 0), the
    /// AC system being excited by the AC sources alone.
    pub fn stamp(&self, sys: &mut NodalSystem, omega: f64, state: &DeviceState) {
        match self {
            Device::Resistor(d) => {
                sys.stamp_conductance(d.node_pos.index(), d.node_neg.index(), d.conductance());
            }
            Device::Capacitor(d) => {
                sys.stamp_admittance(d.node_pos.index(), d.node_neg.index(), d.admittance(omega));
            }
            Device::Inductor(d) => {
                if !d.is_short(omega) {
                    sys.stamp_admittance(
                        d.node_pos.index(),
                        d.node_neg.index(),
                        d.admittance(omega),
                    );
                }
            }
            Device::DcVoltageSource(_) | Device::AcVoltageSource(_) => {}
            Device::DcCurrentSource(d) => {
                sys.stamp_current_source(d.node_in.index(), d.node_out.index(), d.phasor(omega));
            }
            Device::AcCurrentSource(d) => {
                sys.stamp_current_source(d.node_in.index(), d.node_out.index(), d.phasor(omega));
            }
            Device::Vccs(d) => d.stamp(sys),
            Device::Diode(d) => {
                if let DeviceState::Diode(s) = state {
                    d.stamp(sys, omega, s);
                }
            }
            Device::Bjt(d) => {
                if let DeviceState::Bjt(s) = state {
                    d.stamp(sys, omega, s);
                }
            }
            Device::Mosfet(d) => {
                if let DeviceState::Mosfet(s) = state {
                    d.stamp(sys, omega, s);
                }
            }
        }
    }
}
