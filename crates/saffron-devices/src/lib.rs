//! Device models and MNA stamps for Saffron.
//!
//! This crate provides:
//! - Passive elements: R, C, L
//! - Independent sources: DC/AC voltage and current
//! - Controlled sources: VCCS
//! - Nonlinear devices: Diode (Shockley), BJT (simplified Gummel-Poon),
//!   MOSFET (level-1 square law)
//! - The [`Device`] sum type tying them together, the [`Circuit`] container,
//!   and the [`BiasState`] companion-model state used by the DC operating
//!   point solver and the AC stamps.
//!
//! Nonlinear device state is kept outside the circuit, in a [`BiasState`]
//! vector parallel to the device list, so a sweep can run against a fixed,
//! read-only [`Circuit`].

pub mod bjt;
pub mod circuit;
pub mod controlled;
pub mod device;
pub mod diode;
pub mod error;
pub mod mosfet;
pub mod passive;
pub mod sources;
pub mod state;

pub use bjt::{Bjt, BjtPolarity};
pub use circuit::Circuit;
pub use controlled::Vccs;
pub use device::{Device, VoltageConstraint};
pub use diode::{thermal_voltage, Diode};
pub use error::{Error, Result};
pub use mosfet::{Mosfet, MosfetPolarity, MosfetRegion};
pub use passive::{Capacitor, Inductor, Resistor};
pub use sources::{AcCurrentSource, AcVoltageSource, DcCurrentSource, DcVoltageSource};
pub use state::{BiasState, DeviceState};

/// Minimum conductance floor (S) applied to nonlinear device companions so
/// the nodal matrix stays non-singular at zero bias.
pub const GMIN: f64 = 1e-12;
