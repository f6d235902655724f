//! # Saffron
//!
//! A small-signal and operating-point circuit simulator in the SPICE
//! tradition. Saffron parses a textual netlist, finds the DC bias of the
//! nonlinear devices with Newton-Raphson, then sweeps frequency
//! logarithmically and reports amplitude and phase at an output node.
//!
//! ## Quick start
//!
//! ```rust
//! let netlist = "RC low-pass\n\
//!                V1 1 0 AC 1\n\
//!                R1 1 2 1k\n\
//!                C1 2 0 159.155n\n\
//!                .ac dec 10 10 100k\n\
//!                .print ac v(2)\n\
//!                .end\n";
//!
//! let deck = saffron::parse(netlist).unwrap();
//! let ac = deck.ac.unwrap();
//!
//! let params = saffron::AcParams {
//!     fstart: ac.fstart,
//!     fstop: ac.fstop,
//!     points_per_decade: ac.points_per_decade,
//!     output: deck.output.unwrap(),
//!     reference: None,
//! };
//!
//! let result = saffron::solve_ac(&deck.circuit, &params).unwrap();
//! // −3 dB at the 1 kHz corner
//! let corner = result.nearest(1000.0).unwrap();
//! assert!((corner.amplitude_db() + 3.01).abs() < 0.1);
//! ```

pub use saffron_core as core;
pub use saffron_devices as devices;
pub use saffron_parser as parser;
pub use saffron_solver as solver;

pub use saffron_core::{ModelCard, ModelLibrary, NodalSystem, NodeId};

pub use saffron_devices::{
    AcCurrentSource, AcVoltageSource, BiasState, Bjt, BjtPolarity, Capacitor, Circuit,
    DcCurrentSource, DcVoltageSource, Device, Diode, Inductor, Mosfet, MosfetPolarity, Resistor,
    Vccs,
};

pub use saffron_parser::{parse, AcCommand, Deck};

pub use saffron_solver::{
    solve_ac, solve_operating_point, AcParams, AcResult, ConvergenceOptions, OperatingPoint,
};

/// Re-export of nalgebra's dynamic vector and matrix types.
pub use nalgebra::{DMatrix, DVector};

/// Re-export of num_complex's complex scalar.
pub use num_complex::Complex;

/// Commonly used types and entry points.
pub mod prelude {
    pub use crate::{parse, solve_ac, solve_operating_point};
    pub use crate::{AcParams, AcResult, Circuit, Deck, Device, NodeId, OperatingPoint};
    pub use crate::{
        AcCurrentSource, AcVoltageSource, Bjt, Capacitor, DcCurrentSource, DcVoltageSource, Diode,
        Inductor, Mosfet, Resistor, Vccs,
    };
    pub use crate::{Complex, DMatrix, DVector};
}
