//! Analysis engines for Saffron.
//!
//! This crate provides the simulation pipeline:
//!
//! - **Stamp engine** ([`assemble`]) - builds the complex nodal system
//!   G(ω)·v = i(ω) from a circuit and a bias state
//! - **DC operating point** ([`solve_operating_point`]) - Newton-Raphson
//!   over the nonlinear companion models at ω = 0
//! - **AC sweep** ([`solve_ac`]) - logarithmic frequency sweep solving the
//!   linearized system at each point
//!
//! # Example: RC low-pass response
//!
//! ```rust
//! use saffron_core::{ModelLibrary, NodeId};
//! use saffron_devices::{AcVoltageSource, Capacitor, Circuit, Device, Resistor};
//! use saffron_solver::{solve_ac, AcParams};
//!
//! // V1 (1V AC) -- node1 -- R 1k -- node2 -- C 159.155nF -- GND
//! let circuit = Circuit::new(
//!     vec![
//!         Device::AcVoltageSource(AcVoltageSource::new(
//!             "V1", NodeId::new(1), NodeId::GROUND, 1.0, 0.0,
//!         )),
//!         Device::Resistor(Resistor::new("R1", NodeId::new(1), NodeId::new(2), 1e3)),
//!         Device::Capacitor(Capacitor::new("C1", NodeId::new(2), NodeId::GROUND, 159.155e-9)),
//!     ],
//!     ModelLibrary::new(),
//! );
//!
//! let params = AcParams {
//!     fstart: 10.0,
//!     fstop: 100e3,
//!     points_per_decade: 10,
//!     output: NodeId::new(2),
//!     reference: None,
//! };
//!
//! let result = solve_ac(&circuit, &params).unwrap();
//! assert_eq!(result.points.first().unwrap().frequency, 10.0);
//! ```

pub mod ac;
pub mod assemble;
pub mod error;
pub mod linear;
pub mod newton;

pub use ac::{generate_frequencies, solve_ac, AcParams, AcPoint, AcResult};
pub use assemble::assemble;
pub use error::{Error, Result};
pub use newton::{solve_operating_point, ConvergenceOptions, OperatingPoint};
