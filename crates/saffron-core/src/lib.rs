//! Core data structures for the Saffron circuit simulator.
//!
//! This crate provides the foundation shared by the device models and the
//! analysis engines:
//!
//! - [`NodeId`] - Identifies a circuit node (ground is node 0)
//! - [`NodalSystem`](system::NodalSystem) - The complex nodal equation G·v = i
//! - [`ModelLibrary`](model::ModelLibrary) - Named device parameter cards
//! - [`units`] - SPICE-style engineering value parsing
//!
//! # Nodal analysis
//!
//! Saffron uses the row-replacement form of Modified Nodal Analysis: the
//! system is an N×N complex conductance matrix over the non-ground node
//! voltages, and each ideal voltage source overwrites the KCL row of its
//! positive terminal with the constraint `V(n+) − V(n−) = Ṽ` instead of
//! introducing a branch-current unknown.
//!
//! ```rust
//! use num_complex::Complex;
//! use saffron_core::system::NodalSystem;
//!
//! // Voltage divider: V1 = 10V at node 1, R1 = R2 = 1k
//! let mut sys = NodalSystem::new(2);
//! sys.stamp_admittance(Some(0), Some(1), Complex::new(1e-3, 0.0));
//! sys.stamp_admittance(Some(1), None, Complex::new(1e-3, 0.0));
//! sys.replace_voltage_row(0, Some(0), None, Complex::new(10.0, 0.0));
//! assert_eq!(sys.matrix()[(0, 0)], Complex::new(1.0, 0.0));
//! ```

pub mod error;
pub mod model;
pub mod node;
pub mod system;
pub mod units;

pub use error::{Error, Result};
pub use model::{BjtModel, DiodeModel, ModelCard, ModelLibrary, MosfetModel};
pub use node::NodeId;
pub use system::NodalSystem;
