//! SPICE-style netlist parsing for Saffron.
//!
//! The accepted dialect is line-oriented classic SPICE:
//!
//! ```text
//! Common-emitter stage
//! VCC 1 0 DC 12
//! VIN 5 0 AC 1 0
//! CIN 5 2 10u
//! R1  1 2 47k
//! R2  2 0 10k
//! RC  1 3 2.2k
//! RE  4 0 560
//! Q1  3 2 4 QN
//! .model QN NPN (IS=1e-14 BF=100)
//! .ac dec 10 1 10meg
//! .print ac v(3)
//! .end
//! ```
//!
//! - The first line is the title.
//! - `*` starts a comment, `+` continues the previous card.
//! - Elements: `R`/`C`/`L` (value), `V`/`I` (`DC value` or
//!   `AC amplitude [phase_deg]`), `G` (VCCS), `D`, `Q`, `M` (model
//!   reference; transistor polarity comes from the model card kind).
//! - Cards: `.model` (`D`, `NPN`, `PNP`, `NMOS`, `PMOS`), `.ac dec`,
//!   `.print ac v(n)`, `.op`, `.end`.
//!
//! Phases are written in degrees in the netlist and stored in radians.

mod error;
mod parser;

pub use error::{Error, Result};
pub use parser::{parse, AcCommand, Deck};
