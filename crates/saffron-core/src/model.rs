//! Named device parameter cards.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Diode model parameters.
#[derive(Debug, Clone)]
pub struct DiodeModel {
    /// Reverse saturation current (A).
    pub is: f64,
}

impl Default for DiodeModel {
    fn default() -> Self {
        Self { is: 1e-14 }
    }
}

/// BJT model parameters (simplified Gummel-Poon).
#[derive(Debug, Clone)]
pub struct BjtModel {
    /// Saturation current (A).
    pub is: f64,
    /// Forward current gain.
    pub bf: f64,
    /// Reverse current gain.
    pub br: f64,
    /// Forward Early voltage (V); infinite disables the effect.
    pub vaf: f64,
    /// Reverse Early voltage (V); infinite disables the effect.
    pub var: f64,
}

impl Default for BjtModel {
    fn default() -> Self {
        Self {
            is: 1e-16,
            bf: 100.0,
            br: 1.0,
            vaf: f64::INFINITY,
            var: f64::INFINITY,
        }
    }
}

/// MOSFET level-1 model parameters.
#[derive(Debug, Clone)]
pub struct MosfetModel {
    /// Threshold voltage (V), negative for PMOS cards.
    pub vto: f64,
    /// Transconductance parameter µ·Cox·W/L (A/V²).
    pub k: f64,
    /// Channel-length modulation (1/V).
    pub lambda: f64,
}

impl Default for MosfetModel {
    fn default() -> Self {
        Self {
            vto: 0.7,
            k: 2e-4,
            lambda: 0.0,
        }
    }
}

/// A named parameter bundle of a specific device family.
#[derive(Debug, Clone)]
pub enum ModelCard {
    Diode(DiodeModel),
    Bjt(BjtModel),
    Mosfet(MosfetModel),
}

impl ModelCard {
    fn kind(&self) -> &'static str {
        match self {
            ModelCard::Diode(_) => "diode",
            ModelCard::Bjt(_) => "BJT",
            ModelCard::Mosfet(_) => "MOSFET",
        }
    }
}

/// Model store: maps model names to parameter cards.
///
/// Lookups are case-insensitive; an unknown name is a configuration error
/// naming the device that referenced it.
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    cards: HashMap<String, ModelCard>,
}

impl ModelLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a card under the given name, replacing any previous card.
    pub fn insert(&mut self, name: impl Into<String>, card: ModelCard) {
        self.cards.insert(name.into().to_uppercase(), card);
    }

    /// Number of cards in the library.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the library holds no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn lookup(&self, device: &str, model: &str) -> Result<&ModelCard> {
        self.cards
            .get(&model.to_uppercase())
            .ok_or_else(|| Error::UnknownModel {
                device: device.to_string(),
                model: model.to_string(),
            })
    }

    /// Fetch a diode card, failing if the name is unknown or of another kind.
    pub fn diode(&self, device: &str, model: &str) -> Result<&DiodeModel> {
        match self.lookup(device, model)? {
            ModelCard::Diode(m) => Ok(m),
            other => Err(Error::ModelKindMismatch {
                device: device.to_string(),
                model: model.to_string(),
                expected: "diode",
                found: other.kind(),
            }),
        }
    }

    /// Fetch a BJT card, failing if the name is unknown or of another kind.
    pub fn bjt(&self, device: &str, model: &str) -> Result<&BjtModel> {
        match self.lookup(device, model)? {
            ModelCard::Bjt(m) => Ok(m),
            other => Err(Error::ModelKindMismatch {
                device: device.to_string(),
                model: model.to_string(),
                expected: "BJT",
                found: other.kind(),
            }),
        }
    }

    /// Fetch a MOSFET card, failing if the name is unknown or of another kind.
    pub fn mosfet(&self, device: &str, model: &str) -> Result<&MosfetModel> {
        match self.lookup(device, model)? {
            ModelCard::Mosfet(m) => Ok(m),
            other => Err(Error::ModelKindMismatch {
                device: device.to_string(),
                model: model.to_string(),
                expected: "MOSFET",
                found: other.kind(),
            }),
        }
    }
}
