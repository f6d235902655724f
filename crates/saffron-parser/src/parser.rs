//! The netlist parser.

use std::collections::HashMap;

use saffron_core::model::{BjtModel, DiodeModel, ModelCard, MosfetModel};
use saffron_core::units::parse_value;
use saffron_core::{ModelLibrary, NodeId};
use saffron_devices::{
    AcCurrentSource, AcVoltageSource, Bjt, BjtPolarity, Capacitor, Circuit, DcCurrentSource,
    DcVoltageSource, Device, Diode, Inductor, Mosfet, MosfetPolarity, Resistor, Vccs,
};

use crate::error::{Error, Result};

/// A `.ac dec` analysis request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcCommand {
    /// Points per decade of the logarithmic sweep.
    pub points_per_decade: usize,
    /// Start frequency (Hz).
    pub fstart: f64,
    /// Stop frequency (Hz).
    pub fstop: f64,
}

/// A parsed netlist: the circuit plus its analysis requests.
#[derive(Debug)]
pub struct Deck {
    /// Title line of the netlist.
    pub title: Option<String>,
    /// The circuit, ready for validation and analysis.
    pub circuit: Circuit,
    /// The `.ac` command, if present.
    pub ac: Option<AcCommand>,
    /// Output node selected by `.print ac v(n)`.
    pub output: Option<NodeId>,
}

/// Parse a netlist into a [`Deck`].
pub fn parse(source: &str) -> Result<Deck> {
    // Join continuation lines first, keeping original line numbers for
    // error reporting.
    let mut cards: Vec<(usize, String)> = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('*') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('+') {
            match cards.last_mut() {
                Some((_, prev)) => {
                    prev.push(' ');
                    prev.push_str(rest.trim());
                }
                None => return Err(Error::syntax(i + 1, "continuation before any card")),
            }
            continue;
        }
        cards.push((i + 1, line.to_string()));
    }

    let mut cards = cards.into_iter();
    let title = cards.next().map(|(_, t)| t);

    let mut devices: Vec<Device> = Vec::new();
    let mut models = ModelLibrary::new();
    // Transistor polarity lives on the model card kind; devices reference
    // cards that may appear later, so polarities are patched afterwards.
    let mut bjt_polarity: HashMap<String, BjtPolarity> = HashMap::new();
    let mut mos_polarity: HashMap<String, MosfetPolarity> = HashMap::new();
    let mut ac: Option<AcCommand> = None;
    let mut output: Option<NodeId> = None;

    for (line, card) in cards {
        let tokens: Vec<&str> = card.split_whitespace().collect();
        let head = tokens[0];

        if let Some(dot_card) = head.strip_prefix('.') {
            match dot_card.to_uppercase().as_str() {
                "MODEL" => parse_model(
                    line,
                    &card,
                    &mut models,
                    &mut bjt_polarity,
                    &mut mos_polarity,
                )?,
                "AC" => ac = Some(parse_ac(line, &tokens)?),
                "PRINT" | "PLOT" => {
                    if output.is_none() {
                        output = parse_print(line, &tokens)?;
                    }
                }
                "OP" => {}
                "END" => break,
                _ => {
                    return Err(Error::Unsupported {
                        line,
                        card: head.to_string(),
                    })
                }
            }
            continue;
        }

        devices.push(parse_element(line, &tokens)?);
    }

    if devices.is_empty() {
        return Err(Error::Empty);
    }

    // Patch transistor polarities now that every model card is known.
    for device in &mut devices {
        match device {
            Device::Bjt(q) => {
                if let Some(p) = bjt_polarity.get(&q.model.to_uppercase()) {
                    q.polarity = *p;
                }
            }
            Device::Mosfet(m) => {
                if let Some(p) = mos_polarity.get(&m.model.to_uppercase()) {
                    m.polarity = *p;
                }
            }
            _ => {}
        }
    }

    Ok(Deck {
        title,
        circuit: Circuit::new(devices, models),
        ac,
        output,
    })
}

fn parse_node(line: usize, token: &str) -> Result<NodeId> {
    token
        .parse::<u32>()
        .map(NodeId::new)
        .map_err(|_| Error::syntax(line, format!("invalid node `{}`", token)))
}

fn parse_number(line: usize, token: &str) -> Result<f64> {
    parse_value(token).ok_or_else(|| Error::syntax(line, format!("invalid value `{}`", token)))
}

fn expect_tokens(line: usize, tokens: &[&str], count: usize) -> Result<()> {
    if tokens.len() < count {
        Err(Error::syntax(
            line,
            format!("expected at least {} fields, found {}", count, tokens.len()),
        ))
    } else {
        Ok(())
    }
}

fn parse_element(line: usize, tokens: &[&str]) -> Result<Device> {
    let name = tokens[0].to_uppercase();
    let kind = name.chars().next().expect("card is non-empty");

    match kind {
        'R' | 'C' | 'L' => {
            expect_tokens(line, tokens, 4)?;
            let a = parse_node(line, tokens[1])?;
            let b = parse_node(line, tokens[2])?;
            let value = parse_number(line, tokens[3])?;
            Ok(match kind {
                'R' => Device::Resistor(Resistor::new(name, a, b, value)),
                'C' => Device::Capacitor(Capacitor::new(name, a, b, value)),
                _ => Device::Inductor(Inductor::new(name, a, b, value)),
            })
        }
        'V' | 'I' => {
            expect_tokens(line, tokens, 5)?;
            let pos = parse_node(line, tokens[1])?;
            let neg = parse_node(line, tokens[2])?;
            match tokens[3].to_uppercase().as_str() {
                "DC" => {
                    let value = parse_number(line, tokens[4])?;
                    Ok(if kind == 'V' {
                        Device::DcVoltageSource(DcVoltageSource::new(name, pos, neg, value))
                    } else {
                        Device::DcCurrentSource(DcCurrentSource::new(name, pos, neg, value))
                    })
                }
                "AC" => {
                    let amplitude = parse_number(line, tokens[4])?;
                    let phase_deg = match tokens.get(5) {
                        Some(t) => parse_number(line, t)?,
                        None => 0.0,
                    };
                    let phase = phase_deg.to_radians();
                    Ok(if kind == 'V' {
                        Device::AcVoltageSource(AcVoltageSource::new(
                            name, pos, neg, amplitude, phase,
                        ))
                    } else {
                        Device::AcCurrentSource(AcCurrentSource::new(
                            name, pos, neg, amplitude, phase,
                        ))
                    })
                }
                other => Err(Error::syntax(
                    line,
                    format!("source kind must be DC or AC, found `{}`", other),
                )),
            }
        }
        'G' => {
            expect_tokens(line, tokens, 6)?;
            let out_pos = parse_node(line, tokens[1])?;
            let out_neg = parse_node(line, tokens[2])?;
            let ctrl_pos = parse_node(line, tokens[3])?;
            let ctrl_neg = parse_node(line, tokens[4])?;
            let gm = parse_number(line, tokens[5])?;
            Ok(Device::Vccs(Vccs::new(
                name, out_pos, out_neg, ctrl_pos, ctrl_neg, gm,
            )))
        }
        'D' => {
            expect_tokens(line, tokens, 4)?;
            let anode = parse_node(line, tokens[1])?;
            let cathode = parse_node(line, tokens[2])?;
            Ok(Device::Diode(Diode::new(name, anode, cathode, tokens[3])))
        }
        'Q' => {
            expect_tokens(line, tokens, 5)?;
            let c = parse_node(line, tokens[1])?;
            let b = parse_node(line, tokens[2])?;
            let e = parse_node(line, tokens[3])?;
            Ok(Device::Bjt(Bjt::npn(name, c, b, e, tokens[4])))
        }
        'M' => {
            expect_tokens(line, tokens, 5)?;
            let d = parse_node(line, tokens[1])?;
            let g = parse_node(line, tokens[2])?;
            let s = parse_node(line, tokens[3])?;
            Ok(Device::Mosfet(Mosfet::nmos(name, d, g, s, tokens[4])))
        }
        other => Err(Error::syntax(
            line,
            format!("unknown element type `{}`", other),
        )),
    }
}

fn parse_model(
    line: usize,
    card: &str,
    models: &mut ModelLibrary,
    bjt_polarity: &mut HashMap<String, BjtPolarity>,
    mos_polarity: &mut HashMap<String, MosfetPolarity>,
) -> Result<()> {
    // Parentheses around the parameter list are decorative; with them gone
    // the card is `.model NAME KIND [KEY=VALUE]...`.
    let cleaned = card.replace(['(', ')'], " ");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    expect_tokens(line, &tokens, 3)?;
    let name = tokens[1].to_uppercase();
    let kind = tokens[2].to_uppercase();

    let mut params: HashMap<String, f64> = HashMap::new();
    for item in &tokens[3..] {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| Error::syntax(line, format!("expected KEY=VALUE, found `{}`", item)))?;
        params.insert(key.to_uppercase(), parse_number(line, value)?);
    }

    let get = |key: &str, default: f64| params.get(key).copied().unwrap_or(default);

    match kind.as_str() {
        "D" => {
            models.insert(name, ModelCard::Diode(DiodeModel { is: get("IS", 1e-14) }));
        }
        "NPN" | "PNP" => {
            models.insert(
                name.clone(),
                ModelCard::Bjt(BjtModel {
                    is: get("IS", 1e-16),
                    bf: get("BF", 100.0),
                    br: get("BR", 1.0),
                    vaf: get("VAF", f64::INFINITY),
                    var: get("VAR", f64::INFINITY),
                }),
            );
            let polarity = if kind == "NPN" {
                BjtPolarity::Npn
            } else {
                BjtPolarity::Pnp
            };
            bjt_polarity.insert(name, polarity);
        }
        "NMOS" | "PMOS" => {
            let sign = if kind == "NMOS" { 1.0 } else { -1.0 };
            models.insert(
                name.clone(),
                ModelCard::Mosfet(MosfetModel {
                    vto: get("VTO", sign * 0.7),
                    k: get("K", get("KP", 2e-4)),
                    lambda: get("LAMBDA", 0.0),
                }),
            );
            let polarity = if kind == "NMOS" {
                MosfetPolarity::Nmos
            } else {
                MosfetPolarity::Pmos
            };
            mos_polarity.insert(name, polarity);
        }
        other => {
            return Err(Error::syntax(
                line,
                format!("unknown model kind `{}`", other),
            ))
        }
    }
    Ok(())
}

fn parse_ac(line: usize, tokens: &[&str]) -> Result<AcCommand> {
    expect_tokens(line, tokens, 5)?;
    if !tokens[1].eq_ignore_ascii_case("dec") {
        return Err(Error::syntax(
            line,
            format!("only decade sweeps are supported, found `{}`", tokens[1]),
        ));
    }
    let points_per_decade = tokens[2]
        .parse::<usize>()
        .map_err(|_| Error::syntax(line, format!("invalid point count `{}`", tokens[2])))?;
    let fstart = parse_number(line, tokens[3])?;
    let fstop = parse_number(line, tokens[4])?;
    Ok(AcCommand {
        points_per_decade,
        fstart,
        fstop,
    })
}

fn parse_print(line: usize, tokens: &[&str]) -> Result<Option<NodeId>> {
    // `.print ac v(2)` — scan the variables for the first v(n).
    for token in &tokens[1..] {
        let t = token.to_uppercase();
        if let Some(inner) = t.strip_prefix("V(").and_then(|s| s.strip_suffix(')')) {
            return parse_node(line, inner).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_divider() {
        let deck = parse("Divider\nV1 1 0 DC 10\nR1 1 2 1k\nR2 2 0 1k\n.op\n.end\n").unwrap();

        assert_eq!(deck.title.as_deref(), Some("Divider"));
        assert_eq!(deck.circuit.devices().len(), 3);
        assert_eq!(deck.circuit.num_nodes(), 2);
        assert!(deck.ac.is_none());

        match &deck.circuit.devices()[1] {
            Device::Resistor(r) => assert_eq!(r.resistance, 1e3),
            other => panic!("expected resistor, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ac_source_phase_in_degrees() {
        let deck = parse("t\nV1 1 0 AC 2 -90\nR1 1 0 1k\n.end\n").unwrap();
        match &deck.circuit.devices()[0] {
            Device::AcVoltageSource(v) => {
                assert_eq!(v.amplitude, 2.0);
                assert!((v.phase + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
            }
            other => panic!("expected AC source, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ac_command_and_print() {
        let deck =
            parse("t\nV1 1 0 AC 1\nR1 1 2 1k\nC1 2 0 100n\n.ac dec 10 1 100k\n.print ac v(2)\n.end\n")
                .unwrap();

        assert_eq!(
            deck.ac,
            Some(AcCommand {
                points_per_decade: 10,
                fstart: 1.0,
                fstop: 100e3,
            })
        );
        assert_eq!(deck.output, Some(NodeId::new(2)));
    }

    #[test]
    fn test_parse_model_cards() {
        let deck = parse(
            "t\nD1 1 2 DX\nQ1 3 1 0 QP\nM1 4 3 0 MP\nR1 4 0 1k\n\
             .model DX D (IS=2e-12)\n\
             .model QP PNP (IS=1e-15 BF=80 VAF=60)\n\
             .model MP PMOS (VTO=-0.9 K=1m)\n\
             .end\n",
        )
        .unwrap();

        let models = deck.circuit.models();
        assert_eq!(models.diode("D1", "DX").unwrap().is, 2e-12);
        let qp = models.bjt("Q1", "QP").unwrap();
        assert_eq!(qp.bf, 80.0);
        assert_eq!(qp.vaf, 60.0);
        let mp = models.mosfet("M1", "MP").unwrap();
        assert_eq!(mp.vto, -0.9);
        assert_eq!(mp.k, 1e-3);

        // Polarity comes from the card kind
        match &deck.circuit.devices()[1] {
            Device::Bjt(q) => assert_eq!(q.polarity, BjtPolarity::Pnp),
            other => panic!("expected BJT, got {:?}", other),
        }
        match &deck.circuit.devices()[2] {
            Device::Mosfet(m) => assert_eq!(m.polarity, MosfetPolarity::Pmos),
            other => panic!("expected MOSFET, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_vccs() {
        let deck = parse("t\nG1 2 0 1 0 2m\nR1 1 0 1k\nR2 2 0 1k\n.end\n").unwrap();
        match &deck.circuit.devices()[0] {
            Device::Vccs(g) => assert_eq!(g.gm, 2e-3),
            other => panic!("expected VCCS, got {:?}", other),
        }
    }

    #[test]
    fn test_continuation_lines() {
        let deck = parse("t\nV1 1 0\n+ DC 10\nR1 1 0 1k\n.end\n").unwrap();
        match &deck.circuit.devices()[0] {
            Device::DcVoltageSource(v) => assert_eq!(v.voltage, 10.0),
            other => panic!("expected DC source, got {:?}", other),
        }
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse("t\nR1 1 x 1k\n.end\n").unwrap_err();
        match err {
            Error::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("expected syntax error, got {:?}", other),
        }

        let err = parse("t\nR1 1 0 1k\n.noise v(1)\n.end\n").unwrap_err();
        assert!(matches!(err, Error::Unsupported { line: 3, .. }));

        let err = parse("t\n* only comments\n.end\n").unwrap_err();
        assert!(matches!(err, Error::Empty));
    }
}
