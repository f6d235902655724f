//! Saffron command-line interface.
//!
//! Reads a netlist, runs the analysis it requests and writes the results.
//! AC sweeps are written as CSV; a netlist without an `.ac` card gets a DC
//! operating-point report instead.
//!
//! Exit codes: 0 success, 1 I/O failure, 2 netlist or configuration error,
//! 3 DC non-convergence or device overflow, 4 singular MNA matrix.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use saffron_core::NodeId;
use saffron_parser::Deck;
use saffron_solver::{
    solve_ac, solve_operating_point, AcParams, AcResult, ConvergenceOptions, Error as SolverError,
};

#[derive(Parser)]
#[command(name = "saffron")]
#[command(about = "A small-signal circuit simulator in the SPICE tradition", long_about = None)]
#[command(version)]
struct Cli {
    /// Input netlist file
    #[arg(value_name = "NETLIST")]
    input: PathBuf,

    /// Output CSV file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output node, overriding the netlist's .print card
    #[arg(short = 'n', long, value_name = "NODE")]
    node: Option<u32>,

    /// Reference source; amplitudes and phases are reported relative to it
    #[arg(short, long, value_name = "SOURCE")]
    reference: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(solver) = err.downcast_ref::<SolverError>() {
        return match solver {
            SolverError::Singular { .. } => 4,
            SolverError::NonConvergent { .. } | SolverError::NumericOverflow { .. } => 3,
            SolverError::Config(_) | SolverError::InvalidSweep(_) => 2,
        };
    }
    if err.downcast_ref::<saffron_parser::Error>().is_some() {
        return 2;
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return 1;
    }
    1
}

fn run(cli: &Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let deck = saffron_parser::parse(&source)?;
    deck.circuit.validate().map_err(SolverError::Config)?;

    if cli.verbose {
        eprintln!("circuit: {}", deck.title.as_deref().unwrap_or("(untitled)"));
        eprintln!("devices: {}", deck.circuit.devices().len());
        eprintln!("nodes:   {}", deck.circuit.num_nodes());
    }

    match deck.ac {
        Some(ac) => run_ac(cli, &deck, ac),
        None => run_op(cli, &deck),
    }
}

fn run_ac(cli: &Cli, deck: &Deck, ac: saffron_parser::AcCommand) -> Result<()> {
    let output = match cli.node.map(NodeId::new).or(deck.output) {
        Some(node) => node,
        None => {
            return Err(SolverError::InvalidSweep(
                "no output node: add `.print ac v(<node>)` or pass --node".into(),
            )
            .into())
        }
    };

    let params = AcParams {
        fstart: ac.fstart,
        fstop: ac.fstop,
        points_per_decade: ac.points_per_decade,
        output,
        reference: cli.reference.clone(),
    };

    let result = solve_ac(&deck.circuit, &params)?;

    if cli.verbose {
        eprintln!("swept {} points", result.points.len());
    }

    match &cli.output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_csv(file, &result)?;
        }
        None => write_csv(std::io::stdout().lock(), &result)?,
    }
    Ok(())
}

fn write_csv(mut out: impl Write, result: &AcResult) -> Result<()> {
    writeln!(out, "Frequency / Hz, Amplitude / dB, Phase / Degrees")?;
    for (frequency, amplitude_db, phase_deg) in result.records() {
        writeln!(out, "{}, {}, {}", frequency, amplitude_db, phase_deg)?;
    }
    Ok(())
}

fn run_op(cli: &Cli, deck: &Deck) -> Result<()> {
    let op = solve_operating_point(&deck.circuit, &ConvergenceOptions::default())?;

    if cli.verbose {
        eprintln!("operating point converged in {} iterations", op.iterations);
    }

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    writeln!(out, "Node, Voltage / V")?;
    for node in 1..=deck.circuit.num_nodes() {
        let id = NodeId::new(node as u32);
        writeln!(out, "{}, {}", id, op.voltage(id))?;
    }
    Ok(())
}
