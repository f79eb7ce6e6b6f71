use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use breadsim::{
    cpu::{Cpu, RunOutcome},
    sim::{config::DEFAULT_MAX_PASSES, SimConfig},
};
use clap::Parser;

/// Runs a program on the simulated breadboard CPU.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// ROM image, loaded at address 0.
    program: PathBuf,

    /// Microcode EEPROM images for control bits 0-7, 8-15 and 16-23.
    #[arg(long, num_args = 3, value_names = ["A", "B", "C"], required = true)]
    microcode: Vec<PathBuf>,

    /// Give up after this many clock cycles.
    #[arg(long, default_value_t = 5000)]
    max_cycles: u64,

    /// Settle passes allowed before a combinational loop is reported.
    #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
    max_passes: usize,

    /// More output per occurrence (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let program = read(&args.program)?;
    let microcode = args
        .microcode
        .iter()
        .map(|path| read(path))
        .collect::<Result<Vec<_>>>()?;
    let config = SimConfig::default().with_max_passes(args.max_passes);
    let [a, b, c] = [&microcode[0], &microcode[1], &microcode[2]].map(Vec::as_slice);
    let mut cpu = Cpu::boot(config, &program, [a, b, c])?;

    match cpu.run(args.max_cycles) {
        RunOutcome::Halted { cycles } => println!("Halted after {cycles} clock cycles."),
        RunOutcome::Timeout { cycles } => {
            println!("TIMEOUT: reached {cycles} cycles without HALT")
        }
    }
    println!("{}", cpu.state());

    let anomalies = cpu.system().anomalies();
    if anomalies.unconverged > 0 || anomalies.contended > 0 {
        log::warn!(
            "{} of {} settles did not converge, {} contended nets",
            anomalies.unconverged,
            anomalies.settles,
            anomalies.contended
        );
    }
    Ok(())
}
