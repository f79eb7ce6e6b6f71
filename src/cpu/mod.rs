//! The breadboard CPU: the full board wired up, plus a runner that clocks it until it halts.

use std::fmt;

use anyhow::{Context, Result};

use crate::{
    chips::alu::AluFlags,
    sim::{ChipId, NetId, SResult, SimConfig, System, SystemBuilder, Tick},
};

pub mod board;

use board::Parts;

/// Why [`Cpu::run`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The halt line was high before the next clock. `cycles` counts the clocks run.
    Halted { cycles: u64 },
    /// The cycle budget ran out first.
    Timeout { cycles: u64 },
}

/// A snapshot of the programmer-visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub ip: u16,
    pub sp: u8,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub flags: AluFlags,
    /// Micro-step within the current instruction.
    pub uip: u8,
    pub ir: u8,
    /// `CTRL0..CTRL23` as currently driven by the microcode EEPROMs.
    pub control: u32,
}

impl fmt::Display for CpuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |flag: AluFlags, c: char| {
            if self.flags.contains(flag) {
                c
            } else {
                '.'
            }
        };
        write!(
            f,
            "IP={:04X} SP={:02X} A={:02X} B={:02X} C={:02X} D={:02X} [{}{}{}] CW={:06X}",
            self.ip,
            self.sp,
            self.a,
            self.b,
            self.c,
            self.d,
            flag(AluFlags::ZERO, 'Z'),
            flag(AluFlags::CARRY, 'C'),
            flag(AluFlags::NEGATIVE, 'N'),
            self.control,
        )
    }
}

/// The CPU board, built and ready to run.
#[derive(Debug)]
pub struct Cpu {
    sys: System,
    parts: Parts,
    halt: NetId,
    reset: NetId,
}

impl Cpu {
    /// Builds the board with the given simulation settings.
    pub fn new(config: SimConfig) -> SResult<Self> {
        let mut b = SystemBuilder::with_config(config);
        let parts = board::wire(&mut b)?;
        let halt = b.net(board::HALT_NET);
        let reset = b.net(board::RESET_NET);
        let sys = b.build();
        log::info!(
            "board has {} chips on {} nets",
            sys.chips().len(),
            sys.nets().len()
        );
        Ok(Self {
            sys,
            parts,
            halt,
            reset,
        })
    }

    /// Builds the board, fills the ROM and microcode EEPROMs, and resets it.
    pub fn boot(config: SimConfig, program: &[u8], microcode: [&[u8]; 3]) -> Result<Self> {
        let mut cpu = Self::new(config).context("wiring the board")?;
        cpu.load_program(program).context("loading the program")?;
        cpu.load_microcode(microcode)
            .context("loading the microcode")?;
        cpu.reset();
        Ok(cpu)
    }

    /// Loads a program image into ROM at address 0.
    pub fn load_program(&mut self, image: &[u8]) -> SResult<()> {
        self.sys.load(self.parts.rom, image)
    }

    /// Loads the three microcode EEPROMs: control bits 0-7, 8-15 and 16-23.
    pub fn load_microcode(&mut self, images: [&[u8]; 3]) -> SResult<()> {
        for (&chip, image) in self.parts.microcode.iter().zip(images) {
            self.sys.load(chip, image)?;
        }
        Ok(())
    }

    /// Holds `~RESET` low for one clock, which clears IP and the micro-sequencer.
    pub fn reset(&mut self) -> Tick {
        self.sys.drive(self.reset, Some(false));
        let tick = self.sys.tick();
        self.sys.drive(self.reset, Some(true));
        self.sys.eval_combinational();
        log::debug!("reset: {}", self.state());
        tick
    }

    /// Runs one clock period.
    pub fn step(&mut self) -> Tick {
        let tick = self.sys.tick();
        if self.uip() == 0 {
            log::debug!("{}", self.state());
        }
        tick
    }

    pub fn halted(&self) -> bool {
        self.sys.state(self.halt)
    }

    /// Clocks the board until the halt line goes high, or `max_cycles` clocks have run.
    ///
    /// Halt is only checked before a clock, so a halt raised by the last clock of the
    /// budget still reports [`RunOutcome::Timeout`].
    pub fn run(&mut self, max_cycles: u64) -> RunOutcome {
        let mut cycles = 0;
        while cycles < max_cycles {
            if self.halted() {
                log::info!("halted after {} clock cycles", cycles);
                return RunOutcome::Halted { cycles };
            }
            self.step();
            cycles += 1;
        }
        log::warn!("no halt within {} clock cycles", max_cycles);
        RunOutcome::Timeout { cycles }
    }

    pub fn state(&self) -> CpuState {
        let [a, b, c, d] = self.parts.regs.map(|reg| self.latched(reg) as u8);
        let ip = self
            .parts
            .ip
            .iter()
            .rev()
            .fold(0, |acc, &nibble| (acc << 4) | self.latched(nibble));
        let sp = (self.latched(self.parts.sp[1]) << 4) | self.latched(self.parts.sp[0]);
        CpuState {
            ip,
            sp: sp as u8,
            a,
            b,
            c,
            d,
            flags: AluFlags::from_bits_truncate(self.latched(self.parts.flags) as u8),
            uip: self.uip(),
            ir: self.latched(self.parts.ir) as u8,
            control: self
                .sys
                .bus_value(&self.parts.control)
                .unwrap_or_default(),
        }
    }

    fn uip(&self) -> u8 {
        self.latched(self.parts.uip) as u8
    }

    fn latched(&self, chip: ChipId) -> u16 {
        self.sys
            .chip(chip)
            .and_then(|c| c.latched())
            .unwrap_or_default()
    }

    /// Contents of the RAM, which answers at `0x8000..=0xFFFF`.
    pub fn ram(&self) -> &[u8] {
        self.sys
            .memory(self.parts.ram)
            .map(|m| m.cells())
            .unwrap_or_default()
    }

    pub fn system(&self) -> &System {
        &self.sys
    }

    pub fn system_mut(&mut self) -> &mut System {
        &mut self.sys
    }
}
