use std::fmt;

use crate::sim::chip::{Inputs, Outputs, Part};

/// Bytes in a 28C256 / 62256.
pub const CAPACITY: usize = 32 * 1024;

const INPUTS: &[&str] = &[
    "~CE", "~OE", "~WE", "A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7", "A8", "A9", "A10", "A11",
    "A12", "A13", "A14", "D0", "D1", "D2", "D3", "D4", "D5", "D6", "D7",
];
const OUTPUTS: &[&str] = &["Q0", "Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7"];

const CE: usize = 0;
const OE: usize = 1;
const WE: usize = 2;
const A0: usize = 3;
const D0: usize = 18;
const Q0: usize = 0;
const ADDR_WIDTH: usize = 15;

/// A 32K x 8 byte-wide memory: either a 28C256 EEPROM or a 62256 SRAM, which behave
/// identically here.
///
/// Writes are level sensitive: the addressed byte follows the data pins for as long as
/// `~CE` and `~WE` are both low.
#[derive(Clone)]
pub struct Memory {
    part: &'static str,
    cells: Box<[u8]>,
}

impl Memory {
    /// A 28C256 32K EEPROM.
    pub fn eeprom() -> Self {
        Self::new("28C256")
    }

    /// A 62256 32K static RAM.
    pub fn sram() -> Self {
        Self::new("62256")
    }

    fn new(part: &'static str) -> Self {
        Self {
            part,
            cells: vec![0u8; CAPACITY].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.cells[usize::from(addr) % self.cells.len()]
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Copies `image` to the start of the array. Bytes past the end of the array are dropped.
    pub(crate) fn load(&mut self, image: &[u8]) {
        let len = image.len().min(self.cells.len());
        self.cells[..len].copy_from_slice(&image[..len]);
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("part", &self.part)
            .field("capacity", &self.cells.len())
            .finish()
    }
}

impl Part for Memory {
    fn part(&self) -> &'static str {
        self.part
    }

    fn inputs(&self) -> &'static [&'static str] {
        INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        let selected = !inp.read(CE);
        let write = !inp.read(WE);
        let addr = usize::from(inp.read_bus(A0, ADDR_WIDTH));
        if selected && write {
            self.cells[addr] = inp.read_bus(D0, 8) as u8;
        }
        if selected && !inp.read(OE) && !write {
            out.write_bus(Q0, 8, self.cells[addr].into());
        } else {
            out.float_bus(Q0, 8);
        }
    }
}
