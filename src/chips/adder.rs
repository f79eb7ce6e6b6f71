use crate::sim::chip::{Inputs, Outputs, Part};

const INPUTS: &[&str] = &["A1", "A2", "A3", "A4", "B1", "B2", "B3", "B4", "C0"];
const OUTPUTS: &[&str] = &["S1", "S2", "S3", "S4", "C4"];

const A1: usize = 0;
const B1: usize = 4;
const C0: usize = 8;
const S1: usize = 0;
const C4: usize = 4;

/// 74HC283 4-bit binary full adder with fast carry. Cascade by chaining `C4` into `C0`.
#[derive(Debug, Default, Clone)]
pub struct Hc283;

impl Hc283 {
    pub fn new() -> Self {
        Self
    }
}

impl Part for Hc283 {
    fn part(&self) -> &'static str {
        "74HC283"
    }

    fn inputs(&self) -> &'static [&'static str] {
        INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        let sum = inp.read_bus(A1, 4) + inp.read_bus(B1, 4) + u16::from(inp.read(C0));
        out.write_bus(S1, 4, sum);
        out.write(C4, sum > 0x0F);
    }
}
