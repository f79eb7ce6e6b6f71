use crate::sim::chip::{Inputs, Outputs, Part};

const INPUTS: &[&str] = &[
    "DIR", "~OE", "A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7", "B0", "B1", "B2", "B3", "B4",
    "B5", "B6", "B7",
];
const OUTPUTS: &[&str] = &[
    "A0_OUT", "A1_OUT", "A2_OUT", "A3_OUT", "A4_OUT", "A5_OUT", "A6_OUT", "A7_OUT", "B0_OUT",
    "B1_OUT", "B2_OUT", "B3_OUT", "B4_OUT", "B5_OUT", "B6_OUT", "B7_OUT",
];

const DIR: usize = 0;
const OE: usize = 1;
const A: usize = 2;
const B: usize = 10;
const A_OUT: usize = 0;
const B_OUT: usize = 8;

/// 74HC245 octal bus transceiver.
///
/// Each side is split into an input pin (`A3`) and an output pin (`A3_OUT`) so that a
/// bidirectional port can be wired to the same net twice. `DIR` high drives B from A.
#[derive(Debug, Default, Clone)]
pub struct Hc245;

impl Hc245 {
    pub fn new() -> Self {
        Self
    }
}

impl Part for Hc245 {
    fn part(&self) -> &'static str {
        "74HC245"
    }

    fn inputs(&self) -> &'static [&'static str] {
        INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        if inp.read(OE) {
            out.float_bus(A_OUT, 8);
            out.float_bus(B_OUT, 8);
        } else if inp.read(DIR) {
            out.float_bus(A_OUT, 8);
            out.write_bus(B_OUT, 8, inp.read_bus(A, 8));
        } else {
            out.float_bus(B_OUT, 8);
            out.write_bus(A_OUT, 8, inp.read_bus(B, 8));
        }
    }
}
