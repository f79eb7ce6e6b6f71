use crate::sim::chip::{rising_edge, Inputs, Outputs, Part};

const INPUTS: &[&str] = &["~OE", "CLK", "D0", "D1", "D2", "D3", "D4", "D5", "D6", "D7"];
const OUTPUTS: &[&str] = &["Q0", "Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7"];

const OE: usize = 0;
const CLK: usize = 1;
const D0: usize = 2;
const Q0: usize = 0;

/// 74HC574 octal D flip-flop with tri-state outputs.
#[derive(Debug, Default, Clone)]
pub struct Hc574 {
    value: u8,
    prev_clk: bool,
}

impl Hc574 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

impl Part for Hc574 {
    fn part(&self) -> &'static str {
        "74HC574"
    }

    fn inputs(&self) -> &'static [&'static str] {
        INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        if inp.read(OE) {
            out.float_bus(Q0, 8);
        } else {
            out.write_bus(Q0, 8, self.value.into());
        }
    }

    fn tick(&mut self, inp: &Inputs) {
        if rising_edge(&mut self.prev_clk, inp.read(CLK)) {
            self.value = inp.read_bus(D0, 8) as u8;
        }
    }

    fn latched(&self) -> Option<u16> {
        Some(self.value.into())
    }

    fn latched_width(&self) -> u8 {
        8
    }
}
