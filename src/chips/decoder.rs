use crate::sim::chip::{Inputs, Outputs, Part};

mod hc138 {
    pub const INPUTS: &[&str] = &["A", "B", "C", "~G2A", "~G2B", "G1"];
    pub const OUTPUTS: &[&str] = &["~Y0", "~Y1", "~Y2", "~Y3", "~Y4", "~Y5", "~Y6", "~Y7"];

    pub const A: usize = 0;
    pub const G2A: usize = 3;
    pub const G2B: usize = 4;
    pub const G1: usize = 5;
}

mod hc154 {
    pub const INPUTS: &[&str] = &["A", "B", "C", "D", "~G1", "~G2"];
    pub const OUTPUTS: &[&str] = &[
        "~Y0", "~Y1", "~Y2", "~Y3", "~Y4", "~Y5", "~Y6", "~Y7", "~Y8", "~Y9", "~Y10", "~Y11",
        "~Y12", "~Y13", "~Y14", "~Y15",
    ];

    pub const A: usize = 0;
    pub const G1: usize = 4;
    pub const G2: usize = 5;
}

/// Pulls the selected output low and holds every other one high.
fn select(out: &mut Outputs, count: usize, selected: Option<usize>) {
    for y in 0..count {
        out.write(y, Some(y) != selected);
    }
}

/// 74HC138 3-to-8 line decoder. Enabled while `G1` is high and both `~G2A`/`~G2B` are low.
#[derive(Debug, Default, Clone)]
pub struct Hc138;

impl Hc138 {
    pub fn new() -> Self {
        Self
    }
}

impl Part for Hc138 {
    fn part(&self) -> &'static str {
        "74HC138"
    }

    fn inputs(&self) -> &'static [&'static str] {
        hc138::INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        hc138::OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        let enabled = inp.read(hc138::G1) && !inp.read(hc138::G2A) && !inp.read(hc138::G2B);
        let selected = enabled.then(|| usize::from(inp.read_bus(hc138::A, 3)));
        select(out, 8, selected);
    }
}

/// 74HC154 4-to-16 line decoder. Enabled while both `~G1` and `~G2` are low.
#[derive(Debug, Default, Clone)]
pub struct Hc154;

impl Hc154 {
    pub fn new() -> Self {
        Self
    }
}

impl Part for Hc154 {
    fn part(&self) -> &'static str {
        "74HC154"
    }

    fn inputs(&self) -> &'static [&'static str] {
        hc154::INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        hc154::OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        let enabled = !inp.read(hc154::G1) && !inp.read(hc154::G2);
        let selected = enabled.then(|| usize::from(inp.read_bus(hc154::A, 4)));
        select(out, 16, selected);
    }
}
