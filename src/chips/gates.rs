use crate::sim::chip::{Inputs, Outputs, Part};

const HEX_INPUTS: &[&str] = &["1A", "2A", "3A", "4A", "5A", "6A"];
const HEX_OUTPUTS: &[&str] = &["1Y", "2Y", "3Y", "4Y", "5Y", "6Y"];
const QUAD_INPUTS: &[&str] = &["1A", "1B", "2A", "2B", "3A", "3B", "4A", "4B"];
const QUAD_OUTPUTS: &[&str] = &["1Y", "2Y", "3Y", "4Y"];

/// 74HC04 hex inverter.
#[derive(Debug, Default, Clone)]
pub struct Hc04;

impl Hc04 {
    pub fn new() -> Self {
        Self
    }
}

impl Part for Hc04 {
    fn part(&self) -> &'static str {
        "74HC04"
    }

    fn inputs(&self) -> &'static [&'static str] {
        HEX_INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        HEX_OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        for gate in 0..6 {
            out.write(gate, !inp.read(gate));
        }
    }
}

macro_rules! quad_gates {
    ($($(#[$meta:meta])* $Id:ident($part:literal): $f:expr),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Default, Clone)]
            pub struct $Id;

            impl $Id {
                pub fn new() -> Self {
                    Self
                }
            }

            impl Part for $Id {
                fn part(&self) -> &'static str {
                    $part
                }

                fn inputs(&self) -> &'static [&'static str] {
                    QUAD_INPUTS
                }

                fn outputs(&self) -> &'static [&'static str] {
                    QUAD_OUTPUTS
                }

                fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
                    let f: fn(bool, bool) -> bool = $f;
                    for gate in 0..4 {
                        out.write(gate, f(inp.read(2 * gate), inp.read(2 * gate + 1)));
                    }
                }
            }
        )*
    };
}

quad_gates! {
    /// 74HC08 quad 2-input AND.
    Hc08("74HC08"): |a, b| a && b,
    /// 74HC32 quad 2-input OR.
    Hc32("74HC32"): |a, b| a || b,
    /// 74HC00 quad 2-input NAND.
    Hc00("74HC00"): |a, b| !(a && b),
}
