use crate::sim::chip::{Inputs, Outputs, Part};

const INPUTS: &[&str] = &[
    "A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7", "B0", "B1", "B2", "B3", "B4", "B5", "B6", "B7",
    "OP0", "OP1", "OP2", "~OE",
];
const OUTPUTS: &[&str] = &["Q0", "Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7", "Z", "C", "N"];

const A0: usize = 0;
const B0: usize = 8;
const OP0: usize = 16;
const OE: usize = 19;
const Q0: usize = 0;
const Z: usize = 8;
const C: usize = 9;
const N: usize = 10;

/// The operation selected on `OP0..OP2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AluOp {
    Add = 0,
    Sub,
    And,
    Or,
    Xor,
    /// Complement of A; B is ignored.
    Not,
    /// A shifted left by one.
    Shl,
    /// A shifted right by one.
    Shr,
}

impl From<u8> for AluOp {
    fn from(value: u8) -> Self {
        match value & 0b111 {
            0 => Self::Add,
            1 => Self::Sub,
            2 => Self::And,
            3 => Self::Or,
            4 => Self::Xor,
            5 => Self::Not,
            6 => Self::Shl,
            _ => Self::Shr,
        }
    }
}

bitflags::bitflags! {
    /// The ALU status outputs, in the bit order the flags register latches them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AluFlags: u8 {
        /// Set if the result is zero.
        const ZERO = 1 << 0;
        /// Carry out of an add, borrow out of a subtract, or the bit shifted out.
        const CARRY = 1 << 1;
        /// Copy of bit 7 of the result.
        const NEGATIVE = 1 << 2;
    }
}

impl AluOp {
    /// Computes `a op b` along with the flags it produces.
    pub fn apply(self, a: u8, b: u8) -> (u8, AluFlags) {
        let (result, carry) = match self {
            AluOp::Add => a.overflowing_add(b),
            AluOp::Sub => a.overflowing_sub(b),
            AluOp::And => (a & b, false),
            AluOp::Or => (a | b, false),
            AluOp::Xor => (a ^ b, false),
            AluOp::Not => (!a, false),
            AluOp::Shl => (a << 1, a & 0x80 != 0),
            AluOp::Shr => (a >> 1, a & 0x01 != 0),
        };
        let mut flags = AluFlags::empty();
        flags.set(AluFlags::ZERO, result == 0);
        flags.set(AluFlags::CARRY, carry);
        flags.set(AluFlags::NEGATIVE, result & 0x80 != 0);
        (result, flags)
    }
}

/// The 8-bit ALU, programmed into a GAL22V10.
///
/// `Z`, `C` and `N` are driven all the time so the flags register can latch them whenever it is
/// clocked; the result only reaches `Q0..Q7` while `~OE` is low.
#[derive(Debug, Default, Clone)]
pub struct GalAlu;

impl GalAlu {
    pub fn new() -> Self {
        Self
    }
}

impl Part for GalAlu {
    fn part(&self) -> &'static str {
        "GAL22V10"
    }

    fn inputs(&self) -> &'static [&'static str] {
        INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        let a = inp.read_bus(A0, 8) as u8;
        let b = inp.read_bus(B0, 8) as u8;
        let op = AluOp::from(inp.read_bus(OP0, 3) as u8);
        let (result, flags) = op.apply(a, b);
        out.write(Z, flags.contains(AluFlags::ZERO));
        out.write(C, flags.contains(AluFlags::CARRY));
        out.write(N, flags.contains(AluFlags::NEGATIVE));
        if inp.read(OE) {
            out.float_bus(Q0, 8);
        } else {
            out.write_bus(Q0, 8, result.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bench::Bench;

    #[test]
    fn test_ops() {
        let cases = [
            (AluOp::Add, 0x70, 0x20, 0x90, AluFlags::NEGATIVE),
            (AluOp::Add, 0xF0, 0x10, 0x00, AluFlags::ZERO | AluFlags::CARRY),
            (AluOp::Sub, 0x05, 0x03, 0x02, AluFlags::empty()),
            (AluOp::Sub, 0x03, 0x05, 0xFE, AluFlags::CARRY | AluFlags::NEGATIVE),
            (AluOp::And, 0xCC, 0xAA, 0x88, AluFlags::NEGATIVE),
            (AluOp::Or, 0x0C, 0x0A, 0x0E, AluFlags::empty()),
            (AluOp::Xor, 0x5A, 0x5A, 0x00, AluFlags::ZERO),
            (AluOp::Not, 0xFF, 0x12, 0x00, AluFlags::ZERO),
            (AluOp::Shl, 0x81, 0x00, 0x02, AluFlags::CARRY),
            (AluOp::Shr, 0x81, 0x00, 0x40, AluFlags::CARRY),
        ];
        for (op, a, b, result, flags) in cases {
            assert_eq!(op.apply(a, b), (result, flags), "{op:?} {a:#04x} {b:#04x}");
        }
    }

    #[test]
    fn test_op_decoding() {
        for raw in 0..8u8 {
            assert_eq!(AluOp::from(raw) as u8, raw);
        }
        assert_eq!(AluOp::from(0b1001), AluOp::Sub);
    }

    #[test]
    fn test_flags_driven_while_disabled() {
        let mut bench = Bench::new(GalAlu::new());
        bench.set("~OE", true);
        bench.set_bus("A", 8, 0x03);
        bench.set_bus("B", 8, 0x05);
        bench.set_bus("OP", 3, AluOp::Sub as u32);
        bench.settle();
        assert_eq!(bench.out_bus("Q", "", 8), None);
        assert_eq!(bench.out("Z"), Some(false));
        assert_eq!(bench.out("C"), Some(true));
        assert_eq!(bench.out("N"), Some(true));

        bench.set("~OE", false);
        bench.settle();
        assert_eq!(bench.out_bus("Q", "", 8), Some(0xFE));
    }
}
