use crate::sim::chip::{rising_edge, Inputs, Outputs, Part};

mod hc161 {
    pub const INPUTS: &[&str] = &["~CLR", "CLK", "A", "B", "C", "D", "ENP", "ENT", "~LOAD"];
    pub const OUTPUTS: &[&str] = &["QA", "QB", "QC", "QD", "RCO"];

    pub const CLR: usize = 0;
    pub const CLK: usize = 1;
    pub const A: usize = 2;
    pub const ENP: usize = 6;
    pub const ENT: usize = 7;
    pub const LOAD: usize = 8;

    pub const QA: usize = 0;
    pub const RCO: usize = 4;
}

mod hc193 {
    pub const INPUTS: &[&str] = &["CLR", "UP", "DOWN", "A", "B", "C", "D", "~LOAD"];
    pub const OUTPUTS: &[&str] = &["QA", "QB", "QC", "QD", "~CO", "~BO"];

    pub const CLR: usize = 0;
    pub const UP: usize = 1;
    pub const DOWN: usize = 2;
    pub const A: usize = 3;
    pub const LOAD: usize = 7;

    pub const QA: usize = 0;
    pub const CO: usize = 4;
    pub const BO: usize = 5;
}

/// 74HC161 synchronous 4-bit binary counter.
///
/// `~CLR` is honoured whenever the chip is evaluated, not just on the clock edge.
/// `RCO` is high while the count is 15 and `ENT` is high, so counters cascade by
/// feeding `RCO` into the next stage's `ENT`.
#[derive(Debug, Default, Clone)]
pub struct Hc161 {
    count: u8,
    prev_clk: bool,
}

impl Hc161 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u8 {
        self.count
    }
}

impl Part for Hc161 {
    fn part(&self) -> &'static str {
        "74HC161"
    }

    fn inputs(&self) -> &'static [&'static str] {
        hc161::INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        hc161::OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        if !inp.read(hc161::CLR) {
            self.count = 0;
        }
        out.write_bus(hc161::QA, 4, self.count.into());
        out.write(hc161::RCO, self.count == 0x0F && inp.read(hc161::ENT));
    }

    fn tick(&mut self, inp: &Inputs) {
        if rising_edge(&mut self.prev_clk, inp.read(hc161::CLK)) && inp.read(hc161::CLR) {
            if !inp.read(hc161::LOAD) {
                self.count = inp.read_bus(hc161::A, 4) as u8;
            } else if inp.read(hc161::ENP) && inp.read(hc161::ENT) {
                self.count = (self.count + 1) & 0x0F;
            }
        }
    }

    fn latched(&self) -> Option<u16> {
        Some(self.count.into())
    }

    fn latched_width(&self) -> u8 {
        4
    }
}

/// 74HC193 synchronous 4-bit up/down counter with separate up and down clocks.
///
/// `CLR` (active high) and `~LOAD` act on level; counting happens on the rising edge of
/// `UP` (with `DOWN` high) or of `DOWN` (with `UP` high). `~CO` and `~BO` pulse low
/// with the clock at 15 and 0 respectively, which is what the next stage counts on.
#[derive(Debug, Default, Clone)]
pub struct Hc193 {
    count: u8,
    prev_up: bool,
    prev_down: bool,
}

impl Hc193 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u8 {
        self.count
    }
}

impl Part for Hc193 {
    fn part(&self) -> &'static str {
        "74HC193"
    }

    fn inputs(&self) -> &'static [&'static str] {
        hc193::INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        hc193::OUTPUTS
    }

    fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
        if inp.read(hc193::CLR) {
            self.count = 0;
        }
        out.write_bus(hc193::QA, 4, self.count.into());
        out.write(hc193::CO, !(self.count == 0x0F && !inp.read(hc193::UP)));
        out.write(hc193::BO, !(self.count == 0 && !inp.read(hc193::DOWN)));
    }

    fn tick(&mut self, inp: &Inputs) {
        let up = inp.read(hc193::UP);
        let down = inp.read(hc193::DOWN);
        let up_edge = rising_edge(&mut self.prev_up, up);
        let down_edge = rising_edge(&mut self.prev_down, down);
        if inp.read(hc193::CLR) {
            return;
        }
        if !inp.read(hc193::LOAD) {
            self.count = inp.read_bus(hc193::A, 4) as u8;
            return;
        }
        if up_edge && down {
            self.count = (self.count + 1) & 0x0F;
        }
        if down_edge && up {
            self.count = self.count.wrapping_sub(1) & 0x0F;
        }
    }

    fn latched(&self) -> Option<u16> {
        Some(self.count.into())
    }

    fn latched_width(&self) -> u8 {
        4
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::sim::bench::Bench;

    /// `QA..QD` as a number.
    fn outputs(bench: &Bench) -> u16 {
        ["QA", "QB", "QC", "QD"]
            .iter()
            .enumerate()
            .map(|(i, p)| u16::from(bench.out(p).unwrap()) << i)
            .sum()
    }

    fn counting_161() -> Bench {
        let mut bench = Bench::new(Hc161::new());
        bench.set("~CLR", true);
        bench.set("~LOAD", true);
        bench.set("ENP", true);
        bench.set("ENT", true);
        bench
    }

    #[test]
    fn test_161_counts_and_wraps() {
        let mut bench = counting_161();
        for expected in (1..16).chain([0, 1]) {
            bench.tick();
            assert_eq!(bench.latched(), Some(expected));
            assert_eq!(outputs(&bench), expected);
        }
    }

    #[test]
    fn test_161_clear_wins() {
        let mut bench = counting_161();
        for _ in 0..5 {
            bench.tick();
        }
        assert_eq!(bench.latched(), Some(5));
        bench.set("~CLR", false);
        bench.settle();
        assert_eq!(bench.latched(), Some(0));
        bench.tick();
        assert_eq!(bench.latched(), Some(0));
    }

    #[test]
    fn test_161_load() {
        let mut bench = counting_161();
        for (pin, level) in [("A", true), ("B", false), ("C", true), ("D", true)] {
            bench.set(pin, level);
        }
        bench.set("~LOAD", false);
        bench.tick();
        assert_eq!(bench.latched(), Some(0b1101));
        bench.set("~LOAD", true);
        bench.tick();
        assert_eq!(bench.latched(), Some(0b1110));
    }

    #[test]
    fn test_161_needs_both_enables() {
        let mut bench = counting_161();
        bench.set("ENP", false);
        bench.tick();
        assert_eq!(bench.latched(), Some(0));
        bench.set("ENP", true);
        bench.set("ENT", false);
        bench.tick();
        assert_eq!(bench.latched(), Some(0));
    }

    #[test]
    fn test_161_ripple_carry() {
        let mut bench = counting_161();
        for _ in 0..15 {
            bench.tick();
        }
        bench.settle();
        assert_eq!(bench.out("RCO"), Some(true));
        bench.set("ENT", false);
        bench.settle();
        assert_eq!(bench.out("RCO"), Some(false));
        bench.set("ENT", true);
        bench.tick();
        assert_eq!(bench.latched(), Some(0));
        assert_eq!(bench.out("RCO"), Some(false));
    }

    fn idle_193() -> Bench {
        let mut bench = Bench::new(Hc193::new());
        bench.set("CLR", false);
        bench.set("~LOAD", true);
        bench.set("UP", true);
        bench.set("DOWN", true);
        // Let the chip see both clocks high before counting starts.
        bench.tick();
        assert_eq!(bench.latched(), Some(0));
        bench
    }

    /// Pulses `pin` low then high, letting the chip see both levels.
    fn pulse(bench: &mut Bench, pin: &str) {
        bench.set(pin, false);
        bench.tick();
        bench.set(pin, true);
        bench.tick();
    }

    #[test]
    fn test_193_up_down() {
        let mut bench = idle_193();
        pulse(&mut bench, "UP");
        pulse(&mut bench, "UP");
        assert_eq!(bench.latched(), Some(2));
        pulse(&mut bench, "DOWN");
        assert_eq!(bench.latched(), Some(1));
        pulse(&mut bench, "DOWN");
        pulse(&mut bench, "DOWN");
        assert_eq!(bench.latched(), Some(15));
    }

    #[test]
    fn test_193_carry_and_borrow() {
        let mut bench = idle_193();
        bench.settle();
        assert_eq!(bench.out("~BO"), Some(true));
        bench.set("DOWN", false);
        bench.settle();
        assert_eq!(bench.out("~BO"), Some(false));
        bench.set("DOWN", true);
        bench.tick();
        assert_eq!(bench.latched(), Some(15));

        bench.set("UP", false);
        bench.settle();
        assert_eq!(bench.out("~CO"), Some(false));
        bench.set("UP", true);
        bench.tick();
        assert_eq!(bench.latched(), Some(0));
        assert_eq!(bench.out("~CO"), Some(true));
    }

    #[test]
    fn test_193_load_and_clear() {
        let mut bench = idle_193();
        bench.set("A", false);
        bench.set("B", true);
        bench.set("C", true);
        bench.set("D", false);
        bench.set("~LOAD", false);
        bench.tick();
        assert_eq!(bench.latched(), Some(0b0110));
        bench.set("~LOAD", true);
        bench.set("CLR", true);
        bench.settle();
        assert_eq!(bench.latched(), Some(0));
        assert_eq!(outputs(&bench), 0);
    }

    proptest! {
        #[test]
        fn prop_161_clear_resets_any_count(start in 0u8..16) {
            let mut bench = counting_161();
            for _ in 0..start {
                bench.tick();
            }
            prop_assert_eq!(bench.latched(), Some(u16::from(start)));
            bench.set("~CLR", false);
            bench.settle();
            prop_assert_eq!(bench.latched(), Some(0));
        }

        #[test]
        fn prop_161_one_edge_one_step(start in 0u8..16, ent: bool) {
            let mut bench = counting_161();
            for _ in 0..start {
                bench.tick();
            }
            bench.set("ENT", ent);
            bench.settle();
            prop_assert_eq!(bench.out("RCO"), Some(start == 15 && ent));
            bench.tick();
            let expected = if ent { (start + 1) & 0x0F } else { start };
            prop_assert_eq!(bench.latched(), Some(u16::from(expected)));
        }
    }
}
