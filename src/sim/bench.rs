//! A one-chip test bench: every pin wired to a net of the same name.

use super::{
    chip::{Model, Part, PinRef},
    ChipId, Settle, System, SystemBuilder, Tick,
};

pub(crate) struct Bench {
    pub sys: System,
    pub chip: ChipId,
}

impl Bench {
    pub fn new(model: impl Into<Model>) -> Self {
        let model = model.into();
        let inputs = model.inputs();
        let outputs = model.outputs();
        let mut b = SystemBuilder::new();
        let chip = b.add("DUT", "device under test", model).unwrap();
        for &pin in inputs.iter().chain(outputs) {
            b.wire(chip, pin, pin).unwrap();
        }
        Self {
            sys: b.build(),
            chip,
        }
    }

    pub fn set(&mut self, pin: &str, level: bool) {
        let net = self.sys.net_id(pin).unwrap();
        self.sys.drive(net, Some(level));
    }

    /// Drives `{prefix}0..` from `value`.
    pub fn set_bus(&mut self, prefix: &str, width: usize, value: u32) {
        for i in 0..width {
            self.set(&format!("{prefix}{i}"), (value >> i) & 1 == 1);
        }
    }

    pub fn settle(&mut self) -> Settle {
        self.sys.eval_combinational()
    }

    pub fn tick(&mut self) -> Tick {
        self.sys.tick()
    }

    /// Output value of `pin`, `None` while tri-stated.
    pub fn out(&self, pin: &str) -> Option<bool> {
        let chip = self.sys.chip(self.chip).unwrap();
        match chip.pin(pin) {
            Some(PinRef::Output(idx)) => chip.output(idx),
            other => panic!("{pin} is not an output: {other:?}"),
        }
    }

    /// Outputs `{prefix}0..{suffix}` as an integer, `None` if any of them is tri-stated.
    pub fn out_bus(&self, prefix: &str, suffix: &str, width: usize) -> Option<u32> {
        (0..width).try_fold(0, |acc, i| {
            self.out(&format!("{prefix}{i}{suffix}"))
                .map(|bit| acc | (u32::from(bit) << i))
        })
    }

    pub fn latched(&self) -> Option<u16> {
        self.sys.chip(self.chip).unwrap().latched()
    }
}
