use std::fmt;

use crate::chips::{
    adder::Hc283,
    alu::GalAlu,
    counter::{Hc161, Hc193},
    decoder::{Hc138, Hc154},
    gates::{Hc00, Hc04, Hc08, Hc32},
    memory::Memory,
    register::Hc574,
    transceiver::Hc245,
};

use super::{
    net::{Net, NetId},
    SResult, SimError,
};

/// Index of a [Chip] inside its owning system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChipId(pub(crate) usize);

impl ChipId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A pin on a chip, resolved from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRef {
    Input(usize),
    Output(usize),
}

/// Read-only view of a chip's input pins.
pub struct Inputs<'a> {
    conns: &'a [Option<NetId>],
    nets: &'a [Net],
}

impl<'a> Inputs<'a> {
    /// Level of the net wired to input `pin`. Unconnected pins read low.
    pub fn read(&self, pin: usize) -> bool {
        self.conns[pin].is_some_and(|net| self.nets[net.index()].state())
    }

    /// Packs `width` consecutive input pins into an integer, `first` being bit 0.
    pub fn read_bus(&self, first: usize, width: usize) -> u16 {
        (0..width).fold(0, |acc, i| acc | (u16::from(self.read(first + i)) << i))
    }
}

/// Write access to a chip's output pins. `None` means the pin is tri-stated.
pub struct Outputs<'a> {
    values: &'a mut [Option<bool>],
}

impl<'a> Outputs<'a> {
    pub fn write(&mut self, pin: usize, level: bool) {
        self.values[pin] = Some(level);
    }

    pub fn float(&mut self, pin: usize) {
        self.values[pin] = None;
    }

    pub fn write_bus(&mut self, first: usize, width: usize, value: u16) {
        for i in 0..width {
            self.write(first + i, (value >> i) & 1 == 1);
        }
    }

    pub fn float_bus(&mut self, first: usize, width: usize) {
        for i in 0..width {
            self.float(first + i);
        }
    }
}

/// Returns `true` on a low-to-high transition of `now` relative to `prev`, and records `now`.
pub(crate) fn rising_edge(prev: &mut bool, now: bool) -> bool {
    let edge = now && !*prev;
    *prev = now;
    edge
}

/// Behaviour shared by every part in the catalog.
pub trait Part {
    /// The part number printed on the package.
    fn part(&self) -> &'static str;
    /// Input pin names. A pin's position in this list is its index.
    fn inputs(&self) -> &'static [&'static str];
    /// Output pin names. A pin's position in this list is its index.
    fn outputs(&self) -> &'static [&'static str];
    /// Recomputes every output from the inputs and the latched state.
    /// Must give the same result when called again with unchanged inputs.
    fn eval(&mut self, inp: &Inputs, out: &mut Outputs);
    /// Samples clock inputs and updates latched state on the edges the part cares about.
    fn tick(&mut self, _inp: &Inputs) {}
    /// The latched value, for parts that have one.
    fn latched(&self) -> Option<u16> {
        None
    }
    /// Number of meaningful bits in [`Part::latched`].
    fn latched_width(&self) -> u8 {
        0
    }
}

macro_rules! decl_model_enum {
    ($Model:ident: $($Variant:ident($Part:ty)),* $(,)?) => {
        /// The closed set of parts a [Chip] can be.
        #[derive(Debug, Clone)]
        pub enum $Model {
            $($Variant($Part)),*
        }

        impl Part for $Model {
            fn part(&self) -> &'static str {
                match self {
                    $(Self::$Variant(c) => c.part(),)*
                }
            }
            fn inputs(&self) -> &'static [&'static str] {
                match self {
                    $(Self::$Variant(c) => c.inputs(),)*
                }
            }
            fn outputs(&self) -> &'static [&'static str] {
                match self {
                    $(Self::$Variant(c) => c.outputs(),)*
                }
            }
            fn eval(&mut self, inp: &Inputs, out: &mut Outputs) {
                match self {
                    $(Self::$Variant(c) => c.eval(inp, out),)*
                }
            }
            fn tick(&mut self, inp: &Inputs) {
                match self {
                    $(Self::$Variant(c) => c.tick(inp),)*
                }
            }
            fn latched(&self) -> Option<u16> {
                match self {
                    $(Self::$Variant(c) => c.latched(),)*
                }
            }
            fn latched_width(&self) -> u8 {
                match self {
                    $(Self::$Variant(c) => c.latched_width(),)*
                }
            }
        }

        $(
            impl From<$Part> for $Model {
                fn from(value: $Part) -> Self {
                    Self::$Variant(value)
                }
            }
        )*
    };
}

decl_model_enum!(Model:
    Register(Hc574),
    Counter(Hc161),
    UpDownCounter(Hc193),
    Transceiver(Hc245),
    Adder(Hc283),
    Decoder3to8(Hc138),
    Decoder4to16(Hc154),
    Inverter(Hc04),
    And(Hc08),
    Or(Hc32),
    Nand(Hc00),
    Memory(Memory),
    Alu(GalAlu),
);

/// A placed part: a [Model] plus its label and its connections.
#[derive(Debug, Clone)]
pub struct Chip {
    reference: String,
    desc: String,
    model: Model,
    inputs: Vec<Option<NetId>>,
    outputs: Vec<Option<NetId>>,
    values: Vec<Option<bool>>,
}

impl Chip {
    pub(crate) fn new(reference: String, desc: String, model: Model) -> Self {
        let n_in = model.inputs().len();
        let n_out = model.outputs().len();
        Self {
            reference,
            desc,
            model,
            inputs: vec![None; n_in],
            outputs: vec![None; n_out],
            values: vec![None; n_out],
        }
    }

    /// The board reference, e.g. `U9`.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn part(&self) -> &'static str {
        self.model.part()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn memory(&self) -> Option<&Memory> {
        match &self.model {
            Model::Memory(mem) => Some(mem),
            _ => None,
        }
    }

    /// Looks a pin up by name, searching inputs before outputs.
    pub fn pin(&self, name: &str) -> Option<PinRef> {
        if let Some(idx) = self.model.inputs().iter().position(|&p| p == name) {
            return Some(PinRef::Input(idx));
        }
        self.model
            .outputs()
            .iter()
            .position(|&p| p == name)
            .map(PinRef::Output)
    }

    pub fn pin_name(&self, pin: PinRef) -> &'static str {
        match pin {
            PinRef::Input(idx) => self.model.inputs()[idx],
            PinRef::Output(idx) => self.model.outputs()[idx],
        }
    }

    /// The net a pin is wired to, if any.
    pub fn connection(&self, pin: PinRef) -> Option<NetId> {
        match pin {
            PinRef::Input(idx) => self.inputs[idx],
            PinRef::Output(idx) => self.outputs[idx],
        }
    }

    /// Last value computed for output `pin`; `None` while tri-stated.
    pub fn output(&self, pin: usize) -> Option<bool> {
        self.values[pin]
    }

    pub fn latched(&self) -> Option<u16> {
        self.model.latched()
    }

    pub fn latched_width(&self) -> u8 {
        self.model.latched_width()
    }

    pub(crate) fn tap(&self, bit: u8) -> Option<bool> {
        self.model.latched().map(|v| (v >> bit) & 1 == 1)
    }

    pub(crate) fn connect(&mut self, pin: PinRef, net: NetId) {
        match pin {
            PinRef::Input(idx) => self.inputs[idx] = Some(net),
            PinRef::Output(idx) => self.outputs[idx] = Some(net),
        }
    }

    /// Copies `image` into the chip's storage starting at address 0.
    pub(crate) fn load(&mut self, image: &[u8]) -> SResult<()> {
        let mem = match &mut self.model {
            Model::Memory(mem) => mem,
            other => {
                return Err(SimError::NotAMemory {
                    chip: self.reference.clone(),
                    part: other.part(),
                })
            }
        };
        if image.len() > mem.capacity() {
            return Err(SimError::ImageTooLarge {
                chip: self.reference.clone(),
                len: image.len(),
                capacity: mem.capacity(),
            });
        }
        mem.load(image);
        log::debug!("loaded {} bytes into {}", image.len(), self.reference);
        Ok(())
    }

    pub(crate) fn eval(&mut self, nets: &[Net]) {
        let inp = Inputs {
            conns: &self.inputs,
            nets,
        };
        let mut out = Outputs {
            values: &mut self.values,
        };
        self.model.eval(&inp, &mut out);
    }

    pub(crate) fn tick(&mut self, nets: &[Net]) {
        let inp = Inputs {
            conns: &self.inputs,
            nets,
        };
        self.model.tick(&inp);
    }
}
