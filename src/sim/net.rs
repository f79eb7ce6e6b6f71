use std::fmt;

use super::chip::{Chip, ChipId};

/// Index of a [Net] inside its owning system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(pub(crate) usize);

impl NetId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something inside a chip that may put a value on a net.
///
/// Drivers are plain indices, resolved against the chip arena every time the net is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    /// An output pin, by its index in the part's output list.
    Pin { chip: ChipId, pin: usize },
    /// One bit of the chip's latched value, visible regardless of its output enables.
    Tap { chip: ChipId, bit: u8 },
}

/// Where a value seen on a net came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// A rail tie, the clock, or stimulus applied through [`System::drive`][super::System::drive].
    External,
    Driver(Driver),
}

/// A simulated wire.
#[derive(Debug, Clone)]
pub struct Net {
    name: String,
    pull: Option<bool>,
    state: bool,
    next_state: bool,
    pub(crate) external: Option<bool>,
    pub(crate) drivers: Vec<Driver>,
}

impl Net {
    pub(crate) fn new(name: impl Into<String>, pull: Option<bool>) -> Self {
        let state = pull.unwrap_or(false);
        Self {
            name: name.into(),
            pull,
            state,
            next_state: state,
            external: None,
            drivers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value this net idles at when nothing drives it.
    pub fn pull(&self) -> Option<bool> {
        self.pull
    }

    /// The committed logic level.
    pub fn state(&self) -> bool {
        self.state
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn external(&self) -> Option<bool> {
        self.external
    }

    /// Every source currently driving this net, in registration order, with the value it drives.
    /// Tri-stated outputs are skipped.
    pub fn driving<'a>(&'a self, chips: &'a [Chip]) -> impl Iterator<Item = (Source, bool)> + 'a {
        let external = self.external.map(|v| (Source::External, v));
        let drivers = self.drivers.iter().filter_map(move |&driver| {
            let value = match driver {
                Driver::Pin { chip, pin } => chips[chip.index()].output(pin),
                Driver::Tap { chip, bit } => chips[chip.index()].tap(bit),
            };
            value.map(|v| (Source::Driver(driver), v))
        });
        external.into_iter().chain(drivers)
    }

    /// Computes `next_state` from the current driver values, returning `true` if
    /// two drivers disagree. On contention the last driver in registration order wins.
    pub(crate) fn eval(&mut self, chips: &[Chip]) -> bool {
        let mut value: Option<bool> = None;
        let mut contended = false;
        for (_, v) in self.driving(chips) {
            if value.is_some_and(|prev| prev != v) {
                contended = true;
            }
            value = Some(v);
        }
        self.next_state = value.or(self.pull).unwrap_or(false);
        contended
    }

    /// Commits `next_state`. Returns whether the level changed.
    pub(crate) fn apply(&mut self) -> bool {
        let changed = self.state != self.next_state;
        self.state = self.next_state;
        changed
    }
}
