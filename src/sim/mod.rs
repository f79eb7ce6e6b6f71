//! The simulation engine: nets, chips, and the system that owns them.

use thiserror::Error;

pub mod chip;
pub mod config;
pub mod net;
pub mod system;

#[cfg(test)]
pub(crate) mod bench;

pub use chip::{Chip, ChipId, Model, Part, PinRef};
pub use config::SimConfig;
pub use net::{Driver, Net, NetId, Source};
pub use system::{Anomalies, Contention, Settle, System, SystemBuilder, Tick, WireRecord};

/// An error raised while building or driving a [System].
#[derive(Debug, Error)]
pub enum SimError {
    #[error("pin {pin} not found on {chip} ({part})")]
    UnknownPin {
        chip: String,
        part: &'static str,
        pin: String,
    },
    #[error("pin {pin} on {chip} is already wired to {net}")]
    PinAlreadyWired {
        chip: String,
        pin: String,
        net: String,
    },
    #[error("a chip named {0} already exists")]
    DuplicateChip(String),
    #[error("no chip with id {0}")]
    UnknownChip(ChipId),
    #[error("no net named {0}")]
    UnknownNet(String),
    #[error("{chip} ({part}) has no latched state to tap")]
    NotTappable { chip: String, part: &'static str },
    #[error("bit {bit} is outside the latched state of {chip} ({part})")]
    TapOutOfRange {
        chip: String,
        part: &'static str,
        bit: u8,
    },
    #[error("bus of {0} nets is wider than {max} bits", max = system::MAX_BUS_WIDTH)]
    BusTooWide(usize),
    #[error("{chip} ({part}) has no storage to load")]
    NotAMemory { chip: String, part: &'static str },
    #[error("image of {len} bytes does not fit in {chip} ({capacity} bytes)")]
    ImageTooLarge {
        chip: String,
        len: usize,
        capacity: usize,
    },
    #[error("bus contention on {}", .0.join(", "))]
    Contention(Vec<String>),
    #[error("combinational logic did not settle within {0} passes")]
    NoConvergence(usize),
}

/// Type alias for Result<T, [SimError]>.
pub type SResult<T> = Result<T, SimError>;
