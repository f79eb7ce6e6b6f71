/// Pass budget used when no explicit limit is configured. Deep enough for the
/// longest combinational path on the board (microcode -> decoders -> buffers -> memory).
pub const DEFAULT_MAX_PASSES: usize = 30;

/// Net driven by [`System::tick`][super::System::tick] unless configured otherwise.
pub const DEFAULT_CLOCK_NET: &str = "CLK";

/// Tunables for a [System][super::System].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Maximum number of evaluate/propagate passes per settle before the
    /// network is declared non-convergent.
    pub max_passes: usize,
    /// Name of the net toggled by each clock tick.
    pub clock_net: String,
}

impl SimConfig {
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn with_clock_net(mut self, clock_net: impl Into<String>) -> Self {
        self.clock_net = clock_net.into();
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            clock_net: DEFAULT_CLOCK_NET.to_owned(),
        }
    }
}
