use rustc_hash::FxHashMap;

use crate::chips::memory::Memory;

use super::{
    chip::{Chip, ChipId, Model, Part, PinRef},
    config::SimConfig,
    net::{Driver, Net, NetId, Source},
    SResult, SimError,
};

/// Widest bus [`System::bus_value`] and [`System::drive_bus`] can pack into a `u32`.
pub const MAX_BUS_WIDTH: usize = 32;

fn check_width(bus: &[NetId]) -> SResult<()> {
    if bus.len() > MAX_BUS_WIDTH {
        return Err(SimError::BusTooWide(bus.len()));
    }
    Ok(())
}

/// One `wire` call, kept for introspection of the finished board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireRecord {
    pub chip: ChipId,
    pub pin: PinRef,
    pub net: NetId,
}

/// Anything that can name a net while building: an existing [NetId] or a net name.
pub trait IntoNet {
    fn into_net(self, builder: &mut SystemBuilder) -> NetId;
}

impl IntoNet for NetId {
    fn into_net(self, _builder: &mut SystemBuilder) -> NetId {
        self
    }
}

impl IntoNet for &str {
    fn into_net(self, builder: &mut SystemBuilder) -> NetId {
        builder.net(self)
    }
}

impl IntoNet for &String {
    fn into_net(self, builder: &mut SystemBuilder) -> NetId {
        builder.net(self)
    }
}

impl IntoNet for String {
    fn into_net(self, builder: &mut SystemBuilder) -> NetId {
        builder.net(&self)
    }
}

/// Collects nets, chips and wiring, then freezes them into a [System].
#[derive(Debug, Default)]
pub struct SystemBuilder {
    config: SimConfig,
    nets: Vec<Net>,
    net_index: FxHashMap<String, NetId>,
    chips: Vec<Chip>,
    chip_index: FxHashMap<String, ChipId>,
    wiring: Vec<WireRecord>,
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the net called `name`, creating it with no pull if it doesn't exist yet.
    pub fn net(&mut self, name: &str) -> NetId {
        self.net_with_pull(name, None)
    }

    /// Returns the net called `name`, creating it with `pull` if it doesn't exist yet.
    /// The pull of an existing net is left alone.
    pub fn net_with_pull(&mut self, name: &str, pull: Option<bool>) -> NetId {
        if let Some(&id) = self.net_index.get(name) {
            return id;
        }
        let id = NetId(self.nets.len());
        self.nets.push(Net::new(name, pull));
        self.net_index.insert(name.to_owned(), id);
        id
    }

    /// Returns the nets `{prefix}0` through `{prefix}{width - 1}`, least significant first.
    pub fn bus(&mut self, prefix: &str, width: usize, pull: Option<bool>) -> Vec<NetId> {
        (0..width)
            .map(|i| self.net_with_pull(&format!("{prefix}{i}"), pull))
            .collect()
    }

    /// Places a chip. Chips are evaluated in the order they are added.
    pub fn add(
        &mut self,
        reference: impl Into<String>,
        desc: impl Into<String>,
        model: impl Into<Model>,
    ) -> SResult<ChipId> {
        let reference = reference.into();
        if self.chip_index.contains_key(&reference) {
            return Err(SimError::DuplicateChip(reference));
        }
        let id = ChipId(self.chips.len());
        self.chip_index.insert(reference.clone(), id);
        self.chips.push(Chip::new(reference, desc.into(), model.into()));
        Ok(id)
    }

    /// Connects pin `pin` of `chip` to `net`. Output pins become drivers of the net.
    ///
    /// # Errors
    ///
    /// Fails if the part has no such pin or the pin is already wired.
    pub fn wire(&mut self, chip: ChipId, pin: &str, net: impl IntoNet) -> SResult<()> {
        let net = net.into_net(self);
        let c = self
            .chips
            .get_mut(chip.index())
            .ok_or(SimError::UnknownChip(chip))?;
        let pin_ref = c.pin(pin).ok_or_else(|| SimError::UnknownPin {
            chip: c.reference().to_owned(),
            part: c.part(),
            pin: pin.to_owned(),
        })?;
        if let Some(existing) = c.connection(pin_ref) {
            return Err(SimError::PinAlreadyWired {
                chip: c.reference().to_owned(),
                pin: pin.to_owned(),
                net: self.nets[existing.index()].name().to_owned(),
            });
        }
        c.connect(pin_ref, net);
        if let PinRef::Output(idx) = pin_ref {
            self.nets[net.index()]
                .drivers
                .push(Driver::Pin { chip, pin: idx });
        }
        log::trace!(
            "wire {}.{} -> {}",
            c.reference(),
            pin,
            self.nets[net.index()].name()
        );
        self.wiring.push(WireRecord {
            chip,
            pin: pin_ref,
            net,
        });
        Ok(())
    }

    /// Drives `net` from bit `bit` of the chip's latched value, bypassing its output enables.
    pub fn tap(&mut self, chip: ChipId, bit: u8, net: impl IntoNet) -> SResult<()> {
        let net = net.into_net(self);
        let c = self
            .chips
            .get(chip.index())
            .ok_or(SimError::UnknownChip(chip))?;
        if c.latched().is_none() {
            return Err(SimError::NotTappable {
                chip: c.reference().to_owned(),
                part: c.part(),
            });
        }
        if bit >= c.latched_width() {
            return Err(SimError::TapOutOfRange {
                chip: c.reference().to_owned(),
                part: c.part(),
                bit,
            });
        }
        self.nets[net.index()].drivers.push(Driver::Tap { chip, bit });
        Ok(())
    }

    /// Permanently drives `net` to `level`, like a rail.
    pub fn tie(&mut self, net: impl IntoNet, level: bool) -> NetId {
        let net = net.into_net(self);
        self.nets[net.index()].external = Some(level);
        net
    }

    /// Bulk-loads a memory chip, starting at address 0.
    pub fn load(&mut self, chip: ChipId, image: &[u8]) -> SResult<()> {
        self.chips
            .get_mut(chip.index())
            .ok_or(SimError::UnknownChip(chip))?
            .load(image)
    }

    pub fn build(mut self) -> System {
        let clock_net = self.config.clock_net.clone();
        let clock = self.net_with_pull(&clock_net, Some(false));
        log::debug!(
            "built system: {} chips, {} nets, {} connections",
            self.chips.len(),
            self.nets.len(),
            self.wiring.len()
        );
        System {
            config: self.config,
            nets: self.nets,
            net_index: self.net_index,
            chips: self.chips,
            chip_index: self.chip_index,
            wiring: self.wiring,
            clock,
            anomalies: Anomalies::default(),
        }
    }
}

/// A net whose drivers disagreed once settling finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contention {
    pub net: NetId,
    pub name: String,
    /// Every active driver and the value it was driving, in registration order.
    pub drivers: Vec<(Source, bool)>,
}

/// Outcome of one [`System::eval_combinational`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settle {
    /// Number of evaluate/propagate passes run.
    pub passes: usize,
    /// `false` if the pass budget ran out while nets were still changing.
    pub converged: bool,
    /// Contended nets as of the last pass.
    pub contentions: Vec<Contention>,
}

impl Settle {
    pub fn is_clean(&self) -> bool {
        self.converged && self.contentions.is_empty()
    }

    /// Turns a non-convergent or contended settle into an error.
    pub fn into_result(self) -> SResult<Self> {
        if !self.converged {
            Err(SimError::NoConvergence(self.passes))
        } else if !self.contentions.is_empty() {
            Err(SimError::Contention(
                self.contentions.into_iter().map(|c| c.name).collect(),
            ))
        } else {
            Ok(self)
        }
    }
}

/// Outcome of one [`System::tick`]: the settles after the rising edge, after the
/// rising-edge updates, after the falling edge, and after the falling-edge updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub settles: [Settle; 4],
}

impl Tick {
    pub fn converged(&self) -> bool {
        self.settles.iter().all(|s| s.converged)
    }

    pub fn contentions(&self) -> impl Iterator<Item = &Contention> {
        self.settles.iter().flat_map(|s| s.contentions.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.settles.iter().all(Settle::is_clean)
    }
}

/// Running totals of runtime anomalies since the system was built.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Anomalies {
    pub settles: u64,
    pub unconverged: u64,
    pub contended: u64,
}

/// A wired board, ready to simulate.
#[derive(Debug)]
pub struct System {
    config: SimConfig,
    nets: Vec<Net>,
    net_index: FxHashMap<String, NetId>,
    chips: Vec<Chip>,
    chip_index: FxHashMap<String, ChipId>,
    wiring: Vec<WireRecord>,
    clock: NetId,
    anomalies: Anomalies,
}

impl System {
    /// Settles all combinational logic from the current state.
    ///
    /// Each pass evaluates every chip, then re-evaluates and commits every net. Settling stops on
    /// the first pass in which no net changes, or when the configured pass budget runs out.
    pub fn eval_combinational(&mut self) -> Settle {
        let mut contended = Vec::new();
        let mut passes = 0;
        let mut converged = false;
        while passes < self.config.max_passes {
            passes += 1;
            for chip in &mut self.chips {
                chip.eval(&self.nets);
            }
            contended.clear();
            let mut changed = false;
            for (idx, net) in self.nets.iter_mut().enumerate() {
                if net.eval(&self.chips) {
                    contended.push(NetId(idx));
                }
                changed |= net.apply();
            }
            if !changed {
                converged = true;
                break;
            }
        }
        log::trace!("settled in {} passes", passes);

        let contentions: Vec<Contention> = contended
            .into_iter()
            .map(|id| {
                let net = &self.nets[id.index()];
                Contention {
                    net: id,
                    name: net.name().to_owned(),
                    drivers: net.driving(&self.chips).collect(),
                }
            })
            .collect();

        self.anomalies.settles += 1;
        if !converged {
            self.anomalies.unconverged += 1;
            log::warn!(
                "combinational loop: no fixed point after {} passes",
                passes
            );
        }
        for c in &contentions {
            self.anomalies.contended += 1;
            log::warn!("bus contention on {}: {}", c.name, self.describe(&c.drivers));
        }

        Settle {
            passes,
            converged,
            contentions,
        }
    }

    /// Advances one full clock period.
    pub fn tick(&mut self) -> Tick {
        let clock = self.clock;
        self.drive(clock, Some(true));
        let rise = self.eval_combinational();
        self.tick_chips();
        let after_rise = self.eval_combinational();

        self.drive(clock, Some(false));
        let fall = self.eval_combinational();
        self.tick_chips();
        let after_fall = self.eval_combinational();

        Tick {
            settles: [rise, after_rise, fall, after_fall],
        }
    }

    fn tick_chips(&mut self) {
        for chip in &mut self.chips {
            chip.tick(&self.nets);
        }
    }

    /// Applies (`Some`) or releases (`None`) an external source on `net`.
    /// Takes effect on the next settle.
    pub fn drive(&mut self, net: NetId, level: Option<bool>) {
        self.nets[net.index()].external = level;
    }

    /// Drives each net of `bus` from the matching bit of `value`.
    pub fn drive_bus(&mut self, bus: &[NetId], value: u32) -> SResult<()> {
        check_width(bus)?;
        for (i, &net) in bus.iter().enumerate() {
            self.drive(net, Some((value >> i) & 1 == 1));
        }
        Ok(())
    }

    pub fn release_bus(&mut self, bus: &[NetId]) {
        for &net in bus {
            self.drive(net, None);
        }
    }

    /// Bulk-loads a memory chip, starting at address 0.
    pub fn load(&mut self, chip: ChipId, image: &[u8]) -> SResult<()> {
        self.chips
            .get_mut(chip.index())
            .ok_or(SimError::UnknownChip(chip))?
            .load(image)
    }

    pub fn state(&self, net: NetId) -> bool {
        self.nets[net.index()].state()
    }

    pub fn state_of(&self, name: &str) -> SResult<bool> {
        self.net_id(name)
            .map(|id| self.state(id))
            .ok_or_else(|| SimError::UnknownNet(name.to_owned()))
    }

    /// Reads `bus` as an integer, `bus[0]` being the least significant bit.
    pub fn bus_value(&self, bus: &[NetId]) -> SResult<u32> {
        check_width(bus)?;
        Ok(bus
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &net)| acc | (u32::from(self.state(net)) << i)))
    }

    /// Reads the nets `{prefix}0..{prefix}{width - 1}` as an integer.
    pub fn bus_value_of(&self, prefix: &str, width: usize) -> SResult<u32> {
        let bus = (0..width)
            .map(|i| {
                let name = format!("{prefix}{i}");
                self.net_id(&name).ok_or(SimError::UnknownNet(name))
            })
            .collect::<SResult<Vec<_>>>()?;
        self.bus_value(&bus)
    }

    pub fn net_id(&self, name: &str) -> Option<NetId> {
        self.net_index.get(name).copied()
    }

    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn clock(&self) -> NetId {
        self.clock
    }

    pub fn chip(&self, id: ChipId) -> Option<&Chip> {
        self.chips.get(id.index())
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn find_chip(&self, reference: &str) -> Option<ChipId> {
        self.chip_index.get(reference).copied()
    }

    pub fn memory(&self, chip: ChipId) -> Option<&Memory> {
        self.chip(chip).and_then(Chip::memory)
    }

    pub fn wiring(&self) -> &[WireRecord] {
        &self.wiring
    }

    /// The wiring log as `(chip reference, pin name, net name)` triples.
    pub fn wiring_table(&self) -> impl Iterator<Item = (&str, &'static str, &str)> {
        self.wiring.iter().map(|w| {
            let chip = &self.chips[w.chip.index()];
            (
                chip.reference(),
                chip.pin_name(w.pin),
                self.nets[w.net.index()].name(),
            )
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn anomalies(&self) -> Anomalies {
        self.anomalies
    }

    fn describe(&self, drivers: &[(Source, bool)]) -> String {
        drivers
            .iter()
            .map(|&(source, level)| {
                let who = match source {
                    Source::External => "external".to_owned(),
                    Source::Driver(Driver::Pin { chip, pin }) => {
                        let c = &self.chips[chip.index()];
                        format!("{}.{}", c.reference(), c.model().outputs()[pin])
                    }
                    Source::Driver(Driver::Tap { chip, bit }) => {
                        format!("{}[{}]", self.chips[chip.index()].reference(), bit)
                    }
                };
                format!("{}={}", who, u8::from(level))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::{counter::Hc161, decoder::Hc138, gates::Hc04, register::Hc574};

    #[test]
    fn test_wire_unknown_pin() {
        let mut b = SystemBuilder::new();
        let u1 = b.add("U1", "Register", Hc574::new()).unwrap();
        let err = b.wire(u1, "Q9", "DATA0").unwrap_err();
        assert_eq!(err.to_string(), "pin Q9 not found on U1 (74HC574)");
    }

    #[test]
    fn test_wire_twice() {
        let mut b = SystemBuilder::new();
        let u1 = b.add("U1", "", Hc574::new()).unwrap();
        b.wire(u1, "D0", "A").unwrap();
        assert!(matches!(
            b.wire(u1, "D0", "B"),
            Err(SimError::PinAlreadyWired { .. })
        ));
    }

    #[test]
    fn test_duplicate_reference() {
        let mut b = SystemBuilder::new();
        b.add("U1", "", Hc04::new()).unwrap();
        assert!(matches!(
            b.add("U1", "", Hc04::new()),
            Err(SimError::DuplicateChip(_))
        ));
    }

    #[test]
    fn test_tap_needs_latched_state() {
        let mut b = SystemBuilder::new();
        let inv = b.add("U1", "", Hc04::new()).unwrap();
        assert!(matches!(
            b.tap(inv, 0, "X"),
            Err(SimError::NotTappable { .. })
        ));
        let reg = b.add("U2", "", Hc574::new()).unwrap();
        b.tap(reg, 0, "X").unwrap();
    }

    #[test]
    fn test_tap_stays_within_latched_width() {
        let mut b = SystemBuilder::new();
        let reg = b.add("U1", "", Hc574::new()).unwrap();
        let ctr = b.add("U2", "", Hc161::new()).unwrap();
        b.tap(reg, 7, "R7").unwrap();
        b.tap(ctr, 3, "C3").unwrap();
        assert!(matches!(
            b.tap(reg, 8, "X"),
            Err(SimError::TapOutOfRange { bit: 8, .. })
        ));
        assert!(matches!(
            b.tap(ctr, 4, "Y"),
            Err(SimError::TapOutOfRange { bit: 4, .. })
        ));
        let err = b.tap(reg, 16, "Z").unwrap_err();
        assert_eq!(
            err.to_string(),
            "bit 16 is outside the latched state of U1 (74HC574)"
        );

        // Only the accepted taps drive anything, and settling reads them safely.
        let mut sys = b.build();
        assert!(sys.eval_combinational().converged);
        for name in ["X", "Y", "Z"] {
            let net = sys.net_id(name).unwrap();
            assert!(sys.net(net).drivers().is_empty());
        }
    }

    #[test]
    fn test_net_is_created_once() {
        let mut b = SystemBuilder::new();
        let a = b.net_with_pull("N", Some(true));
        let again = b.net_with_pull("N", Some(false));
        assert_eq!(a, again);
        let bus = b.bus("DATA", 8, Some(false));
        assert_eq!(bus.len(), 8);
        assert_eq!(b.net("DATA3"), bus[3]);
        let sys = b.build();
        assert_eq!(sys.net(a).pull(), Some(true));
        assert!(sys.state(a));
    }

    #[test]
    fn test_wiring_log() {
        let mut b = SystemBuilder::new();
        let inv = b.add("U1", "Inverter", Hc04::new()).unwrap();
        b.wire(inv, "1A", "IN").unwrap();
        b.wire(inv, "1Y", "OUT").unwrap();
        let sys = b.build();
        let table: Vec<_> = sys.wiring_table().collect();
        assert_eq!(table, vec![("U1", "1A", "IN"), ("U1", "1Y", "OUT")]);
        let out = sys.net_id("OUT").unwrap();
        assert_eq!(
            sys.net(out).drivers(),
            &[Driver::Pin {
                chip: inv,
                pin: 0
            }]
        );
    }

    #[test]
    fn test_combinational_fixed_point_is_stable() {
        // Three inverters in a chain.
        let mut b = SystemBuilder::new();
        let inv = b.add("U1", "", Hc04::new()).unwrap();
        b.wire(inv, "1A", "IN").unwrap();
        b.wire(inv, "1Y", "N1").unwrap();
        b.wire(inv, "2A", "N1").unwrap();
        b.wire(inv, "2Y", "N2").unwrap();
        b.wire(inv, "3A", "N2").unwrap();
        b.wire(inv, "3Y", "OUT").unwrap();
        let input = b.net("IN");
        let mut sys = b.build();

        sys.drive(input, Some(true));
        let first = sys.eval_combinational();
        assert!(first.is_clean());
        assert!(!sys.state_of("OUT").unwrap());

        let again = sys.eval_combinational();
        assert!(again.converged);
        assert_eq!(again.passes, 1);
        assert!(!sys.state_of("OUT").unwrap());
        assert!(sys.state_of("N1").is_ok_and(|v| !v));
    }

    #[test]
    fn test_oscillator_does_not_converge() {
        let mut b = SystemBuilder::with_config(SimConfig::default().with_max_passes(12));
        let inv = b.add("U1", "Ring", Hc04::new()).unwrap();
        b.wire(inv, "1A", "LOOP").unwrap();
        b.wire(inv, "1Y", "LOOP").unwrap();
        let mut sys = b.build();

        let settle = sys.eval_combinational();
        assert!(!settle.converged);
        assert_eq!(settle.passes, 12);
        assert!(matches!(
            settle.into_result(),
            Err(SimError::NoConvergence(12))
        ));
        assert_eq!(sys.anomalies().unconverged, 1);
    }

    #[test]
    fn test_contention_is_reported() {
        let mut b = SystemBuilder::new();
        let gnd = b.tie("GND", false);
        let vcc = b.tie("VCC", true);
        let u1 = b.add("U1", "", Hc04::new()).unwrap();
        let u2 = b.add("U2", "", Hc04::new()).unwrap();
        b.wire(u1, "1A", gnd).unwrap();
        b.wire(u2, "1A", vcc).unwrap();
        b.wire(u1, "1Y", "SHARED").unwrap();
        b.wire(u2, "1Y", "SHARED").unwrap();
        let shared = b.net("SHARED");
        let mut sys = b.build();

        let settle = sys.eval_combinational();
        assert!(settle.converged);
        assert_eq!(settle.contentions.len(), 1);
        let c = &settle.contentions[0];
        assert_eq!(c.net, shared);
        assert_eq!(c.name, "SHARED");
        assert_eq!(
            c.drivers,
            vec![
                (Source::Driver(Driver::Pin { chip: u1, pin: 0 }), true),
                (Source::Driver(Driver::Pin { chip: u2, pin: 0 }), false),
            ]
        );
        // Last driver wins.
        assert!(!sys.state(shared));
        assert_eq!(sys.anomalies().contended, 1);
        match settle.into_result() {
            Err(SimError::Contention(nets)) => assert_eq!(nets, vec!["SHARED".to_owned()]),
            other => panic!("expected contention, got {:?}", other),
        }
    }

    #[test]
    fn test_transient_contention_is_not_reported() {
        // LOW idles high until its tie takes effect, so the two inverters disagree for
        // one pass and agree from then on.
        let mut b = SystemBuilder::new();
        let gnd = b.tie("GND", false);
        let low = b.net_with_pull("LOW", Some(true));
        b.tie(low, false);
        let u1 = b.add("U1", "", Hc04::new()).unwrap();
        let u2 = b.add("U2", "", Hc04::new()).unwrap();
        b.wire(u1, "1A", gnd).unwrap();
        b.wire(u2, "1A", low).unwrap();
        b.wire(u1, "1Y", "SHARED").unwrap();
        b.wire(u2, "1Y", "SHARED").unwrap();
        let mut sys = b.build();

        let settle = sys.eval_combinational();
        assert!(settle.converged);
        assert!(settle.passes > 2);
        assert!(settle.contentions.is_empty());
        assert!(sys.state_of("SHARED").unwrap());
        assert_eq!(sys.anomalies().contended, 0);
    }

    #[test]
    fn test_agreeing_drivers_are_not_contention() {
        let mut b = SystemBuilder::new();
        let gnd = b.tie("GND", false);
        let u1 = b.add("U1", "", Hc04::new()).unwrap();
        b.wire(u1, "1A", gnd).unwrap();
        b.wire(u1, "2A", gnd).unwrap();
        b.wire(u1, "1Y", "SHARED").unwrap();
        b.wire(u1, "2Y", "SHARED").unwrap();
        let mut sys = b.build();
        assert!(sys.eval_combinational().is_clean());
        assert!(sys.state_of("SHARED").unwrap());
    }

    #[test]
    fn test_register_tick() {
        let mut b = SystemBuilder::new();
        let gnd = b.tie("GND", false);
        let data = b.bus("DATA", 8, Some(false));
        let out = b.bus("OUT", 8, Some(false));
        let clk = b.net_with_pull("CLK", Some(false));
        let reg = b.add("U1", "Register", Hc574::new()).unwrap();
        b.wire(reg, "~OE", gnd).unwrap();
        b.wire(reg, "CLK", clk).unwrap();
        for i in 0..8 {
            b.wire(reg, &format!("D{i}"), data[i]).unwrap();
            b.wire(reg, &format!("Q{i}"), out[i]).unwrap();
        }
        let mut sys = b.build();
        assert_eq!(sys.clock(), clk);

        sys.drive_bus(&data, 0x5A).unwrap();
        sys.eval_combinational();
        assert_eq!(sys.bus_value(&out).unwrap(), 0x00);

        let tick = sys.tick();
        assert!(tick.is_clean());
        assert_eq!(sys.bus_value(&out).unwrap(), 0x5A);
        assert_eq!(sys.bus_value_of("OUT", 8).unwrap(), 0x5A);
        assert!(!sys.state(clk));

        sys.drive_bus(&data, 0x33).unwrap();
        sys.eval_combinational();
        assert_eq!(sys.bus_value(&out).unwrap(), 0x5A);
        sys.tick();
        assert_eq!(sys.bus_value(&out).unwrap(), 0x33);
    }

    #[test]
    fn test_decoder_select() {
        let mut b = SystemBuilder::new();
        let dec = b.add("U1", "Decoder", Hc138::new()).unwrap();
        for pin in ["A", "B", "C", "~G2A", "~G2B", "G1"] {
            b.wire(dec, pin, pin).unwrap();
        }
        for i in 0..8 {
            b.wire(dec, &format!("~Y{i}"), format!("Y{i}")).unwrap();
        }
        let sel = [b.net("A"), b.net("B"), b.net("C")];
        let g1 = b.net("G1");
        let mut sys = b.build();

        sys.drive_bus(&sel, 5).unwrap();
        sys.drive(g1, Some(true));
        sys.eval_combinational();
        assert_eq!(sys.bus_value_of("Y", 8).unwrap(), 0xFF & !(1 << 5));

        sys.drive(g1, Some(false));
        sys.eval_combinational();
        assert_eq!(sys.bus_value_of("Y", 8).unwrap(), 0xFF);
    }

    #[test]
    fn test_bus_wider_than_a_word() {
        let mut b = SystemBuilder::new();
        let wide = b.bus("WIDE", MAX_BUS_WIDTH + 8, None);
        let mut sys = b.build();
        assert!(matches!(
            sys.drive_bus(&wide, 1),
            Err(SimError::BusTooWide(40))
        ));
        assert!(matches!(
            sys.bus_value(&wide),
            Err(SimError::BusTooWide(40))
        ));
        assert!(matches!(
            sys.bus_value_of("WIDE", 40),
            Err(SimError::BusTooWide(40))
        ));

        let word = &wide[..MAX_BUS_WIDTH];
        sys.drive_bus(word, 0x8000_0001).unwrap();
        sys.eval_combinational();
        assert_eq!(sys.bus_value(word).unwrap(), 0x8000_0001);
        assert_eq!(sys.bus_value_of("WIDE", 32).unwrap(), 0x8000_0001);
    }

    #[test]
    fn test_unknown_net() {
        let sys = SystemBuilder::new().build();
        assert!(matches!(
            sys.state_of("NOPE"),
            Err(SimError::UnknownNet(_))
        ));
        assert!(sys.bus_value_of("NOPE", 2).is_err());
    }
}
