//! Wiring for the whole breadboard, chip by chip.
//!
//! Control word layout (three microcode EEPROMs, `CTRL0..CTRL23`):
//!
//! | Bits  | Meaning                                          |
//! |-------|--------------------------------------------------|
//! | 0-3   | data bus source                                  |
//! | 4-7   | data bus destination                             |
//! | 8-9   | address bus source: 0 IP, 1 C:D, 2 SP + IR[3:0]  |
//! | 10-12 | ALU operation                                    |
//! | 13    | latch flags                                      |
//! | 14    | increment IP                                     |
//! | 15    | increment SP                                     |
//! | 16    | decrement SP                                     |
//! | 17    | restart the micro-sequence                       |
//! | 18    | halt                                             |

use crate::{
    chips::{
        adder::Hc283,
        alu::GalAlu,
        counter::{Hc161, Hc193},
        decoder::{Hc138, Hc154},
        gates::{Hc00, Hc04, Hc08},
        memory::Memory,
        register::Hc574,
        transceiver::Hc245,
    },
    sim::{ChipId, NetId, SResult, SystemBuilder},
};

pub const HALT_NET: &str = "CTRL18";
pub const RESET_NET: &str = "~RESET";
pub const CONTROL_WIDTH: usize = 24;

/// Data bus sources selected by `CTRL0..3`.
pub mod src {
    pub const A: u8 = 1;
    pub const B: u8 = 2;
    pub const C: u8 = 3;
    pub const D: u8 = 4;
    pub const ALU: u8 = 5;
    pub const MEM: u8 = 6;
    pub const IP_LO: u8 = 7;
    pub const IP_HI: u8 = 8;
    pub const SP: u8 = 9;
}

/// Data bus destinations selected by `CTRL4..7`.
pub mod dst {
    pub const A: u8 = 1;
    pub const B: u8 = 2;
    pub const C: u8 = 3;
    pub const D: u8 = 4;
    pub const IR: u8 = 5;
    pub const MEM: u8 = 6;
    pub const IP_LO: u8 = 7;
    pub const IP_HI: u8 = 8;
    pub const SP: u8 = 9;
    pub const OUT: u8 = 10;
}

/// Handles to the chips the runtime needs to look at.
#[derive(Debug, Clone)]
pub struct Parts {
    pub uip: ChipId,
    pub flags: ChipId,
    pub ir: ChipId,
    pub microcode: [ChipId; 3],
    /// A, B, C, D.
    pub regs: [ChipId; 4],
    /// Least significant nibble first.
    pub ip: [ChipId; 4],
    pub sp: [ChipId; 2],
    pub rom: ChipId,
    pub ram: ChipId,
    pub control: Vec<NetId>,
}

const NIBBLE: [&str; 4] = ["A", "B", "C", "D"];
const NIBBLE_Q: [&str; 4] = ["QA", "QB", "QC", "QD"];

/// Wires a 74HC245 as a one-way buffer from the nets `from` onto `to`, enabled by `oe`.
fn buffer(
    b: &mut SystemBuilder,
    reference: &str,
    desc: &str,
    oe: &str,
    from: &[NetId],
    to: &[NetId],
) -> SResult<ChipId> {
    let buf = b.add(reference, desc, Hc245::new())?;
    b.wire(buf, "DIR", "VCC")?;
    b.wire(buf, "~OE", oe)?;
    for (i, (&a, &y)) in from.iter().zip(to).enumerate() {
        b.wire(buf, &format!("A{i}"), a)?;
        b.wire(buf, &format!("B{i}_OUT"), y)?;
    }
    Ok(buf)
}

fn nets(b: &mut SystemBuilder, prefix: &str, range: std::ops::Range<usize>) -> Vec<NetId> {
    range.map(|i| b.net(&format!("{prefix}{i}"))).collect()
}

/// Places and wires every chip on the board.
pub fn wire(b: &mut SystemBuilder) -> SResult<Parts> {
    b.net_with_pull("CLK", Some(false));
    b.net_with_pull(RESET_NET, Some(true));
    let gnd = b.net_with_pull("GND", Some(false));
    b.tie(gnd, false);
    let vcc = b.net_with_pull("VCC", Some(true));
    b.tie(vcc, true);
    let data = b.bus("DATA", 8, Some(false));
    let addr = b.bus("ADDR", 16, Some(false));

    // Micro-sequencer, clocked on the falling edge so the IR and ROM settle first.
    let uip = b.add("U2", "uIP Counter", Hc161::new())?;
    b.wire(uip, "CLK", "~CLK")?;
    b.wire(uip, "~CLR", "~uIP_CLR")?;
    b.wire(uip, "ENT", "VCC")?;
    b.wire(uip, "ENP", "VCC")?;
    b.wire(uip, "~LOAD", "VCC")?;
    for pin in NIBBLE {
        b.wire(uip, pin, "GND")?;
    }

    let flags = b.add("U11", "Flags Register", Hc574::new())?;
    b.wire(flags, "CLK", "FLAGS_CLK")?;
    b.wire(flags, "~OE", "GND")?;
    for (i, net) in ["ALU_Z", "ALU_C", "ALU_N"].into_iter().enumerate() {
        b.wire(flags, &format!("D{i}"), net)?;
    }
    for i in 3..8 {
        b.wire(flags, &format!("D{i}"), "GND")?;
    }

    let ir = b.add("U9", "Instruction Register", Hc574::new())?;
    b.wire(ir, "CLK", "IR_CLK")?;
    b.wire(ir, "~OE", "GND")?;
    for (i, &net) in data.iter().enumerate() {
        b.wire(ir, &format!("D{i}"), net)?;
    }

    let microcode = [
        b.add("U3", "Microcode EEPROM A", Memory::eeprom())?,
        b.add("U4", "Microcode EEPROM B", Memory::eeprom())?,
        b.add("U4b", "Microcode EEPROM C", Memory::eeprom())?,
    ];
    for (n, &mc) in microcode.iter().enumerate() {
        b.wire(mc, "~CE", "GND")?;
        b.wire(mc, "~OE", "GND")?;
        b.wire(mc, "~WE", "VCC")?;
        for i in 0..4 {
            b.wire(mc, &format!("A{i}"), format!("uIP_Q{i}"))?;
        }
        for i in 0..3 {
            b.wire(mc, &format!("A{}", i + 4), format!("FLAGS_Q{i}"))?;
        }
        for i in 0..8 {
            b.wire(mc, &format!("A{}", i + 7), format!("IR_Q{i}"))?;
            b.wire(mc, &format!("Q{i}"), format!("CTRL{}", n * 8 + i))?;
        }
    }
    for (i, pin) in NIBBLE_Q.into_iter().enumerate() {
        b.wire(uip, pin, format!("uIP_Q{i}"))?;
    }
    for i in 0..8 {
        b.wire(ir, &format!("Q{i}"), format!("IR_Q{i}"))?;
        b.wire(flags, &format!("Q{i}"), format!("FLAGS_Q{i}"))?;
    }
    let control = nets(b, "CTRL", 0..CONTROL_WIDTH);

    // Control decode.
    let src_dec = b.add("U5", "Bus Source Decoder", Hc154::new())?;
    b.wire(src_dec, "~G1", "GND")?;
    b.wire(src_dec, "~G2", "GND")?;
    for (i, pin) in NIBBLE.into_iter().enumerate() {
        b.wire(src_dec, pin, format!("CTRL{i}"))?;
    }

    let clk_inv = b.add("UINV1", "Clock Inverter", Hc04::new())?;
    b.wire(clk_inv, "1A", "CLK")?;
    b.wire(clk_inv, "1Y", "~CLK")?;

    // Clocked destinations only strobe while CLK is high.
    let dst_dec = b.add("U6", "Bus Dest Decoder", Hc154::new())?;
    b.wire(dst_dec, "~G1", "~CLK")?;
    b.wire(dst_dec, "~G2", "GND")?;
    for (i, pin) in NIBBLE.into_iter().enumerate() {
        b.wire(dst_dec, pin, format!("CTRL{}", i + 4))?;
    }
    for (y, name) in [
        (dst::A, "A"),
        (dst::B, "B"),
        (dst::C, "C"),
        (dst::D, "D"),
        (dst::IR, "IR"),
        (dst::OUT, "OUT"),
    ] {
        b.wire(dst_dec, &format!("~Y{y}"), format!("~DST_{name}"))?;
        let inv = b.add(format!("UINV_{name}"), "Hex Inverter", Hc04::new())?;
        b.wire(inv, "1A", format!("~DST_{name}"))?;
        b.wire(inv, "1Y", format!("{name}_CLK"))?;
    }
    // Memory writes are level sensitive.
    b.wire(dst_dec, &format!("~Y{}", dst::MEM), "~MEM_WE")?;

    let dst_dec_uc = b.add("U6B", "Unclocked Dest Decoder", Hc154::new())?;
    b.wire(dst_dec_uc, "~G1", "GND")?;
    b.wire(dst_dec_uc, "~G2", "GND")?;
    for (i, pin) in NIBBLE.into_iter().enumerate() {
        b.wire(dst_dec_uc, pin, format!("CTRL{}", i + 4))?;
    }
    b.wire(dst_dec_uc, &format!("~Y{}", dst::IP_LO), "~UC_IP_LO")?;
    b.wire(dst_dec_uc, &format!("~Y{}", dst::IP_HI), "~UC_IP_HI")?;
    b.wire(dst_dec_uc, &format!("~Y{}", dst::SP), "~UC_SP")?;

    for (y, net) in [
        (src::A, "~A_OE"),
        (src::B, "~B_OE"),
        (src::C, "~C_OE"),
        (src::D, "~D_OE"),
        (src::ALU, "~ALU_OE"),
        (src::MEM, "~MEM_OE"),
        (src::IP_LO, "~IP_LO_OE"),
        (src::IP_HI, "~IP_HI_OE"),
        (src::SP, "~SP_OE"),
    ] {
        b.wire(src_dec, &format!("~Y{y}"), net)?;
    }

    // General purpose registers. The taps feed the ALU and the address buffers no
    // matter what the register is doing on the data bus.
    let mut regs = Vec::with_capacity(4);
    for name in ["A", "B", "C", "D"] {
        let reg = b.add(format!("U_{name}"), format!("{name} Register"), Hc574::new())?;
        b.wire(reg, "CLK", format!("{name}_CLK"))?;
        b.wire(reg, "~OE", format!("~{name}_OE"))?;
        for (i, &net) in data.iter().enumerate() {
            b.wire(reg, &format!("D{i}"), net)?;
            b.wire(reg, &format!("Q{i}"), net)?;
            b.tap(reg, i as u8, format!("{name}_Q{i}"))?;
        }
        regs.push(reg);
    }
    let regs = [regs[0], regs[1], regs[2], regs[3]];

    // Address source decode.
    let addr_dec = b.add("U_ADDR_DEC", "ADDR Source Decode", Hc138::new())?;
    b.wire(addr_dec, "A", "CTRL8")?;
    b.wire(addr_dec, "B", "CTRL9")?;
    b.wire(addr_dec, "C", "GND")?;
    b.wire(addr_dec, "~G2A", "GND")?;
    b.wire(addr_dec, "~G2B", "GND")?;
    b.wire(addr_dec, "G1", "VCC")?;
    b.wire(addr_dec, "~Y0", "~IP_ADDR_OE")?;
    b.wire(addr_dec, "~Y1", "~CD_ADDR_OE")?;
    b.wire(addr_dec, "~Y2", "~SP_ADDR_OE")?;

    let c_q = nets(b, "C_Q", 0..8);
    let d_q = nets(b, "D_Q", 0..8);
    buffer(b, "U_CD_BUF_LO", "C to ADDR_LO", "~CD_ADDR_OE", &c_q, &addr[..8])?;
    buffer(b, "U_CD_BUF_HI", "D to ADDR_HI", "~CD_ADDR_OE", &d_q, &addr[8..])?;

    // Instruction pointer: four cascaded counters, loadable a byte at a time.
    let mut ip = Vec::with_capacity(4);
    for i in 0..4 {
        ip.push(b.add(format!("U_IP{i}"), "4-bit Counter", Hc161::new())?);
    }
    let ip = [ip[0], ip[1], ip[2], ip[3]];
    b.wire(ip[0], "ENT", "CTRL14")?;
    for i in 0..4 {
        b.wire(ip[i], "ENP", "CTRL14")?;
        if i > 0 {
            b.wire(ip[i], "ENT", format!("IP{}_RCO", i - 1))?;
        }
        if i < 3 {
            b.wire(ip[i], "RCO", format!("IP{i}_RCO"))?;
        }
        b.wire(ip[i], "CLK", "CLK")?;
        b.wire(ip[i], "~CLR", RESET_NET)?;
        b.wire(ip[i], "~LOAD", if i < 2 { "~UC_IP_LO" } else { "~UC_IP_HI" })?;
        let half = if i % 2 == 0 { 0 } else { 4 };
        for (j, pin) in NIBBLE.into_iter().enumerate() {
            b.wire(ip[i], pin, data[half + j])?;
        }
        for (j, pin) in NIBBLE_Q.into_iter().enumerate() {
            b.wire(ip[i], pin, format!("IP_Q{}", i * 4 + j))?;
        }
    }
    let ip_lo = nets(b, "IP_Q", 0..8);
    let ip_hi = nets(b, "IP_Q", 8..16);
    buffer(b, "U_IP_ADDR_LO", "IP to ADDR_LO", "~IP_ADDR_OE", &ip_lo, &addr[..8])?;
    buffer(b, "U_IP_ADDR_HI", "IP to ADDR_HI", "~IP_ADDR_OE", &ip_hi, &addr[8..])?;
    buffer(b, "U_IP_DATA_LO", "IP_LO to DATA", "~IP_LO_OE", &ip_lo, &data)?;
    buffer(b, "U_IP_DATA_HI", "IP_HI to DATA", "~IP_HI_OE", &ip_hi, &data)?;

    // Stack pointer: two cascaded up/down counters. The NANDs hold the count inputs
    // high and pulse them low for the high half of a clock period.
    let sp = [
        b.add("U_SP0", "4-bit Up/Down Counter", Hc193::new())?,
        b.add("U_SP1", "4-bit Up/Down Counter", Hc193::new())?,
    ];
    let nand_sp = b.add("U_NAND_SP", "Quad NAND", Hc00::new())?;
    b.wire(nand_sp, "1A", "CTRL15")?;
    b.wire(nand_sp, "1B", "CLK")?;
    b.wire(nand_sp, "1Y", "SP_UP_NAND")?;
    b.wire(nand_sp, "2A", "CTRL16")?;
    b.wire(nand_sp, "2B", "CLK")?;
    b.wire(nand_sp, "2Y", "SP_DN_NAND")?;
    b.wire(sp[0], "UP", "SP_UP_NAND")?;
    b.wire(sp[0], "DOWN", "SP_DN_NAND")?;
    b.wire(sp[0], "~CO", "SP0_CO")?;
    b.wire(sp[0], "~BO", "SP0_BO")?;
    b.wire(sp[1], "UP", "SP0_CO")?;
    b.wire(sp[1], "DOWN", "SP0_BO")?;
    for (n, &counter) in sp.iter().enumerate() {
        b.wire(counter, "CLR", "GND")?;
        b.wire(counter, "~LOAD", "~UC_SP")?;
        for (j, pin) in NIBBLE.into_iter().enumerate() {
            b.wire(counter, pin, data[n * 4 + j])?;
        }
        for (j, pin) in NIBBLE_Q.into_iter().enumerate() {
            b.wire(counter, pin, format!("SP_Q{}", n * 4 + j))?;
        }
    }
    let sp_q = nets(b, "SP_Q", 0..8);
    buffer(b, "U_SP_DATA", "SP to DATA", "~SP_OE", &sp_q, &data)?;

    // Stack-relative addressing: 0xFF00 | (SP + IR[3:0]).
    let add1 = b.add("U_ADD1", "4-bit Adder", Hc283::new())?;
    let add2 = b.add("U_ADD2", "4-bit Adder", Hc283::new())?;
    b.wire(add1, "C0", "GND")?;
    b.wire(add1, "C4", "ADD1_C4")?;
    b.wire(add2, "C0", "ADD1_C4")?;
    for i in 0..4 {
        b.wire(add1, &format!("A{}", i + 1), sp_q[i])?;
        b.wire(add1, &format!("B{}", i + 1), format!("IR_Q{i}"))?;
        b.wire(add1, &format!("S{}", i + 1), format!("IDX{i}"))?;
        b.wire(add2, &format!("A{}", i + 1), sp_q[i + 4])?;
        b.wire(add2, &format!("B{}", i + 1), "GND")?;
        b.wire(add2, &format!("S{}", i + 1), format!("IDX{}", i + 4))?;
    }
    let idx = nets(b, "IDX", 0..8);
    buffer(b, "U_SP_ADDR_LO", "SP+IDX to ADDR_LO", "~SP_ADDR_OE", &idx, &addr[..8])?;
    buffer(b, "U_SP_ADDR_HI", "Stack page to ADDR_HI", "~SP_ADDR_OE", &[vcc; 8], &addr[8..])?;

    let alu = b.add("U_ALU", "ALU PLD", GalAlu::new())?;
    b.wire(alu, "~OE", "~ALU_OE")?;
    for i in 0..8 {
        b.wire(alu, &format!("A{i}"), format!("A_Q{i}"))?;
        b.wire(alu, &format!("B{i}"), format!("B_Q{i}"))?;
        b.wire(alu, &format!("Q{i}"), data[i])?;
    }
    for i in 0..3 {
        b.wire(alu, &format!("OP{i}"), format!("CTRL{}", i + 10))?;
    }
    b.wire(alu, "Z", "ALU_Z")?;
    b.wire(alu, "C", "ALU_C")?;
    b.wire(alu, "N", "ALU_N")?;

    let and_flg = b.add("U_AND_FLG", "Quad AND", Hc08::new())?;
    b.wire(and_flg, "4A", "CTRL13")?;
    b.wire(and_flg, "4B", "CLK")?;
    b.wire(and_flg, "4Y", "FLAGS_CLK")?;
    // The micro-sequencer restarts on a board reset or on CTRL17.
    b.wire(and_flg, "1A", RESET_NET)?;
    b.wire(and_flg, "1B", "~uIP_RST")?;
    b.wire(and_flg, "1Y", "~uIP_CLR")?;

    // ROM answers 0x0000-0x7FFF, RAM 0x8000-0xFFFF.
    let rom = b.add("U_ROM", "32KB EEPROM", Memory::eeprom())?;
    let ram = b.add("U_RAM", "32KB SRAM", Memory::sram())?;
    let inv_a15 = b.add("U_INV_A15", "Hex Inverter", Hc04::new())?;
    b.wire(inv_a15, "4A", addr[15])?;
    b.wire(inv_a15, "4Y", "~A15")?;
    b.wire(rom, "~CE", addr[15])?;
    b.wire(ram, "~CE", "~A15")?;
    b.wire(rom, "~OE", "~MEM_OE")?;
    b.wire(ram, "~OE", "~MEM_OE")?;
    b.wire(rom, "~WE", "VCC")?;
    b.wire(ram, "~WE", "~MEM_WE")?;
    for mem in [rom, ram] {
        for (i, &net) in addr[..15].iter().enumerate() {
            b.wire(mem, &format!("A{i}"), net)?;
        }
        for (i, &net) in data.iter().enumerate() {
            b.wire(mem, &format!("D{i}"), net)?;
            b.wire(mem, &format!("Q{i}"), net)?;
        }
    }

    let inv_rst = b.add("U_INV_RST", "Hex Inverter", Hc04::new())?;
    b.wire(inv_rst, "5A", "CTRL17")?;
    b.wire(inv_rst, "5Y", "~uIP_RST")?;

    Ok(Parts {
        uip,
        flags,
        ir,
        microcode,
        regs,
        ip,
        sp,
        rom,
        ram,
        control,
    })
}
