//! Behavioural models for every part on the board.
//!
//! Pin names follow the datasheets, with a leading `~` marking active-low pins.

pub mod adder;
pub mod alu;
pub mod counter;
pub mod decoder;
pub mod gates;
pub mod memory;
pub mod register;
pub mod transceiver;
