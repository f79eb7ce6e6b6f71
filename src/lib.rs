#![cfg_attr(doc, warn(missing_docs))]
//! Structural simulator for a breadboard CPU built from 74HC-series logic.
//!
//! Every physical chip is modelled as a [`Chip`][sim::chip::Chip] with named pins,
//! chips are connected through named [`Net`][sim::net::Net]s, and a [`System`][sim::System]
//! settles combinational logic and clocks sequential parts the way the real board would.

pub mod chips;
pub mod cpu;
pub mod sim;
