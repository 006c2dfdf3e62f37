//! AirTally library: portable BLE device activity counter.
//!
//! Counts distinct Bluetooth Low Energy devices seen over a rolling time
//! window, classifies them by device type, and keeps ranked, filterable
//! views of that activity for a small screen. Everything here is platform
//! independent and testable on any host with `cargo test`; the firmware
//! binary in `firmware-std/` supplies the radio, buttons, display and
//! flash storage.
//!
//! The library is organized in two layers:
//! - **Layer 1**: `scanner`, `classify`, `defaults`, `label`, `screen`,
//!   `board`. Stateless parsing, classification and layout over `heapless`
//!   buffers.
//! - **Layer 2**: `tracker`, `knowledge`, `aggregate`, `change`, `filter`,
//!   `storage`, `engine`, `config`, `protocol`, `comm`. Tracker state and
//!   its host interface, using `alloc` for maps and per-device timestamp
//!   queues.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod aggregate;
pub mod board;
pub mod change;
pub mod classify;
pub mod comm;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod filter;
pub mod knowledge;
pub mod label;
pub mod protocol;
pub mod scanner;
pub mod screen;
pub mod storage;
pub mod tracker;
