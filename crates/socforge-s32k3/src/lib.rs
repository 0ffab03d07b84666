//! Silicon model for the NXP S32K3X8 evaluation board (Cortex-M7).
//!
//! This crate has **no dependencies** and **no emulation behavior** — it is a
//! pure model of the part as the reference board wires it: memory map, clock
//! rates, interrupt line plan, and the on-chip device inventory. The values
//! come from the S32K3X8EVB reference manual figures the board uses.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`memmap`] | Flash, SRAM and peripheral MMIO apertures |
//! | [`clocks`] | System and reference clock rates |
//! | [`irq`] | NVIC sizing and peripheral line assignments |
//! | [`board`] | Board identity and device inventory |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod board;
pub mod clocks;
pub mod irq;
pub mod memmap;
