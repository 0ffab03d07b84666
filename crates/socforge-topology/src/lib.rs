//! Deterministic hardware-topology assembler.
//!
//! Assembles a microcontroller board's hardware topology — memory map,
//! clock tree, device set and interrupt routing — into a consistent,
//! realized machine before execution begins. The assembler's job ends once
//! the topology is realized and the firmware image is staged; running the
//! guest is someone else's problem.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`space`] | [`AddressSpace`]: named regions, overlap detection, overlays |
//! | [`clock`] | [`ClockGraph`]: root/derived nodes, reciprocal resolution |
//! | [`device`] | [`DeviceRegistry`]: typed contracts and the realize state machine |
//! | [`fabric`] | [`InterruptFabric`]: unique-line IRQ routing |
//! | [`firmware`] | [`FirmwareLoader`]: bounds-checked boot-time staging |
//! | [`description`] | [`BoardDescription`]: the declarative input |
//! | [`assembler`] | [`BoardAssembler`]: the strict phase sequence |
//! | [`topology`] | [`Topology`]: the realized, read-only result |
//!
//! # Quick start
//!
//! ```no_run
//! use socforge_topology::{BoardAssembler, BoardDescription, FirmwareImage};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let text = std::fs::read_to_string("board.toml")?;
//! let description: BoardDescription = toml::from_str(&text)?;
//! let image = FirmwareImage::new(std::fs::read("app.bin")?, "app.bin");
//!
//! let topology = BoardAssembler::build(&description, Some(&image))?;
//! print!("{}", topology.summary());
//! # Ok(())
//! # }
//! ```
//!
//! A failed build returns a [`BuildError`] naming the phase and the cause;
//! no partially assembled topology ever escapes.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod assembler;
pub mod clock;
pub mod description;
pub mod device;
pub mod error;
pub mod fabric;
pub mod firmware;
pub mod space;
pub mod topology;

pub use assembler::BoardAssembler;
pub use clock::{ClockGraph, ClockRate, Derivation, ResolvedClock};
pub use description::{
    BoardDescription, ClockDesc, DeviceDesc, FirmwareDesc, RegionDesc, RouteDesc,
};
pub use device::{
    contract, Device, DeviceContract, DeviceRegistry, DeviceState, MemoryLink, PropValue,
};
pub use error::{BuildError, BuildPhase, Result, TopologyError};
pub use fabric::{InterruptEdge, InterruptFabric};
pub use firmware::{FirmwareImage, FirmwareLoader, LoadRecord};
pub use space::{AddressSpace, Region, RegionKind};
pub use topology::Topology;
